//! Incremental replication of SAVIO ERP REST endpoints into a local
//! relational store.
//!
//! The pipeline for one source is: read the target's high-water mark,
//! resolve an extraction window, page through the remote collection,
//! transform each raw record into a fixed-schema row, and upsert rows in
//! bounded batches with retry and rate control. A runner sequences all
//! configured sources and isolates per-source failures.

pub mod config;
pub mod models;
pub mod remote;
pub mod repository;
pub mod schema;
pub mod sources;
pub mod sync;
pub mod transform;
