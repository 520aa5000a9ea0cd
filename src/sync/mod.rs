//! The sync engine: window resolution, retried page extraction, batched
//! upserts, and the fixed multi-source run sequence.

pub mod orchestrator;
pub mod retry;
pub mod runner;
pub mod strategy;

pub use orchestrator::{sync_source, SyncContext, SyncError};
pub use retry::RetryPolicy;
pub use runner::Runner;
