//! Target store access: connection pooling and generic state queries.
//!
//! Per-source upserts live with each source definition; this module
//! holds what is shared across tables.

pub mod pool;
pub mod state;

pub use pool::{create_pool, create_pool_from_url, run_blocking, SqlitePool};
pub use state::{count_rows, max_modified, StateError, WriteError};
