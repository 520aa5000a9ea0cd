//! Generic per-table state queries: high-water mark and row count.
//!
//! Table names come from static source descriptors, so interpolating
//! them into SQL is safe; values never are interpolated.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use thiserror::Error;

use super::pool::{run_blocking, SqlitePool};
use crate::transform;

/// Failure to read sync state from the target. Callers downgrade this
/// to "no prior state" rather than aborting a run.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("state query failed: {0}")]
    Query(#[from] diesel::result::Error),
}

/// Target store rejected a batch.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("batch write failed: {0}")]
    Write(#[from] diesel::result::Error),
}

#[derive(QueryableByName)]
struct MaxTimestampRow {
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    max_ts: Option<String>,
}

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    n: i64,
}

/// Maximum modification timestamp currently stored for a source, or
/// `None` for an empty table or unparseable values.
pub async fn max_modified(
    pool: &SqlitePool,
    table: &str,
    column: &str,
) -> Result<Option<NaiveDateTime>, StateError> {
    let sql = format!("SELECT MAX({column}) AS max_ts FROM {table}");
    let pool = pool.clone();

    let row: MaxTimestampRow =
        run_blocking(pool, move |conn| diesel::sql_query(sql).get_result(conn)).await?;

    Ok(row
        .max_ts
        .as_deref()
        .and_then(transform::parse_stored_datetime))
}

/// Number of rows currently stored in a table.
pub async fn count_rows(pool: &SqlitePool, table: &str) -> Result<i64, StateError> {
    let sql = format!("SELECT COUNT(*) AS n FROM {table}");
    let pool = pool.clone();

    let row: CountRow =
        run_blocking(pool, move |conn| diesel::sql_query(sql).get_result(conn)).await?;

    Ok(row.n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::pool::create_pool_from_url;
    use tempfile::tempdir;

    async fn setup_test_db() -> (SqlitePool, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let pool = create_pool_from_url(&db_path.display().to_string()).unwrap();

        run_blocking(pool.clone(), |conn| {
            diesel::sql_query(
                "CREATE TABLE IF NOT EXISTS log_demo (id TEXT PRIMARY KEY, fec_modif TEXT)",
            )
            .execute(conn)?;
            Ok(())
        })
        .await
        .unwrap();

        (pool, dir)
    }

    #[tokio::test]
    async fn empty_table_has_no_high_water_mark() {
        let (pool, _dir) = setup_test_db().await;
        assert!(max_modified(&pool, "log_demo", "fec_modif")
            .await
            .unwrap()
            .is_none());
        assert_eq!(count_rows(&pool, "log_demo").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn max_is_parsed_from_canonical_text() {
        let (pool, _dir) = setup_test_db().await;

        run_blocking(pool.clone(), |conn| {
            diesel::sql_query(
                "INSERT INTO log_demo (id, fec_modif) VALUES \
                 ('a', '2026-01-19 10:00:00'), ('b', '2026-01-20 00:00:00')",
            )
            .execute(conn)?;
            Ok(())
        })
        .await
        .unwrap();

        let max = max_modified(&pool, "log_demo", "fec_modif")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(max.to_string(), "2026-01-20 00:00:00");
        assert_eq!(count_rows(&pool, "log_demo").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn missing_table_is_a_state_error() {
        let (pool, _dir) = setup_test_db().await;
        assert!(max_modified(&pool, "no_such_table", "fec_modif")
            .await
            .is_err());
        assert!(count_rows(&pool, "no_such_table").await.is_err());
    }
}
