//! End-to-end pipeline tests against a temporary SQLite database, with
//! fixture page readers standing in for the remote catalog.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use savio_sync::models::{RawRecord, SourceDescriptor, SyncMode, SyncRequest, SyncWindow};
use savio_sync::remote::{ApexClient, FetchError, PageReader};
use savio_sync::repository::{self, create_pool, run_blocking, SqlitePool, WriteError};
use savio_sync::sources::clientes::{self, ClienteRow, Clientes};
use savio_sync::sources::SyncSource;
use savio_sync::sync::{sync_source, RetryPolicy, SyncContext};
use savio_sync::transform::TransformError;

const CLIENTES_DDL: &str = "CREATE TABLE clientes (
    id TEXT PRIMARY KEY,
    no_cliente BIGINT, razon_social TEXT, rfc TEXT, e_mail TEXT,
    nivel_precio BIGINT, telefonos TEXT, notas TEXT, notas_pago TEXT,
    atencion TEXT, limite_credito DOUBLE, dias_credito BIGINT,
    fec_crea TEXT, usr_crea TEXT, fec_modif TEXT, usr_modif TEXT,
    siglas TEXT, no_emp_vendedor BIGINT, regimen_fiscal TEXT, cp TEXT,
    direccion TEXT, e_mail_compras TEXT, cve_uso_cfdi TEXT
)";

const PROBE_DDL: &str = "CREATE TABLE probe_state (id TEXT PRIMARY KEY, fec_modif TEXT)";

async fn setup_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let pool = create_pool(&dir.path().join("test.db")).unwrap();

    run_blocking(pool.clone(), |conn| {
        diesel::sql_query(CLIENTES_DDL).execute(conn)?;
        diesel::sql_query(PROBE_DDL).execute(conn)?;
        Ok(())
    })
    .await
    .unwrap();

    (pool, dir)
}

fn test_context(pool: SqlitePool) -> SyncContext {
    SyncContext {
        client: Arc::new(ApexClient::new(
            "https://erp.example.com/apex/savio",
            Duration::from_secs(5),
        )),
        pool,
        batch_size: 2,
        rate_limit: Duration::ZERO,
        retry: RetryPolicy::default(),
    }
}

fn records(values: &[serde_json::Value]) -> Vec<RawRecord> {
    values
        .iter()
        .map(|v| match v {
            serde_json::Value::Object(map) => map.clone(),
            _ => unreachable!(),
        })
        .collect()
}

struct FixturePager {
    pages: VecDeque<Vec<RawRecord>>,
}

#[async_trait]
impl PageReader for FixturePager {
    async fn next_page(&mut self) -> Result<Option<Vec<RawRecord>>, FetchError> {
        Ok(self.pages.pop_front())
    }
}

/// A `clientes` source fed from in-memory pages instead of HTTP.
struct FixtureClientes {
    pages: Mutex<VecDeque<Vec<RawRecord>>>,
}

impl FixtureClientes {
    fn new(pages: Vec<Vec<RawRecord>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
        }
    }
}

#[async_trait]
impl SyncSource for FixtureClientes {
    type Row = ClienteRow;

    fn descriptor(&self) -> &SourceDescriptor {
        &clientes::DESCRIPTOR
    }

    fn transform(&self, raw: &RawRecord) -> Result<ClienteRow, TransformError> {
        Clientes.transform(raw)
    }

    fn reader(&self, _client: Arc<ApexClient>, _window: &SyncWindow) -> Box<dyn PageReader> {
        let pages = std::mem::take(&mut *self.pages.lock().unwrap());
        Box::new(FixturePager { pages })
    }

    async fn write_batch(&self, pool: &SqlitePool, rows: Vec<ClienteRow>) -> Result<usize, WriteError> {
        Clientes.write_batch(pool, rows).await
    }
}

#[derive(QueryableByName)]
struct NameRow {
    #[diesel(sql_type = diesel::sql_types::Nullable<diesel::sql_types::Text>)]
    razon_social: Option<String>,
}

async fn stored_name(pool: &SqlitePool, id: &str) -> Option<String> {
    let sql = format!("SELECT razon_social FROM clientes WHERE id = '{id}'");
    let row: NameRow = run_blocking(pool.clone(), move |conn| {
        diesel::sql_query(sql).get_result(conn)
    })
    .await
    .unwrap();
    row.razon_social
}

#[tokio::test]
async fn full_run_lands_rows_and_reruns_converge() {
    let (pool, _dir) = setup_db().await;
    let ctx = test_context(pool.clone());

    let source = FixtureClientes::new(vec![
        records(&[
            json!({"no_cliente": 1, "razon_social": "ACME"}),
            json!({"no_cliente": 2, "razon_social": "Globex"}),
        ]),
        records(&[json!({"no_cliente": 3, "razon_social": "Initech"})]),
    ]);

    let result = sync_source(&ctx, &source, &SyncRequest::default()).await;
    assert!(result.success());
    assert_eq!(result.mode, Some(SyncMode::Full));
    assert_eq!(result.fetched, 3);
    assert_eq!(result.written, 3);
    assert_eq!(result.skipped, 0);
    assert_eq!(repository::count_rows(&pool, "clientes").await.unwrap(), 3);

    // The remote renames customer 1; the rerun overwrites in place
    // instead of inserting a duplicate.
    let source = FixtureClientes::new(vec![records(&[
        json!({"no_cliente": 1, "razon_social": "ACME Holdings"}),
        json!({"no_cliente": 2, "razon_social": "Globex"}),
    ])]);
    let result = sync_source(&ctx, &source, &SyncRequest::default()).await;
    assert!(result.success());
    assert_eq!(result.written, 2);
    assert_eq!(repository::count_rows(&pool, "clientes").await.unwrap(), 3);
    assert_eq!(stored_name(&pool, "1").await.as_deref(), Some("ACME Holdings"));
}

#[tokio::test]
async fn malformed_records_are_skipped_not_fatal() {
    let (pool, _dir) = setup_db().await;
    let ctx = test_context(pool.clone());

    let source = FixtureClientes::new(vec![records(&[
        json!({"no_cliente": 1, "razon_social": "ACME"}),
        json!({"razon_social": "no key field"}),
        json!({"no_cliente": 2}),
    ])]);

    let result = sync_source(&ctx, &source, &SyncRequest::default()).await;
    assert!(result.success());
    assert_eq!(result.fetched, 3);
    assert_eq!(result.written, 2);
    assert_eq!(result.skipped, 1);
}

#[tokio::test]
async fn duplicate_ids_in_a_page_keep_the_last_value() {
    let (pool, _dir) = setup_db().await;
    let ctx = test_context(pool.clone());

    let source = FixtureClientes::new(vec![records(&[
        json!({"no_cliente": 1, "razon_social": "stale"}),
        json!({"no_cliente": 1, "razon_social": "fresh"}),
    ])]);

    let result = sync_source(&ctx, &source, &SyncRequest::default()).await;
    assert!(result.success());
    assert_eq!(result.written, 1);
    assert_eq!(stored_name(&pool, "1").await.as_deref(), Some("fresh"));
}

/// Time-filtered source that records the window it was handed and
/// serves no pages.
struct WindowProbe {
    captured: Mutex<Option<SyncWindow>>,
}

const PROBE_DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    name: "probe",
    endpoint: "probe",
    period_endpoint: Some("periodo/probe"),
    table: "probe_state",
    key_fields: &["no_cliente"],
    page_size: 1000,
    lookback_days: 30,
};

#[async_trait]
impl SyncSource for WindowProbe {
    type Row = ClienteRow;

    fn descriptor(&self) -> &SourceDescriptor {
        &PROBE_DESCRIPTOR
    }

    fn transform(&self, raw: &RawRecord) -> Result<ClienteRow, TransformError> {
        Clientes.transform(raw)
    }

    fn reader(&self, _client: Arc<ApexClient>, window: &SyncWindow) -> Box<dyn PageReader> {
        *self.captured.lock().unwrap() = Some(window.clone());
        Box::new(FixturePager {
            pages: VecDeque::new(),
        })
    }

    async fn write_batch(&self, _pool: &SqlitePool, rows: Vec<ClienteRow>) -> Result<usize, WriteError> {
        Ok(rows.len())
    }
}

#[tokio::test]
async fn stored_state_drives_an_incremental_window() {
    let (pool, _dir) = setup_db().await;
    let ctx = test_context(pool.clone());

    run_blocking(pool.clone(), |conn| {
        diesel::sql_query(
            "INSERT INTO probe_state (id, fec_modif) VALUES ('a', '2026-05-01 10:30:00')",
        )
        .execute(conn)?;
        Ok(())
    })
    .await
    .unwrap();

    let source = WindowProbe {
        captured: Mutex::new(None),
    };
    let result = sync_source(&ctx, &source, &SyncRequest::default()).await;
    assert!(result.success());

    let window = source.captured.lock().unwrap().clone().unwrap();
    assert_eq!(window.mode, SyncMode::Incremental);
    let mark = NaiveDateTime::parse_from_str("2026-05-01 10:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
    assert_eq!(window.desde, Some(mark));
    assert!(window.hasta.is_some());
}

#[tokio::test]
async fn empty_probe_table_triggers_first_run_lookback() {
    let (pool, _dir) = setup_db().await;
    let ctx = test_context(pool.clone());

    let source = WindowProbe {
        captured: Mutex::new(None),
    };
    let result = sync_source(&ctx, &source, &SyncRequest::default()).await;
    assert!(result.success());

    let window = source.captured.lock().unwrap().clone().unwrap();
    assert_eq!(window.mode, SyncMode::FirstRun);
    assert!(window.is_bounded());
}

/// Pager driven by a fixed script of outcomes; exhausting the script
/// ends the stream.
struct ScriptedPager {
    steps: VecDeque<Result<Vec<RawRecord>, FetchError>>,
}

#[async_trait]
impl PageReader for ScriptedPager {
    async fn next_page(&mut self) -> Result<Option<Vec<RawRecord>>, FetchError> {
        match self.steps.pop_front() {
            Some(Ok(records)) => Ok(Some(records)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }
}

/// A `clientes` source whose page stream follows a script of successes
/// and fetch errors.
struct ScriptedClientes {
    steps: Mutex<VecDeque<Result<Vec<RawRecord>, FetchError>>>,
}

impl ScriptedClientes {
    fn new(steps: Vec<Result<Vec<RawRecord>, FetchError>>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
        }
    }
}

#[async_trait]
impl SyncSource for ScriptedClientes {
    type Row = ClienteRow;

    fn descriptor(&self) -> &SourceDescriptor {
        &clientes::DESCRIPTOR
    }

    fn transform(&self, raw: &RawRecord) -> Result<ClienteRow, TransformError> {
        Clientes.transform(raw)
    }

    fn reader(&self, _client: Arc<ApexClient>, _window: &SyncWindow) -> Box<dyn PageReader> {
        let steps = std::mem::take(&mut *self.steps.lock().unwrap());
        Box::new(ScriptedPager { steps })
    }

    async fn write_batch(&self, pool: &SqlitePool, rows: Vec<ClienteRow>) -> Result<usize, WriteError> {
        Clientes.write_batch(pool, rows).await
    }
}

#[tokio::test(start_paused = true)]
async fn transient_fetch_errors_are_retried_in_place() {
    let (pool, _dir) = setup_db().await;
    let ctx = test_context(pool.clone());

    let source = ScriptedClientes::new(vec![
        Err(FetchError::Transient("HTTP 503".into())),
        Err(FetchError::Transient("timed out".into())),
        Ok(records(&[json!({"no_cliente": 1, "razon_social": "ACME"})])),
    ]);

    let start = tokio::time::Instant::now();
    let result = sync_source(&ctx, &source, &SyncRequest::default()).await;

    assert!(result.success());
    assert_eq!(result.fetched, 1);
    assert_eq!(result.written, 1);
    assert_eq!(repository::count_rows(&pool, "clientes").await.unwrap(), 1);
    // 2s after the first failure, 4s after the second.
    assert_eq!(start.elapsed(), Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn fatal_fetch_errors_abort_without_retry() {
    let (pool, _dir) = setup_db().await;
    let ctx = test_context(pool.clone());

    let source = ScriptedClientes::new(vec![
        Err(FetchError::Fatal("HTTP 401".into())),
        Ok(records(&[json!({"no_cliente": 1})])),
    ]);

    let start = tokio::time::Instant::now();
    let result = sync_source(&ctx, &source, &SyncRequest::default()).await;

    assert!(!result.success());
    assert_eq!(result.written, 0);
    // No backoff sleep: the run aborts on the first attempt.
    assert_eq!(start.elapsed(), Duration::ZERO);

    // A later source on the same context still runs.
    let next = FixtureClientes::new(vec![records(&[json!({"no_cliente": 2})])]);
    let result = sync_source(&ctx, &next, &SyncRequest::default()).await;
    assert!(result.success());
    assert_eq!(result.written, 1);
}

/// Source whose writes always fail; counts the attempts it receives.
struct FailingWriter {
    inner: FixtureClientes,
    attempts: AtomicU32,
}

#[async_trait]
impl SyncSource for FailingWriter {
    type Row = ClienteRow;

    fn descriptor(&self) -> &SourceDescriptor {
        &clientes::DESCRIPTOR
    }

    fn transform(&self, raw: &RawRecord) -> Result<ClienteRow, TransformError> {
        self.inner.transform(raw)
    }

    fn reader(&self, client: Arc<ApexClient>, window: &SyncWindow) -> Box<dyn PageReader> {
        self.inner.reader(client, window)
    }

    async fn write_batch(&self, _pool: &SqlitePool, _rows: Vec<ClienteRow>) -> Result<usize, WriteError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(WriteError::from(diesel::result::Error::NotFound))
    }
}

#[tokio::test(start_paused = true)]
async fn write_failures_exhaust_retries_then_surface() {
    let (pool, _dir) = setup_db().await;
    let ctx = test_context(pool.clone());

    let source = FailingWriter {
        inner: FixtureClientes::new(vec![records(&[json!({"no_cliente": 1})])]),
        attempts: AtomicU32::new(0),
    };

    let result = sync_source(&ctx, &source, &SyncRequest::default()).await;
    assert!(!result.success());
    assert_eq!(source.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(result.written, 0);

    // A later source on the same context is unaffected.
    let next = FixtureClientes::new(vec![records(&[json!({"no_cliente": 9})])]);
    let result = sync_source(&ctx, &next, &SyncRequest::default()).await;
    assert!(result.success());
    assert_eq!(result.written, 1);
}
