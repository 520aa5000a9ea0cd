//! Source definitions.
//!
//! Every source shares the same four-step contract (state query, fetch,
//! transform, write) and differs only in endpoint, key fields, and
//! filter support; [`SyncSource`] carries that contract once, with
//! per-source configuration data instead of per-source control flow.

pub mod cambios_etapa;
pub mod clientes;
pub mod cotizaciones;
pub mod detalle_cotizacion;
pub mod log_vidrios_produccion;
pub mod proyectos_cliente;
pub mod v_insumos;
pub mod vidrios_produccion;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::models::{RawRecord, SourceDescriptor, SyncWindow};
use crate::remote::{ApexClient, OffsetPager, PageReader};
use crate::repository::{self, SqlitePool, StateError, WriteError};
use crate::transform::TransformError;

/// Modification-time column shared by all target tables.
pub const MODIFIED_COLUMN: &str = "fec_modif";

/// All configured sources, in the order the runner processes them:
/// master catalogs, transactional data, production, change logs.
pub const DESCRIPTORS: &[&SourceDescriptor] = &[
    &clientes::DESCRIPTOR,
    &proyectos_cliente::DESCRIPTOR,
    &v_insumos::DESCRIPTOR,
    &cotizaciones::DESCRIPTOR,
    &detalle_cotizacion::DESCRIPTOR,
    &vidrios_produccion::DESCRIPTOR,
    &log_vidrios_produccion::DESCRIPTOR,
    &cambios_etapa::DESCRIPTOR,
];

/// A transformed row ready for upsert into the target store.
pub trait TargetRow: Clone + Send + 'static {
    /// Stable conflict key.
    fn id(&self) -> &str;
}

/// One replicated source: fixed remote endpoint, fixed target schema.
#[async_trait]
pub trait SyncSource: Send + Sync {
    type Row: TargetRow;

    fn descriptor(&self) -> &SourceDescriptor;

    /// Map a raw record into the fixed target schema. Absent non-key
    /// fields become explicit nulls; an absent key field fails the
    /// record (skipped by the caller, never the batch).
    fn transform(&self, raw: &RawRecord) -> Result<Self::Row, TransformError>;

    /// Page stream for the resolved window. The default pages the
    /// collection URL by offset; sources with richer extraction shapes
    /// override this.
    fn reader(&self, client: Arc<ApexClient>, window: &SyncWindow) -> Box<dyn PageReader> {
        let desc = self.descriptor();
        let url = client.collection_url(desc, window);
        Box::new(OffsetPager::new(client, url, desc.page_size))
    }

    /// Upsert a batch of rows, returning the number written.
    async fn write_batch(&self, pool: &SqlitePool, rows: Vec<Self::Row>) -> Result<usize, WriteError>;

    /// High-water mark currently stored for this source.
    async fn max_modified(&self, pool: &SqlitePool) -> Result<Option<NaiveDateTime>, StateError> {
        repository::max_modified(pool, self.descriptor().table, MODIFIED_COLUMN).await
    }
}
