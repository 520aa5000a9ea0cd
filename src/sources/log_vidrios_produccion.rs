//! `log_vidrios_produccion`: append-only change log for production
//! pieces. Supports time filtering, so runs are incremental; the
//! modification timestamp is part of the id because repeated changes to
//! the same piece are distinct rows, not duplicates.

use async_trait::async_trait;
use diesel::prelude::*;

use super::{SyncSource, TargetRow};
use crate::models::{RawRecord, SourceDescriptor};
use crate::repository::{run_blocking, SqlitePool, WriteError};
use crate::schema::log_vidrios_produccion;
use crate::transform::{compose_id, get_datetime, get_i64, get_str, key_part, TransformError};

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    name: "log_vidrios_produccion",
    endpoint: "log_vidrios_produccion",
    period_endpoint: Some("periodo/log_vidrios"),
    table: "log_vidrios_produccion",
    key_fields: &[
        "no_orden_produccion",
        "no_cotizacion",
        "dec_seq",
        "vip_seq",
        "campo",
        "fec_modif",
    ],
    page_size: 1000,
    lookback_days: 30,
};

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = log_vidrios_produccion)]
pub struct LogVidrioRow {
    pub id: String,
    pub no_orden_produccion: Option<i64>,
    pub no_cotizacion: Option<i64>,
    pub dec_seq: Option<i64>,
    pub vip_seq: Option<i64>,
    pub campo: Option<String>,
    pub valor_anterior: Option<String>,
    pub valor_nuevo: Option<String>,
    pub usr_modif: Option<String>,
    pub fec_modif: Option<String>,
    pub fec_modif_pre: Option<String>,
}

impl TargetRow for LogVidrioRow {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct LogVidriosProduccion;

#[async_trait]
impl SyncSource for LogVidriosProduccion {
    type Row = LogVidrioRow;

    fn descriptor(&self) -> &SourceDescriptor {
        &DESCRIPTOR
    }

    fn transform(&self, raw: &RawRecord) -> Result<LogVidrioRow, TransformError> {
        let id = compose_id(&[
            key_part(raw, "no_orden_produccion")?,
            key_part(raw, "no_cotizacion")?,
            key_part(raw, "dec_seq")?,
            key_part(raw, "vip_seq")?,
            key_part(raw, "campo")?,
            key_part(raw, "fec_modif")?,
        ]);

        Ok(LogVidrioRow {
            id,
            no_orden_produccion: get_i64(raw, "no_orden_produccion"),
            no_cotizacion: get_i64(raw, "no_cotizacion"),
            dec_seq: get_i64(raw, "dec_seq"),
            vip_seq: get_i64(raw, "vip_seq"),
            campo: get_str(raw, "campo"),
            valor_anterior: get_str(raw, "valor_anterior"),
            valor_nuevo: get_str(raw, "valor_nuevo"),
            usr_modif: get_str(raw, "usr_modif"),
            fec_modif: get_datetime(raw, "fec_modif"),
            fec_modif_pre: get_datetime(raw, "fec_modif_pre"),
        })
    }

    async fn write_batch(&self, pool: &SqlitePool, rows: Vec<LogVidrioRow>) -> Result<usize, WriteError> {
        let pool = pool.clone();
        run_blocking(pool, move |conn| {
            diesel::replace_into(log_vidrios_produccion::table)
                .values(&rows)
                .execute(conn)
        })
        .await
        .map_err(WriteError::from)
    }
}
