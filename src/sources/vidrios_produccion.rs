//! `vidrios_produccion`: current production state per glass piece.
//! Full extraction every run; the id excludes volatile fields so
//! unchanged pieces upsert in place.

use async_trait::async_trait;
use diesel::prelude::*;

use super::{SyncSource, TargetRow};
use crate::models::{RawRecord, SourceDescriptor};
use crate::repository::{run_blocking, SqlitePool, WriteError};
use crate::schema::vidrios_produccion;
use crate::transform::{
    compose_id, get_datetime, get_f64, get_i64, get_str, key_part, TransformError,
};

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    name: "vidrios_produccion",
    endpoint: "vidrios_produccion",
    period_endpoint: None,
    table: "vidrios_produccion",
    key_fields: &["no_orden_produccion", "no_cotizacion", "dec_seq", "vip_seq"],
    page_size: 1000,
    lookback_days: 30,
};

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = vidrios_produccion)]
pub struct VidrioProduccionRow {
    pub id: String,
    pub no_orden_produccion: Option<i64>,
    pub no_cotizacion: Option<i64>,
    pub dec_seq: Option<i64>,
    pub vip_seq: Option<i64>,
    pub vip_seq_ens: Option<i64>,
    pub no_insumo: Option<i64>,
    pub clase: Option<String>,
    pub status: Option<String>,
    pub no_etapa: Option<i64>,
    pub hora_cambio_etapa: Option<String>,
    pub no_motivo_reproceso: Option<i64>,
    pub vip_seq_rep: Option<i64>,
    pub cve_ubicacion: Option<String>,
    pub fec_crea: Option<String>,
    pub usr_crea: Option<String>,
    pub fec_modif: Option<String>,
    pub usr_modif: Option<String>,
    pub base: Option<f64>,
    pub altura: Option<f64>,
    pub id_skyplanner: Option<String>,
    pub seq_clase: Option<i64>,
    pub foldoc_cxc: Option<String>,
}

impl TargetRow for VidrioProduccionRow {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct VidriosProduccion;

#[async_trait]
impl SyncSource for VidriosProduccion {
    type Row = VidrioProduccionRow;

    fn descriptor(&self) -> &SourceDescriptor {
        &DESCRIPTOR
    }

    fn transform(&self, raw: &RawRecord) -> Result<VidrioProduccionRow, TransformError> {
        let id = compose_id(&[
            key_part(raw, "no_orden_produccion")?,
            key_part(raw, "no_cotizacion")?,
            key_part(raw, "dec_seq")?,
            key_part(raw, "vip_seq")?,
        ]);

        Ok(VidrioProduccionRow {
            id,
            no_orden_produccion: get_i64(raw, "no_orden_produccion"),
            no_cotizacion: get_i64(raw, "no_cotizacion"),
            dec_seq: get_i64(raw, "dec_seq"),
            vip_seq: get_i64(raw, "vip_seq"),
            vip_seq_ens: get_i64(raw, "vip_seq_ens"),
            no_insumo: get_i64(raw, "no_insumo"),
            clase: get_str(raw, "clase"),
            status: get_str(raw, "status"),
            no_etapa: get_i64(raw, "no_etapa"),
            hora_cambio_etapa: get_datetime(raw, "hora_cambio_etapa"),
            no_motivo_reproceso: get_i64(raw, "no_motivo_reproceso"),
            vip_seq_rep: get_i64(raw, "vip_seq_rep"),
            cve_ubicacion: get_str(raw, "cve_ubicacion"),
            fec_crea: get_datetime(raw, "fec_crea"),
            usr_crea: get_str(raw, "usr_crea"),
            fec_modif: get_datetime(raw, "fec_modif"),
            usr_modif: get_str(raw, "usr_modif"),
            base: get_f64(raw, "base"),
            altura: get_f64(raw, "altura"),
            id_skyplanner: get_str(raw, "id_skyplanner"),
            seq_clase: get_i64(raw, "seq_clase"),
            foldoc_cxc: get_str(raw, "foldoc_cxc"),
        })
    }

    async fn write_batch(
        &self,
        pool: &SqlitePool,
        rows: Vec<VidrioProduccionRow>,
    ) -> Result<usize, WriteError> {
        let pool = pool.clone();
        run_blocking(pool, move |conn| {
            diesel::replace_into(vidrios_produccion::table)
                .values(&rows)
                .execute(conn)
        })
        .await
        .map_err(WriteError::from)
    }
}
