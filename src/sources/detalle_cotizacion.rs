//! `detalle_cotizacion`: quotation line items. Full extraction every
//! run; composite id over quotation, sequence and line number.

use async_trait::async_trait;
use diesel::prelude::*;

use super::{SyncSource, TargetRow};
use crate::models::{RawRecord, SourceDescriptor};
use crate::repository::{run_blocking, SqlitePool, WriteError};
use crate::schema::detalle_cotizacion;
use crate::transform::{
    compose_id, get_datetime, get_f64, get_i64, get_str, key_part, TransformError,
};

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    name: "detalle_cotizacion",
    endpoint: "detalle_cotizacion",
    period_endpoint: None,
    table: "detalle_cotizacion",
    key_fields: &["no_cotizacion", "dec_seq", "renglon"],
    page_size: 1000,
    lookback_days: 30,
};

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = detalle_cotizacion)]
pub struct DetalleCotizacionRow {
    pub id: String,
    pub no_cotizacion: Option<i64>,
    pub dec_seq: Option<i64>,
    pub renglon: Option<i64>,
    pub clase_insumo: Option<String>,
    pub no_insumo: Option<i64>,
    pub base: Option<f64>,
    pub altura: Option<f64>,
    pub cantidad: Option<f64>,
    pub ref_ubicacion: Option<String>,
    pub no_sistema: Option<i64>,
    pub precio_unitario: Option<f64>,
    pub dibujo: Option<String>,
    pub dibujo_filename: Option<String>,
    pub dibujo_mimetype: Option<String>,
    pub dibujo_last_update: Option<String>,
    pub dibujo_charset: Option<String>,
    pub precio_m2: Option<f64>,
    pub precio_pactado: Option<f64>,
    pub forma_irregular: Option<String>,
    pub fec_crea: Option<String>,
    pub usr_crea: Option<String>,
    pub fec_modif: Option<String>,
    pub usr_modif: Option<String>,
    pub pagina_croquis: Option<i64>,
}

impl TargetRow for DetalleCotizacionRow {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct DetalleCotizacion;

#[async_trait]
impl SyncSource for DetalleCotizacion {
    type Row = DetalleCotizacionRow;

    fn descriptor(&self) -> &SourceDescriptor {
        &DESCRIPTOR
    }

    fn transform(&self, raw: &RawRecord) -> Result<DetalleCotizacionRow, TransformError> {
        let id = compose_id(&[
            key_part(raw, "no_cotizacion")?,
            key_part(raw, "dec_seq")?,
            key_part(raw, "renglon")?,
        ]);

        Ok(DetalleCotizacionRow {
            id,
            no_cotizacion: get_i64(raw, "no_cotizacion"),
            dec_seq: get_i64(raw, "dec_seq"),
            renglon: get_i64(raw, "renglon"),
            clase_insumo: get_str(raw, "clase_insumo"),
            no_insumo: get_i64(raw, "no_insumo"),
            base: get_f64(raw, "base"),
            altura: get_f64(raw, "altura"),
            cantidad: get_f64(raw, "cantidad"),
            ref_ubicacion: get_str(raw, "ref_ubicacion"),
            no_sistema: get_i64(raw, "no_sistema"),
            precio_unitario: get_f64(raw, "precio_unitario"),
            dibujo: get_str(raw, "dibujo"),
            dibujo_filename: get_str(raw, "dibujo_filename"),
            dibujo_mimetype: get_str(raw, "dibujo_mimetype"),
            dibujo_last_update: get_datetime(raw, "dibujo_last_update"),
            dibujo_charset: get_str(raw, "dibujo_charset"),
            precio_m2: get_f64(raw, "precio_m2"),
            precio_pactado: get_f64(raw, "precio_pactado"),
            forma_irregular: get_str(raw, "forma_irregular"),
            fec_crea: get_datetime(raw, "fec_crea"),
            usr_crea: get_str(raw, "usr_crea"),
            fec_modif: get_datetime(raw, "fec_modif"),
            usr_modif: get_str(raw, "usr_modif"),
            pagina_croquis: get_i64(raw, "pagina_croquis"),
        })
    }

    async fn write_batch(
        &self,
        pool: &SqlitePool,
        rows: Vec<DetalleCotizacionRow>,
    ) -> Result<usize, WriteError> {
        let pool = pool.clone();
        run_blocking(pool, move |conn| {
            diesel::replace_into(detalle_cotizacion::table)
                .values(&rows)
                .execute(conn)
        })
        .await
        .map_err(WriteError::from)
    }
}
