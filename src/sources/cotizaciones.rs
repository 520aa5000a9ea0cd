//! `cotizaciones`: quotation headers. Full extraction every run.

use async_trait::async_trait;
use diesel::prelude::*;

use super::{SyncSource, TargetRow};
use crate::models::{RawRecord, SourceDescriptor};
use crate::repository::{run_blocking, SqlitePool, WriteError};
use crate::schema::cotizaciones;
use crate::transform::{get_datetime, get_f64, get_i64, get_str, key_part, TransformError};

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    name: "cotizaciones",
    endpoint: "cotizaciones",
    period_endpoint: None,
    table: "cotizaciones",
    key_fields: &["no_cotizacion"],
    page_size: 1000,
    lookback_days: 30,
};

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cotizaciones)]
pub struct CotizacionRow {
    pub id: String,
    pub no_cotizacion: Option<i64>,
    pub no_contacto: Option<i64>,
    pub fecha: Option<String>,
    pub no_cliente: Option<i64>,
    pub status: Option<String>,
    pub no_proyecto: Option<i64>,
    pub comentarios: Option<String>,
    pub solo_maquila: Option<String>,
    pub pct_descuento: Option<f64>,
    pub no_emp_vendedor: Option<i64>,
    pub fec_valorizacion: Option<String>,
    pub comprobante: Option<String>,
    pub fec_crea: Option<String>,
    pub usr_crea: Option<String>,
    pub fec_modif: Option<String>,
    pub usr_modif: Option<String>,
    pub moneda: Option<String>,
    pub referencia: Option<String>,
    pub no_orden_compra: Option<String>,
}

impl TargetRow for CotizacionRow {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct Cotizaciones;

#[async_trait]
impl SyncSource for Cotizaciones {
    type Row = CotizacionRow;

    fn descriptor(&self) -> &SourceDescriptor {
        &DESCRIPTOR
    }

    fn transform(&self, raw: &RawRecord) -> Result<CotizacionRow, TransformError> {
        let id = key_part(raw, "no_cotizacion")?;

        Ok(CotizacionRow {
            id,
            no_cotizacion: get_i64(raw, "no_cotizacion"),
            no_contacto: get_i64(raw, "no_contacto"),
            fecha: get_datetime(raw, "fecha"),
            no_cliente: get_i64(raw, "no_cliente"),
            status: get_str(raw, "status"),
            no_proyecto: get_i64(raw, "no_proyecto"),
            comentarios: get_str(raw, "comentarios"),
            solo_maquila: get_str(raw, "solo_maquila"),
            pct_descuento: get_f64(raw, "pct_descuento"),
            no_emp_vendedor: get_i64(raw, "no_emp_vendedor"),
            fec_valorizacion: get_datetime(raw, "fec_valorizacion"),
            comprobante: get_str(raw, "comprobante"),
            fec_crea: get_datetime(raw, "fec_crea"),
            usr_crea: get_str(raw, "usr_crea"),
            fec_modif: get_datetime(raw, "fec_modif"),
            usr_modif: get_str(raw, "usr_modif"),
            moneda: get_str(raw, "moneda"),
            referencia: get_str(raw, "referencia"),
            no_orden_compra: get_str(raw, "no_orden_compra"),
        })
    }

    async fn write_batch(
        &self,
        pool: &SqlitePool,
        rows: Vec<CotizacionRow>,
    ) -> Result<usize, WriteError> {
        let pool = pool.clone();
        run_blocking(pool, move |conn| {
            diesel::replace_into(cotizaciones::table)
                .values(&rows)
                .execute(conn)
        })
        .await
        .map_err(WriteError::from)
    }
}
