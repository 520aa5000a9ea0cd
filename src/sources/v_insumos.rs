//! `v_insumos`: materials catalog view. Full extraction every run.

use async_trait::async_trait;
use diesel::prelude::*;

use super::{SyncSource, TargetRow};
use crate::models::{RawRecord, SourceDescriptor};
use crate::repository::{run_blocking, SqlitePool, WriteError};
use crate::schema::v_insumos;
use crate::transform::{get_f64, get_i64, get_str, key_part, TransformError};

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    name: "v_insumos",
    endpoint: "v_insumos",
    period_endpoint: None,
    table: "v_insumos",
    key_fields: &["no_insumo"],
    page_size: 1000,
    lookback_days: 30,
};

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = v_insumos)]
pub struct InsumoRow {
    pub id: String,
    pub no_insumo: Option<i64>,
    pub clave_estandar: Option<String>,
    pub descripcion: Option<String>,
    pub nom_largo: Option<String>,
    pub tipo_insumo: Option<String>,
    pub cve_linea: Option<String>,
    pub cve_generica: Option<String>,
    pub cve_tipo_vidrio: Option<String>,
    pub no_espesor: Option<i64>,
    pub no_medida: Option<i64>,
    pub no_acabado: Option<i64>,
    pub no_longitud: Option<i64>,
    pub cve_unidad: Option<String>,
    pub precio_mxn: Option<f64>,
    pub precio_usd: Option<f64>,
    pub precio_eur: Option<f64>,
    pub costo_promedio: Option<f64>,
    pub no_insumo_gsns: Option<i64>,
    pub espesor: Option<f64>,
    pub vigente: Option<String>,
    pub id_skyplanner: Option<String>,
    pub tiempo_pre_proceso: Option<f64>,
    pub tiempo_proceso: Option<f64>,
    pub tiempo_post_proceso: Option<f64>,
}

impl TargetRow for InsumoRow {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct VInsumos;

#[async_trait]
impl SyncSource for VInsumos {
    type Row = InsumoRow;

    fn descriptor(&self) -> &SourceDescriptor {
        &DESCRIPTOR
    }

    fn transform(&self, raw: &RawRecord) -> Result<InsumoRow, TransformError> {
        let id = key_part(raw, "no_insumo")?;

        Ok(InsumoRow {
            id,
            no_insumo: get_i64(raw, "no_insumo"),
            clave_estandar: get_str(raw, "clave_estandar"),
            descripcion: get_str(raw, "descripcion"),
            nom_largo: get_str(raw, "nom_largo"),
            tipo_insumo: get_str(raw, "tipo_insumo"),
            cve_linea: get_str(raw, "cve_linea"),
            cve_generica: get_str(raw, "cve_generica"),
            cve_tipo_vidrio: get_str(raw, "cve_tipo_vidrio"),
            no_espesor: get_i64(raw, "no_espesor"),
            no_medida: get_i64(raw, "no_medida"),
            no_acabado: get_i64(raw, "no_acabado"),
            no_longitud: get_i64(raw, "no_longitud"),
            cve_unidad: get_str(raw, "cve_unidad"),
            precio_mxn: get_f64(raw, "precio_mxn"),
            precio_usd: get_f64(raw, "precio_usd"),
            precio_eur: get_f64(raw, "precio_eur"),
            costo_promedio: get_f64(raw, "costo_promedio"),
            no_insumo_gsns: get_i64(raw, "no_insumo_gsns"),
            espesor: get_f64(raw, "espesor"),
            vigente: get_str(raw, "vigente"),
            id_skyplanner: get_str(raw, "id_skyplanner"),
            tiempo_pre_proceso: get_f64(raw, "tiempo_pre_proceso"),
            tiempo_proceso: get_f64(raw, "tiempo_proceso"),
            tiempo_post_proceso: get_f64(raw, "tiempo_post_proceso"),
        })
    }

    async fn write_batch(&self, pool: &SqlitePool, rows: Vec<InsumoRow>) -> Result<usize, WriteError> {
        let pool = pool.clone();
        run_blocking(pool, move |conn| {
            diesel::replace_into(v_insumos::table)
                .values(&rows)
                .execute(conn)
        })
        .await
        .map_err(WriteError::from)
    }
}
