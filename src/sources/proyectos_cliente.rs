//! `proyectos_cliente`: customer project catalog. Full extraction
//! every run; composite id over customer and project numbers.

use async_trait::async_trait;
use diesel::prelude::*;

use super::{SyncSource, TargetRow};
use crate::models::{RawRecord, SourceDescriptor};
use crate::repository::{run_blocking, SqlitePool, WriteError};
use crate::schema::proyectos_cliente;
use crate::transform::{
    compose_id, get_datetime, get_f64, get_i64, get_str, key_part, TransformError,
};

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    name: "proyectos_cliente",
    endpoint: "proyectos_cliente",
    period_endpoint: None,
    table: "proyectos_cliente",
    key_fields: &["no_cliente", "no_proyecto"],
    page_size: 1000,
    lookback_days: 30,
};

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = proyectos_cliente)]
pub struct ProyectoClienteRow {
    pub id: String,
    pub no_cliente: Option<i64>,
    pub no_proyecto: Option<i64>,
    pub nom_proyecto: Option<String>,
    pub num_proy_cliente: Option<String>,
    pub txt_proy_cliente: Option<String>,
    pub importe_anticipo: Option<f64>,
    pub pct_anticipo: Option<f64>,
    pub fec_crea: Option<String>,
    pub usr_crea: Option<String>,
    pub fec_modif: Option<String>,
    pub usr_modif: Option<String>,
    pub id_skyplanner: Option<String>,
}

impl TargetRow for ProyectoClienteRow {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct ProyectosCliente;

#[async_trait]
impl SyncSource for ProyectosCliente {
    type Row = ProyectoClienteRow;

    fn descriptor(&self) -> &SourceDescriptor {
        &DESCRIPTOR
    }

    fn transform(&self, raw: &RawRecord) -> Result<ProyectoClienteRow, TransformError> {
        let id = compose_id(&[
            key_part(raw, "no_cliente")?,
            key_part(raw, "no_proyecto")?,
        ]);

        Ok(ProyectoClienteRow {
            id,
            no_cliente: get_i64(raw, "no_cliente"),
            no_proyecto: get_i64(raw, "no_proyecto"),
            nom_proyecto: get_str(raw, "nom_proyecto"),
            num_proy_cliente: get_str(raw, "num_proy_cliente"),
            txt_proy_cliente: get_str(raw, "txt_proy_cliente"),
            importe_anticipo: get_f64(raw, "importe_anticipo"),
            pct_anticipo: get_f64(raw, "pct_anticipo"),
            fec_crea: get_datetime(raw, "fec_crea"),
            usr_crea: get_str(raw, "usr_crea"),
            fec_modif: get_datetime(raw, "fec_modif"),
            usr_modif: get_str(raw, "usr_modif"),
            id_skyplanner: get_str(raw, "id_skyplanner"),
        })
    }

    async fn write_batch(
        &self,
        pool: &SqlitePool,
        rows: Vec<ProyectoClienteRow>,
    ) -> Result<usize, WriteError> {
        let pool = pool.clone();
        run_blocking(pool, move |conn| {
            diesel::replace_into(proyectos_cliente::table)
                .values(&rows)
                .execute(conn)
        })
        .await
        .map_err(WriteError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_joins_customer_and_project() {
        let raw = match json!({"no_cliente": 12, "no_proyecto": 7}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let row = ProyectosCliente.transform(&raw).unwrap();
        assert_eq!(row.id, "12_7");
    }
}
