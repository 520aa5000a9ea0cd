//! `clientes`: customer master catalog. No time filter on the remote
//! endpoint, so every run is a full extraction with in-place upserts.

use async_trait::async_trait;
use diesel::prelude::*;

use super::{SyncSource, TargetRow};
use crate::models::{RawRecord, SourceDescriptor};
use crate::repository::{run_blocking, SqlitePool, WriteError};
use crate::schema::clientes;
use crate::transform::{get_datetime, get_f64, get_i64, get_str, key_part, TransformError};

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    name: "clientes",
    endpoint: "clientes",
    period_endpoint: None,
    table: "clientes",
    key_fields: &["no_cliente"],
    page_size: 1000,
    lookback_days: 30,
};

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = clientes)]
pub struct ClienteRow {
    pub id: String,
    pub no_cliente: Option<i64>,
    pub razon_social: Option<String>,
    pub rfc: Option<String>,
    pub e_mail: Option<String>,
    pub nivel_precio: Option<i64>,
    pub telefonos: Option<String>,
    pub notas: Option<String>,
    pub notas_pago: Option<String>,
    pub atencion: Option<String>,
    pub limite_credito: Option<f64>,
    pub dias_credito: Option<i64>,
    pub fec_crea: Option<String>,
    pub usr_crea: Option<String>,
    pub fec_modif: Option<String>,
    pub usr_modif: Option<String>,
    pub siglas: Option<String>,
    pub no_emp_vendedor: Option<i64>,
    pub regimen_fiscal: Option<String>,
    pub cp: Option<String>,
    pub direccion: Option<String>,
    pub e_mail_compras: Option<String>,
    pub cve_uso_cfdi: Option<String>,
}

impl TargetRow for ClienteRow {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct Clientes;

#[async_trait]
impl SyncSource for Clientes {
    type Row = ClienteRow;

    fn descriptor(&self) -> &SourceDescriptor {
        &DESCRIPTOR
    }

    fn transform(&self, raw: &RawRecord) -> Result<ClienteRow, TransformError> {
        let id = key_part(raw, "no_cliente")?;

        Ok(ClienteRow {
            id,
            no_cliente: get_i64(raw, "no_cliente"),
            razon_social: get_str(raw, "razon_social"),
            rfc: get_str(raw, "rfc"),
            e_mail: get_str(raw, "e_mail"),
            nivel_precio: get_i64(raw, "nivel_precio"),
            telefonos: get_str(raw, "telefonos"),
            notas: get_str(raw, "notas"),
            notas_pago: get_str(raw, "notas_pago"),
            atencion: get_str(raw, "atencion"),
            limite_credito: get_f64(raw, "limite_credito"),
            dias_credito: get_i64(raw, "dias_credito"),
            fec_crea: get_datetime(raw, "fec_crea"),
            usr_crea: get_str(raw, "usr_crea"),
            fec_modif: get_datetime(raw, "fec_modif"),
            usr_modif: get_str(raw, "usr_modif"),
            siglas: get_str(raw, "siglas"),
            no_emp_vendedor: get_i64(raw, "no_emp_vendedor"),
            regimen_fiscal: get_str(raw, "regimen_fiscal"),
            cp: get_str(raw, "cp"),
            direccion: get_str(raw, "direccion"),
            e_mail_compras: get_str(raw, "e_mail_compras"),
            cve_uso_cfdi: get_str(raw, "cve_uso_cfdi"),
        })
    }

    async fn write_batch(&self, pool: &SqlitePool, rows: Vec<ClienteRow>) -> Result<usize, WriteError> {
        let pool = pool.clone();
        run_blocking(pool, move |conn| {
            diesel::replace_into(clientes::table)
                .values(&rows)
                .execute(conn)
        })
        .await
        .map_err(WriteError::from)
    }
}
