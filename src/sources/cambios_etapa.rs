//! `cambios_etapa`: stage-change history per production piece.
//!
//! The remote exposes no time-filtered listing for this view. Bounded
//! runs instead fan out: the window's `log_vidrios` feed names the
//! production orders that changed, and each order's full stage history
//! is fetched through `periodo/cambios_etapa/{order}`. Unbounded runs
//! page the view directly.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use tracing::{debug, warn};

use super::{log_vidrios_produccion, SyncSource, TargetRow};
use crate::models::{RawRecord, SourceDescriptor, SyncWindow};
use crate::remote::{ApexClient, FetchError, OffsetPager, PageReader};
use crate::repository::{run_blocking, SqlitePool, WriteError};
use crate::schema::cambios_etapa;
use crate::transform::{
    compose_id, get_datetime, get_f64, get_i64, get_str, key_part, TransformError,
};

pub const DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    name: "cambios_etapa",
    endpoint: "v_log_cambios_etapa",
    period_endpoint: Some("periodo/cambios_etapa"),
    table: "cambios_etapa",
    key_fields: &["no_orden_produccion", "dec_seq", "vip_seq", "no_etapa"],
    page_size: 1000,
    lookback_days: 30,
};

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = cambios_etapa)]
pub struct CambioEtapaRow {
    pub id: String,
    pub no_orden_produccion: Option<i64>,
    pub no_cotizacion: Option<i64>,
    pub dec_seq: Option<i64>,
    pub vip_seq: Option<i64>,
    pub no_etapa: Option<i64>,
    pub no_insumo: Option<i64>,
    pub no_insumo_final: Option<i64>,
    pub usr_modif: Option<String>,
    pub fec_modif: Option<String>,
    pub status: Option<String>,
    pub no_etapa_actual: Option<i64>,
    pub no_optimizacion: Option<i64>,
    pub espesor: Option<f64>,
    pub base: Option<f64>,
    pub altura: Option<f64>,
    pub m2: Option<f64>,
    pub taladros_cot: Option<i64>,
    pub canto_pulido: Option<String>,
    pub filo_muerto: Option<String>,
}

impl TargetRow for CambioEtapaRow {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct CambiosEtapa;

#[async_trait]
impl SyncSource for CambiosEtapa {
    type Row = CambioEtapaRow;

    fn descriptor(&self) -> &SourceDescriptor {
        &DESCRIPTOR
    }

    fn transform(&self, raw: &RawRecord) -> Result<CambioEtapaRow, TransformError> {
        let id = compose_id(&[
            key_part(raw, "no_orden_produccion")?,
            key_part(raw, "dec_seq")?,
            key_part(raw, "vip_seq")?,
            key_part(raw, "no_etapa")?,
        ]);

        Ok(CambioEtapaRow {
            id,
            no_orden_produccion: get_i64(raw, "no_orden_produccion"),
            no_cotizacion: get_i64(raw, "no_cotizacion"),
            dec_seq: get_i64(raw, "dec_seq"),
            vip_seq: get_i64(raw, "vip_seq"),
            no_etapa: get_i64(raw, "no_etapa"),
            no_insumo: get_i64(raw, "no_insumo"),
            no_insumo_final: get_i64(raw, "no_insumo_final"),
            usr_modif: get_str(raw, "usr_modif"),
            fec_modif: get_datetime(raw, "fec_modif"),
            status: get_str(raw, "status"),
            no_etapa_actual: get_i64(raw, "no_etapa_actual"),
            no_optimizacion: get_i64(raw, "no_optimizacion"),
            espesor: get_f64(raw, "espesor"),
            base: get_f64(raw, "base"),
            altura: get_f64(raw, "altura"),
            m2: get_f64(raw, "m2"),
            taladros_cot: get_i64(raw, "taladros_cot"),
            canto_pulido: get_str(raw, "canto_pulido"),
            filo_muerto: get_str(raw, "filo_muerto"),
        })
    }

    fn reader(&self, client: Arc<ApexClient>, window: &SyncWindow) -> Box<dyn PageReader> {
        if window.is_bounded() {
            Box::new(OrderFanOut::new(client, window))
        } else {
            let url = client.endpoint_url(DESCRIPTOR.endpoint);
            Box::new(OffsetPager::new(client, url, DESCRIPTOR.page_size))
        }
    }

    async fn write_batch(&self, pool: &SqlitePool, rows: Vec<CambioEtapaRow>) -> Result<usize, WriteError> {
        let pool = pool.clone();
        run_blocking(pool, move |conn| {
            diesel::replace_into(cambios_etapa::table)
                .values(&rows)
                .execute(conn)
        })
        .await
        .map_err(WriteError::from)
    }
}

/// Two-phase reader for bounded windows. Phase one drains the window's
/// change-log feed to collect distinct production orders; phase two
/// pages each order's stage history in turn. Order ids sort ascending
/// so reruns walk the same sequence.
pub struct OrderFanOut {
    client: Arc<ApexClient>,
    log_pager: Option<OffsetPager>,
    orders: BTreeSet<i64>,
    pending: VecDeque<i64>,
    current: Option<OffsetPager>,
}

impl OrderFanOut {
    pub fn new(client: Arc<ApexClient>, window: &SyncWindow) -> Self {
        let log_url = client.collection_url(&log_vidrios_produccion::DESCRIPTOR, window);
        let log_pager = OffsetPager::new(
            Arc::clone(&client),
            log_url,
            log_vidrios_produccion::DESCRIPTOR.page_size,
        );

        Self {
            client,
            log_pager: Some(log_pager),
            orders: BTreeSet::new(),
            pending: VecDeque::new(),
            current: None,
        }
    }

    async fn collect_orders(&mut self) -> Result<(), FetchError> {
        let Some(pager) = self.log_pager.as_mut() else {
            return Ok(());
        };

        while let Some(records) = pager.next_page().await? {
            for record in &records {
                match order_of(record) {
                    Some(order) => {
                        self.orders.insert(order);
                    }
                    None => warn!("change-log record without a production order, skipping"),
                }
            }
        }

        debug!(orders = self.orders.len(), "collected changed production orders");
        self.pending = self.orders.iter().copied().collect();
        self.log_pager = None;
        Ok(())
    }
}

/// Production order of a change-log record. APEX emits upper-cased
/// column names on some endpoints, so both spellings are accepted.
fn order_of(record: &RawRecord) -> Option<i64> {
    get_i64(record, "no_orden_produccion").or_else(|| get_i64(record, "NO_ORDEN_PRODUCCION"))
}

#[async_trait]
impl PageReader for OrderFanOut {
    async fn next_page(&mut self) -> Result<Option<Vec<RawRecord>>, FetchError> {
        self.collect_orders().await?;

        loop {
            if let Some(pager) = self.current.as_mut() {
                if let Some(records) = pager.next_page().await? {
                    return Ok(Some(records));
                }
                self.current = None;
            }

            let Some(order) = self.pending.pop_front() else {
                return Ok(None);
            };

            let period = DESCRIPTOR
                .period_endpoint
                .unwrap_or(DESCRIPTOR.endpoint);
            let url = self.client.endpoint_url(&format!("{period}/{order}"));
            debug!(order, "fetching stage history");
            self.current = Some(OffsetPager::new(
                Arc::clone(&self.client),
                url,
                DESCRIPTOR.page_size,
            ));
        }
    }
}
