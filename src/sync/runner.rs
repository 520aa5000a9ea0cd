//! Multi-source run sequencing.
//!
//! Sources run one at a time, master data before the transactional and
//! log feeds that reference it. A failed source is reported and the run
//! moves on; partial replication beats none.

use tracing::{error, info};

use super::orchestrator::{sync_source, SyncContext};
use crate::models::{SyncRequest, SyncResult};
use crate::sources::{
    cambios_etapa::CambiosEtapa, clientes::Clientes, cotizaciones::Cotizaciones,
    detalle_cotizacion::DetalleCotizacion, log_vidrios_produccion::LogVidriosProduccion,
    proyectos_cliente::ProyectosCliente, v_insumos::VInsumos,
    vidrios_produccion::VidriosProduccion,
};

pub struct Runner {
    ctx: SyncContext,
}

impl Runner {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// Run every source in dependency order.
    pub async fn run_all(&self, request: &SyncRequest) -> Vec<SyncResult> {
        let mut results = Vec::with_capacity(8);

        info!("phase 1: master catalogs");
        results.push(sync_source(&self.ctx, &Clientes, request).await);
        results.push(sync_source(&self.ctx, &ProyectosCliente, request).await);
        results.push(sync_source(&self.ctx, &VInsumos, request).await);

        info!("phase 2: quotations");
        results.push(sync_source(&self.ctx, &Cotizaciones, request).await);
        results.push(sync_source(&self.ctx, &DetalleCotizacion, request).await);

        info!("phase 3: production");
        results.push(sync_source(&self.ctx, &VidriosProduccion, request).await);

        info!("phase 4: change logs");
        results.push(sync_source(&self.ctx, &LogVidriosProduccion, request).await);
        results.push(sync_source(&self.ctx, &CambiosEtapa, request).await);

        log_summary(&results);
        results
    }

    /// Run a single source by name.
    pub async fn run_one(&self, name: &str, request: &SyncRequest) -> Option<SyncResult> {
        let result = match name {
            "clientes" => sync_source(&self.ctx, &Clientes, request).await,
            "proyectos_cliente" => sync_source(&self.ctx, &ProyectosCliente, request).await,
            "v_insumos" => sync_source(&self.ctx, &VInsumos, request).await,
            "cotizaciones" => sync_source(&self.ctx, &Cotizaciones, request).await,
            "detalle_cotizacion" => sync_source(&self.ctx, &DetalleCotizacion, request).await,
            "vidrios_produccion" => sync_source(&self.ctx, &VidriosProduccion, request).await,
            "log_vidrios_produccion" => sync_source(&self.ctx, &LogVidriosProduccion, request).await,
            "cambios_etapa" => sync_source(&self.ctx, &CambiosEtapa, request).await,
            _ => return None,
        };
        Some(result)
    }
}

/// Whether any source in the run failed.
pub fn any_failed(results: &[SyncResult]) -> bool {
    results.iter().any(|r| !r.success())
}

fn log_summary(results: &[SyncResult]) {
    let fetched: u64 = results.iter().map(|r| r.fetched).sum();
    let written: u64 = results.iter().map(|r| r.written).sum();
    let skipped: u64 = results.iter().map(|r| r.skipped).sum();
    let elapsed: f64 = results.iter().map(|r| r.duration.as_secs_f64()).sum();
    let rows_per_sec = if elapsed > 0.0 {
        written as f64 / elapsed
    } else {
        0.0
    };
    let failed: Vec<&str> = results
        .iter()
        .filter(|r| !r.success())
        .map(|r| r.source.as_str())
        .collect();

    info!(
        sources = results.len(),
        fetched,
        written,
        skipped,
        elapsed_secs = elapsed,
        rows_per_sec,
        "run finished"
    );
    if !failed.is_empty() {
        error!(failed = %failed.join(", "), "some sources failed");
    }
}
