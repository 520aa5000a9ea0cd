//! Window resolution: decide how much history a run must cover.

use chrono::{Days, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::models::{SourceDescriptor, SyncMode, SyncRequest, SyncWindow};

/// Resolve the extraction window for one source.
///
/// Precedence: an explicit date range wins over everything, then a
/// forced full run, then the endpoint's own capabilities, then stored
/// state. Incremental runs lower-bound at the stored high-water mark
/// exactly; re-reading the boundary timestamp is intended, the upsert
/// absorbs it.
pub fn resolve(
    desc: &SourceDescriptor,
    last_modified: Option<NaiveDateTime>,
    request: &SyncRequest,
    today: NaiveDate,
) -> SyncWindow {
    if let Some(desde) = request.desde {
        let hasta = request.hasta.unwrap_or(today);
        return SyncWindow {
            mode: SyncMode::Manual,
            desde: Some(start_of(desde)),
            hasta: Some(start_of(hasta)),
        };
    }

    if request.force_full || !desc.supports_time_filter() {
        return SyncWindow::full(SyncMode::Full);
    }

    match last_modified {
        Some(mark) => SyncWindow {
            mode: SyncMode::Incremental,
            desde: Some(mark),
            hasta: Some(start_of(today)),
        },
        None => {
            let lookback = request.lookback_days.unwrap_or(desc.lookback_days);
            let desde = today
                .checked_sub_days(Days::new(u64::from(lookback)))
                .unwrap_or(today);
            debug!(source = desc.name, lookback, "no prior state, using lookback window");
            SyncWindow {
                mode: SyncMode::FirstRun,
                desde: Some(start_of(desde)),
                hasta: Some(start_of(today)),
            }
        }
    }
}

fn start_of(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESC: SourceDescriptor = SourceDescriptor {
        name: "filtered",
        endpoint: "filtered",
        period_endpoint: Some("periodo/filtered"),
        table: "filtered",
        key_fields: &["id"],
        page_size: 1000,
        lookback_days: 30,
    };

    const UNFILTERED: SourceDescriptor = SourceDescriptor {
        name: "catalog",
        endpoint: "catalog",
        period_endpoint: None,
        table: "catalog",
        key_fields: &["id"],
        page_size: 1000,
        lookback_days: 30,
    };

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn datetime(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn explicit_range_forces_manual_mode() {
        let request = SyncRequest {
            desde: Some(date("2026-01-01")),
            hasta: Some(date("2026-01-15")),
            ..Default::default()
        };
        let w = resolve(&DESC, Some(datetime("2026-02-01 10:00:00")), &request, date("2026-08-26"));
        assert_eq!(w.mode, SyncMode::Manual);
        assert_eq!(w.desde, Some(datetime("2026-01-01 00:00:00")));
        assert_eq!(w.hasta, Some(datetime("2026-01-15 00:00:00")));
    }

    #[test]
    fn explicit_lower_bound_defaults_upper_bound_to_today() {
        let request = SyncRequest {
            desde: Some(date("2026-08-20")),
            ..Default::default()
        };
        let w = resolve(&DESC, None, &request, date("2026-08-26"));
        assert_eq!(w.mode, SyncMode::Manual);
        assert_eq!(w.hasta, Some(datetime("2026-08-26 00:00:00")));
    }

    #[test]
    fn forced_full_ignores_stored_state() {
        let request = SyncRequest {
            force_full: true,
            ..Default::default()
        };
        let w = resolve(&DESC, Some(datetime("2026-02-01 10:00:00")), &request, date("2026-08-26"));
        assert_eq!(w.mode, SyncMode::Full);
        assert!(!w.is_bounded());
    }

    #[test]
    fn unfiltered_endpoint_is_always_full() {
        let w = resolve(
            &UNFILTERED,
            Some(datetime("2026-02-01 10:00:00")),
            &SyncRequest::default(),
            date("2026-08-26"),
        );
        assert_eq!(w.mode, SyncMode::Full);
        assert!(!w.is_bounded());
    }

    #[test]
    fn stored_state_yields_incremental_from_the_exact_mark() {
        let mark = datetime("2026-08-20 14:32:05");
        let w = resolve(&DESC, Some(mark), &SyncRequest::default(), date("2026-08-26"));
        assert_eq!(w.mode, SyncMode::Incremental);
        assert_eq!(w.desde, Some(mark));
        assert_eq!(w.hasta, Some(datetime("2026-08-26 00:00:00")));
    }

    #[test]
    fn no_state_falls_back_to_the_lookback_window() {
        let w = resolve(&DESC, None, &SyncRequest::default(), date("2026-08-26"));
        assert_eq!(w.mode, SyncMode::FirstRun);
        assert_eq!(w.desde, Some(datetime("2026-07-27 00:00:00")));
        assert_eq!(w.hasta, Some(datetime("2026-08-26 00:00:00")));
    }

    #[test]
    fn lookback_override_narrows_the_first_run() {
        let request = SyncRequest {
            lookback_days: Some(7),
            ..Default::default()
        };
        let w = resolve(&DESC, None, &request, date("2026-08-26"));
        assert_eq!(w.desde, Some(datetime("2026-08-19 00:00:00")));
    }
}
