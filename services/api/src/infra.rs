use chrono::NaiveDate;
use debt_insight::assessment::sessions::{AssessmentService, InMemorySessionStore};
use debt_insight::assessment::Catalogue;
use debt_insight::config::AppConfig;
use debt_insight::error::AppError;
use debt_insight::export::ReportExporter;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type SharedService = Arc<AssessmentService<InMemorySessionStore>>;

/// Apply a `--data-dir` override and load the catalogue. A missing file is fatal.
pub(crate) fn load_catalogue(
    config: &mut AppConfig,
    data_dir: Option<PathBuf>,
) -> Result<Arc<Catalogue>, AppError> {
    if let Some(data_dir) = data_dir {
        config.catalogue.data_dir = data_dir;
    }
    Ok(Arc::new(Catalogue::load(&config.catalogue.data_dir)?))
}

pub(crate) fn build_service(
    config: &AppConfig,
    catalogue: Arc<Catalogue>,
) -> Result<SharedService, AppError> {
    let exporter = ReportExporter::new(config.export)?;
    let store = match config.sessions.idle_ttl() {
        Some(idle_ttl) => InMemorySessionStore::with_idle_ttl(idle_ttl),
        None => InMemorySessionStore::default(),
    };
    Ok(Arc::new(AssessmentService::new(
        catalogue,
        config.catalogue.policy,
        Arc::new(store),
        exporter,
    )))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(
            parse_date(" 2026-10-18 "),
            Ok(NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date"))
        );
    }

    #[test]
    fn parse_date_names_the_bad_input() {
        let err = parse_date("18/10/2026").expect_err("rejects");
        assert!(err.contains("18/10/2026"));
    }
}
