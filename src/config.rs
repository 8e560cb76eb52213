use crate::model::{ConfigError, ReportRequest};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::time::Duration;

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct ErpConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_path: String,
    #[serde(default = "default_window_days")]
    pub default_window_days: u32,
    /// Optional deployment cap on `days`; unlimited when absent.
    #[serde(default)]
    pub max_window_days: Option<u32>,
    #[serde(default = "default_source_timeout_seconds")]
    pub source_timeout_seconds: u64,
    /// Fixed "today" for reproducible reports, `YYYY-MM-DD`.
    #[serde(default)]
    pub reference_date: Option<String>,
    #[serde(default)]
    pub reports: Vec<ReportRequest>,
    #[serde(default)]
    pub erp: Option<ErpConfig>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub refresh_interval_seconds: Option<u64>,
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

fn default_source_timeout_seconds() -> u64 {
    10
}

impl AppConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source_timeout_seconds)
    }

    /// The configured reference date, or `today` when none is set.
    pub fn reference_date_or(&self, today: NaiveDate) -> Result<NaiveDate, ConfigError> {
        match &self.reference_date {
            Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| ConfigError::InvalidReferenceDate(s.clone())),
            None => Ok(today),
        }
    }

    /// Reports to produce; a single all-stores report when none are configured.
    pub fn report_requests(&self) -> Vec<ReportRequest> {
        if self.reports.is_empty() {
            vec![ReportRequest::default()]
        } else {
            self.reports.clone()
        }
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let file = write_config(r#"{ "database_path": "pulse.db" }"#);
        let cfg = load_config(file.path().to_str().unwrap()).unwrap();

        assert_eq!(cfg.default_window_days, 30);
        assert_eq!(cfg.max_window_days, None);
        assert_eq!(cfg.source_timeout(), Duration::from_secs(10));
        assert!(cfg.erp.is_none());
        let requests = cfg.report_requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].store_id.is_none());
        assert!(requests[0].days.is_none());
    }

    #[test]
    fn full_config_parses() {
        let file = write_config(
            r#"{
                "database_path": "pulse.db",
                "default_window_days": 14,
                "max_window_days": 365,
                "reference_date": "2024-03-01",
                "reports": [{ "store_id": "store-1", "days": 7 }, { "store_id": "all" }],
                "erp": { "base_url": "https://erp.example/api", "api_key": "k" },
                "output_dir": "reports",
                "refresh_interval_seconds": 3600
            }"#,
        );
        let cfg = load_config(file.path().to_str().unwrap()).unwrap();

        assert_eq!(cfg.default_window_days, 14);
        assert_eq!(cfg.max_window_days, Some(365));
        assert_eq!(cfg.reports.len(), 2);
        assert_eq!(cfg.reports[0].days, Some(7));
        assert_eq!(cfg.erp.as_ref().map(|e| e.api_key.as_deref()), Some(Some("k")));
        let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert_eq!(
            cfg.reference_date_or(today).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn bad_reference_date_is_rejected() {
        let file = write_config(r#"{ "database_path": "x", "reference_date": "March" }"#);
        let cfg = load_config(file.path().to_str().unwrap()).unwrap();
        let today = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(matches!(
            cfg.reference_date_or(today),
            Err(ConfigError::InvalidReferenceDate(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(load_config("/nonexistent/pulse.json"), Err(ConfigError::Io(_))));
    }
}
