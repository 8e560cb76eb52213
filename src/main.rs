mod analyzer;
mod config;
mod model;
mod normalizer;
mod report;
mod scope;
mod source;
mod storage;
mod utils;


use config::{load_config, AppConfig};
use futures::future::join_all;
use model::{ReportRequest, StoreScope};
use report::AnalyticsService;
use serde::Serialize;
use source::{ErpSalesClient, SalesSource, SqliteSource};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use storage::SqliteStorage;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let storage = match SqliteStorage::new(&config.database_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to open database {}: {}", config.database_path, e);
            return;
        }
    };

    let sqlite_source = Arc::new(SqliteSource::new(storage.clone()));
    let sales: Arc<dyn SalesSource> = match &config.erp {
        Some(erp_cfg) => match ErpSalesClient::new(erp_cfg, config.source_timeout()) {
            Ok(client) => {
                info!("Reading sales from ERP at {}", erp_cfg.base_url);
                Arc::new(client)
            }
            Err(e) => {
                error!("Failed to create ERP client: {}", e);
                return;
            }
        },
        None => sqlite_source.clone(),
    };

    let service = AnalyticsService::new(sqlite_source, sales)
        .with_source_timeout(config.source_timeout())
        .with_windows(config.default_window_days, config.max_window_days);

    loop {
        run_reports(&service, &storage, &config).await;

        let Some(interval) = config.refresh_interval_seconds else {
            break;
        };
        info!("Waiting {}s for the next refresh (Ctrl-C to stop)...", interval);
        tokio::select! {
            _ = sleep(Duration::from_secs(interval)) => {
                info!("Timer triggered.");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down.");
                break;
            }
        }
    }
}

/// Builds every configured report concurrently and emits them.
async fn run_reports(
    service: &AnalyticsService,
    storage: &Arc<Mutex<SqliteStorage>>,
    config: &AppConfig,
) {
    let known_stores = match storage.lock().await.known_stores() {
        Ok(stores) => stores,
        Err(e) => {
            warn!("Failed to load store list, only 'all' will resolve: {}", e);
            HashSet::new()
        }
    };

    let today = match config.reference_date_or(chrono::Local::now().date_naive()) {
        Ok(d) => d,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    let requests = config.report_requests();
    info!("Reports to build: {} (reference date {})", requests.len(), today);

    let tasks: Vec<_> = requests
        .iter()
        .map(|request| process_request(service, request, &known_stores, today, config))
        .collect();
    join_all(tasks).await;
}

async fn process_request(
    service: &AnalyticsService,
    request: &ReportRequest,
    known_stores: &HashSet<String>,
    today: chrono::NaiveDate,
    config: &AppConfig,
) {
    let label = request.store_id.as_deref().unwrap_or(model::ALL_STORES);

    let (report, weekdays) = match service.build_views(request, known_stores, today).await {
        Ok(views) => views,
        Err(e) => {
            warn!("Skipping report for '{}': {}", label, e);
            return;
        }
    };

    info!(
        "{}: {} visitors over {} days ({:+.1}% vs previous)",
        report.scope,
        report.comparison.current_total,
        report.window_days,
        report.comparison.change_percent
    );

    emit(config, &report.scope, report.window_days, "report", &report);
    emit(config, &weekdays.scope, weekdays.window_days, "weekdays", &weekdays);
}

/// Writes the view as JSON into the output directory, or prints it.
fn emit<T: Serialize>(config: &AppConfig, scope: &StoreScope, days: u32, kind: &str, value: &T) {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize {} for {}: {}", kind, scope, e);
            return;
        }
    };

    let Some(dir) = &config.output_dir else {
        println!("{}", json);
        return;
    };

    let folder = Path::new(dir);
    if let Err(e) = fs::create_dir_all(folder) {
        warn!("Failed to create output folder: {}", e);
        return;
    }
    let filename = folder.join(format!("{}-{}-{}d.json", kind, scope.key().replace(' ', "_"), days));
    if let Err(e) = fs::write(&filename, json) {
        warn!("Failed to write {}: {}", filename.display(), e);
    } else {
        info!("Saved {}", filename.display());
    }
}
