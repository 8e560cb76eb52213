use crate::analyzer::AnalyzerImpl;
use crate::config::DEFAULT_WINDOW_DAYS;
use crate::model::{
    AnalyticsError, AnalyticsReport, DateRange, ReportRequest, SalesRecord, SourceError,
    SourceStatus, SourcesReport, StoreScope, VisitRecord, WeekdayReport,
};
use crate::scope::resolve_scope;
use crate::source::{SalesSource, VisitSource};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Runs the fetch, merge and derive pipeline for one request at a time.
/// Holds no per-request state, so concurrent calls need no locking here.
pub struct AnalyticsService {
    visits: Arc<dyn VisitSource>,
    sales: Arc<dyn SalesSource>,
    analyzer: AnalyzerImpl,
    source_timeout: Duration,
    default_window_days: u32,
    max_window_days: Option<u32>,
}

/// Records of both sources for one scope and range, with their fetch status.
struct Fetched {
    visits: Vec<VisitRecord>,
    sales: Vec<SalesRecord>,
    sources: SourcesReport,
}

impl AnalyticsService {
    pub fn new(visits: Arc<dyn VisitSource>, sales: Arc<dyn SalesSource>) -> Self {
        Self {
            visits,
            sales,
            analyzer: AnalyzerImpl::new(),
            source_timeout: Duration::from_secs(10),
            default_window_days: DEFAULT_WINDOW_DAYS,
            max_window_days: None,
        }
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn with_windows(mut self, default_days: u32, max_days: Option<u32>) -> Self {
        self.default_window_days = default_days;
        self.max_window_days = max_days;
        self
    }

    /// Report and weekday view for one request, derived from a single fetch
    /// and merge so both views see the same records.
    pub async fn build_views(
        &self,
        request: &ReportRequest,
        known_stores: &HashSet<String>,
        today: NaiveDate,
    ) -> Result<(AnalyticsReport, WeekdayReport), AnalyticsError> {
        let scope = resolve_scope(request.store_id.as_deref(), known_stores)?;
        let window_days = self.window_days(request.days)?;
        let range = AnalyzerImpl::fetch_range(window_days, today);

        info!("Building views for scope {} ({} days, {})", scope, window_days, range);
        let fetched = self.fetch(&scope, &range).await;
        let result = self
            .analyzer
            .analyze(&fetched.visits, &fetched.sales, &scope, window_days, today);

        let weekdays = WeekdayReport {
            scope: scope.clone(),
            window_days,
            reference_date: today,
            averages: result.weekdays,
            sources: fetched.sources.clone(),
        };
        let report = AnalyticsReport {
            scope,
            window_days,
            reference_date: today,
            range: result.range,
            series: result.series,
            comparison: result.visitors,
            revenue_comparison: result.revenue,
            orders_comparison: result.orders,
            store_breakdown: result.breakdown,
            sources: fetched.sources,
        };
        Ok((report, weekdays))
    }

    fn window_days(&self, requested: Option<i64>) -> Result<u32, AnalyticsError> {
        let Some(days) = requested else {
            return Ok(self.default_window_days);
        };
        if days < 1 {
            return Err(AnalyticsError::InvalidWindow(days));
        }
        let max = self.max_window_days.unwrap_or(u32::MAX);
        match u32::try_from(days) {
            Ok(d) if d <= max => Ok(d),
            _ => Err(AnalyticsError::WindowTooLong {
                requested: days,
                max,
            }),
        }
    }

    /// Fetches both sources concurrently. A failed or slow source contributes
    /// no records instead of failing the request.
    async fn fetch(&self, scope: &StoreScope, range: &DateRange) -> Fetched {
        let (visits, sales) = tokio::join!(
            fetch_or_empty("visits", self.source_timeout, self.visits.visit_counts(scope, range)),
            fetch_or_empty("sales", self.source_timeout, self.sales.sales_counts(scope, range)),
        );

        Fetched {
            sources: SourcesReport {
                visits: visits.1,
                sales: sales.1,
            },
            visits: visits.0,
            sales: sales.0,
        }
    }
}

async fn fetch_or_empty<T, F>(source: &str, timeout: Duration, fut: F) -> (Vec<T>, SourceStatus)
where
    F: Future<Output = Result<Vec<T>, SourceError>>,
{
    let outcome = match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout),
    };

    match outcome {
        Ok(records) => {
            info!("Fetched {} {} records", records.len(), source);
            (records, SourceStatus::Ok)
        }
        Err(e) => {
            warn!("{} source unavailable, treating as empty: {}", source, e);
            (Vec::new(), SourceStatus::Unavailable)
        }
    }
}
