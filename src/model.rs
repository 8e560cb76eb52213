// Core structs: raw source records, merged metrics, derived views, errors
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key used for the aggregate scope in merged output.
pub const ALL_STORES: &str = "all";

/// One day of foot traffic for one store, as written by the counter sync job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub store_id: String,
    pub date: String,
    pub visitor_count: u64,
    pub sales_count: Option<u64>,
    pub revenue: Option<f64>,
}

/// One day of point-of-sale totals from the ERP. `store_id = None` marks an
/// all-stores aggregate row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    #[serde(default)]
    pub store_id: Option<String>,
    pub date: String,
    pub revenue: f64,
    pub order_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMetric {
    pub date: NaiveDate,
    pub store_id: String,
    pub visitors: u64,
    pub revenue: f64,
    pub orders: u64,
}

impl DailyMetric {
    pub fn empty(date: NaiveDate, store_id: &str) -> Self {
        Self {
            date,
            store_id: store_id.to_string(),
            visitors: 0,
            revenue: 0.0,
            orders: 0,
        }
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Visitors => self.visitors as f64,
            Metric::Revenue => self.revenue,
            Metric::Orders => self.orders as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Visitors,
    Revenue,
    Orders,
}

/// Inclusive span of calendar days. `end < start` means "no days".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` calendar days ending at `end` (inclusive).
    pub fn ending_at(end: NaiveDate, days: u32) -> Self {
        if days == 0 {
            let start = end.checked_add_days(Days::new(1)).unwrap_or(end);
            return Self { start, end };
        }
        let start = end
            .checked_sub_days(Days::new(u64::from(days) - 1))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        !self.is_empty() && date >= self.start && date <= self.end
    }

    pub fn len_days(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() as u64 + 1
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreScope {
    All,
    Store(String),
}

impl StoreScope {
    /// Key written into `DailyMetric::store_id` for this scope.
    pub fn key(&self) -> &str {
        match self {
            StoreScope::All => ALL_STORES,
            StoreScope::Store(id) => id,
        }
    }

    pub fn store_id(&self) -> Option<&str> {
        match self {
            StoreScope::All => None,
            StoreScope::Store(id) => Some(id),
        }
    }
}

impl fmt::Display for StoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for StoreScope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub metric: Metric,
    pub current_total: f64,
    pub previous_total: f64,
    pub change: f64,
    pub change_percent: f64,
    pub current_period: DateRange,
    pub previous_period: DateRange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAverage {
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u8,
    pub days_counted: u32,
    pub average_visitors: f64,
    pub average_revenue: f64,
    pub average_orders: f64,
}

/// Current-window totals for one store, listed under the aggregate scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreBreakdown {
    pub store_id: String,
    pub visitors: u64,
    pub revenue: f64,
    pub orders: u64,
    /// Orders per 100 visitors; 0 when no visitors were counted.
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Ok,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcesReport {
    pub visits: SourceStatus,
    pub sales: SourceStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub scope: StoreScope,
    pub window_days: u32,
    pub reference_date: NaiveDate,
    pub range: DateRange,
    pub series: Vec<DailyMetric>,
    pub comparison: ComparisonSummary,
    pub revenue_comparison: ComparisonSummary,
    pub orders_comparison: ComparisonSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_breakdown: Option<Vec<StoreBreakdown>>,
    pub sources: SourcesReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayReport {
    pub scope: StoreScope,
    pub window_days: u32,
    pub reference_date: NaiveDate,
    pub averages: Vec<WeekdayAverage>,
    pub sources: SourcesReport,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub store_id: Option<String>,
    #[serde(default)]
    pub days: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("http error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("invalid response: HTTP {0}")]
    InvalidResponse(u16),
    #[error("source timed out")]
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    #[error("store not found: {0}")]
    NotFound(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error(transparent)]
    Scope(#[from] ScopeError),
    #[error("window must be a positive number of days, got {0}")]
    InvalidWindow(i64),
    #[error("window of {requested} days exceeds the deployment limit of {max} days")]
    WindowTooLong { requested: i64, max: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid reference_date: {0}")]
    InvalidReferenceDate(String),
}
