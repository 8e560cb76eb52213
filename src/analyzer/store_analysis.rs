use crate::analyzer::breakdown::store_breakdown;
use crate::analyzer::period::{compare, compare_metric, periods};
use crate::analyzer::weekday::aggregate_by_weekday;
use crate::analyzer::merge;
use crate::model::{
    ComparisonSummary, DailyMetric, DateRange, Metric, SalesRecord, StoreBreakdown, StoreScope,
    VisitRecord, WeekdayAverage,
};
use chrono::NaiveDate;
use tracing::debug;

/// Trait defining the interface for the store metrics analyzer.
pub trait Analyzer {
    fn merge(
        &self,
        visits: &[VisitRecord],
        sales: &[SalesRecord],
        range: &DateRange,
        scope: &StoreScope,
    ) -> Vec<DailyMetric>;
    fn compare(
        &self,
        series: &[DailyMetric],
        window_days: u32,
        today: NaiveDate,
        metric: Metric,
    ) -> ComparisonSummary;
    fn weekday_averages(&self, series: &[DailyMetric]) -> Vec<WeekdayAverage>;
}

/// Implementation of the store metrics analyzer.
pub struct AnalyzerImpl;

impl AnalyzerImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnalyzerImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for AnalyzerImpl {
    fn merge(
        &self,
        visits: &[VisitRecord],
        sales: &[SalesRecord],
        range: &DateRange,
        scope: &StoreScope,
    ) -> Vec<DailyMetric> {
        merge::merge(visits, sales, range, scope)
    }

    fn compare(
        &self,
        series: &[DailyMetric],
        window_days: u32,
        today: NaiveDate,
        metric: Metric,
    ) -> ComparisonSummary {
        compare_metric(series, window_days, today, metric)
    }

    fn weekday_averages(&self, series: &[DailyMetric]) -> Vec<WeekdayAverage> {
        aggregate_by_weekday(series)
    }
}

/// Structure representing the overall analysis result for one scope and window.
pub struct AnalysisResult {
    /// Fetched range: the current window and the one before it.
    pub range: DateRange,
    /// Merged days of the current window.
    pub series: Vec<DailyMetric>,
    pub visitors: ComparisonSummary,
    pub revenue: ComparisonSummary,
    pub orders: ComparisonSummary,
    /// Weekday averages over `series`.
    pub weekdays: Vec<WeekdayAverage>,
    /// Only filled for the aggregate scope.
    pub breakdown: Option<Vec<StoreBreakdown>>,
}

impl AnalyzerImpl {
    /// Date range a request must fetch: the current window and the previous one.
    pub fn fetch_range(window_days: u32, today: NaiveDate) -> DateRange {
        let (current, previous) = periods(window_days, today);
        if current.is_empty() {
            return current;
        }
        DateRange::new(previous.start, current.end)
    }

    /// Runs every derived view over records already restricted to `scope`.
    pub fn analyze(
        &self,
        visits: &[VisitRecord],
        sales: &[SalesRecord],
        scope: &StoreScope,
        window_days: u32,
        today: NaiveDate,
    ) -> AnalysisResult {
        let range = Self::fetch_range(window_days, today);
        let merged = self.merge(visits, sales, &range, scope);
        debug!(
            "Merged {} of {} days for scope {} over {}",
            merged.len(),
            range.len_days(),
            scope,
            range
        );

        let visitors = compare(&merged, window_days, today);
        let revenue = self.compare(&merged, window_days, today, Metric::Revenue);
        let orders = self.compare(&merged, window_days, today, Metric::Orders);

        let current = visitors.current_period;
        let series: Vec<DailyMetric> = merged
            .into_iter()
            .filter(|m| current.contains(m.date))
            .collect();
        let weekdays = self.weekday_averages(&series);

        let breakdown = match scope {
            StoreScope::All => Some(store_breakdown(visits, sales, &current)),
            StoreScope::Store(_) => None,
        };

        AnalysisResult {
            range,
            series,
            visitors,
            revenue,
            orders,
            weekdays,
            breakdown,
        }
    }
}
