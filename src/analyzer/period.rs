use crate::model::{ComparisonSummary, DailyMetric, DateRange, Metric};
use crate::utils::percent_change;
use chrono::{Days, NaiveDate};

/// The `window_days` days ending at `today`, and the same number of days
/// immediately before them.
pub fn periods(window_days: u32, today: NaiveDate) -> (DateRange, DateRange) {
    let current = DateRange::ending_at(today, window_days);
    let previous_end = today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MIN);
    let previous = DateRange::ending_at(previous_end, window_days);
    (current, previous)
}

/// Visitor totals for the current window vs. the preceding one.
pub fn compare(series: &[DailyMetric], window_days: u32, today: NaiveDate) -> ComparisonSummary {
    compare_metric(series, window_days, today, Metric::Visitors)
}

pub fn compare_metric(
    series: &[DailyMetric],
    window_days: u32,
    today: NaiveDate,
    metric: Metric,
) -> ComparisonSummary {
    let (current_period, previous_period) = periods(window_days, today);
    let current_total = total_within(series, &current_period, metric);
    let previous_total = total_within(series, &previous_period, metric);

    ComparisonSummary {
        metric,
        current_total,
        previous_total,
        change: current_total - previous_total,
        change_percent: percent_change(previous_total, current_total),
        current_period,
        previous_period,
    }
}

fn total_within(series: &[DailyMetric], range: &DateRange, metric: Metric) -> f64 {
    series
        .iter()
        .filter(|m| range.contains(m.date))
        .map(|m| m.value(metric))
        .sum()
}
