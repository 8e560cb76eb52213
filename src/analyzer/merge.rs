use crate::model::{DailyMetric, DateRange, SalesRecord, StoreScope, VisitRecord};
use crate::normalizer::{normalize_sales, normalize_visits};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Full outer join of visits and sales on the normalized day.
///
/// Every day attested by at least one source within `range` appears exactly
/// once, ascending; the side without data reports zeros. Days attested by
/// neither source are not synthesized.
pub fn merge(
    visits: &[VisitRecord],
    sales: &[SalesRecord],
    range: &DateRange,
    scope: &StoreScope,
) -> Vec<DailyMetric> {
    if range.is_empty() {
        return Vec::new();
    }

    let visit_days = normalize_visits(visits, range, scope);
    let sales_days = normalize_sales(sales, range, scope);
    let key = scope.key();

    let mut merged: BTreeMap<NaiveDate, DailyMetric> = BTreeMap::new();
    for (date, visitors) in visit_days {
        merged.entry(date).or_insert_with(|| DailyMetric::empty(date, key)).visitors = visitors;
    }
    for (date, totals) in sales_days {
        let metric = merged.entry(date).or_insert_with(|| DailyMetric::empty(date, key));
        metric.revenue = totals.revenue;
        metric.orders = totals.orders;
    }

    merged.into_values().collect()
}
