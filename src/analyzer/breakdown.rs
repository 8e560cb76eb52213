use crate::model::{DateRange, SalesRecord, StoreBreakdown, VisitRecord};
use crate::utils::parse_day;
use std::collections::BTreeMap;

#[derive(Default)]
struct StoreTotals {
    visitors: u64,
    revenue: f64,
    orders: u64,
}

/// Per-store totals over `range`, busiest store first. Aggregate sales rows
/// carry no store and are left out.
pub fn store_breakdown(
    visits: &[VisitRecord],
    sales: &[SalesRecord],
    range: &DateRange,
) -> Vec<StoreBreakdown> {
    let in_range = |raw: &str| parse_day(raw).is_some_and(|d| range.contains(d));
    let mut totals: BTreeMap<&str, StoreTotals> = BTreeMap::new();

    for visit in visits.iter().filter(|v| in_range(v.date.as_str())) {
        totals.entry(visit.store_id.as_str()).or_default().visitors += visit.visitor_count;
    }
    for sale in sales.iter().filter(|s| in_range(s.date.as_str())) {
        let Some(store_id) = sale.store_id.as_deref() else {
            continue;
        };
        let entry = totals.entry(store_id).or_default();
        entry.revenue += sale.revenue;
        entry.orders += sale.order_count;
    }

    let mut rows: Vec<StoreBreakdown> = totals
        .into_iter()
        .map(|(store_id, t)| StoreBreakdown {
            store_id: store_id.to_string(),
            visitors: t.visitors,
            revenue: t.revenue,
            orders: t.orders,
            conversion_rate: conversion_rate(t.orders, t.visitors),
        })
        .collect();

    rows.sort_by(|a, b| b.visitors.cmp(&a.visitors).then_with(|| a.store_id.cmp(&b.store_id)));
    rows
}

pub fn conversion_rate(orders: u64, visitors: u64) -> f64 {
    if visitors == 0 {
        0.0
    } else {
        orders as f64 / visitors as f64 * 100.0
    }
}
