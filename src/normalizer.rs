use crate::model::{DateRange, SalesRecord, StoreScope, VisitRecord};
use crate::utils::parse_day;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SalesTotals {
    pub revenue: f64,
    pub orders: u64,
}

impl SalesTotals {
    fn add(&mut self, record: &SalesRecord) {
        self.revenue += record.revenue;
        self.orders += record.order_count;
    }
}

/// Visitor counts per normalized day for the given scope and range.
/// Repeated rows for the same key are summed.
pub fn normalize_visits(
    visits: &[VisitRecord],
    range: &DateRange,
    scope: &StoreScope,
) -> BTreeMap<NaiveDate, u64> {
    let mut days = BTreeMap::new();
    if range.is_empty() {
        return days;
    }

    for record in visits {
        if !in_scope(Some(&record.store_id), scope) {
            continue;
        }
        let Some(date) = day_in_range(&record.date, range, "visit") else {
            continue;
        };
        *days.entry(date).or_insert(0) += record.visitor_count;
    }

    days
}

/// Sales totals per normalized day for the given scope and range.
///
/// Under the aggregate scope, a day that carries all-stores rows is taken from
/// those rows alone; per-store rows for that day would count the same sales
/// twice. Under a store scope, all-stores rows are ignored.
pub fn normalize_sales(
    sales: &[SalesRecord],
    range: &DateRange,
    scope: &StoreScope,
) -> BTreeMap<NaiveDate, SalesTotals> {
    let mut per_store: BTreeMap<NaiveDate, SalesTotals> = BTreeMap::new();
    let mut aggregate: BTreeMap<NaiveDate, SalesTotals> = BTreeMap::new();
    if range.is_empty() {
        return per_store;
    }

    for record in sales {
        if !in_scope(record.store_id.as_deref(), scope) {
            continue;
        }
        let Some(date) = day_in_range(&record.date, range, "sales") else {
            continue;
        };
        let target = if record.store_id.is_some() {
            &mut per_store
        } else {
            &mut aggregate
        };
        target.entry(date).or_default().add(record);
    }

    per_store.extend(aggregate);
    per_store
}

fn in_scope(store_id: Option<&str>, scope: &StoreScope) -> bool {
    match scope {
        StoreScope::All => true,
        StoreScope::Store(id) => store_id == Some(id.as_str()),
    }
}

fn day_in_range(raw: &str, range: &DateRange, source: &str) -> Option<NaiveDate> {
    match parse_day(raw) {
        Some(date) if range.contains(date) => Some(date),
        Some(_) => None,
        None => {
            warn!("Skipping {} record with unparseable date '{}'", source, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn jan() -> DateRange {
        DateRange::new(day(1), day(31))
    }

    fn visit(store: &str, date: &str, count: u64) -> VisitRecord {
        VisitRecord {
            store_id: store.into(),
            date: date.into(),
            visitor_count: count,
            sales_count: None,
            revenue: None,
        }
    }

    fn sale(store: Option<&str>, date: &str, revenue: f64, orders: u64) -> SalesRecord {
        SalesRecord {
            store_id: store.map(Into::into),
            date: date.into(),
            revenue,
            order_count: orders,
        }
    }

    #[test]
    fn duplicate_visit_rows_are_summed() {
        let visits = vec![
            visit("s1", "2024-01-05", 10),
            visit("s1", "2024-01-05T18:00:00", 5),
        ];
        let days = normalize_visits(&visits, &jan(), &StoreScope::All);
        assert_eq!(days.get(&day(5)), Some(&15));
    }

    #[test]
    fn store_scope_drops_other_stores_and_aggregate_sales() {
        let scope = StoreScope::Store("s1".into());
        let visits = vec![visit("s1", "2024-01-05", 10), visit("s2", "2024-01-05", 99)];
        let sales = vec![
            sale(Some("s1"), "2024-01-05", 100.0, 1),
            sale(None, "2024-01-05", 900.0, 9),
        ];

        assert_eq!(normalize_visits(&visits, &jan(), &scope).get(&day(5)), Some(&10));
        let totals = normalize_sales(&sales, &jan(), &scope);
        assert_eq!(totals.get(&day(5)), Some(&SalesTotals { revenue: 100.0, orders: 1 }));
    }

    #[test]
    fn aggregate_sales_rows_replace_per_store_rows_for_their_day() {
        let sales = vec![
            sale(Some("s1"), "2024-01-05", 100.0, 1),
            sale(Some("s2"), "2024-01-05", 50.0, 1),
            sale(None, "2024-01-05", 175.0, 3),
            sale(Some("s1"), "2024-01-06", 40.0, 1),
            sale(Some("s2"), "2024-01-06", 60.0, 2),
        ];
        let totals = normalize_sales(&sales, &jan(), &StoreScope::All);
        assert_eq!(totals.get(&day(5)), Some(&SalesTotals { revenue: 175.0, orders: 3 }));
        assert_eq!(totals.get(&day(6)), Some(&SalesTotals { revenue: 100.0, orders: 3 }));
    }

    #[test]
    fn out_of_range_and_unparseable_rows_are_skipped() {
        let visits = vec![
            visit("s1", "2023-12-31", 10),
            visit("s1", "not a date", 10),
            visit("s1", "2024-01-31", 7),
        ];
        let days = normalize_visits(&visits, &jan(), &StoreScope::All);
        assert_eq!(days.len(), 1);
        assert_eq!(days.get(&day(31)), Some(&7));
    }

    #[test]
    fn inverted_range_yields_nothing() {
        let range = DateRange::new(day(10), day(1));
        let visits = vec![visit("s1", "2024-01-05", 10)];
        let sales = vec![sale(Some("s1"), "2024-01-05", 1.0, 1)];
        assert!(normalize_visits(&visits, &range, &StoreScope::All).is_empty());
        assert!(normalize_sales(&sales, &range, &StoreScope::All).is_empty());
    }
}
