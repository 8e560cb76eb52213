use crate::model::{DailyMetric, WeekdayAverage};
use chrono::Datelike;

#[derive(Default, Clone, Copy)]
struct Bucket {
    days: u32,
    visitors: f64,
    revenue: f64,
    orders: f64,
}

/// Per-weekday averages, always seven entries ordered Sunday..Saturday.
/// Weekdays without observations report zeros.
pub fn aggregate_by_weekday(series: &[DailyMetric]) -> Vec<WeekdayAverage> {
    let mut buckets = [Bucket::default(); 7];

    for metric in series {
        let bucket = &mut buckets[metric.date.weekday().num_days_from_sunday() as usize];
        bucket.days += 1;
        bucket.visitors += metric.visitors as f64;
        bucket.revenue += metric.revenue;
        bucket.orders += metric.orders as f64;
    }

    buckets
        .iter()
        .enumerate()
        .map(|(weekday, b)| {
            let avg = |sum: f64| if b.days == 0 { 0.0 } else { sum / f64::from(b.days) };
            WeekdayAverage {
                weekday: weekday as u8,
                days_counted: b.days,
                average_visitors: avg(b.visitors),
                average_revenue: avg(b.revenue),
                average_orders: avg(b.orders),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn metric(d: u32, visitors: u64) -> DailyMetric {
        DailyMetric {
            date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
            store_id: "all".into(),
            visitors,
            revenue: 0.0,
            orders: 0,
        }
    }

    #[test]
    fn empty_input_gives_seven_zero_entries() {
        let averages = aggregate_by_weekday(&[]);
        assert_eq!(averages.len(), 7);
        for (i, avg) in averages.iter().enumerate() {
            assert_eq!(avg.weekday as usize, i);
            assert_eq!(avg.days_counted, 0);
            assert_eq!(avg.average_visitors, 0.0);
        }
    }

    #[test]
    fn buckets_by_calendar_weekday() {
        // 2024-01-07 and 2024-01-14 are Sundays, 2024-01-01 is a Monday
        let series = vec![metric(7, 100), metric(14, 50), metric(1, 30)];
        let averages = aggregate_by_weekday(&series);

        assert_eq!(averages.len(), 7);
        assert_eq!(averages[0].days_counted, 2);
        assert_eq!(averages[0].average_visitors, 75.0);
        assert_eq!(averages[1].average_visitors, 30.0);
        assert_eq!(averages[6].average_visitors, 0.0);
    }

    #[test]
    fn averages_revenue_and_orders_too() {
        let mut a = metric(6, 10);
        a.revenue = 100.0;
        a.orders = 2;
        let mut b = metric(13, 20);
        b.revenue = 300.0;
        b.orders = 5;
        let saturday = &aggregate_by_weekday(&[a, b])[6];
        assert_eq!(saturday.average_visitors, 15.0);
        assert_eq!(saturday.average_revenue, 200.0);
        assert_eq!(saturday.average_orders, 3.5);
    }
}
