//! In-memory `SalesStore` used by the unit tests. It evaluates a
//! `TimeSeriesQuery` the same way the Postgres query does: UTC truncation with
//! Monday weeks, membership fan-out, averages rounded to two places and
//! newest-window-first ordering.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use bigdecimal::{BigDecimal, RoundingMode};
use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Utc};

use crate::sales_time_series::db_types::{Granularity, GroupBy, TimeSeriesRow};
use crate::sales_time_series::sql_queries::{SalesFilter, TimeSeriesQuery};
use crate::sales_time_series::store::SalesStore;

struct User {
    id: i32,
    name: String,
    role: String,
}

struct Group {
    id: i32,
    name: String,
}

struct Sale {
    user_id: i32,
    amount: i64,
    sold_at: DateTime<Utc>,
}

#[derive(Default)]
pub struct MemoryStore {
    users: Vec<User>,
    groups: Vec<Group>,
    memberships: Vec<(i32, i32)>,
    sales: Vec<Sale>,
    queries: AtomicUsize,
}

struct Accumulator {
    name: String,
    role: Option<String>,
    count: i64,
    sum: i64,
    min: i64,
    max: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: i32, name: &str, role: &str) -> Self {
        self.users.push(User {
            id,
            name: name.to_string(),
            role: role.to_string(),
        });
        self
    }

    pub fn with_group(mut self, id: i32, name: &str) -> Self {
        self.groups.push(Group {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_membership(mut self, user_id: i32, group_id: i32) -> Self {
        self.memberships.push((user_id, group_id));
        self
    }

    pub fn with_sale(mut self, user_id: i32, amount: i64, sold_at: DateTime<Utc>) -> Self {
        self.sales.push(Sale {
            user_id,
            amount,
            sold_at,
        });
        self
    }

    /// Three users over two groups (Carol is in both) with sales spread over
    /// the first quarter of 2021.
    pub fn sample() -> Self {
        let day = |m: u32, d: u32, h: u32| Utc.with_ymd_and_hms(2021, m, d, h, 0, 0).unwrap();

        Self::new()
            .with_user(1, "Alice", "manager")
            .with_user(2, "Bob", "associate")
            .with_user(3, "Carol", "associate")
            .with_group(10, "North")
            .with_group(20, "South")
            .with_membership(1, 10)
            .with_membership(2, 20)
            .with_membership(3, 10)
            .with_membership(3, 20)
            .with_sale(1, 1_200, day(1, 4, 9))
            .with_sale(1, 800, day(1, 4, 15))
            .with_sale(2, 450, day(1, 5, 10))
            .with_sale(3, 3_000, day(1, 19, 11))
            .with_sale(2, 990, day(2, 2, 8))
            .with_sale(3, 125, day(2, 2, 16))
            .with_sale(1, 2_500, day(2, 23, 13))
            .with_sale(3, 640, day(3, 1, 9))
            .with_sale(2, 1_775, day(3, 14, 18))
            .with_sale(1, 333, day(3, 31, 23))
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// (dimension id, name, role) pairs a sale by `user` is counted under
    fn dimensions_for(&self, group_by: GroupBy, user: &User) -> Vec<(i32, String, Option<String>)> {
        match group_by {
            GroupBy::User => vec![(user.id, user.name.clone(), Some(user.role.clone()))],
            GroupBy::Group => self
                .memberships
                .iter()
                .filter(|(user_id, _)| *user_id == user.id)
                .filter_map(|(_, group_id)| self.groups.iter().find(|g| g.id == *group_id))
                .map(|g| (g.id, g.name.clone(), None))
                .collect(),
        }
    }
}

fn truncate(granularity: Granularity, ts: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let date = ts.date_naive();
    let start = match granularity {
        Granularity::Day => Some(date),
        Granularity::Week => date.checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64)),
        Granularity::Month => date.with_day(1),
    }
    .ok_or_else(|| anyhow!("cannot truncate {}", ts))?;

    Ok(start.and_time(NaiveTime::MIN).and_utc())
}

fn sale_passes(filter: &SalesFilter, sale: &Sale, dimension_id: i32) -> bool {
    match filter {
        SalesFilter::SoldFrom(ts) => sale.sold_at >= *ts,
        SalesFilter::SoldBefore(ts) => sale.sold_at < *ts,
        SalesFilter::SoldUntil(ts) => sale.sold_at <= *ts,
        SalesFilter::DimensionIn(ids) => ids.contains(&i64::from(dimension_id)),
    }
}

impl SalesStore for MemoryStore {
    fn aggregate(&self, query: &TimeSeriesQuery) -> Result<Vec<TimeSeriesRow>> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let mut buckets: BTreeMap<(DateTime<Utc>, i32), Accumulator> = BTreeMap::new();

        for sale in &self.sales {
            let Some(user) = self.users.iter().find(|u| u.id == sale.user_id) else {
                continue;
            };

            for (dimension_id, name, role) in self.dimensions_for(query.group_by, user) {
                if !query.filters().iter().all(|f| sale_passes(f, sale, dimension_id)) {
                    continue;
                }

                let window = truncate(query.granularity, sale.sold_at)?;
                let acc = buckets.entry((window, dimension_id)).or_insert(Accumulator {
                    name,
                    role,
                    count: 0,
                    sum: 0,
                    min: i64::MAX,
                    max: i64::MIN,
                });
                acc.count += 1;
                acc.sum += sale.amount;
                acc.min = acc.min.min(sale.amount);
                acc.max = acc.max.max(sale.amount);
            }
        }

        let mut rows: Vec<TimeSeriesRow> = buckets
            .into_iter()
            .map(|((time_window, dimension_id), acc)| TimeSeriesRow {
                time_window,
                dimension_id,
                dimension_name: acc.name,
                dimension_role: acc.role,
                sale_count: acc.count,
                total_revenue: BigDecimal::from(acc.sum),
                avg_revenue: (BigDecimal::from(acc.sum) / BigDecimal::from(acc.count)).with_scale_round(2, RoundingMode::HalfUp),
                min_sale: acc.min,
                max_sale: acc.max,
            })
            .collect();

        rows.sort_by(|a, b| {
            b.time_window
                .cmp(&a.time_window)
                .then_with(|| b.total_revenue.cmp(&a.total_revenue))
                .then_with(|| a.dimension_id.cmp(&b.dimension_id))
        });

        Ok(rows)
    }
}

/// Store whose every query fails with the given message
pub struct FailingStore {
    message: String,
}

impl FailingStore {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl SalesStore for FailingStore {
    fn aggregate(&self, _query: &TimeSeriesQuery) -> Result<Vec<TimeSeriesRow>> {
        Err(anyhow!("{}", self.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rounds_half_up() {
        let at = Utc.with_ymd_and_hms(2021, 6, 1, 9, 0, 0).unwrap();
        // 1 / 8 = 0.125, which Postgres rounds to 0.13
        let store = (0..7).fold(
            MemoryStore::new().with_user(1, "Alice", "manager").with_sale(1, 1, at),
            |store, _| store.with_sale(1, 0, at),
        );

        let rows = store
            .aggregate(&TimeSeriesQuery::new(Granularity::Month, GroupBy::User))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].avg_revenue, "0.13".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn test_weeks_start_on_monday() {
        // Sunday 2021-06-13 belongs to the week of Monday 2021-06-07
        let sunday = Utc.with_ymd_and_hms(2021, 6, 13, 23, 0, 0).unwrap();
        let monday = Utc.with_ymd_and_hms(2021, 6, 7, 0, 0, 0).unwrap();

        assert_eq!(truncate(Granularity::Week, sunday).unwrap(), monday);
        assert_eq!(
            truncate(Granularity::Month, sunday).unwrap(),
            Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap()
        );
    }
}
