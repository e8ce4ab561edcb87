use anyhow::Result;
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sql_types::{Array, BigInt, Timestamptz};

use crate::sales_time_series::db_types::{Granularity, GroupBy, TimeSeriesRow};

/// SQL fragments for one aggregation dimension. Only ever taken from the
/// constants below, never built from request input.
struct DimensionSql {
    columns: &'static str,
    joins: &'static str,
    group_columns: &'static str,
    id_column: &'static str,
}

const USER_DIMENSION: DimensionSql = DimensionSql {
    columns: "u.id AS dimension_id, u.name AS dimension_name, u.role AS dimension_role",
    joins: "INNER JOIN users u ON u.id = s.user_id",
    group_columns: "u.id, u.name, u.role",
    id_column: "u.id",
};

// a sale is counted once per group its seller belongs to
const GROUP_DIMENSION: DimensionSql = DimensionSql {
    columns: "g.id AS dimension_id, g.name AS dimension_name, NULL::text AS dimension_role",
    joins: "INNER JOIN users u ON u.id = s.user_id
INNER JOIN user_groups ug ON ug.user_id = u.id
INNER JOIN groups g ON g.id = ug.group_id",
    group_columns: "g.id, g.name",
    id_column: "g.id",
};

impl Granularity {
    /// Postgres `date_trunc` field for this granularity
    pub fn trunc_unit(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}

impl GroupBy {
    fn dimension_sql(&self) -> &'static DimensionSql {
        match self {
            GroupBy::User => &USER_DIMENSION,
            GroupBy::Group => &GROUP_DIMENSION,
        }
    }
}

/// Value-bearing predicate on the sales being aggregated. Each one renders to
/// a single bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SalesFilter {
    /// `sold_at >= $n`
    SoldFrom(DateTime<Utc>),
    /// `sold_at < $n`
    SoldBefore(DateTime<Utc>),
    /// `sold_at <= $n`
    SoldUntil(DateTime<Utc>),
    /// dimension id `= ANY($n)`, compared as bigint
    DimensionIn(Vec<i64>),
}

impl SalesFilter {
    fn render(&self, dimension: &DimensionSql, placeholder: usize) -> String {
        match self {
            SalesFilter::SoldFrom(_) => format!("s.sold_at >= ${}", placeholder),
            SalesFilter::SoldBefore(_) => format!("s.sold_at < ${}", placeholder),
            SalesFilter::SoldUntil(_) => format!("s.sold_at <= ${}", placeholder),
            SalesFilter::DimensionIn(_) => format!("{}::bigint = ANY(${})", dimension.id_column, placeholder),
        }
    }
}

/// A parameterized aggregation over the sales table
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesQuery {
    pub granularity: Granularity,
    pub group_by: GroupBy,
    filters: Vec<SalesFilter>,
}

impl TimeSeriesQuery {
    pub fn new(granularity: Granularity, group_by: GroupBy) -> Self {
        Self {
            granularity,
            group_by,
            filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: SalesFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Filters in placeholder order: the first one binds to `$1`
    pub fn filters(&self) -> &[SalesFilter] {
        &self.filters
    }

    pub fn to_sql(&self) -> String {
        let dimension = self.group_by.dimension_sql();

        let predicate = std::iter::once("TRUE".to_string())
            .chain(
                self.filters
                    .iter()
                    .enumerate()
                    .map(|(i, filter)| filter.render(dimension, i + 1)),
            )
            .collect::<Vec<_>>()
            .join("\n    AND ");

        format!(
            r"
SELECT
    date_trunc('{unit}', s.sold_at, 'UTC') AS time_window,
    {columns},
    COUNT(s.id) AS sale_count,
    SUM(s.amount)::numeric AS total_revenue,
    ROUND(AVG(s.amount)::numeric, 2) AS avg_revenue,
    MIN(s.amount)::bigint AS min_sale,
    MAX(s.amount)::bigint AS max_sale
FROM sales s
{joins}
WHERE
    {predicate}
GROUP BY time_window, {group_columns}
ORDER BY time_window DESC, total_revenue DESC, dimension_id ASC
",
            unit = self.granularity.trunc_unit(),
            columns = dimension.columns,
            joins = dimension.joins,
            predicate = predicate,
            group_columns = dimension.group_columns,
        )
    }
}

pub fn get_time_series_rows(
    conn: &mut PooledConnection<ConnectionManager<PgConnection>>,
    query: &TimeSeriesQuery,
) -> Result<Vec<TimeSeriesRow>> {
    let mut statement: BoxedSqlQuery<'_, Pg, SqlQuery> =
        diesel::sql_query(query.to_sql()).into_boxed();

    for filter in query.filters() {
        statement = match filter {
            SalesFilter::SoldFrom(ts) | SalesFilter::SoldBefore(ts) | SalesFilter::SoldUntil(ts) => {
                statement.bind::<Timestamptz, _>(*ts)
            }
            SalesFilter::DimensionIn(ids) => statement.bind::<Array<BigInt>, _>(ids.clone()),
        };
    }

    let rows = statement.load::<TimeSeriesRow>(conn)?;

    Ok(rows)
}
