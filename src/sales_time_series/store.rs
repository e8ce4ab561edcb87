use anyhow::Result;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

use crate::sales_time_series::db_types::TimeSeriesRow;
use crate::sales_time_series::sql_queries::{self, TimeSeriesQuery};
use crate::utils::db::get_conn;

/// Read access to the sales data: run one aggregation, get back its rows
pub trait SalesStore: Send + Sync {
    fn aggregate(&self, query: &TimeSeriesQuery) -> Result<Vec<TimeSeriesRow>>;
}

/// Postgres-backed store. Each call checks out its own pooled connection and
/// returns it once the query finishes.
#[derive(Clone)]
pub struct PgSalesStore {
    pool: Pool<ConnectionManager<PgConnection>>,
}

impl PgSalesStore {
    pub fn new(pool: Pool<ConnectionManager<PgConnection>>) -> Self {
        Self { pool }
    }
}

impl SalesStore for PgSalesStore {
    fn aggregate(&self, query: &TimeSeriesQuery) -> Result<Vec<TimeSeriesRow>> {
        let mut conn = get_conn(self.pool.clone())?;
        sql_queries::get_time_series_rows(&mut conn, query)
    }
}
