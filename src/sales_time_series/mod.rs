pub mod db_types;
pub mod error;
#[cfg(test)]
pub mod memory_store;
pub mod operations;
pub mod sql_queries;
pub mod store;

pub use db_types::{Granularity, GroupBy, TimeSeriesBucket};
pub use error::TimeSeriesError;
pub use operations::{compute_time_series, GetTimeSeriesInputArgs};
pub use store::{PgSalesStore, SalesStore};
