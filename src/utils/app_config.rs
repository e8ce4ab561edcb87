use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

use crate::sales_time_series::store::{PgSalesStore, SalesStore};
use crate::utils::db::build_pool;

/// Database connection settings, read from flags or the environment
#[derive(Args, Debug, Clone)]
pub struct DatabaseConfig {
    #[arg(long, env)]
    pub database_url: String,

    /// Maximum number of pooled connections
    #[arg(long, env, default_value_t = 10)]
    pub db_pool_size: u32,

    /// How long a request waits for a free connection
    #[arg(long, env, default_value_t = 5_000)]
    pub db_connection_timeout_ms: u64,

    /// Server-side statement timeout applied to every connection
    #[arg(long, env, default_value_t = 10_000)]
    pub query_timeout_ms: u64,

    /// Populate an empty database with sample data before serving
    #[arg(long, env, default_value_t = true, action = clap::ArgAction::Set)]
    pub seed_database: bool,
}

/// Shared request state
#[derive(Clone)]
pub struct AppConfig {
    pub store: Arc<dyn SalesStore>,
}

impl AppConfig {
    pub fn new(store: Arc<dyn SalesStore>) -> Self {
        Self { store }
    }

    /// Builds the connection pool and wraps it in the Postgres store. The pool
    /// is returned as well so startup tasks can borrow connections from it.
    pub fn from_database_config(
        config: &DatabaseConfig,
    ) -> Result<(Self, Pool<ConnectionManager<PgConnection>>)> {
        let pool = build_pool(config)?;
        let store = PgSalesStore::new(pool.clone());

        Ok((Self::new(Arc::new(store)), pool))
    }
}
