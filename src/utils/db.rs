use std::time::Duration;

use anyhow::Result;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::PgConnection;

use crate::utils::app_config::DatabaseConfig;

/// Applies a server-side statement timeout to every connection handed out by
/// the pool.
#[derive(Debug, Clone, Copy)]
pub struct StatementTimeout {
    pub timeout_ms: u64,
}

impl CustomizeConnection<PgConnection, r2d2::Error> for StatementTimeout {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!("SET statement_timeout = {}", self.timeout_ms))
            .map_err(r2d2::Error::QueryError)
    }
}

pub fn build_pool(config: &DatabaseConfig) -> Result<Pool<ConnectionManager<PgConnection>>> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url.clone());
    let pool = Pool::builder()
        .max_size(config.db_pool_size)
        .connection_timeout(Duration::from_millis(config.db_connection_timeout_ms))
        .connection_customizer(Box::new(StatementTimeout {
            timeout_ms: config.query_timeout_ms,
        }))
        .build(manager)?;

    Ok(pool)
}

pub fn get_conn(pool: Pool<ConnectionManager<PgConnection>>) -> Result<PooledConnection<ConnectionManager<PgConnection>>> {
    let conn = pool.get()?;

    Ok(conn)
}
