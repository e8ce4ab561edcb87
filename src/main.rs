use std::env;

use clap::Parser;
use dotenvy::dotenv;

use sales_insights_back_end::{
    api::{config::ApiConfig, routes::router},
    seed::seed_database,
    utils::{
        app_config::{AppConfig, DatabaseConfig},
        db::get_conn,
    },
};

#[derive(Parser, Debug)]
#[command(
    name = "sales-insights-back-end",
    about = "Sales time series reporting API"
)]
struct ServerArgs {
    #[command(flatten)]
    api: ApiConfig,

    #[command(flatten)]
    database: DatabaseConfig,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv();
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string())
                .as_str(),
        )
        .init();

    let args = ServerArgs::parse();

    let (app_config, pool) = AppConfig::from_database_config(&args.database)?;
    tracing::info!(
        pool_size = args.database.db_pool_size,
        query_timeout_ms = args.database.query_timeout_ms,
        "Database pool ready"
    );

    if args.database.seed_database {
        let summary = tokio::task::spawn_blocking(move || {
            let mut conn = get_conn(pool)?;
            seed_database(&mut conn)
        })
        .await??;
        tracing::info!(sales = summary.sales, "Seeding finished");
    }

    let addr = args.api.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Starting sales insights API server on {}", addr);

    axum::serve(listener, router(app_config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
