use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::error::ApiError;
use crate::api::handlers::{health, time_series::get_sales_time_series};
use crate::utils::app_config::AppConfig;

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route")
}

pub fn router(app_config: AppConfig) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Reporting
        .route("/api/sales/timeseries", get(get_sales_time_series))
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_config)
}
