use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::{
    api::{
        error::ApiError,
        extractors::ApiQuery,
        response::{TimeSeriesFilters, TimeSeriesResponse},
        validation::{non_empty, validate_granularity, validate_group_by},
    },
    sales_time_series::{compute_time_series, GetTimeSeriesInputArgs},
    utils::app_config::AppConfig,
};

/// Query parameters for the sales time series
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SalesTimeSeriesParams {
    pub granularity: Option<String>,
    pub group_by: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
}

/// GET /api/sales/timeseries - Sales metrics bucketed by time and user or group
pub async fn get_sales_time_series(
    State(app_config): State<AppConfig>,
    ApiQuery(params): ApiQuery<SalesTimeSeriesParams>,
) -> Result<(StatusCode, Json<TimeSeriesResponse>), ApiError> {
    // granularity is checked first when both are wrong
    let granularity = validate_granularity(non_empty(params.granularity).as_deref())?;
    let group_by = validate_group_by(non_empty(params.group_by).as_deref())?;

    let filters = TimeSeriesFilters {
        start_date: non_empty(params.start_date),
        end_date: non_empty(params.end_date),
        user_id: non_empty(params.user_id),
        group_id: non_empty(params.group_id),
    };

    let args = GetTimeSeriesInputArgs {
        granularity: granularity.to_string(),
        group_by: group_by.to_string(),
        start_date: filters.start_date.clone(),
        end_date: filters.end_date.clone(),
        user_id: filters.user_id.clone(),
        group_id: filters.group_id.clone(),
    };

    let store = app_config.store.clone();
    let data = tokio::task::spawn_blocking(move || compute_time_series(store.as_ref(), &args))
        .await
        .map_err(|e| ApiError::internal_error(format!("Time series task failed: {}", e)))??;

    Ok((
        StatusCode::OK,
        Json(TimeSeriesResponse {
            granularity,
            group_by,
            filters,
            data,
        }),
    ))
}
