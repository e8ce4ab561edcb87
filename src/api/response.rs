use serde::Serialize;

use crate::sales_time_series::{Granularity, GroupBy, TimeSeriesBucket};

/// Raw filter values echoed back to the caller, `null` when absent
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesFilters {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesResponse {
    pub granularity: Granularity,
    pub group_by: GroupBy,
    pub filters: TimeSeriesFilters,
    pub data: Vec<TimeSeriesBucket>,
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn client(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self {
            error: "Internal server error".to_string(),
            message: Some(message.into()),
        }
    }
}
