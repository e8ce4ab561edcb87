use crate::api::error::ApiError;
use crate::sales_time_series::{Granularity, GroupBy};

/// Empty query values count as absent
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub fn validate_granularity(value: Option<&str>) -> Result<Granularity, ApiError> {
    match value {
        None => Ok(Granularity::default()),
        Some(raw) => raw.parse::<Granularity>().map_err(ApiError::from),
    }
}

pub fn validate_group_by(value: Option<&str>) -> Result<GroupBy, ApiError> {
    match value {
        None => Ok(GroupBy::default()),
        Some(raw) => raw.parse::<GroupBy>().map_err(ApiError::from),
    }
}
