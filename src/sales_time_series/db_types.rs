use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, SecondsFormat, Utc};
use diesel::QueryableByName;
use diesel::sql_types::{BigInt, Integer, Nullable, Numeric, Text, Timestamptz};
use serde::{Serialize, Serializer};

use crate::sales_time_series::error::TimeSeriesError;

/// Width of the window each sale is truncated into
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    #[default]
    Month,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Day, Granularity::Week, Granularity::Month];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = TimeSeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Granularity::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| TimeSeriesError::InvalidGranularity(s.to_string()))
    }
}

/// Aggregation dimension, selects both the join path and the bucket keys
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    User,
    Group,
}

impl GroupBy {
    pub const ALL: [GroupBy; 2] = [GroupBy::User, GroupBy::Group];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::User => "user",
            GroupBy::Group => "group",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = TimeSeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GroupBy::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| TimeSeriesError::InvalidGroupBy(s.to_string()))
    }
}

/// Flat row returned by the aggregation query.
///
/// The dimension columns are shared by both join paths; `dimension_role` is
/// always NULL when grouping by group.
#[derive(Debug, Clone, QueryableByName)]
pub struct TimeSeriesRow {
    #[diesel(sql_type = Timestamptz)]
    pub time_window: DateTime<Utc>,
    #[diesel(sql_type = Integer)]
    pub dimension_id: i32,
    #[diesel(sql_type = Text)]
    pub dimension_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub dimension_role: Option<String>,
    #[diesel(sql_type = BigInt)]
    pub sale_count: i64,
    #[diesel(sql_type = Numeric)]
    pub total_revenue: BigDecimal,
    #[diesel(sql_type = Numeric)]
    pub avg_revenue: BigDecimal,
    #[diesel(sql_type = BigInt)]
    pub min_sale: i64,
    #[diesel(sql_type = BigInt)]
    pub max_sale: i64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketMetrics {
    pub sale_count: i64,
    pub total_revenue: i64,
    pub avg_revenue: f64,
    pub min_sale: i64,
    pub max_sale: i64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum BucketDimension {
    #[serde(rename_all = "camelCase")]
    User {
        user_id: i32,
        user_name: String,
        user_role: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Group { group_id: i32, group_name: String },
}

impl BucketDimension {
    pub fn id(&self) -> i32 {
        match self {
            BucketDimension::User { user_id, .. } => *user_id,
            BucketDimension::Group { group_id, .. } => *group_id,
        }
    }
}

/// One aggregated output row for a (time window, dimension) pair
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesBucket {
    #[serde(serialize_with = "serialize_time_window")]
    pub time_window: DateTime<Utc>,
    #[serde(flatten)]
    pub dimension: BucketDimension,
    pub metrics: BucketMetrics,
}

fn serialize_time_window<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}
