use std::borrow::Cow;
use std::num::IntErrorKind;

use bigdecimal::ToPrimitive;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sales_time_series::db_types::{
    BucketDimension, BucketMetrics, Granularity, GroupBy, TimeSeriesBucket, TimeSeriesRow,
};
use crate::sales_time_series::error::TimeSeriesError;
use crate::sales_time_series::sql_queries::{SalesFilter, TimeSeriesQuery};
use crate::sales_time_series::store::SalesStore;

/// Raw time series parameters as received from the caller
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct GetTimeSeriesInputArgs {
    pub granularity: String,
    pub group_by: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
}

/// Runs one sales aggregation and reshapes its rows into buckets.
///
/// `granularity` and `group_by` are checked before anything else so an
/// invalid request never reaches the store. Store errors are returned as-is.
pub fn compute_time_series(
    store: &dyn SalesStore,
    args: &GetTimeSeriesInputArgs,
) -> Result<Vec<TimeSeriesBucket>, TimeSeriesError> {
    let query = build_time_series_query(args)?;

    tracing::debug!(
        granularity = %query.granularity,
        group_by = %query.group_by,
        filters = query.filters().len(),
        "running sales time series query"
    );

    let rows = store.aggregate(&query)?;

    rows.into_iter()
        .map(|row| row_to_bucket(query.group_by, row))
        .collect()
}

pub fn build_time_series_query(args: &GetTimeSeriesInputArgs) -> Result<TimeSeriesQuery, TimeSeriesError> {
    let granularity: Granularity = args.granularity.parse()?;
    let group_by: GroupBy = args.group_by.parse()?;

    let mut query = TimeSeriesQuery::new(granularity, group_by);

    if let Some(raw) = &args.start_date {
        query = query.with_filter(lower_bound(raw)?);
    }

    if let Some(raw) = &args.end_date {
        query = query.with_filter(upper_bound(raw)?);
    }

    let raw_ids = match group_by {
        GroupBy::User => args.user_id.as_deref(),
        GroupBy::Group => args.group_id.as_deref(),
    };

    if let Some(raw) = raw_ids {
        match parse_id_list(raw) {
            Some(ids) => query = query.with_filter(SalesFilter::DimensionIn(ids)),
            // unparseable lists leave the query unfiltered
            None => tracing::warn!(group_by = %group_by, raw, "id filter had no integer tokens, ignoring it"),
        }
    }

    Ok(query)
}

/// Parses a comma separated id list, dropping anything that is not an integer.
///
/// Returns `None` when no token is an integer. Integers too large for an
/// `i64` are kept as part of the filter but match no row, so the list may be
/// `Some` and empty.
pub fn parse_id_list(raw: &str) -> Option<Vec<i64>> {
    let mut saw_integer = false;
    let mut ids = Vec::new();

    for token in raw.split(',') {
        match token.trim().parse::<i64>() {
            Ok(id) => {
                saw_integer = true;
                ids.push(id);
            }
            Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                saw_integer = true;
            }
            Err(_) => {}
        }
    }

    saw_integer.then_some(ids)
}

enum DateBound {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

fn parse_date_bound(field: &'static str, raw: &str) -> Result<DateBound, TimeSeriesError> {
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(DateBound::Day(day));
    }

    DateTime::parse_from_rfc3339(&restore_offset_sign(raw))
        .map(|ts| DateBound::Instant(ts.with_timezone(&Utc)))
        .map_err(|_| TimeSeriesError::InvalidDate {
            field,
            value: raw.to_string(),
        })
}

/// An unencoded `+02:00` offset reaches us as ` 02:00`
fn restore_offset_sign(raw: &str) -> Cow<'_, str> {
    match raw.rsplit_once(' ') {
        Some((head, offset)) if head.contains('T') && is_offset(offset) => Cow::Owned(format!("{}+{}", head, offset)),
        _ => Cow::Borrowed(raw),
    }
}

fn is_offset(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 5
        && bytes[2] == b':'
        && bytes.iter().enumerate().all(|(i, b)| i == 2 || b.is_ascii_digit())
}

fn lower_bound(raw: &str) -> Result<SalesFilter, TimeSeriesError> {
    match parse_date_bound("startDate", raw)? {
        DateBound::Day(day) => Ok(SalesFilter::SoldFrom(day.and_time(NaiveTime::MIN).and_utc())),
        DateBound::Instant(ts) => Ok(SalesFilter::SoldFrom(ts)),
    }
}

/// A calendar end date covers that whole day
fn upper_bound(raw: &str) -> Result<SalesFilter, TimeSeriesError> {
    match parse_date_bound("endDate", raw)? {
        DateBound::Day(day) => day
            .succ_opt()
            .map(|next| SalesFilter::SoldBefore(next.and_time(NaiveTime::MIN).and_utc()))
            .ok_or_else(|| TimeSeriesError::InvalidDate {
                field: "endDate",
                value: raw.to_string(),
            }),
        DateBound::Instant(ts) => Ok(SalesFilter::SoldUntil(ts)),
    }
}

pub fn row_to_bucket(group_by: GroupBy, row: TimeSeriesRow) -> Result<TimeSeriesBucket, TimeSeriesError> {
    let total_revenue = row.total_revenue.to_i64().ok_or_else(|| {
        TimeSeriesError::Format(format!("total revenue {} does not fit in an i64", row.total_revenue))
    })?;
    let avg_revenue = row.avg_revenue.to_f64().ok_or_else(|| {
        TimeSeriesError::Format(format!("average revenue {} is not a finite number", row.avg_revenue))
    })?;

    let dimension = match group_by {
        GroupBy::User => BucketDimension::User {
            user_id: row.dimension_id,
            user_name: row.dimension_name,
            user_role: row.dimension_role,
        },
        GroupBy::Group => BucketDimension::Group {
            group_id: row.dimension_id,
            group_name: row.dimension_name,
        },
    };

    Ok(TimeSeriesBucket {
        time_window: row.time_window,
        dimension,
        metrics: BucketMetrics {
            sale_count: row.sale_count,
            total_revenue,
            avg_revenue,
            min_sale: row.min_sale,
            max_sale: row.max_sale,
        },
    })
}
