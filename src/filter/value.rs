//! Per-type formatting of filter values and single-clause rendering.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::{Filter, FilterType, Operator};
use crate::error_handling::FilterError;
use crate::utils::sanitize_query_string;

/// Formats a filter's value for insertion into the query.
///
/// Text and combo values are sanitized and parenthesized, dates become
/// `YYYY-MM-DDT00:00:00Z`, everything else is used as is.
pub(crate) fn format_value(filter: &Filter) -> Result<String, FilterError> {
    match filter.kind {
        FilterType::Text | FilterType::Combo => {
            Ok(format!("({})", sanitize_query_string(&filter.value)))
        }
        FilterType::Date => {
            let date = parse_date(&filter.value).ok_or_else(|| FilterError::InvalidDate {
                id: filter.id.clone(),
                value: filter.value.clone(),
            })?;
            Ok(format!("{}T00:00:00Z", date.format("%Y-%m-%d")))
        }
        FilterType::Number | FilterType::Integer | FilterType::Grouping | FilterType::Other => {
            Ok(filter.value.clone())
        }
    }
}

/// Reads a calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (their UTC date), timestamps without
/// an offset (their own date) and integers, read as epoch milliseconds.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Some(dt) = NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(dt.date());
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.date_naive())
}

const NAIVE_TIMESTAMP_FORMATS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Renders one filter as a query fragment.
///
/// Returns `Ok(None)` when the operator has no query form for the filter's type;
/// the caller decides whether that is an error.
pub(crate) fn render_filter(filter: &Filter) -> Result<Option<String>, FilterError> {
    let value = format_value(filter)?;
    let field = &filter.field;

    let fragment = match filter.kind {
        FilterType::Date | FilterType::Number | FilterType::Integer => match filter.operator {
            // quoted even for numbers
            Some(Operator::Equals) => Some(format!("{field}:\"{value}\"")),
            Some(Operator::LessThan) => Some(format!("{field}:[* TO {value}]")),
            Some(Operator::GreaterThan) => Some(format!("{field}:[{value} TO *]")),
            _ => None,
        },
        FilterType::Grouping => Some(value),
        FilterType::Text | FilterType::Combo | FilterType::Other => match filter.operator {
            Some(Operator::Equals) => Some(format!("{field}:{value}")),
            Some(Operator::NotEquals) => Some(format!("(*:* -{field}:{value})")),
            _ => None,
        },
    };

    Ok(fragment)
}
