use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use crate::core::{HistoryPoint, TimeSeries};
use crate::error::{ChartError, ChartResult};

/// Date format used by the embedded `days` sequence.
pub const HISTORY_DATE_FORMAT: &str = "%Y/%m/%d";

/// HTML-escaped newline that spreadsheet exports leave inside the payload.
const ESCAPED_NEWLINE_MARKER: &str = "&#10;";

#[derive(Debug, Deserialize)]
struct RawHistoryPayload {
    days: Vec<String>,
    sales: Vec<Value>,
}

/// Decodes one row's embedded history into a date-ascending series.
///
/// The payload holds two parallel sequences, `days` and `sales`, which are
/// paired positionally. `null` sales become `0`. Any structural problem,
/// length mismatch, bad date or invalid value rejects the whole payload.
pub fn decode_history(key: &str, raw: &str) -> ChartResult<TimeSeries> {
    let cleaned = clean_history_payload(raw);
    let payload: RawHistoryPayload = serde_json::from_str(&cleaned)
        .map_err(|e| ChartError::malformed(format!("history of `{key}`: {e}")))?;

    if payload.days.len() != payload.sales.len() {
        return Err(ChartError::malformed(format!(
            "history of `{key}` has {} days but {} sales values",
            payload.days.len(),
            payload.sales.len()
        )));
    }

    let mut points = Vec::with_capacity(payload.days.len());
    for (position, (day, sales)) in payload.days.iter().zip(&payload.sales).enumerate() {
        let date = parse_history_date(day).ok_or_else(|| {
            ChartError::malformed(format!(
                "history of `{key}` has invalid date `{day}` at position {position}"
            ))
        })?;
        let value = parse_sales_value(sales).ok_or_else(|| {
            ChartError::malformed(format!(
                "history of `{key}` has invalid sales value `{sales}` at position {position}"
            ))
        })?;
        points.push(HistoryPoint::new(date, value));
    }

    // Stable: equal dates keep their payload order.
    points.sort_by_key(|point| point.date);
    trace!(key, points = points.len(), "decoded history");

    Ok(TimeSeries {
        key: key.to_owned(),
        points,
    })
}

fn clean_history_payload(raw: &str) -> String {
    raw.replace(ESCAPED_NEWLINE_MARKER, "").trim().to_owned()
}

fn parse_history_date(day: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(day.trim(), HISTORY_DATE_FORMAT).ok()
}

fn parse_sales_value(value: &Value) -> Option<u64> {
    match value {
        Value::Null => Some(0),
        Value::Number(number) => number.as_u64().or_else(|| {
            let float = number.as_f64()?;
            // `u64::MAX as f64` rounds up to 2^64, which is already out of range.
            let in_range = float >= 0.0 && float < u64::MAX as f64;
            (float.is_finite() && in_range && float.fract() == 0.0).then_some(float as u64)
        }),
        _ => None,
    }
}
