use tracing::debug;

use crate::core::{Row, StartDatePolicy, TimeSeries, compute_range_decoded, decode_history};
use crate::error::{ChartError, ChartResult};
use crate::render::{ChartRequest, ChartSeries};

use super::ColorAllocator;

/// Builds the chart request for the selected rows.
///
/// Series keep the iteration order of `rows`. Each row is decoded exactly
/// once and the same decoded series feed both the x-range and the request.
/// A malformed row fails the whole request; colors are only allocated once
/// every row decoded, so a failed build leaves `colors` untouched.
pub fn build_chart_request(
    rows: &[&Row],
    policy: StartDatePolicy,
    colors: &mut ColorAllocator,
) -> ChartResult<ChartRequest> {
    if rows.is_empty() {
        return Err(ChartError::EmptySelection);
    }

    let decoded = rows
        .iter()
        .map(|row| decode_history(&row.key, &row.raw_history))
        .collect::<ChartResult<Vec<TimeSeries>>>()?;

    let pairs: Vec<(&Row, &TimeSeries)> = rows.iter().copied().zip(&decoded).collect();
    let range = compute_range_decoded(&pairs, policy)?;

    let mut series = Vec::with_capacity(decoded.len());
    for decoded_series in decoded {
        let token = colors.color_for(&decoded_series.key);
        let rgba = colors.resolve(token).ok_or_else(|| {
            ChartError::InvalidData(format!(
                "color slot {} is outside the palette",
                token.index()
            ))
        })?;
        series.push(ChartSeries {
            key: decoded_series.key,
            points: decoded_series.points,
            color: token,
            rgba,
        });
    }

    debug!(
        series = series.len(),
        x_min = %range.x_min,
        x_max = %range.x_max,
        "built chart request"
    );
    Ok(ChartRequest {
        series,
        x_min: range.x_min,
        x_max: range.x_max,
    })
}
