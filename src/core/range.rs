use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Row, TimeSeries, decode_history};
use crate::error::{ChartError, ChartResult};

/// Chooses what anchors the left edge of the shared x-axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartDatePolicy {
    /// Earliest declared launch date across the selected rows.
    LaunchDate,
    /// Earliest recorded history date across the selected rows.
    #[default]
    EarliestRecord,
}

impl StartDatePolicy {
    #[must_use]
    pub const fn from_flag(start_from_launch_date: bool) -> Self {
        if start_from_launch_date {
            Self::LaunchDate
        } else {
            Self::EarliestRecord
        }
    }

    #[must_use]
    pub const fn starts_from_launch_date(self) -> bool {
        matches!(self, Self::LaunchDate)
    }
}

/// Shared x-axis window of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub x_min: NaiveDate,
    pub x_max: NaiveDate,
}

/// Decodes every row and computes the shared x-range under `policy`.
pub fn compute_range(rows: &[&Row], policy: StartDatePolicy) -> ChartResult<DateRange> {
    if rows.is_empty() {
        return Err(ChartError::EmptySelection);
    }
    let decoded = rows
        .iter()
        .map(|row| decode_history(&row.key, &row.raw_history))
        .collect::<ChartResult<Vec<_>>>()?;
    let pairs: Vec<(&Row, &TimeSeries)> = rows.iter().copied().zip(&decoded).collect();
    compute_range_decoded(&pairs, policy)
}

/// Computes the shared x-range from rows whose history is already decoded.
///
/// `x_max` is always bounded by recorded history; launch dates only take
/// part in `x_min` under [`StartDatePolicy::LaunchDate`].
pub fn compute_range_decoded(
    rows: &[(&Row, &TimeSeries)],
    policy: StartDatePolicy,
) -> ChartResult<DateRange> {
    if rows.is_empty() {
        return Err(ChartError::EmptySelection);
    }

    let earliest_record = rows
        .iter()
        .filter_map(|(_, series)| series.first_date())
        .min();
    let x_max = rows
        .iter()
        .filter_map(|(_, series)| series.last_date())
        .max()
        .ok_or(ChartError::NoHistory)?;

    let x_min = match policy {
        StartDatePolicy::LaunchDate => rows
            .iter()
            .map(|(row, _)| row.launch_date)
            .min()
            .ok_or(ChartError::EmptySelection)?,
        StartDatePolicy::EarliestRecord => earliest_record.ok_or(ChartError::NoHistory)?,
    };

    debug!(
        rows = rows.len(),
        ?policy,
        %x_min,
        %x_max,
        "computed chart range"
    );
    Ok(DateRange { x_min, x_max })
}
