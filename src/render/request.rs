use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::HistoryPoint;
use crate::render::{Color, ColorToken};

/// One line of the overlaid chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub key: String,
    pub points: Vec<HistoryPoint>,
    pub color: ColorToken,
    pub rgba: Color,
}

/// Backend-agnostic description of one chart draw.
///
/// Built fresh for every selection change and consumed once by a
/// [`ChartRenderer`](crate::render::ChartRenderer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub series: Vec<ChartSeries>,
    pub x_min: NaiveDate,
    pub x_max: NaiveDate,
}

impl ChartRequest {
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.series.iter().map(|series| series.key.as_str()).collect()
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|series| series.points.len()).sum()
    }

    #[must_use]
    pub fn series_for(&self, key: &str) -> Option<&ChartSeries> {
        self.series.iter().find(|series| series.key == key)
    }
}
