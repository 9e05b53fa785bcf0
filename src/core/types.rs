use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One product record as delivered by the table source.
///
/// Rows are read-only once loaded and addressed by their position in the
/// loaded sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub key: String,
    pub launch_date: NaiveDate,
    pub image_url: String,
    pub raw_history: String,
}

impl Row {
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        launch_date: NaiveDate,
        image_url: impl Into<String>,
        raw_history: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            launch_date,
            image_url: image_url.into(),
            raw_history: raw_history.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub value: u64,
}

impl HistoryPoint {
    #[must_use]
    pub const fn new(date: NaiveDate, value: u64) -> Self {
        Self { date, value }
    }
}

/// Decoded history of one row, ascending by date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSeries {
    pub key: String,
    pub points: Vec<HistoryPoint>,
}

impl TimeSeries {
    #[must_use]
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|point| point.date)
    }

    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|point| point.date)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
