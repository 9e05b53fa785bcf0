use crate::error::ChartResult;
use crate::render::{ChartRenderer, ChartRequest};

/// No-op renderer used by tests and headless sessions.
///
/// It still validates the series colors so tests can catch bad requests
/// before a real backend is attached.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_series_count: usize,
    pub last_point_count: usize,
    pub render_count: usize,
    pub clear_count: usize,
}

impl ChartRenderer for NullRenderer {
    fn render(&mut self, request: &ChartRequest) -> ChartResult<()> {
        for series in &request.series {
            series.rgba.validate()?;
        }
        self.last_series_count = request.series.len();
        self.last_point_count = request.point_count();
        self.render_count += 1;
        Ok(())
    }

    fn clear(&mut self) {
        self.last_series_count = 0;
        self.last_point_count = 0;
        self.clear_count += 1;
    }
}
