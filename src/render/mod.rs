mod color;
mod null_renderer;
mod palette;
mod request;

pub use color::Color;
pub use null_renderer::NullRenderer;
pub use palette::{ColorToken, Palette};
pub use request::{ChartRequest, ChartSeries};

use crate::error::ChartResult;

/// Contract implemented by any chart drawing backend.
///
/// Backends receive a fully materialized `ChartRequest` so drawing code stays
/// isolated from decoding, range and color policy.
pub trait ChartRenderer {
    fn render(&mut self, request: &ChartRequest) -> ChartResult<()>;

    /// Drops whatever is currently drawn, e.g. after a new table is loaded.
    fn clear(&mut self);
}
