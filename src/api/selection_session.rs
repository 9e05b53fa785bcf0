use tracing::{debug, warn};

use crate::core::Row;
use crate::error::{ChartError, ChartResult};
use crate::render::{ChartRenderer, ChartRequest};
use crate::settings::{SettingsProvider, ViewerSettings};

use super::{ColorAllocator, build_chart_request};

/// Owns the loaded table rows, the color assignments and the renderer, and
/// turns table selection changes into rendered chart requests.
///
/// Events are processed one at a time; each selection change supersedes the
/// previous request.
pub struct SelectionSession<R: ChartRenderer> {
    renderer: R,
    rows: Vec<Row>,
    colors: ColorAllocator,
    last_request: Option<ChartRequest>,
}

impl<R: ChartRenderer> SelectionSession<R> {
    #[must_use]
    pub fn new(renderer: R) -> Self {
        Self::with_color_allocator(renderer, ColorAllocator::default())
    }

    #[must_use]
    pub fn with_color_allocator(renderer: R, colors: ColorAllocator) -> Self {
        Self {
            renderer,
            rows: Vec::new(),
            colors,
            last_request: None,
        }
    }

    /// Replaces the table contents and clears the chart.
    ///
    /// Color assignments survive so a key reappearing in the new table keeps
    /// its color.
    pub fn load_rows(&mut self, rows: Vec<Row>) {
        debug!(count = rows.len(), "loaded table rows");
        self.rows = rows;
        self.last_request = None;
        self.renderer.clear();
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> ChartResult<&Row> {
        self.rows.get(index).ok_or(ChartError::RowOutOfRange {
            index,
            len: self.rows.len(),
        })
    }

    /// Thumbnail URL of the row at `index`, for resolving through an
    /// [`ImageCache`](crate::cache::ImageCache).
    pub fn thumbnail_url(&self, index: usize) -> ChartResult<&str> {
        self.row(index).map(|row| row.image_url.as_str())
    }

    /// Rebuilds and renders the chart for the selected row indices.
    ///
    /// Indices are de-duplicated and charted in ascending row order. The
    /// settings are read once as a snapshot for this build. On failure,
    /// including a renderer error, the chart is cleared rather than left
    /// showing a stale selection.
    pub fn on_selection_change(
        &mut self,
        selected: &[usize],
        settings: &dyn SettingsProvider,
    ) -> ChartResult<&ChartRequest> {
        let mut indices = selected.to_vec();
        indices.sort_unstable();
        indices.dedup();

        let policy = ViewerSettings::from_provider(settings).start_date_policy();
        let rows = &self.rows;
        let outcome = indices
            .iter()
            .map(|&index| {
                rows.get(index).ok_or(ChartError::RowOutOfRange {
                    index,
                    len: rows.len(),
                })
            })
            .collect::<ChartResult<Vec<&Row>>>()
            .and_then(|selected_rows| {
                build_chart_request(&selected_rows, policy, &mut self.colors)
            });
        let outcome =
            outcome.and_then(|request| self.renderer.render(&request).map(|()| request));

        match outcome {
            Ok(request) => Ok(&*self.last_request.insert(request)),
            Err(err) => {
                warn!(error = %err, selected = indices.len(), "chart rebuild failed");
                self.last_request = None;
                self.renderer.clear();
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn last_request(&self) -> Option<&ChartRequest> {
        self.last_request.as_ref()
    }

    #[must_use]
    pub fn colors(&self) -> &ColorAllocator {
        &self.colors
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
