//! sales-chart-rs: selection-driven sales history charts for product tables.
//!
//! The crate covers the logic behind an interactive product table: decoding
//! each row's embedded sales history, aligning the selected rows on a shared
//! date axis, assigning stable series colors, and caching thumbnails on disk
//! by URL. Drawing, widgets and spreadsheet decoding stay with the host.

pub mod api;
pub mod cache;
pub mod core;
pub mod error;
pub mod render;
pub mod settings;
pub mod telemetry;

pub use api::{ColorAllocator, SelectionSession, build_chart_request};
pub use cache::{ImageCache, ImageCacheConfig};
pub use error::{ChartError, ChartResult, FetchErrorKind};
