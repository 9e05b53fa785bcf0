pub mod history;
pub mod range;
pub mod types;

pub use history::{HISTORY_DATE_FORMAT, decode_history};
pub use range::{DateRange, StartDatePolicy, compute_range, compute_range_decoded};
pub use types::{HistoryPoint, Row, TimeSeries};
