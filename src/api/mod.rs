mod chart_request_builder;
mod color_allocator;
mod selection_session;

pub use chart_request_builder::build_chart_request;
pub use color_allocator::ColorAllocator;
pub use selection_session::SelectionSession;
