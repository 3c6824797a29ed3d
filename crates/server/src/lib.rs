pub mod api;
pub mod log_buffer;
pub mod metrics;
pub mod state;

pub use api::create_router;
pub use log_buffer::{LogBuffer, LogEntry};
pub use state::AppState;
