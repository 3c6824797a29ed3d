pub mod admin;
pub mod error;
pub mod filtered;
pub mod handlers;
pub mod middleware;
pub mod processing;
pub mod routes;
pub mod settings;

pub use error::ApiError;
pub use routes::create_router;
