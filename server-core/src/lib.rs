//! server-core: Shared infrastructure for the sparkchat server.
pub mod error;
pub mod middleware;
pub mod observability;

pub use error::AppError;
