//! HTTP layer - routing, auth middleware, and error mapping

pub mod auth;
pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerError};
