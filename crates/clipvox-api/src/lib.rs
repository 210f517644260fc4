//! clipvox-api: HTTP API for ClipVox
//!
//! Exposes script generation and speech synthesis over REST.
//! Built with axum for async HTTP handling.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use routes::router;
pub use server::{AppState, start_server};
