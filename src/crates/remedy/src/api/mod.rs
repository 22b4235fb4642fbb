//! HTTP surface.
//!
//! - `POST /predict` resolves one disease
//! - `GET /health` reports model and escalation status

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use routes::{create_router, AppState};
