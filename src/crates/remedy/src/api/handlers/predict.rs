//! Treatment prediction handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::AppState;
use crate::pipeline::{ResolutionResult, MISSING_DISEASE};

/// Handler for POST /predict
///
/// The body is read as loose JSON so that malformed bodies and a missing or
/// non-string `disease` all produce the same 400.
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<ResolutionResult>> {
    let disease = match &body {
        Ok(Json(value)) => value.get("disease").and_then(Value::as_str),
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "Unreadable predict body");
            None
        }
    }
    .ok_or_else(|| ApiError::BadRequest(MISSING_DISEASE.to_string()))?;

    let result = state.resolver.resolve(disease).await?;
    Ok(Json(result))
}
