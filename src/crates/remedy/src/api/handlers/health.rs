//! Health check endpoint handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::routes::AppState;

/// System health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: String,
    /// Model lifecycle state
    pub model: String,
    /// Escalation policy in effect
    pub escalation: String,
    /// Number of knowledge base entries
    pub knowledge_entries: usize,
}

/// Handler for GET /health
///
/// Always `ok` while the process serves; a failed model only degrades answers.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let resolver = &state.resolver;
    Json(HealthResponse {
        status: "ok".to_string(),
        model: resolver.model_state().label().to_string(),
        escalation: resolver.policy().label().to_string(),
        knowledge_entries: resolver.knowledge().len(),
    })
}
