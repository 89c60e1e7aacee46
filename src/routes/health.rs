use axum::{Json, extract::State};

use crate::{
    AppState,
    models::query::{HealthEnvironment, HealthResponse},
};

/// Liveness plus credential presence. The token value is never returned.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let token = state.tokens.token().unwrap_or_default();
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "API is alive".to_string(),
        environment: HealthEnvironment {
            port: state.cfg.app_port,
            has_token: !token.is_empty(),
            token_length: token.len(),
        },
    })
}
