use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
};
use serde_json::Value;
use tracing::info;

use crate::{
    AppState,
    config::ResponseMode,
    credential::{authorization_value, present},
    error::RelayError,
    models::query::{MessageParam, QueryRequest, QueryResponse},
    services::langflow::{reply_or_raw, run_flow},
};

#[utoipa::path(
    post,
    path = "/query",
    tag = "relay",
    params(MessageParam),
    request_body(content = QueryRequest, description = "Message to forward. Ignored when `?message=` is given."),
    responses(
        (status = 200, description = "Langflow reply (envelope) or the raw Langflow response", body = QueryResponse),
        (status = 422, description = "No message supplied", body = crate::models::common::ErrorMessage),
        (status = 500, description = "Missing credential, Langflow error status, or unexpected failure", body = crate::models::common::ErrorMessage),
        (status = 502, description = "Langflow unreachable or returned invalid JSON", body = crate::models::common::ErrorMessage),
        (status = 504, description = "Langflow timed out", body = crate::models::common::ErrorMessage)
    )
)]
pub async fn query(
    State(state): State<AppState>,
    param: Result<Query<MessageParam>, QueryRejection>,
    body: Bytes,
) -> Result<Json<Value>, RelayError> {
    let Query(param) = param.map_err(|e| RelayError::InvalidRequest(e.body_text()))?;
    let message = resolve_message(param, &body)?;
    info!(message_len = message.len(), "Received query");

    let cfg = &state.cfg;
    let token = present(state.tokens.token())
        .ok_or_else(|| RelayError::MissingToken(cfg.token_var.clone()))?;
    info!(token_len = token.len(), "Credential loaded");
    let authorization = authorization_value(&token, cfg.bearer_prefix);

    let res = run_flow(&state.http, cfg, &authorization, &message).await?;
    info!("Query relayed successfully");

    let body = match cfg.response_mode {
        ResponseMode::Envelope => serde_json::to_value(QueryResponse::success(reply_or_raw(res)))
            .map_err(|e| RelayError::Unexpected(e.to_string()))?,
        ResponseMode::Raw => res,
    };
    Ok(Json(body))
}

/// `?message=` wins over the JSON body.
fn resolve_message(param: MessageParam, body: &[u8]) -> Result<String, RelayError> {
    if let Some(message) = param.message {
        return Ok(message);
    }
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RelayError::InvalidRequest(
            "Field required: message".to_string(),
        ));
    }
    serde_json::from_slice::<QueryRequest>(body)
        .map(|req| req.message)
        .map_err(|e| RelayError::InvalidRequest(format!("Invalid request body: {e}")))
}
