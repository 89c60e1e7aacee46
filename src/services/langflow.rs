use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::{config::Config, error::RelayError, models::langflow::RunRequest, utils::truncate_for_log};

const LOG_BODY_LIMIT: usize = 500;
const REPLY_PATH: &str = "/outputs/0/outputs/0/results/message/text";

/// POST `message` to the configured flow and return its JSON response.
///
/// `authorization` is the full header value (already `Bearer `-prefixed).
/// No retries: every failure is mapped to a [`RelayError`] and returned.
pub async fn run_flow(
    http: &reqwest::Client,
    cfg: &Config,
    authorization: &str,
    message: &str,
) -> Result<Value, RelayError> {
    let url = cfg
        .run_url()
        .map_err(|e| RelayError::Unexpected(format!("invalid Langflow URL: {e}")))?;
    let payload = RunRequest::chat(message, cfg.tweaks.clone());

    info!(%url, "Calling Langflow");
    debug!(
        payload = %serde_json::to_string(&payload).unwrap_or_default(),
        "Outgoing payload"
    );

    let mut req = http
        .post(url)
        .header(AUTHORIZATION, authorization)
        .header(ACCEPT, "application/json")
        .json(&payload);
    if let Some(timeout) = cfg.timeout {
        req = req.timeout(timeout);
    }

    let res = req.send().await.map_err(transport_error)?;

    let status = res.status();
    info!(status = status.as_u16(), "Langflow responded");
    debug!(headers = ?res.headers(), "Langflow response headers");

    let body = res.text().await.map_err(transport_error)?;
    debug!(body = %truncate_for_log(&body, LOG_BODY_LIMIT), "Langflow response body");

    if !status.is_success() {
        let detail = match serde_json::from_str::<Value>(&body) {
            Ok(v) => v.to_string(),
            Err(_) => body,
        };
        let upstream = status;
        let status = if cfg.status_passthrough {
            upstream
        } else {
            reqwest::StatusCode::INTERNAL_SERVER_ERROR
        };
        warn!(upstream = upstream.as_u16(), "Langflow returned an error status");
        return Err(RelayError::UpstreamStatus {
            status,
            upstream,
            body: detail,
        });
    }

    serde_json::from_str::<Value>(&body).map_err(|e| {
        error!(error = %e, "Langflow response is not valid JSON");
        RelayError::InvalidJson
    })
}

/// Timeouts are 504; every other client failure (connect, redirect, builder, body) is 502.
fn transport_error(e: reqwest::Error) -> RelayError {
    if e.is_timeout() {
        RelayError::Timeout
    } else {
        RelayError::Transport(e.to_string())
    }
}

/// `outputs[0].outputs[0].results.message.text`, if every link is present and the leaf is a string.
pub fn extract_reply(response: &Value) -> Option<&str> {
    response.pointer(REPLY_PATH).and_then(Value::as_str)
}

/// The reply text as a JSON string, or `response` untouched when the shape doesn't match.
pub fn reply_or_raw(response: Value) -> Value {
    match extract_reply(&response) {
        Some(text) => Value::String(text.to_string()),
        None => response,
    }
}
