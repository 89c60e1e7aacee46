use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryRequest {
    pub message: String,
}

/// `?message=` form accepted for older clients.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MessageParam {
    /// Takes precedence over the JSON body when present.
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QueryResponse {
    pub status: String,
    /// Extracted reply text, or the raw Langflow response.
    #[schema(value_type = Object)]
    pub data: Value,
}

impl QueryResponse {
    pub fn success(data: Value) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub environment: HealthEnvironment,
}

/// Credential diagnostics use the raw stored value, untrimmed: a
/// whitespace-only token reports `has_token: true` here while `/query`
/// still treats it as missing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthEnvironment {
    pub port: u16,
    pub has_token: bool,
    pub token_length: usize,
}
