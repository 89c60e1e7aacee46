use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Body of `POST /lf/{langflow_id}/api/v1/run/{flow_id}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RunRequest {
    pub input_value: String,
    pub output_type: String,
    pub input_type: String,
    /// Per-node overrides, forwarded verbatim. Omitted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub tweaks: Option<BTreeMap<String, Value>>,
}

impl RunRequest {
    pub fn chat(message: &str, tweaks: Option<BTreeMap<String, Value>>) -> Self {
        Self {
            input_value: message.to_string(),
            output_type: "chat".to_string(),
            input_type: "chat".to_string(),
            tweaks,
        }
    }
}
