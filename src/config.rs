use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use serde_json::Value;
use thiserror::Error;
use url::Url;

pub const DEFAULT_LANGFLOW_BASE_URL: &str = "https://api.langflow.astra.datastax.com";

/// How the stored credential is turned into an `Authorization` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerPrefix {
    /// Trim, then prepend `Bearer ` unless it is already there.
    Normalize,
    /// Trim, then always prepend `Bearer ` (a stored `Bearer x` becomes `Bearer Bearer x`).
    Always,
}

/// Shape of a successful `/query` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// `{"status":"success","data": <reply or raw>}`
    Envelope,
    /// The upstream JSON, unwrapped.
    Raw,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind host (e.g., 0.0.0.0)
    pub app_host: String,
    /// HTTP bind port (e.g., 8080)
    pub app_port: u16,

    /// Langflow base URL (e.g., https://api.langflow.astra.datastax.com)
    pub langflow_base_url: Url,
    /// Workflow-space id, interpolated after `/lf/`
    pub langflow_id: String,
    /// Flow id, interpolated after `/api/v1/run/`
    pub flow_id: String,
    /// Node overrides forwarded verbatim as `tweaks`
    pub tweaks: Option<BTreeMap<String, Value>>,
    /// Upstream timeout; `None` leaves the request unbounded
    pub timeout: Option<Duration>,

    /// Name of the env var holding the bearer credential
    pub token_var: String,
    pub bearer_prefix: BearerPrefix,
    pub response_mode: ResponseMode,
    /// Return the upstream status code on non-2xx instead of 500
    pub status_passthrough: bool,

    /// Allowed CORS origins; empty means any
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
    #[error("Invalid URL for {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },
    #[error("Invalid number for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("Invalid JSON object for {name}: {reason}")]
    InvalidJson { name: &'static str, reason: String },
    #[error("General error: {0}")]
    Other(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env if present
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let app_host = vars.or_default("APP_HOST", "0.0.0.0");
        let app_port = vars.parse_or_default::<u16>("PORT", 8080)?;

        let langflow_base_url = vars.url_or_default("LANGFLOW_BASE_URL", DEFAULT_LANGFLOW_BASE_URL)?;
        let langflow_id = vars.required("LANGFLOW_ID")?;
        let flow_id = vars.required("FLOW_ID")?;
        let tweaks = vars.tweaks("LANGFLOW_TWEAKS")?;

        let timeout = match vars.parse_or_default::<u64>("LANGFLOW_TIMEOUT_SECS", 60)? {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let token_var = vars.or_default("TOKEN_ENV_VAR", "APPLICATION_TOKEN");
        let bearer_prefix = match vars.or_default("BEARER_PREFIX", "normalize").trim().to_lowercase().as_str() {
            "normalize" => BearerPrefix::Normalize,
            "always" => BearerPrefix::Always,
            other => {
                return Err(ConfigError::Other(format!(
                    "Invalid BEARER_PREFIX: {other} (expected 'normalize' or 'always')"
                )));
            }
        };
        let response_mode = match vars.or_default("RESPONSE_MODE", "envelope").trim().to_lowercase().as_str() {
            "envelope" => ResponseMode::Envelope,
            "raw" => ResponseMode::Raw,
            other => {
                return Err(ConfigError::Other(format!(
                    "Invalid RESPONSE_MODE: {other} (expected 'envelope' or 'raw')"
                )));
            }
        };
        let status_passthrough = vars.bool_or_default("UPSTREAM_STATUS_PASSTHROUGH", false)?;

        let cors_allowed_origins = vars
            .get("CORS_ALLOWED_ORIGINS")
            .map(|v| split_list(&v))
            .unwrap_or_default();

        Ok(Self {
            app_host,
            app_port,
            langflow_base_url,
            langflow_id,
            flow_id,
            tweaks,
            timeout,
            token_var,
            bearer_prefix,
            response_mode,
            status_passthrough,
            cors_allowed_origins,
        })
    }

    /// `{BASE}/lf/{LANGFLOW_ID}/api/v1/run/{FLOW_ID}`
    pub fn run_url(&self) -> Result<Url, url::ParseError> {
        let base = self.langflow_base_url.as_str().trim_end_matches('/');
        Url::parse(&format!(
            "{base}/lf/{}/api/v1/run/{}",
            self.langflow_id, self.flow_id
        ))
    }
}

/* --------------------------- helpers --------------------------- */

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn or_default(&self, key: &'static str, default: &'static str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingVar(key))
    }

    fn parse_or_default<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(v) => v.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
                name: key,
                value: v,
            }),
            None => Ok(default),
        }
    }

    fn bool_or_default(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.get(key) {
            Some(v) => parse_bool(&v).ok_or_else(|| ConfigError::Other(format!("Invalid bool for {key}: {v}"))),
            None => Ok(default),
        }
    }

    fn url_or_default(&self, key: &'static str, default: &'static str) -> Result<Url, ConfigError> {
        let raw = self.or_default(key, default);
        Url::parse(&raw).map_err(|_| ConfigError::InvalidUrl {
            name: key,
            value: raw,
        })
    }

    fn tweaks(&self, key: &'static str) -> Result<Option<BTreeMap<String, Value>>, ConfigError> {
        match self.get(key) {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| ConfigError::InvalidJson {
                    name: key,
                    reason: e.to_string(),
                }),
            _ => Ok(None),
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config(base_url: &str) -> Config {
    Config {
        app_host: "127.0.0.1".to_string(),
        app_port: 8080,
        langflow_base_url: Url::parse(base_url).unwrap(),
        langflow_id: "space-1".to_string(),
        flow_id: "flow-1".to_string(),
        tweaks: None,
        timeout: Some(Duration::from_secs(5)),
        token_var: "APPLICATION_TOKEN".to_string(),
        bearer_prefix: BearerPrefix::Normalize,
        response_mode: ResponseMode::Envelope,
        status_passthrough: false,
        cors_allowed_origins: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn run_url_interpolates_ids() {
        let cfg = test_config(DEFAULT_LANGFLOW_BASE_URL);
        assert_eq!(
            cfg.run_url().unwrap().as_str(),
            "https://api.langflow.astra.datastax.com/lf/space-1/api/v1/run/flow-1"
        );
    }

    #[test]
    fn run_url_ignores_trailing_slash_on_base() {
        let cfg = test_config("http://127.0.0.1:9000/");
        assert_eq!(
            cfg.run_url().unwrap().as_str(),
            "http://127.0.0.1:9000/lf/space-1/api/v1/run/flow-1"
        );
    }

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    const IDS: [(&str, &str); 2] = [("LANGFLOW_ID", "space-1"), ("FLOW_ID", "flow-1")];

    #[test]
    fn defaults_with_only_ids_set() {
        let cfg = load(&IDS).unwrap();
        assert_eq!(cfg.app_host, "0.0.0.0");
        assert_eq!(cfg.app_port, 8080);
        assert_eq!(cfg.langflow_base_url.as_str(), "https://api.langflow.astra.datastax.com/");
        assert_eq!(cfg.timeout, Some(Duration::from_secs(60)));
        assert_eq!(cfg.token_var, "APPLICATION_TOKEN");
        assert_eq!(cfg.bearer_prefix, BearerPrefix::Normalize);
        assert_eq!(cfg.response_mode, ResponseMode::Envelope);
        assert!(!cfg.status_passthrough);
        assert!(cfg.tweaks.is_none());
        assert!(cfg.cors_allowed_origins.is_empty());
    }

    #[test]
    fn missing_ids_are_rejected() {
        assert!(matches!(
            load(&[("FLOW_ID", "flow-1")]),
            Err(ConfigError::MissingVar("LANGFLOW_ID"))
        ));
        assert!(matches!(
            load(&[("LANGFLOW_ID", "space-1"), ("FLOW_ID", "  ")]),
            Err(ConfigError::MissingVar("FLOW_ID"))
        ));
    }

    #[test]
    fn zero_timeout_disables_it() {
        let cfg = load(&[IDS[0], IDS[1], ("LANGFLOW_TIMEOUT_SECS", "0")]).unwrap();
        assert_eq!(cfg.timeout, None);

        let cfg = load(&[IDS[0], IDS[1], ("LANGFLOW_TIMEOUT_SECS", "15")]).unwrap();
        assert_eq!(cfg.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(matches!(
            load(&[IDS[0], IDS[1], ("PORT", "http")]),
            Err(ConfigError::InvalidNumber { name: "PORT", .. })
        ));
        assert!(matches!(
            load(&[IDS[0], IDS[1], ("LANGFLOW_TIMEOUT_SECS", "-1")]),
            Err(ConfigError::InvalidNumber { name: "LANGFLOW_TIMEOUT_SECS", .. })
        ));
    }

    #[test]
    fn modes_parse_case_insensitively() {
        let cfg = load(&[
            IDS[0],
            IDS[1],
            ("BEARER_PREFIX", "Always"),
            ("RESPONSE_MODE", "RAW"),
            ("UPSTREAM_STATUS_PASSTHROUGH", "yes"),
        ])
        .unwrap();
        assert_eq!(cfg.bearer_prefix, BearerPrefix::Always);
        assert_eq!(cfg.response_mode, ResponseMode::Raw);
        assert!(cfg.status_passthrough);
    }

    #[test]
    fn unknown_modes_are_rejected() {
        assert!(matches!(
            load(&[IDS[0], IDS[1], ("BEARER_PREFIX", "sometimes")]),
            Err(ConfigError::Other(_))
        ));
        assert!(matches!(
            load(&[IDS[0], IDS[1], ("RESPONSE_MODE", "xml")]),
            Err(ConfigError::Other(_))
        ));
        assert!(matches!(
            load(&[IDS[0], IDS[1], ("UPSTREAM_STATUS_PASSTHROUGH", "maybe")]),
            Err(ConfigError::Other(_))
        ));
    }

    #[test]
    fn tweaks_must_be_a_json_object() {
        let cfg = load(&[IDS[0], IDS[1], ("LANGFLOW_TWEAKS", r#"{"ChatInput-1":{}}"#)]).unwrap();
        assert_eq!(cfg.tweaks.unwrap()["ChatInput-1"], serde_json::json!({}));

        assert!(matches!(
            load(&[IDS[0], IDS[1], ("LANGFLOW_TWEAKS", "{not json")]),
            Err(ConfigError::InvalidJson { name: "LANGFLOW_TWEAKS", .. })
        ));
        assert!(matches!(
            load(&[IDS[0], IDS[1], ("LANGFLOW_TWEAKS", "[1,2]")]),
            Err(ConfigError::InvalidJson { .. })
        ));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            load(&[IDS[0], IDS[1], ("LANGFLOW_BASE_URL", "not a url")]),
            Err(ConfigError::InvalidUrl { name: "LANGFLOW_BASE_URL", .. })
        ));
    }

    #[test]
    fn cors_origins_from_list() {
        let cfg = load(&[IDS[0], IDS[1], ("CORS_ALLOWED_ORIGINS", "http://a.test,http://b.test")]).unwrap();
        assert_eq!(cfg.cors_allowed_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn bool_values() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn origin_list_drops_blanks() {
        assert_eq!(
            split_list("http://a.test, ,http://b.test,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
