use std::env;

use crate::config::BearerPrefix;

/// Supplies the upstream bearer credential. Read on every call, never cached.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Reads the credential from a named environment variable.
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl TokenSource for EnvToken {
    fn token(&self) -> Option<String> {
        env::var(&self.var).ok()
    }
}

/// Fixed credential for tests.
#[cfg(test)]
pub struct StaticToken(pub Option<String>);

#[cfg(test)]
impl TokenSource for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Trimmed token, or `None` when unset or blank.
pub fn present(raw: Option<String>) -> Option<String> {
    raw.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Build the `Authorization` header value from a trimmed token.
pub fn authorization_value(token: &str, mode: BearerPrefix) -> String {
    let token = token.trim();
    match mode {
        BearerPrefix::Normalize if token.starts_with("Bearer ") => token.to_string(),
        BearerPrefix::Normalize | BearerPrefix::Always => format!("Bearer {token}"),
    }
}
