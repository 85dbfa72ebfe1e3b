//! Dashboard HTTP API configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_base_url() -> String {
    String::from("http://localhost:8080")
}

const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the dashboard API, without the `/study` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL with trailing slashes removed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] if no base URL is set, or
    /// [`ConfigError::InvalidValue`] if it is not an `http(s)` URL.
    pub fn normalized_base_url(&self) -> Result<String, ConfigError> {
        if !self.is_configured() {
            return Err(ConfigError::NotConfigured {
                section: "api".to_string(),
            });
        }
        let url = self.base_url.trim().trim_end_matches('/');
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api.base_url".to_string(),
                reason: format!("'{url}' is not an http(s) URL"),
            });
        }
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_correct() {
        let config = ApiConfig::default();
        assert!(config.is_configured());
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ApiConfig {
            base_url: "https://dash.example.org/".into(),
            ..Default::default()
        };
        assert_eq!(
            config.normalized_base_url().unwrap(),
            "https://dash.example.org"
        );
    }

    #[test]
    fn non_http_url_is_invalid() {
        let config = ApiConfig {
            base_url: "ftp://example.org".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.normalized_base_url(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn empty_url_is_not_configured() {
        let config = ApiConfig {
            base_url: "  ".into(),
            ..Default::default()
        };
        assert!(!config.is_configured());
        assert!(matches!(
            config.normalized_base_url(),
            Err(ConfigError::NotConfigured { .. })
        ));
    }
}
