use std::fmt;
use std::time::Duration;

use crate::{env_optional, env_required, ConfigError, FromEnv};

/// Qdrant connection configuration
///
/// Resolved from the process environment when a session is initialized:
/// - `QDRANT_URL` (required)
/// - `QDRANT_API_KEY` (optional, anonymous access when unset)
///
/// The request timeout is fixed at [`QdrantConfig::DEFAULT_TIMEOUT_SECS`].
#[derive(Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl QdrantConfig {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl FromEnv for QdrantConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let url = env_required("QDRANT_URL")?;
        let api_key = env_optional("QDRANT_API_KEY");

        Ok(Self {
            url,
            api_key,
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
        })
    }
}

// Keeps the credential out of logs.
impl fmt::Debug for QdrantConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QdrantConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qdrant_config_from_env_success() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", Some("http://qdrant:6334")),
                ("QDRANT_API_KEY", Some("secret")),
            ],
            || {
                let config = QdrantConfig::from_env().unwrap();
                assert_eq!(config.url, "http://qdrant:6334");
                assert_eq!(config.api_key.as_deref(), Some("secret"));
                assert_eq!(config.timeout_secs, 60);
                assert_eq!(config.timeout(), Duration::from_secs(60));
            },
        );
    }

    #[test]
    fn test_qdrant_config_api_key_is_optional() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", Some("http://localhost:6334")),
                ("QDRANT_API_KEY", None),
            ],
            || {
                let config = QdrantConfig::from_env().unwrap();
                assert!(config.api_key.is_none());
            },
        );
    }

    #[test]
    fn test_qdrant_config_from_env_missing_url() {
        temp_env::with_var_unset("QDRANT_URL", || {
            let err = QdrantConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("QDRANT_URL"));
        });
    }

    #[test]
    fn test_qdrant_config_builders() {
        let config = QdrantConfig::new("http://localhost:6334")
            .with_api_key("key")
            .with_timeout(5);

        assert_eq!(config.url, "http://localhost:6334");
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_qdrant_config_debug_redacts_api_key() {
        let config = QdrantConfig::new("http://localhost:6334").with_api_key("super-secret");
        let debug = format!("{:?}", config);

        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
