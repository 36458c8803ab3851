//! Client configuration.
//!
//! Values are layered, later layers winning:
//! 1. built-in defaults
//! 2. a TOML file (`bastion.toml` in the working directory unless a path is given)
//! 3. `BASTION_*` environment variables, e.g. `BASTION_BASE_URL`
//! 4. explicit overrides, usually from command-line flags

use std::path::{Path, PathBuf};
use std::time::Duration;

use bastion_application::ClientSettings;
use bastion_domain::{BaseUrl, DomainError};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::adapters::DEFAULT_USER_AGENT;

/// Prefix of the environment variables read by [`ClientConfig::load`].
pub const ENV_PREFIX: &str = "BASTION";

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_FILE: &str = "bastion";

/// Errors raised while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A source could not be read or the values did not fit.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The base URL is not a usable http(s) URL.
    #[error("invalid base_url: {0}")]
    InvalidBaseUrl(#[source] DomainError),

    /// The timeout must be at least one second.
    #[error("timeout_secs must be greater than zero")]
    InvalidTimeout,
}

/// Values set explicitly by the caller; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Base URL override.
    pub base_url: Option<String>,
    /// Timeout override in seconds.
    pub timeout_secs: Option<u64>,
    /// Session file override.
    pub session_path: Option<PathBuf>,
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Session file; the platform config directory when unset.
    #[serde(default)]
    pub session_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Loads the configuration from every layer.
    ///
    /// `file` must exist when given; the default `bastion.toml` is optional.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source is unreadable or a value has
    /// the wrong type.
    pub fn load(file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        Self::load_with_env(
            file,
            Environment::with_prefix(ENV_PREFIX).try_parsing(true),
            overrides,
        )
    }

    fn load_with_env(
        file: Option<&Path>,
        env: Environment,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let file_source = match file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_FILE).required(false),
        };

        let config = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .add_source(file_source)
            .add_source(env)
            .set_override_option("base_url", overrides.base_url.clone())?
            .set_override_option("timeout_secs", overrides.timeout_secs)?
            .set_override_option(
                "session_path",
                overrides
                    .session_path
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validates the values and converts them into client settings.
    ///
    /// # Errors
    ///
    /// Returns an error for an unusable base URL or a zero timeout.
    pub fn to_settings(&self) -> Result<ClientSettings, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        let base_url = BaseUrl::parse(&self.base_url).map_err(ConfigError::InvalidBaseUrl)?;
        Ok(ClientSettings::new(base_url).with_timeout(self.timeout()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(Some(map))
    }

    fn missing_file() -> PathBuf {
        PathBuf::from("/nonexistent/bastion-test.toml")
    }

    #[test]
    fn test_defaults_without_sources() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bastion.toml");
        std::fs::write(&file, "").unwrap();

        let config =
            ClientConfig::load_with_env(Some(&file), env(&[]), &ConfigOverrides::default())
                .unwrap();

        assert_eq!(
            config,
            ClientConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout_secs: 30,
                user_agent: DEFAULT_USER_AGENT.to_string(),
                session_path: None,
            }
        );
    }

    #[test]
    fn test_layers_override_in_order() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bastion.toml");
        std::fs::write(
            &file,
            "base_url = \"https://file.example\"\ntimeout_secs = 10\nuser_agent = \"from-file\"\n",
        )
        .unwrap();

        let config = ClientConfig::load_with_env(
            Some(&file),
            env(&[("BASTION_TIMEOUT_SECS", "45"), ("BASTION_USER_AGENT", "from-env")]),
            &ConfigOverrides {
                base_url: Some("https://flag.example".to_string()),
                ..ConfigOverrides::default()
            },
        )
        .unwrap();

        assert_eq!(config.base_url, "https://flag.example");
        assert_eq!(config.timeout_secs, 45);
        assert_eq!(config.user_agent, "from-env");
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let result = ClientConfig::load_with_env(
            Some(&missing_file()),
            env(&[]),
            &ConfigOverrides::default(),
        );
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_session_path_override() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bastion.toml");
        std::fs::write(&file, "").unwrap();

        let config = ClientConfig::load_with_env(
            Some(&file),
            env(&[]),
            &ConfigOverrides {
                session_path: Some(PathBuf::from("/tmp/bastion/session.json")),
                ..ConfigOverrides::default()
            },
        )
        .unwrap();

        assert_eq!(
            config.session_path,
            Some(PathBuf::from("/tmp/bastion/session.json"))
        );
    }

    #[test]
    fn test_to_settings_validates() {
        let mut config = ClientConfig {
            base_url: "https://admin.example.com/".to_string(),
            timeout_secs: 12,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            session_path: None,
        };

        let settings = config.to_settings().unwrap();
        assert_eq!(settings.base_url.to_string(), "https://admin.example.com");
        assert_eq!(settings.timeout, Duration::from_secs(12));

        config.timeout_secs = 0;
        assert!(matches!(
            config.to_settings(),
            Err(ConfigError::InvalidTimeout)
        ));

        config.timeout_secs = 1;
        config.base_url = "ftp://admin.example.com".to_string();
        assert!(matches!(
            config.to_settings(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }
}
