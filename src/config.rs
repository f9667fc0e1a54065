//! Configuration for crm-tools
//!
//! TOML file at ~/.crm-tools/config.toml. Every section is optional.

use crate::errors::CrmError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding `api.endpoint`
pub const ENDPOINT_ENV: &str = "CRM_API_ENDPOINT";

pub const DEFAULT_ENDPOINT: &str = "https://cloudresourcemanager.googleapis.com";
pub const DEFAULT_METADATA_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub iam: IamConfig,
}

/// Resource Manager endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

/// Application Default Credentials settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub gcloud_command: String,
    pub use_metadata_server: bool,
    pub metadata_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IamConfig {
    /// Policy version written by overwrite mode
    pub overwrite_policy_version: i32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            gcloud_command: "gcloud".to_string(),
            use_metadata_server: true,
            metadata_url: DEFAULT_METADATA_URL.to_string(),
        }
    }
}

impl Default for IamConfig {
    fn default() -> Self {
        Self {
            overwrite_policy_version: 1,
        }
    }
}

impl Config {
    /// Load configuration for a tool run.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// read if present and built-in defaults are used otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Self::config_path()?;
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Config::default()
                }
            }
        };

        config.apply_env_overrides(std::env::var(ENDPOINT_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no request could succeed with
    pub fn validate(&self) -> crate::errors::Result<()> {
        let endpoint = self.endpoint();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(CrmError::Config(format!(
                "api.endpoint must be an http(s) URL, got '{}'",
                endpoint
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(CrmError::Config("api.timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Read and parse a TOML configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;

        Ok(home.join(".crm-tools").join("config.toml"))
    }

    fn apply_env_overrides(&mut self, endpoint: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.api.endpoint = endpoint;
        }
    }

    /// Endpoint without a trailing slash
    pub fn endpoint(&self) -> &str {
        self.api.endpoint.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.auth.gcloud_command, "gcloud");
        assert!(config.auth.use_metadata_server);
        assert_eq!(config.iam.overwrite_policy_version, 1);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\ntimeout_secs = 5\n\n[auth]\nuse_metadata_server = false").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.endpoint, DEFAULT_ENDPOINT);
        assert!(!config.auth.use_metadata_server);
        assert_eq!(config.auth.gcloud_command, "gcloud");
        assert_eq!(config.iam.overwrite_policy_version, 1);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(Some(dir.path().join("absent.toml").as_path()));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nendpoint = ").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.api.endpoint = "cloudresourcemanager.googleapis.com".to_string();
        assert!(matches!(config.validate(), Err(CrmError::Config(_))));

        config.api.endpoint = DEFAULT_ENDPOINT.to_string();
        config.api.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(CrmError::Config(_))));
    }

    #[test]
    fn test_env_override_and_trailing_slash() {
        let mut config = Config::default();
        config.apply_env_overrides(Some("http://127.0.0.1:8085/".to_string()));
        assert_eq!(config.endpoint(), "http://127.0.0.1:8085");

        config.apply_env_overrides(Some("  ".to_string()));
        assert_eq!(config.endpoint(), "http://127.0.0.1:8085");
    }
}
