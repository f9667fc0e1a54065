//! Application Default Credentials
//!
//! Resolves a bearer token for the cloud-platform scope. Sources are tried in
//! order and the first one that yields a token wins:
//! 1. `GOOGLE_OAUTH_ACCESS_TOKEN` environment variable
//! 2. `gcloud auth application-default print-access-token`
//! 3. The compute metadata server

use crate::config::AuthConfig;
use crate::errors::{CrmError, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Environment variable holding a ready-made access token
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// OAuth scope required by the Resource Manager API
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

const GCLOUD_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the metadata server token request
const METADATA_TIMEOUT: Duration = Duration::from_secs(2);

/// Where a token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    Gcloud,
    MetadataServer,
}

/// Bearer token for API calls
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    pub source: CredentialSource,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Token endpoint response of the metadata server
#[derive(Debug, Deserialize)]
struct MetadataToken {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Ordered credential sources for one tool run
#[derive(Debug, Clone)]
pub struct CredentialChain {
    env_token: Option<String>,
    gcloud_command: Option<String>,
    metadata_url: Option<String>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            secret: secret.into(),
            source,
            expires_at: None,
        }
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.secret)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|at| at <= now).unwrap_or(false)
    }

    /// Fail with `CrmError::Auth` once the token is past its expiry
    pub fn ensure_fresh(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_expired(now) {
            return Err(CrmError::Auth(format!("access token from {} has expired", self.source)));
        }
        Ok(())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("source", &self.source)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "{}", ACCESS_TOKEN_ENV),
            CredentialSource::Gcloud => write!(f, "gcloud application-default"),
            CredentialSource::MetadataServer => write!(f, "metadata server"),
        }
    }
}

impl CredentialChain {
    /// Build the chain from configuration and the process environment
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            std::env::var(ACCESS_TOKEN_ENV).ok(),
            Some(config.gcloud_command.clone()).filter(|c| !c.trim().is_empty()),
            config
                .use_metadata_server
                .then(|| config.metadata_url.clone()),
        )
    }

    pub fn new(
        env_token: Option<String>,
        gcloud_command: Option<String>,
        metadata_url: Option<String>,
    ) -> Self {
        Self {
            env_token,
            gcloud_command,
            metadata_url,
        }
    }

    /// Try each source in order
    pub async fn resolve(&self, http: &Client) -> Result<AccessToken> {
        let mut failures: Vec<String> = Vec::new();

        match self.env_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => {
                tracing::debug!("using access token from {}", ACCESS_TOKEN_ENV);
                return Ok(AccessToken::new(token, CredentialSource::Environment));
            }
            _ => failures.push(format!("{} not set", ACCESS_TOKEN_ENV)),
        }

        if let Some(command) = &self.gcloud_command {
            match gcloud_token(command).await {
                Ok(token) => {
                    tracing::debug!("using application-default token from {}", command);
                    return Ok(token);
                }
                Err(e) => failures.push(format!("{}: {}", command, e)),
            }
        }

        match &self.metadata_url {
            Some(url) => match metadata_token(http, url).await {
                Ok(token) => {
                    tracing::debug!(expires_at = ?token.expires_at, "using metadata server token");
                    return Ok(token);
                }
                Err(e) => failures.push(format!("metadata server: {}", e)),
            },
            None => failures.push("metadata server disabled".to_string()),
        }

        Err(CrmError::Auth(format!(
            "no application default credentials found ({})",
            failures.join("; ")
        )))
    }
}

/// Ask gcloud for the application-default access token
async fn gcloud_token(command: &str) -> Result<AccessToken> {
    let mut cmd = Command::new(command);
    cmd.args(["auth", "application-default", "print-access-token"]);

    let output = match timeout(GCLOUD_TIMEOUT, cmd.output()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(CrmError::Auth(format!(
                "timed out after {}s",
                GCLOUD_TIMEOUT.as_secs()
            )))
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CrmError::Auth(format!(
            "exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    parse_gcloud_output(&String::from_utf8_lossy(&output.stdout))
}

fn parse_gcloud_output(stdout: &str) -> Result<AccessToken> {
    let token = stdout.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(CrmError::Auth("printed no usable token".to_string()));
    }
    Ok(AccessToken::new(token, CredentialSource::Gcloud))
}

/// Fetch a token from the compute metadata server
async fn metadata_token(http: &Client, url: &str) -> Result<AccessToken> {
    let response = http
        .get(url)
        .header("Metadata-Flavor", "Google")
        .query(&[("scopes", CLOUD_PLATFORM_SCOPE)])
        .timeout(METADATA_TIMEOUT)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(CrmError::Auth(format!("returned status {}", response.status())));
    }

    let body = response.text().await?;
    parse_metadata_token(&body, Utc::now())
}

fn parse_metadata_token(body: &str, now: DateTime<Utc>) -> Result<AccessToken> {
    let raw: MetadataToken = serde_json::from_str(body)?;
    let mut token = AccessToken::new(raw.access_token, CredentialSource::MetadataServer);
    token.expires_at = raw
        .expires_in
        .map(|secs| now + ChronoDuration::seconds(secs));
    Ok(token)
}
