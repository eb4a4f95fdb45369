//! Configuration loading for the Strata CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strata_catalog::{AuthConfig, ClientConfig};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tenant connection settings.
    #[serde(default)]
    pub tenant: TenantConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tenant connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantConfig {
    /// Tenant name, used in logs.
    #[serde(default = "default_tenant_name")]
    pub name: String,

    /// Base URL of the tenant, e.g. `https://acme.strata.io`.
    #[serde(default)]
    pub base_url: String,

    /// API token. `${VAR}` is resolved from the environment at load time.
    #[serde(default)]
    pub api_token: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries for retryable failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_tenant_name() -> String {
    "default".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            name: default_tenant_name(),
            base_url: String::new(),
            api_token: String::new(),
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to use JSON format.
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Creates a copy with secrets redacted for display.
    pub fn redact_secrets(&self) -> Self {
        let mut config = self.clone();
        if !config.tenant.api_token.is_empty() {
            config.tenant.api_token = "***REDACTED***".to_string();
        }
        config
    }

    /// Builds the SDK client configuration, resolving `${VAR}` tokens from
    /// the environment.
    pub fn to_client_config(&self) -> Result<ClientConfig> {
        if self.tenant.base_url.is_empty() {
            anyhow::bail!("tenant.base_url is not configured");
        }

        let token = resolve_env(&self.tenant.api_token)?;
        let auth = if token.is_empty() {
            AuthConfig::None
        } else {
            AuthConfig::ApiToken {
                token: token.into(),
            }
        };

        let mut client = ClientConfig::new(&self.tenant.name, &self.tenant.base_url, auth);
        client.timeout_secs = self.tenant.timeout_secs;
        client.max_retries = self.tenant.max_retries;
        Ok(client)
    }
}

/// Resolves `${VAR}` placeholders against the environment; anything else
/// passes through unchanged.
fn resolve_env(value: &str) -> Result<String> {
    if let Some(var) = value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        return std::env::var(var)
            .with_context(|| format!("Environment variable {} is not set", var));
    }
    Ok(value.to_string())
}
