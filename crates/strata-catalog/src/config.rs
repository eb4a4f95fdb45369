//! Client configuration and authentication settings.

use crate::secure_string::SecureString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration for a [`CatalogClient`](crate::CatalogClient).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Client name, used in logs to tell tenants apart.
    pub name: String,
    /// Base URL of the catalog tenant, e.g. `https://tenant.strata.io`.
    pub base_url: String,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum retries for retryable failures.
    pub max_retries: u32,
    /// Whether to verify TLS certificates.
    pub verify_tls: bool,
    /// Additional headers sent with every request.
    pub headers: HashMap<String, String>,
}

impl ClientConfig {
    /// Creates a configuration with the defaults used by most tenants:
    /// 30 second timeout, 3 retries, TLS verification on.
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, auth: AuthConfig) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            auth,
            timeout_secs: 30,
            max_retries: 3,
            verify_tls: true,
            headers: HashMap::new(),
        }
    }
}

/// Authentication configuration.
///
/// Credential fields use [`SecureString`] so secrets are zeroized from
/// memory when no longer needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication.
    None,
    /// API token sent as a bearer token. The usual mode for service accounts.
    ApiToken {
        /// The API token (zeroized on drop).
        token: SecureString,
    },
    /// Basic authentication.
    Basic {
        /// The username.
        username: String,
        /// The password (zeroized on drop).
        password: SecureString,
    },
    /// OAuth2 client credentials.
    OAuth2 {
        /// The client ID.
        client_id: String,
        /// The client secret (zeroized on drop).
        client_secret: SecureString,
        /// The token URL.
        token_url: String,
        /// The scopes to request.
        scopes: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new(
            "acme",
            "https://acme.strata.io",
            AuthConfig::ApiToken {
                token: "tok".into(),
            },
        );
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert!(config.verify_tls);
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_auth_config_tagged_serde() {
        let auth = AuthConfig::ApiToken {
            token: "tok".into(),
        };
        let json = serde_json::to_value(&auth).unwrap();
        assert_eq!(json["type"], "api_token");

        let parsed: AuthConfig = serde_json::from_value(json).unwrap();
        assert!(matches!(parsed, AuthConfig::ApiToken { .. }));
    }
}
