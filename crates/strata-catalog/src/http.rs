//! HTTP transport shared by all catalog operations.
//!
//! Wraps `reqwest` with authentication, retry with exponential backoff,
//! client-side rate limiting, and JSON helpers. Every REST call in this
//! crate funnels through [`HttpClient`].

use crate::config::{AuthConfig, ClientConfig};
use crate::errors::{CatalogError, CatalogResult};
use crate::secure_string::SecureString;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use moka::future::Cache as MokaCache;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Type alias for the rate limiter.
type RateLimiterType = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// HTTP client with retry and rate limiting support.
pub struct HttpClient {
    client: Client,
    config: ClientConfig,
    /// Current OAuth2 token (if using OAuth2 auth).
    oauth_token: Arc<RwLock<Option<OAuthToken>>>,
    /// Rate limiter for this client.
    rate_limiter: Option<Arc<RateLimiterType>>,
}

/// OAuth2 token with expiration. The access token lives in a
/// [`SecureString`] so it is zeroized once replaced.
#[derive(Clone)]
struct OAuthToken {
    access_token: SecureString,
    expires_at: std::time::Instant,
}

impl std::fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthToken")
            .field("access_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per period.
    pub max_requests: u32,
    /// Period duration.
    pub period: Duration,
    /// Maximum burst size.
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            period: Duration::from_secs(60),
            burst_size: 10,
        }
    }
}

impl HttpClient {
    /// Creates a new HTTP client from client configuration.
    pub fn new(config: ClientConfig) -> CatalogResult<Self> {
        Self::with_rate_limit(config, None)
    }

    /// Creates a new HTTP client with rate limiting.
    pub fn with_rate_limit(
        config: ClientConfig,
        rate_limit: Option<RateLimitConfig>,
    ) -> CatalogResult<Self> {
        // TLS verification cannot be disabled in release builds.
        let verify_tls = if !config.verify_tls {
            #[cfg(debug_assertions)]
            {
                warn!(
                    base_url = %config.base_url,
                    client_name = %config.name,
                    "TLS certificate verification DISABLED in development mode - connection is vulnerable to MITM attacks"
                );
                false
            }
            #[cfg(not(debug_assertions))]
            {
                warn!(
                    base_url = %config.base_url,
                    client_name = %config.name,
                    "Attempted to disable TLS verification in a release build - request IGNORED"
                );
                true
            }
        } else {
            true
        };

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!verify_tls)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90));

        let mut headers = reqwest::header::HeaderMap::new();
        for (key, value) in &config.headers {
            if let (Ok(name), Ok(val)) = (
                reqwest::header::HeaderName::try_from(key.as_str()),
                reqwest::header::HeaderValue::try_from(value.as_str()),
            ) {
                headers.insert(name, val);
            }
        }
        builder = builder.default_headers(headers);

        let client = builder
            .build()
            .map_err(|e| CatalogError::ConfigError(e.to_string()))?;

        let rate_limiter = rate_limit.map(|rl| {
            let quota = Quota::with_period(rl.period / rl.max_requests)
                .expect("Invalid rate limit period")
                .allow_burst(NonZeroU32::new(rl.burst_size).unwrap_or(NonZeroU32::MIN));
            Arc::new(GovernorRateLimiter::direct(quota))
        });

        Ok(Self {
            client,
            config,
            oauth_token: Arc::new(RwLock::new(None)),
            rate_limiter,
        })
    }

    /// Builds a URL from a path.
    pub fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Executes a GET request with retry logic.
    pub async fn get(&self, path: &str) -> CatalogResult<Response> {
        let request = self.client.get(self.build_url(path));
        self.execute_with_retry(request).await
    }

    /// Executes a GET request with query parameters.
    pub async fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> CatalogResult<Response> {
        let request = self.client.get(self.build_url(path)).query(query);
        self.execute_with_retry(request).await
    }

    /// Executes a GET request and deserializes the JSON response.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> CatalogResult<T> {
        let response = self.get(path).await?;
        self.parse_json_response(response).await
    }

    /// Executes a GET request with query parameters and deserializes the
    /// JSON response.
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> CatalogResult<T> {
        let response = self.get_with_query(path, query).await?;
        self.parse_json_response(response).await
    }

    /// Executes a POST request with retry logic.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> CatalogResult<Response> {
        let request = self.client.post(self.build_url(path)).json(body);
        self.execute_with_retry(request).await
    }

    /// Executes a POST request with query parameters.
    pub async fn post_with_query<T: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &T,
    ) -> CatalogResult<Response> {
        let request = self.client.post(self.build_url(path)).query(query).json(body);
        self.execute_with_retry(request).await
    }

    /// Executes a POST request and deserializes the JSON response.
    pub async fn post_json<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> CatalogResult<R> {
        let response = self.post(path, body).await?;
        self.parse_json_response(response).await
    }

    /// Executes a PUT request with query parameters.
    pub async fn put_with_query<T: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &T,
    ) -> CatalogResult<Response> {
        let request = self.client.put(self.build_url(path)).query(query).json(body);
        self.execute_with_retry(request).await
    }

    /// Executes a DELETE request with retry logic.
    pub async fn delete(&self, path: &str) -> CatalogResult<Response> {
        let request = self.client.delete(self.build_url(path));
        self.execute_with_retry(request).await
    }

    /// Executes a DELETE request with query parameters.
    pub async fn delete_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> CatalogResult<Response> {
        let request = self.client.delete(self.build_url(path)).query(query);
        self.execute_with_retry(request).await
    }

    /// Executes a DELETE request with query parameters and deserializes the
    /// JSON response.
    pub async fn delete_json_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> CatalogResult<T> {
        let response = self.delete_with_query(path, query).await?;
        self.parse_json_response(response).await
    }

    /// Parses a JSON response.
    async fn parse_json_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> CatalogResult<T> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| {
            CatalogError::InvalidResponse(format!(
                "Failed to parse response (status {}): {} - Body: {}",
                status,
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    /// Executes a request with authentication, rate limiting, retries, and
    /// error handling.
    async fn execute_with_retry(
        &self,
        mut request: reqwest::RequestBuilder,
    ) -> CatalogResult<Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        request = self.add_auth(request).await?;

        let mut last_error = None;
        let mut delay = Duration::from_millis(100);

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                debug!("Retry attempt {} after {:?}", attempt, delay);
                sleep(delay).await;
                // Exponential backoff with jitter
                let jitter = rand_jitter();
                delay = std::cmp::min(delay * 2 + jitter, Duration::from_secs(30));
            }

            let request_clone = request
                .try_clone()
                .ok_or_else(|| CatalogError::Internal("Failed to clone request".to_string()))?;

            match request_clone.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let retry_after = response
                            .headers()
                            .get("retry-after")
                            .and_then(|v| v.to_str().ok())
                            .and_then(|v| v.parse::<u64>().ok())
                            .unwrap_or(60);

                        warn!("Rate limited, waiting {} seconds", retry_after);

                        if attempt < self.config.max_retries {
                            sleep(Duration::from_secs(retry_after)).await;
                            continue;
                        }

                        return Err(CatalogError::RateLimited(retry_after));
                    }

                    // Server errors are retryable, client errors are not.
                    if status.is_server_error() && attempt < self.config.max_retries {
                        warn!("Server error {}, retrying...", status);
                        last_error = Some(CatalogError::RequestFailed(format!(
                            "Server error: {}",
                            status
                        )));
                        continue;
                    }

                    if status.is_client_error() {
                        return match status {
                            StatusCode::UNAUTHORIZED => {
                                Err(CatalogError::AuthenticationFailed("Unauthorized".into()))
                            }
                            StatusCode::FORBIDDEN => {
                                Err(CatalogError::AuthorizationDenied("Forbidden".into()))
                            }
                            StatusCode::NOT_FOUND => {
                                Err(CatalogError::NotFound("Resource not found".into()))
                            }
                            StatusCode::BAD_REQUEST => {
                                let body = response.text().await.unwrap_or_default();
                                Err(CatalogError::InvalidRequest(format!(
                                    "Bad request: {}",
                                    body
                                )))
                            }
                            _ => Err(CatalogError::RequestFailed(format!(
                                "Client error: {}",
                                status
                            ))),
                        };
                    }

                    return Ok(response);
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(CatalogError::Timeout(e.to_string()));
                    } else if e.is_connect() {
                        last_error = Some(CatalogError::ConnectionFailed(e.to_string()));
                    } else {
                        last_error = Some(CatalogError::RequestFailed(e.to_string()));
                    }

                    if attempt >= self.config.max_retries {
                        break;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CatalogError::Internal("Unknown error".to_string())))
    }

    /// Adds authentication to a request.
    async fn add_auth(
        &self,
        request: reqwest::RequestBuilder,
    ) -> CatalogResult<reqwest::RequestBuilder> {
        match &self.config.auth {
            AuthConfig::None => Ok(request),

            AuthConfig::ApiToken { token } => {
                Ok(request.header("Authorization", format!("Bearer {}", token.expose_secret())))
            }

            AuthConfig::Basic { username, password } => {
                Ok(request.basic_auth(username, Some(password.expose_secret())))
            }

            AuthConfig::OAuth2 {
                client_id,
                client_secret,
                token_url,
                scopes,
            } => {
                let token = self
                    .get_oauth_token(client_id, client_secret, token_url, scopes)
                    .await?;
                Ok(request.header("Authorization", format!("Bearer {}", token.expose_secret())))
            }
        }
    }

    /// Gets or refreshes an OAuth2 token.
    async fn get_oauth_token(
        &self,
        client_id: &str,
        client_secret: &SecureString,
        token_url: &str,
        scopes: &[String],
    ) -> CatalogResult<SecureString> {
        // Reuse the cached token while it has at least a minute left.
        {
            let token = self.oauth_token.read().await;
            if let Some(t) = &*token {
                if t.expires_at > std::time::Instant::now() + Duration::from_secs(60) {
                    return Ok(t.access_token.clone());
                }
            }
        }

        info!("Fetching new OAuth2 token");

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret.expose_secret()),
            ("scope", &scopes.join(" ")),
        ];

        let response = self
            .client
            .post(token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| CatalogError::AuthenticationFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::AuthenticationFailed(format!(
                "OAuth2 token request failed: {}",
                response.status()
            )));
        }

        #[derive(serde::Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: u64,
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

        let secure_access_token = SecureString::new(token_response.access_token);

        let oauth_token = OAuthToken {
            access_token: secure_access_token.clone(),
            expires_at: std::time::Instant::now() + Duration::from_secs(token_response.expires_in),
        };

        {
            let mut token = self.oauth_token.write().await;
            *token = Some(oauth_token);
        }

        Ok(secure_access_token)
    }
}

/// Generate a small random jitter for exponential backoff.
fn rand_jitter() -> Duration {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    std::time::Instant::now().hash(&mut hasher);
    let jitter_ms = hasher.finish() % 100;
    Duration::from_millis(jitter_ms)
}

/// Response cache for read-mostly lookups (typedefs, connections).
pub struct ResponseCache<V: Clone + Send + Sync + 'static> {
    cache: MokaCache<String, V>,
}

impl<V: Clone + Send + Sync + 'static> ResponseCache<V> {
    /// Creates a new cache with the specified TTL and max capacity.
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(ttl)
            .max_capacity(max_capacity)
            .build();
        Self { cache }
    }

    /// Gets a value from the cache.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.cache.get(key).await
    }

    /// Sets a value in the cache.
    pub async fn insert(&self, key: String, value: V) {
        self.cache.insert(key, value).await;
    }

    /// Removes a value from the cache.
    pub async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    /// Tries to get a value or inserts it using a fallible async function.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: String, f: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(v) = self.cache.get(&key).await {
            return Ok(v);
        }
        let value = f().await?;
        self.cache.insert(key, value.clone()).await;
        Ok(value)
    }
}
