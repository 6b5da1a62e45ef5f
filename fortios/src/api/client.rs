use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::common::{ApiErrorDetails, ApiErrorResponse, FortiResponse};
use super::error::ApiError;

/// FortiOS REST API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
    retry_config: RetryConfig,
    firmware_version: Mutex<Option<String>>,
}

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub timeout_seconds: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10000,
            timeout_seconds: 30,
        }
    }
}

impl RetryConfig {
    /// Delay before retry `attempt` (1-based), doubling up to `max_backoff_ms`
    pub fn backoff_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1);
        2_u64
            .checked_pow(exponent)
            .and_then(|factor| self.initial_backoff_ms.checked_mul(factor))
            .unwrap_or(u64::MAX)
            .min(self.max_backoff_ms)
    }
}

impl Client {
    /// Create a new API client with default configuration
    pub fn new(hostname: &str, token: &str, insecure: bool) -> Result<Self, ApiError> {
        Self::with_config(hostname, token, insecure, None, RetryConfig::default())
    }

    /// Create a new API client with custom proxy and retry configuration
    pub fn with_config(
        hostname: &str,
        token: &str,
        insecure: bool,
        http_proxy: Option<&str>,
        retry_config: RetryConfig,
    ) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure)
            .timeout(Duration::from_secs(retry_config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .tcp_keepalive(Duration::from_secs(30));

        if let Some(proxy) = http_proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client: builder.build()?,
                base_url: normalize_base_url(hostname)?,
                auth_header: format!("Bearer {}", token),
                retry_config,
                firmware_version: Mutex::new(None),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// CMDB (configuration database) operations on one table path,
    /// e.g. `firewall/address`
    pub fn cmdb<'a>(&'a self, path: &'a str) -> super::cmdb::CmdbApi<'a> {
        super::cmdb::CmdbApi::new(self, path)
    }

    /// Firmware version of the target, fetched on first use and cached for
    /// the lifetime of the client
    pub async fn firmware_version(&self) -> Result<String, ApiError> {
        let mut cached = self.inner.firmware_version.lock().await;
        if let Some(version) = cached.as_ref() {
            return Ok(version.clone());
        }

        let version = self.get_system_status().await?.version;
        tracing::debug!("Target firmware version: {}", version);
        *cached = Some(version.clone());
        Ok(version)
    }

    /// Re-fetch the firmware version and replace the cached value
    pub async fn refresh_firmware_version(&self) -> Result<String, ApiError> {
        let mut cached = self.inner.firmware_version.lock().await;
        let version = self.get_system_status().await?.version;
        *cached = Some(version.clone());
        Ok(version)
    }

    /// Execute a GET request with retry logic
    pub async fn get(&self, path: &str) -> Result<FortiResponse, ApiError> {
        self.execute_with_retry(
            || async {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("GET request to: {}", url);

                self.inner
                    .http_client
                    .get(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    /// Execute a POST request with retry logic
    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<FortiResponse, ApiError> {
        self.execute_with_retry(
            || async {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("POST request to: {}", url);

                self.inner
                    .http_client
                    .post(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .json(body)
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    /// Execute a PUT request with retry logic
    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<FortiResponse, ApiError> {
        self.execute_with_retry(
            || async {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("PUT request to: {}", url);

                self.inner
                    .http_client
                    .put(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .json(body)
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    /// Execute a DELETE request with retry logic
    pub async fn delete(&self, path: &str) -> Result<FortiResponse, ApiError> {
        self.execute_with_retry(
            || async {
                let url = format!("{}{}", self.inner.base_url, path);

                tracing::debug!("DELETE request to: {}", url);

                self.inner
                    .http_client
                    .delete(&url)
                    .header(AUTHORIZATION, &self.inner.auth_header)
                    .send()
                    .await
            },
            path,
        )
        .await
    }

    /// Execute request with retry logic
    async fn execute_with_retry<F, Fut>(
        &self,
        request_fn: F,
        path: &str,
    ) -> Result<FortiResponse, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.inner.retry_config.max_retries {
            if attempt > 0 {
                let backoff = self.inner.retry_config.backoff_ms(attempt);
                tracing::debug!(
                    "Retrying request to {} after {}ms (attempt {})",
                    path,
                    backoff,
                    attempt
                );
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return self.parse_success_response(response).await;
                    }

                    match status {
                        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                            return Err(ApiError::AuthError);
                        }
                        reqwest::StatusCode::NOT_FOUND => {
                            return Err(ApiError::NotFound(path.to_string()));
                        }
                        reqwest::StatusCode::TOO_MANY_REQUESTS => {
                            last_error = Some(ApiError::RateLimited);
                        }
                        reqwest::StatusCode::BAD_GATEWAY
                        | reqwest::StatusCode::SERVICE_UNAVAILABLE
                        | reqwest::StatusCode::GATEWAY_TIMEOUT => {
                            last_error = Some(ApiError::ServiceUnavailable);
                        }
                        _ => return self.handle_error_response(response).await,
                    }
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error =
                            Some(ApiError::Timeout(self.inner.retry_config.timeout_seconds));
                    } else if e.is_connect() {
                        last_error = Some(ApiError::ServiceUnavailable);
                    } else {
                        return Err(ApiError::RequestError(e));
                    }
                }
            }

            attempt += 1;
        }

        Err(last_error.unwrap_or(ApiError::ServiceUnavailable))
    }

    /// Parse successful response
    async fn parse_success_response(
        &self,
        response: reqwest::Response,
    ) -> Result<FortiResponse, ApiError> {
        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        if text.trim().is_empty() {
            return Ok(FortiResponse::default());
        }

        serde_json::from_str::<FortiResponse>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    /// Handle error response
    async fn handle_error_response(
        &self,
        response: reqwest::Response,
    ) -> Result<FortiResponse, ApiError> {
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let details = serde_json::from_str::<ApiErrorResponse>(&text)
            .ok()
            .map(|err_resp| {
                Box::new(ApiErrorDetails {
                    code: err_resp.error,
                    cli_error: err_resp.cli_error,
                })
            });

        tracing::error!("API error response (HTTP {}): {}", status, text);

        Err(ApiError::ApiError {
            status,
            message: text,
            details,
        })
    }
}

/// Accepts a bare host (`192.168.1.99`, `fgt.example.com:8443`) or a full URL
fn normalize_base_url(hostname: &str) -> Result<String, ApiError> {
    let hostname = hostname.trim();
    if hostname.is_empty() {
        return Err(ApiError::InvalidUrl("hostname is empty".to_string()));
    }

    let candidate = if hostname.contains("://") {
        hostname.to_string()
    } else {
        format!("https://{}", hostname)
    };

    let parsed =
        url::Url::parse(&candidate).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", hostname, e)))?;
    if parsed.host_str().is_none() {
        return Err(ApiError::InvalidUrl(hostname.to_string()));
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[test]
    fn base_url_defaults_to_https() {
        assert_eq!(
            normalize_base_url("192.168.1.99").unwrap(),
            "https://192.168.1.99"
        );
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8080/").unwrap(),
            "http://127.0.0.1:8080"
        );
        assert!(matches!(
            normalize_base_url("  "),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn client_sends_bearer_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/monitor/system/status")
            .match_header("authorization", "Bearer secret-token")
            .with_body(r#"{"status":"success","http_status":200,"version":"v7.2.0","build":1157,"results":{}}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret-token", true).unwrap();
        let response = client.get("/api/v2/monitor/system/status").await.unwrap();

        assert!(response.is_success());
        assert_eq!(response.version.as_deref(), Some("v7.2.0"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn client_handles_authentication_failure() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v2/monitor/system/status")
            .with_status(401)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "invalid-token", true).unwrap();

        let result = client.get("/api/v2/monitor/system/status").await;
        match result {
            Err(ApiError::AuthError) => {}
            other => panic!("Expected AuthError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn client_reports_api_error_details() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v2/cmdb/firewall/address")
            .with_status(500)
            .with_body(r#"{"status":"error","http_status":500,"error":-5,"cli_error":"entry already exists"}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "token", true).unwrap();
        let result = client
            .post("/api/v2/cmdb/firewall/address", &serde_json::json!({"name": "web"}))
            .await;

        match result {
            Err(ApiError::ApiError {
                status, details, ..
            }) => {
                assert_eq!(status, 500);
                let details = details.expect("details should be parsed");
                assert_eq!(details.code, Some(-5));
                assert_eq!(details.cli_error.as_deref(), Some("entry already exists"));
            }
            other => panic!("Expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn client_retries_unavailable_service() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/monitor/system/status")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let retry = RetryConfig {
            max_retries: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            timeout_seconds: 5,
        };
        let client = Client::with_config(&server.url(), "token", true, None, retry).unwrap();

        let result = client.get("/api/v2/monitor/system/status").await;
        assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
        mock.assert_async().await;
    }

    #[test]
    fn backoff_doubles_and_saturates() {
        let retry = RetryConfig::default();
        assert_eq!(retry.backoff_ms(1), 100);
        assert_eq!(retry.backoff_ms(2), 200);
        assert_eq!(retry.backoff_ms(4), 800);
        assert_eq!(retry.backoff_ms(8), 10000);
        assert_eq!(retry.backoff_ms(64), 10000);
        assert_eq!(retry.backoff_ms(u32::MAX), 10000);
    }

    #[tokio::test]
    async fn many_retries_do_not_overflow_backoff() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/monitor/system/status")
            .with_status(503)
            .expect(71)
            .create_async()
            .await;

        let retry = RetryConfig {
            max_retries: 70,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            timeout_seconds: 5,
        };
        let client = Client::with_config(&server.url(), "token", true, None, retry).unwrap();

        let result = client.get("/api/v2/monitor/system/status").await;
        assert!(matches!(result, Err(ApiError::ServiceUnavailable)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn firmware_version_is_fetched_once() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/monitor/system/status")
            .with_body(r#"{"status":"success","http_status":200,"version":"v7.2.0","results":{}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "token", true).unwrap();

        assert_eq!(client.firmware_version().await.unwrap(), "7.2.0");
        assert_eq!(client.clone().firmware_version().await.unwrap(), "7.2.0");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn refresh_firmware_version_refetches() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/api/v2/monitor/system/status")
            .with_body(r#"{"status":"success","http_status":200,"version":"v7.0.12","results":{}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "token", true).unwrap();
        assert_eq!(client.firmware_version().await.unwrap(), "7.0.12");
        first.assert_async().await;
        first.remove_async().await;

        let _second = server
            .mock("GET", "/api/v2/monitor/system/status")
            .with_body(r#"{"status":"success","http_status":200,"version":"v7.2.5","results":{}}"#)
            .create_async()
            .await;

        assert_eq!(client.refresh_firmware_version().await.unwrap(), "7.2.5");
        assert_eq!(client.firmware_version().await.unwrap(), "7.2.5");
    }
}
