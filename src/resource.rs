//! Byte streams for referenced resources.
//!
//! `file:` URLs are opened from the filesystem. `http`/`https` URLs go through a
//! blocking `reqwest` client with a request timeout and exponential back-off retry.

use std::fs::File;
use std::io::Read;
use std::thread::sleep;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use url::Url;

use crate::config::NetworkConfig;
use crate::error::{DiagnosticsError, Result};

/// Configuration for the HTTP side of the resource client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Number of retry attempts
    pub retry_attempts: u32,
    /// Initial retry delay in milliseconds
    pub retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds (for exponential backoff cap)
    pub max_retry_delay_ms: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            max_retry_delay_ms: 30000,
            user_agent: format!("bulk-transform/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&NetworkConfig> for HttpClientConfig {
    fn from(network: &NetworkConfig) -> Self {
        Self {
            timeout_seconds: network.timeout_seconds,
            retry_attempts: network.retry_attempts,
            retry_delay_ms: network.retry_delay_ms,
            max_retry_delay_ms: network.max_retry_delay_ms,
            ..Default::default()
        }
    }
}

/// Opens readable streams for resource URLs
#[derive(Debug, Clone, Default)]
pub struct ResourceClient {
    config: HttpClientConfig,
}

impl ResourceClient {
    pub fn new(config: HttpClientConfig) -> Self {
        Self { config }
    }

    /// Open a stream for the given absolute URL
    pub fn open(&self, url: &Url) -> Result<Box<dyn Read>> {
        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| DiagnosticsError::InvalidReference {
                        reference: url.to_string(),
                        details: "not a local file path".to_string(),
                    })?;
                let file = File::open(path)?;
                Ok(Box::new(file))
            }
            "http" | "https" => {
                let response = self.get_response_with_retry(url)?;
                Ok(Box::new(response))
            }
            scheme => Err(DiagnosticsError::UnsupportedScheme {
                scheme: scheme.to_string(),
            }),
        }
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn build_client(&self) -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(DiagnosticsError::from)
    }

    /// Get response with retry logic
    fn get_response_with_retry(&self, url: &Url) -> Result<Response> {
        let client = self.build_client()?;
        let mut current_attempt = 0;

        loop {
            match client.get(url.as_str()).send().map_err(DiagnosticsError::from) {
                Ok(response) => {
                    if response.status().is_success() {
                        return Ok(response);
                    }

                    let status = response.status();
                    let error = DiagnosticsError::HttpStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                        message: format!(
                            "HTTP {}: {}",
                            status.as_u16(),
                            status.canonical_reason().unwrap_or("Unknown")
                        ),
                    };

                    // Retry on server errors (5xx) but not client errors (4xx)
                    if status.is_server_error() && current_attempt < self.config.retry_attempts {
                        self.wait_before_retry(current_attempt);
                        current_attempt += 1;
                        continue;
                    }

                    return Err(error);
                }
                Err(error) => {
                    if current_attempt < self.config.retry_attempts && self.is_retryable_error(&error)
                    {
                        tracing::debug!(%url, attempt = current_attempt, %error, "retrying resource request");
                        self.wait_before_retry(current_attempt);
                        current_attempt += 1;
                        continue;
                    }
                    return Err(error);
                }
            }
        }
    }

    fn retry_delay(&self, attempt: u32) -> Duration {
        let delay_ms = self
            .config
            .retry_delay_ms
            .saturating_mul(2_u64.saturating_pow(attempt));
        Duration::from_millis(delay_ms.min(self.config.max_retry_delay_ms))
    }

    fn wait_before_retry(&self, attempt: u32) {
        sleep(self.retry_delay(attempt));
    }

    fn is_retryable_error(&self, error: &DiagnosticsError) -> bool {
        match error {
            DiagnosticsError::Http(reqwest_error) => {
                reqwest_error.is_timeout() || reqwest_error.is_connect() || reqwest_error.is_request()
            }
            _ => false,
        }
    }
}
