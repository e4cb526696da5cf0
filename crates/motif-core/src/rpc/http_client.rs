//! Pooled HTTP client with a concurrency cap for node requests.
//!
//! Requests are sent exactly once. Retrying is left to callers; the adapter contract is
//! that every repository call maps to at most one node request.

use reqwest::{Client, ClientBuilder};
use std::{sync::Arc, time::Duration};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::rpc::RpcError;

/// Configuration for the HTTP client's concurrency control.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum number of concurrent requests allowed.
    pub concurrent_limit: usize,
    /// Time to wait for a free permit before failing the request.
    pub permit_timeout_ms: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self { concurrent_limit: 1000, permit_timeout_ms: 500 }
    }
}

/// HTTP client wrapper with connection pooling and a semaphore-based request cap.
pub struct HttpClient {
    client: Client,
    concurrent_limit: Arc<Semaphore>,
    config: HttpClientConfig,
}

struct PermitGuard {
    _permit: OwnedSemaphorePermit,
    semaphore: Arc<Semaphore>,
}

impl Drop for PermitGuard {
    fn drop(&mut self) {
        tracing::trace!(
            available_permits = self.semaphore.available_permits(),
            "permit guard dropped"
        );
    }
}

impl HttpClient {
    /// Creates a client with the default concurrency settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn new() -> Result<Self, RpcError> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Maps a reqwest error onto a message that carries no URL or payload.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_decode() {
            "response decode error".to_string()
        } else if error.is_redirect() {
            "too many redirects".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client cannot be built.
    pub fn with_config(config: HttpClientConfig) -> Result<Self, RpcError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(100)
            .connect_timeout(Duration::from_secs(5))
            .use_rustls_tls()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("motif/", env!("CARGO_PKG_VERSION")))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                RpcError::Transport(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self {
            client,
            concurrent_limit: Arc::new(Semaphore::new(config.concurrent_limit.max(1))),
            config,
        })
    }

    /// POSTs a JSON body and returns the raw response body.
    ///
    /// # Errors
    ///
    /// - [`RpcError::Timeout`] when no permit frees up in time or the request times out
    /// - [`RpcError::Http`] for non-2xx responses
    /// - [`RpcError::Transport`] for connection-level failures
    pub async fn send_request(
        &self,
        url: &str,
        body: bytes::Bytes,
        timeout: Duration,
    ) -> Result<bytes::Bytes, RpcError> {
        let permit = tokio::time::timeout(
            Duration::from_millis(self.config.permit_timeout_ms),
            Arc::clone(&self.concurrent_limit).acquire_owned(),
        )
        .await
        .map_err(|_| {
            tracing::warn!(
                available_permits = self.concurrent_limit.available_permits(),
                "http client semaphore acquisition timeout"
            );
            RpcError::Timeout
        })?
        .map_err(|_| RpcError::ConcurrencyLimit("http client semaphore closed".to_string()))?;

        let _guard = PermitGuard { _permit: permit, semaphore: Arc::clone(&self.concurrent_limit) };

        let response = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::Timeout
                } else {
                    RpcError::Transport(Self::sanitize_network_error(&e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let raw_text = response.text().await.unwrap_or_default();
            let sanitized_text = if raw_text.len() > 256 {
                let mut cut = 256;
                while !raw_text.is_char_boundary(cut) {
                    cut -= 1;
                }
                format!("{}... (truncated)", &raw_text[..cut])
            } else {
                raw_text
            };
            return Err(RpcError::Http(status.as_u16(), sanitized_text));
        }

        response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                RpcError::Timeout
            } else {
                RpcError::Transport(Self::sanitize_network_error(&e))
            }
        })
    }

    #[cfg(test)]
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.concurrent_limit.available_permits()
    }
}
