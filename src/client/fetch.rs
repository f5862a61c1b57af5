//! GraphQL HTTP client for multipart responses.
//!
//! Provides [`GraphQLClient`], which sends an operation, negotiates the
//! multipart protocol variant from the response `Content-Type`, and streams
//! decoded payloads.
//!
//! # Examples
//!
//! ## Subscription over HTTP
//!
//! ```ignore
//! use graphql_multipart::{GraphQLClient, GraphQLRequest};
//! use graphql_multipart::protocol::ProtocolSpec;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GraphQLClient::new();
//!     let request = GraphQLRequest::new("subscription { reviewAdded { stars } }");
//!
//!     let mut stream = client
//!         .execute("http://localhost:4000/graphql", &request, &ProtocolSpec::SUBSCRIPTION)
//!         .await?;
//!
//!     while let Some(result) = stream.next().await {
//!         match result {
//!             Ok(payload) => println!("{}", String::from_utf8_lossy(&payload)),
//!             Err(e) => eprintln!("Error: {}", e),
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use super::config::ClientConfig;
use super::subscription::{BodyDecoder, ResponseStream};
use super::utils::exponential_backoff;
use crate::error::{MultipartError, Result};
use crate::protocol::constants::headers;
use crate::protocol::{accept_header, content_type_from_headers, ProtocolSpec, SpecificationRegistry};
use crate::types::GraphQLRequest;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// HTTP client for GraphQL operations answered with multipart responses.
///
/// Cloning is cheap; clones share the connection pool, configuration and
/// registry.
#[derive(Clone)]
pub struct GraphQLClient {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
    registry: Arc<SpecificationRegistry>,
}

impl GraphQLClient {
    /// Create a client with default configuration
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: ClientConfig) -> Self {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .pool_idle_timeout(Duration::from_secs(90));

        if !config.proxy_url.is_empty() {
            match reqwest::Proxy::all(&config.proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => tracing::warn!("ignoring invalid proxy url {}: {}", config.proxy_url, e),
            }
        }

        let client = builder.build().unwrap_or_default();

        GraphQLClient {
            client,
            config: Arc::new(config),
            registry: Arc::new(SpecificationRegistry::default()),
        }
    }

    /// Replace the set of accepted protocol variants.
    pub fn with_registry(mut self, registry: SpecificationRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    /// Send `request` asking for `spec`, and stream the decoded payloads.
    ///
    /// A plain `application/json` answer yields its body as the single item.
    ///
    /// # Errors
    ///
    /// * [`MultipartError::Http`] / [`MultipartError::InvalidStatus`] once
    ///   retries are exhausted
    /// * [`MultipartError::HeaderParse`] for a missing or malformed content type
    /// * [`MultipartError::MissingBoundary`] for a multipart answer without boundary
    /// * [`MultipartError::UnsupportedSpecification`] when the negotiated
    ///   variant is not registered, or the response is neither multipart nor
    ///   JSON
    pub async fn execute(
        &self,
        url: &str,
        request: &GraphQLRequest,
        spec: &ProtocolSpec,
    ) -> Result<ResponseStream> {
        let response = self.send_with_retries(url, request, spec).await?;
        let content_type = content_type_from_headers(response.headers())?;
        let capacity = self.config.channel_capacity;

        if content_type.is_multipart() {
            let boundary = content_type
                .boundary()
                .ok_or(MultipartError::MissingBoundary)?;
            let negotiated = *self.registry.select(&content_type)?;
            if negotiated != *spec {
                tracing::debug!(
                    requested = spec.token(),
                    negotiated = negotiated.token(),
                    "server answered with a different multipart specification"
                );
            }

            let decoder = BodyDecoder::new(boundary, negotiated, &self.config);
            return Ok(decoder.spawn(response.bytes_stream(), capacity));
        }

        if !content_type.is_json() {
            return Err(MultipartError::UnsupportedSpecification(
                content_type.to_string(),
            ));
        }

        tracing::debug!(content_type = %content_type, "single JSON response");
        let body = response
            .bytes()
            .await
            .map_err(|e| MultipartError::Http(e.to_string()))?;

        let (tx, rx) = mpsc::channel(1);
        let _ = tx.send(Ok(body)).await;
        Ok(ResponseStream::new(rx))
    }

    /// Send the request, retrying retryable failures with exponential backoff.
    async fn send_with_retries(
        &self,
        url: &str,
        request: &GraphQLRequest,
        spec: &ProtocolSpec,
    ) -> Result<reqwest::Response> {
        let mut attempt = 0;
        loop {
            match self.send(url, request, spec).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = exponential_backoff(attempt, self.config.retry_delay_ms);
                    if self.config.enable_logging {
                        tracing::warn!(
                            "Request failed (attempt {}), retrying after {:?}: {}",
                            attempt + 1,
                            delay,
                            e
                        );
                    }
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send(
        &self,
        url: &str,
        request: &GraphQLRequest,
        spec: &ProtocolSpec,
    ) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .header(headers::ACCEPT, accept_header(spec))
            .json(request)
            .send()
            .await
            .map_err(|e| MultipartError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MultipartError::InvalidStatus(status.as_u16()));
        }
        Ok(response)
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Accepted protocol variants
    pub fn registry(&self) -> &SpecificationRegistry {
        &self.registry
    }
}

impl Default for GraphQLClient {
    fn default() -> Self {
        Self::new()
    }
}
