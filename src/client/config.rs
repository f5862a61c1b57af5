//! Client configuration.

use serde::{Deserialize, Serialize};

/// Configuration of a [`crate::client::GraphQLClient`].
///
/// Missing fields take their default when deserialized.
///
/// # Examples
///
/// ```
/// use graphql_multipart::client::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(r#"{"max_retries": 5}"#).unwrap();
/// assert_eq!(config.max_retries, 5);
/// assert_eq!(config.channel_capacity, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Retries of the initial request on retryable failures
    pub max_retries: u32,
    /// Base delay of the exponential backoff
    pub retry_delay_ms: u64,
    /// Connection timeout; the streamed body itself has no timeout
    pub connect_timeout_ms: u64,
    /// Payloads buffered between the decoding task and the consumer
    pub channel_capacity: usize,
    /// Largest part accepted before its delimiter arrives
    pub max_part_bytes: usize,
    /// Proxy for all requests, empty for none
    pub proxy_url: String,
    /// Log retries and decoding failures
    pub enable_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            max_retries: 3,
            retry_delay_ms: 1000,
            connect_timeout_ms: 10_000,
            channel_capacity: 100,
            max_part_bytes: 16 * 1024 * 1024,
            proxy_url: String::new(),
            enable_logging: true,
        }
    }
}
