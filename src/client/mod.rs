//! Streaming HTTP client for GraphQL multipart responses.
//!
//! This module sits around the stateless chunk parser of [`crate::protocol`]
//! and provides what a running client needs:
//!
//! - **Negotiate** the protocol variant through `Accept` / `Content-Type`
//! - **Reassemble** parts that arrive split across transport chunks
//! - **Stream** decoded payloads to the caller
//! - **Retry** the initial request with exponential backoff
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch        - GraphQLClient and HTTP operations
//! ├── reader       - Multipart body splitter (reassembly buffer)
//! ├── subscription - Body decoding task and payload stream
//! ├── config       - Client configuration
//! └── utils        - Utility functions
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`GraphQLClient`] | HTTP client sending operations |
//! | [`MultipartReader`] | Splits a body into complete parts |
//! | [`BodyDecoder`] | Feeds a body through reader and parser |
//! | [`ResponseStream`] | Stream of decoded payloads |
//! | [`ClientConfig`] | Client configuration options |
//!
//! # Examples
//!
//! ## Creating a Client
//!
//! ```
//! use graphql_multipart::client::{ClientConfig, GraphQLClient};
//!
//! // Default configuration
//! let client = GraphQLClient::new();
//!
//! // Custom configuration
//! let config = ClientConfig {
//!     max_retries: 5,
//!     retry_delay_ms: 2000,
//!     ..Default::default()
//! };
//! let client = GraphQLClient::with_config(config);
//! ```
//!
//! ## Utility Functions
//!
//! ```
//! use graphql_multipart::client::{exponential_backoff, is_retryable_status};
//! use std::time::Duration;
//!
//! assert!(is_retryable_status(503));
//! assert!(!is_retryable_status(404));
//!
//! let delay = exponential_backoff(2, 100);
//! assert_eq!(delay, Duration::from_millis(400));
//! ```

mod config;
mod fetch;
mod reader;
mod subscription;
mod utils;

pub use config::ClientConfig;
pub use fetch::GraphQLClient;
pub use reader::{MultipartReader, ReadState};
pub use subscription::{BodyDecoder, ResponseStream};
pub use utils::*;
