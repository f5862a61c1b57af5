#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # GraphQL multipart responses
//!
//! This crate decodes the two `multipart/mixed` sub-protocols GraphQL servers
//! use to stream results over HTTP:
//!
//! 1. **Defer** (`deferSpec=20220824`) - Incremental delivery of `@defer` fragments of one operation
//! 2. **Subscription** (`subscriptionSpec=1.0`) - Subscription events over a long-lived response
//!
//! ## Key Features
//!
//! - **Stateless chunk parser**: One algorithm for both protocols, parameterized by a policy record
//! - **Ordered, fail-fast outcomes**: Payload bytes and a closed set of parsing errors
//! - **Variant selection**: Negotiation tokens mapped to parsers, unknown tokens rejected
//! - **Reassembly**: Parts split across transport chunks are rebuilt before parsing
//! - **Streaming client**: `reqwest` based client yielding payloads as a `Stream`
//!
//! ## Parser Usage
//!
//! ```
//! use graphql_multipart::protocol::ProtocolSpec;
//!
//! let chunk = "content-type: application/json\n\n{\"payload\":{\"a\":1},\"hasNext\":true}";
//!
//! let mut payloads = Vec::new();
//! ProtocolSpec::SUBSCRIPTION.parse(
//!     chunk,
//!     |bytes| payloads.push(bytes),
//!     |error| eprintln!("Error: {}", error),
//! );
//! assert_eq!(payloads, vec![&br#"{"a":1}"#[..]]);
//! ```
//!
//! ## Client Usage
//!
//! ```ignore
//! use graphql_multipart::{GraphQLClient, GraphQLRequest};
//! use graphql_multipart::protocol::ProtocolSpec;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GraphQLClient::new();
//!     let request = GraphQLRequest::new("query { hero { name ... @defer { films } } }");
//!
//!     let mut stream = client
//!         .execute("http://localhost:4000/graphql", &request, &ProtocolSpec::DEFER)
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
//!
//! ## Module Structure
//!
//! - **[protocol]** - Line classifier, chunk parser, variants and their selection
//! - **[client]** - Multipart reader, streaming decoder and HTTP client
//! - **[types]** - Outcomes and GraphQL request body
//! - **[error]** - Error types and result handling

pub mod client;
pub mod error;
pub mod protocol;
pub mod types;

pub use client::GraphQLClient;
pub use error::{MultipartError, ParsingError, Result};
pub use protocol::{select_parser, ProtocolSpec};
pub use types::{GraphQLRequest, Outcome};

#[cfg(test)]
mod tests;
