//! Core types shared by the parser and the client.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Outcome`] | Observable result of one data line |
//! | [`GraphQLRequest`] | Operation sent by [`crate::client::GraphQLClient`] |

use crate::error::ParsingError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Observable result of parsing one data line of a chunk.
///
/// Lines without an observable effect (heartbeats, an accepted content type,
/// a null payload) produce no outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Canonical JSON bytes of a payload object
    Data(Bytes),
    /// The fault that ended the chunk
    Error(ParsingError),
}

impl Outcome {
    /// Whether this outcome ended the chunk.
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    /// Convert into a `Result`.
    pub fn into_result(self) -> std::result::Result<Bytes, ParsingError> {
        match self {
            Outcome::Data(bytes) => Ok(bytes),
            Outcome::Error(error) => Err(error),
        }
    }
}

/// A GraphQL operation in the standard POST body format.
///
/// # Examples
///
/// ```
/// use graphql_multipart::GraphQLRequest;
/// use serde_json::json;
///
/// let request = GraphQLRequest::new("subscription { ticks }")
///     .with_operation_name("Ticks")
///     .with_variable("interval", json!(5));
///
/// let body = serde_json::to_value(&request).unwrap();
/// assert_eq!(body["operationName"], "Ticks");
/// assert_eq!(body["variables"]["interval"], 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    /// Operation document
    pub query: String,
    /// Operation to run when the document holds several
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Operation variables
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub variables: Map<String, Value>,
    /// Protocol extensions
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub extensions: Map<String, Value>,
}

impl GraphQLRequest {
    /// Create a request for `query`.
    pub fn new(query: impl Into<String>) -> Self {
        GraphQLRequest {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the operation name.
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// Set a variable.
    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    /// Set an extension entry.
    pub fn with_extension(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extensions.insert(name.into(), value);
        self
    }
}
