//! Error types for multipart GraphQL response handling.
//!
//! Two layers of errors exist:
//!
//! | Type | Raised by | Meaning |
//! |------|-----------|---------|
//! | [`ParsingError`] | [`crate::protocol`] chunk parser | A part could not be interpreted |
//! | [`MultipartError`] | [`crate::client`] and header parsing | Transport, negotiation or framing failure |
//!
//! [`ParsingError`] is the closed set of faults the chunk parser reports. It is
//! always delivered as a value through the error channel, never panicked.

use thiserror::Error;

/// Faults detected while parsing a single multipart chunk.
///
/// These are the only error kinds the chunk parser emits. Each one ends
/// interpretation of the chunk it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsingError {
    /// A `content-type:` line named something other than `application/json`.
    #[error("Unsupported content type: application/json is required but got {content_type}.")]
    UnsupportedContentType {
        /// The rejected content type, as written in the part header
        content_type: String,
    },

    /// A line was neither a heartbeat, a content-type header nor a JSON object.
    #[error("The chunk data could not be parsed.")]
    CannotParseChunkData,

    /// The server reported a transport-level GraphQL error.
    #[error("An irrecoverable error occurred: {}.", .message.as_deref().unwrap_or("unknown"))]
    IrrecoverableError {
        /// `message` of the first entry of the `errors` array, if it was a string
        message: Option<String>,
    },

    /// The part had no payload, or its payload was not a JSON object.
    #[error("The payload data could not be parsed.")]
    CannotParsePayloadData,
}

impl ParsingError {
    /// Shorthand for [`ParsingError::UnsupportedContentType`].
    pub fn unsupported_content_type(content_type: impl Into<String>) -> Self {
        ParsingError::UnsupportedContentType {
            content_type: content_type.into(),
        }
    }

    /// Shorthand for [`ParsingError::IrrecoverableError`].
    pub fn irrecoverable(message: Option<impl Into<String>>) -> Self {
        ParsingError::IrrecoverableError {
            message: message.map(Into::into),
        }
    }
}

/// Errors raised around the chunk parser: HTTP, negotiation and body framing.
#[derive(Debug, Error)]
pub enum MultipartError {
    /// Request could not be sent or the body stream broke
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server answered with a non-success status
    #[error("Unexpected status code: {0}")]
    InvalidStatus(u16),

    /// A header value was malformed
    #[error("Header parse error: {0}")]
    HeaderParse(String),

    /// `multipart/mixed` response without a `boundary` parameter
    #[error("Missing multipart boundary in content type")]
    MissingBoundary,

    /// No registered protocol variant matches the negotiated content type
    #[error("Unsupported multipart specification: {0}")]
    UnsupportedSpecification(String),

    /// A part grew beyond the configured limit before its delimiter arrived
    #[error("Multipart part exceeds {limit} bytes")]
    PartTooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// A part was not valid UTF-8
    #[error("Invalid UTF-8 in multipart part: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The chunk parser rejected a part
    #[error(transparent)]
    Parsing(#[from] ParsingError),
}

impl MultipartError {
    /// Whether retrying the request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            MultipartError::Http(_) => true,
            MultipartError::InvalidStatus(status) => crate::client::is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Result type for multipart operations.
pub type Result<T> = std::result::Result<T, MultipartError>;
