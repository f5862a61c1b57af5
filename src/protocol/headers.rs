//! Content type negotiation headers.
//!
//! This module parses the `Content-Type` of a GraphQL multipart response and
//! formats the `Accept` header that asks for one.
//!
//! # Header Formats
//!
//! | Header | Example |
//! |--------|---------|
//! | Accept | `multipart/mixed;boundary="graphql";subscriptionSpec=1.0,application/json` |
//! | Content-Type | `multipart/mixed; boundary="graphql"; deferSpec=20220824` |
//!
//! # Examples
//!
//! ```
//! use graphql_multipart::protocol::{accept_header, parse_content_type, ProtocolSpec};
//!
//! let content_type = parse_content_type("multipart/mixed;boundary=\"graphql\";deferSpec=20220824").unwrap();
//! assert!(content_type.is_multipart());
//! assert_eq!(content_type.boundary(), Some("graphql"));
//!
//! let accept = accept_header(&ProtocolSpec::DEFER);
//! assert_eq!(accept, "multipart/mixed;boundary=\"graphql\";deferSpec=20220824,application/json");
//! ```

use super::constants::{headers, APPLICATION_JSON, DEFAULT_BOUNDARY, MULTIPART_MIXED};
use super::spec::ProtocolSpec;
use crate::error::{MultipartError, Result};
use http::HeaderMap;
use std::fmt;

/// A parsed `Content-Type` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartContentType {
    media_type: String,
    boundary: Option<String>,
    parameters: Vec<(String, String)>,
}

impl MultipartContentType {
    /// Media type, lower-cased, e.g. `multipart/mixed`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Unquoted `boundary` parameter.
    pub fn boundary(&self) -> Option<&str> {
        self.boundary.as_deref()
    }

    /// Parameters other than `boundary`, in header order.
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// Whether this is a `multipart/mixed` response.
    pub fn is_multipart(&self) -> bool {
        self.media_type == MULTIPART_MIXED
    }

    /// Whether this is a plain `application/json` response.
    pub fn is_json(&self) -> bool {
        self.media_type == APPLICATION_JSON
    }

    /// Parameters rendered as `name=value`, the form of a negotiation token.
    pub fn protocol_tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.parameters
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
    }
}

impl fmt::Display for MultipartContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.media_type)?;
        if let Some(boundary) = &self.boundary {
            write!(f, ";boundary=\"{}\"", boundary)?;
        }
        for (name, value) in &self.parameters {
            write!(f, ";{}={}", name, value)?;
        }
        Ok(())
    }
}

/// Parse a `Content-Type` header value.
///
/// Parameter values may be quoted; quotes are removed. `;` inside quotes does
/// not split parameters.
///
/// # Errors
///
/// [`MultipartError::HeaderParse`] for an empty media type or a parameter
/// without `=`.
///
/// # Examples
///
/// ```
/// use graphql_multipart::protocol::parse_content_type;
///
/// let ct = parse_content_type("multipart/mixed; boundary=\"-\"; subscriptionSpec=1.0").unwrap();
/// assert_eq!(ct.boundary(), Some("-"));
/// assert_eq!(ct.protocol_tokens().collect::<Vec<_>>(), vec!["subscriptionSpec=1.0"]);
///
/// assert!(parse_content_type("").is_err());
/// ```
pub fn parse_content_type(value: &str) -> Result<MultipartContentType> {
    let mut parts = split_parameters(value).into_iter();

    let media_type = parts
        .next()
        .map(str::trim)
        .filter(|media_type| !media_type.is_empty())
        .ok_or_else(|| MultipartError::HeaderParse(format!("Invalid content type: '{}'", value)))?
        .to_ascii_lowercase();

    let mut boundary = None;
    let mut parameters = Vec::new();

    for part in parts {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let (name, raw) = part.split_once('=').ok_or_else(|| {
            MultipartError::HeaderParse(format!("Invalid content type parameter: '{}'", part))
        })?;
        let name = name.trim();
        let parsed = unquote(raw.trim());

        if name.eq_ignore_ascii_case("boundary") {
            boundary = Some(parsed.to_string());
        } else {
            parameters.push((name.to_string(), parsed.to_string()));
        }
    }

    Ok(MultipartContentType {
        media_type,
        boundary,
        parameters,
    })
}

/// Read and parse the `Content-Type` of a response.
///
/// # Errors
///
/// [`MultipartError::HeaderParse`] when the header is absent, not visible
/// ASCII, or malformed.
pub fn content_type_from_headers(map: &HeaderMap) -> Result<MultipartContentType> {
    let value = map
        .get(headers::CONTENT_TYPE)
        .ok_or_else(|| MultipartError::HeaderParse("Missing Content-Type header".to_string()))?
        .to_str()
        .map_err(|e| MultipartError::HeaderParse(format!("Invalid Content-Type header: {}", e)))?;

    parse_content_type(value)
}

/// `Accept` header value requesting `spec`, falling back to plain JSON.
#[inline]
pub fn accept_header(spec: &ProtocolSpec) -> String {
    format!(
        "{};boundary=\"{}\";{},{}",
        MULTIPART_MIXED,
        DEFAULT_BOUNDARY,
        spec.token(),
        APPLICATION_JSON
    )
}

fn split_parameters(value: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut start = 0;

    for (index, c) in value.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ';' if !quoted => {
                parts.push(&value[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&value[start..]);
    parts
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
