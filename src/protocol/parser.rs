//! Chunk parser shared by every protocol variant.
//!
//! A chunk is the text of one multipart part, with its `--boundary` lines
//! already removed. It is split into data lines on
//! [`DATA_LINE_SEPARATOR`](super::constants::DATA_LINE_SEPARATOR),
//! each line is classified, and each classified line produces at most one
//! [`Outcome`].
//!
//! # Parsing Flow
//!
//! | Line | Effect |
//! |------|--------|
//! | heartbeat | nothing |
//! | `content-type: application/json` | nothing |
//! | `content-type: <other>` | [`ParsingError::UnsupportedContentType`], stop |
//! | JSON with fatal `errors` | [`ParsingError::IrrecoverableError`], stop |
//! | JSON without payload | [`ParsingError::CannotParsePayloadData`], stop |
//! | JSON with null payload | nothing |
//! | JSON with object payload | [`Outcome::Data`] |
//! | anything else | [`ParsingError::CannotParseChunkData`], stop |
//!
//! Parsing is fail-fast within a chunk: after the first error no further
//! outcome is produced, while outcomes already delivered stay delivered. No
//! state survives a call, so one [`ProtocolSpec`] can serve any number of
//! responses concurrently.
//!
//! # Precondition
//!
//! Every chunk must hold complete data lines. A JSON object split across two
//! chunks is reported as [`ParsingError::CannotParseChunkData`]; reassembly is
//! the job of [`crate::client::MultipartReader`].
//!
//! # Examples
//!
//! ```
//! use graphql_multipart::protocol::ProtocolSpec;
//! use graphql_multipart::Outcome;
//!
//! let chunk = "content-type: application/json\r\n\r\n{\"payload\":{\"a\":1},\"hasNext\":true}";
//! let outcomes: Vec<Outcome> = ProtocolSpec::SUBSCRIPTION.outcomes(chunk).collect();
//!
//! assert_eq!(outcomes.len(), 1);
//! assert_eq!(outcomes[0], Outcome::Data(br#"{"a":1}"#.to_vec().into()));
//! ```

use super::classifier::DataLine;
use super::constants::{keys, APPLICATION_JSON};
use super::spec::{Payload, ProtocolSpec};
use crate::error::ParsingError;
use crate::types::Outcome;
use bytes::Bytes;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::ops::Range;

/// [`DATA_LINE_SEPARATOR`](super::constants::DATA_LINE_SEPARATOR) once line endings are folded to `\n`.
const FOLDED_SEPARATOR: &str = "\n\n";

impl ProtocolSpec {
    /// Parse `chunk`, reporting payloads to `on_data` and the first fault to
    /// `on_error`.
    ///
    /// Callbacks run synchronously, in the order the lines appear in the
    /// chunk. `on_error` is invoked at most once.
    ///
    /// # Examples
    ///
    /// ```
    /// use graphql_multipart::protocol::ProtocolSpec;
    /// use graphql_multipart::ParsingError;
    ///
    /// let mut errors = Vec::new();
    /// ProtocolSpec::SUBSCRIPTION.parse(
    ///     "content-type: text/plain",
    ///     |_| panic!("no data expected"),
    ///     |error| errors.push(error),
    /// );
    /// assert_eq!(errors, vec![ParsingError::unsupported_content_type("text/plain")]);
    /// ```
    pub fn parse<D, E>(&self, chunk: &str, mut on_data: D, mut on_error: E)
    where
        D: FnMut(Bytes),
        E: FnMut(ParsingError),
    {
        for outcome in self.outcomes(chunk) {
            match outcome {
                Outcome::Data(bytes) => on_data(bytes),
                Outcome::Error(error) => on_error(error),
            }
        }
    }

    /// Lazily parse `chunk` into its ordered outcomes.
    ///
    /// The iterator ends after the first [`Outcome::Error`].
    pub fn outcomes<'a>(&'a self, chunk: &'a str) -> Outcomes<'a> {
        Outcomes::new(self, chunk)
    }
}

/// Iterator over the outcomes of one chunk.
///
/// Created by [`ProtocolSpec::outcomes`].
#[derive(Debug)]
pub struct Outcomes<'a> {
    spec: &'a ProtocolSpec,
    text: Cow<'a, str>,
    position: usize,
    finished: bool,
}

impl<'a> Outcomes<'a> {
    fn new(spec: &'a ProtocolSpec, chunk: &'a str) -> Self {
        let text = if chunk.contains('\r') {
            Cow::Owned(chunk.replace("\r\n", "\n"))
        } else {
            Cow::Borrowed(chunk)
        };

        Outcomes {
            spec,
            text,
            position: 0,
            finished: false,
        }
    }

    /// Byte range of the next data line, trimmed of newlines.
    fn next_line(&mut self) -> Option<Range<usize>> {
        if self.position > self.text.len() {
            return None;
        }

        let rest = &self.text[self.position..];
        let (start, end) = match rest.find(FOLDED_SEPARATOR) {
            Some(offset) => {
                let range = (self.position, self.position + offset);
                self.position += offset + FOLDED_SEPARATOR.len();
                range
            }
            None => {
                let range = (self.position, self.text.len());
                self.position = self.text.len() + 1;
                range
            }
        };

        let raw = &self.text[start..end];
        let trimmed_start = raw.trim_start_matches(is_newline);
        let offset = start + (raw.len() - trimmed_start.len());
        let trimmed = trimmed_start.trim_end_matches(is_newline);
        Some(offset..offset + trimmed.len())
    }
}

impl Iterator for Outcomes<'_> {
    type Item = Outcome;

    fn next(&mut self) -> Option<Outcome> {
        while !self.finished {
            let Some(range) = self.next_line() else {
                self.finished = true;
                break;
            };
            if range.is_empty() {
                continue;
            }

            let line = &self.text[range];
            if let Some(outcome) = process_line(self.spec, line) {
                if let Outcome::Error(error) = &outcome {
                    tracing::debug!(token = self.spec.token(), %error, "stopped parsing chunk");
                    self.finished = true;
                }
                return Some(outcome);
            }
        }
        None
    }
}

fn is_newline(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Outcome of a single data line, `None` when the line has no observable effect.
fn process_line(spec: &ProtocolSpec, line: &str) -> Option<Outcome> {
    let classified = DataLine::classify(line, spec.heartbeat());
    tracing::trace!(token = spec.token(), ?classified, "classified data line");

    match classified {
        DataLine::Heartbeat => {
            tracing::debug!(token = spec.token(), "heartbeat");
            None
        }
        DataLine::ContentHeader(content_type) => {
            if content_type == APPLICATION_JSON {
                None
            } else {
                Some(Outcome::Error(ParsingError::UnsupportedContentType {
                    content_type,
                }))
            }
        }
        DataLine::Json(object) => process_object(spec, &object),
        DataLine::Unknown => Some(Outcome::Error(ParsingError::CannotParseChunkData)),
    }
}

fn process_object(spec: &ProtocolSpec, object: &Map<String, Value>) -> Option<Outcome> {
    let payload = spec.payload(object);

    if let Some(errors) = non_empty_errors(object) {
        if spec.errors_are_fatal(&payload) {
            let message = errors
                .first()
                .and_then(|error| error.get(keys::MESSAGE))
                .and_then(Value::as_str)
                .map(str::to_string);
            return Some(Outcome::Error(ParsingError::IrrecoverableError { message }));
        }
    }

    match payload {
        Payload::Missing | Payload::Invalid => {
            Some(Outcome::Error(ParsingError::CannotParsePayloadData))
        }
        Payload::Null => {
            tracing::debug!(token = spec.token(), "null payload");
            None
        }
        Payload::Object(payload) => Some(match serde_json::to_vec(payload) {
            Ok(bytes) => Outcome::Data(Bytes::from(bytes)),
            Err(_) => Outcome::Error(ParsingError::CannotParsePayloadData),
        }),
    }
}

fn non_empty_errors(object: &Map<String, Value>) -> Option<&Vec<Value>> {
    object
        .get(keys::ERRORS)
        .and_then(Value::as_array)
        .filter(|errors| !errors.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::DATA_LINE_SEPARATOR;
    use serde_json::json;

    fn collect(spec: &ProtocolSpec, chunk: &str) -> (Vec<Value>, Vec<ParsingError>) {
        let mut data = Vec::new();
        let mut errors = Vec::new();
        spec.parse(
            chunk,
            |bytes| data.push(serde_json::from_slice(&bytes).unwrap()),
            |error| errors.push(error),
        );
        (data, errors)
    }

    #[test]
    fn test_heartbeat_only() {
        let (data, errors) = collect(&ProtocolSpec::SUBSCRIPTION, "{}");
        assert!(data.is_empty());
        assert!(errors.is_empty());

        let (data, errors) = collect(&ProtocolSpec::SUBSCRIPTION, "{}\r\n\r\n{}\r\n\r\n{}");
        assert!(data.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_payload_with_lf_separator() {
        let chunk = "content-type: application/json\n\n{\"payload\":{\"a\":1},\"hasNext\":true}";
        let (data, errors) = collect(&ProtocolSpec::SUBSCRIPTION, chunk);
        assert_eq!(data, vec![json!({"a": 1})]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_payload_with_crlf_separator() {
        let chunk = "\r\ncontent-type: application/json\r\n\r\n{\"payload\":{\"data\":{\"n\":2}}}\r\n";
        let (data, errors) = collect(&ProtocolSpec::SUBSCRIPTION, chunk);
        assert_eq!(data, vec![json!({"data": {"n": 2}})]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unsupported_content_type() {
        let (data, errors) = collect(&ProtocolSpec::SUBSCRIPTION, "content-type: text/plain");
        assert!(data.is_empty());
        assert_eq!(errors, vec![ParsingError::unsupported_content_type("text/plain")]);
    }

    #[test]
    fn test_unsupported_content_type_stops_chunk() {
        let chunk = "content-type: test/custom\r\n\r\n{\"payload\":{\"a\":1}}";
        let (data, errors) = collect(&ProtocolSpec::SUBSCRIPTION, chunk);
        assert!(data.is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_errors_are_irrecoverable() {
        let chunk = r#"{"errors":[{"message":"boom"},{"message":"second"}]}"#;
        let (data, errors) = collect(&ProtocolSpec::SUBSCRIPTION, chunk);
        assert!(data.is_empty());
        assert_eq!(errors, vec![ParsingError::irrecoverable(Some("boom"))]);
    }

    #[test]
    fn test_errors_without_message() {
        let chunk = r#"{"payload":null,"errors":[{"code":42}]}"#;
        let (_, errors) = collect(&ProtocolSpec::SUBSCRIPTION, chunk);
        assert_eq!(errors, vec![ParsingError::irrecoverable(None::<String>)]);
    }

    #[test]
    fn test_empty_errors_are_ignored() {
        let chunk = r#"{"payload":{"a":1},"errors":[]}"#;
        let (data, errors) = collect(&ProtocolSpec::SUBSCRIPTION, chunk);
        assert_eq!(data, vec![json!({"a": 1})]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_missing_payload() {
        let (data, errors) = collect(&ProtocolSpec::SUBSCRIPTION, r#"{"key":"value"}"#);
        assert!(data.is_empty());
        assert_eq!(errors, vec![ParsingError::CannotParsePayloadData]);
    }

    #[test]
    fn test_non_object_payload() {
        let (_, errors) = collect(&ProtocolSpec::SUBSCRIPTION, r#"{"payload":[1,2]}"#);
        assert_eq!(errors, vec![ParsingError::CannotParsePayloadData]);
    }

    #[test]
    fn test_null_payload_continues() {
        let chunk = "{\"payload\":null}\r\n\r\n{\"payload\":{\"b\":true}}";
        let (data, errors) = collect(&ProtocolSpec::SUBSCRIPTION, chunk);
        assert_eq!(data, vec![json!({"b": true})]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unknown_line_stops_chunk() {
        let chunk = "{\"payload\":{\"a\":1}}\r\n\r\nnot_a_valid_json_object\r\n\r\n{\"payload\":{\"a\":2}}";
        let (data, errors) = collect(&ProtocolSpec::SUBSCRIPTION, chunk);
        assert_eq!(data, vec![json!({"a": 1})]);
        assert_eq!(errors, vec![ParsingError::CannotParseChunkData]);
    }

    #[test]
    fn test_payload_round_trip_preserves_order() {
        let chunk = r#"{"payload":{"z":{"y":[1,null,"x"]},"a":false}}"#;
        let outcomes: Vec<_> = ProtocolSpec::SUBSCRIPTION.outcomes(chunk).collect();
        assert_eq!(
            outcomes,
            vec![Outcome::Data(Bytes::from_static(br#"{"z":{"y":[1,null,"x"]},"a":false}"#))]
        );
    }

    #[test]
    fn test_multiline_json_object() {
        let chunk = "content-type: application/json\r\n\r\n{\r\n  \"payload\": {\r\n    \"a\": 1\r\n  }\r\n}\r\n";
        let (data, errors) = collect(&ProtocolSpec::SUBSCRIPTION, chunk);
        assert_eq!(data, vec![json!({"a": 1})]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_outcomes_iterator_is_fused_after_error() {
        let mut outcomes = ProtocolSpec::SUBSCRIPTION.outcomes("garbage\n\n{\"payload\":{}}");
        assert_eq!(
            outcomes.next(),
            Some(Outcome::Error(ParsingError::CannotParseChunkData))
        );
        assert_eq!(outcomes.next(), None);
        assert_eq!(outcomes.next(), None);
    }

    #[test]
    fn test_folded_separator_matches_data_line_separator() {
        assert_eq!(DATA_LINE_SEPARATOR.replace("\r\n", "\n"), FOLDED_SEPARATOR);
    }

    #[test]
    fn test_empty_chunk() {
        assert_eq!(ProtocolSpec::DEFER.outcomes("").count(), 0);
        assert_eq!(ProtocolSpec::DEFER.outcomes("\r\n\r\n").count(), 0);
    }

    #[test]
    fn test_defer_initial_response() {
        let chunk = "content-type: application/json\r\n\r\n{\"data\":{\"name\":\"Luke\"},\"hasNext\":true}";
        let (data, errors) = collect(&ProtocolSpec::DEFER, chunk);
        assert_eq!(data, vec![json!({"data": {"name": "Luke"}, "hasNext": true})]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_defer_errors_travel_with_data() {
        let chunk = r#"{"data":{"name":"Luke"},"errors":[{"message":"Forced test error"}],"hasNext":true}"#;
        let (data, errors) = collect(&ProtocolSpec::DEFER, chunk);
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["errors"][0]["message"], "Forced test error");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_defer_errors_without_data_are_irrecoverable() {
        let chunk = r#"{"data":null,"errors":[{"message":"denied"}]}"#;
        let (data, errors) = collect(&ProtocolSpec::DEFER, chunk);
        assert!(data.is_empty());
        assert_eq!(errors, vec![ParsingError::irrecoverable(Some("denied"))]);
    }

    #[test]
    fn test_defer_incremental() {
        let chunk = r#"{"incremental":[{"data":{"films":[]},"path":["hero"]}],"hasNext":false}"#;
        let (data, errors) = collect(&ProtocolSpec::DEFER, chunk);
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["hasNext"], false);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_defer_terminal_part_is_noop() {
        let (data, errors) = collect(&ProtocolSpec::DEFER, r#"{"hasNext":false}"#);
        assert!(data.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_defer_unrecognized_content_is_reported() {
        let chunk = "content-type: application/json\n\n{\"payload\":{\"a\":1},\"hasNext\":true}";
        let outcomes: Vec<Outcome> = ProtocolSpec::DEFER.outcomes(chunk).collect();
        assert_eq!(outcomes, vec![Outcome::Error(ParsingError::CannotParsePayloadData)]);

        let (data, errors) = collect(&ProtocolSpec::DEFER, r#"{"hasNext":true,"unexpected":{"x":1}}"#);
        assert!(data.is_empty());
        assert_eq!(errors, vec![ParsingError::CannotParsePayloadData]);
    }

    #[test]
    fn test_defer_missing_data() {
        let chunk = "content-type: application/json\r\n\r\n{\r\n  \"key\": \"value\"\r\n}";
        let (_, errors) = collect(&ProtocolSpec::DEFER, chunk);
        assert_eq!(errors, vec![ParsingError::CannotParsePayloadData]);
    }
}
