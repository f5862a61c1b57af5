//! Classification of a single data line.
//!
//! A data line is one segment of a part, already trimmed of surrounding
//! newlines. Classification is a pure function of the text and the heartbeat
//! literal of the active protocol variant.

use super::constants::CONTENT_TYPE_PREFIX;
use serde_json::{Map, Value};

/// What a data line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum DataLine {
    /// Keep-alive, carries nothing
    Heartbeat,
    /// `content-type: <type>` header of the part
    ContentHeader(String),
    /// A JSON object, keys in wire order
    Json(Map<String, Value>),
    /// Anything else
    Unknown,
}

impl DataLine {
    /// Classify `line` for a protocol whose heartbeat literal is `heartbeat`.
    ///
    /// Never fails: text that cannot be decoded degrades to [`DataLine::Unknown`]
    /// and the caller decides how to report it.
    ///
    /// # Examples
    ///
    /// ```
    /// use graphql_multipart::protocol::DataLine;
    ///
    /// assert_eq!(DataLine::classify("{}", "{}"), DataLine::Heartbeat);
    /// assert_eq!(
    ///     DataLine::classify("content-type: application/json", "{}"),
    ///     DataLine::ContentHeader("application/json".to_string())
    /// );
    /// assert_eq!(DataLine::classify("not json", "{}"), DataLine::Unknown);
    /// ```
    pub fn classify(line: &str, heartbeat: &str) -> DataLine {
        if line == heartbeat {
            return DataLine::Heartbeat;
        }

        if line.starts_with(CONTENT_TYPE_PREFIX) {
            // Everything after the last colon, so `content-type:a:b` yields `b`.
            let content_type = line.rsplit(':').next().unwrap_or(line).trim();
            return DataLine::ContentHeader(content_type.to_string());
        }

        match serde_json::from_str::<Map<String, Value>>(line) {
            Ok(object) => DataLine::Json(object),
            Err(_) => DataLine::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::constants::HEARTBEAT;

    #[test]
    fn test_heartbeat() {
        assert_eq!(DataLine::classify("{}", HEARTBEAT), DataLine::Heartbeat);
    }

    #[test]
    fn test_heartbeat_with_whitespace_is_empty_object() {
        // Not the literal, but still a JSON object without a payload.
        match DataLine::classify("{ }", HEARTBEAT) {
            DataLine::Json(object) => assert!(object.is_empty()),
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_content_header() {
        assert_eq!(
            DataLine::classify("content-type:   text/plain  ", HEARTBEAT),
            DataLine::ContentHeader("text/plain".to_string())
        );
    }

    #[test]
    fn test_content_header_takes_last_segment() {
        assert_eq!(
            DataLine::classify("content-type: a:b", HEARTBEAT),
            DataLine::ContentHeader("b".to_string())
        );
    }

    #[test]
    fn test_content_header_prefix_is_case_sensitive() {
        assert_eq!(
            DataLine::classify("Content-Type: application/json", HEARTBEAT),
            DataLine::Unknown
        );
    }

    #[test]
    fn test_json_object_preserves_key_order() {
        match DataLine::classify(r#"{"z":1,"a":2}"#, HEARTBEAT) {
            DataLine::Json(object) => {
                let keys: Vec<_> = object.keys().map(String::as_str).collect();
                assert_eq!(keys, ["z", "a"]);
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_json_array_is_unknown() {
        assert_eq!(DataLine::classify("[1,2]", HEARTBEAT), DataLine::Unknown);
    }

    #[test]
    fn test_garbage_is_unknown() {
        assert_eq!(
            DataLine::classify("not_a_valid_json_object", HEARTBEAT),
            DataLine::Unknown
        );
    }
}
