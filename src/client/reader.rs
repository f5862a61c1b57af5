//! Multipart body reader for streamed GraphQL responses.
//!
//! Incremental, state-machine based splitter that turns an arbitrarily
//! fragmented response body into complete parts. Each part is released only
//! once the delimiter that ends it has arrived, which is the precondition of
//! the chunk parser in [`crate::protocol`].
//!
//! # Reading Flow
//!
//! 1. **Preamble**: Accumulate bytes until the first `--boundary` line
//! 2. **Parts**: Release the text between consecutive delimiters
//! 3. **Closed**: `--boundary--` was seen, remaining bytes are ignored
//!
//! A delimiter only counts at the start of a line and when followed by `--`,
//! or by optional spaces and a line break. A JSON string holding the boundary
//! text, or a line such as `--graphqlX`, does not split a part.
//!
//! # Examples
//!
//! ```
//! use graphql_multipart::client::MultipartReader;
//!
//! let mut reader = MultipartReader::new("graphql", 1024);
//!
//! let parts = reader.feed(b"--graphql\r\ncontent-type: application/json\r\n\r\n{\"payl").unwrap();
//! assert!(parts.is_empty());
//!
//! let parts = reader.feed(b"oad\":null}\r\n--graphql--\r\n").unwrap();
//! assert_eq!(parts, vec!["content-type: application/json\r\n\r\n{\"payload\":null}"]);
//! assert!(reader.is_closed());
//! ```

use crate::error::{MultipartError, Result};
use bytes::BytesMut;

/// Read state of a [`MultipartReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    /// Before the first delimiter
    Preamble,
    /// Between delimiters
    Parts,
    /// After the closing delimiter
    Closed,
}

/// What follows a candidate delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix {
    /// Line break, the delimiter opens a part
    Open,
    /// `--`, the body ends
    Closing,
    /// Not enough bytes to decide yet
    Incomplete,
    /// The line only starts with the delimiter text
    Invalid,
}

/// Splits a multipart body into complete parts.
#[derive(Debug)]
pub struct MultipartReader {
    /// Bytes not yet released as a part
    buffer: BytesMut,
    /// `--` followed by the boundary
    delimiter: Vec<u8>,
    /// Current state
    state: ReadState,
    /// Buffer offset up to which no delimiter can start
    searched: usize,
    /// Limit on pending bytes
    max_part_bytes: usize,
}

impl MultipartReader {
    /// Create a reader for `boundary` (without the leading `--`).
    pub fn new(boundary: &str, max_part_bytes: usize) -> Self {
        let mut delimiter = Vec::with_capacity(boundary.len() + 2);
        delimiter.extend_from_slice(b"--");
        delimiter.extend_from_slice(boundary.as_bytes());

        MultipartReader {
            buffer: BytesMut::with_capacity(8192),
            delimiter,
            state: ReadState::Preamble,
            searched: 0,
            max_part_bytes,
        }
    }

    /// Feed bytes, returning every part completed by them.
    ///
    /// # Errors
    ///
    /// * [`MultipartError::PartTooLarge`] when more than `max_part_bytes`
    ///   are pending without a delimiter
    /// * [`MultipartError::Utf8`] when a completed part is not UTF-8
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<String>> {
        if self.state == ReadState::Closed {
            return Ok(Vec::new());
        }

        self.buffer.extend_from_slice(data);
        let mut parts = Vec::new();

        loop {
            match self.state {
                ReadState::Preamble => match self.find_delimiter(false) {
                    Some((pos, suffix)) => {
                        let _ = self.buffer.split_to(pos + self.delimiter.len());
                        self.searched = 0;
                        self.state = ReadState::Parts;

                        if suffix == Suffix::Closing {
                            self.close(parts.len());
                        }
                    }
                    None => break,
                },
                ReadState::Parts => match self.find_delimiter(false) {
                    Some((pos, suffix)) => {
                        let part = self.buffer.split_to(pos);
                        let _ = self.buffer.split_to(self.delimiter.len());
                        self.searched = 0;

                        if let Some(part) = decode_part(&part)? {
                            parts.push(part);
                        }

                        if suffix == Suffix::Closing {
                            self.close(parts.len());
                        }
                    }
                    None => break,
                },
                ReadState::Closed => break,
            }
        }

        if self.buffer.len() > self.max_part_bytes {
            return Err(MultipartError::PartTooLarge {
                limit: self.max_part_bytes,
            });
        }

        Ok(parts)
    }

    /// Flush at the end of the body.
    ///
    /// Returns the trailing part when the body ended without a closing
    /// delimiter and the pending text is not blank.
    pub fn finish(&mut self) -> Result<Option<String>> {
        let state = std::mem::replace(&mut self.state, ReadState::Closed);
        if state != ReadState::Parts {
            self.buffer.clear();
            return Ok(None);
        }

        let end = self
            .find_delimiter(true)
            .map_or(self.buffer.len(), |(pos, _)| pos);
        let pending = self.buffer.split_to(end);
        self.buffer.clear();

        let part = decode_part(&pending)?;
        if part.is_some() {
            tracing::debug!("multipart body ended without closing delimiter");
        }
        Ok(part)
    }

    /// Get current read state
    pub fn state(&self) -> ReadState {
        self.state
    }

    /// Whether the closing delimiter was seen.
    pub fn is_closed(&self) -> bool {
        self.state == ReadState::Closed
    }

    /// Bytes waiting for a delimiter.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn close(&mut self, parts: usize) {
        tracing::debug!(parts, "multipart body closed");
        self.buffer.clear();
        self.state = ReadState::Closed;
    }

    /// Position of the first complete delimiter line, with its kind.
    ///
    /// At the end of the body (`at_eof`) a delimiter cut short by the end of
    /// the buffer counts as one.
    fn find_delimiter(&mut self, at_eof: bool) -> Option<(usize, Suffix)> {
        let len = self.delimiter.len();
        let mut pos = self.searched;

        while pos + len <= self.buffer.len() {
            let at_line_start = if pos == 0 {
                self.state == ReadState::Preamble
            } else {
                self.buffer[pos - 1] == b'\n'
            };

            if at_line_start && self.buffer[pos..pos + len] == self.delimiter[..] {
                match delimiter_suffix(&self.buffer[pos + len..], at_eof) {
                    suffix @ (Suffix::Open | Suffix::Closing) => return Some((pos, suffix)),
                    Suffix::Incomplete => {
                        self.searched = pos;
                        return None;
                    }
                    Suffix::Invalid => {}
                }
            }
            pos += 1;
        }

        // Keep one byte before a possible delimiter start for the line check.
        self.searched = self.buffer.len().saturating_sub(len);
        None
    }
}

/// Classify the bytes following a delimiter.
fn delimiter_suffix(rest: &[u8], at_eof: bool) -> Suffix {
    if rest.starts_with(b"--") {
        return Suffix::Closing;
    }
    if rest == b"-" {
        return if at_eof { Suffix::Closing } else { Suffix::Incomplete };
    }

    let padding = rest.iter().take_while(|b| matches!(b, b' ' | b'\t')).count();
    match &rest[padding..] {
        [b'\n', ..] | [b'\r', b'\n', ..] => Suffix::Open,
        [] | [b'\r'] if at_eof => Suffix::Open,
        [] | [b'\r'] => Suffix::Incomplete,
        _ => Suffix::Invalid,
    }
}

fn decode_part(raw: &[u8]) -> Result<Option<String>> {
    let text = String::from_utf8(raw.to_vec())?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else if trimmed.len() == text.len() {
        Ok(Some(text))
    } else {
        Ok(Some(trimmed.to_string()))
    }
}
