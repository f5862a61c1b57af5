//! Streamed decoding of multipart GraphQL responses.
//!
//! This module connects a response body, delivered as a stream of byte
//! chunks, to the chunk parser.
//!
//! # Overview
//!
//! A [`BodyDecoder`] owns the reassembly buffer ([`MultipartReader`]) and the
//! negotiated [`ProtocolSpec`]. It runs on its own tokio task and forwards
//! every payload through a bounded channel to a [`ResponseStream`].
//!
//! Any error ends the stream: it is delivered as the last item and the
//! decoder stops reading the body. Dropping the [`ResponseStream`] stops the
//! decoder as well.
//!
//! # Examples
//!
//! ```
//! use bytes::Bytes;
//! use futures::stream;
//! use graphql_multipart::client::{BodyDecoder, ClientConfig};
//! use graphql_multipart::protocol::ProtocolSpec;
//!
//! # tokio_test::block_on(async {
//! let body = stream::iter(vec![
//!     Ok::<_, std::io::Error>(Bytes::from_static(b"--graphql\r\n{\"payload\":{\"n\":1}}\r\n--gra")),
//!     Ok(Bytes::from_static(b"phql--\r\n")),
//! ]);
//!
//! let decoder = BodyDecoder::new("graphql", ProtocolSpec::SUBSCRIPTION, &ClientConfig::default());
//! let mut stream = decoder.spawn(body, 8);
//!
//! let payload = stream.next().await.unwrap().unwrap();
//! assert_eq!(payload, Bytes::from_static(br#"{"n":1}"#));
//! assert!(stream.next().await.is_none());
//! # });
//! ```

use super::config::ClientConfig;
use super::reader::MultipartReader;
use crate::error::{MultipartError, Result};
use crate::protocol::ProtocolSpec;
use crate::types::Outcome;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Payloads of one streamed response.
///
/// Yields `Ok(payload)` per payload in arrival order, then at most one
/// `Err`, then `None`. Usable through the inherent `next()` or as a
/// [`Stream`] with `StreamExt`.
///
/// # Lifecycle
///
/// 1. Created by [`BodyDecoder::spawn`] or `GraphQLClient::execute()`
/// 2. Receives payloads through `next().await` while the body is decoded
/// 3. Ends with `None` once the closing delimiter or the end of the body is
///    reached, or right after an error
///
/// Dropping the stream stops its decoder task at the next payload.
///
/// # Error Handling
///
/// The stream yields an `Err` when:
/// - The connection fails while the body is read ([`MultipartError::Http`])
/// - A part exceeds the configured size or is not UTF-8
/// - A part fails to parse ([`MultipartError::Parsing`]), including an
///   irrecoverable GraphQL error sent by the server
///
/// Nothing follows an error. Callers wanting more events must issue a new
/// request.
#[derive(Debug)]
pub struct ResponseStream {
    receiver: ReceiverStream<Result<Bytes>>,
}

impl ResponseStream {
    /// Create a stream from a receiver channel.
    ///
    /// This is typically called by [`BodyDecoder::spawn`].
    ///
    /// # Arguments
    ///
    /// * `receiver` - Channel fed with payloads, closed after the last one
    pub fn new(receiver: mpsc::Receiver<Result<Bytes>>) -> Self {
        ResponseStream {
            receiver: ReceiverStream::new(receiver),
        }
    }

    /// Receive the next payload.
    ///
    /// # Returns
    ///
    /// - `Some(Ok(Bytes))` - JSON bytes of the next payload
    /// - `Some(Err(MultipartError))` - The response failed, nothing follows
    /// - `None` - The response is complete
    pub async fn next(&mut self) -> Option<Result<Bytes>> {
        self.receiver.next().await
    }
}

impl Stream for ResponseStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

/// Decodes one multipart response body.
#[derive(Debug)]
pub struct BodyDecoder {
    reader: MultipartReader,
    spec: ProtocolSpec,
    enable_logging: bool,
}

impl BodyDecoder {
    /// Create a decoder for a body delimited by `boundary`, speaking `spec`.
    pub fn new(boundary: &str, spec: ProtocolSpec, config: &ClientConfig) -> Self {
        BodyDecoder {
            reader: MultipartReader::new(boundary, config.max_part_bytes),
            spec,
            enable_logging: config.enable_logging,
        }
    }

    /// Run the decoder on a tokio task, returning the stream of its payloads.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `body` - Response body as a stream of byte chunks, split anywhere
    /// * `capacity` - Bound of the payload channel (at least 1). A slow
    ///   consumer stalls reading of the body once it is full.
    ///
    /// # Lifecycle
    ///
    /// The task ends when the body closes, on the first error (sent as the
    /// final item), or when the returned stream is dropped.
    pub fn spawn<S, E>(self, body: S, capacity: usize) -> ResponseStream
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(self.run(body, tx));
        ResponseStream::new(rx)
    }

    /// Decode `body` until it ends, fails, or `tx` is closed.
    pub async fn run<S, E>(mut self, body: S, tx: mpsc::Sender<Result<Bytes>>)
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: fmt::Display,
    {
        futures::pin_mut!(body);

        while let Some(chunk) = body.next().await {
            let parts = match chunk {
                Ok(chunk) => self.reader.feed(&chunk),
                Err(e) => Err(MultipartError::Http(e.to_string())),
            };

            match parts {
                Ok(parts) => {
                    for part in parts {
                        if !self.deliver(&part, &tx).await {
                            return;
                        }
                    }
                }
                Err(e) => {
                    self.fail(e, &tx).await;
                    return;
                }
            }

            if self.reader.is_closed() {
                return;
            }
        }

        match self.reader.finish() {
            Ok(Some(part)) => {
                self.deliver(&part, &tx).await;
            }
            Ok(None) => {}
            Err(e) => self.fail(e, &tx).await,
        }
    }

    /// Parse one part and forward its outcomes. Returns `false` once decoding
    /// must stop.
    async fn deliver(&self, part: &str, tx: &mpsc::Sender<Result<Bytes>>) -> bool {
        let outcomes: Vec<Outcome> = self.spec.outcomes(part).collect();

        for outcome in outcomes {
            match outcome {
                Outcome::Data(payload) => {
                    if tx.send(Ok(payload)).await.is_err() {
                        tracing::debug!("response stream dropped");
                        return false;
                    }
                }
                Outcome::Error(error) => {
                    self.fail(error.into(), tx).await;
                    return false;
                }
            }
        }
        true
    }

    async fn fail(&self, error: MultipartError, tx: &mpsc::Sender<Result<Bytes>>) {
        if self.enable_logging {
            tracing::warn!(token = self.spec.token(), "multipart response failed: {}", error);
        }
        let _ = tx.send(Err(error)).await;
    }
}
