//! Server-Sent Events (SSE) decoding for the search stream.
//!
//! The backend reports search progress as newline-delimited SSE frames:
//! ```text
//! data: {"type": "status", "message": "Analyzing your search query..."}
//!
//! data: {"type": "results", "items": [...]}
//! ```
//!
//! Frames may arrive split across any number of network chunks. The
//! [`StreamDecoder`] buffers partial lines and turns every complete `data:`
//! line into a [`StreamEvent`]. Malformed frames are logged and dropped,
//! never fatal.

use std::collections::VecDeque;

use bytes::BytesMut;
use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::ClientError;
use crate::model::StreamEvent;

/// Reasons a single `data:` frame was dropped.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame has no string `type` field")]
    MissingType,

    #[error("malformed `{kind}` frame: {source}")]
    Shape {
        kind: String,
        source: serde_json::Error,
    },
}

/// Incremental decoder for one stream session.
///
/// Bytes are buffered rather than text so that a chunk boundary falling
/// inside a multi-byte UTF-8 sequence does not corrupt the line.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: BytesMut,
    malformed: usize,
}

impl StreamDecoder {
    /// Create a decoder with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return the events of every line it completed.
    ///
    /// The trailing segment after the last `\n` stays buffered until a later
    /// chunk (or [`finish`](Self::finish)) completes it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line = self.buffer.split_to(pos + 1);
            if let Some(event) = self.decode_line(&line[..pos]) {
                events.push(event);
            }
        }
        events
    }

    /// Flush the residual buffer at end of stream.
    ///
    /// A final frame without a trailing newline is still decoded.
    pub fn finish(&mut self) -> Option<StreamEvent> {
        let residual = self.buffer.split();
        if residual.is_empty() {
            return None;
        }
        self.decode_line(&residual)
    }

    /// Number of `data:` frames dropped because they failed to parse.
    pub fn malformed_frames(&self) -> usize {
        self.malformed
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<StreamEvent> {
        let line = String::from_utf8_lossy(line);
        let line = line.strip_suffix('\r').unwrap_or(&*line);
        let data = parse_sse_line(line)?;

        match parse_frame(data) {
            Ok(event) => event,
            Err(error) => {
                self.malformed += 1;
                warn!(%error, frame = data, "dropping malformed stream frame");
                None
            }
        }
    }
}

/// Parse an SSE line to extract the data portion.
///
/// SSE lines are in the format: `data: <content>`
///
/// # Example
/// ```
/// use foresight::sse::parse_sse_line;
///
/// let line = "data: {\"type\": \"status\"}";
/// assert_eq!(parse_sse_line(line), Some("{\"type\": \"status\"}"));
///
/// assert_eq!(parse_sse_line(": keep-alive"), None);
/// ```
pub fn parse_sse_line(line: &str) -> Option<&str> {
    line.strip_prefix("data: ").map(|s| s.trim())
}

/// Parse the payload of a `data:` line into an event.
///
/// Returns `Ok(None)` for a well-formed frame whose `type` is not one of
/// [`StreamEvent::KINDS`]; such frames are skipped so newer backends can add
/// event types.
pub fn parse_frame(data: &str) -> Result<Option<StreamEvent>, FrameError> {
    let value: Value = serde_json::from_str(data)?;
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(FrameError::MissingType)?;

    if !StreamEvent::KINDS.contains(&kind) {
        debug!(kind, "ignoring stream frame with unrecognized type");
        return Ok(None);
    }

    let kind = kind.to_string();
    serde_json::from_value(value)
        .map(Some)
        .map_err(|source| FrameError::Shape { kind, source })
}

/// Decode a chunked byte stream into a lazy stream of events.
///
/// Events are yielded as soon as the chunk completing their line arrives.
/// A transport error is yielded once and ends the stream; it is not retried.
pub fn decode<S, B, E>(chunks: S) -> impl Stream<Item = Result<StreamEvent, ClientError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: Into<ClientError> + Send,
{
    stream::unfold(
        (Box::pin(chunks), StreamDecoder::new(), VecDeque::new(), false),
        |(mut chunks, mut decoder, mut pending, mut ended)| async move {
            loop {
                if let Some(event) = pending.pop_front() {
                    return Some((Ok(event), (chunks, decoder, pending, ended)));
                }

                if ended {
                    return None;
                }

                match chunks.next().await {
                    Some(Ok(chunk)) => pending.extend(decoder.feed(chunk.as_ref())),
                    Some(Err(error)) => {
                        return Some((Err(error.into()), (chunks, decoder, pending, true)));
                    }
                    None => {
                        ended = true;
                        pending.extend(decoder.finish());
                        if decoder.malformed_frames() > 0 {
                            debug!(
                                malformed = decoder.malformed_frames(),
                                "search stream ended with dropped frames"
                            );
                        }
                    }
                }
            }
        },
    )
}

/// Extension trait for `reqwest::Response` to decode search event streams.
///
/// # Example
/// ```ignore
/// use foresight::sse::SSEResponseExt;
///
/// let response = http.get(url).send().await?;
/// let mut events = std::pin::pin!(response.events());
/// while let Some(event) = events.next().await {
///     println!("{:?}", event?);
/// }
/// ```
pub trait SSEResponseExt {
    /// Convert the response body into a stream of decoded events.
    fn events(self) -> impl Stream<Item = Result<StreamEvent, ClientError>> + Send;
}

impl SSEResponseExt for reqwest::Response {
    fn events(self) -> impl Stream<Item = Result<StreamEvent, ClientError>> + Send {
        decode(self.bytes_stream())
    }
}
