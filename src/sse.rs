//! Incremental SSE (Server-Sent Events) decoding for streaming responses.
//!
//! The gateway streams chat completions as `data:` lines terminated by a
//! `data: [DONE]` sentinel:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"Hello"}}]}
//!
//! data: {"choices":[{"delta":{"content":" world"}}]}
//!
//! data: [DONE]
//! ```
//!
//! [`SseDecoder`] consumes raw bytes in whatever chunk sizes the network
//! delivers, reassembles lines across chunk boundaries (including UTF-8
//! sequences split mid-character), and produces one JSON frame per
//! complete `data:` line. Lines that are not `data:` prefixed (comments,
//! `event:`/`id:` fields, blank separators) are skipped. Malformed JSON
//! payloads are dropped with a `warn!` rather than surfaced -- the gateway
//! occasionally emits partial frames during upstream failover, and a
//! dropped delta is preferable to killing the whole stream.

use std::collections::VecDeque;

use bytes::Bytes;
use futures_util::{Stream, StreamExt, stream};
use serde_json::Value;
use tracing::{trace, warn};

use crate::error::Result;

/// The sentinel payload that marks the end of an SSE stream.
const DONE_SENTINEL: &str = "[DONE]";

/// Stateful line-reassembling SSE decoder.
///
/// One decoder is owned by exactly one in-flight stream; it is never
/// shared. The internal buffer holds only the tail of the last incomplete
/// line between reads, so memory use is bounded by the longest single
/// frame the gateway emits.
#[derive(Debug, Default)]
pub struct SseDecoder {
    /// Undecoded bytes: at most an incomplete trailing UTF-8 sequence.
    tail: Vec<u8>,
    /// Decoded text not yet terminated by a newline.
    buffer: String,
    /// Set once the `[DONE]` sentinel has been seen.
    done: bool,
    /// Count of `data:` lines dropped because their payload was not JSON.
    dropped: u64,
}

impl SseDecoder {
    /// Create a fresh decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the `[DONE]` sentinel has been observed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of malformed `data:` lines silently discarded so far.
    pub fn frames_dropped(&self) -> u64 {
        self.dropped
    }

    /// Feed a chunk of raw bytes, returning every frame completed by it.
    ///
    /// Frames are returned in wire order. After `[DONE]` has been seen,
    /// further input is ignored.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Value> {
        if self.done {
            return Vec::new();
        }
        self.decode_utf8(bytes);

        let mut frames = Vec::new();
        while let Some(newline_pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline_pos).collect();
            if let Some(frame) = self.process_line(line.trim()) {
                frames.push(frame);
            }
            if self.done {
                break;
            }
        }
        frames
    }

    /// Signal end-of-input, flushing a final unterminated line if any.
    ///
    /// Streams that end without a `[DONE]` sentinel are not an error; the
    /// sequence simply ends.
    pub fn finish(&mut self) -> Vec<Value> {
        if self.done {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.buffer);
        self.process_line(line.trim()).into_iter().collect()
    }

    /// Streaming UTF-8 decode: append what is valid to the text buffer and
    /// carry an incomplete trailing sequence over to the next chunk.
    fn decode_utf8(&mut self, bytes: &[u8]) {
        self.tail.extend_from_slice(bytes);
        match std::str::from_utf8(&self.tail) {
            Ok(text) => {
                self.buffer.push_str(text);
                self.tail.clear();
            }
            Err(e) if e.error_len().is_none() => {
                // Incomplete multi-byte character at the end; keep it.
                let valid = e.valid_up_to();
                self.buffer
                    .push_str(std::str::from_utf8(&self.tail[..valid]).unwrap_or(""));
                self.tail.drain(..valid);
            }
            Err(_) => {
                // Genuinely invalid bytes; decode lossily and move on.
                self.buffer.push_str(&String::from_utf8_lossy(&self.tail));
                self.tail.clear();
            }
        }
    }

    /// Process one complete line. Returns a frame for a parseable `data:`
    /// payload; everything else (non-data lines, the sentinel, malformed
    /// JSON) yields nothing.
    fn process_line(&mut self, line: &str) -> Option<Value> {
        let payload = line.strip_prefix("data:")?.trim();
        if payload.is_empty() {
            return None;
        }
        if payload == DONE_SENTINEL {
            self.done = true;
            return None;
        }
        match serde_json::from_str(payload) {
            Ok(frame) => {
                trace!(?frame, "decoded SSE frame");
                Some(frame)
            }
            Err(e) => {
                self.dropped += 1;
                warn!(error = %e, line = %payload, "dropping malformed SSE frame");
                None
            }
        }
    }
}

/// Turn a byte stream (typically `reqwest::Response::bytes_stream`) into a
/// lazy sequence of decoded JSON frames.
///
/// The sequence ends when the `[DONE]` sentinel is seen or the source is
/// exhausted, whichever comes first. Transport errors mid-stream are
/// yielded once and terminate the sequence. Dropping the returned stream
/// drops the source, releasing the underlying connection.
pub(crate) fn frame_stream<S>(source: S) -> impl Stream<Item = Result<Value>> + Send
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + Unpin + 'static,
{
    struct DecodeState<S> {
        source: S,
        decoder: SseDecoder,
        pending: VecDeque<Value>,
        eof: bool,
    }

    let state = DecodeState {
        source,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        eof: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(frame) = st.pending.pop_front() {
                return Some((Ok(frame), st));
            }
            if st.eof || st.decoder.is_done() {
                return None;
            }
            match st.source.next().await {
                Some(Ok(bytes)) => {
                    let frames = st.decoder.feed(&bytes);
                    st.pending.extend(frames);
                }
                Some(Err(e)) => {
                    st.eof = true;
                    return Some((Err(e.into()), st));
                }
                None => {
                    st.eof = true;
                    let frames = st.decoder.finish();
                    st.pending.extend(frames);
                }
            }
        }
    })
}
