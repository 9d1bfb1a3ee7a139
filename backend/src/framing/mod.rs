//! Message framing and the transport sink seam
//!
//! Each envelope becomes exactly one Server-Sent Events frame:
//!
//! ```text
//! data: {"type":"info","message":"..."}\n\n
//! ```
//!
//! No `event:`, `id:` or `retry:` fields are ever written. [`frame`] is pure;
//! writing goes through a [`FrameSink`], which is the only place a session
//! can observe backpressure or a departed client.

use crate::models::Envelope;
use bytes::{BufMut, Bytes, BytesMut};
use std::future::Future;
use thiserror::Error;
use tokio::sync::mpsc;

const DATA_PREFIX: &[u8] = b"data: ";
const FRAME_TERMINATOR: &[u8] = b"\n\n";

/// Errors from encoding an envelope
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors from writing a frame to the transport
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SinkError {
    /// The client is gone; nothing more can be written.
    #[error("transport closed")]
    Closed,

    /// The write failed but the transport may still be usable.
    #[error("transport write failed: {0}")]
    Failed(String),
}

/// Encode one envelope as one SSE frame.
///
/// # Example
/// ```
/// use flowprobe_core_rs::framing::frame;
/// use flowprobe_core_rs::models::Envelope;
///
/// let bytes = frame(&Envelope::info("hello")).unwrap();
/// assert_eq!(&bytes[..], b"data: {\"type\":\"info\",\"message\":\"hello\"}\n\n");
/// ```
pub fn frame(envelope: &Envelope) -> Result<Bytes, FrameError> {
    let json = serde_json::to_vec(envelope)?;
    let mut buf = BytesMut::with_capacity(DATA_PREFIX.len() + json.len() + FRAME_TERMINATOR.len());
    buf.put_slice(DATA_PREFIX);
    buf.put_slice(&json);
    buf.put_slice(FRAME_TERMINATOR);
    Ok(buf.freeze())
}

/// Decode one SSE frame back into an envelope.
///
/// Intended for clients and tests; returns `None` for anything that is not a
/// single well-formed `data:` frame.
pub fn parse_frame(bytes: &[u8]) -> Option<Envelope> {
    let body = bytes
        .strip_prefix(DATA_PREFIX)?
        .strip_suffix(FRAME_TERMINATOR)?;
    serde_json::from_slice(body).ok()
}

/// Destination for encoded frames.
///
/// Frames must be delivered in the order `send` is called. An error from
/// `send` ends the session's generation loop; it is never retried.
pub trait FrameSink {
    fn send(&mut self, frame: Bytes) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// The HTTP layer hands each session the sending half of a bounded channel.
/// A full channel suspends the session; a dropped receiver means the client
/// disconnected.
impl FrameSink for mpsc::Sender<Bytes> {
    async fn send(&mut self, frame: Bytes) -> Result<(), SinkError> {
        mpsc::Sender::send(self, frame)
            .await
            .map_err(|_| SinkError::Closed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureMode {
    Never,
    CloseAfter(usize),
    FailOnceAt(usize),
}

/// In-memory sink that records every frame.
///
/// Can be told to simulate a disconnect or a one-off write fault. Available in
/// all builds so integration tests and client tooling can use it.
#[derive(Debug, Clone)]
pub struct MemorySink {
    frames: Vec<Bytes>,
    attempts: usize,
    mode: FailureMode,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            attempts: 0,
            mode: FailureMode::Never,
        }
    }

    /// Accept `accepted` frames, then report `SinkError::Closed` forever.
    pub fn closing_after(accepted: usize) -> Self {
        Self {
            mode: FailureMode::CloseAfter(accepted),
            ..Self::new()
        }
    }

    /// Fail the write attempt with zero-based index `attempt` with
    /// `SinkError::Failed`, accepting every other write.
    pub fn failing_once_at(attempt: usize) -> Self {
        Self {
            mode: FailureMode::FailOnceAt(attempt),
            ..Self::new()
        }
    }

    /// Frames accepted so far, in order.
    pub fn frames(&self) -> &[Bytes] {
        &self.frames
    }

    /// Number of `send` calls, including rejected ones.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Accepted frames decoded back into envelopes.
    ///
    /// # Panics
    /// Panics if a recorded frame is malformed.
    pub fn envelopes(&self) -> Vec<Envelope> {
        self.frames
            .iter()
            .map(|f| parse_frame(f).expect("recorded frame is well-formed"))
            .collect()
    }
}

impl FrameSink for MemorySink {
    async fn send(&mut self, frame: Bytes) -> Result<(), SinkError> {
        let attempt = self.attempts;
        self.attempts += 1;

        match self.mode {
            FailureMode::CloseAfter(accepted) if attempt >= accepted => Err(SinkError::Closed),
            FailureMode::FailOnceAt(at) if attempt == at => {
                Err(SinkError::Failed("simulated write fault".to_string()))
            }
            _ => {
                self.frames.push(frame);
                Ok(())
            }
        }
    }
}
