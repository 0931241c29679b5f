//! Wire-level message shapes and the seams to the hosting transport.
//!
//! # Responsibilities
//! - Define the inbound message and outbound frame types exchanged with
//!   the transport
//! - Define the pull ([`EventSource`]) and push ([`FrameSink`]) seams the
//!   hosting transport implements
//! - Tag every exchange with a unique ID for log correlation
//!
//! # Design Decisions
//! - One logical stream per exchange; no multiplexing
//! - Receive and send operations are strictly sequential per exchange,
//!   enforced by `&mut self` on the seam traits
//! - Unrecognized transport messages are carried by kind name instead of
//!   widening the enum, so the adapter can reject them explicitly

pub mod channel;

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::StatusCode;

use crate::error::TransportError;

/// Global atomic counter for exchange IDs.
/// Relaxed ordering is sufficient since only uniqueness matters.
static EXCHANGE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one exchange, carried in tracing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeId(u64);

impl ExchangeId {
    /// Generate a new unique exchange ID.
    pub fn new() -> Self {
        Self(EXCHANGE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exchange-{}", self.0)
    }
}

/// One message from the transport's inbound stream for an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// A chunk of request body. `more_body` promises further chunks.
    Body { data: Bytes, more_body: bool },

    /// The client went away; no more body will arrive.
    Disconnect,

    /// A message the hosting transport could not classify, carried by its
    /// kind name. Seeing one during body receive is a protocol violation.
    Unsupported(String),
}

/// One outbound frame of a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Opens the response: status code plus the full header list as raw
    /// name/value byte pairs.
    Start {
        status: StatusCode,
        headers: Vec<(Bytes, Bytes)>,
    },

    /// One chunk of response body. `more_body` marks continuation; the
    /// frame that clears it terminates the exchange.
    Body { data: Bytes, more_body: bool },
}

impl Frame {
    /// Whether this frame promises further body frames.
    pub fn more_body(&self) -> bool {
        match self {
            Frame::Start { .. } => true,
            Frame::Body { more_body, .. } => *more_body,
        }
    }
}

/// Future type returned by the transport seams.
pub type TransportFuture<'a, T> = BoxFuture<'a, Result<T, TransportError>>;

/// Pull side of the transport: yields inbound messages one at a time.
///
/// The bridge never has more than one receive in flight for an exchange
/// and stops calling after the final body chunk or a disconnect.
pub trait EventSource: Send {
    /// Wait for and consume exactly one inbound message.
    fn next_message(&mut self) -> TransportFuture<'_, InboundMessage>;
}

/// Push side of the transport: accepts response frames in order.
///
/// A failed send fails the exchange; the bridge will not offer further
/// frames after an error.
pub trait FrameSink: Send {
    /// Deliver one frame to the transport.
    fn send_frame(&mut self, frame: Frame) -> TransportFuture<'_, ()>;
}
