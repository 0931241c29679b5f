//! Error definitions for the bridge adapters.

use thiserror::Error;

/// Errors reported by a hosting transport's receive or send primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer end of the transport channel is gone.
    #[error("transport channel closed")]
    Closed,

    /// Any other transport-level failure, carried as text.
    #[error("transport failure: {0}")]
    Other(String),
}

/// Errors surfaced by the bridge adapters.
///
/// A client disconnect is not represented here; it is ordinary
/// end-of-stream on the input side. Reading an already-exhausted body is
/// likewise not an error and simply yields empty.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Receiving the next inbound message failed.
    #[error("receive failed: {0}")]
    Receive(#[source] TransportError),

    /// Sending a response frame failed. The exchange is considered failed
    /// and no further frames are sent.
    #[error("send failed: {0}")]
    Send(#[source] TransportError),

    /// The transport delivered a message type that has no meaning while a
    /// request body is being received.
    #[error("unexpected transport message type: {kind}")]
    UnexpectedMessage { kind: String },

    /// A text chunk could not be represented in the response's declared
    /// character set.
    #[error("cannot encode body text as {charset}")]
    Encode { charset: &'static str },

    /// The blocking worker driving a body read was cancelled or panicked.
    #[error("blocking worker failed: {0}")]
    Worker(String),
}
