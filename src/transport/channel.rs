//! In-process channel binding of the transport seams.
//!
//! The reference implementation of [`EventSource`] and [`FrameSink`],
//! backed by bounded tokio channels. Hosting transports that already live
//! on the same runtime can use it directly; it is also what the tests
//! wire exchanges through.

use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::transport::{EventSource, Frame, FrameSink, InboundMessage, TransportFuture};

/// Inbound half: yields messages pushed by the hosting transport.
pub struct ChannelSource {
    rx: mpsc::Receiver<InboundMessage>,
}

/// Create a connected inbound queue.
///
/// Returns the sender the transport pushes messages into and the source
/// the bridge consumes. Dropping the sender reads as a client disconnect.
pub fn inbound_channel(capacity: usize) -> (mpsc::Sender<InboundMessage>, ChannelSource) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, ChannelSource { rx })
}

impl EventSource for ChannelSource {
    fn next_message(&mut self) -> TransportFuture<'_, InboundMessage> {
        Box::pin(async move {
            // A closed queue means the pushing side is gone for good, which
            // is indistinguishable from the client going away.
            Ok(self
                .rx
                .recv()
                .await
                .unwrap_or(InboundMessage::Disconnect))
        })
    }
}

/// Outbound half: hands frames to the hosting transport.
pub struct ChannelSink {
    tx: mpsc::Sender<Frame>,
}

/// Create a connected outbound queue.
///
/// Returns the sink the bridge sends frames into and the receiver the
/// transport drains. A full queue applies backpressure to the responder.
pub fn outbound_channel(capacity: usize) -> (ChannelSink, mpsc::Receiver<Frame>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelSink { tx }, rx)
}

impl FrameSink for ChannelSink {
    fn send_frame(&mut self, frame: Frame) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.tx
                .send(frame)
                .await
                .map_err(|_| TransportError::Closed)
        })
    }
}
