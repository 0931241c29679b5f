//! Blocking byte-stream reads over an asynchronous message source.
//!
//! # Responsibilities
//! - Expose the request body as an ordinary blocking read
//! - Issue at most one underlying receive at a time, each run to
//!   completion across the scheduler boundary
//! - Track end-of-stream so no receive is ever issued after the source
//!   finished
//!
//! # Design Decisions
//! - Only as many messages are pulled as the current read needs, so the
//!   transport's natural backpressure is preserved
//! - A disconnect is ordinary end-of-stream, not an error
//! - The stream is exclusively owned by one exchange; it is not a shared
//!   handle

use std::io;

use bytes::{Bytes, BytesMut};

use crate::error::BridgeError;
use crate::scheduler::SchedulerHandle;
use crate::transport::{EventSource, ExchangeId, InboundMessage};

/// Synchronous input stream for one exchange's request body.
pub struct SyncInput {
    source: Box<dyn EventSource>,
    scheduler: SchedulerHandle,
    buffer: BytesMut,
    /// No more bytes will ever be returned; set on the first empty receive.
    exhausted: bool,
    /// The receive loop terminated (final chunk seen or client gone); no
    /// further receive operations are issued once set.
    ended: bool,
    read_chunk_size: usize,
    exchange: ExchangeId,
}

impl SyncInput {
    pub(crate) fn new(
        source: Box<dyn EventSource>,
        scheduler: SchedulerHandle,
        read_chunk_size: usize,
        exchange: ExchangeId,
    ) -> Self {
        Self {
            source,
            scheduler,
            buffer: BytesMut::new(),
            exhausted: false,
            ended: false,
            read_chunk_size,
            exchange,
        }
    }

    /// Whether all bytes have been handed out and no more will arrive.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Whether the underlying receive loop has terminated.
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Consume exactly one message from the source.
    ///
    /// Returns the message's bytes; empty means the source will not
    /// produce anything further for this call sequence. Blocks the calling
    /// execution context while the receive crosses to the scheduler.
    fn receive_once(&mut self) -> Result<Bytes, BridgeError> {
        if self.ended {
            return Ok(Bytes::new());
        }
        let scheduler = self.scheduler.clone();
        let message = scheduler
            .block_on(self.source.next_message())
            .map_err(BridgeError::Receive)?;
        match message {
            InboundMessage::Disconnect => {
                self.ended = true;
                tracing::debug!(exchange = %self.exchange, "client disconnected during body receive");
                Ok(Bytes::new())
            }
            InboundMessage::Body { data, more_body } => {
                if !more_body {
                    self.ended = true;
                }
                tracing::trace!(
                    exchange = %self.exchange,
                    bytes = data.len(),
                    more_body,
                    "body message received"
                );
                Ok(data)
            }
            InboundMessage::Unsupported(kind) => {
                self.ended = true;
                Err(BridgeError::UnexpectedMessage { kind })
            }
        }
    }

    /// Read up to `n` bytes, blocking until the request can be satisfied
    /// or the source is drained.
    ///
    /// Returns empty immediately when `n` is zero or the stream is already
    /// exhausted. While the source still promises data, the call keeps
    /// receiving rather than return a short read; a short result therefore
    /// always means the body ended.
    pub fn read(&mut self, n: usize) -> Result<Bytes, BridgeError> {
        if n == 0 || self.exhausted {
            return Ok(Bytes::new());
        }
        while self.buffer.len() < n {
            let chunk = self.receive_once()?;
            if chunk.is_empty() {
                self.exhausted = true;
                break;
            }
            self.buffer.extend_from_slice(&chunk);
        }
        let take = n.min(self.buffer.len());
        Ok(self.buffer.split_to(take).freeze())
    }

    /// Drain the remaining body into one buffer.
    ///
    /// Reads a fixed-size chunk at a time until the source is exhausted
    /// and concatenates the results. The whole body lands in memory, so
    /// this is not suitable for unbounded bodies in memory-constrained
    /// settings.
    pub fn read_all(&mut self) -> Result<Bytes, BridgeError> {
        let mut out = BytesMut::new();
        loop {
            let chunk = self.read(self.read_chunk_size)?;
            if chunk.is_empty() {
                break;
            }
            out.extend_from_slice(&chunk);
        }
        Ok(out.freeze())
    }
}

impl io::Read for SyncInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let bytes = SyncInput::read(self, buf.len()).map_err(io::Error::other)?;
        buf[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }
}

impl std::fmt::Debug for SyncInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncInput")
            .field("exchange", &self.exchange)
            .field("buffered", &self.buffer.len())
            .field("exhausted", &self.exhausted)
            .field("ended", &self.ended)
            .finish()
    }
}
