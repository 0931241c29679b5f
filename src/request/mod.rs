//! Request-side facade for one exchange.
//!
//! # Responsibilities
//! - Build the handler-facing request state from an exchange descriptor
//!   and the transport's receive half
//! - Expose body access to asynchronous callers as a suspension point, so
//!   parsing that pulls further messages never blocks the scheduler
//!
//! # Data Flow
//! ```text
//! descriptor ──translate──▶ MetadataMap ─┐
//!                                        ├─▶ BridgeRequest ──▶ handler
//! receive half ──────────▶ SyncInput ────┘
//! ```

pub mod input;

use bytes::Bytes;

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::metadata::{translate, ExchangeDescriptor, MetadataMap};
use crate::request::input::SyncInput;
use crate::scheduler::SchedulerHandle;
use crate::transport::{EventSource, ExchangeId};

/// Synchronous-style request handed to handler code.
///
/// Owns the exchange's translated metadata and its blocking input stream.
/// One instance per exchange; not meant to be shared between callers.
pub struct BridgeRequest {
    exchange: ExchangeId,
    metadata: MetadataMap,
    input: Option<SyncInput>,
}

impl BridgeRequest {
    /// Build the request state for one exchange.
    ///
    /// Translates the descriptor once and binds a fresh input stream to
    /// the transport's receive half on the given scheduler.
    pub fn new(
        descriptor: &ExchangeDescriptor,
        source: Box<dyn EventSource>,
        scheduler: SchedulerHandle,
        config: &BridgeConfig,
    ) -> Self {
        let exchange = ExchangeId::new();
        let metadata = translate(descriptor);
        tracing::debug!(
            exchange = %exchange,
            method = %descriptor.method,
            path = %descriptor.path,
            "exchange opened"
        );
        Self {
            exchange,
            metadata,
            input: Some(SyncInput::new(
                source,
                scheduler,
                config.read_chunk_size,
                exchange,
            )),
        }
    }

    /// This exchange's correlation ID.
    pub fn exchange_id(&self) -> ExchangeId {
        self.exchange
    }

    /// The translated metadata map.
    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    /// Mutable access to the blocking input stream, for handler code that
    /// already runs off the scheduler.
    ///
    /// `None` only if a [`with_input`](Self::with_input) worker was
    /// cancelled while it held the stream; the body is unrecoverable then.
    pub fn input_mut(&mut self) -> Option<&mut SyncInput> {
        self.input.as_mut()
    }

    /// Run `f` against the input stream on a blocking worker thread and
    /// suspend until it finishes.
    ///
    /// This is the suspension point for body access from asynchronous
    /// callers: `f` may issue blocking reads that pull further transport
    /// messages, and none of that runs on the scheduler itself. The stream
    /// is moved to the worker for the duration and re-attached afterwards.
    pub async fn with_input<T, F>(&mut self, f: F) -> Result<T, BridgeError>
    where
        F: FnOnce(&mut SyncInput) -> Result<T, BridgeError> + Send + 'static,
        T: Send + 'static,
    {
        let mut input = self
            .input
            .take()
            .ok_or_else(|| BridgeError::Worker("input stream is detached".into()))?;
        let outcome = tokio::task::spawn_blocking(move || {
            let result = f(&mut input);
            (input, result)
        })
        .await;
        match outcome {
            Ok((input, result)) => {
                self.input = Some(input);
                result
            }
            Err(join_error) => Err(BridgeError::Worker(join_error.to_string())),
        }
    }

    /// Read the entire remaining body, suspending the asynchronous caller
    /// while a worker drives the blocking read.
    ///
    /// Same memory caveat as [`SyncInput::read_all`]: the whole body is
    /// buffered.
    pub async fn read_body(&mut self) -> Result<Bytes, BridgeError> {
        self.with_input(|input| input.read_all()).await
    }
}

impl std::fmt::Debug for BridgeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeRequest")
            .field("exchange", &self.exchange)
            .field("metadata_entries", &self.metadata.len())
            .field("input_attached", &self.input.is_some())
            .finish()
    }
}
