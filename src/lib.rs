//! Bidirectional adapter between blocking, pull-based request handlers
//! and an asynchronous, message-based transport.
//!
//! Inbound body messages become an ordinary blocking byte-stream read;
//! outbound response chunks become sequential send operations with
//! first/continuation/last framing. The crate is a library invoked by a
//! hosting transport; it has no server loop of its own.

pub mod config;
pub mod error;
pub mod metadata;
pub mod request;
pub mod response;
pub mod scheduler;
pub mod transport;

pub use config::BridgeConfig;
pub use error::{BridgeError, TransportError};
pub use metadata::{translate, ExchangeDescriptor, MetadataMap};
pub use request::input::SyncInput;
pub use request::BridgeRequest;
pub use response::body::{Charset, Chunk, ResponseBody};
pub use response::{BridgeResponse, Responder};
pub use scheduler::SchedulerHandle;
pub use transport::{EventSource, ExchangeId, Frame, FrameSink, InboundMessage};
