//! Response-side facade and the streaming send protocol.
//!
//! # Responsibilities
//! - Carry the handler's synchronous response (status, headers, body)
//! - Decide the effective body for the originating request
//! - Drive the transport's send protocol: one start frame, tagged body
//!   frames, and a terminal frame where the chunk count was not known
//!
//! # Design Decisions
//! - Head-of-response suppression (HEAD, 1xx, 204, 304) wins over both
//!   passthrough and the declared body
//! - When the chunk count is known the last data frame itself drops the
//!   continuation tag, saving the extra terminal frame
//! - A send failure aborts the exchange immediately; nothing is retried

pub mod body;

use bytes::Bytes;
use futures_util::StreamExt;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};

use crate::error::BridgeError;
use crate::response::body::{Charset, Chunk, ResponseBody};
use crate::transport::{Frame, FrameSink};

/// Synchronous-style response produced by handler code.
#[derive(Debug)]
pub struct BridgeResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
    charset: Charset,
    direct_passthrough: bool,
}

impl BridgeResponse {
    /// An empty response with the given status.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
            charset: Charset::default(),
            direct_passthrough: false,
        }
    }

    /// Append a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<ResponseBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Declare the charset used to encode text chunks.
    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Forward the body source unmodified, skipping chunk re-encoding.
    pub fn with_direct_passthrough(mut self) -> Self {
        self.direct_passthrough = true;
        self
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable response headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Turn this response into the responder for one exchange.
    ///
    /// `method` is the originating request's method; a HEAD request
    /// suppresses the body no matter what the response declares.
    pub fn into_responder(self, method: Method) -> Responder {
        Responder {
            response: self,
            method,
        }
    }
}

/// Drives the send protocol for one exchange, exactly once.
#[derive(Debug)]
pub struct Responder {
    response: BridgeResponse,
    method: Method,
}

/// Whether a response with this status never carries a body.
fn bodiless_status(status: StatusCode) -> bool {
    status.is_informational()
        || status == StatusCode::NO_CONTENT
        || status == StatusCode::NOT_MODIFIED
}

/// Adapt one chunk to raw bytes for the wire.
fn chunk_bytes(chunk: Chunk, charset: Charset, passthrough: bool) -> Result<Bytes, BridgeError> {
    match chunk {
        Chunk::Bytes(data) => Ok(data),
        Chunk::Text(text) => {
            if passthrough {
                tracing::warn!("text chunk in a direct-passthrough body, encoding it anyway");
            }
            charset.encode(&text)
        }
    }
}

impl Responder {
    /// Run the send protocol against the transport's send half.
    ///
    /// The transport hands the responder both halves of the exchange; only
    /// the send half is consumed here. Sends are issued strictly in chunk
    /// order, one at a time. The first failed send fails the exchange and
    /// no further frames are offered.
    pub async fn respond<S: FrameSink + ?Sized>(self, sink: &mut S) -> Result<(), BridgeError> {
        let Responder { response, method } = self;
        let status = response.status;
        let charset = response.charset;

        let suppress = method == Method::HEAD || bodiless_status(status);
        let passthrough = response.direct_passthrough && !suppress;
        let effective = if suppress {
            ResponseBody::Empty
        } else {
            response.body
        };
        let known_count = effective.known_count();

        let headers: Vec<(Bytes, Bytes)> = response
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    Bytes::copy_from_slice(name.as_str().as_bytes()),
                    Bytes::copy_from_slice(value.as_bytes()),
                )
            })
            .collect();

        sink.send_frame(Frame::Start { status, headers })
            .await
            .map_err(BridgeError::Send)?;
        tracing::trace!(status = %status, suppressed = suppress, "response started");

        let mut chunks = effective.into_stream();
        match known_count {
            Some(total) => {
                let mut sent = 0usize;
                while let Some(chunk) = chunks.next().await {
                    let data = chunk_bytes(chunk, charset, passthrough)?;
                    sent += 1;
                    sink.send_frame(Frame::Body {
                        data,
                        more_body: sent < total,
                    })
                    .await
                    .map_err(BridgeError::Send)?;
                }
                // A count of zero still needs its terminal frame; the
                // single empty frame closes the exchange.
                if total == 0 {
                    sink.send_frame(Frame::Body {
                        data: Bytes::new(),
                        more_body: false,
                    })
                    .await
                    .map_err(BridgeError::Send)?;
                }
            }
            None => {
                // Count unknown: every data frame promises more, and one
                // empty untagged frame terminates the exchange.
                while let Some(chunk) = chunks.next().await {
                    let data = chunk_bytes(chunk, charset, passthrough)?;
                    sink.send_frame(Frame::Body {
                        data,
                        more_body: true,
                    })
                    .await
                    .map_err(BridgeError::Send)?;
                }
                sink.send_frame(Frame::Body {
                    data: Bytes::new(),
                    more_body: false,
                })
                .await
                .map_err(BridgeError::Send)?;
            }
        }
        tracing::trace!(status = %status, "response finished");
        Ok(())
    }
}
