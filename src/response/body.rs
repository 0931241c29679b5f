//! Response body producers.
//!
//! Handler code produces bodies in several shapes: already in memory, as
//! a lazy single-pass producer, or as something already asynchronous. All
//! of them unify behind one chunk stream before the send protocol runs.

use bytes::Bytes;
use futures_util::stream::{self, BoxStream, StreamExt};

use crate::error::BridgeError;

/// One chunk of response body as produced by the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Text, encoded with the response's declared charset before sending.
    Text(String),

    /// Raw bytes, forwarded as-is.
    Bytes(Bytes),
}

impl From<&str> for Chunk {
    fn from(text: &str) -> Self {
        Chunk::Text(text.to_owned())
    }
}

impl From<String> for Chunk {
    fn from(text: String) -> Self {
        Chunk::Text(text)
    }
}

impl From<Bytes> for Chunk {
    fn from(data: Bytes) -> Self {
        Chunk::Bytes(data)
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(data: Vec<u8>) -> Self {
        Chunk::Bytes(Bytes::from(data))
    }
}

impl From<&'static [u8]> for Chunk {
    fn from(data: &'static [u8]) -> Self {
        Chunk::Bytes(Bytes::from_static(data))
    }
}

/// Character set a response declares for its text chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// UTF-8, the default.
    #[default]
    Utf8,

    /// ISO-8859-1, one byte per character.
    Latin1,
}

impl Charset {
    /// Canonical name of the charset.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Latin1 => "iso-8859-1",
        }
    }

    /// Encode text into this charset.
    ///
    /// Fails for characters the charset cannot represent.
    pub fn encode(&self, text: &str) -> Result<Bytes, BridgeError> {
        match self {
            Charset::Utf8 => Ok(Bytes::copy_from_slice(text.as_bytes())),
            Charset::Latin1 => {
                let mut out = Vec::with_capacity(text.len());
                for c in text.chars() {
                    let code = u32::from(c);
                    if code > 0xFF {
                        return Err(BridgeError::Encode {
                            charset: self.name(),
                        });
                    }
                    out.push(code as u8);
                }
                Ok(Bytes::from(out))
            }
        }
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Body of a response in whichever shape the handler produced it.
///
/// The finite variants know their chunk count up front, which lets the
/// send protocol tag the last data frame directly. The single-pass
/// variants never do; whether the count is knowable is decided by the
/// variant alone, never probed at runtime.
#[derive(Default)]
pub enum ResponseBody {
    /// No body at all.
    #[default]
    Empty,

    /// A single in-memory chunk.
    Full(Chunk),

    /// A finite, already-materialized chunk sequence.
    Chunks(Vec<Chunk>),

    /// A lazy single-pass synchronous producer.
    Iter(Box<dyn Iterator<Item = Chunk> + Send>),

    /// An already-asynchronous producer.
    Stream(BoxStream<'static, Chunk>),
}

impl ResponseBody {
    /// Wrap a lazy synchronous producer.
    pub fn lazy<I>(iter: I) -> Self
    where
        I: Iterator<Item = Chunk> + Send + 'static,
    {
        ResponseBody::Iter(Box::new(iter))
    }

    /// Wrap an asynchronous producer.
    pub fn streaming<S>(stream: S) -> Self
    where
        S: stream::Stream<Item = Chunk> + Send + 'static,
    {
        ResponseBody::Stream(stream.boxed())
    }

    /// Statically-known chunk count; `None` for the single-pass variants.
    pub fn known_count(&self) -> Option<usize> {
        match self {
            ResponseBody::Empty => Some(0),
            ResponseBody::Full(_) => Some(1),
            ResponseBody::Chunks(chunks) => Some(chunks.len()),
            ResponseBody::Iter(_) | ResponseBody::Stream(_) => None,
        }
    }

    /// Unify every variant behind one asynchronous chunk stream.
    ///
    /// Single-pass: the returned stream consumes the body.
    pub(crate) fn into_stream(self) -> BoxStream<'static, Chunk> {
        match self {
            ResponseBody::Empty => stream::empty().boxed(),
            ResponseBody::Full(chunk) => stream::iter([chunk]).boxed(),
            ResponseBody::Chunks(chunks) => stream::iter(chunks).boxed(),
            ResponseBody::Iter(iter) => stream::iter(iter).boxed(),
            ResponseBody::Stream(inner) => inner,
        }
    }
}

impl From<&str> for ResponseBody {
    fn from(text: &str) -> Self {
        ResponseBody::Full(text.into())
    }
}

impl From<String> for ResponseBody {
    fn from(text: String) -> Self {
        ResponseBody::Full(text.into())
    }
}

impl From<Bytes> for ResponseBody {
    fn from(data: Bytes) -> Self {
        ResponseBody::Full(data.into())
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(data: Vec<u8>) -> Self {
        ResponseBody::Full(data.into())
    }
}

impl From<Vec<Chunk>> for ResponseBody {
    fn from(chunks: Vec<Chunk>) -> Self {
        ResponseBody::Chunks(chunks)
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Empty => f.write_str("Empty"),
            ResponseBody::Full(chunk) => f.debug_tuple("Full").field(chunk).finish(),
            ResponseBody::Chunks(chunks) => {
                f.debug_tuple("Chunks").field(&chunks.len()).finish()
            }
            ResponseBody::Iter(_) => f.write_str("Iter(..)"),
            ResponseBody::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}
