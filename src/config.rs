//! Tuning knobs for the bridge adapters.
//!
//! There is no configuration file; hosting transports construct a
//! [`BridgeConfig`] in code and hand it to the request facade.

/// Tuning values shared by the adapters of one deployment.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Chunk size used when draining a whole request body. Each pass pulls
    /// at most this many bytes out of the input stream before appending to
    /// the result.
    pub read_chunk_size: usize,

    /// Default queue capacity for the in-process channel transport. A full
    /// queue applies backpressure to the pushing side.
    pub channel_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: 8192,
            channel_capacity: 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.read_chunk_size, 8192);
        assert!(config.channel_capacity > 0);
    }
}
