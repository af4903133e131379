//! Error types for engine configuration and processing calls.

use thiserror::Error;

/// Errors returned by [`ClipperEngine`](crate::ClipperEngine).
///
/// Parameter values never produce errors (they are clamped). Only an
/// unusable configuration or a caller breaking the block contract does.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Sample rate is non-finite or outside the supported range
    #[error("unsupported sample rate: {0} Hz (expected 8000 to 768000)")]
    UnsupportedSampleRate(f32),

    /// Maximum block size is zero
    #[error("invalid maximum block size: {0}")]
    InvalidBlockSize(usize),

    /// Channel count is not 1 or 2
    #[error("unsupported channel count: {0} (expected 1 or 2)")]
    UnsupportedChannelCount(usize),

    /// A process call arrived before a successful configure
    #[error("engine is not configured")]
    NotConfigured,

    /// Mono call on a stereo engine or the other way round
    #[error("engine configured for {expected} channel(s), called with {actual}")]
    ChannelMismatch {
        /// Channel count given at configure.
        expected: usize,
        /// Channel count implied by the process call.
        actual: usize,
    },

    /// Left and right blocks differ in length
    #[error("block length mismatch: left has {left} samples, right has {right}")]
    BlockLengthMismatch {
        /// Length of the left block.
        left: usize,
        /// Length of the right block.
        right: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = EngineError::UnsupportedSampleRate(4000.0);
        assert!(err.to_string().contains("4000"));

        let err = EngineError::ChannelMismatch {
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "engine configured for 2 channel(s), called with 1"
        );
    }
}
