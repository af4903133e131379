//! Host-facing engine configuration.

use guillotine_core::DEFAULT_SMOOTHING_MS;

use crate::EngineError;

/// Lowest supported sample rate in Hz.
pub const MIN_SAMPLE_RATE: f32 = 8_000.0;

/// Highest supported sample rate in Hz.
pub const MAX_SAMPLE_RATE: f32 = 768_000.0;

/// Everything [`ClipperEngine::configure`](crate::ClipperEngine::configure)
/// allocates for: rate, block size, channel count and gain glide time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Host sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block the host will pass. Longer blocks are split.
    pub max_block_size: usize,
    /// 1 (mono) or 2 (stereo).
    pub channels: usize,
    /// Input/output gain glide in milliseconds. `0.0` disables smoothing.
    pub smoothing_ms: f32,
}

impl EngineConfig {
    /// Stereo configuration at the given rate and block size.
    pub fn stereo(sample_rate: f32, max_block_size: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            channels: 2,
            ..Self::default()
        }
    }

    /// Mono configuration at the given rate and block size.
    pub fn mono(sample_rate: f32, max_block_size: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            channels: 1,
            ..Self::default()
        }
    }

    /// Builder-style glide time.
    pub fn with_smoothing_ms(mut self, smoothing_ms: f32) -> Self {
        self.smoothing_ms = smoothing_ms;
        self
    }

    /// Check the fields that cannot be clamped into something usable.
    pub fn validate(&self) -> Result<(), EngineError> {
        let sr = self.sample_rate;
        if !sr.is_finite() || !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&sr) {
            return Err(EngineError::UnsupportedSampleRate(sr));
        }
        if self.max_block_size == 0 {
            return Err(EngineError::InvalidBlockSize(self.max_block_size));
        }
        if !matches!(self.channels, 1 | 2) {
            return Err(EngineError::UnsupportedChannelCount(self.channels));
        }
        Ok(())
    }

    /// Glide time with NaN/Inf and negatives mapped to something usable.
    pub(crate) fn effective_smoothing_ms(&self) -> f32 {
        if self.smoothing_ms.is_finite() {
            self.smoothing_ms.max(0.0)
        } else {
            DEFAULT_SMOOTHING_MS
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_block_size: 512,
            channels: 2,
            smoothing_ms: DEFAULT_SMOOTHING_MS,
        }
    }
}
