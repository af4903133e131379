//! Zero-lookahead ceiling enforcement after downsampling.
//!
//! Reconstruction filters ring: a block clipped flat at the high rate can
//! come back from the decimator slightly above the ceiling. When enabled,
//! [`PostLimiter`] clamps the host-rate signal so the sample peak never
//! exceeds the ceiling. When disabled it is a pass-through and the overshoot
//! is whatever the active filter family produces.

use crate::Effect;

/// Hard clamp to `[-ceiling, ceiling]`, switchable.
///
/// ```rust
/// use guillotine_core::{Effect, PostLimiter};
///
/// let mut limiter = PostLimiter::new(0.5);
/// limiter.set_enabled(true);
/// assert_eq!(limiter.process(0.52), 0.5);
///
/// limiter.set_enabled(false);
/// assert_eq!(limiter.process(0.52), 0.52);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostLimiter {
    ceiling: f32,
    enabled: bool,
}

impl PostLimiter {
    /// Disabled limiter with the given linear ceiling.
    pub fn new(ceiling: f32) -> Self {
        Self {
            ceiling: ceiling.max(0.0),
            enabled: false,
        }
    }

    /// Set the linear ceiling.
    pub fn set_ceiling(&mut self, ceiling: f32) {
        self.ceiling = if ceiling > 0.0 { ceiling } else { 0.0 };
    }

    /// Enable or disable the clamp.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the clamp is active.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Effect for PostLimiter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        if self.enabled {
            input.clamp(-self.ceiling, self.ceiling)
        } else {
            input
        }
    }

    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        if !self.enabled {
            return;
        }
        let c = self.ceiling;
        for sample in buffer.iter_mut() {
            *sample = sample.clamp(-c, c);
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}
