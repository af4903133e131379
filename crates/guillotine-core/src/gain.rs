//! Input and output gain staging.
//!
//! [`GainStage`] works in linear gain internally (for multiplication in the
//! audio path) and exposes a dB interface for parameter set. The range is
//! [`GAIN_MIN_DB`] to [`GAIN_MAX_DB`], clamped on set.
//!
//! ```rust
//! use guillotine_core::{Effect, GainStage};
//!
//! let mut gain = GainStage::new(48000.0);
//! gain.set_gain_db(-6.0);
//! gain.snap();
//! assert!((gain.process(1.0) - 0.501).abs() < 0.001);
//! ```

use crate::{Effect, ParamDescriptor, SmoothedParam, db_to_linear, linear_to_db};

/// Minimum gain in dB.
pub const GAIN_MIN_DB: f32 = -24.0;

/// Maximum gain in dB.
pub const GAIN_MAX_DB: f32 = 24.0;

/// `y = x * 10^(gain_db / 20)` with a smoothed linear gain.
///
/// At 0 dB the linear gain is exactly `1.0`, so a settled unity stage is a
/// bit-exact identity.
#[derive(Debug, Clone)]
pub struct GainStage {
    gain: SmoothedParam,
}

impl GainStage {
    /// Unity gain with the default 10 ms glide.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            gain: SmoothedParam::standard(1.0, sample_rate),
        }
    }

    /// Set the glide time in milliseconds. `0.0` disables smoothing.
    pub fn set_smoothing_time_ms(&mut self, time_ms: f32) {
        self.gain.set_smoothing_time_ms(time_ms);
    }

    /// Glide toward a new gain, clamped to [`GAIN_MIN_DB`]..=[`GAIN_MAX_DB`].
    #[inline]
    pub fn set_gain_db(&mut self, db: f32) {
        self.gain.set_target(db_to_linear(clamp_db(db)));
    }

    /// Target gain in dB.
    pub fn gain_db(&self) -> f32 {
        linear_to_db(self.gain.target())
    }

    /// Finish any glide in progress.
    pub fn snap(&mut self) {
        self.gain.snap_to_target();
    }

    /// Apply one gain value per frame to a stereo pair.
    pub fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let g = self.gain.advance();
            *l *= g;
            *r *= g;
        }
    }
}

impl Effect for GainStage {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        input * self.gain.advance()
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.gain.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.gain.snap_to_target();
    }
}

/// Descriptor for the input gain parameter.
pub fn input_param_descriptor() -> ParamDescriptor {
    ParamDescriptor::gain_db("Input Gain", "Input", GAIN_MIN_DB, GAIN_MAX_DB, 0.0)
}

/// Descriptor for the output gain parameter.
pub fn output_param_descriptor() -> ParamDescriptor {
    ParamDescriptor::gain_db("Output Gain", "Output", GAIN_MIN_DB, GAIN_MAX_DB, 0.0)
}

#[inline]
fn clamp_db(db: f32) -> f32 {
    if db.is_nan() {
        0.0
    } else {
        db.clamp(GAIN_MIN_DB, GAIN_MAX_DB)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_is_bit_exact() {
        let mut gain = GainStage::new(48000.0);
        for &x in &[0.123_456_7_f32, -0.999, 1e-20, 3.0] {
            assert_eq!(gain.process(x).to_bits(), x.to_bits());
        }
    }

    #[test]
    fn gain_db_clamping() {
        let mut gain = GainStage::new(48000.0);

        gain.set_gain_db(-50.0);
        assert!(
            (gain.gain_db() - GAIN_MIN_DB).abs() < 0.01,
            "Should clamp to min, got {}",
            gain.gain_db()
        );

        gain.set_gain_db(50.0);
        assert!((gain.gain_db() - GAIN_MAX_DB).abs() < 0.01, "Should clamp to max");

        gain.set_gain_db(f32::NAN);
        assert!(gain.gain_db().abs() < 0.01, "NaN should fall back to 0 dB");
    }

    #[test]
    fn glide_reaches_target() {
        let mut gain = GainStage::new(48000.0);
        gain.set_gain_db(-6.0);

        let first = gain.process(1.0);
        assert!(first > 0.9, "Glide should start near unity, got {first}");

        for _ in 0..4800 {
            gain.process(1.0);
        }
        let settled = gain.process(1.0);
        assert!(
            (settled - db_to_linear(-6.0)).abs() < 1e-3,
            "Expected ~0.501 after 100ms, got {settled}"
        );
    }

    #[test]
    fn stereo_shares_gain_per_frame() {
        let mut gain = GainStage::new(48000.0);
        gain.set_gain_db(6.0);
        let mut left = [1.0; 64];
        let mut right = [0.5; 64];
        gain.process_stereo(&mut left, &mut right);
        for (l, r) in left.iter().zip(right.iter()) {
            assert!((l - 2.0 * r).abs() < 1e-6);
        }
    }

    #[test]
    fn descriptors_cover_gain_range() {
        let desc = output_param_descriptor();
        assert_eq!(desc.min, GAIN_MIN_DB);
        assert_eq!(desc.max, GAIN_MAX_DB);
        assert_eq!(desc.unit, crate::ParamUnit::Decibels);
        assert_eq!(input_param_descriptor().default, 0.0);
    }
}
