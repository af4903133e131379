//! Per-sample processor trait shared by the mono stages of the clip path.
//!
//! Gain staging, the clipper curve and the post limiter are all memoryless or
//! nearly so, and all of them run either at the base rate or at the
//! oversampled rate. [`Effect`] gives them one calling convention so the
//! block loops in the engine do not care which stage they drive.
//!
//! Multi-rate and multi-channel stages (the oversampler, mid/side encoding,
//! stereo-linked clipping) have their own block APIs and do not implement it.

/// Core trait for single-channel processors.
///
/// # Example
///
/// ```rust
/// use guillotine_core::Effect;
///
/// struct Invert;
///
/// impl Effect for Invert {
///     fn process(&mut self, input: f32) -> f32 {
///         -input
///     }
///
///     fn set_sample_rate(&mut self, _sample_rate: f32) {}
///
///     fn reset(&mut self) {}
/// }
///
/// let mut buf = [0.5, -0.25];
/// Invert.process_block_inplace(&mut buf);
/// assert_eq!(buf, [-0.5, 0.25]);
/// ```
pub trait Effect {
    /// Process a single sample.
    fn process(&mut self, input: f32) -> f32;

    /// Process a block of samples.
    ///
    /// Default implementation calls `process()` for each sample.
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(
            input.len(),
            output.len(),
            "Input and output buffers must have same length"
        );
        for (inp, out) in input.iter().zip(output.iter_mut()) {
            *out = self.process(*inp);
        }
    }

    /// Process a block of samples in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Update the sample rate the processor runs at.
    ///
    /// Stages placed inside the oversampler receive the oversampled rate.
    fn set_sample_rate(&mut self, sample_rate: f32);

    /// Clear internal state without changing parameters.
    fn reset(&mut self);

    /// Processing latency in samples. Default: 0.
    fn latency_samples(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Gain(f32);

    impl Effect for Gain {
        fn process(&mut self, input: f32) -> f32 {
            input * self.0
        }
        fn set_sample_rate(&mut self, _: f32) {}
        fn reset(&mut self) {}
    }

    #[test]
    fn default_block_matches_per_sample() {
        let mut effect = Gain(2.0);
        let input = [1.0, -2.0, 0.5];
        let mut output = [0.0; 3];
        effect.process_block(&input, &mut output);
        assert_eq!(output, [2.0, -4.0, 1.0]);
        assert_eq!(effect.latency_samples(), 0);
    }

    #[test]
    fn trait_object_inplace() {
        let mut gain = Gain(0.5);
        let effect: &mut dyn Effect = &mut gain;
        let mut buf = [1.0, 2.0];
        effect.process_block_inplace(&mut buf);
        assert_eq!(buf, [0.5, 1.0]);
    }
}
