//! One oversampled clip path: upsample, optionally clip, downsample.
//!
//! The engine runs two of these side by side when delta monitoring is on.
//! Both are built from the same shared [`OversamplerDesign`] so their
//! latency is identical; each owns its own filter memory.

use std::sync::Arc;

use guillotine_core::{Clipper, FilterType, Oversampler, OversamplerDesign, OversamplingFactor};

/// What a [`ClipPath`] does at the oversampled rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    /// Clip at the high rate.
    Wet,
    /// Resample only, for a latency- and phase-matched reference.
    Dry,
}

/// Oversampler plus the clipping step between its two halves.
#[derive(Debug, Clone)]
pub struct ClipPath {
    oversampler: Oversampler,
    role: PathRole,
}

impl ClipPath {
    /// Allocate a path for `channels` channels of up to `max_block_size` frames.
    pub fn new(
        design: Arc<OversamplerDesign>,
        channels: usize,
        max_block_size: usize,
        role: PathRole,
    ) -> Self {
        Self {
            oversampler: Oversampler::new(design, channels, max_block_size),
            role,
        }
    }

    /// Select factor and filter family. Clears filter memory.
    pub fn set_mode(&mut self, factor: OversamplingFactor, filter: FilterType) {
        self.oversampler.set_mode(factor, filter);
    }

    /// Host-rate latency of the path.
    pub fn latency_samples(&self) -> usize {
        self.oversampler.latency_samples()
    }

    /// Clear filter memory.
    pub fn reset(&mut self) {
        self.oversampler.reset();
    }

    /// Process a mono block in place.
    pub fn process_mono(&mut self, clipper: &Clipper, block: &mut [f32]) {
        self.oversampler.upsample(0, block);
        if self.role == PathRole::Wet {
            clipper.process_unlinked(self.oversampler.oversampled_mut(0));
        }
        self.oversampler.downsample(0, block);
    }

    /// Process a stereo block in place.
    ///
    /// With `linked` set, both channels share one clipping decision per
    /// oversampled frame.
    pub fn process_stereo(
        &mut self,
        clipper: &Clipper,
        linked: bool,
        left: &mut [f32],
        right: &mut [f32],
    ) {
        self.oversampler.upsample(0, left);
        self.oversampler.upsample(1, right);

        if self.role == PathRole::Wet {
            match self.oversampler.oversampled_pair_mut() {
                Some((l, r)) if linked => clipper.process_linked(l, r),
                Some((l, r)) => {
                    clipper.process_unlinked(l);
                    clipper.process_unlinked(r);
                }
                None => clipper.process_unlinked(self.oversampler.oversampled_mut(0)),
            }
        }

        self.oversampler.downsample(0, left);
        self.oversampler.downsample(1, right);
    }
}
