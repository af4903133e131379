//! Wet/dry clip paths and the removed-signal monitor.
//!
//! [`DeltaEngine`] runs everything between mid/side encode and output gain:
//! the wet path (up, clip, down), decode, the post limiter and a dry path
//! that resamples the same input without clipping. With delta on, the output
//! is `dry - wet`, the exact signal the clipper took away. Both paths share
//! one filter design and see every block, so their latency and filter memory
//! match and the subtraction is sample-aligned from the first block after
//! delta is switched on.

use std::sync::Arc;

use guillotine_core::{
    ChannelMode, Clipper, Effect, FilterType, OversamplerDesign, OversamplingFactor, PostLimiter,
    mid_side,
};

use crate::chain::{ClipPath, PathRole};

/// Copies of the encoded input for the dry path.
#[derive(Debug, Clone)]
struct DryBuffers {
    left: Vec<f32>,
    right: Vec<f32>,
}

/// Two synchronized clip paths and the delta subtraction.
#[derive(Debug, Clone)]
pub struct DeltaEngine {
    wet: ClipPath,
    dry: ClipPath,
    buffers: DryBuffers,
    active: bool,
}

impl DeltaEngine {
    /// Allocate both paths and the dry copy buffers.
    pub fn new(design: Arc<OversamplerDesign>, channels: usize, max_block_size: usize) -> Self {
        Self {
            wet: ClipPath::new(design.clone(), channels, max_block_size, PathRole::Wet),
            dry: ClipPath::new(design, channels, max_block_size, PathRole::Dry),
            buffers: DryBuffers {
                left: vec![0.0; max_block_size],
                right: vec![0.0; max_block_size],
            },
            active: false,
        }
    }

    /// Select factor and filter on both paths. Clears all filter memory.
    pub fn set_mode(&mut self, factor: OversamplingFactor, filter: FilterType) {
        self.wet.set_mode(factor, filter);
        self.dry.set_mode(factor, filter);
    }

    /// Turn delta monitoring on or off.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether the output is the removed signal.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Host-rate latency, identical for both paths.
    pub fn latency_samples(&self) -> usize {
        self.wet.latency_samples()
    }

    /// Clear both paths.
    pub fn reset(&mut self) {
        self.wet.reset();
        self.dry.reset();
    }

    /// Clip a mono block in place; with delta on, replace it by `dry - wet`.
    ///
    /// Blocks must not exceed the size given at construction.
    pub fn process_mono(&mut self, clipper: &Clipper, limiter: &mut PostLimiter, block: &mut [f32]) {
        let dry = &mut self.buffers.left[..block.len()];
        dry.copy_from_slice(block);
        self.dry.process_mono(clipper, dry);

        self.wet.process_mono(clipper, block);
        limiter.process_block_inplace(block);

        if self.active {
            subtract_from(dry, block);
        }
    }

    /// Stereo counterpart of [`process_mono`](Self::process_mono).
    ///
    /// `left`/`right` arrive encoded per `mode` and leave decoded to L/R.
    pub fn process_stereo(
        &mut self,
        clipper: &Clipper,
        limiter: &mut PostLimiter,
        mode: ChannelMode,
        linked: bool,
        left: &mut [f32],
        right: &mut [f32],
    ) {
        let n = left.len();
        let dry_l = &mut self.buffers.left[..n];
        let dry_r = &mut self.buffers.right[..n];
        dry_l.copy_from_slice(left);
        dry_r.copy_from_slice(right);
        self.dry.process_stereo(clipper, linked, dry_l, dry_r);

        self.wet.process_stereo(clipper, linked, left, right);
        mid_side::decode_block(mode, left, right);
        limiter.process_block_inplace(left);
        limiter.process_block_inplace(right);

        if self.active {
            mid_side::decode_block(mode, dry_l, dry_r);
            subtract_from(dry_l, left);
            subtract_from(dry_r, right);
        }
    }
}

/// `out = dry - out`
#[inline]
fn subtract_from(dry: &[f32], out: &mut [f32]) {
    for (o, &d) in out.iter_mut().zip(dry) {
        *o = d - *o;
    }
}
