//! Multi-stage polyphase oversampling with two filter families.
//!
//! The clipper runs at up to 32× the host rate so the harmonics it generates
//! stay below Nyquist and intersample peaks are caught. Each factor is a
//! cascade of 2× half-band stages (see [`crate::halfband`]):
//!
//! ```text
//! upsample:   x ─► [2× stage 0] ─► [2× stage 1] ─► ... ─► high-rate buffer
//! downsample: high-rate buffer ─► [stage S-1] ─► ... ─► [stage 0] ─► y
//! ```
//!
//! | Stage | FIR taps | IIR coefs / transition |
//! |-------|----------|------------------------|
//! | 0     | 63       | 12 / 0.04              |
//! | 1     | 31       | 8 / 0.10               |
//! | 2–4   | 19       | 6 / 0.20               |
//!
//! The first stage carries the steepest filter because its transition band
//! sits right at the host Nyquist; later stages only have to reject images
//! far above the audio band.
//!
//! ## Sharing and ownership
//!
//! [`OversamplerDesign`] holds every stage's coefficients for both families
//! and is immutable. Wrap it in an `Arc` and hand it to as many
//! [`Oversampler`]s as needed. Each `Oversampler` owns all of its filter
//! memory and work buffers, so two instances fed the same input (the wet and
//! dry paths of delta monitoring) never observe each other's state.
//!
//! ## Latency
//!
//! - [`FilterType::LinearPhase`]: exact. The per-stage FIR delays are summed at
//!   the top rate and a compensation delay pads the total up to a whole number
//!   of host-rate samples.
//! - [`FilterType::MinimumPhase`]: the DC group delay of the allpass cascades,
//!   rounded to the nearest host-rate sample.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::Effect;
use crate::delay::SampleDelay;
use crate::halfband::{
    FirDownsampler, FirHalfband, FirUpsampler, IirDownsampler, IirHalfband, IirUpsampler,
};
use crate::sanitize::sanitize;

/// Number of 2× stages needed for the largest factor.
pub const MAX_STAGES: usize = 5;

/// Largest supported oversampling ratio.
pub const MAX_FACTOR: usize = 1 << MAX_STAGES;

/// Design stopband attenuation for the FIR stages, in dB.
pub const FIR_ATTENUATION_DB: f64 = 90.0;

/// FIR half-orders per stage (`taps = 4 * m + 3`).
const FIR_HALF_ORDERS: [usize; MAX_STAGES] = [15, 7, 4, 4, 4];

/// IIR (coefficient count, transition bandwidth) per stage.
const IIR_SPECS: [(usize, f64); MAX_STAGES] =
    [(12, 0.04), (8, 0.1), (6, 0.2), (6, 0.2), (6, 0.2)];

/// Oversampling ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OversamplingFactor {
    /// No oversampling.
    #[default]
    X1,
    /// 2×
    X2,
    /// 4×
    X4,
    /// 8×
    X8,
    /// 16×
    X16,
    /// 32×
    X32,
}

impl OversamplingFactor {
    /// All factors in ascending order.
    pub const ALL: [Self; 6] = [Self::X1, Self::X2, Self::X4, Self::X8, Self::X16, Self::X32];

    /// Factor for a choice index (0 = 1× … 5 = 32×); out-of-range clamps to 32×.
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(MAX_STAGES)]
    }

    /// Choice index, equal to the number of 2× stages.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Number of cascaded 2× stages.
    pub fn stages(self) -> usize {
        self.index()
    }

    /// Rate multiplier (1, 2, 4, 8, 16 or 32).
    pub fn ratio(self) -> usize {
        1 << self.stages()
    }
}

/// Anti-aliasing filter family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterType {
    /// Polyphase allpass IIR. Low latency, phase shift near Nyquist.
    #[default]
    MinimumPhase,
    /// Symmetric FIR. Higher latency, no phase distortion.
    LinearPhase,
}

impl FilterType {
    /// Filter type for a choice index (0 = minimum, 1 = linear); out-of-range clamps.
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            Self::MinimumPhase
        } else {
            Self::LinearPhase
        }
    }

    /// Choice index.
    pub fn index(self) -> usize {
        match self {
            Self::MinimumPhase => 0,
            Self::LinearPhase => 1,
        }
    }
}

/// Immutable coefficient set for every stage of both filter families.
#[derive(Debug, Clone)]
pub struct OversamplerDesign {
    fir: Vec<FirHalfband>,
    iir: Vec<IirHalfband>,
    /// Host-rate latency per factor index.
    minimum_phase_latency: [usize; MAX_STAGES + 1],
    linear_phase_latency: [usize; MAX_STAGES + 1],
    /// Top-rate padding that makes the linear-phase latency a whole number.
    linear_phase_compensation: [usize; MAX_STAGES + 1],
}

impl OversamplerDesign {
    /// Design all stages.
    pub fn new() -> Self {
        let fir: Vec<FirHalfband> = FIR_HALF_ORDERS
            .iter()
            .map(|&m| FirHalfband::design(m, FIR_ATTENUATION_DB))
            .collect();
        let iir: Vec<IirHalfband> = IIR_SPECS
            .iter()
            .map(|&(n, tbw)| IirHalfband::design(n, tbw))
            .collect();

        let mut minimum_phase_latency = [0; MAX_STAGES + 1];
        let mut linear_phase_latency = [0; MAX_STAGES + 1];
        let mut linear_phase_compensation = [0; MAX_STAGES + 1];

        for stages in 1..=MAX_STAGES {
            // Stage k runs its high side at 2^(k+1) times the host rate; one
            // high-side sample of stage k is 2^(stages-k-1) top-rate samples.
            let top_rate_delay: usize = (0..stages)
                .map(|k| 2 * fir[k].group_delay() * (1 << (stages - k - 1)))
                .sum();
            let ratio = 1 << stages;
            let latency = top_rate_delay.div_ceil(ratio);
            linear_phase_latency[stages] = latency;
            linear_phase_compensation[stages] = latency * ratio - top_rate_delay;

            let host_rate_delay: f64 = (0..stages)
                .map(|k| 2.0 * iir[k].group_delay() / f64::from(1_u32 << (k + 1)))
                .sum();
            minimum_phase_latency[stages] = libm::round(host_rate_delay) as usize;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            ?minimum_phase_latency,
            ?linear_phase_latency,
            "designed oversampler stages"
        );

        Self {
            fir,
            iir,
            minimum_phase_latency,
            linear_phase_latency,
            linear_phase_compensation,
        }
    }

    /// Host-rate latency of an up/down round trip.
    pub fn latency(&self, factor: OversamplingFactor, filter: FilterType) -> usize {
        match filter {
            FilterType::MinimumPhase => self.minimum_phase_latency[factor.index()],
            FilterType::LinearPhase => self.linear_phase_latency[factor.index()],
        }
    }

    /// Top-rate compensation delay applied before linear-phase decimation.
    pub fn compensation(&self, factor: OversamplingFactor, filter: FilterType) -> usize {
        match filter {
            FilterType::MinimumPhase => 0,
            FilterType::LinearPhase => self.linear_phase_compensation[factor.index()],
        }
    }
}

impl Default for OversamplerDesign {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-channel filter memory and work buffers.
#[derive(Debug, Clone)]
struct ChannelState {
    fir_up: Vec<FirUpsampler>,
    fir_down: Vec<FirDownsampler>,
    iir_up: Vec<IirUpsampler>,
    iir_down: Vec<IirDownsampler>,
    compensation: SampleDelay,
    /// Holds the current high-rate signal.
    buffer: Vec<f32>,
    /// Ping-pong target for stage processing.
    scratch: Vec<f32>,
    /// Valid high-rate samples in `buffer`.
    len: usize,
}

impl ChannelState {
    fn new(design: &OversamplerDesign, max_block_size: usize) -> Self {
        Self {
            fir_up: design.fir.iter().map(FirUpsampler::new).collect(),
            fir_down: design.fir.iter().map(FirDownsampler::new).collect(),
            iir_up: design.iir.iter().map(IirUpsampler::new).collect(),
            iir_down: design.iir.iter().map(IirDownsampler::new).collect(),
            compensation: SampleDelay::new(MAX_FACTOR),
            buffer: vec![0.0; max_block_size * MAX_FACTOR],
            scratch: vec![0.0; max_block_size * MAX_FACTOR],
            len: 0,
        }
    }

    fn reset(&mut self) {
        self.fir_up.iter_mut().for_each(FirUpsampler::reset);
        self.fir_down.iter_mut().for_each(FirDownsampler::reset);
        self.iir_up.iter_mut().for_each(IirUpsampler::reset);
        self.iir_down.iter_mut().for_each(IirDownsampler::reset);
        self.compensation.clear();
    }

    fn upsample(
        &mut self,
        design: &OversamplerDesign,
        factor: OversamplingFactor,
        filter: FilterType,
        input: &[f32],
    ) -> usize {
        let mut n = input.len();
        self.buffer[..n].copy_from_slice(input);

        for stage in 0..factor.stages() {
            let src = &self.buffer[..n];
            let dst = &mut self.scratch[..2 * n];
            match filter {
                FilterType::LinearPhase => {
                    let (fir, state) = (&design.fir[stage], &mut self.fir_up[stage]);
                    for (x, out) in src.iter().zip(dst.chunks_exact_mut(2)) {
                        (out[0], out[1]) = state.process(fir, *x);
                    }
                }
                FilterType::MinimumPhase => {
                    let (iir, state) = (&design.iir[stage], &mut self.iir_up[stage]);
                    for (x, out) in src.iter().zip(dst.chunks_exact_mut(2)) {
                        (out[0], out[1]) = state.process(iir, *x);
                    }
                }
            }
            core::mem::swap(&mut self.buffer, &mut self.scratch);
            n *= 2;
        }

        self.len = n;
        if sanitize(&mut self.buffer[..n]) > 0 {
            self.reset();
        }
        n
    }

    fn downsample(
        &mut self,
        design: &OversamplerDesign,
        factor: OversamplingFactor,
        filter: FilterType,
        output: &mut [f32],
    ) {
        let stages = factor.stages();
        let mut n = output.len() << stages;

        if filter == FilterType::LinearPhase && self.compensation.delay() > 0 {
            self.compensation.process_block_inplace(&mut self.buffer[..n]);
        }

        for stage in (0..stages).rev() {
            let src = &self.buffer[..n];
            let dst = &mut self.scratch[..n / 2];
            match filter {
                FilterType::LinearPhase => {
                    let (fir, state) = (&design.fir[stage], &mut self.fir_down[stage]);
                    for (pair, out) in src.chunks_exact(2).zip(dst.iter_mut()) {
                        *out = state.process(fir, pair[0], pair[1]);
                    }
                }
                FilterType::MinimumPhase => {
                    let (iir, state) = (&design.iir[stage], &mut self.iir_down[stage]);
                    for (pair, out) in src.chunks_exact(2).zip(dst.iter_mut()) {
                        *out = state.process(iir, pair[0], pair[1]);
                    }
                }
            }
            core::mem::swap(&mut self.buffer, &mut self.scratch);
            n /= 2;
        }

        output.copy_from_slice(&self.buffer[..n]);
        if sanitize(output) > 0 {
            self.reset();
        }
    }
}

/// Block-based up/down resampler for one or two channels.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use guillotine_core::{FilterType, Oversampler, OversamplerDesign, OversamplingFactor};
///
/// let design = Arc::new(OversamplerDesign::new());
/// let mut os = Oversampler::new(design, 1, 256);
/// os.set_mode(OversamplingFactor::X4, FilterType::LinearPhase);
///
/// let input = [0.25_f32; 64];
/// let high_len = os.upsample(0, &input);
/// assert_eq!(high_len, 256);
///
/// for s in os.oversampled_mut(0) {
///     *s = s.clamp(-0.2, 0.2);
/// }
///
/// let mut output = [0.0_f32; 64];
/// os.downsample(0, &mut output);
/// assert!(os.latency_samples() > 0);
/// ```
#[derive(Debug, Clone)]
pub struct Oversampler {
    design: Arc<OversamplerDesign>,
    factor: OversamplingFactor,
    filter: FilterType,
    max_block_size: usize,
    channels: Vec<ChannelState>,
}

impl Oversampler {
    /// Allocate state and buffers for `channels` channels of up to
    /// `max_block_size` host-rate samples. Starts at 1×, minimum phase.
    pub fn new(design: Arc<OversamplerDesign>, channels: usize, max_block_size: usize) -> Self {
        let channels = (0..channels.max(1))
            .map(|_| ChannelState::new(&design, max_block_size))
            .collect();
        Self {
            design,
            factor: OversamplingFactor::X1,
            filter: FilterType::MinimumPhase,
            max_block_size,
            channels,
        }
    }

    /// Select factor and filter family, clearing all filter memory.
    ///
    /// Every stage is pre-built, so switching never allocates.
    pub fn set_mode(&mut self, factor: OversamplingFactor, filter: FilterType) {
        self.factor = factor;
        self.filter = filter;
        let compensation = self.design.compensation(factor, filter);
        for ch in &mut self.channels {
            ch.compensation.set_delay(compensation);
        }
        self.reset();
    }

    /// Current factor.
    pub fn factor(&self) -> OversamplingFactor {
        self.factor
    }

    /// Current filter family.
    pub fn filter(&self) -> FilterType {
        self.filter
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Largest host-rate block accepted by [`upsample`](Self::upsample).
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Shared coefficient set.
    pub fn design(&self) -> &Arc<OversamplerDesign> {
        &self.design
    }

    /// Host-rate latency of an up/down round trip in the current mode.
    pub fn latency_samples(&self) -> usize {
        self.design.latency(self.factor, self.filter)
    }

    /// Clear all filter memory.
    pub fn reset(&mut self) {
        for ch in &mut self.channels {
            ch.reset();
            ch.len = 0;
        }
    }

    /// Upsample one channel into its internal high-rate buffer.
    ///
    /// At most [`max_block_size`](Self::max_block_size) samples are consumed.
    /// Returns the number of high-rate samples produced. Non-finite filter
    /// output is zeroed and resets that channel's filter memory.
    pub fn upsample(&mut self, channel: usize, input: &[f32]) -> usize {
        let n = input.len().min(self.max_block_size);
        let design = &*self.design;
        self.channels[channel].upsample(design, self.factor, self.filter, &input[..n])
    }

    /// Mutable high-rate samples, for processing in place at the high rate.
    pub fn oversampled_mut(&mut self, channel: usize) -> &mut [f32] {
        let ch = &mut self.channels[channel];
        &mut ch.buffer[..ch.len]
    }

    /// Mutable high-rate buffers of channels 0 and 1, for stereo-linked
    /// processing. Returns `None` for a mono oversampler.
    pub fn oversampled_pair_mut(&mut self) -> Option<(&mut [f32], &mut [f32])> {
        match self.channels.as_mut_slice() {
            [left, right, ..] => Some((&mut left.buffer[..left.len], &mut right.buffer[..right.len])),
            _ => None,
        }
    }

    /// Downsample one channel's high-rate buffer into `output`.
    ///
    /// `output.len()` must match the block given to the preceding
    /// [`upsample`](Self::upsample) call for this channel.
    pub fn downsample(&mut self, channel: usize, output: &mut [f32]) {
        let n = output.len().min(self.channels[channel].len >> self.factor.stages());
        let design = &*self.design;
        self.channels[channel].downsample(design, self.factor, self.filter, &mut output[..n]);
    }
}
