//! Top-level clipper engine.
//!
//! [`ClipperEngine`] wires the core stages into the per-block chain:
//!
//! ```text
//! sanitize → input gain → M/S encode → sanitize
//!   → [wet: up → clip → down] + [dry: up → down]
//!   → M/S decode → post limiter → output gain → sanitize
//! ```
//!
//! Bypass outputs the sanitized input through a latency-matched delay while
//! the chain above keeps running on a scratch copy, so every path carries
//! warm filter memory when bypass or delta monitoring is switched.
//!
//! Everything is allocated in [`configure`](ClipperEngine::configure); the
//! process calls never allocate, lock or log. Blocks longer than the
//! configured maximum are split and processed in order, so chunking does not
//! change the result.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──configure──▶ Configured ──process──▶ Processing
//!                                  ▲                        │
//!                                  └── factor/filter change,┘
//!                                      reset
//! ```

use std::sync::Arc;

use guillotine_core::{
    Clipper, Effect, FilterType, GainStage, OversamplerDesign, OversamplingFactor, PostLimiter,
    SampleDelay, mid_side, sanitize,
};

use crate::{ClipperParams, DeltaEngine, EngineConfig, EngineError};

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// No buffers yet; process calls fail.
    Uninitialized,
    /// Buffers allocated, filter memory clear.
    Configured,
    /// At least one block processed since the last configure, reset or
    /// filter-chain change.
    Processing,
}

/// Per-configuration buffers and filter state.
#[derive(Debug, Clone)]
struct Runtime {
    config: EngineConfig,
    paths: DeltaEngine,
    /// One latency-matching line per channel for bypass.
    bypass: Vec<SampleDelay>,
    /// Chain input while bypassed.
    scratch: Scratch,
}

#[derive(Debug, Clone)]
struct Scratch {
    left: Vec<f32>,
    right: Vec<f32>,
}

/// Oversampled peak clipper.
///
/// ```rust
/// use guillotine_engine::{ClipperEngine, ClipperParams, EngineConfig};
///
/// let mut engine = ClipperEngine::new();
/// let params = ClipperParams { ceiling_db: -6.0, ..ClipperParams::default() };
/// engine.configure(EngineConfig::stereo(48000.0, 256), params).unwrap();
///
/// let mut left = vec![1.0_f32; 256];
/// let mut right = vec![-1.0_f32; 256];
/// engine.process_stereo(&mut left, &mut right).unwrap();
/// assert!((left[0] - 0.501).abs() < 1e-3);
/// assert!((right[0] + 0.501).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct ClipperEngine {
    design: Arc<OversamplerDesign>,
    state: EngineState,
    params: ClipperParams,
    input_gain: GainStage,
    output_gain: GainStage,
    clipper: Clipper,
    limiter: PostLimiter,
    runtime: Option<Runtime>,
    sanitized: u64,
}

impl ClipperEngine {
    /// Unconfigured engine with its own filter design.
    pub fn new() -> Self {
        Self::with_design(Arc::new(OversamplerDesign::new()))
    }

    /// Unconfigured engine sharing an existing filter design.
    ///
    /// The design is immutable, so any number of engines can share one.
    pub fn with_design(design: Arc<OversamplerDesign>) -> Self {
        let params = ClipperParams::default();
        let sample_rate = EngineConfig::default().sample_rate;
        Self {
            design,
            state: EngineState::Uninitialized,
            params,
            input_gain: GainStage::new(sample_rate),
            output_gain: GainStage::new(sample_rate),
            clipper: Clipper::default(),
            limiter: PostLimiter::new(1.0),
            runtime: None,
            sanitized: 0,
        }
    }

    /// Allocate everything for `config` and apply `params` without gliding.
    ///
    /// On error the engine keeps its previous configuration and state.
    pub fn configure(
        &mut self,
        config: EngineConfig,
        params: ClipperParams,
    ) -> Result<(), EngineError> {
        if let Err(err) = config.validate() {
            tracing::warn!("configure rejected: {err}");
            return Err(err);
        }

        let params = params.clamped();
        let max_latency = OversamplingFactor::ALL
            .iter()
            .flat_map(|&f| {
                [FilterType::MinimumPhase, FilterType::LinearPhase]
                    .map(|filter| self.design.latency(f, filter))
            })
            .max()
            .unwrap_or(0);

        let mut paths = DeltaEngine::new(
            self.design.clone(),
            config.channels,
            config.max_block_size,
        );
        paths.set_mode(params.oversampling, params.filter);

        let latency = self.design.latency(params.oversampling, params.filter);
        let bypass = (0..config.channels)
            .map(|_| {
                let mut line = SampleDelay::new(max_latency);
                line.set_delay(latency);
                line
            })
            .collect();

        let smoothing_ms = config.effective_smoothing_ms();
        for gain in [&mut self.input_gain, &mut self.output_gain] {
            *gain = GainStage::new(config.sample_rate);
            gain.set_smoothing_time_ms(smoothing_ms);
        }

        self.runtime = Some(Runtime {
            config,
            paths,
            bypass,
            scratch: Scratch {
                left: vec![0.0; config.max_block_size],
                right: vec![0.0; config.max_block_size],
            },
        });
        self.params = params;
        self.apply_params();
        self.input_gain.snap();
        self.output_gain.snap();
        self.sanitized = 0;
        self.state = EngineState::Configured;

        tracing::info!(
            "configure: {} Hz, {} ch, max block {}, {}x {:?}, latency {latency}",
            config.sample_rate,
            config.channels,
            config.max_block_size,
            params.oversampling.ratio(),
            params.filter,
        );
        Ok(())
    }

    /// Take a new parameter snapshot at the next block boundary.
    ///
    /// Values are clamped. Gains glide; everything else switches at once. A
    /// new oversampling factor or filter family clears all filter memory and
    /// returns the engine to [`EngineState::Configured`].
    pub fn set_params(&mut self, params: ClipperParams) {
        let params = params.clamped();
        if params == self.params {
            return;
        }
        let previous = self.params;
        self.params = params;
        self.apply_params();

        let Some(rt) = self.runtime.as_mut() else {
            return;
        };
        if previous.needs_rebuild(&params) {
            rt.paths.set_mode(params.oversampling, params.filter);
            let latency = rt.paths.latency_samples();
            for line in &mut rt.bypass {
                line.set_delay(latency);
                line.clear();
            }
            self.state = EngineState::Configured;
            tracing::debug!(
                "reconfigure: {}x {:?}, latency {latency}",
                params.oversampling.ratio(),
                params.filter
            );
        }
    }

    /// Current (clamped) parameters.
    pub fn params(&self) -> &ClipperParams {
        &self.params
    }

    /// Active configuration, `None` before the first successful configure.
    pub fn config(&self) -> Option<&EngineConfig> {
        self.runtime.as_ref().map(|rt| &rt.config)
    }

    /// Lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Shared filter design.
    pub fn design(&self) -> &Arc<OversamplerDesign> {
        &self.design
    }

    /// Host-rate latency of the current factor and filter. 0 at 1×.
    pub fn latency_samples(&self) -> usize {
        self.design.latency(self.params.oversampling, self.params.filter)
    }

    /// Non-finite samples replaced since the last configure.
    pub fn sanitized_samples(&self) -> u64 {
        self.sanitized
    }

    /// Clear all filter and delay memory and finish any gain glide.
    pub fn reset(&mut self) {
        let Some(rt) = self.runtime.as_mut() else {
            return;
        };
        rt.paths.reset();
        for line in &mut rt.bypass {
            line.clear();
        }
        self.input_gain.snap();
        self.output_gain.snap();
        self.state = EngineState::Configured;
        tracing::debug!("reset");
    }

    /// Process a mono block in place.
    pub fn process_mono(&mut self, block: &mut [f32]) -> Result<(), EngineError> {
        let max_block = self.check_channels(1)?;
        for chunk in block.chunks_mut(max_block) {
            self.process_mono_chunk(chunk);
        }
        self.state = EngineState::Processing;
        Ok(())
    }

    /// Process a stereo block in place.
    pub fn process_stereo(
        &mut self,
        left: &mut [f32],
        right: &mut [f32],
    ) -> Result<(), EngineError> {
        let max_block = self.check_channels(2)?;
        if left.len() != right.len() {
            return Err(EngineError::BlockLengthMismatch {
                left: left.len(),
                right: right.len(),
            });
        }
        for (l, r) in left.chunks_mut(max_block).zip(right.chunks_mut(max_block)) {
            self.process_stereo_chunk(l, r);
        }
        self.state = EngineState::Processing;
        Ok(())
    }

    /// Push the non-structural parameters into the stages.
    fn apply_params(&mut self) {
        let p = self.params;
        self.input_gain.set_gain_db(p.input_gain_db);
        self.output_gain.set_gain_db(p.output_gain_db);
        self.clipper.set_ceiling_db(p.ceiling_db);
        self.clipper.set_sharpness(p.sharpness);
        self.limiter.set_ceiling(self.clipper.ceiling());
        self.limiter.set_enabled(p.enforce_ceiling);
        if let Some(rt) = self.runtime.as_mut() {
            rt.paths.set_active(p.delta_monitor);
        }
    }

    /// Validate a process call and return the chunk size.
    fn check_channels(&self, actual: usize) -> Result<usize, EngineError> {
        let rt = self.runtime.as_ref().ok_or(EngineError::NotConfigured)?;
        if rt.config.channels != actual {
            return Err(EngineError::ChannelMismatch {
                expected: rt.config.channels,
                actual,
            });
        }
        Ok(rt.config.max_block_size)
    }

    fn process_mono_chunk(&mut self, block: &mut [f32]) {
        let Self {
            params,
            input_gain,
            output_gain,
            clipper,
            limiter,
            runtime,
            sanitized,
            ..
        } = self;
        let Some(Runtime {
            paths,
            bypass,
            scratch,
            ..
        }) = runtime.as_mut()
        else {
            return;
        };

        *sanitized += sanitize(block) as u64;
        let block = if params.bypass {
            let shadow = &mut scratch.left[..block.len()];
            shadow.copy_from_slice(block);
            bypass[0].process_block_inplace(block);
            shadow
        } else {
            record(&mut bypass[0], block);
            block
        };

        input_gain.process_block_inplace(block);
        *sanitized += sanitize(block) as u64;

        paths.process_mono(clipper, limiter, block);

        output_gain.process_block_inplace(block);
        *sanitized += sanitize(block) as u64;
    }

    fn process_stereo_chunk(&mut self, left: &mut [f32], right: &mut [f32]) {
        let Self {
            params,
            input_gain,
            output_gain,
            clipper,
            limiter,
            runtime,
            sanitized,
            ..
        } = self;
        let Some(Runtime {
            paths,
            bypass,
            scratch,
            ..
        }) = runtime.as_mut()
        else {
            return;
        };
        let [line_l, line_r, ..] = bypass.as_mut_slice() else {
            return;
        };

        *sanitized += (sanitize(left) + sanitize(right)) as u64;
        let (left, right) = if params.bypass {
            let n = left.len();
            let shadow_l = &mut scratch.left[..n];
            let shadow_r = &mut scratch.right[..n];
            shadow_l.copy_from_slice(left);
            shadow_r.copy_from_slice(right);
            line_l.process_block_inplace(left);
            line_r.process_block_inplace(right);
            (shadow_l, shadow_r)
        } else {
            record(line_l, left);
            record(line_r, right);
            (left, right)
        };

        input_gain.process_stereo(left, right);
        mid_side::encode_block(params.channel_mode, left, right);
        *sanitized += (sanitize(left) + sanitize(right)) as u64;

        paths.process_stereo(
            clipper,
            limiter,
            params.channel_mode,
            params.stereo_link,
            left,
            right,
        );

        output_gain.process_stereo(left, right);
        *sanitized += (sanitize(left) + sanitize(right)) as u64;
    }
}

impl Default for ClipperEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Feed the bypass line without using its output, so a later bypass
/// starts aligned.
#[inline]
fn record(line: &mut SampleDelay, block: &[f32]) {
    for &sample in block {
        line.process(sample);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(params: ClipperParams) -> ClipperEngine {
        let mut engine = ClipperEngine::new();
        engine
            .configure(EngineConfig::stereo(48000.0, 64), params)
            .expect("valid config");
        engine
    }

    #[test]
    fn process_before_configure_fails() {
        let mut engine = ClipperEngine::new();
        assert_eq!(engine.state(), EngineState::Uninitialized);
        assert!(engine.config().is_none());
        let mut block = [0.0_f32; 8];
        assert_eq!(
            engine.process_mono(&mut block),
            Err(EngineError::NotConfigured)
        );
    }

    #[test]
    fn state_transitions() {
        let mut engine = configured(ClipperParams::default());
        assert_eq!(engine.state(), EngineState::Configured);

        let (mut l, mut r) = ([0.1_f32; 16], [0.1_f32; 16]);
        engine.process_stereo(&mut l, &mut r).expect("stereo block");
        assert_eq!(engine.state(), EngineState::Processing);

        // Non-structural change keeps processing.
        engine.set_params(ClipperParams {
            ceiling_db: -3.0,
            ..*engine.params()
        });
        assert_eq!(engine.state(), EngineState::Processing);

        engine.set_params(ClipperParams {
            oversampling: OversamplingFactor::X4,
            ..*engine.params()
        });
        assert_eq!(engine.state(), EngineState::Configured);

        engine.process_stereo(&mut l, &mut r).expect("stereo block");
        engine.reset();
        assert_eq!(engine.state(), EngineState::Configured);
    }

    #[test]
    fn failed_configure_keeps_previous_setup() {
        let mut engine = configured(ClipperParams::default());
        let err = engine.configure(EngineConfig::stereo(1.0, 64), ClipperParams::default());
        assert_eq!(err, Err(EngineError::UnsupportedSampleRate(1.0)));
        assert_eq!(engine.state(), EngineState::Configured);
        assert_eq!(engine.config().map(|c| c.sample_rate), Some(48000.0));
    }

    #[test]
    fn contract_violations() {
        let mut engine = configured(ClipperParams::default());
        let mut mono = [0.0_f32; 4];
        assert_eq!(
            engine.process_mono(&mut mono),
            Err(EngineError::ChannelMismatch {
                expected: 2,
                actual: 1
            })
        );
        let (mut l, mut r) = ([0.0_f32; 4], [0.0_f32; 5]);
        assert_eq!(
            engine.process_stereo(&mut l, &mut r),
            Err(EngineError::BlockLengthMismatch { left: 4, right: 5 })
        );
    }

    #[test]
    fn latency_follows_params_before_and_after_configure() {
        let params = ClipperParams {
            oversampling: OversamplingFactor::X2,
            filter: FilterType::LinearPhase,
            ..ClipperParams::default()
        };
        let mut engine = ClipperEngine::new();
        engine.set_params(params);
        assert_eq!(engine.latency_samples(), 31);

        let engine = configured(params);
        assert_eq!(engine.latency_samples(), 31);
        let engine = configured(ClipperParams::default());
        assert_eq!(engine.latency_samples(), 0);
    }

    #[test]
    fn set_params_clamps() {
        let mut engine = configured(ClipperParams::default());
        engine.set_params(ClipperParams {
            ceiling_db: 99.0,
            output_gain_db: f32::NAN,
            ..ClipperParams::default()
        });
        assert_eq!(engine.params().ceiling_db, 12.0);
        assert_eq!(engine.params().output_gain_db, 0.0);
    }
}
