//! Property-based tests for the engine block contract.
//!
//! Randomizes parameters and signals with proptest and checks the ceiling
//! bound, the delta identity, chunking invariance and finiteness.

use std::sync::{Arc, OnceLock};

use guillotine_core::{
    ChannelMode, FilterType, OversamplerDesign, OversamplingFactor, db_to_linear,
};
use guillotine_engine::{ClipperEngine, ClipperParams, EngineConfig};
use proptest::prelude::*;

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK: usize = 64;

fn design() -> Arc<OversamplerDesign> {
    static DESIGN: OnceLock<Arc<OversamplerDesign>> = OnceLock::new();
    DESIGN
        .get_or_init(|| Arc::new(OversamplerDesign::new()))
        .clone()
}

fn engine(config: EngineConfig, params: ClipperParams) -> ClipperEngine {
    let mut engine = ClipperEngine::with_design(design());
    engine.configure(config, params).expect("valid config");
    engine
}

prop_compose! {
    fn any_params()(
        ceiling_db in -60.0f32..12.0,
        sharpness in 0.0f32..=1.0,
        factor in 0usize..6,
        linear in any::<bool>(),
        stereo_link in any::<bool>(),
        mid_side in any::<bool>(),
        input_gain_db in -24.0f32..24.0,
    ) -> ClipperParams {
        ClipperParams {
            ceiling_db,
            sharpness,
            oversampling: OversamplingFactor::from_index(factor),
            filter: FilterType::from_index(usize::from(linear)),
            stereo_link,
            channel_mode: if mid_side { ChannelMode::MidSide } else { ChannelMode::LeftRight },
            input_gain_db,
            ..ClipperParams::default()
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// With enforce-ceiling on and unity output gain, no output sample
    /// exceeds the ceiling in any mode.
    #[test]
    fn enforced_output_never_exceeds_ceiling(
        params in any_params(),
        left in prop::collection::vec(-4.0f32..4.0, 1..300),
    ) {
        let params = ClipperParams { enforce_ceiling: true, ..params };
        let mut engine = engine(EngineConfig::stereo(SAMPLE_RATE, BLOCK), params);
        let mut l = left.clone();
        let mut r: Vec<f32> = left.iter().map(|x| -0.5 * x).collect();
        engine.process_stereo(&mut l, &mut r).expect("stereo block");

        let ceiling = db_to_linear(params.ceiling_db);
        for &y in l.iter().chain(&r) {
            prop_assert!(y.abs() <= ceiling, "{} > {}", y, ceiling);
        }
    }

    /// At 1× the hard clip bounds the output even without the post limiter.
    #[test]
    fn unity_hard_clip_bounded(
        ceiling_db in -60.0f32..12.0,
        input in prop::collection::vec(-8.0f32..8.0, 1..300),
    ) {
        let params = ClipperParams { ceiling_db, ..ClipperParams::default() };
        let mut engine = engine(EngineConfig::mono(SAMPLE_RATE, BLOCK), params);
        let mut block = input.clone();
        engine.process_mono(&mut block).expect("mono block");

        let ceiling = db_to_linear(ceiling_db);
        for (&x, &y) in input.iter().zip(&block) {
            prop_assert!((y - x.clamp(-ceiling, ceiling)).abs() <= 1e-6);
        }
    }

    /// At 1×, clipped output plus delta reproduces the gain-staged input.
    #[test]
    fn wet_plus_delta_is_dry(
        ceiling_db in -30.0f32..6.0,
        sharpness in 0.0f32..=1.0,
        input in prop::collection::vec(-4.0f32..4.0, 1..300),
    ) {
        let params = ClipperParams { ceiling_db, sharpness, ..ClipperParams::default() };
        let mut wet_engine = engine(EngineConfig::mono(SAMPLE_RATE, BLOCK), params);
        let mut delta_engine = engine(
            EngineConfig::mono(SAMPLE_RATE, BLOCK),
            ClipperParams { delta_monitor: true, ..params },
        );

        let mut wet = input.clone();
        let mut delta = input.clone();
        wet_engine.process_mono(&mut wet).expect("mono block");
        delta_engine.process_mono(&mut delta).expect("mono block");

        for ((w, d), x) in wet.iter().zip(&delta).zip(&input) {
            prop_assert!((w + d - x).abs() <= 1e-5 * (1.0 + x.abs()));
        }
    }

    /// Splitting a signal into arbitrary chunks does not change the result.
    #[test]
    fn chunking_invariance(
        params in any_params(),
        input in prop::collection::vec(-2.0f32..2.0, 1..400),
        chunk in 1usize..100,
    ) {
        let config = EngineConfig::stereo(SAMPLE_RATE, 512);
        let mut whole = engine(config, params);
        let mut split = engine(config, params);

        let (mut l1, mut r1) = (input.clone(), input.iter().rev().copied().collect::<Vec<_>>());
        let (mut l2, mut r2) = (l1.clone(), r1.clone());
        whole.process_stereo(&mut l1, &mut r1).expect("stereo block");
        for (lc, rc) in l2.chunks_mut(chunk).zip(r2.chunks_mut(chunk)) {
            split.process_stereo(lc, rc).expect("stereo block");
        }

        for (a, b) in l1.iter().chain(&r1).zip(l2.iter().chain(&r2)) {
            prop_assert!((a - b).abs() <= 1e-6);
        }
    }

    /// Arbitrary bit patterns in, finite samples out.
    #[test]
    fn any_bits_yield_finite_output(
        params in any_params(),
        bits in prop::collection::vec(any::<u32>(), 1..200),
        delta_monitor in any::<bool>(),
    ) {
        let params = ClipperParams { delta_monitor, ..params };
        let mut engine = engine(EngineConfig::mono(SAMPLE_RATE, BLOCK), params);
        let mut block: Vec<f32> = bits.into_iter().map(f32::from_bits).collect();
        engine.process_mono(&mut block).expect("mono block");
        for &y in &block {
            prop_assert!(y.is_finite());
        }
    }
}
