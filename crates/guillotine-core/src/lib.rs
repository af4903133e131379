//! Guillotine Core - DSP primitives for an oversampled peak clipper
//!
//! This crate provides the building blocks of the clip path, designed for
//! real-time processing with zero allocation once constructed.
//!
//! # Signal Path Building Blocks
//!
//! - [`sanitize()`] - Replace NaN/Inf samples with silence
//! - [`GainStage`] - Smoothed dB gain for input and output staging
//! - [`mid_side`] - Invertible left/right ↔ mid/side transform
//! - [`Oversampler`] - 1× to 32× polyphase resampling with
//!   [`FilterType::MinimumPhase`] and [`FilterType::LinearPhase`] families
//! - [`Clipper`] - Ceiling waveshaper with variable knee and stereo link
//! - [`PostLimiter`] - Zero-lookahead ceiling clamp after decimation
//! - [`SampleDelay`] - Integer delay for latency matching
//!
//! ## Parameters
//!
//! - [`SmoothedParam`] - One-pole glide for click-free gain changes
//! - [`ParamDescriptor`] - Ranges, defaults and stable IDs
//!
//! # no_std Support
//!
//! The crate is `no_std` compatible (it needs `alloc`). Disable the default
//! `std` feature:
//!
//! ```toml
//! [dependencies]
//! guillotine-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use guillotine_core::{Clipper, FilterType, Oversampler, OversamplerDesign, OversamplingFactor};
//!
//! let design = Arc::new(OversamplerDesign::new());
//! let mut os = Oversampler::new(design, 1, 512);
//! os.set_mode(OversamplingFactor::X4, FilterType::MinimumPhase);
//!
//! let clipper = Clipper::new(0.5, 1.0);
//! let mut block = vec![0.9_f32; 512];
//!
//! os.upsample(0, &block);
//! clipper.process_unlinked(os.oversampled_mut(0));
//! os.downsample(0, &mut block);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod clipper;
pub mod delay;
pub mod effect;
pub mod gain;
pub mod halfband;
pub mod limiter;
pub mod math;
pub mod mid_side;
pub mod oversample;
pub mod param;
pub mod param_info;
pub mod sanitize;

// Re-export main types at crate root
pub use clipper::{CEILING_MAX_DB, CEILING_MIN_DB, Clipper};
pub use delay::{HistoryBuffer, SampleDelay};
pub use effect::Effect;
pub use gain::{GAIN_MAX_DB, GAIN_MIN_DB, GainStage};
pub use halfband::{FirHalfband, IirHalfband};
pub use limiter::PostLimiter;
pub use math::{db_to_linear, flush_denormal, linear_to_db};
pub use mid_side::ChannelMode;
pub use oversample::{
    FilterType, MAX_FACTOR, MAX_STAGES, Oversampler, OversamplerDesign, OversamplingFactor,
};
pub use param::{DEFAULT_SMOOTHING_MS, SmoothedParam};
pub use param_info::{ParamDescriptor, ParamId, ParamUnit};
pub use sanitize::sanitize;
