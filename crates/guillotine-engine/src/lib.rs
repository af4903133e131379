//! Guillotine Engine - real-time orchestration for the oversampled clipper
//!
//! Builds the block-processing chain out of `guillotine-core` primitives and
//! exposes the host contract:
//!
//! - [`ClipperEngine`] - configure, process mono/stereo blocks, report latency
//! - [`ClipperParams`] - per-block parameter snapshot with clamping and a
//!   descriptor table
//! - [`EngineConfig`] - sample rate, block size, channels, gain glide
//! - [`SharedParams`] - lock-free parameter hand-off from a control thread
//! - [`DeltaEngine`] - wet and dry clip paths for monitoring what was removed
//! - [`EngineError`] - configuration and call-contract errors
//!
//! # Example
//!
//! ```rust
//! use guillotine_engine::{ClipperEngine, ClipperParams, EngineConfig, SharedParams};
//! use guillotine_core::OversamplingFactor;
//!
//! let shared = SharedParams::new(ClipperParams {
//!     ceiling_db: -1.0,
//!     oversampling: OversamplingFactor::X4,
//!     ..ClipperParams::default()
//! });
//!
//! let mut engine = ClipperEngine::new();
//! engine.configure(EngineConfig::stereo(48000.0, 512), shared.snapshot())?;
//!
//! // Audio callback:
//! let (mut left, mut right) = (vec![0.0_f32; 512], vec![0.0_f32; 512]);
//! engine.set_params(shared.snapshot());
//! engine.process_stereo(&mut left, &mut right)?;
//! # Ok::<(), guillotine_engine::EngineError>(())
//! ```

pub mod chain;
pub mod config;
pub mod delta;
pub mod engine;
pub mod error;
pub mod params;
pub mod shared;

pub use chain::{ClipPath, PathRole};
pub use config::{EngineConfig, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
pub use delta::DeltaEngine;
pub use engine::{ClipperEngine, EngineState};
pub use error::EngineError;
pub use params::{ClipperParams, PARAM_COUNT};
pub use shared::SharedParams;
