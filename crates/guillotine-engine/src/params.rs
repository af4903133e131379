//! Clipper parameter snapshot and its descriptor table.
//!
//! [`ClipperParams`] is the immutable set of values the engine reads once per
//! block. Each field also has a flat index so hosts and [`SharedParams`]
//! can address it as a plain `f32`, the same way a plugin parameter list
//! does. Choices and toggles are encoded as their index (`0.0`, `1.0`, ...).
//!
//! [`SharedParams`]: crate::SharedParams

use guillotine_core::clipper::{ceiling_param_descriptor, sharpness_param_descriptor};
use guillotine_core::gain::{input_param_descriptor, output_param_descriptor};
use guillotine_core::{ChannelMode, FilterType, OversamplingFactor, ParamDescriptor, ParamId};

/// Number of addressable parameters.
pub const PARAM_COUNT: usize = 11;

/// Flat parameter indices.
pub mod index {
    /// Ceiling in dB.
    pub const CEILING: usize = 0;
    /// Knee sharpness, 0 to 1.
    pub const SHARPNESS: usize = 1;
    /// Oversampling choice, 0 (1×) to 5 (32×).
    pub const OVERSAMPLING: usize = 2;
    /// Filter family choice.
    pub const FILTER: usize = 3;
    /// Post-limiter toggle.
    pub const ENFORCE_CEILING: usize = 4;
    /// Stereo link toggle.
    pub const STEREO_LINK: usize = 5;
    /// Channel mode choice.
    pub const CHANNEL_MODE: usize = 6;
    /// Delta monitor toggle.
    pub const DELTA_MONITOR: usize = 7;
    /// Input gain in dB.
    pub const INPUT_GAIN: usize = 8;
    /// Output gain in dB.
    pub const OUTPUT_GAIN: usize = 9;
    /// Bypass toggle.
    pub const BYPASS: usize = 10;
}

/// One block's worth of clipper settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClipperParams {
    /// Output ceiling in dBFS.
    pub ceiling_db: f32,
    /// 0 = softest knee, 1 = hard clip.
    pub sharpness: f32,
    /// Oversampling factor.
    pub oversampling: OversamplingFactor,
    /// Anti-aliasing filter family.
    pub filter: FilterType,
    /// Clamp after downsampling so reconstruction ringing cannot pass the ceiling.
    pub enforce_ceiling: bool,
    /// One clipping decision per stereo frame.
    pub stereo_link: bool,
    /// Clip L/R or M/S.
    pub channel_mode: ChannelMode,
    /// Output what the clipper removed instead of the clipped signal.
    pub delta_monitor: bool,
    /// Drive into the clipper in dB.
    pub input_gain_db: f32,
    /// Make-up gain after the clipper in dB.
    pub output_gain_db: f32,
    /// Pass the input through, delayed by the reported latency.
    pub bypass: bool,
}

impl Default for ClipperParams {
    fn default() -> Self {
        Self {
            ceiling_db: 0.0,
            sharpness: 1.0,
            oversampling: OversamplingFactor::X1,
            filter: FilterType::MinimumPhase,
            enforce_ceiling: false,
            stereo_link: false,
            channel_mode: ChannelMode::LeftRight,
            delta_monitor: false,
            input_gain_db: 0.0,
            output_gain_db: 0.0,
            bypass: false,
        }
    }
}

impl ClipperParams {
    /// Descriptor table, indexed by the constants in [`index`].
    pub fn descriptors() -> [ParamDescriptor; PARAM_COUNT] {
        [
            ceiling_param_descriptor().with_id(ParamId(100), "clip_ceiling"),
            sharpness_param_descriptor().with_id(ParamId(101), "clip_sharpness"),
            ParamDescriptor::choice("Oversampling", "OS", OversamplingFactor::ALL.len() - 1, 0)
                .with_id(ParamId(102), "clip_oversampling"),
            ParamDescriptor::choice("Filter", "Filter", 1, 0)
                .with_id(ParamId(103), "clip_filter"),
            ParamDescriptor::toggle("Enforce Ceiling", "Enforce", false)
                .with_id(ParamId(104), "clip_enforce"),
            ParamDescriptor::toggle("Stereo Link", "Link", false)
                .with_id(ParamId(105), "clip_link"),
            ParamDescriptor::choice("Channel Mode", "Mode", 1, 0)
                .with_id(ParamId(106), "clip_channel_mode"),
            ParamDescriptor::toggle("Delta", "Delta", false).with_id(ParamId(107), "clip_delta"),
            input_param_descriptor().with_id(ParamId(108), "clip_input_gain"),
            output_param_descriptor().with_id(ParamId(109), "clip_output_gain"),
            ParamDescriptor::toggle("Bypass", "Bypass", false).with_id(ParamId(110), "clip_bypass"),
        ]
    }

    /// Descriptor for one flat index.
    pub fn descriptor(idx: usize) -> Option<ParamDescriptor> {
        Self::descriptors().get(idx).copied()
    }

    /// Copy with every continuous value clamped into its descriptor range.
    ///
    /// NaN falls back to the parameter default, ±Inf to the nearest bound.
    pub fn clamped(&self) -> Self {
        let table = Self::descriptors();
        Self {
            ceiling_db: table[index::CEILING].clamp(self.ceiling_db),
            sharpness: table[index::SHARPNESS].clamp(self.sharpness),
            input_gain_db: table[index::INPUT_GAIN].clamp(self.input_gain_db),
            output_gain_db: table[index::OUTPUT_GAIN].clamp(self.output_gain_db),
            ..*self
        }
    }

    /// Value at a flat index, with choices and toggles as their index.
    pub fn get(&self, idx: usize) -> Option<f32> {
        let value = match idx {
            index::CEILING => self.ceiling_db,
            index::SHARPNESS => self.sharpness,
            index::OVERSAMPLING => self.oversampling.index() as f32,
            index::FILTER => self.filter.index() as f32,
            index::ENFORCE_CEILING => toggle_value(self.enforce_ceiling),
            index::STEREO_LINK => toggle_value(self.stereo_link),
            index::CHANNEL_MODE => self.channel_mode.index() as f32,
            index::DELTA_MONITOR => toggle_value(self.delta_monitor),
            index::INPUT_GAIN => self.input_gain_db,
            index::OUTPUT_GAIN => self.output_gain_db,
            index::BYPASS => toggle_value(self.bypass),
            _ => return None,
        };
        Some(value)
    }

    /// Set the value at a flat index, clamped to its descriptor.
    ///
    /// Choices round to the nearest index. Returns `false` for an unknown
    /// index.
    pub fn set(&mut self, idx: usize, value: f32) -> bool {
        let Some(desc) = Self::descriptor(idx) else {
            return false;
        };
        let value = desc.clamp(value);
        let choice = value.round() as usize;
        let on = value >= 0.5;
        match idx {
            index::CEILING => self.ceiling_db = value,
            index::SHARPNESS => self.sharpness = value,
            index::OVERSAMPLING => self.oversampling = OversamplingFactor::from_index(choice),
            index::FILTER => self.filter = FilterType::from_index(choice),
            index::ENFORCE_CEILING => self.enforce_ceiling = on,
            index::STEREO_LINK => self.stereo_link = on,
            index::CHANNEL_MODE => self.channel_mode = ChannelMode::from_index(choice),
            index::DELTA_MONITOR => self.delta_monitor = on,
            index::INPUT_GAIN => self.input_gain_db = value,
            index::OUTPUT_GAIN => self.output_gain_db = value,
            index::BYPASS => self.bypass = on,
            _ => return false,
        }
        true
    }

    /// Whether switching from `self` to `other` changes the filter chain.
    pub fn needs_rebuild(&self, other: &Self) -> bool {
        self.oversampling != other.oversampling || self.filter != other.filter
    }
}

#[inline]
fn toggle_value(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_descriptors() {
        let params = ClipperParams::default();
        for (i, desc) in ClipperParams::descriptors().iter().enumerate() {
            assert_eq!(params.get(i), Some(desc.default), "{}", desc.name);
        }
        assert_eq!(params.get(PARAM_COUNT), None);
    }

    #[test]
    fn ids_are_unique() {
        let table = ClipperParams::descriptors();
        for (i, a) in table.iter().enumerate() {
            for b in &table[i + 1..] {
                assert_ne!(a.id, b.id);
                assert_ne!(a.string_id, b.string_id);
            }
        }
    }

    #[test]
    fn clamped_ranges() {
        let params = ClipperParams {
            ceiling_db: -100.0,
            sharpness: 2.0,
            input_gain_db: f32::INFINITY,
            output_gain_db: f32::NEG_INFINITY,
            ..ClipperParams::default()
        }
        .clamped();
        assert_eq!(params.ceiling_db, -60.0);
        assert_eq!(params.sharpness, 1.0);
        assert_eq!(params.input_gain_db, 24.0);
        assert_eq!(params.output_gain_db, -24.0);
    }

    #[test]
    fn nan_falls_back_to_default() {
        let params = ClipperParams {
            ceiling_db: f32::NAN,
            sharpness: f32::NAN,
            input_gain_db: f32::NAN,
            ..ClipperParams::default()
        }
        .clamped();
        assert_eq!(params, ClipperParams::default());
    }

    #[test]
    fn set_by_index() {
        let mut params = ClipperParams::default();
        assert!(params.set(index::OVERSAMPLING, 3.0));
        assert_eq!(params.oversampling, OversamplingFactor::X8);
        assert!(params.set(index::OVERSAMPLING, 99.0));
        assert_eq!(params.oversampling, OversamplingFactor::X32);
        assert!(params.set(index::OVERSAMPLING, -4.0));
        assert_eq!(params.oversampling, OversamplingFactor::X1);

        assert!(params.set(index::FILTER, 1.0));
        assert_eq!(params.filter, FilterType::LinearPhase);
        assert!(params.set(index::CHANNEL_MODE, 1.0));
        assert_eq!(params.channel_mode, ChannelMode::MidSide);
        assert!(params.set(index::DELTA_MONITOR, 1.0));
        assert!(params.delta_monitor);
        assert!(params.set(index::CEILING, 50.0));
        assert_eq!(params.ceiling_db, 12.0);
        assert!(!params.set(PARAM_COUNT, 1.0));
    }

    #[test]
    fn rebuild_only_for_filter_chain_changes() {
        let a = ClipperParams::default();
        let b = ClipperParams {
            ceiling_db: -3.0,
            delta_monitor: true,
            ..a
        };
        assert!(!a.needs_rebuild(&b));
        let c = ClipperParams {
            filter: FilterType::LinearPhase,
            ..a
        };
        assert!(a.needs_rebuild(&c));
    }
}
