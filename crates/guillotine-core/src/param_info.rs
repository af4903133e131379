//! Parameter metadata: ranges, defaults and stable IDs.
//!
//! Each clipper parameter is described by a [`ParamDescriptor`]. The engine
//! uses the descriptor table to clamp incoming values, and a host shell can
//! use the same table to build its automation list.
//!
//! ```rust
//! use guillotine_core::{ParamDescriptor, ParamId, ParamUnit};
//!
//! let ceiling = ParamDescriptor::gain_db("Ceiling", "Ceil", -60.0, 12.0, 0.0)
//!     .with_id(ParamId(100), "clip_ceiling");
//!
//! assert_eq!(ceiling.unit, ParamUnit::Decibels);
//! assert_eq!(ceiling.clamp(-100.0), -60.0);
//! assert_eq!(ceiling.clamp(f32::NAN), 0.0);
//! ```

/// Stable numeric parameter ID for host automation and presets.
///
/// Once assigned, an ID must never change for a given parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParamId(pub u32);

/// Display unit of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB) - ceiling and gain parameters.
    Decibels,
    /// Dimensionless continuous value (e.g. sharpness, 0 to 1).
    None,
    /// Discrete choice index (oversampling factor, filter type).
    Choice,
    /// On/off switch stored as 0.0 or 1.0.
    Toggle,
}

/// Range, default and identity of a single parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display.
    pub name: &'static str,
    /// Short name for hardware displays, max 8 characters.
    pub short_name: &'static str,
    /// Unit type for formatting the parameter value.
    pub unit: ParamUnit,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Value used at initialization and when NaN arrives.
    pub default: f32,
    /// Recommended step increment for encoder-based control.
    pub step: f32,
    /// Stable numeric ID. Default: `ParamId(0)` (unassigned).
    pub id: ParamId,
    /// Human-readable stable ID (e.g. `"clip_ceiling"`).
    pub string_id: &'static str,
}

impl ParamDescriptor {
    /// Gain-style parameter in decibels.
    pub fn gain_db(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Decibels,
            min,
            max,
            default,
            step: 0.1,
            id: ParamId(0),
            string_id: "",
        }
    }

    /// Continuous dimensionless parameter.
    pub fn continuous(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            min,
            max,
            default,
            step: 0.01,
            id: ParamId(0),
            string_id: "",
        }
    }

    /// Discrete choice over `0..=last` with integer steps.
    pub fn choice(name: &'static str, short_name: &'static str, last: usize, default: usize) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Choice,
            min: 0.0,
            max: last as f32,
            default: default as f32,
            step: 1.0,
            id: ParamId(0),
            string_id: "",
        }
    }

    /// On/off switch.
    pub fn toggle(name: &'static str, short_name: &'static str, default: bool) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::Toggle,
            min: 0.0,
            max: 1.0,
            default: if default { 1.0 } else { 0.0 },
            step: 1.0,
            id: ParamId(0),
            string_id: "",
        }
    }

    /// Attach the stable numeric and string IDs.
    pub fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Clamp a value into `[min, max]`. NaN falls back to the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_bounds() {
        let desc = ParamDescriptor::gain_db("Input", "In", -24.0, 24.0, 0.0);
        assert_eq!(desc.clamp(-30.0), -24.0);
        assert_eq!(desc.clamp(30.0), 24.0);
        assert_eq!(desc.clamp(3.5), 3.5);
    }

    #[test]
    fn clamp_non_finite() {
        let desc = ParamDescriptor::continuous("Sharpness", "Sharp", 0.0, 1.0, 1.0);
        assert_eq!(desc.clamp(f32::NAN), 1.0);
        assert_eq!(desc.clamp(f32::INFINITY), 1.0);
        assert_eq!(desc.clamp(f32::NEG_INFINITY), 0.0);
    }

    #[test]
    fn choice_and_toggle_ranges() {
        let os = ParamDescriptor::choice("Oversampling", "OS", 5, 0);
        assert_eq!(os.max, 5.0);
        assert_eq!(os.unit, ParamUnit::Choice);

        let link = ParamDescriptor::toggle("Stereo Link", "Link", true);
        assert_eq!(link.default, 1.0);
        assert_eq!(link.clamp(7.0), 1.0);
    }
}
