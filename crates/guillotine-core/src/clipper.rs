//! Ceiling waveshaper with adjustable knee and optional stereo link.
//!
//! The transfer curve works in units of the ceiling, `u = |x| / ceiling`:
//!
//! ```text
//! w = 0.5 * (1 - sharpness)          knee width
//! t = 1 - w                          knee start
//!
//! u <= t   : u                       (identity)
//! u >  t   : t + w * tanh((u - t) / w)
//! ```
//!
//! At `sharpness = 1` the knee collapses and the curve is an exact
//! `clamp(x, -ceiling, ceiling)`. At `sharpness = 0` compression starts at half
//! the ceiling and approaches it asymptotically. The curve is odd, monotone in
//! `x`, has a continuous first derivative at the knee start, and its output
//! for a fixed input never decreases as sharpness rises (a harder knee
//! removes less signal below the ceiling). A soft knee stays strictly below
//! the ceiling for every finite input; only the hard clip reaches it.
//!
//! ## Stereo link
//!
//! Linked mode drives the curve with the louder channel of each frame and
//! applies the resulting gain to both, preserving the inter-channel ratio.

use libm::tanhf;

use crate::{Effect, ParamDescriptor, db_to_linear};

/// Lowest ceiling in dB.
pub const CEILING_MIN_DB: f32 = -60.0;

/// Highest ceiling in dB.
pub const CEILING_MAX_DB: f32 = 12.0;

/// Knee widths below this are treated as a hard clip.
const HARD_KNEE_WIDTH: f32 = 1e-6;

/// Largest soft-knee output as a fraction of the ceiling.
const SOFT_LIMIT: f32 = 1.0 - f32::EPSILON;

/// Per-sample ceiling waveshaper.
///
/// # Example
///
/// ```rust
/// use guillotine_core::Clipper;
///
/// let clipper = Clipper::new(0.5, 1.0);
/// assert_eq!(clipper.shape(0.9), 0.5);
/// assert_eq!(clipper.shape(-2.0), -0.5);
/// assert_eq!(clipper.shape(0.3), 0.3);
///
/// let soft = Clipper::new(0.5, 0.0);
/// assert!(soft.shape(0.4) < 0.4);
/// assert!(soft.shape(10.0) <= 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clipper {
    ceiling: f32,
    sharpness: f32,
    knee_width: f32,
    knee_start: f32,
    /// `knee_start * ceiling`, the absolute level where shaping begins.
    threshold: f32,
}

impl Clipper {
    /// Create a clipper with a linear ceiling and a sharpness in `[0, 1]`.
    pub fn new(ceiling: f32, sharpness: f32) -> Self {
        let mut clipper = Self {
            ceiling: 1.0,
            sharpness: 1.0,
            knee_width: 0.0,
            knee_start: 1.0,
            threshold: 1.0,
        };
        clipper.set_ceiling(ceiling);
        clipper.set_sharpness(sharpness);
        clipper
    }

    /// Set the ceiling as a linear amplitude. Negative or NaN values become 0.
    pub fn set_ceiling(&mut self, ceiling: f32) {
        self.ceiling = if ceiling > 0.0 { ceiling } else { 0.0 };
        self.update_knee();
    }

    /// Set the ceiling in dB, clamped to [`CEILING_MIN_DB`]..=[`CEILING_MAX_DB`].
    pub fn set_ceiling_db(&mut self, db: f32) {
        self.set_ceiling(db_to_linear(ceiling_param_descriptor().clamp(db)));
    }

    /// Set the knee sharpness (0 = softest, 1 = hard clip). NaN selects hard clip.
    pub fn set_sharpness(&mut self, sharpness: f32) {
        self.sharpness = sharpness_param_descriptor().clamp(sharpness);
        self.update_knee();
    }

    /// Linear ceiling.
    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    /// Knee sharpness.
    pub fn sharpness(&self) -> f32 {
        self.sharpness
    }

    /// Absolute level above which samples are altered.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn update_knee(&mut self) {
        self.knee_width = 0.5 * (1.0 - self.sharpness);
        self.knee_start = 1.0 - self.knee_width;
        self.threshold = self.knee_start * self.ceiling;
    }

    /// Shape one sample.
    #[inline]
    pub fn shape(&self, x: f32) -> f32 {
        let c = self.ceiling;
        if c <= 0.0 {
            return 0.0;
        }
        let mag = x.abs();
        if mag <= self.threshold {
            return x;
        }
        if self.knee_width < HARD_KNEE_WIDTH {
            return x.clamp(-c, c);
        }

        let (t, w) = (self.knee_start, self.knee_width);
        let u = mag / c;
        // A soft knee only approaches the ceiling, even once tanh saturates.
        let shaped = ((t + w * tanhf((u - t) / w)) * c).min(c * SOFT_LIMIT);
        if x < 0.0 { -shaped } else { shaped }
    }

    /// Shape a block in place, each sample independently.
    pub fn process_unlinked(&self, block: &mut [f32]) {
        for sample in block.iter_mut() {
            *sample = self.shape(*sample);
        }
    }

    /// Shape a stereo block in place with one decision per frame.
    ///
    /// The louder channel is shaped exactly; the quieter one is scaled by the
    /// same gain. Frames whose peak is below [`threshold`](Self::threshold)
    /// pass unchanged.
    pub fn process_linked(&self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (la, ra) = (l.abs(), r.abs());
            if la >= ra {
                if la > self.threshold {
                    let shaped = self.shape(*l);
                    *r *= shaped / *l;
                    *l = shaped;
                }
            } else if ra > self.threshold {
                let shaped = self.shape(*r);
                *l *= shaped / *r;
                *r = shaped;
            }
        }
    }
}

impl Default for Clipper {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl Effect for Clipper {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.shape(input)
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

/// Descriptor for the ceiling parameter (dB).
pub fn ceiling_param_descriptor() -> ParamDescriptor {
    ParamDescriptor::gain_db("Ceiling", "Ceiling", CEILING_MIN_DB, CEILING_MAX_DB, 0.0)
}

/// Descriptor for the sharpness parameter.
pub fn sharpness_param_descriptor() -> ParamDescriptor {
    ParamDescriptor::continuous("Sharpness", "Sharp", 0.0, 1.0, 1.0)
}
