//! Half-band filter design and the per-stage 2× resamplers built on it.
//!
//! Every oversampling factor is a cascade of 2× stages. Each stage uses a
//! half-band lowpass (cutoff at a quarter of the stage's high rate), in one of
//! two families:
//!
//! - [`FirHalfband`]: symmetric Kaiser-windowed FIR. Linear phase, group delay
//!   `(taps - 1) / 2` high-rate samples per direction. Every other tap is zero,
//!   so the polyphase form only convolves the even phase.
//! - [`IirHalfband`]: two parallel chains of first-order allpass sections in
//!   `z^-2` (polyphase IIR). Minimum phase, a few samples of delay, no ringing
//!   ahead of transients.
//!
//! Designs are immutable and computed once in `f64`. Filter memory lives in
//! the separate [`FirUpsampler`], [`FirDownsampler`], [`IirUpsampler`] and
//! [`IirDownsampler`] state types, so any number of instances can share one
//! design without sharing state.
//!
//! References:
//! - J. F. Kaiser, "Nonrecursive digital filter design using the I0-sinh
//!   window function", 1974.
//! - L. de Soras, "HIIR" (polyphase IIR half-band coefficient design, based on
//!   the elliptic-function method of Valenzuela & Constantinides, 1983).

use alloc::vec;
use alloc::vec::Vec;
use core::f64::consts::PI;

use libm::{cos, pow, sin, sqrt, tan};

use crate::delay::HistoryBuffer;
use crate::flush_denormal;

// ============================================================================
// FIR (linear phase)
// ============================================================================

/// Kaiser-windowed FIR half-band lowpass.
///
/// The full filter has `4m + 3` taps with centre index `M = 2m + 1`. Only the
/// even-index taps (the centre tap is the fixed `0.5`) are stored. They are
/// normalized to sum to exactly `0.5`, which makes the DC gain exactly 1.
#[derive(Debug, Clone)]
pub struct FirHalfband {
    /// `h[0], h[2], ..., h[4m + 2]`
    taps: Vec<f32>,
    half_order: usize,
}

impl FirHalfband {
    /// Design a half-band FIR with `4 * half_order + 3` taps.
    pub fn design(half_order: usize, attenuation_db: f64) -> Self {
        let centre = (2 * half_order + 1) as f64;
        let beta = kaiser_beta(attenuation_db);
        let i0_beta = bessel_i0(beta);

        let raw: Vec<f64> = (0..2 * half_order + 2)
            .map(|k| {
                let offset = (2 * k) as f64 - centre;
                let sinc = sin(PI * offset / 2.0) / (PI * offset);
                let ratio = offset / centre;
                let window = bessel_i0(beta * sqrt((1.0 - ratio * ratio).max(0.0))) / i0_beta;
                sinc * window
            })
            .collect();

        let sum: f64 = raw.iter().sum();
        let taps = raw.iter().map(|&h| (h * 0.5 / sum) as f32).collect();

        Self { taps, half_order }
    }

    /// Even-phase taps.
    pub fn taps(&self) -> &[f32] {
        &self.taps
    }

    /// Total number of taps in the full (zero-stuffed) filter.
    pub fn num_taps(&self) -> usize {
        4 * self.half_order + 3
    }

    /// Group delay per direction in high-rate samples, `(taps - 1) / 2`.
    pub fn group_delay(&self) -> usize {
        2 * self.half_order + 1
    }
}

/// Kaiser window shape parameter for a target stopband attenuation.
fn kaiser_beta(attenuation_db: f64) -> f64 {
    if attenuation_db > 50.0 {
        0.1102 * (attenuation_db - 8.7)
    } else if attenuation_db >= 21.0 {
        let a = attenuation_db - 21.0;
        0.5842 * pow(a, 0.4) + 0.07886 * a
    } else {
        0.0
    }
}

/// Zeroth-order modified Bessel function of the first kind (power series).
fn bessel_i0(x: f64) -> f64 {
    let half = x / 2.0;
    let mut sum = 1.0;
    let mut term = 1.0;
    let mut k = 1.0;
    loop {
        term *= (half / k) * (half / k);
        sum += term;
        if term < 1e-12 * sum {
            return sum;
        }
        k += 1.0;
    }
}

/// FIR half-band interpolator state (one sample in, two out).
#[derive(Debug, Clone)]
pub struct FirUpsampler {
    history: HistoryBuffer,
    half_order: usize,
}

impl FirUpsampler {
    /// State sized for `design`.
    pub fn new(design: &FirHalfband) -> Self {
        Self {
            history: HistoryBuffer::new(design.taps.len()),
            half_order: design.half_order,
        }
    }

    /// Interpolate one base-rate sample into two high-rate samples.
    #[inline]
    pub fn process(&mut self, design: &FirHalfband, input: f32) -> (f32, f32) {
        self.history.push(input);
        let even: f32 = design
            .taps
            .iter()
            .zip(self.history.window())
            .map(|(h, x)| h * x)
            .sum();
        // Odd phase is the centre tap (0.5) times the zero-stuffing gain (2).
        (2.0 * even, self.history.get(self.half_order))
    }

    /// Clear filter memory.
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

/// FIR half-band decimator state (two samples in, one out).
#[derive(Debug, Clone)]
pub struct FirDownsampler {
    even: HistoryBuffer,
    odd: HistoryBuffer,
    half_order: usize,
}

impl FirDownsampler {
    /// State sized for `design`.
    pub fn new(design: &FirHalfband) -> Self {
        Self {
            even: HistoryBuffer::new(design.taps.len()),
            odd: HistoryBuffer::new(design.half_order + 2),
            half_order: design.half_order,
        }
    }

    /// Filter and decimate one high-rate pair into one low-rate sample.
    #[inline]
    pub fn process(&mut self, design: &FirHalfband, first: f32, second: f32) -> f32 {
        self.even.push(first);
        self.odd.push(second);
        let acc: f32 = design
            .taps
            .iter()
            .zip(self.even.window())
            .map(|(h, x)| h * x)
            .sum();
        acc + 0.5 * self.odd.get(self.half_order + 1)
    }

    /// Clear filter memory.
    pub fn reset(&mut self) {
        self.even.clear();
        self.odd.clear();
    }
}

// ============================================================================
// Polyphase IIR (minimum phase)
// ============================================================================

/// Polyphase allpass half-band lowpass.
///
/// `H(z) = (A0(z^2) + z^-1 A1(z^2)) / 2` where `A0` and `A1` are cascades of
/// first-order allpass sections. Coefficients alternate between the two
/// paths: even indices go to `A0`, odd indices to `A1`.
#[derive(Debug, Clone)]
pub struct IirHalfband {
    path0: Vec<f32>,
    path1: Vec<f32>,
    group_delay: f64,
}

impl IirHalfband {
    /// Design a half-band with `num_coefs` allpass coefficients.
    ///
    /// `transition` is the normalized transition bandwidth (0 < tbw < 0.5),
    /// relative to the high rate. More coefficients or a wider transition
    /// band give more stopband attenuation.
    pub fn design(num_coefs: usize, transition: f64) -> Self {
        let (k, q) = transition_params(transition);
        let order = (2 * num_coefs + 1) as f64;
        let coefs: Vec<f64> = (0..num_coefs).map(|i| allpass_coef(i, k, q, order)).collect();

        let section_delay = |a: f64| 2.0 * (1.0 - a) / (1.0 + a);
        let tau0: f64 = coefs.iter().step_by(2).map(|&a| section_delay(a)).sum();
        let tau1: f64 = 1.0 + coefs.iter().skip(1).step_by(2).map(|&a| section_delay(a)).sum::<f64>();

        Self {
            path0: coefs.iter().step_by(2).map(|&a| a as f32).collect(),
            path1: coefs.iter().skip(1).step_by(2).map(|&a| a as f32).collect(),
            group_delay: (tau0 + tau1) / 2.0,
        }
    }

    /// Number of allpass coefficients across both paths.
    pub fn num_coefs(&self) -> usize {
        self.path0.len() + self.path1.len()
    }

    /// DC group delay per direction in high-rate samples.
    pub fn group_delay(&self) -> f64 {
        self.group_delay
    }
}

/// Elliptic modulus `k` and nome `q` for a transition bandwidth.
fn transition_params(transition: f64) -> (f64, f64) {
    let k = tan((1.0 - transition * 2.0) * PI / 4.0);
    let k = k * k;
    let kksqrt = pow(1.0 - k * k, 0.25);
    let e = 0.5 * (1.0 - kksqrt) / (1.0 + kksqrt);
    let e2 = e * e;
    let e4 = e2 * e2;
    let q = e * (1.0 + e4 * (2.0 + e4 * (15.0 + 150.0 * e4)));
    (k, q)
}

fn allpass_coef(index: usize, k: f64, q: f64, order: f64) -> f64 {
    let c = (index + 1) as f64;
    let num = series_numerator(q, order, c) * pow(q, 0.25);
    let den = series_denominator(q, order, c) + 0.5;
    let ww = num / den;
    let wwsq = ww * ww;
    let x = sqrt((1.0 - wwsq * k) * (1.0 - wwsq / k)) / (1.0 + wwsq);
    (1.0 - x) / (1.0 + x)
}

const SERIES_EPSILON: f64 = 1e-30;
const SERIES_MAX_TERMS: i32 = 100;

fn series_numerator(q: f64, order: f64, c: f64) -> f64 {
    let mut acc = 0.0;
    let mut sign = 1.0;
    for i in 0..SERIES_MAX_TERMS {
        let i = f64::from(i);
        let term = pow(q, i * (i + 1.0)) * sin((i * 2.0 + 1.0) * c * PI / order) * sign;
        acc += term;
        sign = -sign;
        if term.abs() <= SERIES_EPSILON {
            break;
        }
    }
    acc
}

fn series_denominator(q: f64, order: f64, c: f64) -> f64 {
    let mut acc = 0.0;
    let mut sign = -1.0;
    for i in 1..=SERIES_MAX_TERMS {
        let i = f64::from(i);
        let term = pow(q, i * i) * cos(i * 2.0 * c * PI / order) * sign;
        acc += term;
        sign = -sign;
        if term.abs() <= SERIES_EPSILON {
            break;
        }
    }
    acc
}

/// Memory of one allpass cascade: previous input and output per section.
#[derive(Debug, Clone)]
struct AllpassChain {
    x1: Vec<f32>,
    y1: Vec<f32>,
}

impl AllpassChain {
    fn new(sections: usize) -> Self {
        Self {
            x1: vec![0.0; sections],
            y1: vec![0.0; sections],
        }
    }

    /// `y[n] = a * (x[n] - y[n-1]) + x[n-1]` per section, in series.
    #[inline]
    fn process(&mut self, coefs: &[f32], input: f32) -> f32 {
        let mut x = input;
        for ((a, x1), y1) in coefs.iter().zip(self.x1.iter_mut()).zip(self.y1.iter_mut()) {
            let y = a * (x - *y1) + *x1;
            *x1 = x;
            *y1 = flush_denormal(y);
            x = y;
        }
        x
    }

    fn reset(&mut self) {
        self.x1.fill(0.0);
        self.y1.fill(0.0);
    }
}

/// Polyphase IIR interpolator state.
#[derive(Debug, Clone)]
pub struct IirUpsampler {
    path0: AllpassChain,
    path1: AllpassChain,
}

impl IirUpsampler {
    /// State sized for `design`.
    pub fn new(design: &IirHalfband) -> Self {
        Self {
            path0: AllpassChain::new(design.path0.len()),
            path1: AllpassChain::new(design.path1.len()),
        }
    }

    /// Interpolate one base-rate sample into two high-rate samples.
    #[inline]
    pub fn process(&mut self, design: &IirHalfband, input: f32) -> (f32, f32) {
        (
            self.path0.process(&design.path0, input),
            self.path1.process(&design.path1, input),
        )
    }

    /// Clear filter memory.
    pub fn reset(&mut self) {
        self.path0.reset();
        self.path1.reset();
    }
}

/// Polyphase IIR decimator state.
#[derive(Debug, Clone)]
pub struct IirDownsampler {
    path0: AllpassChain,
    path1: AllpassChain,
}

impl IirDownsampler {
    /// State sized for `design`.
    pub fn new(design: &IirHalfband) -> Self {
        Self {
            path0: AllpassChain::new(design.path0.len()),
            path1: AllpassChain::new(design.path1.len()),
        }
    }

    /// Filter and decimate one high-rate pair into one low-rate sample.
    #[inline]
    pub fn process(&mut self, design: &IirHalfband, first: f32, second: f32) -> f32 {
        let a = self.path0.process(&design.path0, second);
        let b = self.path1.process(&design.path1, first);
        0.5 * (a + b)
    }

    /// Clear filter memory.
    pub fn reset(&mut self) {
        self.path0.reset();
        self.path1.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run `n` samples of a sine at `freq` (fraction of the low rate) through
    /// an up/down pair and return the settled peak.
    fn fir_roundtrip_peak(design: &FirHalfband, freq: f32, n: usize) -> f32 {
        let mut up = FirUpsampler::new(design);
        let mut down = FirDownsampler::new(design);
        let mut peak = 0.0_f32;
        for i in 0..n {
            let x = libm::sinf(core::f32::consts::TAU * freq * i as f32);
            let (a, b) = up.process(design, x);
            let y = down.process(design, a, b);
            if i > n / 2 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn fir_taps_symmetric_and_normalized() {
        let design = FirHalfband::design(15, 90.0);
        assert_eq!(design.num_taps(), 63);
        assert_eq!(design.group_delay(), 31);

        let taps = design.taps();
        for k in 0..taps.len() / 2 {
            assert!((taps[k] - taps[taps.len() - 1 - k]).abs() < 1e-7);
        }
        let sum: f32 = taps.iter().sum();
        assert!((sum - 0.5).abs() < 1e-6, "Even taps should sum to 0.5, got {sum}");
    }

    #[test]
    fn fir_dc_unity_and_integer_delay() {
        let design = FirHalfband::design(4, 90.0);
        let mut up = FirUpsampler::new(&design);
        let mut down = FirDownsampler::new(&design);

        // An impulse comes back after exactly `group_delay` low-rate samples.
        let mut out = Vec::new();
        for i in 0..40 {
            let x = if i == 0 { 1.0 } else { 0.0 };
            let (a, b) = up.process(&design, x);
            out.push(down.process(&design, a, b));
        }
        let peak_index = out
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
            .map(|(i, _)| i)
            .unwrap_or_default();
        assert_eq!(peak_index, design.group_delay());

        let dc: f32 = out.iter().sum();
        assert!((dc - 1.0).abs() < 1e-5, "Impulse response should sum to 1, got {dc}");
    }

    #[test]
    fn fir_passband_transparent() {
        let design = FirHalfband::design(15, 90.0);
        let peak = fir_roundtrip_peak(&design, 0.1, 4000);
        assert!((peak - 1.0).abs() < 0.01, "Passband peak should be ~1, got {peak}");
    }

    #[test]
    fn iir_coefficients_in_unit_interval() {
        let design = IirHalfband::design(12, 0.04);
        assert_eq!(design.num_coefs(), 12);
        for &a in design.path0.iter().chain(design.path1.iter()) {
            assert!(a > 0.0 && a < 1.0, "Allpass coefficient out of range: {a}");
        }
        let gd = design.group_delay();
        assert!(gd > 4.0 && gd < 7.0, "Unexpected group delay {gd}");
    }

    #[test]
    fn iir_dc_unity() {
        let design = IirHalfband::design(8, 0.1);
        let mut up = IirUpsampler::new(&design);
        let mut down = IirDownsampler::new(&design);
        let mut y = 0.0;
        for _ in 0..2000 {
            let (a, b) = up.process(&design, 1.0);
            y = down.process(&design, a, b);
        }
        assert!((y - 1.0).abs() < 1e-4, "DC should pass at unity, got {y}");
    }

    #[test]
    fn iir_rejects_image_band() {
        // A tone near the high-rate Nyquist fed straight into the decimator
        // must be strongly attenuated.
        let design = IirHalfband::design(12, 0.04);
        let mut down = IirDownsampler::new(&design);
        let mut peak = 0.0_f32;
        for i in 0..4000_u32 {
            let t = f64::from(2 * i);
            let f = 0.45;
            let a = libm::sin(core::f64::consts::TAU * f * t) as f32;
            let b = libm::sin(core::f64::consts::TAU * f * (t + 1.0)) as f32;
            let y = down.process(&design, a, b);
            if i > 2000 {
                peak = peak.max(y.abs());
            }
        }
        assert!(peak < 1e-3, "Stopband leakage too high: {peak}");
    }
}
