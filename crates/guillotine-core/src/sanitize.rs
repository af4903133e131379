//! Non-finite sample scrubbing.
//!
//! A single NaN entering a recursive filter poisons its state forever, so the
//! clip path scrubs blocks at every stage boundary where a non-finite value
//! could appear: the input edge, after gain and encoding, at both outputs of
//! the oversampler, and at the output edge.

/// Replace every NaN or ±Inf sample with `0.0`, returning how many were replaced.
///
/// Finite samples pass through bit-exact.
///
/// ```rust
/// use guillotine_core::sanitize;
///
/// let mut block = [0.5, f32::NAN, f32::INFINITY, -0.25];
/// assert_eq!(sanitize(&mut block), 2);
/// assert_eq!(block, [0.5, 0.0, 0.0, -0.25]);
/// ```
#[inline]
pub fn sanitize(block: &mut [f32]) -> usize {
    let mut replaced = 0;
    for sample in block.iter_mut() {
        if !sample.is_finite() {
            *sample = 0.0;
            replaced += 1;
        }
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_passes_bit_exact() {
        let original = [0.1_f32, -0.0, 1e-30, f32::MAX, f32::MIN_POSITIVE];
        let mut block = original;
        assert_eq!(sanitize(&mut block), 0);
        for (a, b) in original.iter().zip(block.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn all_non_finite_kinds_replaced() {
        let mut block = [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, -f32::NAN];
        assert_eq!(sanitize(&mut block), 4);
        assert!(block.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn empty_block() {
        let mut block: [f32; 0] = [];
        assert_eq!(sanitize(&mut block), 0);
    }
}
