//! Left/right to mid/side conversion.
//!
//! Convention: `M = (L + R) / 2`, `S = (L - R) / 2`, `L = M + S`, `R = M - S`.
//! Halving on encode keeps mid at the same level as a centered source, so a
//! mono-compatible signal clips at the same ceiling in either mode.

/// Channel layout the clipper operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelMode {
    /// Clip left and right directly.
    #[default]
    LeftRight,
    /// Clip mid and side, then decode back to left/right.
    MidSide,
}

impl ChannelMode {
    /// Map a choice index (0 = L/R, 1 = M/S) to a mode; out-of-range clamps.
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            Self::LeftRight
        } else {
            Self::MidSide
        }
    }

    /// Choice index of this mode.
    pub fn index(self) -> usize {
        match self {
            Self::LeftRight => 0,
            Self::MidSide => 1,
        }
    }
}

/// Encode one frame.
#[inline]
pub fn encode(left: f32, right: f32) -> (f32, f32) {
    ((left + right) * 0.5, (left - right) * 0.5)
}

/// Decode one frame.
#[inline]
pub fn decode(mid: f32, side: f32) -> (f32, f32) {
    (mid + side, mid - side)
}

/// Encode a stereo block in place (`left` becomes mid, `right` becomes side).
///
/// No-op in [`ChannelMode::LeftRight`].
pub fn encode_block(mode: ChannelMode, left: &mut [f32], right: &mut [f32]) {
    if mode == ChannelMode::LeftRight {
        return;
    }
    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
        (*l, *r) = encode(*l, *r);
    }
}

/// Decode a stereo block in place (`left` holds mid, `right` holds side).
///
/// No-op in [`ChannelMode::LeftRight`].
pub fn decode_block(mode: ChannelMode, left: &mut [f32], right: &mut [f32]) {
    if mode == ChannelMode::LeftRight {
        return;
    }
    for (m, s) in left.iter_mut().zip(right.iter_mut()) {
        (*m, *s) = decode(*m, *s);
    }
}
