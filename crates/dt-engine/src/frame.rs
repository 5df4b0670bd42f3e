//! Audio frame type.

/// A stereo audio frame (16-bit integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub left: i16,
    pub right: i16,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { left: 0, right: 0 }
    }

    /// Narrow a wide 8:24 mix frame to 16 bits.
    ///
    /// The low 8 bits are dropped by arithmetic shift (truncation toward
    /// negative infinity); levels above 0 dB saturate.
    pub fn from_wide(left: i32, right: i32) -> Self {
        Self {
            left: narrow(left),
            right: narrow(right),
        }
    }

    /// Convert to normalized floats for float output devices.
    pub fn to_f32(self) -> (f32, f32) {
        (self.left as f32 / 32768.0, self.right as f32 / 32768.0)
    }
}

fn narrow(wide: i32) -> i16 {
    (wide >> 8).clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrowing_truncates_instead_of_rounding() {
        assert_eq!(Frame::from_wide(0x1FF, 0x100), Frame { left: 1, right: 1 });
        assert_eq!(Frame::from_wide(0xFF, -1), Frame { left: 0, right: -1 });
        assert_eq!(Frame::from_wide(-257, -256), Frame { left: -2, right: -1 });
    }

    #[test]
    fn narrowing_saturates_hot_mixes() {
        let f = Frame::from_wide(i32::MAX, i32::MIN);
        assert_eq!(f.left, i16::MAX);
        assert_eq!(f.right, i16::MIN);
    }

    #[test]
    fn to_f32_is_normalized() {
        let (l, r) = Frame { left: i16::MIN, right: 16384 }.to_f32();
        assert_eq!(l, -1.0);
        assert_eq!(r, 0.5);
    }
}
