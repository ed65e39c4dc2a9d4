//! Byte order conversion
//!
//! OSC puts every multi-byte value on the wire in big-endian ("network") order, while the
//! microcontrollers this crate targets are mostly little-endian.
//! [`swap_bytes`] reverses any fixed-width value unconditionally, [`to_network`] and
//! [`from_network`] only swap when the target is little-endian.
//!
//! Strings are never swapped - a single byte has no order to reverse.

/// Fixed-width values whose byte sequence can be reversed
pub trait SwapBytes: Copy {
    fn swap_bytes(self) -> Self;
}

macro_rules! impl_swap_bytes_int {
    ($($t:ty),*) => {
        $(
            impl SwapBytes for $t {
                #[inline]
                fn swap_bytes(self) -> Self {
                    <$t>::swap_bytes(self)
                }
            }
        )*
    };
}

impl_swap_bytes_int!(u16, i16, u32, i32, u64, i64);

impl SwapBytes for f32 {
    #[inline]
    fn swap_bytes(self) -> Self {
        f32::from_bits(self.to_bits().swap_bytes())
    }
}

impl SwapBytes for f64 {
    #[inline]
    fn swap_bytes(self) -> Self {
        f64::from_bits(self.to_bits().swap_bytes())
    }
}

/// Reverses the byte sequence of `value`
#[inline]
pub fn swap_bytes<T: SwapBytes>(value: T) -> T {
    value.swap_bytes()
}

/// Converts a host order value to network (big-endian) order
#[inline]
pub fn to_network<T: SwapBytes>(value: T) -> T {
    if cfg!(target_endian = "little") {
        value.swap_bytes()
    } else {
        value
    }
}

/// Converts a network (big-endian) order value to host order
#[inline]
pub fn from_network<T: SwapBytes>(value: T) -> T {
    // the conversion is its own inverse
    to_network(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_u32() {
        assert_eq!(swap_bytes(0x11_22_33_44u32), 0x44_33_22_11u32);
    }

    #[test]
    fn test_swap_i32_negative() {
        assert_eq!(swap_bytes(-2i32), i32::from_be_bytes((-2i32).to_le_bytes()));
    }

    #[test]
    fn test_swap_is_involution() {
        for v in [0u64, 1, 0xdead_beef_cafe_babe, u64::MAX] {
            assert_eq!(swap_bytes(swap_bytes(v)), v);
        }
        assert_eq!(swap_bytes(swap_bytes(-1.5f64)), -1.5f64);
    }

    #[test]
    fn test_swap_f32() {
        let swapped = swap_bytes(440.0f32);
        assert_eq!(swapped.to_bits(), 440.0f32.to_bits().swap_bytes());
    }

    #[test]
    fn test_to_network_matches_be_bytes() {
        let v = to_network(440.0f32.to_bits());
        assert_eq!(v.to_ne_bytes(), [0x43, 0xdc, 0x00, 0x00]);

        let v = to_network(1i32);
        assert_eq!(v.to_ne_bytes(), [0x00, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_from_network_reverses_to_network() {
        assert_eq!(from_network(to_network(0x0102u16)), 0x0102u16);
        assert_eq!(from_network(to_network(-12345i64)), -12345i64);
    }
}
