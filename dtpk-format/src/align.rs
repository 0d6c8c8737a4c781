//! Alignment helpers
//!
//! All container regions are padded to power-of-two boundaries. The helpers
//! round up with a mask, so `N` must be a power of two.

/// Round `value` up to a multiple of `N` (`N` must be a power of two)
#[inline]
pub const fn align_to<const N: usize>(value: usize) -> usize {
    (value + (N - 1)) & !(N - 1)
}

#[inline]
pub const fn align4(value: usize) -> usize {
    align_to::<4>(value)
}

#[inline]
pub const fn align8(value: usize) -> usize {
    align_to::<8>(value)
}

#[inline]
pub const fn align16(value: usize) -> usize {
    align_to::<16>(value)
}

#[inline]
pub const fn align32(value: usize) -> usize {
    align_to::<32>(value)
}

#[inline]
pub const fn align256(value: usize) -> usize {
    align_to::<256>(value)
}

/// Zero-based index of the highest set bit, `None` for zero
#[inline]
pub const fn most_significant_bit_position(value: usize) -> Option<u32> {
    if value == 0 {
        None
    } else {
        Some(usize::BITS - 1 - value.leading_zeros())
    }
}

/// Smallest power of two strictly greater than `value`
///
/// Returns `None` for zero or when the result does not fit in `usize`.
pub fn next_power_of_two_above(value: usize) -> Option<usize> {
    let msb = most_significant_bit_position(value)?;
    1usize.checked_shl(msb + 1)
}

/// Append zero bytes until `buf.len()` is a multiple of `N`
pub fn pad_to<const N: usize>(buf: &mut Vec<u8>) {
    buf.resize(align_to::<N>(buf.len()), 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_values() {
        assert_eq!(align4(0), 0);
        assert_eq!(align4(1), 4);
        assert_eq!(align4(4), 4);
        assert_eq!(align8(9), 16);
        assert_eq!(align16(17), 32);
        assert_eq!(align32(33), 64);
        assert_eq!(align256(1), 256);
        assert_eq!(align256(256), 256);
        assert_eq!(align256(257), 512);
    }

    #[test]
    fn test_align_idempotent() {
        for x in 0..2048 {
            assert_eq!(align4(align4(x)), align4(x));
            assert_eq!(align8(align8(x)), align8(x));
            assert_eq!(align16(align16(x)), align16(x));
            assert_eq!(align32(align32(x)), align32(x));
            assert_eq!(align256(align256(x)), align256(x));
        }
    }

    #[test]
    fn test_msb_position() {
        assert_eq!(most_significant_bit_position(0), None);
        assert_eq!(most_significant_bit_position(1), Some(0));
        assert_eq!(most_significant_bit_position(2), Some(1));
        assert_eq!(most_significant_bit_position(255), Some(7));
        assert_eq!(most_significant_bit_position(256), Some(8));
        assert_eq!(most_significant_bit_position(0x520), Some(10));
    }

    #[test]
    fn test_next_power_of_two_above() {
        assert_eq!(next_power_of_two_above(0), None);
        assert_eq!(next_power_of_two_above(1), Some(2));
        assert_eq!(next_power_of_two_above(0x400), Some(0x800));
        assert_eq!(next_power_of_two_above(0x520), Some(0x800));
    }

    #[test]
    fn test_pad_to() {
        let mut buf = vec![1u8; 5];
        pad_to::<8>(&mut buf);
        assert_eq!(buf, [1, 1, 1, 1, 1, 0, 0, 0]);

        pad_to::<8>(&mut buf);
        assert_eq!(buf.len(), 8);
    }
}
