//! Byte-order helpers used by the numeric mutations.
//!
//! Multi-byte fields inside an input buffer are always read and written
//! through explicit little-endian accessors. The `swap*` functions then give
//! the big-endian interpretation of the same bytes.

/// Reverses the byte order of a 16-bit value.
#[inline]
pub fn swap16(v: u16) -> u16 {
    v.swap_bytes()
}

/// Reverses the byte order of a 32-bit value.
#[inline]
pub fn swap32(v: u32) -> u32 {
    v.swap_bytes()
}

/// Reverses the byte order of a 64-bit value.
#[inline]
pub fn swap64(v: u64) -> u64 {
    v.swap_bytes()
}

/// Reads a little-endian `u16` at `pos`.
///
/// # Panics
/// Panics if `pos + 2 > buf.len()`. Callers derive `pos` from the buffer length.
#[inline]
pub fn read_u16_le(buf: &[u8], pos: usize) -> u16 {
    let mut raw = [0u8; 2];
    raw.copy_from_slice(&buf[pos..pos + 2]);
    u16::from_le_bytes(raw)
}

/// Reads a little-endian `u32` at `pos`.
///
/// # Panics
/// Panics if `pos + 4 > buf.len()`.
#[inline]
pub fn read_u32_le(buf: &[u8], pos: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&buf[pos..pos + 4]);
    u32::from_le_bytes(raw)
}

/// Reads a little-endian `u64` at `pos`.
///
/// # Panics
/// Panics if `pos + 8 > buf.len()`.
#[inline]
pub fn read_u64_le(buf: &[u8], pos: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[pos..pos + 8]);
    u64::from_le_bytes(raw)
}

/// Writes `v` as little-endian bytes at `pos`.
///
/// # Panics
/// Panics if `pos + 2 > buf.len()`.
#[inline]
pub fn write_u16_le(buf: &mut [u8], pos: usize, v: u16) {
    buf[pos..pos + 2].copy_from_slice(&v.to_le_bytes());
}

/// Writes `v` as little-endian bytes at `pos`.
///
/// # Panics
/// Panics if `pos + 4 > buf.len()`.
#[inline]
pub fn write_u32_le(buf: &mut [u8], pos: usize, v: u32) {
    buf[pos..pos + 4].copy_from_slice(&v.to_le_bytes());
}

/// Writes `v` as little-endian bytes at `pos`.
///
/// # Panics
/// Panics if `pos + 8 > buf.len()`.
#[inline]
pub fn write_u64_le(buf: &mut [u8], pos: usize, v: u64) {
    buf[pos..pos + 8].copy_from_slice(&v.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap32_reverses_known_value() {
        assert_eq!(swap32(0x1234_5678), 0x7856_3412);
    }

    #[test]
    fn swap16_and_swap64_reverse_known_values() {
        assert_eq!(swap16(0xABCD), 0xCDAB);
        assert_eq!(swap64(0x0102_0304_0506_0708), 0x0807_0605_0403_0201);
    }

    #[test]
    fn swaps_are_involutions() {
        for v in [0u16, 1, 0x00FF, 0xFF00, 0x1234, u16::MAX] {
            assert_eq!(swap16(swap16(v)), v, "swap16 not involutive for {v:#x}");
        }
        for v in [0u32, 1, 0x1234_5678, 0x8000_0000, u32::MAX] {
            assert_eq!(swap32(swap32(v)), v, "swap32 not involutive for {v:#x}");
        }
        for v in [0u64, 1, 0xDEAD_BEEF_CAFE_F00D, u64::MAX] {
            assert_eq!(swap64(swap64(v)), v, "swap64 not involutive for {v:#x}");
        }
    }

    #[test]
    fn little_endian_accessors_work_at_unaligned_offsets() {
        let mut buf = vec![0u8; 11];
        write_u16_le(&mut buf, 1, 0xBEEF);
        assert_eq!(&buf[1..3], &[0xEF, 0xBE]);
        assert_eq!(read_u16_le(&buf, 1), 0xBEEF);

        write_u32_le(&mut buf, 3, 0x1234_5678);
        assert_eq!(&buf[3..7], &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(read_u32_le(&buf, 3), 0x1234_5678);

        write_u64_le(&mut buf, 3, 0x0102_0304_0506_0708);
        assert_eq!(read_u64_le(&buf, 3), 0x0102_0304_0506_0708);
        assert_eq!(buf[3], 0x08);
        assert_eq!(buf[10], 0x01);
        assert_eq!(read_u16_le(&buf, 1), 0xBEEF);
    }
}
