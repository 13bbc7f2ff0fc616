//! Little-endian integer decoding for raw sample data.
//!
//! EDF stores samples as 16-bit and BDF as 24-bit two's-complement integers,
//! least significant byte first. Both widen to `i32` here.

/// Decodes `width` little-endian bytes starting at `offset` into a sign-extended `i32`.
///
/// The most significant byte of the field carries the sign, exactly as if the
/// field were a native `width`-byte signed integer.
///
/// # Panics
///
/// Panics if `width` is not 1, 2, 3 or 4, or if the field runs past the end of
/// `bytes`. The sample width is fixed once by the file variant, so either case
/// is a caller bug.
///
/// # Examples
///
/// ```rust
/// use edfread::endian::decode_le;
///
/// assert_eq!(decode_le(&[0xFF, 0xFF], 0, 2), -1);
/// assert_eq!(decode_le(&[0x00, 0x01, 0x00, 0x00], 1, 3), 1);
/// ```
#[inline]
pub fn decode_le(bytes: &[u8], offset: usize, width: usize) -> i32 {
    match width {
        1 => bytes[offset] as i8 as i32,
        2 => i16::from_le_bytes([bytes[offset], bytes[offset + 1]]) as i32,
        // 放到高 24 位再算术右移，完成符号扩展
        3 => i32::from_le_bytes([0, bytes[offset], bytes[offset + 1], bytes[offset + 2]]) >> 8,
        4 => i32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ]),
        _ => panic!("unsupported sample width {width}, expected 1, 2, 3 or 4"),
    }
}

/// Decodes `out.len()` consecutive values of `width` bytes each, starting at `byte_offset`.
pub fn decode_le_slice(bytes: &[u8], byte_offset: usize, out: &mut [i32], width: usize) {
    for (index, value) in out.iter_mut().enumerate() {
        *value = decode_le(bytes, byte_offset + index * width, width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_extension_per_width() {
        assert_eq!(decode_le(&[0xFF, 0xFF], 0, 2), -1);
        assert_eq!(decode_le(&[0x80], 0, 1), -128);
        assert_eq!(decode_le(&[0x01, 0x00, 0x00], 0, 3), 1);
        assert_eq!(decode_le(&[0xFF, 0xFF, 0xFF, 0xFF], 0, 4), -1);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(decode_le(&[0x7F], 0, 1), 127);
        assert_eq!(decode_le(&[0x00, 0x80], 0, 2), -32768);
        assert_eq!(decode_le(&[0xFF, 0x7F], 0, 2), 32767);
        assert_eq!(decode_le(&[0x00, 0x00, 0x80], 0, 3), -8_388_608);
        assert_eq!(decode_le(&[0xFF, 0xFF, 0x7F], 0, 3), 8_388_607);
        assert_eq!(decode_le(&[0x00, 0x00, 0x00, 0x80], 0, 4), i32::MIN);
    }

    #[test]
    fn test_matches_native_narrow_types() {
        for value in [-30000i16, -1, 0, 1, 456, -4564, 12345] {
            assert_eq!(decode_le(&value.to_le_bytes(), 0, 2), value as i32);
        }
        for value in [-8_000_000i32, -70000, -1, 0, 70000, 8_000_000] {
            let bytes = value.to_le_bytes();
            assert_eq!(decode_le(&bytes[..3], 0, 3), value);
        }
    }

    #[test]
    fn test_offset_respected() {
        let bytes = [0xAA, 0xBB, 0x34, 0x12];
        assert_eq!(decode_le(&bytes, 2, 2), 0x1234);
    }

    #[test]
    fn test_decode_slice() {
        let bytes = [0x00, 0x0A, 0x00, 0x14, 0x00, 0xF6, 0xFF];
        let mut out = [0i32; 3];
        decode_le_slice(&bytes, 1, &mut out, 2);
        assert_eq!(out, [10, 20, -10]);
    }

    #[test]
    #[should_panic(expected = "unsupported sample width")]
    fn test_invalid_width_panics() {
        decode_le(&[0, 0, 0, 0, 0], 0, 5);
    }
}
