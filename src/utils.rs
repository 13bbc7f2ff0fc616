use std::io::{self, Read};

use crate::error::HeaderError;

/// Reads until `buf` is full or the source is exhausted, returning the bytes read.
///
/// A return value smaller than `buf.len()` means end of data, not an error.
pub fn read_fully<R: Read + ?Sized>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Returns the trimmed text of a fixed-width ASCII header field.
///
/// Used for numeric fields. Fails with `MalformedField` if the field holds
/// non-ASCII bytes.
pub fn field_text<'a>(
    bytes: &'a [u8],
    start: usize,
    len: usize,
    name: &str,
) -> Result<&'a str, HeaderError> {
    let raw = &bytes[start..start + len];
    match std::str::from_utf8(raw) {
        Ok(text) if raw.is_ascii() => Ok(text.trim()),
        _ => Err(HeaderError::malformed(name, String::from_utf8_lossy(raw))),
    }
}

/// Trimmed text of a free-text header field; invalid bytes become U+FFFD
pub fn field_string(bytes: &[u8], start: usize, len: usize) -> String {
    String::from_utf8_lossy(&bytes[start..start + len]).trim().to_string()
}

/// 检查字符串是否为有效的整数
pub fn is_integer_number(s: &str) -> bool {
    let s = s.trim();
    let digits = s.strip_prefix(|c| c == '+' || c == '-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// 检查字符串是否为有效的数字（包括浮点数）
pub fn is_number(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.parse::<f64>().map_or(false, |v| v.is_finite())
}

/// Parses an integer header field, rejecting blanks and garbage.
///
/// Unlike C `atoi`, a field that does not hold a number is an error rather
/// than a silent zero.
pub fn parse_int_field(text: &str, name: &str) -> Result<i64, HeaderError> {
    if !is_integer_number(text) {
        return Err(HeaderError::malformed(name, text));
    }
    text.trim()
        .parse()
        .map_err(|_| HeaderError::malformed(name, text))
}

/// Parses a decimal header field
pub fn parse_float_field(text: &str, name: &str) -> Result<f64, HeaderError> {
    if !is_number(text) {
        return Err(HeaderError::malformed(name, text));
    }
    text.trim()
        .parse()
        .map_err(|_| HeaderError::malformed(name, text))
}
