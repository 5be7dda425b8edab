//! UTF-16 offset helpers
//!
//! The editor reports highlight and match positions in UTF-16 code units
//! (browser string indices). Rust strings are indexed by UTF-8 bytes, so every
//! span crossing that boundary goes through these conversions.

/// Length of `s` in UTF-16 code units
pub fn utf16_len(s: &str) -> usize {
    s.chars().map(char::len_utf16).sum()
}

/// Convert a UTF-8 byte offset into a UTF-16 offset
///
/// `byte` must lie on a char boundary of `s` (as returned by `str` and
/// `regex` APIs); offsets past the end saturate to the UTF-16 length.
pub fn byte_to_utf16(s: &str, byte: usize) -> usize {
    let byte = byte.min(s.len());
    utf16_len(&s[..byte])
}

/// Convert a UTF-16 offset into a UTF-8 byte offset
///
/// Returns `None` if `unit` is past the end of `s` or falls between the two
/// halves of a surrogate pair.
pub fn utf16_to_byte(s: &str, unit: usize) -> Option<usize> {
    let mut units = 0;
    for (byte, ch) in s.char_indices() {
        if units == unit {
            return Some(byte);
        }
        units += ch.len_utf16();
        if units > unit {
            return None;
        }
    }
    (units == unit).then_some(s.len())
}
