use memchr::memchr_iter;

use crate::error::Location;

// ASCII whitespace only. Bytes with the high bit set are UTF-8
// continuation or lead bytes and are never treated as whitespace.
pub(crate) fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

pub(crate) fn skip_whitespace(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && is_whitespace(bytes[pos]) {
        pos += 1;
    }
    pos
}

pub(crate) fn byte_at(bytes: &[u8], pos: usize) -> Option<u8> {
    bytes.get(pos).copied()
}

/// Resolve a byte offset to a 1-based line/column pair by counting
/// newlines up to it. Offsets past the end clamp to the end.
pub(crate) fn locate(input: &str, offset: usize) -> Location {
    let offset = offset.min(input.len());
    let bytes = input.as_bytes();
    let mut line = 1;
    let mut line_start = 0;
    for idx in memchr_iter(b'\n', &bytes[..offset]) {
        line += 1;
        line_start = idx + 1;
    }
    Location {
        offset,
        line,
        column: offset - line_start + 1,
    }
}
