/// Bytes that carry meaning in MarkdownV2 and must be backslash-escaped
/// when they appear in literal text.
pub const RESERVED: &[u8] = b"_*[](){}#+-=.!><~|\\`";

pub fn is_reserved(byte: u8) -> bool {
    RESERVED.contains(&byte)
}

/// Append `raw` to `out`, escaping every reserved byte.
///
/// Works on bytes: none of the reserved bytes can appear inside a multi-byte
/// UTF-8 sequence, so non-ASCII text passes through untouched.
pub fn escape_into(out: &mut Vec<u8>, raw: &[u8]) {
    out.reserve(raw.len());
    for &byte in raw {
        if is_reserved(byte) {
            out.push(b'\\');
        }
        out.push(byte);
    }
}

pub fn escape(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    escape_into(&mut out, raw);
    out
}
