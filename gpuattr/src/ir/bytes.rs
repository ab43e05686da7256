//! Escaped, double-quoted text form of arbitrary byte sequences.
//!
//! A backslash followed by two hex characters defines one byte, so `\00` is
//! the null byte and `\0A` a newline. Printable ASCII passes through as is,
//! except for the quote and the backslash.

use crate::error::AttrError;
use crate::error::Span;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

fn is_plain(byte: u8) -> bool {
    (0x20..=0x7E).contains(&byte) && byte != b'"' && byte != b'\\'
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|digit| digit as u8)
}

/// Convert bytes to a double-quoted literal such as `"BC\C0\DE"`.
pub fn encode_byte_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for &byte in bytes {
        if is_plain(byte) {
            out.push(byte as char);
        } else {
            out.push('\\');
            out.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            out.push(HEX_DIGITS[(byte & 0xF) as usize] as char);
        }
    }
    out.push('"');
    out
}

/// Convert a double-quoted literal back to the bytes it stands for.
///
/// Characters outside ASCII that are written directly inside the literal
/// decode to their UTF-8 bytes. Spans in the error are relative to `text`.
pub fn decode_byte_literal(text: &str) -> Result<Vec<u8>, AttrError> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'"') {
        let span = Span::new(0, bytes.len().min(1));
        return Err(AttrError::literal(span, "expected `\"` to open byte literal"));
    }
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 1;
    loop {
        match bytes.get(i) {
            None => {
                let span = Span::new(0, bytes.len());
                return Err(AttrError::literal(span, "unterminated byte literal"));
            }
            Some(b'"') => {
                i += 1;
                break;
            }
            Some(b'\\') => {
                let high = bytes.get(i + 1).copied().and_then(hex_value);
                let low = bytes.get(i + 2).copied().and_then(hex_value);
                match (high, low) {
                    (Some(high), Some(low)) => {
                        out.push((high << 4) | low);
                        i += 3;
                    }
                    _ => {
                        let span = Span::new(i, (i + 3).min(bytes.len()));
                        let msg = "expected two hex digits after `\\`";
                        return Err(AttrError::literal(span, msg));
                    }
                }
            }
            Some(&byte) => {
                out.push(byte);
                i += 1;
            }
        }
    }
    if i != bytes.len() {
        let span = Span::new(i, bytes.len());
        return Err(AttrError::literal(span, "unexpected text after byte literal"));
    }
    Ok(out)
}
