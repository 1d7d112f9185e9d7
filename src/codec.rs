//! Pass-through text encoding for synctex bytes.
//!
//! ASCII maps to itself and every high byte maps to a private-use code point,
//! so arbitrary bytes survive string processing and can be recovered exactly.

use crate::error::Error;

/// First private-use code point; byte `0x80` maps here.
const PRIVATE_USE_BASE: u32 = 0xF780;

/// Last private-use code point; byte `0xFF` maps here.
const PRIVATE_USE_LAST: u32 = 0xF7FF;

/// Decode raw synctex bytes into text. Never fails.
pub fn decode(bytes: &[u8]) -> String {
    return bytes.iter().copied().map(decode_byte).collect();
}

/// Map one byte to its pass-through character.
fn decode_byte(byte: u8) -> char {
    if byte.is_ascii() {
        return char::from(byte);
    }
    // 0xF780 has its low seven bits clear, so OR-ing the low bits adds them.
    let code_point = PRIVATE_USE_BASE | u32::from(byte & 0x7F);
    return char::from_u32(code_point).unwrap_or(char::REPLACEMENT_CHARACTER);
}

/// Encode pass-through text back into the exact bytes it was decoded from.
///
/// # Errors
///
/// Returns `Error::Encoding` for a code point outside ASCII and `U+F780..=U+F7FF`.
pub fn encode(text: &str) -> Result<Vec<u8>, Error> {
    return text
        .chars()
        .enumerate()
        .map(|(index, c)| return encode_char(c, index))
        .collect();
}

/// Map one pass-through character back to its byte.
///
/// # Errors
///
/// Returns `Error::Encoding` if `c` has no byte counterpart.
fn encode_char(c: char, index: usize) -> Result<u8, Error> {
    let code_point = u32::from(c);
    if c.is_ascii() {
        return u8::try_from(code_point).map_err(|_err| return Error::Encoding { code_point, index });
    }
    if !(PRIVATE_USE_BASE..=PRIVATE_USE_LAST).contains(&code_point) {
        return Err(Error::Encoding { code_point, index });
    }
    let low = u8::try_from(code_point & 0x7F).map_err(|_err| return Error::Encoding { code_point, index })?;
    return Ok(low | 0x80);
}
