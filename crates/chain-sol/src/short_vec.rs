//! Solana's compact-u16 length prefix ("short vec").
//!
//! Seven value bits per byte, high bit set while more bytes follow:
//!
//! - 0..=0x7f        -> 1 byte
//! - 0x80..=0x3fff   -> 2 bytes
//! - 0x4000..=0xffff -> 3 bytes

use crate::error::SolError;

const MAX_ENCODED_LEN: usize = 3;

pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_ENCODED_LEN);
    write_compact_u16(&mut out, value);
    out
}

/// Append the compact-u16 encoding of `value` to `buf`.
pub fn write_compact_u16(buf: &mut Vec<u8>, value: u16) {
    let mut rest = value as u32;
    loop {
        let mut byte = (rest & 0x7f) as u8;
        rest >>= 7;
        if rest > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if rest == 0 {
            break;
        }
    }
}

/// Append a collection length, failing when it does not fit a compact-u16.
pub fn write_len(buf: &mut Vec<u8>, len: usize, what: &str) -> Result<(), SolError> {
    let value = u16::try_from(len)
        .map_err(|_| SolError::SerializationError(format!("too many {what}: {len}")))?;
    write_compact_u16(buf, value);
    Ok(())
}

/// Decode a compact-u16 from the front of `data`.
///
/// Returns `(value, bytes_consumed)`.
pub fn decode_compact_u16(data: &[u8]) -> Result<(u16, usize), SolError> {
    let mut value: u32 = 0;

    for (i, byte) in data.iter().take(MAX_ENCODED_LEN).enumerate() {
        value |= ((byte & 0x7f) as u32) << (7 * i);
        if byte & 0x80 == 0 {
            return u16::try_from(value)
                .map(|v| (v, i + 1))
                .map_err(|_| SolError::SerializationError("compact-u16 value overflow".into()));
        }
    }

    if data.len() >= MAX_ENCODED_LEN {
        Err(SolError::SerializationError(
            "compact-u16 continuation past third byte".into(),
        ))
    } else {
        Err(SolError::SerializationError(
            "unexpected end of data while decoding compact-u16".into(),
        ))
    }
}
