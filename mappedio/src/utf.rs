//! Length-prefixed modified UTF-8.
//!
//! A string is stored as a 2-byte big-endian byte count followed by its
//! UTF-16 code units, each encoded on its own:
//!
//! | code unit              | bytes                        |
//! |------------------------|------------------------------|
//! | `0x0001..=0x007F`      | `0xxxxxxx`                   |
//! | `0x0000`, `0x0080..=0x07FF` | `110xxxxx 10xxxxxx`     |
//! | `0x0800..=0xFFFF`      | `1110xxxx 10xxxxxx 10xxxxxx` |
//!
//! Characters outside the basic multilingual plane are written as two
//! surrogate halves of three bytes each, and NUL never appears as a zero byte.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{MappedIoError, Result};
use crate::stream::{DataInput, DataOutput};

/// Largest body the 2-byte length prefix can describe.
pub const MAX_ENCODED_LEN: usize = u16::MAX as usize;

/// Size of the length prefix.
pub const LENGTH_PREFIX: usize = 2;

fn unit_len(unit: u16) -> usize {
    match unit {
        0x0001..=0x007F => 1,
        0x0000 | 0x0080..=0x07FF => 2,
        _ => 3,
    }
}

/// Number of body bytes `value` encodes to, excluding the length prefix.
pub fn encoded_len(value: &str) -> usize {
    value.encode_utf16().map(unit_len).sum()
}

/// Encodes `value` including its length prefix.
pub fn encode(value: &str) -> Result<Vec<u8>> {
    encode_from(value.encode_utf16())
}

/// Encodes raw UTF-16 code units, which may include unpaired surrogates,
/// including the length prefix.
pub fn encode_units(units: &[u16]) -> Result<Vec<u8>> {
    encode_from(units.iter().copied())
}

fn encode_from<I: Iterator<Item = u16> + Clone>(units: I) -> Result<Vec<u8>> {
    let length: usize = units.clone().map(unit_len).sum();
    if length > MAX_ENCODED_LEN {
        return Err(MappedIoError::EncodingTooLong { length });
    }

    let mut out = vec![0u8; LENGTH_PREFIX];
    out.reserve(length);
    BigEndian::write_u16(&mut out, length as u16);

    for unit in units {
        match unit_len(unit) {
            1 => out.push(unit as u8),
            2 => {
                out.push(0xC0 | ((unit >> 6) & 0x1F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) & 0x0F) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    debug_assert_eq!(out.len(), LENGTH_PREFIX + length);
    Ok(out)
}

fn malformed(offset: usize, reason: &'static str) -> MappedIoError {
    MappedIoError::MalformedEncoding { offset, reason }
}

/// Payload bits of the continuation byte `n` positions after `lead`.
fn continuation(bytes: &[u8], lead: usize, n: usize) -> Result<u16> {
    let idx = lead + n;
    let byte = *bytes
        .get(idx)
        .ok_or_else(|| malformed(lead, "partial character at end"))?;
    if byte & 0xC0 != 0x80 {
        return Err(malformed(idx, "invalid continuation byte"));
    }
    Ok((byte & 0x3F) as u16)
}

/// Decodes a body (without its length prefix) into UTF-16 code units.
///
/// Unpaired surrogates are kept as they are.
pub fn decode_units(bytes: &[u8]) -> Result<Vec<u16>> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let lead = bytes[i];
        match lead >> 4 {
            0x0..=0x7 => {
                units.push(lead as u16);
                i += 1;
            }
            0xC | 0xD => {
                let b1 = continuation(bytes, i, 1)?;
                units.push(((lead as u16 & 0x1F) << 6) | b1);
                i += 2;
            }
            0xE => {
                let b1 = continuation(bytes, i, 1)?;
                let b2 = continuation(bytes, i, 2)?;
                units.push(((lead as u16 & 0x0F) << 12) | (b1 << 6) | b2);
                i += 3;
            }
            _ => return Err(malformed(i, "invalid leading byte")),
        }
    }
    Ok(units)
}

/// Decodes a body (without its length prefix) into a `String`.
///
/// Fails on unpaired surrogates, which a `String` cannot hold; use
/// [`decode_units`] to read those.
pub fn decode(bytes: &[u8]) -> Result<String> {
    let units = decode_units(bytes)?;
    String::from_utf16(&units).map_err(|_| malformed(bytes.len(), "unpaired surrogate"))
}

fn read_body<R: DataInput + ?Sized>(input: &mut R) -> Result<Vec<u8>> {
    let length = input.read_unsigned_short()? as usize;
    let mut body = vec![0u8; length];
    input.read_fully(&mut body)?;
    Ok(body)
}

/// Reads a length-prefixed string from `input`.
pub fn read_utf<R: DataInput + ?Sized>(input: &mut R) -> Result<String> {
    decode(&read_body(input)?)
}

/// Reads a length-prefixed string from `input` as UTF-16 code units.
pub fn read_utf_units<R: DataInput + ?Sized>(input: &mut R) -> Result<Vec<u16>> {
    decode_units(&read_body(input)?)
}

/// Writes `value` to `out` as a length-prefixed string.
///
/// The whole encoding is produced before anything is written, so a string
/// that is too long leaves `out` untouched.
pub fn write_utf<W: DataOutput + ?Sized>(value: &str, out: &mut W) -> Result<()> {
    let bytes = encode(value)?;
    out.write_all(&bytes)
}

/// Writes raw UTF-16 code units to `out` as a length-prefixed string.
pub fn write_utf_units<W: DataOutput + ?Sized>(units: &[u16], out: &mut W) -> Result<()> {
    let bytes = encode_units(units)?;
    out.write_all(&bytes)
}
