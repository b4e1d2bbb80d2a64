use crate::error::{MappedIoError, Result, check_range};
use crate::utf;

/// Explicit positioning and size inspection over a bounded byte range.
pub trait RandomAccessIo {
    /// Offset of the next byte to be read or written.
    fn position(&self) -> u64;

    /// Moves to `position`.
    ///
    /// Setting the current position again always succeeds. Any other value
    /// must lie in `[0, size]`; `size` itself is the terminal position from
    /// which nothing more can be read or written.
    fn set_position(&mut self, position: u64) -> Result<()>;

    /// Length of the range in bytes.
    fn size(&self) -> u64;

    fn remaining(&self) -> u64 {
        self.size().saturating_sub(self.position())
    }

    /// Moves the position by `delta` bytes in either direction.
    fn seek_relative(&mut self, delta: i64) -> Result<()> {
        let target = self.position() as i128 + delta as i128;
        if target < 0 || target > self.size() as i128 {
            return Err(MappedIoError::IllegalPosition {
                position: target,
                size: self.size(),
            });
        }
        self.set_position(target as u64)
    }
}

/// Typed big-endian reads.
///
/// Each read starts at the current position, advances it by the width of
/// the value and fails with [`MappedIoError::EndOfSegment`] instead of
/// crossing the end of the range.
pub trait DataInput {
    /// Fills `dst` completely, or fails without reading anything.
    fn read_fully(&mut self, dst: &mut [u8]) -> Result<()>;

    /// Fills `dst[offset..offset + length]`, or fails without reading anything.
    fn read_fully_range(&mut self, dst: &mut [u8], offset: usize, length: usize) -> Result<()> {
        check_range(offset, length, dst.len())?;
        self.read_fully(&mut dst[offset..offset + length])
    }

    /// Skips up to `count` bytes and returns how many were skipped.
    fn skip_bytes(&mut self, count: usize) -> usize;

    fn read_byte(&mut self) -> Result<i8>;

    fn read_unsigned_byte(&mut self) -> Result<u8> {
        self.read_byte().map(|b| b as u8)
    }

    fn read_boolean(&mut self) -> Result<bool> {
        Ok(self.read_unsigned_byte()? == 1)
    }

    fn read_short(&mut self) -> Result<i16>;

    fn read_unsigned_short(&mut self) -> Result<u16> {
        self.read_short().map(|s| s as u16)
    }

    /// Reads one UTF-16 code unit.
    fn read_char(&mut self) -> Result<u16>;

    fn read_int(&mut self) -> Result<i32>;

    fn read_long(&mut self) -> Result<i64>;

    fn read_float(&mut self) -> Result<f32>;

    fn read_double(&mut self) -> Result<f64>;

    /// Line-oriented text has no byte layout in this format.
    fn read_line(&mut self) -> Result<String> {
        Err(MappedIoError::Unsupported("read_line"))
    }

    /// Reads a length-prefixed modified UTF-8 string.
    fn read_utf(&mut self) -> Result<String> {
        utf::read_utf(self)
    }

    /// Reads a length-prefixed modified UTF-8 string as UTF-16 code units,
    /// keeping unpaired surrogates.
    fn read_utf_units(&mut self) -> Result<Vec<u16>> {
        utf::read_utf_units(self)
    }
}

/// Typed big-endian writes, the mirror of [`DataInput`].
pub trait DataOutput {
    /// Writes all of `bytes`, or fails without writing anything.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    fn write_range(&mut self, bytes: &[u8], offset: usize, length: usize) -> Result<()> {
        check_range(offset, length, bytes.len())?;
        self.write_all(&bytes[offset..offset + length])
    }

    /// Writes a single raw byte.
    fn write_u8(&mut self, byte: u8) -> Result<()> {
        self.write_all(&[byte])
    }

    fn write_boolean(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    fn write_byte(&mut self, value: i8) -> Result<()> {
        self.write_u8(value as u8)
    }

    fn write_short(&mut self, value: i16) -> Result<()>;

    /// Writes one UTF-16 code unit.
    fn write_char(&mut self, value: u16) -> Result<()>;

    fn write_int(&mut self, value: i32) -> Result<()>;

    fn write_long(&mut self, value: i64) -> Result<()>;

    fn write_float(&mut self, value: f32) -> Result<()>;

    fn write_double(&mut self, value: f64) -> Result<()>;

    /// Low-byte-per-char text is not part of this format.
    fn write_string_bytes(&mut self, _value: &str) -> Result<()> {
        Err(MappedIoError::Unsupported("write_string_bytes"))
    }

    /// Raw UTF-16 output is not part of this format.
    fn write_chars(&mut self, _value: &str) -> Result<()> {
        Err(MappedIoError::Unsupported("write_chars"))
    }

    /// Writes `value` as length-prefixed modified UTF-8.
    fn write_utf(&mut self, value: &str) -> Result<()> {
        utf::write_utf(value, self)
    }

    /// Writes UTF-16 code units as length-prefixed modified UTF-8.
    fn write_utf_units(&mut self, units: &[u16]) -> Result<()> {
        utf::write_utf_units(units, self)
    }
}

/// A positioned, bounded byte stream supporting both reads and writes.
pub trait BinaryStream: DataInput + DataOutput + RandomAccessIo {}

impl<T: DataInput + DataOutput + RandomAccessIo + ?Sized> BinaryStream for T {}
