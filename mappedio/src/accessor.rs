use std::io;
use std::ops::Range;

use tracing::{debug, trace};

use crate::byte_store::ByteStore;
use crate::error::{MappedIoError, Result};
use crate::stream::{DataInput, DataOutput, RandomAccessIo};
use crate::utf;
use crate::width::Primitive;
use crate::width::sealed::Codec;

/// A byte range `[base, base + len)` inside a buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Segment {
    pub base: u64,
    pub len: u64,
}

impl Segment {
    pub fn new(base: u64, len: u64) -> Self {
        Self { base, len }
    }

    /// One past the last byte, or `None` on overflow.
    pub fn end(&self) -> Option<u64> {
        self.base.checked_add(self.len)
    }

    fn out_of_bounds(&self, capacity: usize) -> MappedIoError {
        MappedIoError::SegmentOutOfBounds {
            base: self.base,
            length: self.len,
            capacity,
        }
    }

    fn check_fits(&self, capacity: usize) -> Result<()> {
        match self.end() {
            Some(end) if end <= capacity as u64 => Ok(()),
            _ => {
                debug!(base = self.base, len = self.len, capacity, "segment does not fit buffer");
                Err(self.out_of_bounds(capacity))
            }
        }
    }
}

/// Random access reads and writes of big-endian primitives within one
/// segment of a byte store.
///
/// The accessor keeps its own logical position, relative to the start of
/// the segment, and turns it into an absolute offset on every access; the
/// store carries no cursor of its own. One accessor can be moved over many
/// segments of the same store with [`rebind`](Self::rebind), or handed a
/// new store with [`reset`](Self::reset).
///
/// Every read and write is checked against the segment bounds, so a
/// segment can never spill into its neighbours.
///
/// ```
/// use mappedio::{DataInput, DataOutput, MappedIo, RandomAccessIo};
///
/// let mut store = vec![0u8; 32];
/// let mut io = MappedIo::new();
/// io.reset(&mut store, 16, 16)?;
/// io.write_int(0x0102_0304)?;
/// io.write_utf("slot")?;
/// io.set_position(0)?;
/// assert_eq!(io.read_int()?, 0x0102_0304);
/// assert_eq!(io.read_utf()?, "slot");
/// drop(io);
/// assert_eq!(&store[16..20], &[1, 2, 3, 4]);
/// # Ok::<(), mappedio::MappedIoError>(())
/// ```
#[derive(Debug)]
pub struct MappedIo<B> {
    buffer: Option<B>,
    segment: Segment,
    position: u64,
}

impl<B> Default for MappedIo<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> MappedIo<B> {
    /// Creates an accessor that is not bound to any store yet.
    pub const fn new() -> Self {
        Self {
            buffer: None,
            segment: Segment { base: 0, len: 0 },
            position: 0,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn segment(&self) -> Segment {
        self.segment
    }

    pub fn buffer(&self) -> Option<&B> {
        self.buffer.as_ref()
    }

    /// Consumes the accessor, handing back the store it was bound to.
    pub fn into_inner(self) -> Option<B> {
        self.buffer
    }
}

impl<B: ByteStore> MappedIo<B> {
    /// Creates an accessor bound to `length` bytes of `buffer` starting at `base`.
    pub fn with_buffer(buffer: B, base: u64, length: u64) -> Result<Self> {
        let mut io = Self::new();
        io.reset(buffer, base, length)?;
        Ok(io)
    }

    /// Binds the accessor to `length` bytes of `buffer` starting at `base`
    /// and moves to position 0.
    ///
    /// If the segment does not fit, the previous binding is kept and
    /// `buffer` is dropped.
    pub fn reset(&mut self, buffer: B, base: u64, length: u64) -> Result<()> {
        let segment = Segment::new(base, length);
        segment.check_fits(buffer.as_ref().len())?;
        trace!(base, length, "binding accessor");
        self.buffer = Some(buffer);
        self.segment = segment;
        self.position = 0;
        Ok(())
    }

    /// Moves the accessor to another segment of the store it is bound to.
    pub fn rebind(&mut self, base: u64, length: u64) -> Result<()> {
        let capacity = self.bytes()?.len();
        let segment = Segment::new(base, length);
        segment.check_fits(capacity)?;
        trace!(base, length, "rebinding accessor");
        self.segment = segment;
        self.position = 0;
        Ok(())
    }

    /// Persists pending writes of the underlying store.
    pub fn flush(&mut self) -> Result<()> {
        match self.buffer.as_mut() {
            Some(buffer) => Ok(buffer.flush()?),
            None => Err(MappedIoError::Unbound),
        }
    }

    /// Reads any [`Primitive`] at the current position.
    pub fn read_primitive<P: Primitive>(&mut self) -> Result<P> {
        let range = self.range(P::WIDTH)?;
        let value = P::decode(&self.bytes()?[range]);
        self.position += P::WIDTH as u64;
        Ok(value)
    }

    /// Writes any [`Primitive`] at the current position.
    pub fn write_primitive<P: Primitive>(&mut self, value: P) -> Result<()> {
        let range = self.range(P::WIDTH)?;
        value.encode(&mut self.bytes_mut()?[range]);
        self.position += P::WIDTH as u64;
        Ok(())
    }

    fn bytes(&self) -> Result<&[u8]> {
        self.buffer
            .as_ref()
            .map(|b| b.as_ref())
            .ok_or(MappedIoError::Unbound)
    }

    fn bytes_mut(&mut self) -> Result<&mut [u8]> {
        self.buffer
            .as_mut()
            .map(|b| b.as_mut())
            .ok_or(MappedIoError::Unbound)
    }

    /// Absolute byte range of the next `len` bytes.
    ///
    /// The segment was checked against the store when it was bound, so a
    /// range inside the segment is always inside the store.
    fn range(&self, len: usize) -> Result<Range<usize>> {
        if self.buffer.is_none() {
            return Err(MappedIoError::Unbound);
        }
        let requested = len as u64;
        if requested > self.remaining() {
            return Err(MappedIoError::EndOfSegment {
                position: self.position,
                requested,
                size: self.segment.len,
            });
        }
        let start = (self.segment.base + self.position) as usize;
        Ok(start..start + len)
    }
}

impl<B: ByteStore> RandomAccessIo for MappedIo<B> {
    fn position(&self) -> u64 {
        self.position
    }

    fn set_position(&mut self, position: u64) -> Result<()> {
        if position == self.position {
            return Ok(());
        }
        if position > self.segment.len {
            debug!(position, size = self.segment.len, "rejected position");
            return Err(MappedIoError::IllegalPosition {
                position: position as i128,
                size: self.segment.len,
            });
        }
        self.position = position;
        Ok(())
    }

    fn size(&self) -> u64 {
        self.segment.len
    }
}

impl<B: ByteStore> DataInput for MappedIo<B> {
    fn read_fully(&mut self, dst: &mut [u8]) -> Result<()> {
        if dst.is_empty() {
            return Ok(());
        }
        let range = self.range(dst.len())?;
        dst.copy_from_slice(&self.bytes()?[range]);
        self.position += dst.len() as u64;
        Ok(())
    }

    fn skip_bytes(&mut self, count: usize) -> usize {
        let skip = self.remaining().min(count as u64);
        self.position += skip;
        skip as usize
    }

    fn read_byte(&mut self) -> Result<i8> {
        self.read_primitive()
    }

    fn read_unsigned_byte(&mut self) -> Result<u8> {
        self.read_primitive()
    }

    fn read_boolean(&mut self) -> Result<bool> {
        self.read_primitive()
    }

    fn read_short(&mut self) -> Result<i16> {
        self.read_primitive()
    }

    fn read_unsigned_short(&mut self) -> Result<u16> {
        self.read_primitive()
    }

    fn read_char(&mut self) -> Result<u16> {
        self.read_primitive()
    }

    fn read_int(&mut self) -> Result<i32> {
        self.read_primitive()
    }

    fn read_long(&mut self) -> Result<i64> {
        self.read_primitive()
    }

    fn read_float(&mut self) -> Result<f32> {
        self.read_primitive()
    }

    fn read_double(&mut self) -> Result<f64> {
        self.read_primitive()
    }

    /// Reads a length-prefixed string, leaving the position untouched on failure.
    fn read_utf(&mut self) -> Result<String> {
        let start = self.position;
        utf::read_utf(self).inspect_err(|_| self.position = start)
    }

    /// Reads length-prefixed code units, leaving the position untouched on failure.
    fn read_utf_units(&mut self) -> Result<Vec<u16>> {
        let start = self.position;
        utf::read_utf_units(self).inspect_err(|_| self.position = start)
    }
}

impl<B: ByteStore> DataOutput for MappedIo<B> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let range = self.range(bytes.len())?;
        self.bytes_mut()?[range].copy_from_slice(bytes);
        self.position += bytes.len() as u64;
        Ok(())
    }

    fn write_u8(&mut self, byte: u8) -> Result<()> {
        self.write_primitive(byte)
    }

    fn write_boolean(&mut self, value: bool) -> Result<()> {
        self.write_primitive(value)
    }

    fn write_byte(&mut self, value: i8) -> Result<()> {
        self.write_primitive(value)
    }

    fn write_short(&mut self, value: i16) -> Result<()> {
        self.write_primitive(value)
    }

    fn write_char(&mut self, value: u16) -> Result<()> {
        self.write_primitive(value)
    }

    fn write_int(&mut self, value: i32) -> Result<()> {
        self.write_primitive(value)
    }

    fn write_long(&mut self, value: i64) -> Result<()> {
        self.write_primitive(value)
    }

    fn write_float(&mut self, value: f32) -> Result<()> {
        self.write_primitive(value)
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.write_primitive(value)
    }
}

impl<B: ByteStore> io::Read for MappedIo<B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.is_bound() {
            return Err(MappedIoError::Unbound.into());
        }
        let n = self.remaining().min(buf.len() as u64) as usize;
        self.read_fully(&mut buf[..n])?;
        Ok(n)
    }
}

impl<B: ByteStore> io::Write for MappedIo<B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.is_bound() {
            return Err(MappedIoError::Unbound.into());
        }
        let n = self.remaining().min(buf.len() as u64) as usize;
        DataOutput::write_all(self, &buf[..n])?;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        MappedIo::flush(self).map_err(io::Error::from)
    }
}

impl<B: ByteStore> io::Seek for MappedIo<B> {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let delta = match pos {
            io::SeekFrom::Start(p) => p as i128 - self.position as i128,
            io::SeekFrom::End(d) => self.segment.len as i128 + d as i128 - self.position as i128,
            io::SeekFrom::Current(d) => d as i128,
        };
        let target = self.position as i128 + delta;
        if target < 0 || target > self.segment.len as i128 {
            return Err(MappedIoError::IllegalPosition {
                position: target,
                size: self.segment.len,
            }
            .into());
        }
        self.set_position(target as u64)?;
        Ok(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_store::MMapFile;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn segment(len: u64) -> MappedIo<Vec<u8>> {
        MappedIo::with_buffer(vec![0u8; len as usize], 0, len).unwrap()
    }

    macro_rules! round_trip_tests {
        ($($name:ident: $value:expr, $width:expr;)*) => {
            paste::paste! {
                $(
                    #[test]
                    fn [<test_round_trip_ $name>]() {
                        let mut io = segment(32);
                        io.set_position(3).unwrap();
                        io.[<write_ $name>]($value).unwrap();
                        assert_eq!(io.position(), 3 + $width);

                        io.set_position(3).unwrap();
                        assert_eq!(io.[<read_ $name>]().unwrap(), $value);
                        assert_eq!(io.position(), 3 + $width);
                    }
                )*
            }
        };
    }

    round_trip_tests! {
        boolean: true, 1;
        byte: -5i8, 1;
        short: -12_345i16, 2;
        char: 0x20ACu16, 2;
        int: 0x0102_0304i32, 4;
        long: i64::MIN + 7, 8;
        float: 3.5f32, 4;
        double: -0.125f64, 8;
    }

    #[test]
    fn test_primitives_up_to_segment_end() {
        let mut store = vec![0x11u8; 20];
        let mut io = MappedIo::with_buffer(&mut store, 4, 12).unwrap();
        io.write_primitive(0xa1a2_a3a4u32).unwrap();
        io.write_primitive(u64::MAX - 1).unwrap();
        assert_eq!(io.remaining(), 0);
        assert!(matches!(
            io.write_primitive(1u8),
            Err(MappedIoError::EndOfSegment { position: 12, requested: 1, size: 12 })
        ));
        assert!(io.read_primitive::<u8>().is_err());

        io.set_position(4).unwrap();
        assert_eq!(io.read_primitive::<u64>().unwrap(), u64::MAX - 1);
        io.set_position(0).unwrap();
        assert_eq!(io.read_primitive::<u32>().unwrap(), 0xa1a2_a3a4);
        drop(io);
        assert_eq!(&store[..4], &[0x11; 4]);
        assert_eq!(&store[16..], &[0x11; 4]);
    }

    #[test]
    fn test_unbound_accessor() {
        let mut io: MappedIo<Vec<u8>> = MappedIo::new();
        assert!(!io.is_bound());
        assert_eq!(io.position(), 0);
        assert_eq!(io.size(), 0);
        assert_eq!(io.skip_bytes(10), 0);
        assert!(io.set_position(0).is_ok());
        assert!(matches!(io.read_int(), Err(MappedIoError::Unbound)));
        assert!(matches!(io.write_int(1), Err(MappedIoError::Unbound)));
        assert!(matches!(io.rebind(0, 0), Err(MappedIoError::Unbound)));
        assert!(matches!(io.flush(), Err(MappedIoError::Unbound)));
        assert!(io::Read::read(&mut io, &mut [0u8; 4]).is_err());
        assert!(io.into_inner().is_none());
    }

    #[test]
    fn test_int_then_short_scenario() {
        let mut io = segment(16);
        io.set_position(0).unwrap();
        io.write_int(0x0102_0304).unwrap();
        io.set_position(4).unwrap();
        io.write_short(0x0506).unwrap();
        assert_eq!(io.position(), 6);

        io.set_position(0).unwrap();
        assert_eq!(io.read_int().unwrap(), 0x0102_0304);
        io.set_position(4).unwrap();
        assert_eq!(io.read_short().unwrap(), 0x0506);

        let buffer = io.into_inner().unwrap();
        assert_eq!(&buffer[..6], &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_write_past_segment_is_rejected() {
        let mut store = vec![0xeeu8; 8];
        let mut io = MappedIo::with_buffer(&mut store, 0, 4).unwrap();
        assert!(matches!(
            io.write_long(1),
            Err(MappedIoError::EndOfSegment { position: 0, requested: 8, size: 4 })
        ));
        assert_eq!(io.position(), 0);

        io.write_short(0x0102).unwrap();
        assert!(matches!(
            io.write_int(7),
            Err(MappedIoError::EndOfSegment { .. })
        ));
        assert!(matches!(
            DataOutput::write_all(&mut io, &[1, 2, 3]),
            Err(MappedIoError::EndOfSegment { .. })
        ));
        assert_eq!(io.position(), 2);
        drop(io);
        assert_eq!(store, [1, 2, 0xee, 0xee, 0xee, 0xee, 0xee, 0xee]);
    }

    #[test]
    fn test_read_past_segment_is_rejected() {
        let mut io = segment(6);
        io.set_position(3).unwrap();
        assert!(matches!(
            io.read_int(),
            Err(MappedIoError::EndOfSegment { position: 3, requested: 4, size: 6 })
        ));
        assert_eq!(io.position(), 3);
        assert_eq!(io.read_short().unwrap(), 0);
        assert_eq!(io.read_byte().unwrap(), 0);
        assert!(io.read_byte().is_err());
        assert_eq!(io.position(), 6);
    }

    #[test]
    fn test_set_position_rules() {
        let mut io = segment(8);
        io.skip_bytes(3);
        assert!(io.set_position(3).is_ok());
        assert_eq!(io.position(), 3);

        assert!(matches!(
            io.set_position(9),
            Err(MappedIoError::IllegalPosition { position: 9, size: 8 })
        ));
        assert_eq!(io.position(), 3);

        // the end of the segment is a valid resting place
        io.set_position(8).unwrap();
        assert_eq!(io.remaining(), 0);
        assert!(matches!(
            io.read_byte(),
            Err(MappedIoError::EndOfSegment { .. })
        ));
        assert!(io.write_u8(1).is_err());

        io.set_position(0).unwrap();
        assert!(matches!(
            io.seek_relative(-1),
            Err(MappedIoError::IllegalPosition { position: -1, size: 8 })
        ));
        io.seek_relative(5).unwrap();
        io.seek_relative(-2).unwrap();
        assert_eq!(io.position(), 3);
        assert!(io.seek_relative(6).is_err());
    }

    #[test]
    fn test_skip_bytes_clamps() {
        let mut io = segment(10);
        io.set_position(4).unwrap();
        assert_eq!(io.skip_bytes(2), 2);
        assert_eq!(io.position(), 6);
        assert_eq!(io.skip_bytes(100), 4);
        assert_eq!(io.position(), 10);
        assert_eq!(io.skip_bytes(1), 0);
        assert_eq!(io.position(), 10);
    }

    #[test]
    fn test_read_fully() {
        let mut store: Vec<u8> = (0..16).collect();
        let mut io = MappedIo::with_buffer(&mut store, 4, 8).unwrap();

        let mut dst = [0u8; 4];
        io.read_fully(&mut dst).unwrap();
        assert_eq!(dst, [4, 5, 6, 7]);
        assert_eq!(io.position(), 4);

        let mut big = [0xffu8; 10];
        assert!(matches!(
            io.read_fully(&mut big),
            Err(MappedIoError::EndOfSegment { position: 4, requested: 10, size: 8 })
        ));
        assert_eq!(io.position(), 4);
        assert_eq!(big, [0xff; 10]);

        io.read_fully(&mut [0u8; 0]).unwrap();
        assert_eq!(io.position(), 4);

        io.read_fully_range(&mut big, 6, 3).unwrap();
        assert_eq!(&big[6..9], &[8, 9, 10]);
        assert_eq!(io.position(), 7);

        assert!(matches!(
            io.read_fully_range(&mut big, 9, 2),
            Err(MappedIoError::InvalidRange { offset: 9, length: 2, capacity: 10 })
        ));
        assert_eq!(io.position(), 7);
    }

    #[test]
    fn test_raw_writes() {
        let mut io = segment(8);
        io.write_u8(0xab).unwrap();
        DataOutput::write_all(&mut io, &[1, 2]).unwrap();
        io.write_range(&[9, 8, 7, 6], 1, 2).unwrap();
        assert_eq!(io.position(), 5);
        assert!(io.write_range(&[1, 2], 1, 2).is_err());

        io.set_position(0).unwrap();
        assert_eq!(io.read_unsigned_byte().unwrap(), 0xab);
        assert_eq!(io.read_byte().unwrap(), 1);
        assert_eq!(io.read_byte().unwrap(), 2);
        assert_eq!(io.read_unsigned_short().unwrap(), 0x0807);
    }

    #[test]
    fn test_unsigned_and_boolean_reads() {
        let store = vec![0xff, 0xfe, 0x02, 0x01, 0x00];
        let mut io = MappedIo::with_buffer(store, 0, 5).unwrap();
        assert_eq!(io.read_unsigned_short().unwrap(), 0xfffe);
        io.set_position(0).unwrap();
        assert_eq!(io.read_short().unwrap(), -2);
        assert!(!io.read_boolean().unwrap());
        assert!(io.read_boolean().unwrap());
        assert!(!io.read_boolean().unwrap());
    }

    #[test]
    fn test_unsupported_operations() {
        let mut io = segment(8);
        assert!(matches!(io.read_line(), Err(MappedIoError::Unsupported(_))));
        assert!(matches!(
            io.write_string_bytes("abc"),
            Err(MappedIoError::Unsupported(_))
        ));
        assert!(matches!(
            io.write_chars("abc"),
            Err(MappedIoError::Unsupported(_))
        ));
        assert_eq!(io.position(), 0);
    }

    #[test]
    fn test_segments_are_isolated() {
        let mut store = vec![0u8; 24];
        let mut io = MappedIo::new();
        io.reset(&mut store, 0, 8).unwrap();

        for slot in 0..3u64 {
            io.rebind(slot * 8, 8).unwrap();
            assert_eq!(io.position(), 0);
            io.write_long(slot as i64 + 1).unwrap();
            assert!(io.write_u8(0).is_err());
        }

        io.rebind(8, 8).unwrap();
        assert_eq!(io.read_long().unwrap(), 2);
        drop(io);

        assert_eq!(&store[..8], &1i64.to_be_bytes());
        assert_eq!(&store[8..16], &2i64.to_be_bytes());
        assert_eq!(&store[16..], &3i64.to_be_bytes());
    }

    #[test]
    fn test_reset_validates_segment() {
        let mut io = MappedIo::with_buffer(vec![1u8; 8], 2, 4).unwrap();
        io.skip_bytes(2);

        assert!(matches!(
            io.reset(vec![0u8; 8], 6, 4),
            Err(MappedIoError::SegmentOutOfBounds { base: 6, length: 4, capacity: 8 })
        ));
        // previous binding survives
        assert_eq!(io.segment(), Segment::new(2, 4));
        assert_eq!(io.position(), 2);

        assert!(io.rebind(u64::MAX, 2).is_err());
        assert!(io.rebind(0, 9).is_err());

        io.reset(vec![0u8; 8], 0, 8).unwrap();
        assert_eq!(io.position(), 0);
        assert_eq!(io.size(), 8);

        // an empty segment at the very end is allowed
        io.rebind(8, 0).unwrap();
        assert_eq!(io.remaining(), 0);
    }

    #[test]
    fn test_read_utf_failure_keeps_position() {
        let mut io = segment(16);
        io.write_short(3).unwrap();
        io.write_u8(0x80).unwrap();
        io.set_position(0).unwrap();
        assert!(matches!(
            io.read_utf(),
            Err(MappedIoError::MalformedEncoding { .. })
        ));
        assert_eq!(io.position(), 0);
    }

    #[test]
    fn test_std_io_interop() {
        use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
        use std::io::{Read, Seek, SeekFrom, Write};

        let mut io = segment(12);
        io.write_u32::<BigEndian>(0xdead_beef).unwrap();
        io.write_i16::<BigEndian>(-3).unwrap();
        assert_eq!(io.position(), 6);

        assert_eq!(io.seek(SeekFrom::Start(0)).unwrap(), 0);
        assert_eq!(DataInput::read_int(&mut io).unwrap() as u32, 0xdead_beef);
        assert_eq!(io.read_i16::<BigEndian>().unwrap(), -3);

        assert_eq!(io.seek(SeekFrom::End(-2)).unwrap(), 10);
        assert_eq!(io.write(&[1, 2, 3, 4]).unwrap(), 2);
        assert_eq!(io.write(&[5]).unwrap(), 0);
        assert!(io.seek(SeekFrom::Current(1)).is_err());
        assert!(io.seek(SeekFrom::End(-13)).is_err());

        io.seek(SeekFrom::Start(8)).unwrap();
        let mut rest = Vec::new();
        io.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, [0, 0, 1, 2]);
        Write::flush(&mut io).unwrap();
    }

    #[test]
    fn test_mapped_file_segments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("levels.bin");

        let mut file = MMapFile::create(&path, 64).unwrap();
        {
            let mut io = MappedIo::with_buffer(&mut file, 32, 32).unwrap();
            io.write_utf("bucket").unwrap();
            io.write_double(2.5).unwrap();
            io.flush().unwrap();
        }
        drop(file);

        let file = MMapFile::open(&path).unwrap();
        assert!(file.as_ref()[..32].iter().all(|&b| b == 0));
        let mut io = MappedIo::with_buffer(file, 32, 32).unwrap();
        assert_eq!(io.read_utf().unwrap(), "bucket");
        assert_eq!(io.read_double().unwrap(), 2.5);
        assert_eq!(io.position(), 16);
    }

    #[test]
    fn test_accessors_move_across_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<MappedIo<MMapFile>>();
        assert_send::<MappedIo<&mut [u8]>>();

        let mut store = vec![0u8; 32];
        let (left, right) = store.split_at_mut(16);
        std::thread::scope(|s| {
            s.spawn(move || {
                let mut io = MappedIo::with_buffer(left, 0, 16).unwrap();
                io.write_long(11).unwrap();
            });
            s.spawn(move || {
                let mut io = MappedIo::with_buffer(right, 8, 8).unwrap();
                io.write_long(22).unwrap();
            });
        });
        assert_eq!(&store[..8], &11i64.to_be_bytes());
        assert_eq!(&store[24..], &22i64.to_be_bytes());
    }

    proptest! {
        #[test]
        fn prop_long_round_trip_at_any_position(
            value in any::<i64>(),
            len in 8u64..64,
            pos_seed in any::<u64>(),
        ) {
            let pos = pos_seed % (len - 7);
            let mut io = segment(len);
            io.set_position(pos).unwrap();
            io.write_long(value).unwrap();
            prop_assert_eq!(io.position(), pos + 8);
            io.set_position(pos).unwrap();
            prop_assert_eq!(io.read_long().unwrap(), value);
            prop_assert_eq!(io.position(), pos + 8);
        }

        #[test]
        fn prop_position_never_leaves_segment(
            ops in prop::collection::vec((0u8..6, any::<u16>()), 0..64),
            len in 0u64..32,
        ) {
            let mut io = segment(len);
            for (op, arg) in ops {
                let before = io.position();
                let ok = match op {
                    0 => io.write_int(arg as i32).is_ok(),
                    1 => io.read_long().is_ok(),
                    2 => { io.skip_bytes(arg as usize); true }
                    3 => io.set_position(arg as u64 % 40).is_ok(),
                    4 => io.seek_relative(arg as i64 % 20 - 10).is_ok(),
                    _ => io.read_fully(&mut vec![0u8; arg as usize % 12]).is_ok(),
                };
                if !ok {
                    prop_assert_eq!(io.position(), before);
                }
                prop_assert!(io.position() <= io.size());
            }
        }
    }
}
