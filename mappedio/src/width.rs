//! Byte widths of the supported primitives and their big-endian codecs.
//!
//! Every codec here works on an explicit absolute offset into a byte slice,
//! so callers never depend on a cursor stored inside the buffer.

use byteorder::{BigEndian, ByteOrder};

pub const BOOLEAN: usize = 1;
pub const BYTE: usize = 1;
pub const SHORT: usize = 2;
pub const CHAR: usize = 2;
pub const INT: usize = 4;
pub const LONG: usize = 8;
pub const FLOAT: usize = 4;
pub const DOUBLE: usize = 8;

/// A fixed-width value with a big-endian byte layout.
///
/// The raw codecs are private to this crate; outside it values are moved
/// only through the bounds-checked [`get_at`] and [`put_at`] or an accessor.
///
/// ```compile_fail
/// use mappedio::width::sealed::Codec;
///
/// let _ = <i32 as Codec>::decode(&[1, 2]);
/// ```
pub trait Primitive: sealed::Codec {
    /// Number of bytes the value occupies.
    const WIDTH: usize;
}

pub(crate) mod sealed {
    /// Callers pass slices of exactly `Primitive::WIDTH` bytes.
    pub trait Codec: Copy {
        fn decode(bytes: &[u8]) -> Self;

        fn encode(self, bytes: &mut [u8]);
    }
}

use sealed::Codec;

macro_rules! impl_primitive {
    ($ty:ty, $width:expr, |$bytes:ident| $decode:expr, |$value:ident, $out:ident| $encode:expr) => {
        impl Primitive for $ty {
            const WIDTH: usize = $width;
        }

        impl Codec for $ty {
            fn decode($bytes: &[u8]) -> Self {
                $decode
            }

            fn encode(self, $out: &mut [u8]) {
                let $value = self;
                $encode
            }
        }
    };
    ($ty:ty, $width:expr, $read:ident, $write:ident) => {
        impl_primitive!(
            $ty,
            $width,
            |bytes| BigEndian::$read(bytes),
            |value, out| BigEndian::$write(out, value)
        );
    };
}

impl_primitive!(bool, BOOLEAN, |bytes| bytes[0] == 1, |value, out| out[0] = value as u8);
impl_primitive!(u8, BYTE, |bytes| bytes[0], |value, out| out[0] = value);
impl_primitive!(i8, BYTE, |bytes| bytes[0] as i8, |value, out| out[0] = value as u8);
impl_primitive!(i16, SHORT, read_i16, write_i16);
impl_primitive!(u16, CHAR, read_u16, write_u16);
impl_primitive!(i32, INT, read_i32, write_i32);
impl_primitive!(u32, INT, read_u32, write_u32);
impl_primitive!(i64, LONG, read_i64, write_i64);
impl_primitive!(u64, LONG, read_u64, write_u64);
impl_primitive!(f32, FLOAT, read_f32, write_f32);
impl_primitive!(f64, DOUBLE, read_f64, write_f64);

/// Reads a `P` at `offset`, or `None` if it would cross the end of `buf`.
pub fn get_at<P: Primitive>(buf: &[u8], offset: usize) -> Option<P> {
    let end = offset.checked_add(P::WIDTH)?;
    buf.get(offset..end).map(P::decode)
}

/// Writes `value` at `offset`, or returns `None` (leaving `buf` untouched)
/// if it would cross the end of `buf`.
pub fn put_at<P: Primitive>(buf: &mut [u8], offset: usize, value: P) -> Option<()> {
    let end = offset.checked_add(P::WIDTH)?;
    buf.get_mut(offset..end).map(|bytes| value.encode(bytes))
}
