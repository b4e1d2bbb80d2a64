//! Bounds-checked random access to big-endian primitives and length-prefixed
//! modified UTF-8 strings inside segments of a memory-mapped file.
//!
//! [`MappedIo`] is bound to one segment of a [`ByteStore`] at a time and
//! implements the [`DataInput`], [`DataOutput`] and [`RandomAccessIo`]
//! traits over it. The store itself is owned by the caller, typically an
//! [`MMapFile`].

pub mod accessor;
pub mod byte_store;
pub mod error;
pub mod stream;
pub mod utf;
pub mod width;

pub use accessor::{MappedIo, Segment};
pub use byte_store::{ByteStore, MMapFile};
pub use error::{MappedIoError, Result};
pub use stream::{BinaryStream, DataInput, DataOutput, RandomAccessIo};
pub use width::Primitive;
