use std::io;
use thiserror::Error;

/// Errors that can occur when reading or writing a mapped segment
#[derive(Error, Debug)]
pub enum MappedIoError {
    /// A position outside `[0, size]` was requested
    #[error("illegal position {position}, segment size is {size}")]
    IllegalPosition { position: i128, size: u64 },

    /// A read or write would cross the end of the segment
    #[error("cannot access {requested} byte(s) at position {position}, segment size is {size}")]
    EndOfSegment {
        position: u64,
        requested: u64,
        size: u64,
    },

    /// The bytes of a length-prefixed string are not valid modified UTF-8
    #[error("malformed input around byte {offset}: {reason}")]
    MalformedEncoding { offset: usize, reason: &'static str },

    /// The encoded form of a string does not fit the 2-byte length prefix
    #[error("encoded string too long: {length} bytes")]
    EncodingTooLong { length: usize },

    /// The operation has no defined byte layout in this format
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// The accessor has not been bound to a buffer yet
    #[error("accessor is not bound to a buffer")]
    Unbound,

    /// The requested segment does not fit inside the buffer
    #[error("segment [{base}, {base} + {length}) exceeds buffer of {capacity} bytes")]
    SegmentOutOfBounds {
        base: u64,
        length: u64,
        capacity: usize,
    },

    /// An `(offset, length)` pair does not fit the caller's slice
    #[error("range [{offset}, {offset} + {length}) exceeds slice of {capacity} bytes")]
    InvalidRange {
        offset: usize,
        length: usize,
        capacity: usize,
    },

    /// IO errors from the backing file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, MappedIoError>;

impl From<MappedIoError> for io::Error {
    fn from(err: MappedIoError) -> Self {
        let kind = match &err {
            MappedIoError::Io(inner) => inner.kind(),
            MappedIoError::EndOfSegment { .. } => io::ErrorKind::UnexpectedEof,
            MappedIoError::IllegalPosition { .. }
            | MappedIoError::InvalidRange { .. }
            | MappedIoError::SegmentOutOfBounds { .. } => io::ErrorKind::InvalidInput,
            MappedIoError::MalformedEncoding { .. } | MappedIoError::EncodingTooLong { .. } => {
                io::ErrorKind::InvalidData
            }
            MappedIoError::Unsupported(_) => io::ErrorKind::Unsupported,
            MappedIoError::Unbound => io::ErrorKind::NotConnected,
        };
        match err {
            MappedIoError::Io(inner) => inner,
            other => io::Error::new(kind, other),
        }
    }
}

/// Checks that `offset..offset + length` lies inside a slice of `capacity` bytes.
pub(crate) fn check_range(offset: usize, length: usize, capacity: usize) -> Result<()> {
    match offset.checked_add(length) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(MappedIoError::InvalidRange {
            offset,
            length,
            capacity,
        }),
    }
}
