use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use memmap2::MmapMut;
use tracing::debug;

/// A contiguous, writable run of bytes that a [`MappedIo`](crate::MappedIo)
/// can be bound to.
pub trait ByteStore: AsRef<[u8]> + AsMut<[u8]> {
    /// Persists pending writes. In-memory stores have nothing to do.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ByteStore for Vec<u8> {}

impl<const N: usize> ByteStore for [u8; N] {}

impl ByteStore for Box<[u8]> {}

impl ByteStore for [u8] {}

impl<T: ByteStore + ?Sized> ByteStore for &mut T {
    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// A file mapped read-write into memory.
///
/// The mapping never grows; its length is fixed by the file length at the
/// time it was mapped.
pub struct MMapFile {
    mmap: MmapMut,
    file: File,
}

impl MMapFile {
    /// Creates (or truncates) the file at `path`, sizes it to `len` bytes
    /// and maps it.
    pub fn create<P: AsRef<Path>>(path: P, len: u64) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(len)?;
        Self::from_file(file)
    }

    /// Maps an existing file at its current length.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Self::from_file(file)
    }

    pub fn from_file(file: File) -> io::Result<Self> {
        // Safety: the mapping is only reachable through this value, and the
        // file handle is kept alive alongside it.
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        debug!(len = mmap.len(), "mapped file");
        Ok(Self { mmap, file })
    }

    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    pub fn file(&self) -> &File {
        &self.file
    }
}

impl AsRef<[u8]> for MMapFile {
    fn as_ref(&self) -> &[u8] {
        &self.mmap
    }
}

impl AsMut<[u8]> for MMapFile {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.mmap
    }
}

impl ByteStore for MMapFile {
    fn flush(&mut self) -> io::Result<()> {
        self.mmap.flush()
    }
}
