//! Seekable stream adapters for probing files on disk.

mod mmap_reader;
mod reader;

pub use mmap_reader::MmapReader;
pub use reader::FileReader;

use pixdim::Result;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Map the file instead of reading it through the page cache with syscalls.
    pub prefer_mmap: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self { prefer_mmap: true }
    }
}

pub enum Reader {
    Mmap(MmapReader),
    File(FileReader),
}

impl Reader {
    /// Opens `path`, mapping it when allowed and possible and otherwise
    /// falling back to plain reads.
    pub fn open(path: impl AsRef<Path>, options: &ReaderOptions) -> Result<Self> {
        let path_ref = path.as_ref();
        if options.prefer_mmap {
            if let Ok(r) = MmapReader::new(path_ref) {
                return Ok(Reader::Mmap(r));
            }
        }
        Ok(Reader::File(FileReader::new(path_ref)?))
    }

    #[inline]
    pub fn is_mmap(&self) -> bool {
        matches!(self, Reader::Mmap(_))
    }

    /// File length at open time.
    pub fn size(&self) -> u64 {
        match self {
            Reader::Mmap(r) => r.size(),
            Reader::File(r) => r.size(),
        }
    }
}

impl Read for Reader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Reader::Mmap(r) => r.read(buf),
            Reader::File(r) => r.read(buf),
        }
    }
}

impl Seek for Reader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Reader::Mmap(r) => r.seek(pos),
            Reader::File(r) => r.seek(pos),
        }
    }
}

pub fn open(path: impl AsRef<Path>, options: &ReaderOptions) -> Result<Reader> {
    Reader::open(path, options)
}
