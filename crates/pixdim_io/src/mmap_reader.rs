use memmap2::Mmap;
use pixdim::{Result, SizeError};
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// A memory-mapped file read through a cursor, so header reads are plain
/// copies and seeks never reach the kernel.
pub struct MmapReader {
    cursor: Cursor<Mmap>,
}

impl MmapReader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = File::open(path.as_ref())?;

        let size = file.seek(SeekFrom::End(0))?;

        if size == 0 {
            return Err(SizeError::Unsupported("cannot mmap empty file".to_string()));
        }

        // SAFETY: read-only mapping; truncation by another process is not guarded
        let mmap = unsafe { Mmap::map(&file) }?;

        if mmap.is_empty() {
            return Err(SizeError::Unsupported(
                "mmap returned empty mapping (special file not supported)".to_string(),
            ));
        }

        #[cfg(target_os = "linux")]
        {
            use memmap2::Advice;
            let _ = mmap.advise(Advice::Random);
        }

        Ok(Self {
            cursor: Cursor::new(mmap),
        })
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.cursor.get_ref().len() as u64
    }
}

impl Read for MmapReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for MmapReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}
