//! Plain file access for probing.

use pixdim::Result;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// A read-only file stream.
///
/// Decoders jump between a handful of header offsets, so on Linux the kernel
/// is told not to read ahead. Opening never writes, and the file is closed
/// on drop.
pub struct FileReader {
    file: File,
    size: u64,
}

impl FileReader {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(false)
            .open(path.as_ref())?;

        #[cfg(target_os = "linux")]
        {
            use rustix::fs::{Advice, fadvise};

            let _ = fadvise(&file, 0, None, Advice::Random);
        }

        let size = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;

        Ok(Self { file, size })
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Read for FileReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for FileReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}
