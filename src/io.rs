//! Cost-tracking cursor over a seekable byte stream.
//!
//! Every decoder reads through a [`ByteSource`], which counts bytes delivered
//! and seeks actually issued. A positioned read at the current offset never
//! seeks, so sequential header walks cost a single seek at most.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::error::{Result, SizeError};
use crate::types::Limits;

/// Read cost observed on one stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    pub offset: u64,
    pub bytes_read: u64,
    pub seeks: u64,
}

pub struct ByteSource<R> {
    inner: R,
    offset: u64,
    bytes_read: u64,
    seeks: u64,
    len: Option<u64>,
    limits: Limits,
}

impl<R: Read + Seek> ByteSource<R> {
    /// Wraps `inner`, rewinding it to the start. The rewind is not counted.
    pub fn new(mut inner: R) -> Result<Self> {
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner,
            offset: 0,
            bytes_read: 0,
            seeks: 0,
            len: None,
            limits: Limits::default(),
        })
    }

    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    #[inline]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[inline]
    pub fn stats(&self) -> ReadStats {
        ReadStats {
            offset: self.offset,
            bytes_read: self.bytes_read,
            seeks: self.seeks,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Total stream length, measured once by seeking to the end.
    pub fn len(&mut self) -> Result<u64> {
        if let Some(len) = self.len {
            return Ok(len);
        }
        let len = self.inner.seek(SeekFrom::End(0))?;
        self.seeks += 1;
        self.offset = len;
        self.len = Some(len);
        Ok(len)
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Moves the cursor to `offset`, touching the stream only if it moves.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        if self.offset != offset {
            self.inner.seek(SeekFrom::Start(offset))?;
            self.offset = offset;
            self.seeks += 1;
        }
        Ok(())
    }

    pub fn skip(&mut self, n: u64) -> Result<()> {
        let target = self
            .offset
            .checked_add(n)
            .ok_or_else(|| SizeError::Malformed(format!("skip of {n} overflows at {}", self.offset)))?;
        self.seek(target)
    }

    /// Reads into `buf` until it is full or the stream ends. Returns the
    /// number of bytes read; a short count means EOF.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.offset += filled as u64;
        self.bytes_read += filled as u64;
        Ok(filled)
    }

    pub fn pread(&mut self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        self.seek(offset)?;
        self.read(buf)
    }

    /// Fills `buf` from the current offset or fails with [`SizeError::Truncated`].
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let offset = self.offset;
        let got = self.read(buf)?;
        if got < buf.len() {
            return Err(SizeError::Truncated {
                offset,
                wanted: buf.len(),
                got,
            });
        }
        Ok(())
    }

    pub fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.seek(offset)?;
        self.read_exact(buf)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn read_array_at<const N: usize>(&mut self, offset: u64) -> Result<[u8; N]> {
        self.seek(offset)?;
        self.read_array()
    }
}
