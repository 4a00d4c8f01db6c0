//! ISO base media file format box walking (AVIF, HEIF/HEIC), also used to
//! locate the codestream inside JPEG XL containers.
//!
//! Boxes are visited one header at a time; nothing is buffered and no tree
//! is built. Payloads are only read for the few boxes that carry the answer.

use std::io::{Read, Seek};

use tracing::trace;

use crate::error::{Result, SizeError};
use crate::io::ByteSource;
use crate::traits::Decoder;
use crate::types::{ImageFormat, ImageSize};

const BOX_HEADER_LEN: u64 = 8;
const LARGE_BOX_HEADER_LEN: u64 = 16;

/// A box header as found in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoBox {
    pub offset: u64,
    pub size: u64,
    pub header_len: u64,
    pub tag: [u8; 4],
}

impl IsoBox {
    /// First payload byte.
    #[inline]
    pub const fn start(&self) -> u64 {
        self.offset + self.header_len
    }

    #[inline]
    pub const fn end(&self) -> u64 {
        self.offset + self.size
    }

    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.tag).into_owned()
    }

    /// Fails unless the payload holds at least `len` bytes.
    pub fn check_payload(&self, len: u64) -> Result<()> {
        if self.size - self.header_len < len {
            return Err(SizeError::Malformed(format!(
                "{} box at {} too small: {} < {len}",
                self.name(),
                self.offset,
                self.size - self.header_len
            )));
        }
        Ok(())
    }
}

/// Reads the box header at `offset`.
pub fn read_box<R: Read + Seek>(src: &mut ByteSource<R>, offset: u64) -> Result<IsoBox> {
    let header: [u8; BOX_HEADER_LEN as usize] = src.read_array_at(offset)?;

    let tag = [header[4], header[5], header[6], header[7]];
    let (size, header_len) = match u32::from_be_bytes([header[0], header[1], header[2], header[3]]) {
        0 => {
            let end = src.len()?;
            (end.saturating_sub(offset), BOX_HEADER_LEN)
        }
        1 => (u64::from_be_bytes(src.read_array()?), LARGE_BOX_HEADER_LEN),
        n => (u64::from(n), BOX_HEADER_LEN),
    };

    if size < header_len || offset.checked_add(size).is_none() {
        return Err(SizeError::Malformed(format!(
            "invalid {} box size {size} at {offset}",
            hex::encode(tag)
        )));
    }

    let b = IsoBox {
        offset,
        size,
        header_len,
        tag,
    };
    trace!(offset, size, tag = %b.name(), "box");
    Ok(b)
}

/// Walk over the boxes laid out back to back in `[start, end)`.
///
/// The walk ends once a box reaches or crosses `end`. A header cut short by
/// the end of the stream is a truncation error.
#[derive(Debug)]
pub struct Siblings {
    next: u64,
    end: u64,
    visited: u32,
    done: bool,
    overrun: Option<(u64, u64)>,
}

impl Siblings {
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            next: start,
            end,
            visited: 0,
            done: false,
            overrun: None,
        }
    }

    pub fn within(parent: &IsoBox) -> Self {
        Self::new(parent.start(), parent.end())
    }

    pub fn next<R: Read + Seek>(&mut self, src: &mut ByteSource<R>) -> Result<Option<IsoBox>> {
        if self.done || self.next >= self.end {
            return Ok(None);
        }

        let max_boxes = src.limits().max_boxes;
        if self.visited >= max_boxes {
            return Err(SizeError::Malformed(format!("more than {max_boxes} sibling boxes")));
        }
        self.visited += 1;

        let b = read_box(src, self.next)?;
        if b.end() >= self.end {
            self.done = true;
            let len = src.len()?;
            if b.end() > len {
                self.overrun = Some((b.end(), len));
            }
        } else {
            self.next = b.end();
        }
        Ok(Some(b))
    }

    /// Fails if the walk stopped on a box that runs past the end of the stream.
    pub fn check_overrun(&self) -> Result<()> {
        match self.overrun {
            Some((end, len)) => Err(SizeError::Truncated {
                offset: len,
                wanted: usize::try_from(end - len).unwrap_or(usize::MAX),
                got: 0,
            }),
            None => Ok(()),
        }
    }

    /// Advances to the first box tagged `tag`.
    pub fn find<R: Read + Seek>(
        &mut self,
        src: &mut ByteSource<R>,
        tag: &[u8; 4],
    ) -> Result<Option<IsoBox>> {
        while let Some(b) = self.next(src)? {
            if &b.tag == tag {
                return Ok(Some(b));
            }
        }
        self.check_overrun()?;
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Isobmff;

impl Decoder for Isobmff {
    fn format(&self) -> ImageFormat {
        ImageFormat::Isobmff
    }

    fn decode<R: Read + Seek>(&self, src: &mut ByteSource<R>) -> Result<ImageSize> {
        let ftyp = read_box(src, 0)?;
        if &ftyp.tag != b"ftyp" {
            return Err(SizeError::signature("no ftyp box", &ftyp.tag));
        }

        let end = src.len()?;
        if ftyp.end() > end {
            return Err(SizeError::Truncated {
                offset: end,
                wanted: usize::try_from(ftyp.end() - end).unwrap_or(usize::MAX),
                got: 0,
            });
        }
        let meta = Siblings::new(ftyp.end(), end)
            .find(src, b"meta")?
            .ok_or(SizeError::Missing("meta"))?;

        // meta is a full box: version and flags precede its children
        let iprp = Siblings::new(meta.start().saturating_add(4), meta.end())
            .find(src, b"iprp")?
            .ok_or(SizeError::Missing("iprp"))?;
        let ipco = Siblings::within(&iprp)
            .find(src, b"ipco")?
            .ok_or(SizeError::Missing("ipco"))?;

        let mut best: Option<ImageSize> = None;
        let mut rotate = false;
        let mut children = Siblings::within(&ipco);
        while let Some(b) = children.next(src)? {
            match &b.tag {
                b"ispe" => {
                    b.check_payload(12)?;
                    let data: [u8; 12] = src.read_array_at(b.start())?;
                    let size = ImageSize::new(
                        u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
                        u32::from_be_bytes([data[8], data[9], data[10], data[11]]),
                    );
                    // Thumbnails and auxiliary images get their own ispe
                    if best.is_none_or(|s| s.width < size.width) {
                        best = Some(size);
                    }
                }
                b"irot" => {
                    b.check_payload(1)?;
                    let [angle] = src.read_array_at::<1>(b.start())?;
                    rotate = angle & 1 == 1;
                }
                _ => {}
            }
        }

        let size = match best {
            Some(size) => size,
            None => {
                children.check_overrun()?;
                return Err(SizeError::Missing("ispe"));
            }
        };
        Ok(if rotate { size.rotated() } else { size })
    }
}
