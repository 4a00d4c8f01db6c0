//! JPEG XL, both as a bare codestream and wrapped in an ISOBMFF container.
//!
//! Only the SizeHeader at the very start of the codestream is decoded.

use std::io::{Read, Seek};

use tracing::trace;

use super::isobmff::Siblings;
use crate::error::{Result, SizeError};
use crate::io::ByteSource;
use crate::traits::Decoder;
use crate::types::{ImageFormat, ImageSize};

pub const JXL_CODESTREAM_SIGNATURE: [u8; 2] = [0xFF, 0x0A];

/// Signature box followed by the `ftyp` box every JPEG XL container opens with.
pub const JXL_CONTAINER_PROLOGUE: [u8; 32] = [
    0x00, 0x00, 0x00, 0x0C, b'J', b'X', b'L', b' ', 0x0D, 0x0A, 0x87, 0x0A, //
    0x00, 0x00, 0x00, 0x14, b'f', b't', b'y', b'p', b'j', b'x', b'l', b' ', //
    0x00, 0x00, 0x00, 0x00, b'j', b'x', b'l', b' ',
];

/// Signature plus the longest possible SizeHeader (1 + 2 + 30 + 3 + 2 + 30 bits).
const CODESTREAM_PREFIX_LEN: usize = 11;

/// Bit widths selectable for a non-small dimension.
const DIMENSION_BITS: [u32; 4] = [9, 13, 18, 30];

/// Width:height ratios indexed by the 3-bit `ratio` field; 0 means explicit width.
const RATIOS: [Option<(u64, u64)>; 8] = [
    None,
    Some((1, 1)),
    Some((12, 10)),
    Some((4, 3)),
    Some((3, 2)),
    Some((16, 9)),
    Some((5, 4)),
    Some((2, 1)),
];

/// Marks the final `jxlp` box in its sequence index.
const JXLP_LAST_FLAG: u32 = 0x8000_0000;

/// Least-significant-bit-first reader over a bounded buffer.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bits consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Reads `n` (at most 32) bits, or `None` if the buffer runs out first.
    pub fn read(&mut self, n: u32) -> Option<u32> {
        debug_assert!(n <= 32);
        let end = self.pos + n as usize;
        if end > self.data.len() * 8 {
            return None;
        }

        let mut value = 0u64;
        for i in 0..n as usize {
            let bit = self.pos + i;
            let b = (self.data[bit / 8] >> (bit % 8)) & 1;
            value |= u64::from(b) << i;
        }
        self.pos = end;
        Some(value as u32)
    }

    #[inline]
    pub fn read_bool(&mut self) -> Option<bool> {
        self.read(1).map(|b| b == 1)
    }
}

fn read_dimension(bits: &mut BitReader<'_>, small: bool) -> Option<u32> {
    if small {
        Some(8 * (1 + bits.read(5)?))
    } else {
        let selector = bits.read(2)? as usize;
        Some(1 + bits.read(DIMENSION_BITS[selector])?)
    }
}

fn read_size_header(bits: &mut BitReader<'_>) -> Option<ImageSize> {
    let small = bits.read_bool()?;
    let height = read_dimension(bits, small)?;
    let width = match RATIOS[bits.read(3)? as usize] {
        // height <= 2^30, so even 16:9 stays within u32
        Some((num, den)) => (u64::from(height) * num / den) as u32,
        None => read_dimension(bits, small)?,
    };
    Some(ImageSize::new(width, height))
}

/// Decodes the SizeHeader from the start of a codestream read at `offset`.
pub fn parse_codestream(data: &[u8], offset: u64) -> Result<ImageSize> {
    if data.len() < JXL_CODESTREAM_SIGNATURE.len() {
        return Err(SizeError::Truncated {
            offset,
            wanted: CODESTREAM_PREFIX_LEN,
            got: data.len(),
        });
    }
    if data[..2] != JXL_CODESTREAM_SIGNATURE {
        return Err(SizeError::signature("wrong SOI", &data[..2]));
    }

    let mut bits = BitReader::new(&data[2..]);
    read_size_header(&mut bits).ok_or(SizeError::Truncated {
        offset,
        wanted: CODESTREAM_PREFIX_LEN,
        got: data.len(),
    })
}

fn read_codestream_at<R: Read + Seek>(src: &mut ByteSource<R>, offset: u64) -> Result<ImageSize> {
    let mut data = [0u8; CODESTREAM_PREFIX_LEN];
    let n = src.pread(offset, &mut data)?;
    parse_codestream(&data[..n], offset)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JpegXl;

impl Decoder for JpegXl {
    fn format(&self) -> ImageFormat {
        ImageFormat::JpegXl
    }

    fn decode<R: Read + Seek>(&self, src: &mut ByteSource<R>) -> Result<ImageSize> {
        let mut head = [0u8; JXL_CONTAINER_PROLOGUE.len()];
        let n = src.pread(0, &mut head)?;
        let head = &head[..n];

        // Containers open with a zero size byte, codestreams with 0xFF
        if head.first() == Some(&JXL_CODESTREAM_SIGNATURE[0]) {
            return parse_codestream(head, 0);
        }

        let common = n.min(JXL_CONTAINER_PROLOGUE.len());
        if head[..common] != JXL_CONTAINER_PROLOGUE[..common] {
            return Err(SizeError::signature("invalid JXL container header", head));
        }
        if n < JXL_CONTAINER_PROLOGUE.len() {
            return Err(SizeError::Truncated {
                offset: 0,
                wanted: JXL_CONTAINER_PROLOGUE.len(),
                got: n,
            });
        }

        let end = src.len()?;
        let mut boxes = Siblings::new(JXL_CONTAINER_PROLOGUE.len() as u64, end);
        while let Some(b) = boxes.next(src)? {
            match &b.tag {
                b"jxlc" => return read_codestream_at(src, b.start()),
                b"jxlp" => {
                    b.check_payload(4)?;
                    let index = u32::from_be_bytes(src.read_array_at(b.start())?);
                    trace!(index, offset = b.offset, "jxlp box");
                    if index & !JXLP_LAST_FLAG == 0 {
                        return read_codestream_at(src, b.start() + 4);
                    }
                }
                _ => {}
            }
        }

        boxes.check_overrun()?;
        Err(SizeError::Missing("JXL codestream"))
    }
}
