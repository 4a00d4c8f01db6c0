use std::io::{Read, Seek};

use crate::error::{Result, SizeError};
use crate::io::ByteSource;
use crate::traits::Decoder;
use crate::types::{ImageFormat, ImageSize};

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

pub const IHDR_CHUNK_TYPE: &[u8; 4] = b"IHDR";

/// Width, height, bit depth, color type, compression, filter, interlace.
const IHDR_LEN: u32 = 13;

/// Length-prefixed PNG chunk header as found in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub offset: u64,
    pub size: u32,
    pub tag: [u8; 4],
}

impl Chunk {
    pub fn from_header(offset: u64, header: [u8; 8]) -> Self {
        Self {
            offset,
            size: u32::from_be_bytes([header[0], header[1], header[2], header[3]]),
            tag: [header[4], header[5], header[6], header[7]],
        }
    }

    #[inline]
    pub const fn data_offset(&self) -> u64 {
        self.offset + 8
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Png;

impl Decoder for Png {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn decode<R: Read + Seek>(&self, src: &mut ByteSource<R>) -> Result<ImageSize> {
        let sig: [u8; 8] = src.read_array_at(0)?;
        if sig != PNG_SIGNATURE {
            return Err(SizeError::signature("wrong PNG signature", &sig));
        }

        let chunk = Chunk::from_header(8, src.read_array()?);
        if &chunk.tag != IHDR_CHUNK_TYPE {
            return Err(SizeError::Missing("IHDR chunk"));
        }
        if chunk.size != IHDR_LEN {
            return Err(SizeError::Malformed(format!("invalid IHDR size {}", chunk.size)));
        }

        let data: [u8; 8] = src.read_array_at(chunk.data_offset())?;
        Ok(ImageSize::new(
            u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
            u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
        ))
    }
}
