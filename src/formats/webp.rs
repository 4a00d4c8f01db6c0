use std::io::{Read, Seek};

use crate::error::{Result, SizeError};
use crate::io::ByteSource;
use crate::traits::Decoder;
use crate::types::{ImageFormat, ImageSize};

pub const RIFF_TAG: [u8; 4] = *b"RIFF";
pub const WEBP_TAG: [u8; 4] = *b"WEBP";

const VP8_START_CODE: [u8; 3] = [0x9D, 0x01, 0x2A];
const VP8L_SIGNATURE: u8 = 0x2F;
const FOURTEEN_BITS: u32 = 0x3FFF;

#[inline]
fn le24(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], 0])
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WebP;

impl WebP {
    /// Extended format: flags, reserved, then canvas width-1 and height-1.
    fn vp8x<R: Read + Seek>(src: &mut ByteSource<R>) -> Result<ImageSize> {
        let data: [u8; 10] = src.read_array()?;
        Ok(ImageSize::new(le24(&data[4..7]) + 1, le24(&data[7..10]) + 1))
    }

    /// Lossy keyframe: frame tag, start code, then 14-bit width and height
    /// whose top two bits are scaling flags.
    fn vp8<R: Read + Seek>(src: &mut ByteSource<R>) -> Result<ImageSize> {
        let data: [u8; 10] = src.read_array()?;
        if data[3..6] != VP8_START_CODE {
            return Err(SizeError::signature("invalid VP8 start code", &data[3..6]));
        }
        Ok(ImageSize::new(
            u32::from(u16::from_le_bytes([data[6], data[7]])) & FOURTEEN_BITS,
            u32::from(u16::from_le_bytes([data[8], data[9]])) & FOURTEEN_BITS,
        ))
    }

    /// Lossless: signature byte, then width-1 and height-1 as consecutive
    /// 14-bit fields, least significant bits first.
    fn vp8l<R: Read + Seek>(src: &mut ByteSource<R>) -> Result<ImageSize> {
        let data: [u8; 5] = src.read_array()?;
        if data[0] != VP8L_SIGNATURE {
            return Err(SizeError::signature("invalid VP8L signature byte", &data[..1]));
        }
        let bits = u32::from_le_bytes([data[1], data[2], data[3], data[4]]);
        Ok(ImageSize::new(
            (bits & FOURTEEN_BITS) + 1,
            ((bits >> 14) & FOURTEEN_BITS) + 1,
        ))
    }
}

impl Decoder for WebP {
    fn format(&self) -> ImageFormat {
        ImageFormat::WebP
    }

    fn decode<R: Read + Seek>(&self, src: &mut ByteSource<R>) -> Result<ImageSize> {
        let riff: [u8; 12] = src.read_array_at(0)?;
        if riff[..4] != RIFF_TAG {
            return Err(SizeError::signature("invalid file fourcc", &riff[..4]));
        }
        let riff_size = u32::from_le_bytes([riff[4], riff[5], riff[6], riff[7]]);
        if riff_size < 4 {
            return Err(SizeError::Malformed(format!("too small file size {riff_size}")));
        }
        if riff[8..] != WEBP_TAG {
            return Err(SizeError::signature("invalid form type", &riff[8..]));
        }

        // First chunk payload starts at 20
        let chunk: [u8; 8] = src.read_array()?;
        match &chunk[..4] {
            b"VP8X" => Self::vp8x(src),
            b"VP8 " => Self::vp8(src),
            b"VP8L" => Self::vp8l(src),
            tag => Err(SizeError::Unsupported(format!("unknown chunk {}", hex::encode(tag)))),
        }
    }
}
