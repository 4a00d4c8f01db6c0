use std::io::{Read, Seek};

use crate::error::{Result, SizeError};
use crate::io::ByteSource;
use crate::traits::Decoder;
use crate::types::{ImageFormat, ImageSize};

pub const GIF87A: [u8; 6] = *b"GIF87a";
pub const GIF89A: [u8; 6] = *b"GIF89a";

#[derive(Debug, Clone, Copy, Default)]
pub struct Gif;

impl Decoder for Gif {
    fn format(&self) -> ImageFormat {
        ImageFormat::Gif
    }

    fn decode<R: Read + Seek>(&self, src: &mut ByteSource<R>) -> Result<ImageSize> {
        let data: [u8; 10] = src.read_array_at(0)?;

        if data[..6] != GIF87A && data[..6] != GIF89A {
            return Err(SizeError::signature("wrong GIF signature", &data[..6]));
        }

        // Logical screen descriptor
        Ok(ImageSize::new(
            u16::from_le_bytes([data[6], data[7]]).into(),
            u16::from_le_bytes([data[8], data[9]]).into(),
        ))
    }
}
