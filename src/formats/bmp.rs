use std::io::{Read, Seek};

use crate::error::{Result, SizeError};
use crate::io::ByteSource;
use crate::traits::Decoder;
use crate::types::{ImageFormat, ImageSize};

/// Windows bitmap signature.
pub const WINDOWS_IDS: [[u8; 2]; 1] = [*b"BM"];

/// OS/2 bitmap, icon, pointer and array signatures.
pub const OS2_IDS: [[u8; 2]; 5] = [*b"BA", *b"CI", *b"CP", *b"IC", *b"PT"];

/// 14-byte file header followed by the first 12 bytes of the DIB header.
const HEADER_LEN: usize = 26;

/// DIB header size of BITMAPCOREHEADER, which stores 16-bit dimensions.
const CORE_HEADER_SIZE: u32 = 12;

#[inline]
pub fn is_bmp_signature(sig: &[u8]) -> bool {
    WINDOWS_IDS.iter().chain(OS2_IDS.iter()).any(|id| sig.starts_with(id))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Bmp;

impl Decoder for Bmp {
    fn format(&self) -> ImageFormat {
        ImageFormat::Bmp
    }

    fn decode<R: Read + Seek>(&self, src: &mut ByteSource<R>) -> Result<ImageSize> {
        let data: [u8; HEADER_LEN] = src.read_array_at(0)?;
        let sig = [data[0], data[1]];
        let dib_size = u32::from_le_bytes([data[14], data[15], data[16], data[17]]);

        if WINDOWS_IDS.contains(&sig) && dib_size != CORE_HEADER_SIZE {
            Ok(ImageSize::new(
                u32::from_le_bytes([data[18], data[19], data[20], data[21]]),
                u32::from_le_bytes([data[22], data[23], data[24], data[25]]),
            ))
        } else if WINDOWS_IDS.contains(&sig) || OS2_IDS.contains(&sig) {
            Ok(ImageSize::new(
                u16::from_le_bytes([data[18], data[19]]).into(),
                u16::from_le_bytes([data[20], data[21]]).into(),
            ))
        } else {
            Err(SizeError::signature("unknown BMP type", &sig))
        }
    }
}
