use std::io::{Read, Seek};

use tracing::trace;

use crate::error::{Result, SizeError};
use crate::io::ByteSource;
use crate::traits::Decoder;
use crate::types::{ImageFormat, ImageSize};

pub const TIFF_LE_HEADER: [u8; 4] = [b'I', b'I', 0x2A, 0x00];
pub const TIFF_BE_HEADER: [u8; 4] = [b'M', b'M', 0x00, 0x2A];

const TIFF_MAGIC: u16 = 42;

/// The number of columns in the image, i.e. pixels per row.
pub const TAG_IMAGE_WIDTH: u16 = 256;
/// The number of rows of pixels in the image.
pub const TAG_IMAGE_LENGTH: u16 = 257;

const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;

const IFD_ENTRY_LEN: u64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    pub fn from_order_mark(mark: [u8; 2]) -> Option<Self> {
        match &mark {
            b"II" => Some(Self::Little),
            b"MM" => Some(Self::Big),
            _ => None,
        }
    }

    #[inline]
    pub fn u16(self, b: [u8; 2]) -> u16 {
        match self {
            Self::Little => u16::from_le_bytes(b),
            Self::Big => u16::from_be_bytes(b),
        }
    }

    #[inline]
    pub fn u32(self, b: [u8; 4]) -> u32 {
        match self {
            Self::Little => u32::from_le_bytes(b),
            Self::Big => u32::from_be_bytes(b),
        }
    }
}

/// Value of a SHORT or LONG entry. Values are left-justified in the
/// 4-byte value field regardless of byte order.
fn entry_value(entry: &[u8; 12], endian: Endian) -> Result<u32> {
    match endian.u16([entry[2], entry[3]]) {
        TYPE_SHORT => Ok(endian.u16([entry[8], entry[9]]).into()),
        TYPE_LONG => Ok(endian.u32([entry[8], entry[9], entry[10], entry[11]])),
        t => Err(SizeError::Unsupported(format!(
            "invalid type {} ({t})",
            hex::encode(&entry[2..4])
        ))),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Tiff;

impl Tiff {
    fn walk_ifds<R: Read + Seek>(&self, src: &mut ByteSource<R>, endian: Endian) -> Result<ImageSize> {
        let header: [u8; 6] = src.read_array()?;
        let magic = endian.u16([header[0], header[1]]);
        if magic != TIFF_MAGIC {
            return Err(SizeError::signature("invalid TIFF magic", &header[..2]));
        }

        let max_ifds = src.limits().max_ifds;
        let mut width = None;
        let mut height = None;
        let mut offset = u64::from(endian.u32([header[2], header[3], header[4], header[5]]));
        let mut index = 0u32;

        while offset != 0 {
            if index >= max_ifds {
                return Err(SizeError::Malformed(format!("more than {max_ifds} IFDs")));
            }
            if offset & 3 != 0 {
                return Err(SizeError::Malformed(format!("invalid IFD#{index} offset {offset}")));
            }

            let count = endian.u16(src.read_array_at(offset)?);
            trace!(index, offset, count, "tiff ifd");

            let mut entry_offset = offset + 2;
            for _ in 0..count {
                let entry: [u8; 12] = src.read_array_at(entry_offset)?;
                match endian.u16([entry[0], entry[1]]) {
                    TAG_IMAGE_WIDTH => width = Some(entry_value(&entry, endian)?),
                    TAG_IMAGE_LENGTH => height = Some(entry_value(&entry, endian)?),
                    _ => {}
                }
                if let (Some(w), Some(h)) = (width, height) {
                    return Ok(ImageSize::new(w, h));
                }
                entry_offset += IFD_ENTRY_LEN;
            }

            offset = u64::from(endian.u32(src.read_array_at(entry_offset)?));
            index += 1;
        }

        Err(SizeError::Missing("ImageWidth/ImageLength"))
    }
}

impl Decoder for Tiff {
    fn format(&self) -> ImageFormat {
        ImageFormat::Tiff
    }

    fn decode<R: Read + Seek>(&self, src: &mut ByteSource<R>) -> Result<ImageSize> {
        let mark: [u8; 2] = src.read_array_at(0)?;
        let endian = Endian::from_order_mark(mark)
            .ok_or_else(|| SizeError::signature("invalid byte order", &mark))?;
        self.walk_ifds(src, endian)
    }
}
