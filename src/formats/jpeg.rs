use std::io::{Read, Seek};

use tracing::trace;

use crate::error::{Result, SizeError};
use crate::io::ByteSource;
use crate::traits::Decoder;
use crate::types::{ImageFormat, ImageSize};

pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

const MARKER_EOI: u8 = 0xD9;
const MARKER_SOF0: u8 = 0xC0;
const MARKER_SOF2: u8 = 0xC2;

/// RSTn markers stand alone, with no length field.
#[inline]
pub fn is_restart_marker(marker: u8) -> bool {
    matches!(marker, 0xD0..=0xD7)
}

/// Baseline and progressive frame headers carry the dimensions.
#[inline]
pub fn is_size_marker(marker: u8) -> bool {
    marker == MARKER_SOF0 || marker == MARKER_SOF2
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Jpeg;

impl Decoder for Jpeg {
    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn decode<R: Read + Seek>(&self, src: &mut ByteSource<R>) -> Result<ImageSize> {
        let soi: [u8; 2] = src.read_array_at(0)?;
        if soi != JPEG_SOI {
            return Err(SizeError::signature("wrong SOI", &soi));
        }

        let max_segments = src.limits().max_segments;
        for _ in 0..max_segments {
            let offset = src.offset();
            let seg: [u8; 2] = src.read_array()?;

            if seg[0] != 0xFF {
                return Err(SizeError::Malformed(format!(
                    "wrong segment header {} at {offset}",
                    hex::encode(seg)
                )));
            }

            let marker = seg[1];
            if is_restart_marker(marker) {
                continue;
            }
            if marker == MARKER_EOI {
                return Err(SizeError::Missing("SOF marker"));
            }

            let length = u16::from_be_bytes(src.read_array()?);
            trace!(offset, marker, length, "jpeg segment");

            if length < 2 {
                return Err(SizeError::Malformed(format!(
                    "segment length {length} at {offset}"
                )));
            }

            if is_size_marker(marker) {
                // precision, height, width
                let frame: [u8; 5] = src.read_array()?;
                return Ok(ImageSize::new(
                    u16::from_be_bytes([frame[3], frame[4]]).into(),
                    u16::from_be_bytes([frame[1], frame[2]]).into(),
                ));
            }

            src.skip(u64::from(length - 2))?;
        }

        Err(SizeError::Malformed(format!(
            "more than {max_segments} segments"
        )))
    }
}
