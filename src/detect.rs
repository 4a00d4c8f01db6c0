//! Format sniffing from the first 12 bytes of a stream.
//!
//! Detection only compares signatures; it never runs a decoder to see
//! whether it would succeed.

use std::io::{Read, Seek};

use crate::error::{Result, SizeError, hexdump};
use crate::formats::{bmp, gif, jpeg, jxl, png, tiff, webp};
use crate::io::ByteSource;
use crate::types::ImageFormat;

/// Bytes inspected by [`detect_format`].
pub const SNIFF_LEN: usize = 12;

/// Picks the decoder for a stream whose leading bytes are `data`.
pub fn detect_format(data: &[u8]) -> Result<ImageFormat> {
    if data.len() < SNIFF_LEN {
        return Err(SizeError::TooShort(data.len()));
    }
    let data = &data[..SNIFF_LEN];

    let format = match data[0] {
        0x00 if data == &jxl::JXL_CONTAINER_PROLOGUE[..SNIFF_LEN] => Some(ImageFormat::JpegXl),
        0x00 if &data[4..8] == b"ftyp" => Some(ImageFormat::Isobmff),
        0xFF if data[..2] == jpeg::JPEG_SOI => Some(ImageFormat::Jpeg),
        0xFF if data[..2] == jxl::JXL_CODESTREAM_SIGNATURE => Some(ImageFormat::JpegXl),
        _ if data[..4] == png::PNG_SIGNATURE[..4] => Some(ImageFormat::Png),
        _ if data[..4] == webp::RIFF_TAG && data[8..12] == webp::WEBP_TAG => Some(ImageFormat::WebP),
        _ if data[..3] == gif::GIF87A[..3] => Some(ImageFormat::Gif),
        _ if bmp::is_bmp_signature(&data[..2]) => Some(ImageFormat::Bmp),
        _ if data[..4] == tiff::TIFF_LE_HEADER || data[..4] == tiff::TIFF_BE_HEADER => {
            Some(ImageFormat::Tiff)
        }
        _ => None,
    };

    format.ok_or_else(|| SizeError::UnknownFormat(hexdump(data)))
}

/// Reads the sniffing window from the start of `src` and detects its format.
pub fn sniff<R: Read + Seek>(src: &mut ByteSource<R>) -> Result<ImageFormat> {
    let mut head = [0u8; SNIFF_LEN];
    let n = src.pread(0, &mut head)?;
    detect_format(&head[..n])
}
