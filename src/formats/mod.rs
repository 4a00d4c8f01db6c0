pub mod bmp;
pub mod gif;
pub mod isobmff;
pub mod jpeg;
pub mod jxl;
pub mod png;
pub mod tiff;
pub mod webp;

use std::io::{Read, Seek};

pub use bmp::Bmp;
pub use gif::Gif;
pub use isobmff::Isobmff;
pub use jpeg::Jpeg;
pub use jxl::JpegXl;
pub use png::Png;
pub use tiff::Tiff;
pub use webp::WebP;

use crate::error::Result;
use crate::io::ByteSource;
use crate::traits::Decoder;
use crate::types::{ImageFormat, ImageSize};

impl ImageFormat {
    /// Runs this format's decoder over `src`.
    pub fn decode<R: Read + Seek>(self, src: &mut ByteSource<R>) -> Result<ImageSize> {
        match self {
            Self::Bmp => Bmp.decode(src),
            Self::Gif => Gif.decode(src),
            Self::Png => Png.decode(src),
            Self::Jpeg => Jpeg.decode(src),
            Self::JpegXl => JpegXl.decode(src),
            Self::Isobmff => Isobmff.decode(src),
            Self::Tiff => Tiff.decode(src),
            Self::WebP => WebP.decode(src),
        }
    }
}

fn decode_with<D: Decoder, R: Read + Seek>(decoder: D, reader: R) -> Result<ImageSize> {
    let mut src = ByteSource::new(reader)?;
    decoder.decode(&mut src)
}

pub fn decode_bmp<R: Read + Seek>(reader: R) -> Result<ImageSize> {
    decode_with(Bmp, reader)
}

pub fn decode_gif<R: Read + Seek>(reader: R) -> Result<ImageSize> {
    decode_with(Gif, reader)
}

pub fn decode_png<R: Read + Seek>(reader: R) -> Result<ImageSize> {
    decode_with(Png, reader)
}

pub fn decode_jpeg<R: Read + Seek>(reader: R) -> Result<ImageSize> {
    decode_with(Jpeg, reader)
}

pub fn decode_jpegxl<R: Read + Seek>(reader: R) -> Result<ImageSize> {
    decode_with(JpegXl, reader)
}

/// AVIF, HEIF and HEIC.
pub fn decode_isobmff<R: Read + Seek>(reader: R) -> Result<ImageSize> {
    decode_with(Isobmff, reader)
}

pub fn decode_tiff<R: Read + Seek>(reader: R) -> Result<ImageSize> {
    decode_with(Tiff, reader)
}

pub fn decode_webp<R: Read + Seek>(reader: R) -> Result<ImageSize> {
    decode_with(WebP, reader)
}
