//! Image dimensions from the least possible amount of header data.
//!
//! `pixdim` reads just the structural metadata of BMP, GIF, PNG, JPEG,
//! JPEG XL, AVIF/HEIF, TIFF and WebP files to report their pixel size. Pixel
//! data is never decoded. Inputs may be truncated or hostile: every failure is
//! a [`SizeError`], never a panic.
//!
//! ```no_run
//! let file = std::fs::File::open("photo.jpg")?;
//! let m = pixdim::measure(file);
//! println!("{:?} after {} bytes and {} seeks", m.result, m.stats.bytes_read, m.stats.seeks);
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod detect;
mod error;
pub mod formats;
pub mod io;
mod traits;
mod types;

use std::io::{Cursor, Read, Seek};

use tracing::debug;

pub use detect::{detect_format, sniff};
pub use error::{Result, SizeError};
pub use formats::{
    decode_bmp, decode_gif, decode_isobmff, decode_jpeg, decode_jpegxl, decode_png, decode_tiff,
    decode_webp,
};
pub use io::{ByteSource, ReadStats};
pub use traits::Decoder;
pub use types::{ImageFormat, ImageSize, Limits};

/// Outcome of one [`measure`] call together with what it cost.
#[derive(Debug)]
pub struct Measurement {
    pub format: Option<ImageFormat>,
    pub result: Result<ImageSize>,
    pub stats: ReadStats,
}

/// Sniffs the format of `src` and runs the matching decoder.
pub fn decode_source<R: Read + Seek>(src: &mut ByteSource<R>) -> Result<(ImageFormat, ImageSize)> {
    let format = sniff(src)?;
    let size = format.decode(src)?;
    Ok((format, size))
}

pub fn measure<R: Read + Seek>(reader: R) -> Measurement {
    measure_with(reader, Limits::default())
}

pub fn measure_with<R: Read + Seek>(reader: R, limits: Limits) -> Measurement {
    let mut src = match ByteSource::new(reader) {
        Ok(src) => src.with_limits(limits),
        Err(e) => {
            return Measurement {
                format: None,
                result: Err(e),
                stats: ReadStats::default(),
            };
        }
    };

    let (format, result) = match sniff(&mut src) {
        Ok(format) => (Some(format), format.decode(&mut src)),
        Err(e) => (None, Err(e)),
    };
    let stats = src.stats();
    debug!(?format, ?result, bytes_read = stats.bytes_read, seeks = stats.seeks, "measured");

    Measurement {
        format,
        result,
        stats,
    }
}

/// Dimensions of the image in `reader`, whatever its supported format.
pub fn image_size<R: Read + Seek>(reader: R) -> Result<ImageSize> {
    measure(reader).result
}

pub fn image_size_from_bytes(data: &[u8]) -> Result<ImageSize> {
    image_size(Cursor::new(data))
}
