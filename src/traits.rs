//! The seam every format decoder plugs into.

use std::io::{Read, Seek};

use crate::error::Result;
use crate::io::ByteSource;
use crate::types::{ImageFormat, ImageSize};

/// Dimension extraction for one image format.
///
/// Implementations hold no state of their own: everything they learn comes
/// from the [`ByteSource`] they are handed, which they own exclusively for
/// the duration of the call. They must never decode pixel data and must
/// turn every malformed or short input into an error rather than a panic.
pub trait Decoder {
    /// The format this decoder understands.
    fn format(&self) -> ImageFormat;

    /// Reads the minimum needed from `src` to report the image's dimensions.
    fn decode<R: Read + Seek>(&self, src: &mut ByteSource<R>) -> Result<ImageSize>;
}
