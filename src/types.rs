use std::fmt;

/// Pixel dimensions exactly as stored in the file header.
///
/// No range checks are applied: zero, or anything the source field can hold,
/// is passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Same image turned by 90 degrees.
    #[inline]
    #[must_use]
    pub const fn rotated(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Bmp,
    Gif,
    Png,
    Jpeg,
    JpegXl,
    Isobmff,
    Tiff,
    WebP,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 8] = [
        Self::Bmp,
        Self::Gif,
        Self::Png,
        Self::Jpeg,
        Self::JpegXl,
        Self::Isobmff,
        Self::Tiff,
        Self::WebP,
    ];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bmp => "BMP",
            Self::Gif => "GIF",
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::JpegXl => "JPEG XL",
            Self::Isobmff => "HEIF",
            Self::Tiff => "TIFF",
            Self::WebP => "WebP",
        }
    }

    /// Lower-case file extensions conventionally used for the format.
    #[must_use]
    pub const fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Bmp => &["bmp", "dib"],
            Self::Gif => &["gif"],
            Self::Png => &["png"],
            Self::Jpeg => &["jpg", "jpeg", "jpe", "jfif"],
            Self::JpegXl => &["jxl"],
            Self::Isobmff => &["avif", "heic", "heif"],
            Self::Tiff => &["tif", "tiff"],
            Self::WebP => &["webp"],
        }
    }

    /// Case-insensitive lookup by extension, without the leading dot.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Upper bounds on structure walks, so hostile files cannot make a decoder
/// spin on cyclic or endlessly repeated structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// TIFF image file directories followed before giving up.
    pub max_ifds: u32,
    /// ISOBMFF boxes visited in a single sibling walk.
    pub max_boxes: u32,
    /// JPEG marker segments visited before giving up.
    pub max_segments: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_ifds: 1024,
            max_boxes: 4096,
            max_segments: 65536,
        }
    }
}

impl Limits {
    pub fn with_max_ifds(mut self, max: u32) -> Self {
        self.max_ifds = max;
        self
    }

    pub fn with_max_boxes(mut self, max: u32) -> Self {
        self.max_boxes = max;
        self
    }

    pub fn with_max_segments(mut self, max: u32) -> Self {
        self.max_segments = max;
        self
    }
}
