use std::io;
use thiserror::Error;

/// Why an image's dimensions could not be determined.
///
/// Messages are diagnostics for humans; callers should treat every variant
/// as "dimensions unavailable" and not parse the text.
#[derive(Error, Debug)]
pub enum SizeError {
    #[error("data length {0} is too short")]
    TooShort(usize),

    #[error("unknown format {0}")]
    UnknownFormat(String),

    #[error("EOF at {offset}: wanted {wanted} bytes, got {got}")]
    Truncated { offset: u64, wanted: usize, got: usize },

    #[error("{0}")]
    Signature(String),

    #[error("{0} not found")]
    Missing(&'static str),

    #[error("{0}")]
    Unsupported(String),

    #[error("{0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SizeError {
    /// True when the input ended before the decoder had what it needed.
    #[inline]
    pub fn is_truncation(&self) -> bool {
        matches!(self, Self::Truncated { .. } | Self::TooShort(_))
    }

    #[inline]
    pub fn is_signature(&self) -> bool {
        matches!(self, Self::Signature(_) | Self::UnknownFormat(_))
    }

    /// Short stable name of the failure category, for grouping reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TooShort(_) | Self::Truncated { .. } => "truncated",
            Self::UnknownFormat(_) => "unknown format",
            Self::Signature(_) => "signature",
            Self::Missing(_) => "missing",
            Self::Unsupported(_) => "unsupported",
            Self::Malformed(_) => "malformed",
            Self::Io(_) => "io",
        }
    }

    pub(crate) fn signature(what: &str, bytes: &[u8]) -> Self {
        Self::Signature(format!("{what} {}", hexdump(bytes)))
    }
}

pub type Result<T> = std::result::Result<T, SizeError>;

/// Hex form of the leading bytes of `data`, capped so messages stay short.
pub(crate) fn hexdump(data: &[u8]) -> String {
    hex::encode(&data[..data.len().min(11)])
}
