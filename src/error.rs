//! Error types for batch QR generation.
//!
//! Malformed range bounds are absent here: they expand to an empty range
//! (see [`crate::range::expand_range`]).

use std::path::PathBuf;

/// Failures raised while turning text into a QR raster or PNG.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The payload does not fit in any QR version.
    #[error("QR data error: {0}")]
    Data(#[from] ::qrcode::types::QrError),

    /// The foreground color is not a hex color.
    #[error("invalid color: {0:?}")]
    InvalidColor(String),

    /// The pixel size is missing, zero, negative or not a number.
    #[error("invalid size: {0:?}")]
    InvalidSize(String),

    /// The requested size cannot hold one pixel per module.
    #[error("size {size}px is smaller than the {required} modules of the symbol")]
    SizeTooSmall {
        /// Requested edge length in pixels
        size: u32,
        /// Module count including the quiet zone
        required: u32,
    },

    /// PNG encoding failed.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Main error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum QrBatchError {
    /// QR generation failed for one code; the whole batch is aborted.
    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),

    /// The logo file is missing or not a decodable image.
    #[error("failed to read logo {path}: {source}")]
    LogoRead {
        /// Path that was read
        path: PathBuf,
        /// Underlying decoder or I/O error
        #[source]
        source: image::ImageError,
    },

    /// The image is too narrow for a logo of at least one pixel.
    #[error("a {base_width}px wide image cannot hold a logo")]
    LogoTooSmall {
        /// Width of the image the logo was meant for
        base_width: u32,
    },

    /// The archive sink failed mid-stream.
    #[error("archive write failed: {0}")]
    ArchiveWrite(#[from] zip::result::ZipError),

    /// Scratch file creation, flush or copy failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request expands to more codes than the configured limit.
    #[error("request expands to {requested} codes, limit is {limit}")]
    TooManyCodes {
        /// Total codes across all ranges
        requested: u64,
        /// Configured maximum
        limit: u64,
    },

    /// The request body could not be understood.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration could not be loaded or is out of range.
    #[error("configuration error: {0}")]
    Config(String),
}

impl QrBatchError {
    /// HTTP status a front end should answer with.
    ///
    /// Caller input faults map to `400`, everything else to `500`.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Encode(EncodeError::Image(_)) => 500,
            Self::Encode(_)
            | Self::LogoRead { .. }
            | Self::LogoTooSmall { .. }
            | Self::TooManyCodes { .. }
            | Self::InvalidRequest(_) => 400,
            Self::ArchiveWrite(_) | Self::Io(_) | Self::Config(_) => 500,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T, E = QrBatchError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let err = QrBatchError::from(EncodeError::InvalidColor("nope".into()));
        assert_eq!(err.status_code(), 400);

        let err = QrBatchError::TooManyCodes { requested: 10, limit: 5 };
        assert_eq!(err.status_code(), 400);

        let err = QrBatchError::LogoTooSmall { base_width: 4 };
        assert_eq!(err.status_code(), 400);

        let err = QrBatchError::from(std::io::Error::other("disk full"));
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_messages_name_the_cause() {
        let err = QrBatchError::TooManyCodes { requested: 200_001, limit: 100_000 };
        assert_eq!(err.to_string(), "request expands to 200001 codes, limit is 100000");

        let err = EncodeError::SizeTooSmall { size: 10, required: 29 };
        assert!(err.to_string().contains("29 modules"));
    }
}
