//! Error types for the blemish-removal crate.

/// Errors that can occur while configuring or running blemish removal.
///
/// A click that finds no blemish is not an error; see
/// [`ClickOutcome::NoBlemish`](crate::ClickOutcome::NoBlemish).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A click landed outside the working image.
    #[error("point ({x}, {y}) lies outside the {width}x{height} image")]
    PointOutsideImage {
        /// Click x coordinate.
        x: i64,
        /// Click y coordinate.
        y: i64,
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// A square region would leave the padded image.
    ///
    /// The border-pad contract makes this unreachable for valid clicks; it
    /// signals a broken internal invariant rather than bad user input.
    #[error("{size}x{size} region at ({x}, {y}) exceeds {width}x{height} padded image")]
    RegionOutOfBounds {
        /// Left edge of the region.
        x: i64,
        /// Top edge of the region.
        y: i64,
        /// Side length of the region.
        size: u32,
        /// Padded image width.
        width: u32,
        /// Padded image height.
        height: u32,
    },

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred while decoding or encoding an image.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));

        let config = Error::InvalidConfig {
            field: "box_size",
            reason: "must be odd, got 34".to_string(),
        };
        let msg = config.to_string();
        assert!(msg.contains("box_size"));
        assert!(msg.contains("34"));

        let outside = Error::PointOutsideImage {
            x: -1,
            y: 5,
            width: 10,
            height: 20,
        };
        assert!(outside.to_string().contains("10x20"));

        let region = Error::RegionOutOfBounds {
            x: 3,
            y: 4,
            size: 35,
            width: 100,
            height: 90,
        };
        let msg = region.to_string();
        assert!(msg.contains("35x35"));
        assert!(msg.contains("100x90"));
    }
}
