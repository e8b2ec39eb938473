//! Structured error types for video2pdf.
//!
//! [`HeaderError`] covers the JPEG header walk. [`SheetError`] is the unified
//! error returned by everything else: configuration, the external capture and
//! download processes, and PDF output.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why the header inspector could not produce frame dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// No baseline start-of-frame marker before end-of-image or end of buffer.
    #[error("no baseline SOF0 frame header found")]
    NotFound,

    /// A marker segment claims more bytes than the buffer holds.
    #[error("JPEG data truncated at byte {offset}")]
    Truncated { offset: usize },

    /// A segment length field smaller than the two length bytes themselves.
    #[error("invalid segment length {length} at byte {offset}")]
    BadSegmentLength { offset: usize, length: u16 },

    /// The frame header declares a zero width or height.
    #[error("frame header declares {width}x{height}")]
    ZeroDimension { width: u16, height: u16 },
}

/// The unified error type returned by the public video2pdf API.
#[derive(Debug, Error)]
pub enum SheetError {
    /// A captured frame was not a readable baseline JPEG.
    #[error("frame at {seconds}s is not a usable JPEG: {source}")]
    MalformedImage {
        seconds: u32,
        #[source]
        source: HeaderError,
    },

    /// The external frame grabber failed.
    #[error("capturing frame at {seconds}s failed: {reason}")]
    Capture { seconds: u32, reason: String },

    /// The external downloader failed.
    #[error("downloading {url} failed: {reason}")]
    Download { url: String, reason: String },

    /// A timestamp string was not `m:ss`, `h:mm:ss` or plain seconds.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The JSON configuration failed to parse.
    #[error("failed to parse configuration: {source}{}", hint_suffix(.hint))]
    Config {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A mandatory run parameter was not set.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// The page geometry leaves no room for frames.
    #[error("invalid layout: {0}")]
    Layout(String),

    /// The document writer was used out of order.
    #[error("render error: {0}")]
    Render(String),

    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;

impl SheetError {
    pub(crate) fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SheetError::File {
            path: path.into(),
            source,
        }
    }
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for SheetError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the configuration schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the file truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        SheetError::Config { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_carries_hint() {
        let err: SheetError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let text = err.to_string();
        assert!(text.starts_with("failed to parse configuration"));
        assert!(text.contains("Hint: Check for trailing commas"));
    }

    #[test]
    fn test_malformed_image_keeps_header_error_as_source() {
        let malformed = SheetError::MalformedImage {
            seconds: 3,
            source: HeaderError::NotFound,
        };
        assert!(malformed.to_string().starts_with("frame at 3s is not a usable JPEG"));
        let source = std::error::Error::source(&malformed).unwrap();
        assert_eq!(source.to_string(), HeaderError::NotFound.to_string());
    }
}
