//! # Run Configuration
//!
//! Everything one contact-sheet run needs: the source video, where the PDF
//! goes, the timestamps to capture, and the page geometry. A configuration can
//! come from a JSON file, the command line, or the interactive shell; all three
//! end up as a [`SheetConfig`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetError};
use crate::font::StandardFont;

/// A complete run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetConfig {
    /// The video to capture frames from.
    pub input: Option<PathBuf>,

    /// The PDF file name. A bare name lands next to the input video.
    pub output: Option<PathBuf>,

    /// Capture offsets, in the order the frames appear in the PDF.
    pub timestamps: Vec<Timestamp>,

    /// Left and right margin in points.
    pub margin: i64,

    /// Subtracted from `start_y` to get the top position of a fresh page.
    pub top_margin: i64,

    /// Vertical position of the first frame on a page, before `top_margin`.
    pub start_y: i64,

    /// Page size. Defaults to A4.
    pub page: PageSize,

    /// Font for page numbers.
    pub font: StandardFont,

    pub font_size: f64,

    pub metadata: Metadata,

    /// What to do with a frame that is not a readable baseline JPEG.
    pub on_malformed: MalformedPolicy,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            timestamps: Vec::new(),
            margin: 0,
            top_margin: 0,
            start_y: 455,
            page: PageSize::A4,
            font: StandardFont::TimesRoman,
            font_size: 12.0,
            metadata: Metadata::default(),
            on_malformed: MalformedPolicy::Skip,
        }
    }
}

impl SheetConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| SheetError::file(path, e))?;
        Self::from_json(&json)
    }

    /// The full output path, resolved against the input video's directory.
    pub fn output_path(&self) -> Result<PathBuf> {
        let input = self.input.as_deref().ok_or(SheetError::MissingParameter("input"))?;
        let output = self
            .output
            .as_deref()
            .ok_or(SheetError::MissingParameter("output"))?;
        resolve_output_path(input, output)
    }

    /// Check that a run has everything it needs.
    pub fn validate(&self) -> Result<()> {
        if self.input.as_deref().map_or(true, |p| p.as_os_str().is_empty()) {
            return Err(SheetError::MissingParameter("input"));
        }
        if self.output.as_deref().map_or(true, |p| p.as_os_str().is_empty()) {
            return Err(SheetError::MissingParameter("output"));
        }
        if self.timestamps.is_empty() {
            return Err(SheetError::MissingParameter("timestamps"));
        }
        Ok(())
    }
}

/// Place `output` next to `video` unless it already names a directory.
///
/// A video path without a directory part resolves against the current
/// working directory.
pub fn resolve_output_path(video: &Path, output: &Path) -> Result<PathBuf> {
    if output.is_absolute() {
        return Ok(output.to_path_buf());
    }
    let dir = match video.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir()?,
    };
    Ok(dir.join(output))
}

/// What the driver does when a captured frame has no usable header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MalformedPolicy {
    /// Log the frame and continue with the next timestamp.
    #[default]
    Skip,
    /// Stop the run with an error.
    Abort,
}

/// Document metadata embedded in the PDF Info dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Tabloid => (792.0, 1224.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// A capture offset into the video, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "TimestampRepr", into = "String")]
pub struct Timestamp(pub u32);

impl Timestamp {
    pub fn seconds(self) -> u32 {
        self.0
    }

    /// Parse every whitespace-separated timestamp in `list`.
    pub fn parse_list(list: &str) -> Result<Vec<Timestamp>> {
        list.split_whitespace().map(str::parse).collect()
    }
}

impl FromStr for Timestamp {
    type Err = SheetError;

    /// Accepts `m:ss`, `h:mm:ss` or plain seconds.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let invalid = || SheetError::InvalidTimestamp(trimmed.to_string());
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let parts = trimmed
            .split(':')
            .map(|p| p.parse::<u32>().map_err(|_| invalid()))
            .collect::<Result<Vec<u32>>>()?;

        let seconds = match parts.as_slice() {
            [s] => Some(*s),
            [m, s] => m.checked_mul(60).and_then(|m| m.checked_add(*s)),
            [h, m, s] => h
                .checked_mul(3600)
                .and_then(|h| h.checked_add(m.checked_mul(60)?))
                .and_then(|hm| hm.checked_add(*s)),
            _ => None,
        };
        seconds.map(Timestamp).ok_or_else(invalid)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Timestamps in JSON may be `"1:30"` or `90`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimestampRepr {
    Seconds(u32),
    Text(String),
}

impl TryFrom<TimestampRepr> for Timestamp {
    type Error = SheetError;

    fn try_from(repr: TimestampRepr) -> Result<Self> {
        match repr {
            TimestampRepr::Seconds(s) => Ok(Timestamp(s)),
            TimestampRepr::Text(text) => text.parse(),
        }
    }
}

impl From<Timestamp> for String {
    fn from(t: Timestamp) -> Self {
        t.to_string()
    }
}
