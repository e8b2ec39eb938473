//! # video2pdf
//!
//! Turn a list of video timestamps into a PDF contact sheet: one captured
//! frame per timestamp, stacked top to bottom, a new page whenever the next
//! frame would not fit.
//!
//! No image decoding library is involved. Frames come from `ffmpeg` as JPEG,
//! their size is read straight from the JPEG frame header, and the bytes are
//! embedded in the PDF as-is.
//!
//! ## Architecture
//!
//! ```text
//! Timestamps (CLI / JSON / shell)
//!       ↓
//!   [capture]  : ffmpeg grabs one JPEG per timestamp
//!       ↓
//!   [jpeg]     : marker walk: width, height, components
//!       ↓
//!   [layout]   : cursor-based single-column pagination
//!       ↓
//!   [pdf]      : DCTDecode images + page numbers → PDF bytes
//! ```
//!
//! [`sheet::build_contact_sheet`] drives one run; [`inspect`] and [`place`]
//! are the two pure building blocks and can be used on their own.

pub mod capture;
pub mod error;
pub mod font;
pub mod jpeg;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod sheet;
pub mod shell;

pub use error::{HeaderError, Result, SheetError};
pub use jpeg::{inspect, RasterDimensions};
pub use layout::{place, LayoutCursor, LayoutParams, PlacementDecision};
pub use model::{SheetConfig, Timestamp};
pub use sheet::{build_contact_sheet, render_to_file, SheetSummary};
