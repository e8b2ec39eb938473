//! # Page Layout Engine
//!
//! Places frames into fixed-size pages, one column, top to bottom, in
//! timestamp order. Every frame is scaled to exactly the content width; its
//! height follows from the aspect ratio. When the next frame would cross the
//! bottom margin the engine opens a new page. There is no look-ahead and no
//! backtracking: once placed, a frame's page is final.
//!
//! Coordinates are PDF user space: points, origin at the bottom-left corner.
//! `y_offset` is the bottom edge of the placed image, so the cursor tracks the
//! lowest edge reached on the current page.
//!
//! ```text
//!  page_content_top ─┬──────────────┐  <- first frame on the page sits here,
//!                    │   frame 1    │     cursor stays at the top value
//!                    ├──────────────┤  <- frame 2: top - h2, cursor moves down
//!                    │   frame 2    │
//!  0 (bottom margin) ┴──────────────┘
//! ```

pub mod page_break;

use crate::error::{Result, SheetError};
use crate::jpeg::RasterDimensions;
use crate::model::SheetConfig;
use page_break::{decide_break, BreakDecision};

/// The run-constant geometry of a contact sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    /// Width every frame is scaled to, in whole points.
    pub content_width: i64,
    /// Vertical start position on a fresh page.
    pub content_top: i64,
    /// Horizontal offset of every frame.
    pub left_margin: i64,
}

/// Largest page side accepted, in points (200 inches).
pub const MAX_PAGE_EXTENT: f64 = 14_400.0;

impl LayoutParams {
    /// Derive the layout geometry from a run configuration.
    ///
    /// The content width is the page width minus both side margins,
    /// truncated to whole points.
    pub fn from_config(config: &SheetConfig) -> Result<Self> {
        let (page_width, page_height) = config.page.dimensions();
        let valid_side = |side: f64| side.is_finite() && side > 0.0 && side <= MAX_PAGE_EXTENT;
        if !valid_side(page_width) || !valid_side(page_height) {
            return Err(SheetError::Layout(format!(
                "page size {} x {} pt is outside 0..{} pt",
                page_width, page_height, MAX_PAGE_EXTENT
            )));
        }

        let content_width = page_width - 2.0 * config.margin as f64;
        if content_width < 1.0 {
            return Err(SheetError::Layout(format!(
                "margins of {} pt leave no room on a {:.2} pt wide page",
                config.margin, page_width
            )));
        }
        if content_width > MAX_PAGE_EXTENT {
            return Err(SheetError::Layout(format!(
                "margins of {} pt make frames wider than {} pt",
                config.margin, MAX_PAGE_EXTENT
            )));
        }

        let content_top = config.start_y.checked_sub(config.top_margin).ok_or_else(|| {
            SheetError::Layout(format!(
                "top margin of {} pt is out of range for a start position of {} pt",
                config.top_margin, config.start_y
            ))
        })?;

        Ok(Self {
            content_width: content_width as i64,
            content_top,
            left_margin: config.margin,
        })
    }
}

/// Mutable state threaded through one pagination run.
///
/// A cursor belongs to exactly one run. Each placement depends on the one
/// before it, so calls to [`place`] must come in timestamp order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutCursor {
    /// Number of pages opened so far; the current page's 1-based number.
    pub current_page_index: usize,
    pub vertical_position: i64,
    pub page_content_top: i64,
    pub page_content_width: i64,
    pub left_margin: i64,
}

impl LayoutCursor {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            current_page_index: 0,
            vertical_position: params.content_top,
            page_content_top: params.content_top,
            page_content_width: params.content_width,
            left_margin: params.left_margin,
        }
    }
}

/// Where one frame goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementDecision {
    pub page_index: usize,
    pub x_offset: i64,
    pub y_offset: i64,
    pub rendered_width: i64,
    pub rendered_height: i64,
    pub is_new_page: bool,
}

impl PlacementDecision {
    /// True when the frame does not fit on a page `page_height` points tall.
    ///
    /// Only a frame taller than the space above a fresh page's start position
    /// can do this. The engine still places it; callers that care check here.
    pub fn overflows(&self, page_height: i64) -> bool {
        self.y_offset < 0 || self.y_offset.saturating_add(self.rendered_height) > page_height
    }
}

/// Height of a frame scaled to `content_width`, rounded down and clamped to
/// the `i64` range.
pub fn scaled_height(dims: RasterDimensions, content_width: i64) -> i64 {
    let height = i128::from(dims.height()) * i128::from(content_width) / i128::from(dims.width());
    height.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Place one frame and advance the cursor.
///
/// The first frame on a page is placed at the top position and leaves the
/// cursor there; every later frame on the same page moves the cursor down by
/// its own height and is placed at the new position.
pub fn place(dims: RasterDimensions, cursor: &mut LayoutCursor, is_first_image: bool) -> PlacementDecision {
    let rendered_width = cursor.page_content_width;
    let rendered_height = scaled_height(dims, rendered_width);

    let decision = decide_break(is_first_image, cursor.vertical_position, rendered_height);
    let is_new_page = decision == BreakDecision::NewPage;

    match decision {
        BreakDecision::NewPage => {
            cursor.vertical_position = cursor.page_content_top;
            cursor.current_page_index += 1;
        }
        BreakDecision::SamePage => {
            cursor.vertical_position -= rendered_height;
        }
    }

    PlacementDecision {
        page_index: cursor.current_page_index,
        x_offset: cursor.left_margin,
        y_offset: cursor.vertical_position,
        rendered_width,
        rendered_height,
        is_new_page,
    }
}

/// Lay out a whole run with a fresh cursor.
pub fn paginate<I>(frames: I, params: LayoutParams) -> Vec<PlacementDecision>
where
    I: IntoIterator<Item = RasterDimensions>,
{
    let mut cursor = LayoutCursor::new(params);
    frames
        .into_iter()
        .enumerate()
        .map(|(i, dims)| place(dims, &mut cursor, i == 0))
        .collect()
}
