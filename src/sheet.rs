//! # Contact Sheet Driver
//!
//! Ties the pieces together for one run: capture each timestamp, read the
//! frame header, place the frame, draw it. Frames are fed to the layout in
//! timestamp order through a single cursor.

use std::path::PathBuf;

use crate::capture::FrameSource;
use crate::error::{Result, SheetError};
use crate::jpeg;
use crate::layout::{place, LayoutCursor, LayoutParams};
use crate::model::{MalformedPolicy, SheetConfig};
use crate::pdf::{DocumentSink, PdfDocument};

/// Baseline of the page number, in points from the bottom edge.
pub const PAGE_NUMBER_Y: f64 = 15.0;

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetSummary {
    pub pages: usize,
    pub placed: usize,
    /// Timestamps (seconds) whose frames were unreadable and left out.
    pub skipped: Vec<u32>,
}

/// Capture, lay out and draw every timestamp of `config` into `sink`.
///
/// Each new page gets its 1-based number centered at the bottom.
pub fn build_contact_sheet<S, D>(config: &SheetConfig, source: &mut S, sink: &mut D) -> Result<SheetSummary>
where
    S: FrameSource + ?Sized,
    D: DocumentSink + ?Sized,
{
    let params = LayoutParams::from_config(config)?;
    let (_, page_height) = config.page.dimensions();
    let mut cursor = LayoutCursor::new(params);
    let mut summary = SheetSummary::default();

    log::info!(
        "Laying out {} frames at {} pt wide, starting {} pt up",
        config.timestamps.len(),
        params.content_width,
        params.content_top
    );

    for &at in &config.timestamps {
        let frame = source.capture(at)?;

        let dims = match jpeg::inspect(&frame) {
            Ok(dims) => dims,
            Err(header_err) => {
                let err = SheetError::MalformedImage {
                    seconds: at.seconds(),
                    source: header_err,
                };
                match config.on_malformed {
                    MalformedPolicy::Abort => return Err(err),
                    MalformedPolicy::Skip => {
                        log::warn!("Skipping {}: {}", at, err);
                        summary.skipped.push(at.seconds());
                        continue;
                    }
                }
            }
        };

        let decision = place(dims, &mut cursor, summary.placed == 0);
        log::debug!(
            "{} ({}x{}) -> page {} at y={} h={}{}",
            at,
            dims.width(),
            dims.height(),
            decision.page_index,
            decision.y_offset,
            decision.rendered_height,
            if decision.is_new_page { " (new page)" } else { "" }
        );
        if decision.overflows(page_height as i64) {
            log::warn!(
                "Frame at {} is {} pt tall and does not fit on the page",
                at,
                decision.rendered_height
            );
        }

        if decision.is_new_page {
            sink.new_page();
            draw_page_number(sink, config, decision.page_index)?;
        }

        sink.draw_image(
            &frame,
            decision.x_offset as f64,
            decision.y_offset as f64,
            decision.rendered_width as f64,
            decision.rendered_height as f64,
        )?;
        summary.placed += 1;
    }

    summary.pages = cursor.current_page_index;
    Ok(summary)
}

fn draw_page_number<D: DocumentSink + ?Sized>(sink: &mut D, config: &SheetConfig, page: usize) -> Result<()> {
    let label = page.to_string();
    let width = sink.text_width(&label, config.font_size);
    let x = ((sink.page_width() - width) / 2.0).floor();
    sink.draw_text(&label, x, PAGE_NUMBER_Y, config.font_size)
}

/// Run `config` end to end and save the PDF. Returns where it was written.
pub fn render_to_file<S>(config: &SheetConfig, source: &mut S) -> Result<PathBuf>
where
    S: FrameSource + ?Sized,
{
    config.validate()?;
    let path = config.output_path()?;

    let mut document = PdfDocument::new(config.page, config.font, config.metadata.clone());
    let summary = build_contact_sheet(config, source, &mut document)?;
    document.save(&path)?;

    log::info!(
        "Wrote {} frames on {} pages to {}",
        summary.placed,
        summary.pages,
        path.display()
    );
    if !summary.skipped.is_empty() {
        log::warn!("{} frames were unreadable and left out", summary.skipped.len());
    }
    Ok(path)
}
