//! # PDF Writer
//!
//! A from-scratch PDF 1.7 writer covering exactly what a contact sheet needs:
//! pages, JPEG images and one line of text per page.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj Catalog
//! 2 0 obj Pages       <- page tree root
//! 3 0 obj Font        <- one standard Type1 font, never embedded
//! 4.. 0 obj           <- image XObjects, then content stream + page per page
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! JPEG frames are embedded byte-for-byte with `/DCTDecode`; the header
//! inspector supplies the pixel size and component count for the XObject
//! dictionary. Content streams are Flate-compressed.

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>
use std::path::Path;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::{Result, SheetError};
use crate::font::StandardFont;
use crate::jpeg::{self, FrameHeader};
use crate::model::{Metadata, PageSize};

/// The drawing operations the pagination driver needs from a document.
///
/// Coordinates are PDF points with the origin at the bottom-left corner.
pub trait DocumentSink {
    /// Append a page; later drawing goes to it.
    fn new_page(&mut self);

    /// Draw a JPEG with its bottom-left corner at (`x`, `y`).
    fn draw_image(&mut self, jpeg: &[u8], x: f64, y: f64, width: f64, height: f64) -> Result<()>;

    /// Draw a line of text with its baseline starting at (`x`, `y`).
    fn draw_text(&mut self, text: &str, x: f64, y: f64, font_size: f64) -> Result<()>;

    /// Width of `text` in the document font.
    fn text_width(&self, text: &str, font_size: f64) -> f64;

    /// Page width in points.
    fn page_width(&self) -> f64;

    /// Write the finished document to `path`.
    fn save(&self, path: &Path) -> Result<()>;
}

/// An in-memory PDF document.
pub struct PdfDocument {
    width: f64,
    height: f64,
    font: StandardFont,
    metadata: Metadata,
    pages: Vec<PdfPage>,
    images: Vec<EmbeddedImage>,
}

#[derive(Default)]
struct PdfPage {
    content: String,
    /// Indices into `PdfDocument::images` drawn on this page.
    images: Vec<usize>,
}

struct EmbeddedImage {
    data: Vec<u8>,
    header: FrameHeader,
}

/// Object table under construction. Index = object number; 0 is unused.
struct PdfObjects {
    objects: Vec<Vec<u8>>,
}

impl PdfObjects {
    fn reserve(&mut self) -> usize {
        self.objects.push(Vec::new());
        self.objects.len() - 1
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }
}

impl PdfDocument {
    pub fn new(page: PageSize, font: StandardFont, metadata: Metadata) -> Self {
        let (width, height) = page.dimensions();
        Self {
            width,
            height,
            font,
            metadata,
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&mut self, what: &str) -> Result<&mut PdfPage> {
        self.pages
            .last_mut()
            .ok_or_else(|| SheetError::Render(format!("{} drawn before the first page", what)))
    }

    /// Serialize the document to PDF bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut objs = PdfObjects {
            objects: vec![Vec::new()],
        };
        let catalog_id = objs.reserve();
        let pages_id = objs.reserve();

        let font_id = objs.push(
            format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                self.font.pdf_name()
            )
            .into_bytes(),
        );

        let image_ids: Vec<usize> = self
            .images
            .iter()
            .map(|image| objs.push(Self::image_xobject(image)))
            .collect();

        let mut page_ids = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let compressed = compress_to_vec_zlib(page.content.as_bytes(), 6);
            let mut stream: Vec<u8> = Vec::new();
            let _ = write!(
                stream,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            stream.extend_from_slice(&compressed);
            stream.extend_from_slice(b"\nendstream");
            let content_id = objs.push(stream);

            let mut resources = format!("/Font << /F0 {} 0 R >>", font_id);
            if !page.images.is_empty() {
                let xobjects = page
                    .images
                    .iter()
                    .map(|&idx| format!("/Im{} {} 0 R", idx, image_ids[idx]))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(resources, " /XObject << {} >>", xobjects);
            }

            let page_dict = format!(
                "<< /Type /Page /Parent {} 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                pages_id, self.width, self.height, content_id, resources
            );
            page_ids.push(objs.push(page_dict.into_bytes()));
        }

        objs.objects[catalog_id] = format!("<< /Type /Catalog /Pages {} 0 R >>", pages_id).into_bytes();

        let kids = page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        objs.objects[pages_id] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_ids.len()
        )
        .into_bytes();

        let info_id = objs.push(self.info_dict().into_bytes());

        Self::serialize(&objs, catalog_id, info_id)
    }

    fn image_xobject(image: &EmbeddedImage) -> Vec<u8> {
        let color_space = match image.header.components {
            1 => "/DeviceGray",
            4 => "/DeviceCMYK",
            _ => "/DeviceRGB",
        };
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< /Type /XObject /Subtype /Image \
             /Width {} /Height {} \
             /ColorSpace {} \
             /BitsPerComponent {} \
             /Filter /DCTDecode \
             /Length {} >>\nstream\n",
            image.header.dimensions.width(),
            image.header.dimensions.height(),
            color_space,
            image.header.precision,
            image.data.len()
        );
        data.extend_from_slice(&image.data);
        data.extend_from_slice(b"\nendstream");
        data
    }

    fn info_dict(&self) -> String {
        let mut info = String::from("<< ");
        if let Some(ref title) = self.metadata.title {
            let _ = write!(info, "/Title ({}) ", escape_pdf_string(title));
        }
        if let Some(ref author) = self.metadata.author {
            let _ = write!(info, "/Author ({}) ", escape_pdf_string(author));
        }
        if let Some(ref subject) = self.metadata.subject {
            let _ = write!(info, "/Subject ({}) ", escape_pdf_string(subject));
        }
        let creator = self.metadata.creator.as_deref().unwrap_or("video2pdf");
        let _ = write!(
            info,
            "/Creator ({}) /Producer (video2pdf {}) >>",
            escape_pdf_string(creator),
            env!("CARGO_PKG_VERSION")
        );
        info
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(objs: &PdfObjects, root_id: usize, info_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; objs.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, data) in objs.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", objs.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            objs.objects.len(),
            root_id,
            info_id,
            xref_offset
        );

        output
    }
}

impl DocumentSink for PdfDocument {
    fn new_page(&mut self) {
        self.pages.push(PdfPage::default());
    }

    fn draw_image(&mut self, jpeg: &[u8], x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        let header = jpeg::read_frame_header(jpeg)
            .map_err(|e| SheetError::Render(format!("cannot embed image: {}", e)))?;
        let idx = self.images.len();
        let page = self.current_page("image")?;
        let _ = write!(
            page.content,
            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
            width, height, x, y, idx
        );
        page.images.push(idx);
        self.images.push(EmbeddedImage {
            data: jpeg.to_vec(),
            header,
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, font_size: f64) -> Result<()> {
        let page = self.current_page("text")?;
        let _ = write!(
            page.content,
            "BT\n0 0 0 rg\n/F0 {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
            font_size,
            x,
            y,
            encode_winansi(text)
        );
        Ok(())
    }

    fn text_width(&self, text: &str, font_size: f64) -> f64 {
        self.font.measure_string(text, font_size)
    }

    fn page_width(&self) -> f64 {
        self.width
    }

    fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()).map_err(|e| SheetError::file(path, e))
    }
}

/// Escape special characters in a PDF string.
fn escape_pdf_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
}

/// Encode text as an escaped WinAnsi string literal body.
fn encode_winansi(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        let b = unicode_to_winansi(ch).unwrap_or(b'?');
        match b {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            0x20..=0x7E => out.push(b as char),
            _ => {
                let _ = write!(out, "\\{:03o}", b);
            }
        }
    }
    out
}

/// Map a Unicode codepoint to a WinAnsiEncoding byte value.
///
/// Only the Latin-1 ranges and the dash/quote/bullet block are covered.
fn unicode_to_winansi(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // Euro sign
        0x2026 => Some(0x85), // Horizontal ellipsis
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // Bullet
        0x2013 => Some(0x96), // En dash
        0x2014 => Some(0x97), // Em dash
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_jpeg(width: u16, height: u16, components: u8) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xC0];
        data.extend_from_slice(&(8 + 3 * u16::from(components)).to_be_bytes());
        data.push(8);
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.push(components);
        for id in 1..=components {
            data.extend_from_slice(&[id, 0x11, 0x00]);
        }
        data.extend_from_slice(&[0xFF, 0xD9]);
        data
    }

    fn doc() -> PdfDocument {
        PdfDocument::new(PageSize::A4, StandardFont::TimesRoman, Metadata::default())
    }

    fn text_of(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(escape_pdf_string("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_winansi_encoding() {
        assert_eq!(encode_winansi("a(b)"), "a\\(b\\)");
        assert_eq!(encode_winansi("é"), "\\351");
        assert_eq!(encode_winansi("日"), "?");
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let bytes = doc().to_bytes();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
        assert!(bytes.windows(4).any(|w| w == b"xref"));
        assert!(bytes.windows(7).any(|w| w == b"trailer"));
        assert!(text_of(&bytes).contains("/Count 0"));
    }

    #[test]
    fn test_jpeg_embedded_as_dct() {
        let mut pdf = doc();
        pdf.new_page();
        let jpeg = tiny_jpeg(1920, 1080, 3);
        pdf.draw_image(&jpeg, 0.0, 455.0, 595.0, 334.0).unwrap();
        let bytes = pdf.to_bytes();
        let text = text_of(&bytes);

        assert!(text.contains("/Filter /DCTDecode"));
        assert!(text.contains("/Width 1920 /Height 1080"));
        assert!(text.contains("/ColorSpace /DeviceRGB"));
        assert!(text.contains("/XObject << /Im0 "));
        assert!(bytes.windows(jpeg.len()).any(|w| w == jpeg.as_slice()));
    }

    #[test]
    fn test_grayscale_jpeg_color_space() {
        let mut pdf = doc();
        pdf.new_page();
        pdf.draw_image(&tiny_jpeg(8, 8, 1), 0.0, 0.0, 10.0, 10.0).unwrap();
        assert!(text_of(&pdf.to_bytes()).contains("/ColorSpace /DeviceGray"));
    }

    #[test]
    fn test_images_listed_on_their_own_page() {
        let mut pdf = doc();
        pdf.new_page();
        pdf.draw_image(&tiny_jpeg(8, 8, 3), 0.0, 0.0, 10.0, 10.0).unwrap();
        pdf.new_page();
        pdf.draw_image(&tiny_jpeg(8, 8, 3), 0.0, 0.0, 10.0, 10.0).unwrap();
        let text = text_of(&pdf.to_bytes());

        assert!(text.contains("/Count 2"));
        assert!(text.contains("/XObject << /Im0 "));
        assert!(text.contains("/XObject << /Im1 "));
        assert!(!text.contains("/Im0 4 0 R /Im1"));
    }

    #[test]
    fn test_drawing_before_first_page_fails() {
        let mut pdf = doc();
        assert!(matches!(
            pdf.draw_text("1", 0.0, 0.0, 12.0),
            Err(SheetError::Render(_))
        ));
        assert!(pdf.draw_image(&tiny_jpeg(8, 8, 3), 0.0, 0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_non_jpeg_image_rejected() {
        let mut pdf = doc();
        pdf.new_page();
        assert!(pdf.draw_image(b"\x89PNG\r\n", 0.0, 0.0, 1.0, 1.0).is_err());
        assert!(text_of(&pdf.to_bytes()).contains("/Count 1"));
    }

    #[test]
    fn test_metadata_in_pdf() {
        let metadata = Metadata {
            title: Some("Talk (2024)".to_string()),
            author: Some("Me".to_string()),
            subject: None,
            creator: None,
        };
        let pdf = PdfDocument::new(PageSize::A4, StandardFont::Helvetica, metadata);
        let text = text_of(&pdf.to_bytes());

        assert!(text.contains("/Title (Talk \\(2024\\))"));
        assert!(text.contains("/Author (Me)"));
        assert!(text.contains("/Creator (video2pdf)"));
        assert!(text.contains("/BaseFont /Helvetica"));
    }

    #[test]
    fn test_text_width_uses_document_font() {
        let pdf = doc();
        assert!((pdf.text_width("10", 12.0) - 12.0).abs() < 0.001);
        assert!((pdf.page_width() - 595.28).abs() < 0.001);
    }
}
