//! # JPEG Header Inspection
//!
//! Reads frame geometry out of a JPEG byte stream by walking its marker
//! structure. No pixel data is decoded: the PDF embeds the raw bytes with
//! `/DCTDecode`, so all the layout needs is width, height and the component
//! count.
//!
//! ```text
//! FF D8                      SOI (no length)
//! FF E0 00 10 ...            APP0, length includes the two length bytes
//! FF DB 00 43 ...            DQT
//! FF C0 00 11 08 HH HH WW WW NC ...   SOF0: precision, height, width, components
//! ...
//! FF D9                      EOI
//! ```
//!
//! Only the baseline `SOF0` marker is recognized. Progressive and extended
//! frames (`C1`..`CF`) are skipped like any other segment, so such files read
//! as [`HeaderError::NotFound`].

use crate::error::HeaderError;

const SOI: u8 = 0xD8;
const EOI: u8 = 0xD9;
const TEM: u8 = 0x01;
const SOF0: u8 = 0xC0;

/// Pixel dimensions of a frame. Both values are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterDimensions {
    width: u32,
    height: u32,
}

impl RasterDimensions {
    /// `None` if either side is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Everything the baseline frame header tells us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub dimensions: RasterDimensions,
    /// Sample precision in bits (8 for baseline).
    pub precision: u8,
    /// 1 = grayscale, 3 = YCbCr, 4 = CMYK.
    pub components: u8,
}

/// Return the width and height of a baseline JPEG.
pub fn inspect(bytes: &[u8]) -> Result<RasterDimensions, HeaderError> {
    read_frame_header(bytes).map(|header| header.dimensions)
}

/// Walk the marker stream up to the first `SOF0` segment and decode it.
pub fn read_frame_header(bytes: &[u8]) -> Result<FrameHeader, HeaderError> {
    let mut reader = SegmentReader { bytes, offset: 0 };

    while reader.offset < bytes.len() {
        // Fill bytes before a marker type are legal and may repeat.
        while reader.peek() == Some(0xFF) {
            reader.offset += 1;
        }
        let marker = match reader.read_u8() {
            Some(m) => m,
            None => break,
        };

        match marker {
            SOI | TEM | 0xD0..=0xD7 => continue,
            EOI => break,
            _ => {}
        }

        let length_at = reader.offset;
        let length = reader.read_u16().ok_or(HeaderError::Truncated { offset: length_at })?;
        if length < 2 {
            return Err(HeaderError::BadSegmentLength {
                offset: length_at,
                length,
            });
        }

        if marker == SOF0 {
            return reader.read_sof0();
        }

        let payload = usize::from(length) - 2;
        if reader.offset + payload > bytes.len() {
            return Err(HeaderError::Truncated {
                offset: bytes.len(),
            });
        }
        reader.offset += payload;
    }

    Err(HeaderError::NotFound)
}

/// Bounds-checked big-endian reads over the JPEG buffer.
struct SegmentReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl SegmentReader<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.offset).copied()
    }

    fn read_u8(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.offset += 1;
        Some(b)
    }

    fn read_u16(&mut self) -> Option<u16> {
        let hi = *self.bytes.get(self.offset)?;
        let lo = *self.bytes.get(self.offset + 1)?;
        self.offset += 2;
        Some(u16::from_be_bytes([hi, lo]))
    }

    /// Precision, height, width, component count, in that order.
    fn read_sof0(&mut self) -> Result<FrameHeader, HeaderError> {
        let truncated = HeaderError::Truncated {
            offset: self.bytes.len(),
        };
        let precision = self.read_u8().ok_or(truncated.clone())?;
        let height = self.read_u16().ok_or(truncated.clone())?;
        let width = self.read_u16().ok_or(truncated.clone())?;
        let components = self.read_u8().ok_or(truncated)?;

        if width == 0 || height == 0 {
            return Err(HeaderError::ZeroDimension { width, height });
        }

        Ok(FrameHeader {
            dimensions: RasterDimensions {
                width: u32::from(width),
                height: u32::from(height),
            },
            precision,
            components,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app0() -> Vec<u8> {
        let mut seg = vec![0xFF, 0xE0, 0x00, 0x10];
        seg.extend_from_slice(b"JFIF\0");
        seg.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
        seg
    }

    fn sof(marker: u8, width: u16, height: u16, components: u8) -> Vec<u8> {
        let length = 8 + 3 * u16::from(components);
        let mut seg = vec![0xFF, marker];
        seg.extend_from_slice(&length.to_be_bytes());
        seg.push(8);
        seg.extend_from_slice(&height.to_be_bytes());
        seg.extend_from_slice(&width.to_be_bytes());
        seg.push(components);
        for id in 1..=components {
            seg.extend_from_slice(&[id, 0x11, 0x00]);
        }
        seg
    }

    fn jpeg(segments: &[Vec<u8>]) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        for s in segments {
            data.extend_from_slice(s);
        }
        data.extend_from_slice(&[0xFF, 0xD9]);
        data
    }

    #[test]
    fn test_reads_sof0_after_app0() {
        let data = jpeg(&[app0(), sof(0xC0, 1920, 1080, 3)]);
        assert_eq!(
            inspect(&data),
            Ok(RasterDimensions {
                width: 1920,
                height: 1080
            })
        );
    }

    #[test]
    fn test_frame_header_components() {
        let data = jpeg(&[sof(0xC0, 4, 2, 1)]);
        let header = read_frame_header(&data).unwrap();
        assert_eq!(header.components, 1);
        assert_eq!(header.precision, 8);
    }

    #[test]
    fn test_empty_input_is_not_found() {
        assert_eq!(inspect(&[]), Err(HeaderError::NotFound));
    }

    #[test]
    fn test_eoi_before_frame_is_not_found() {
        let data = jpeg(&[app0()]);
        assert_eq!(inspect(&data), Err(HeaderError::NotFound));
    }

    #[test]
    fn test_progressive_frame_is_not_matched() {
        let data = jpeg(&[app0(), sof(0xC2, 640, 480, 3)]);
        assert_eq!(inspect(&data), Err(HeaderError::NotFound));
    }

    #[test]
    fn test_fill_bytes_and_standalone_markers() {
        let mut data = vec![0xFF, 0xFF, 0xFF, 0xD8, 0xFF, 0x01, 0xFF, 0xD3];
        data.extend(sof(0xC0, 10, 20, 3));
        assert_eq!(
            inspect(&data),
            Ok(RasterDimensions {
                width: 10,
                height: 20
            })
        );
    }

    #[test]
    fn test_truncated_segment_does_not_panic() {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x40];
        data.extend_from_slice(&[0u8; 8]);
        assert_eq!(inspect(&data), Err(HeaderError::Truncated { offset: 14 }));
    }

    #[test]
    fn test_truncated_sof0() {
        let data = [0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x04];
        assert!(matches!(inspect(&data), Err(HeaderError::Truncated { .. })));
    }

    #[test]
    fn test_length_field_cut_off() {
        let data = [0xFF, 0xD8, 0xFF, 0xE1, 0x00];
        assert_eq!(inspect(&data), Err(HeaderError::Truncated { offset: 4 }));
    }

    #[test]
    fn test_segment_length_below_two() {
        let data = [0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x01, 0x00];
        assert_eq!(
            inspect(&data),
            Err(HeaderError::BadSegmentLength {
                offset: 4,
                length: 1
            })
        );
    }

    #[test]
    fn test_zero_height_rejected() {
        let data = jpeg(&[sof(0xC0, 16, 0, 3)]);
        assert_eq!(
            inspect(&data),
            Err(HeaderError::ZeroDimension {
                width: 16,
                height: 0
            })
        );
    }

    #[test]
    fn test_trailing_fill_bytes_only() {
        assert_eq!(inspect(&[0xFF, 0xFF]), Err(HeaderError::NotFound));
    }

    #[test]
    fn test_dimensions_reject_zero_sides() {
        assert_eq!(RasterDimensions::new(0, 1080), None);
        assert_eq!(RasterDimensions::new(1920, 0), None);
        let dims = RasterDimensions::new(1920, 1080).unwrap();
        assert_eq!((dims.width(), dims.height()), (1920, 1080));
    }

    #[test]
    fn test_real_encoder_output() {
        let img = image::RgbImage::from_fn(37, 19, |x, y| image::Rgb([x as u8, y as u8, 90]));

        let mut buf = Vec::new();
        let encoder = image::codecs::jpeg::JpegEncoder::new(&mut buf);
        image::ImageEncoder::write_image(encoder, img.as_raw(), 37, 19, image::ColorType::Rgb8)
            .unwrap();

        let header = read_frame_header(&buf).unwrap();
        assert_eq!(
            header.dimensions,
            RasterDimensions {
                width: 37,
                height: 19
            }
        );
        assert_eq!(header.components, 3);
    }
}
