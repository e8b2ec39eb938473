//! # Standard Fonts
//!
//! The page number is the only text on a contact sheet, so the standard PDF
//! fonts are all we need: they are never embedded, and their advance widths
//! are fixed by the Adobe font metrics.

mod metrics;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The regular faces of the three standard PDF font families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StandardFont {
    Helvetica,
    TimesRoman,
    Courier,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::TimesRoman => "Times-Roman",
            Self::Courier => "Courier",
        }
    }

    /// Advance width of `ch` in points. Characters outside printable ASCII
    /// use the width of `?`, which is what WinAnsi substitution draws.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let table = match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::TimesRoman => &metrics::TIMES_ROMAN,
            Self::Courier => return 600.0 / 1000.0 * font_size,
        };
        let code = ch as u32;
        let idx = if (0x20..=0x7E).contains(&code) {
            (code - 0x20) as usize
        } else {
            ('?' as u32 - 0x20) as usize
        };
        f64::from(table[idx]) / 1000.0 * font_size
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }
}

impl fmt::Display for StandardFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pdf_name())
    }
}

impl FromStr for StandardFont {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "helvetica" => Ok(Self::Helvetica),
            "times" | "times-roman" | "times roman" => Ok(Self::TimesRoman),
            "courier" => Ok(Self::Courier),
            other => Err(format!(
                "unknown font '{}' (expected Helvetica, Times-Roman or Courier)",
                other
            )),
        }
    }
}

impl TryFrom<String> for StandardFont {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StandardFont> for String {
    fn from(font: StandardFont) -> Self {
        font.pdf_name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_space() {
        let w = StandardFont::Helvetica.char_width(' ', 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_times_digits() {
        let w = StandardFont::TimesRoman.measure_string("12", 12.0);
        assert!((w - 12.0).abs() < 0.001);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let a = StandardFont::Courier.measure_string("iii", 10.0);
        let b = StandardFont::Courier.measure_string("WWW", 10.0);
        assert!((a - b).abs() < 0.001);
    }

    #[test]
    fn test_non_ascii_uses_question_mark_width() {
        let font = StandardFont::TimesRoman;
        assert_eq!(font.char_width('é', 12.0), font.char_width('?', 12.0));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Times-Roman".parse::<StandardFont>(), Ok(StandardFont::TimesRoman));
        assert_eq!("helvetica".parse::<StandardFont>(), Ok(StandardFont::Helvetica));
        assert_eq!("COURIER".parse::<StandardFont>(), Ok(StandardFont::Courier));
        assert!("Comic Sans".parse::<StandardFont>().is_err());
    }
}
