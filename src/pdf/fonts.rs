//! Standard-14 Helvetica metrics and string encoding
//!
//! Text is written with the built-in Helvetica faces using WinAnsiEncoding, so
//! no font program is embedded. Widths are in 1/1000ths of the em square and
//! are needed to right-align the page counter.

use crate::layout::Length;

/// Built-in fonts used by the exporter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    pub const ALL: [Font; 2] = [Font::Helvetica, Font::HelveticaBold];

    /// PostScript name for the /BaseFont entry
    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name used in content streams
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    fn widths(&self) -> &'static [u16; 95] {
        match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Advance width of one WinAnsi byte
    fn byte_width(&self, byte: u8) -> u16 {
        match byte {
            32..=126 => self.widths()[(byte - 32) as usize],
            0x91 | 0x92 => 222,
            0x93 | 0x94 => 333,
            0x95 => 350,
            0x96 => 556,
            0x97 | 0x85 => 1000,
            0xA0 => 278,
            _ => DEFAULT_WIDTH,
        }
    }

    /// Rendered width of `text` at `size_pt`
    pub fn text_width(&self, text: &str, size_pt: f64) -> Length {
        let units: u32 = encode_win_ansi(text)
            .into_iter()
            .map(|b| self.byte_width(b) as u32)
            .sum();
        Length::from_pt(units as f64 * size_pt / 1000.0)
    }
}

const DEFAULT_WIDTH: u16 = 556;

/// Helvetica widths for characters 32-126
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, // space ! " # $ % & '
    333, 333, 389, 584, 278, 333, 278, 278, // ( ) * + , - . /
    556, 556, 556, 556, 556, 556, 556, 556, // 0-7
    556, 556, 278, 278, 584, 584, 584, 556, // 8 9 : ; < = > ?
    1015, 667, 667, 722, 722, 667, 611, 778, // @ A-G
    722, 278, 500, 667, 556, 833, 722, 778, // H-O
    667, 778, 722, 667, 611, 722, 667, 944, // P-W
    667, 667, 611, 278, 278, 278, 469, 556, // X Y Z [ \ ] ^ _
    333, 556, 556, 500, 556, 556, 278, 556, // ` a-g
    556, 222, 222, 500, 222, 833, 556, 556, // h-o
    556, 556, 333, 500, 278, 556, 500, 722, // p-w
    500, 500, 500, 334, 260, 334, 584, // x y z { | } ~
];

/// Helvetica-Bold widths for characters 32-126
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, // space ! " # $ % & '
    333, 333, 389, 584, 278, 333, 278, 278, // ( ) * + , - . /
    556, 556, 556, 556, 556, 556, 556, 556, // 0-7
    556, 556, 333, 333, 584, 584, 584, 611, // 8 9 : ; < = > ?
    975, 722, 722, 722, 722, 667, 611, 778, // @ A-G
    722, 278, 556, 722, 611, 833, 722, 778, // H-O
    667, 778, 722, 667, 611, 722, 667, 944, // P-W
    667, 667, 611, 333, 278, 333, 584, 556, // X Y Z [ \ ] ^ _
    333, 556, 611, 556, 611, 556, 333, 611, // ` a-g
    611, 278, 278, 556, 278, 889, 611, 611, // h-o
    611, 611, 389, 556, 333, 611, 556, 778, // p-w
    556, 556, 500, 389, 280, 389, 584, // x y z { | } ~
];

/// Map text onto WinAnsiEncoding, replacing unsupported characters with `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Encode text as the body of a PDF literal string
///
/// Delimiters and backslashes are escaped; bytes outside printable ASCII are
/// written as octal escapes so the content stream stays 7-bit.
pub fn escape_pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in encode_win_ansi(text) {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'(' => out.push_str("\\("),
            b')' => out.push_str("\\)"),
            32..=126 => out.push(byte as char),
            _ => out.push_str(&format!("\\{:03o}", byte)),
        }
    }
    out
}
