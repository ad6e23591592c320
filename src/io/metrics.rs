//! Advance widths of the standard Helvetica fonts in thousandths of an em,
//! indexed by the WinAnsi codes the report writer emits.

use super::pdf::{to_win_ansi, PdfFont};

/// Helvetica, codes 0x20..=0x7E
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0 - ?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @ - O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P - _
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // ` - o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p - ~
];

/// Helvetica-Bold, codes 0x20..=0x7E
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // space - /
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0 - ?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @ - O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P - _
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // ` - o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p - ~
];

/// Width assumed for codes without an entry; no Helvetica glyph is wider
const FALLBACK_WIDTH: u16 = 1000;

/// Advance width of one WinAnsi code
pub fn glyph_width(font: PdfFont, code: u8) -> u16 {
    let ascii = match font {
        PdfFont::Regular => &HELVETICA,
        PdfFont::Bold => &HELVETICA_BOLD,
    };

    match code {
        0x20..=0x7e => ascii[(code - 0x20) as usize],
        _ => match accented_base(code) {
            Some(base) => ascii[(base - 0x20) as usize],
            None => special_width(font, code),
        },
    }
}

/// Width of `text` in points once encoded for the standard fonts
pub fn text_width(font: PdfFont, size: i64, text: &str) -> f64 {
    let units: u32 = to_win_ansi(text)
        .into_iter()
        .map(|code| u32::from(glyph_width(font, code)))
        .sum();
    f64::from(units) * size as f64 / 1000.0
}

/// Latin-1 accented letters share the advance width of their base letter
fn accented_base(code: u8) -> Option<u8> {
    let base = match code {
        0xc0..=0xc5 => b'A',
        0xc7 => b'C',
        0xc8..=0xcb => b'E',
        0xcc..=0xcf => b'I',
        0xd1 => b'N',
        0xd2..=0xd6 => b'O',
        0xd9..=0xdc => b'U',
        0xdd => b'Y',
        0xe0..=0xe5 => b'a',
        0xe7 => b'c',
        0xe8..=0xeb => b'e',
        0xf1 => b'n',
        0xf2..=0xf6 => b'o',
        0xf9..=0xfc => b'u',
        0xfd | 0xff => b'y',
        _ => return None,
    };
    Some(base)
}

fn special_width(font: PdfFont, code: u8) -> u16 {
    let bold = font == PdfFont::Bold;
    match code {
        0x80 => 556,
        0x85 | 0x97 => 1000,
        0x91 | 0x92 if bold => 278,
        0x91 | 0x92 => 222,
        0x93 | 0x94 if bold => 500,
        0x93 | 0x94 => 333,
        0x95 => 350,
        0x96 => 556,
        0xa0 => 278,
        0xb0 => 400,
        0xc6 => 1000,
        0xd0 => 722,
        0xd7 | 0xf7 => 584,
        0xd8 => 778,
        0xde => 667,
        0xdf | 0xf8 => 611,
        0xe6 => 889,
        // dotless-i accents are wider than the plain `i`
        0xec..=0xef => 278,
        0xf0 | 0xfe if bold => 611,
        0xf0 | 0xfe => 556,
        _ => FALLBACK_WIDTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_widths() {
        assert_eq!(glyph_width(PdfFont::Regular, b' '), 278);
        assert_eq!(glyph_width(PdfFont::Regular, b'W'), 944);
        assert_eq!(glyph_width(PdfFont::Regular, b'i'), 222);
        assert_eq!(glyph_width(PdfFont::Regular, b'~'), 584);
        assert_eq!(glyph_width(PdfFont::Bold, b'm'), 889);
        assert_eq!(glyph_width(PdfFont::Bold, b'0'), 556);
    }

    #[test]
    fn test_accented_and_symbols() {
        assert_eq!(glyph_width(PdfFont::Regular, 0xe9), glyph_width(PdfFont::Regular, b'e'));
        assert_eq!(glyph_width(PdfFont::Bold, 0xc9), glyph_width(PdfFont::Bold, b'E'));
        assert_eq!(glyph_width(PdfFont::Regular, 0x80), 556);
        assert_eq!(glyph_width(PdfFont::Regular, 0x8a), FALLBACK_WIDTH);
    }

    #[test]
    fn test_text_width() {
        // "WW" in Helvetica 10 is 2 * 9.44 pt
        assert!((text_width(PdfFont::Regular, 10, "WW") - 18.88).abs() < 1e-9);
        assert_eq!(text_width(PdfFont::Bold, 12, ""), 0.0);
        assert!(text_width(PdfFont::Regular, 10, "MMMM") > text_width(PdfFont::Regular, 10, "iiii"));
    }
}
