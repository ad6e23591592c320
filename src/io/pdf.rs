//! Paginated PDF layout and encoding for the report.
//!
//! Layout is computed first as plain data (pages of positioned lines) so that
//! pagination can be inspected without parsing PDF bytes; `encode_pdf` then
//! turns a layout into a document using the standard Helvetica fonts.
//! Output carries no timestamps or random IDs, so equal input gives equal bytes.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::error::{AnalysisError, Result};
use crate::models::{ParagraphKind, ReportDocument};

use super::metrics::text_width;

/// Page size and margins in PDF points
#[derive(Debug, Clone)]
pub struct PageGeometry {
    pub width: i64,
    pub height: i64,
    pub margin: i64,
}

impl Default for PageGeometry {
    /// US Letter with one-inch margins
    fn default() -> Self {
        Self {
            width: 612,
            height: 792,
            margin: 72,
        }
    }
}

impl PageGeometry {
    fn usable_width(&self) -> i64 {
        self.width - 2 * self.margin
    }

    fn top(&self) -> i64 {
        self.height - self.margin
    }
}

/// Built-in fonts registered in every page's resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfFont {
    Regular,
    Bold,
}

impl PdfFont {
    fn resource_name(&self) -> &'static str {
        match self {
            PdfFont::Regular => "F1",
            PdfFont::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    font: PdfFont,
    size: i64,
    leading: i64,
    space_after: i64,
}

const TITLE_STYLE: TextStyle = TextStyle {
    font: PdfFont::Bold,
    size: 18,
    leading: 22,
    space_after: 12,
};

const HEADING_STYLE: TextStyle = TextStyle {
    font: PdfFont::Bold,
    size: 12,
    leading: 14,
    space_after: 6,
};

const BODY_STYLE: TextStyle = TextStyle {
    font: PdfFont::Regular,
    size: 10,
    leading: 12,
    space_after: 6,
};

impl TextStyle {
    fn measure(&self, text: &str) -> f64 {
        text_width(self.font, self.size, text)
    }
}

/// Which block of the report a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Title,
    Paragraph(usize),
}

/// A single line of text at a fixed baseline position
#[derive(Debug, Clone)]
pub struct PlacedLine {
    pub block: Block,
    pub font: PdfFont,
    pub size: i64,
    pub x: i64,
    pub y: i64,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

/// Paginated layout of a report
#[derive(Debug, Clone)]
pub struct ReportLayout {
    pub title: String,
    pub pages: Vec<PageLayout>,
}

impl ReportLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of distinct paragraph blocks placed across all pages
    pub fn paragraph_blocks(&self) -> usize {
        let mut seen = std::collections::BTreeSet::new();
        for line in self.pages.iter().flat_map(|p| &p.lines) {
            if let Block::Paragraph(index) = line.block {
                seen.insert(index);
            }
        }
        seen.len()
    }
}

/// Lay out the title and paragraphs onto pages
pub fn layout_report(report: &ReportDocument, geometry: &PageGeometry) -> ReportLayout {
    let mut cursor = LayoutCursor::new(geometry);

    cursor.place_block(Block::Title, &report.title, TITLE_STYLE);
    for (index, paragraph) in report.paragraphs.iter().enumerate() {
        let style = match paragraph.kind {
            ParagraphKind::Heading => HEADING_STYLE,
            ParagraphKind::Body => BODY_STYLE,
        };
        cursor.place_block(Block::Paragraph(index), &paragraph.text, style);
    }

    ReportLayout {
        title: report.title.clone(),
        pages: cursor.finish(),
    }
}

struct LayoutCursor<'a> {
    geometry: &'a PageGeometry,
    pages: Vec<PageLayout>,
    current: PageLayout,
    y: i64,
}

impl<'a> LayoutCursor<'a> {
    fn new(geometry: &'a PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: PageLayout::default(),
            y: geometry.top(),
        }
    }

    fn place_block(&mut self, block: Block, text: &str, style: TextStyle) {
        let max_width = self.geometry.usable_width() as f64;
        for line in wrap_text(text, max_width, |candidate| style.measure(candidate)) {
            if self.y - style.leading < self.geometry.margin && !self.current.lines.is_empty() {
                self.break_page();
            }
            self.y -= style.leading;
            self.current.lines.push(PlacedLine {
                block,
                font: style.font,
                size: style.size,
                x: self.geometry.margin,
                y: self.y,
                text: line,
            });
        }
        self.y -= style.space_after;
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = self.geometry.top();
    }

    fn finish(mut self) -> Vec<PageLayout> {
        if !self.current.lines.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// Wrap text so that no line measures more than `max_width`; overlong words are split
fn wrap_text(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };
        if measure(&candidate) <= max_width {
            line = candidate;
            continue;
        }

        if !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if measure(word) <= max_width {
            line = word.to_string();
            continue;
        }

        for c in word.chars() {
            line.push(c);
            if measure(&line) > max_width && line.chars().count() > 1 {
                line.pop();
                lines.push(std::mem::replace(&mut line, c.to_string()));
            }
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Encode a laid-out report as PDF bytes
pub fn encode_pdf(layout: &ReportLayout, geometry: &PageGeometry) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font_dictionary("Helvetica"));
    let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            PdfFont::Regular.resource_name() => regular_id,
            PdfFont::Bold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = page_content(page);
        let encoded = content
            .encode()
            .map_err(|e| AnalysisError::Render(format!("content stream: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), geometry.width.into(), geometry.height.into()],
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(to_win_ansi(&layout.title)),
        "Producer" => Object::string_literal("statement-analyst"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| AnalysisError::Render(format!("PDF save error: {e}")))?;
    Ok(buf)
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn page_content(page: &PageLayout) -> Content {
    let mut operations = Vec::with_capacity(page.lines.len() * 5);
    for line in &page.lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![line.font.resource_name().into(), line.size.into()],
        ));
        operations.push(Operation::new("Td", vec![line.x.into(), line.y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(to_win_ansi(&line.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }
}

/// Encode text for the standard fonts' WinAnsi encoding; unmappable chars become `?`
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u8,
            '\t' => b' ',
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            'Œ' => 0x8c,
            'œ' => 0x9c,
            'Ÿ' => 0x9f,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_REPORT_TITLE;

    #[test]
    fn test_paragraph_blocks_match_non_empty_lines() {
        let mut text = String::new();
        for i in 0..7 {
            text.push_str(&format!("Ligne {}\n\n\n", i));
        }
        let report = ReportDocument::from_text(DEFAULT_REPORT_TITLE, &text);
        let layout = layout_report(&report, &PageGeometry::default());

        assert_eq!(layout.paragraph_blocks(), 7);
        assert_eq!(layout.page_count(), 1);
    }

    #[test]
    fn test_long_report_paginates() {
        let text: String = (0..200).map(|i| format!("Transaction {}\n", i)).collect();
        let report = ReportDocument::from_text(DEFAULT_REPORT_TITLE, &text);
        let geometry = PageGeometry::default();
        let layout = layout_report(&report, &geometry);

        assert!(layout.page_count() > 1);
        assert_eq!(layout.paragraph_blocks(), 200);
        for line in layout.pages.iter().flat_map(|p| &p.lines) {
            assert!(line.y >= geometry.margin);
            assert!(line.y <= geometry.top());
        }
    }

    #[test]
    fn test_empty_report_has_title_page() {
        let report = ReportDocument::from_text(DEFAULT_REPORT_TITLE, "");
        let layout = layout_report(&report, &PageGeometry::default());

        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.paragraph_blocks(), 0);
        assert_eq!(layout.pages[0].lines[0].block, Block::Title);
    }

    #[test]
    fn test_wrap_text() {
        let per_char = |s: &str| s.chars().count() as f64 * 5.0;

        let lines = wrap_text("Total des dépenses pour le mois d'octobre", 60.0, per_char);
        assert!(lines.iter().all(|l| l.chars().count() <= 12));
        assert_eq!(lines.join(" "), "Total des dépenses pour le mois d'octobre");

        let split = wrap_text("ABCDEFGHIJ", 20.0, per_char);
        assert_eq!(split, vec!["ABCD", "EFGH", "IJ"]);
    }

    #[test]
    fn test_upper_case_lines_stay_inside_margins() {
        let text = "TOTAL DES DEPENSES PAR CATEGORIE: SHOPPING 1234.56, CASH 60.00, BILLS 104.00, FEES 3.00 EUR\n\
                    # WWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWWW\n\
                    MMMM WWWW MMMM WWWW MMMM WWWW MMMM WWWW MMMM WWWW MMMM WWWW MMMM WWWW MMMM WWWW";
        let report = ReportDocument::from_text(DEFAULT_REPORT_TITLE, text);
        let geometry = PageGeometry::default();
        let layout = layout_report(&report, &geometry);

        let right_edge = (geometry.width - geometry.margin) as f64;
        for line in layout.pages.iter().flat_map(|p| &p.lines) {
            let width = text_width(line.font, line.size, &line.text);
            assert!(
                line.x as f64 + width <= right_edge,
                "line '{}' ends at {} pt",
                line.text,
                line.x as f64 + width
            );
        }
        assert_eq!(layout.paragraph_blocks(), 3);
        // The 93-character line no longer fits on one Helvetica 10 line
        assert!(layout.pages[0].lines.iter().filter(|l| l.block == Block::Paragraph(0)).count() > 1);
    }

    #[test]
    fn test_to_win_ansi() {
        assert_eq!(to_win_ansi("Solde"), b"Solde".to_vec());
        assert_eq!(to_win_ansi("é"), vec![0xe9]);
        assert_eq!(to_win_ansi("12 €"), vec![b'1', b'2', b' ', 0x80]);
        assert_eq!(to_win_ansi("📊"), vec![b'?']);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let report = ReportDocument::from_text(
            DEFAULT_REPORT_TITLE,
            "Revenus: 763,01 €\nParenthèses (non fermées\n\\ barre",
        );
        let geometry = PageGeometry::default();
        let layout = layout_report(&report, &geometry);

        let first = encode_pdf(&layout, &geometry).unwrap();
        let second = encode_pdf(&layout, &geometry).unwrap();

        assert!(first.starts_with(b"%PDF-1.4"));
        assert_eq!(first, second);
    }
}
