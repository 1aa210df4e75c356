//! PDF export of a generated routine.
//!
//! Export runs in two steps. [`layout`] and [`paginate`] are pure and decide
//! what text goes where. [`render_pdf`] then writes the placed rows with
//! `printpdf`. Each input line of the routine becomes one block. A block may
//! wrap onto several rows, but text never flows from one block into the next.

use printpdf::{BuiltinFont, Color, Mm, PdfDocument, Rgb};

use crate::errors::{Result, SkinGenError};
use crate::profile::{RoutineResult, SkinProfile};

pub const TITLE: &str = "SkinGen AI - Personalized Skincare Routine";
pub const FILENAME: &str = "skingen_routine.pdf";

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 10.0;
const BOTTOM_MARGIN: f32 = 20.0;
const ROW_H: f32 = 10.0;
const BASELINE: f32 = 7.0;
const PT_TO_MM: f32 = 0.3528;
const TITLE_PT: f32 = 16.0;
const BODY_PT: f32 = 12.0;
/// Helvetica averages about half an em per glyph.
const AVG_GLYPH_EM: f32 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// The input line this block came from.
    pub source: String,
    pub rows: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub header: Vec<String>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Title,
    Body,
}

/// A row placed in PDF user space (origin bottom-left, millimetres).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRow {
    pub text: String,
    pub style: Style,
    pub x_mm: f32,
    pub y_mm: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub rows: Vec<PlacedRow>,
}

/// Opaque download payload.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
}

pub fn export_pdf(profile: &SkinProfile, routine: &RoutineResult) -> Result<ExportedDocument> {
    let doc = layout(profile, routine);
    let pages = paginate(&doc);
    let bytes = render_pdf(&doc.title, &pages)?;
    tracing::debug!(pages = pages.len(), bytes = bytes.len(), "rendered routine pdf");
    Ok(ExportedDocument { bytes, filename: FILENAME.to_string() })
}

pub fn layout(profile: &SkinProfile, routine: &RoutineResult) -> DocumentLayout {
    let width = chars_per_row(BODY_PT);
    let blocks = routine
        .text
        .split('\n')
        .map(|line| {
            let line = line.strip_suffix('\r').unwrap_or(line);
            Block { source: line.to_string(), rows: wrap(line, width) }
        })
        .collect();

    DocumentLayout {
        title: TITLE.to_string(),
        header: vec![
            format!("Skin Type: {}", profile.skin_type),
            format!("Goal: {}", profile.goal),
        ],
        blocks,
    }
}

struct Cursor {
    pages: Vec<Page>,
    y: f32,
}

impl Cursor {
    fn new() -> Self {
        Self { pages: vec![Page::default()], y: MARGIN }
    }

    fn skip(&mut self) {
        self.y += ROW_H;
    }

    fn place(&mut self, text: String, style: Style, x_mm: f32) {
        if self.y + ROW_H > PAGE_H - BOTTOM_MARGIN {
            self.pages.push(Page::default());
            self.y = MARGIN;
        }
        let y_mm = PAGE_H - (self.y + BASELINE);
        if let Some(page) = self.pages.last_mut() {
            page.rows.push(PlacedRow { text, style, x_mm, y_mm });
        }
        self.y += ROW_H;
    }
}

pub fn paginate(doc: &DocumentLayout) -> Vec<Page> {
    let mut cur = Cursor::new();

    let title_w = text_width_mm(&doc.title, TITLE_PT);
    let title_x = MARGIN + ((PAGE_W - 2.0 * MARGIN - title_w) / 2.0).max(0.0);
    cur.place(doc.title.clone(), Style::Title, title_x);
    cur.skip();
    for line in &doc.header {
        cur.place(line.clone(), Style::Body, MARGIN);
    }
    cur.skip();
    for block in &doc.blocks {
        for row in &block.rows {
            cur.place(row.clone(), Style::Body, MARGIN);
        }
    }
    cur.pages
}

pub fn render_pdf(title: &str, pages: &[Page]) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(export_err)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(export_err)?;

    for (i, page) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
            doc.get_page(p).get_layer(l)
        };
        for row in page.rows.iter().filter(|r| !r.text.is_empty()) {
            let (color, size, font) = match row.style {
                Style::Title => (rgb(217, 140, 159), TITLE_PT, &bold),
                Style::Body => (rgb(0, 0, 0), BODY_PT, &regular),
            };
            layer.set_fill_color(color);
            layer.use_text(to_win_ansi(&row.text), size, Mm(row.x_mm), Mm(row.y_mm), font);
        }
    }

    doc.save_to_bytes().map_err(export_err)
}

fn export_err(e: impl std::fmt::Display) -> SkinGenError {
    SkinGenError::Export(e.to_string())
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
}

fn text_width_mm(text: &str, pt: f32) -> f32 {
    text.chars().count() as f32 * pt * AVG_GLYPH_EM * PT_TO_MM
}

fn chars_per_row(pt: f32) -> usize {
    ((PAGE_W - 2.0 * MARGIN) / (pt * AVG_GLYPH_EM * PT_TO_MM)).floor() as usize
}

/// Characters WinAnsiEncoding places in 0x80..=0x9F.
const WIN_ANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

/// Builtin PDF fonts are written with WinAnsiEncoding; anything it cannot
/// encode becomes `?`.
fn to_win_ansi(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\t' => ' ',
            ' '..='~' | '\u{A0}'..='\u{FF}' => c,
            c if WIN_ANSI_EXTRAS.contains(c) => c,
            _ => '?',
        })
        .collect()
}

/// Greedy word wrap of a single line. Words longer than `width` are split.
fn wrap(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if cur_len > 0 {
                rows.push(std::mem::take(&mut cur));
                cur_len = 0;
            }
            let rest = word.split_off(width);
            rows.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        let needed = if cur_len == 0 { word.len() } else { cur_len + 1 + word.len() };
        if needed > width {
            rows.push(std::mem::take(&mut cur));
            cur_len = 0;
        }
        if cur_len > 0 {
            cur.push(' ');
            cur_len += 1;
        }
        cur.extend(word.iter());
        cur_len += word.len();
    }
    if cur_len > 0 || rows.is_empty() {
        rows.push(cur);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Goal, SkinType};

    fn dry_hydration() -> SkinProfile {
        SkinProfile::new(SkinType::Dry, Goal::Hydration, Some("aloe vera".into()))
    }

    #[test]
    fn one_block_per_input_line() {
        let r = RoutineResult::new("Morning: cleanse\nNight: moisturize\n\nRecipe 1: aloe mask");
        let doc = layout(&dry_hydration(), &r);
        assert_eq!(doc.header, vec!["Skin Type: Dry", "Goal: Hydration"]);
        let sources: Vec<&str> = doc.blocks.iter().map(|b| b.source.as_str()).collect();
        assert_eq!(sources, vec!["Morning: cleanse", "Night: moisturize", "", "Recipe 1: aloe mask"]);
        assert_eq!(doc.blocks[2].rows, vec![String::new()]);
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        let doc = layout(&dry_hydration(), &RoutineResult::new("a\r\nb"));
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].source, "a");
    }

    #[test]
    fn long_lines_wrap_inside_their_block() {
        let long = "honey ".repeat(60);
        let doc = layout(&dry_hydration(), &RoutineResult::new(format!("{long}\nNight: rest")));
        assert_eq!(doc.blocks.len(), 2);
        assert!(doc.blocks[0].rows.len() > 1);
        let width = chars_per_row(BODY_PT);
        assert!(doc.blocks[0].rows.iter().all(|r| r.chars().count() <= width));
        assert_eq!(doc.blocks[0].rows.join(" "), long.trim_end());
        assert_eq!(doc.blocks[1].rows, vec!["Night: rest".to_string()]);
    }

    #[test]
    fn oversized_word_is_split() {
        assert_eq!(wrap("abcdefgh xy", 3), vec!["abc", "def", "gh", "xy"]);
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn header_rows_precede_blocks_on_first_page() {
        let doc = layout(&dry_hydration(), &RoutineResult::new("Morning: ...\nNight: ..."));
        let pages = paginate(&doc);
        assert_eq!(pages.len(), 1);
        let texts: Vec<&str> = pages[0].rows.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![TITLE, "Skin Type: Dry", "Goal: Hydration", "Morning: ...", "Night: ..."]
        );
        assert_eq!(pages[0].rows[0].style, Style::Title);
        assert!(pages[0].rows.windows(2).all(|w| w[0].y_mm > w[1].y_mm));
    }

    #[test]
    fn long_routines_spill_onto_new_pages() {
        let text = (1..=40).map(|i| format!("Step {i}")).collect::<Vec<_>>().join("\n");
        let doc = layout(&dry_hydration(), &RoutineResult::new(text));
        let pages = paginate(&doc);
        assert_eq!(pages.len(), 2);
        let body: usize = pages.iter().map(|p| p.rows.len()).sum::<usize>() - 3;
        assert_eq!(body, 40);
        assert!(pages
            .iter()
            .flat_map(|p| &p.rows)
            .all(|r| r.y_mm >= BOTTOM_MARGIN - ROW_H && r.y_mm <= PAGE_H));
    }

    #[test]
    fn win_ansi_keeps_typographic_punctuation() {
        let text = "café \u{2018}ok\u{2019} \u{201C}yes\u{201D} \u{2013} \u{2014} \u{2022} \u{20AC}5 \u{2122}";
        assert_eq!(to_win_ansi(text), text);
    }

    #[test]
    fn win_ansi_replaces_what_it_cannot_encode() {
        assert_eq!(to_win_ansi("aloe \u{1F33F}\tmask \u{0101}\u{0085}"), "aloe ? mask ??");
    }

    #[test]
    fn exports_a_pdf_payload() {
        let doc = export_pdf(&dry_hydration(), &RoutineResult::new("Morning: ...\nNight: ...")).unwrap();
        assert_eq!(doc.filename, "skingen_routine.pdf");
        assert!(doc.bytes.starts_with(b"%PDF"));
    }
}
