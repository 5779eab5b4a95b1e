use super::layout::{Block, ReportLayout};
use super::RenderError;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Rect, Rgb,
};
use std::borrow::Cow;
use std::io::BufWriter;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 20.0;
const LEFT: f32 = 20.0;
const INDENT: f32 = 25.0;

const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const GREY: (f32, f32, f32) = (0.35, 0.35, 0.35);
const PANEL: (f32, f32, f32) = (1.0, 0.97, 0.86);

#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub pages: usize,
}

struct Painter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl Painter {
    fn new(title: &str) -> Result<Self, RenderError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Font(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Font(e.to_string()))?;

        Ok(Self { doc, layer, regular, bold, y: TOP, pages: 1 })
    }

    /// Starts a new page when fewer than `needed` millimetres remain.
    fn reserve(&mut self, needed: f32) {
        if self.y - needed >= BOTTOM {
            return;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
    }

    fn line(&mut self, text: &str, size: f32, x: f32, bold: bool, color: (f32, f32, f32), advance: f32) {
        self.reserve(advance);
        let (r, g, b) = color;
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(builtin_safe(text), size, Mm(x), Mm(self.y), font);
        self.y -= advance;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    fn panel(&mut self, lines: &[String], size: f32, advance: f32) {
        let height = lines.len() as f32 * advance + 6.0;
        self.reserve(height);

        let (r, g, b) = PANEL;
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        let top = self.y + advance;
        let rect = Rect::new(Mm(LEFT - 3.0), Mm(top - height), Mm(PAGE_WIDTH - LEFT + 3.0), Mm(top))
            .with_mode(PaintMode::Fill);
        self.layer.add_rect(rect);

        for line in lines {
            self.line(line, size, LEFT, false, BLACK, advance);
        }
        self.gap(6.0);
    }

    fn finish(self) -> Result<RenderedReport, RenderError> {
        let pages = self.pages;
        let mut buf = BufWriter::new(Vec::new());
        self.doc.save(&mut buf).map_err(|e| RenderError::Save(e.to_string()))?;
        let bytes = buf.into_inner().map_err(|e| RenderError::Save(e.to_string()))?;
        Ok(RenderedReport { bytes, pages })
    }
}

pub fn paint(layout: &ReportLayout) -> Result<RenderedReport, RenderError> {
    let mut painter = Painter::new(&layout.title)?;

    for block in &layout.blocks {
        match block {
            Block::Title { title, subtitle } => {
                painter.line(title, 18.0, LEFT, true, BLACK, 8.0);
                painter.line(subtitle, 10.0, LEFT, false, GREY, 6.0);
                painter.gap(6.0);
            }
            Block::Section(heading) => {
                painter.gap(2.0);
                painter.line(heading, 12.0, LEFT, true, BLACK, 7.0);
            }
            Block::Field { label, value } => {
                painter.line(&format!("{}: {}", label, value), 10.0, INDENT, false, BLACK, 5.5);
            }
            Block::Classification { label, tone } => {
                painter.line(&format!("Classification: {}", label), 14.0, INDENT, true, tone.rgb(), 8.0);
            }
            Block::Confidence(percent) => {
                painter.line(&format!("Confidence: {}", percent), 10.0, INDENT, false, BLACK, 6.0);
            }
            Block::Interpretation(text) => {
                for line in wrap_text(text, 90) {
                    painter.line(&line, 9.0, INDENT, false, GREY, 4.5);
                }
                painter.gap(2.0);
            }
            Block::Probability { label, percent } => {
                painter.line(&format!("  - {}: {}", label, percent), 9.0, INDENT, false, BLACK, 5.0);
            }
            Block::Timestamp(text) => {
                painter.gap(4.0);
                painter.line(text, 8.0, LEFT, false, GREY, 8.0);
            }
            Block::Disclaimer(text) => {
                let mut lines = vec!["Disclaimer".to_string()];
                lines.extend(wrap_text(text, 95));
                painter.panel(&lines, 8.0, 4.0);
            }
        }
    }

    painter.finish()
}

/// The built-in Helvetica faces are not Unicode fonts. Accented Latin
/// letters are folded to their base letter and anything else becomes `?`.
fn builtin_safe(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }
    let mut folded = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if c.is_ascii() => folded.push(c),
            'À'..='Å' => folded.push('A'),
            'à'..='å' => folded.push('a'),
            'Ç' => folded.push('C'),
            'ç' => folded.push('c'),
            'È'..='Ë' => folded.push('E'),
            'è'..='ë' => folded.push('e'),
            'Ì'..='Ï' => folded.push('I'),
            'ì'..='ï' => folded.push('i'),
            'Ñ' => folded.push('N'),
            'ñ' => folded.push('n'),
            'Ò'..='Ö' | 'Ø' => folded.push('O'),
            'ò'..='ö' | 'ø' => folded.push('o'),
            'Ù'..='Ü' => folded.push('U'),
            'ù'..='ü' => folded.push('u'),
            'Ý' => folded.push('Y'),
            'ý' | 'ÿ' => folded.push('y'),
            'ß' => folded.push_str("ss"),
            'Æ' => folded.push_str("AE"),
            'æ' => folded.push_str("ae"),
            '\u{2018}' | '\u{2019}' => folded.push('\''),
            '\u{201C}' | '\u{201D}' => folded.push('"'),
            '\u{2013}' | '\u{2014}' => folded.push('-'),
            _ => folded.push('?'),
        }
    }
    Cow::Owned(folded)
}

/// Greedy word wrap on character count.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
