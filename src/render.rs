//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).
//!
//! Text is set in the face the layout was measured with, embedded into the
//! document. Builtin Helvetica is used only when no face could be loaded.

use printpdf::*;

use crate::error::Result;
use crate::fonts::FontManager;
use crate::layout_config::*;

/// Render a LayoutConfig into PDF bytes.
pub fn render_pdf(config: &LayoutConfig, fonts: &FontManager) -> Result<Vec<u8>> {
    let doc = build_document(config, fonts);
    Ok(doc.save(&PdfSaveOptions::default(), &mut Vec::new()))
}

/// Assemble the document: font resources plus one page of ops per layout page.
fn build_document(config: &LayoutConfig, fonts: &FontManager) -> PdfDocument {
    let page_w = Mm(config.page_width_pt * PT_TO_MM);
    let page_h = Mm(config.page_height_pt * PT_TO_MM);

    let mut doc = PdfDocument::new(&config.title);
    let font = embed_font(&mut doc, fonts);

    let mut pages: Vec<PdfPage> = config
        .pages
        .iter()
        .map(|page_layout| {
            let mut page = PageOps::new(config.page_height_pt, font.clone());
            for lbox in &page_layout.boxes {
                page.draw(lbox);
            }
            PdfPage::new(page_w, page_h, page.ops)
        })
        .collect();
    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    log::debug!("rendering {} PDF page(s)", pages.len());
    doc.with_pages(pages);
    doc
}

/// Font text is drawn with.
#[derive(Debug, Clone)]
enum TextFont {
    /// The measured face, registered with the document.
    Embedded(FontId),
    /// Builtin Helvetica (regular or bold per text run).
    Builtin,
}

fn embed_font(doc: &mut PdfDocument, fonts: &FontManager) -> TextFont {
    let Some(bytes) = fonts.font_bytes() else {
        return TextFont::Builtin;
    };
    let mut warnings = Vec::new();
    match ParsedFont::from_bytes(bytes, 0, &mut warnings) {
        Some(parsed) => TextFont::Embedded(doc.add_font(&parsed)),
        None => {
            log::warn!("Font could not be embedded; drawing text in Helvetica");
            TextFont::Builtin
        }
    }
}

/// Text for the builtin fonts.
///
/// printpdf hands builtin-font strings to lopdf, which writes their UTF-8
/// bytes as-is under WinAnsiEncoding, so only ASCII survives intact.
fn to_builtin_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\u{20AC}' => out.push_str("EUR"),
            '\u{2026}' => out.push_str("..."),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{00A0}' => out.push(' '),
            c if c.is_ascii() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Points to millimetres.
const PT_TO_MM: f32 = 0.352778;

fn rgb(c: &[f32; 4]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

/// Rectangle in PDF space (origin bottom-left).
#[derive(Clone, Copy)]
struct Rect {
    left: f32,
    bottom: f32,
    right: f32,
    top: f32,
}

impl Rect {
    /// Convert a top-left layout box into PDF space.
    fn of_box(lbox: &LayoutBox, page_height: f32) -> Self {
        let top = page_height - lbox.y;
        Self {
            left: lbox.x,
            bottom: top - lbox.height,
            right: lbox.x + lbox.width,
            top,
        }
    }

    /// Corner points, counter-clockwise from bottom-left.
    fn corners(self) -> Vec<LinePoint> {
        [
            (self.left, self.bottom),
            (self.right, self.bottom),
            (self.right, self.top),
            (self.left, self.top),
        ]
        .into_iter()
        .map(|(x, y)| LinePoint {
            p: Point { x: Pt(x), y: Pt(y) },
            bezier: false,
        })
        .collect()
    }
}

/// Collects the drawing ops of one page.
struct PageOps {
    page_height: f32,
    font: TextFont,
    ops: Vec<Op>,
}

impl PageOps {
    fn new(page_height: f32, font: TextFont) -> Self {
        Self {
            page_height,
            font,
            ops: Vec::new(),
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: &[f32; 4]) {
        self.ops.push(Op::SetFillColor { col: rgb(color) });
        self.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![PolygonRing {
                    points: rect.corners(),
                }],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
    }

    fn stroke_rect(&mut self, rect: Rect, border: &BorderStyle) {
        self.ops.push(Op::SetOutlineColor {
            col: rgb(&border.color),
        });
        self.ops.push(Op::SetOutlineThickness {
            pt: Pt(border.width),
        });
        self.ops.push(Op::DrawLine {
            line: Line {
                points: rect.corners(),
                is_closed: true,
            },
        });
    }

    /// One text section per wrapped line; `top` is the box top in PDF space.
    fn text(&mut self, left: f32, top: f32, text: &TextContent) {
        for line in text.lines.iter().filter(|l| !l.text.is_empty()) {
            let baseline = top - line.y_offset - text.ascender;
            let (set_size, write) = match &self.font {
                TextFont::Embedded(id) => (
                    Op::SetFontSize {
                        size: Pt(text.font_size),
                        font: id.clone(),
                    },
                    Op::WriteText {
                        items: vec![TextItem::Text(line.text.clone())],
                        font: id.clone(),
                    },
                ),
                TextFont::Builtin => {
                    let font = if text.bold {
                        BuiltinFont::HelveticaBold
                    } else {
                        BuiltinFont::Helvetica
                    };
                    (
                        Op::SetFontSizeBuiltinFont {
                            size: Pt(text.font_size),
                            font,
                        },
                        Op::WriteTextBuiltinFont {
                            items: vec![TextItem::Text(to_builtin_text(&line.text))],
                            font,
                        },
                    )
                }
            };
            self.ops.extend([
                Op::StartTextSection,
                Op::SetTextCursor {
                    pos: Point {
                        x: Pt(left + line.x_offset),
                        y: Pt(baseline),
                    },
                },
                set_size,
                Op::SetLineHeight {
                    lh: Pt(text.line_height),
                },
                Op::SetFillColor {
                    col: rgb(&text.color),
                },
                write,
                Op::EndTextSection,
            ]);
        }
    }

    /// Draw a box, then its children on top of it.
    fn draw(&mut self, lbox: &LayoutBox) {
        let rect = Rect::of_box(lbox, self.page_height);
        if let Some(bg) = &lbox.background_color {
            self.fill_rect(rect, bg);
        }
        if let Some(border) = &lbox.border {
            self.stroke_rect(rect, border);
        }
        if let Some(text) = &lbox.text {
            self.text(lbox.x, rect.top, text);
        }
        for child in &lbox.children {
            self.draw(child);
        }
    }
}
