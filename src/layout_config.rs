//! Layout config – the intermediate representation between layout computation
//! and PDF rendering. This is the "frozen" structure that encodes exactly what
//! goes on each page.

use serde::{Deserialize, Serialize};

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
}

/// One page of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub boxes: Vec<LayoutBox>,
}

/// A positioned rectangle with optional content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutBox {
    /// Position relative to page top-left, in points.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    pub background_color: Option<[f32; 4]>,
    pub border: Option<BorderStyle>,
    pub text: Option<TextContent>,

    /// Nested boxes, positioned in page coordinates as well.
    pub children: Vec<LayoutBox>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorderStyle {
    pub width: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    /// Pre-wrapped lines of text.
    pub lines: Vec<TextLine>,
    pub font_size: f32,
    pub bold: bool,
    pub color: [f32; 4],
    pub line_height: f32,
    /// Distance from the top of a line to its baseline.
    pub ascender: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// X offset within the layout box (for alignment)
    pub x_offset: f32,
    /// Y offset from the top of the box
    pub y_offset: f32,
}

impl LayoutConfig {
    /// Empty A4 layout.
    pub fn a4(title: &str) -> Self {
        Self {
            title: title.to_string(),
            // A4: 210mm × 297mm = 595.28 × 841.89 points
            page_width_pt: 595.28,
            page_height_pt: 841.89,
            pages: Vec::new(),
        }
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Every text line on `page`, in drawing order.
    pub fn page_text(&self, page: usize) -> Vec<&str> {
        let mut out = Vec::new();
        if let Some(p) = self.pages.get(page) {
            for lbox in &p.boxes {
                collect_text(lbox, &mut out);
            }
        }
        out
    }
}

fn collect_text<'a>(lbox: &'a LayoutBox, out: &mut Vec<&'a str>) {
    if let Some(text) = &lbox.text {
        out.extend(text.lines.iter().map(|l| l.text.as_str()));
    }
    for child in &lbox.children {
        collect_text(child, out);
    }
}

impl LayoutBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            background_color: None,
            border: None,
            text: None,
            children: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_keeps_pages() {
        let mut config = LayoutConfig::a4("Invoice");
        let mut lbox = LayoutBox::new(40.0, 40.0, 100.0, 14.0);
        lbox.text = Some(TextContent {
            lines: vec![TextLine {
                text: "Total".to_string(),
                x_offset: 0.0,
                y_offset: 0.0,
            }],
            font_size: 10.0,
            bold: true,
            color: [0.0, 0.0, 0.0, 1.0],
            line_height: 14.0,
            ascender: 7.5,
        });
        config.pages.push(PageLayout {
            page_index: 0,
            boxes: vec![lbox],
        });

        let parsed = LayoutConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed.pages.len(), 1);
        assert_eq!(parsed.page_text(0), vec!["Total"]);
        assert!(parsed.page_text(1).is_empty());
    }
}
