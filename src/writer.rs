//! HTML → PDF writer – ties together parsing, styling, layout, pagination and
//! rendering behind the [`HtmlToPdf`] trait.

use crate::dom::{body_children, font_face_sources, parse_html, stylesheet_text};
use crate::error::Result;
use crate::fonts::FontManager;
use crate::layout::{compute_layout, paginate};
use crate::layout_config::LayoutConfig;
use crate::render::render_pdf;

/// Converts rendered markup into PDF bytes.
pub trait HtmlToPdf {
    fn write_pdf(&self, html: &str) -> Result<Vec<u8>>;
}

/// Page geometry and metadata for the generated PDF.
#[derive(Debug, Clone)]
pub struct PageConfig {
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Page width in points (default: A4 = 595.28).
    pub page_width: f32,
    /// Page height in points (default: A4 = 841.89).
    pub page_height: f32,
    /// Page margin in points (default: 40).
    pub page_margin: f32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: "Invoice".to_string(),
            page_width: 595.28,
            page_height: 841.89,
            page_margin: 40.0,
        }
    }
}

/// The built-in converter for the controlled HTML subset.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    pub page: PageConfig,
}

impl PdfWriter {
    pub fn new(page: PageConfig) -> Self {
        Self { page }
    }

    /// Parse, style, lay out and paginate without rendering.
    ///
    /// Fonts named by `@font-face` rules are loaded here; a missing font file
    /// fails the conversion.
    pub fn layout(&self, html: &str) -> Result<LayoutConfig> {
        self.layout_with_fonts(html).map(|(layout, _)| layout)
    }

    fn layout_with_fonts(&self, html: &str) -> Result<(LayoutConfig, FontManager)> {
        let dom = parse_html(html);
        let fonts = FontManager::from_sources(&font_face_sources(&stylesheet_text(&dom)))?;
        let body = body_children(&dom);

        let boxes = compute_layout(&body, self.page.page_width, self.page.page_margin, &fonts);
        let config = paginate(
            &boxes,
            &self.page.title,
            self.page.page_width,
            self.page.page_height,
            self.page.page_margin,
            &fonts,
        );
        log::debug!(
            "laid out {} top-level box(es) on {} page(s)",
            boxes.len(),
            config.pages.len()
        );
        Ok((config, fonts))
    }

    /// Full conversion returning the layout next to the bytes.
    pub fn write_pdf_with_layout(&self, html: &str) -> Result<(Vec<u8>, LayoutConfig)> {
        let (layout, fonts) = self.layout_with_fonts(html)?;
        let bytes = render_pdf(&layout, &fonts)?;
        Ok((bytes, layout))
    }
}

impl HtmlToPdf for PdfWriter {
    fn write_pdf(&self, html: &str) -> Result<Vec<u8>> {
        let (bytes, _) = self.write_pdf_with_layout(html)?;
        Ok(bytes)
    }
}
