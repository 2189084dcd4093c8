//! Font loading and text measurement using `ttf-parser`.
//!
//! The document's `@font-face` file is measured glyph by glyph so text wraps
//! the way the face sets it, and the same bytes are embedded by the renderer.
//! Without a usable face we fall back to Helvetica-like average widths.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A loaded font face with metrics.
#[derive(Clone)]
pub struct FontData {
    /// Raw font bytes, embedded into the PDF by the renderer.
    pub bytes: Vec<u8>,
    pub units_per_em: f32,
    pub ascender: f32,
    pub descender: f32,
    /// Horizontal advance in font units for every mapped code point.
    advances: HashMap<char, u16>,
}

/// Advance widths of every code point in the face's Unicode cmap subtables.
fn advance_table(face: &ttf_parser::Face<'_>) -> HashMap<char, u16> {
    let mut advances = HashMap::new();
    let Some(cmap) = face.tables().cmap else {
        return advances;
    };
    for subtable in cmap.subtables.into_iter().filter(|s| s.is_unicode()) {
        subtable.codepoints(|cp| {
            let Some(ch) = char::from_u32(cp) else {
                return;
            };
            if let Some(advance) = subtable
                .glyph_index(cp)
                .and_then(|gid| face.glyph_hor_advance(gid))
            {
                advances.entry(ch).or_insert(advance);
            }
        });
    }
    advances
}

/// Measures text with the document font, or heuristically without one.
#[derive(Clone, Default)]
pub struct FontManager {
    face: Option<FontData>,
}

impl FontManager {
    /// Manager with heuristic metrics only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the first usable `@font-face` source.
    ///
    /// `file://` sources must exist; a file that is not a parsable font is
    /// skipped with a warning. Other URL schemes are not fetched.
    pub fn from_sources(sources: &[String]) -> Result<Self> {
        let mut mgr = Self::new();
        for src in sources {
            let Some(path) = file_uri_path(src) else {
                log::warn!("Skipping font source {src:?} – only file:// URIs are loaded");
                continue;
            };
            let bytes = fs::read(&path).map_err(|source| Error::Font {
                path: path.clone(),
                source,
            })?;
            if mgr.face.is_some() {
                continue;
            }
            match mgr.load_font(bytes) {
                Ok(()) => log::debug!("Loaded font '{}'", path.display()),
                Err(e) => log::warn!(
                    "Font '{}' could not be parsed ({e}); using builtin metrics",
                    path.display()
                ),
            }
        }
        Ok(mgr)
    }

    /// Load a TTF/OTF font from bytes.
    pub fn load_font(&mut self, bytes: Vec<u8>) -> std::result::Result<(), String> {
        let face =
            ttf_parser::Face::parse(&bytes, 0).map_err(|e| format!("Failed to parse font: {e}"))?;

        let data = FontData {
            units_per_em: face.units_per_em() as f32,
            ascender: face.ascender() as f32,
            descender: face.descender() as f32,
            advances: advance_table(&face),
            bytes,
        };
        self.face = Some(data);
        Ok(())
    }

    /// Check if real font bytes are loaded.
    pub fn has_real_font(&self) -> bool {
        self.face.is_some()
    }

    /// Bytes of the loaded face, if any.
    pub fn font_bytes(&self) -> Option<&[u8]> {
        self.face.as_ref().map(|f| f.bytes.as_slice())
    }

    /// Measure the width of a string at a given font size (in pt).
    ///
    /// With a loaded face we sum cached glyph advances; bold text is drawn in
    /// the same face, so it measures the same. Otherwise we use an average
    /// character width of 0.5 × font_size (0.55 for bold).
    pub fn measure_text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        let Some(data) = &self.face else {
            let avg = if bold { 0.55 } else { 0.5 };
            return text.chars().count() as f32 * font_size * avg;
        };
        let scale = font_size / data.units_per_em;
        text.chars()
            .map(|ch| match data.advances.get(&ch) {
                Some(&advance) => advance as f32 * scale,
                None => font_size * 0.5,
            })
            .sum()
    }

    /// Measure the line height in pt.
    pub fn line_height(&self, font_size: f32, line_height_factor: f32) -> f32 {
        font_size * line_height_factor
    }

    /// Ascender in pt, used to place the text baseline.
    pub fn ascender(&self, font_size: f32) -> f32 {
        match &self.face {
            Some(data) => data.ascender * font_size / data.units_per_em,
            None => font_size * 0.75,
        }
    }
}

/// Path of a `file://` URI.
pub fn file_uri_path(uri: &str) -> Option<PathBuf> {
    uri.strip_prefix("file://").map(|p| Path::new(p).to_path_buf())
}

/// Word-wrap text to fit within `max_width` points. Returns a vec of lines.
pub fn wrap_text(
    text: &str,
    font_size: f32,
    bold: bool,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    // Split on explicit breaks first
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let mut current_line = String::new();
        for word in &words {
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{current_line} {word}")
            };
            let w = fonts.measure_text_width(&candidate, font_size, bold);
            if w > max_width && !current_line.is_empty() {
                lines.push(current_line);
                current_line = word.to_string();
            } else {
                current_line = candidate;
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_text_width() {
        let mgr = FontManager::new();
        let w = mgr.measure_text_width("Hello", 16.0, false);
        // 5 chars × 16 × 0.5 = 40
        assert!((w - 40.0).abs() < 0.1);
        assert!(mgr.measure_text_width("Hello", 16.0, true) > w);
    }

    #[test]
    fn word_wrap_basic() {
        let mgr = FontManager::new();
        let lines = wrap_text("Hello world foo bar", 16.0, false, 60.0, &mgr);
        assert!(lines.len() >= 2, "Expected wrapping, got {:?}", lines);
    }

    #[test]
    fn word_wrap_honours_line_breaks() {
        let mgr = FontManager::new();
        let lines = wrap_text("Jane Doe\nMain St 1", 10.0, false, 500.0, &mgr);
        assert_eq!(lines, vec!["Jane Doe", "Main St 1"]);
    }

    #[test]
    fn missing_font_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let uri = format!("file://{}", dir.path().join("inter.ttf").display());
        let err = FontManager::from_sources(&[uri]).err().unwrap();
        assert!(matches!(err, Error::Font { .. }));
    }

    #[test]
    fn unparsable_font_falls_back_to_heuristic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inter.ttf");
        fs::write(&path, b"not a font").unwrap();
        let mgr = FontManager::from_sources(&[format!("file://{}", path.display())]).unwrap();
        assert!(!mgr.has_real_font());
    }

    #[test]
    fn shipped_face_measures_glyph_advances() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates/invoices/inter.ttf");
        let mgr = FontManager::from_sources(&[format!("file://{}", path.display())]).unwrap();
        assert!(mgr.has_real_font());
        assert!(mgr.font_bytes().is_some_and(|b| !b.is_empty()));

        // Proportional advances, unlike the fixed-width heuristic.
        let narrow = mgr.measure_text_width("iiii", 10.0, false);
        let wide = mgr.measure_text_width("MMMM", 10.0, false);
        assert!(narrow < wide, "{narrow} vs {wide}");
        assert!((narrow - FontManager::new().measure_text_width("iiii", 10.0, false)).abs() > 0.1);

        // Bold is drawn in the same face.
        assert_eq!(
            mgr.measure_text_width("Total", 12.0, true),
            mgr.measure_text_width("Total", 12.0, false)
        );
        let twice = mgr.measure_text_width("TotalTotal", 12.0, false);
        assert!((twice - 2.0 * mgr.measure_text_width("Total", 12.0, false)).abs() < 0.01);
        assert!(mgr.ascender(10.0) > 0.0);
    }

    #[test]
    fn non_file_sources_are_ignored() {
        let mgr = FontManager::from_sources(&["https://example.com/inter.ttf".to_string()]).unwrap();
        assert!(!mgr.has_real_font());
    }

    #[test]
    fn file_uri_to_path() {
        assert_eq!(
            file_uri_path("file:///srv/inter.ttf"),
            Some(PathBuf::from("/srv/inter.ttf"))
        );
        assert_eq!(file_uri_path("/srv/inter.ttf"), None);
    }
}
