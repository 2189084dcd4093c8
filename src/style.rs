//! Style resolver – maps tag defaults, Tailwind-like utility classes and a few
//! inline declarations to a flat [`ComputedStyle`] consumed by the layout.

use crate::dom::{ElementNode, Tag};

/// Base font size of the invoice body text, in points.
pub const BASE_FONT_SIZE: f32 = 10.0;

/// Fully resolved style for a single element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    // Spacing (pt)
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub padding: f32,

    // Border
    pub border_width: f32,
    pub border_color: Color,

    // Typography
    pub font_size: f32,
    pub bold: bool,
    pub color: Color,
    pub text_align: TextAlign,
    pub line_height: f32,

    // Background
    pub background_color: Color,

    // Page break
    pub page_break_before: bool,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            margin_top: 0.0,
            margin_bottom: 0.0,
            padding: 0.0,
            border_width: 0.0,
            border_color: Color::GRAY_300,
            font_size: BASE_FONT_SIZE,
            bold: false,
            color: Color::BLACK,
            text_align: TextAlign::Left,
            line_height: 1.4,
            background_color: Color::TRANSPARENT,
            page_break_before: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const GRAY_100: Self = Self::rgb(0.953, 0.957, 0.965);
    pub const GRAY_300: Self = Self::rgb(0.82, 0.835, 0.859);
    pub const GRAY_500: Self = Self::rgb(0.42, 0.447, 0.502);
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

// ---------------------------------------------------------------------------
// Style resolution
// ---------------------------------------------------------------------------

/// Resolve the style for an element, inheriting text properties from its parent.
pub fn resolve_style(element: &ElementNode, parent: Option<&ComputedStyle>) -> ComputedStyle {
    let mut style = ComputedStyle::default();

    if let Some(p) = parent {
        style.font_size = p.font_size;
        style.bold = p.bold;
        style.color = p.color;
        style.text_align = p.text_align;
        style.line_height = p.line_height;
    }

    apply_tag_defaults(&mut style, &element.tag);

    for class in element.classes() {
        apply_tailwind_class(&mut style, class);
    }

    if let Some(inline) = element.inline_style() {
        apply_inline_style(&mut style, inline);
    }

    style
}

fn apply_tag_defaults(s: &mut ComputedStyle, tag: &Tag) {
    match tag {
        Tag::H1 => {
            s.font_size = 22.0;
            s.bold = true;
            s.margin_bottom = 6.0;
        }
        Tag::H2 => {
            s.font_size = 16.0;
            s.bold = true;
            s.margin_bottom = 5.0;
        }
        Tag::H3 => {
            s.font_size = 13.0;
            s.bold = true;
            s.margin_bottom = 4.0;
        }
        Tag::P => {
            s.margin_bottom = 2.0;
        }
        Tag::Strong => {
            s.bold = true;
        }
        Tag::Table => {
            s.margin_bottom = 8.0;
        }
        Tag::Td | Tag::Th => {
            s.padding = 4.0;
            s.border_width = 0.5;
            if *tag == Tag::Th {
                s.bold = true;
                s.background_color = Color::GRAY_100;
            }
        }
        _ => {}
    }
}

/// Spacing scale: `N` units of 4 pt, as in Tailwind (`p-4` = 16).
fn spacing(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().map(|n| n * 4.0)
}

/// Apply one utility class.
pub fn apply_tailwind_class(s: &mut ComputedStyle, class: &str) {
    match class {
        "text-xs" => s.font_size = 7.0,
        "text-sm" => s.font_size = 8.5,
        "text-base" => s.font_size = BASE_FONT_SIZE,
        "text-lg" => s.font_size = 12.0,
        "text-xl" => s.font_size = 14.0,
        "text-2xl" => s.font_size = 18.0,
        "font-bold" => s.bold = true,
        "font-normal" => s.bold = false,
        "text-left" => s.text_align = TextAlign::Left,
        "text-center" => s.text_align = TextAlign::Center,
        "text-right" => s.text_align = TextAlign::Right,
        "text-gray-500" => s.color = Color::GRAY_500,
        "bg-gray-100" => s.background_color = Color::GRAY_100,
        "border" => s.border_width = 0.5,
        "break-before-page" => s.page_break_before = true,
        other => {
            if let Some(v) = other.strip_prefix("p-").and_then(spacing) {
                s.padding = v;
            } else if let Some(v) = other.strip_prefix("mt-").and_then(spacing) {
                s.margin_top = v;
            } else if let Some(v) = other.strip_prefix("mb-").and_then(spacing) {
                s.margin_bottom = v;
            } else {
                log::trace!("ignoring unsupported class '{other}'");
            }
        }
    }
}

/// Apply `prop: value; ...` declarations from a `style` attribute.
pub fn apply_inline_style(s: &mut ComputedStyle, css: &str) {
    for decl in css.split(';') {
        let Some((prop, value)) = decl.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match prop.trim().to_ascii_lowercase().as_str() {
            "page-break-before" | "break-before" => {
                s.page_break_before = matches!(value, "always" | "page");
            }
            "font-size" => {
                if let Some(size) = parse_length(value) {
                    s.font_size = size;
                }
            }
            "font-weight" => s.bold = matches!(value, "bold" | "600" | "700" | "800" | "900"),
            "text-align" => {
                s.text_align = match value {
                    "right" => TextAlign::Right,
                    "center" => TextAlign::Center,
                    _ => TextAlign::Left,
                }
            }
            _ => {}
        }
    }
}

/// `12px` / `12pt` / `12` → 12.0.
fn parse_length(value: &str) -> Option<f32> {
    value
        .trim_end_matches("px")
        .trim_end_matches("pt")
        .trim()
        .parse()
        .ok()
}
