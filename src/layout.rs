//! Layout – block flow over the styled DOM, then page splitting.
//!
//! Boxes are first placed in document coordinates (one endless page), the
//! same way a browser would lay out the markup. [`paginate`] then cuts that
//! strip into pages, honouring forced breaks and splitting tables by row.

use crate::dom::{DomNode, ElementNode, Tag};
use crate::fonts::{wrap_text, FontManager};
use crate::layout_config::*;
use crate::style::{resolve_style, ComputedStyle, TextAlign};

// ---------------------------------------------------------------------------
// Intermediate layout tree (pre-pagination)
// ---------------------------------------------------------------------------

/// What a positioned box represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxKind {
    /// Container stacking its children vertically.
    Block,
    /// Leaf carrying wrapped text.
    Text,
    /// Table whose children are rows; may split across pages.
    Table,
    /// Row of equal-width cells.
    Row,
}

/// A positioned box in document coordinates (before page splitting).
#[derive(Debug, Clone)]
pub struct PositionedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: BoxKind,
    pub style: ComputedStyle,
    /// Wrapped text for [`BoxKind::Text`], offsets relative to the box.
    pub lines: Vec<TextLine>,
    pub children: Vec<PositionedBox>,
}

impl PositionedBox {
    fn bottom_with_margin(&self) -> f32 {
        self.y + self.height + self.style.margin_bottom
    }

    /// Container without visuals of its own.
    fn is_plain_container(&self) -> bool {
        self.kind == BoxKind::Block
            && self.style.background_color.is_transparent()
            && self.style.border_width <= 0.0
    }
}

struct LayoutBuilder<'a> {
    fonts: &'a FontManager,
}

impl<'a> LayoutBuilder<'a> {
    /// True when nothing below `el` starts a new block.
    fn all_inline(el: &ElementNode) -> bool {
        el.children.iter().all(|c| match c {
            DomNode::Text(_) => true,
            DomNode::Element(e) => e.tag.is_inline() && Self::all_inline(e),
        })
    }

    /// Lay out a sequence of sibling nodes starting at `y`. Returns the boxes
    /// and the y just below the last one (including its bottom margin).
    fn build_children(
        &self,
        nodes: &[DomNode],
        parent: &ComputedStyle,
        x: f32,
        y: f32,
        width: f32,
    ) -> (Vec<PositionedBox>, f32) {
        let mut boxes = Vec::new();
        let mut cursor = y;
        for node in nodes {
            let built = match node {
                DomNode::Text(t) if t.trim().is_empty() => None,
                DomNode::Text(t) => {
                    let mut style = parent.clone();
                    // Anonymous text does not repeat its parent's box model.
                    style.margin_top = 0.0;
                    style.margin_bottom = 0.0;
                    style.padding = 0.0;
                    style.border_width = 0.0;
                    style.background_color = crate::style::Color::TRANSPARENT;
                    style.page_break_before = false;
                    let text = t.split_whitespace().collect::<Vec<_>>().join(" ");
                    self.build_text(&text, style, x, cursor, width)
                }
                DomNode::Element(e) => self.build_element(e, parent, x, cursor, width),
            };
            if let Some(pbox) = built {
                cursor = pbox.bottom_with_margin();
                boxes.push(pbox);
            }
        }
        (boxes, cursor)
    }

    fn build_element(
        &self,
        el: &ElementNode,
        parent: &ComputedStyle,
        x: f32,
        y: f32,
        width: f32,
    ) -> Option<PositionedBox> {
        if el.tag.is_hidden() {
            return None;
        }
        let style = resolve_style(el, Some(parent));
        let top = y + style.margin_top;

        if el.tag == Tag::Table {
            return Some(self.build_table(el, style, x, top, width));
        }
        if el.tag == Tag::Tr || el.has_class("columns") {
            return self.build_row(el, style, x, top, width);
        }
        if Self::all_inline(el) {
            let text = el.text_content();
            if text.trim().is_empty() && !matches!(el.tag, Tag::Td | Tag::Th) {
                return None;
            }
            return self.build_text(&text, style, x, top, width);
        }

        let inset = style.padding + style.border_width;
        let (children, bottom) =
            self.build_children(&el.children, &style, x + inset, top + inset, width - 2.0 * inset);
        if children.is_empty() && style.border_width <= 0.0 {
            return None;
        }
        // The last child's bottom margin collapses into the container.
        let content_bottom = children
            .last()
            .map_or(bottom, |c| c.y + c.height);
        Some(PositionedBox {
            x,
            y: top,
            width,
            height: content_bottom - top + inset,
            kind: BoxKind::Block,
            style,
            lines: Vec::new(),
            children,
        })
    }

    fn build_text(
        &self,
        text: &str,
        style: ComputedStyle,
        x: f32,
        y: f32,
        width: f32,
    ) -> Option<PositionedBox> {
        let inset = style.padding + style.border_width;
        let inner_width = (width - 2.0 * inset).max(1.0);
        let line_height = self.fonts.line_height(style.font_size, style.line_height);

        let wrapped = wrap_text(text.trim(), style.font_size, style.bold, inner_width, self.fonts);
        let lines: Vec<TextLine> = wrapped
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let line_width = self.fonts.measure_text_width(&line, style.font_size, style.bold);
                let free = (inner_width - line_width).max(0.0);
                let x_offset = inset
                    + match style.text_align {
                        TextAlign::Left => 0.0,
                        TextAlign::Center => free / 2.0,
                        TextAlign::Right => free,
                    };
                TextLine {
                    text: line,
                    x_offset,
                    y_offset: inset + i as f32 * line_height,
                }
            })
            .collect();

        Some(PositionedBox {
            x,
            y,
            width,
            height: lines.len() as f32 * line_height + 2.0 * inset,
            kind: BoxKind::Text,
            style,
            lines,
            children: Vec::new(),
        })
    }

    /// Equal-width cells side by side; every cell is stretched to the row height.
    fn build_row(
        &self,
        el: &ElementNode,
        style: ComputedStyle,
        x: f32,
        y: f32,
        width: f32,
    ) -> Option<PositionedBox> {
        let cells: Vec<&ElementNode> = el.element_children().filter(|c| !c.tag.is_hidden()).collect();
        if cells.is_empty() {
            return None;
        }
        let col_width = width / cells.len() as f32;

        let mut children: Vec<PositionedBox> = cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| {
                self.build_element(cell, &style, x + i as f32 * col_width, y, col_width)
            })
            .collect();

        let row_bottom = children
            .iter()
            .map(|c| c.y + c.height)
            .fold(y, f32::max);
        for cell in &mut children {
            cell.height = row_bottom - cell.y;
        }

        Some(PositionedBox {
            x,
            y,
            width,
            height: row_bottom - y,
            kind: BoxKind::Row,
            style,
            lines: Vec::new(),
            children,
        })
    }

    fn build_table(
        &self,
        el: &ElementNode,
        style: ComputedStyle,
        x: f32,
        y: f32,
        width: f32,
    ) -> PositionedBox {
        let mut rows = Vec::new();
        let mut cursor = y;
        for row in table_rows(el) {
            if let Some(pbox) = self.build_row(row, resolve_style(row, Some(&style)), x, cursor, width) {
                cursor = pbox.y + pbox.height;
                rows.push(pbox);
            }
        }
        PositionedBox {
            x,
            y,
            width,
            height: cursor - y,
            kind: BoxKind::Table,
            style,
            lines: Vec::new(),
            children: rows,
        }
    }
}

/// `<tr>` elements of a table, looking through `<thead>` / `<tbody>`.
fn table_rows(table: &ElementNode) -> Vec<&ElementNode> {
    let mut rows = Vec::new();
    for child in table.element_children() {
        match child.tag {
            Tag::Tr => rows.push(child),
            Tag::Thead | Tag::Tbody => {
                rows.extend(child.element_children().filter(|r| r.tag == Tag::Tr))
            }
            _ => {}
        }
    }
    rows
}

/// Compute layout for a list of body nodes, returning top-level positioned
/// boxes in document coordinates. `y` starts at 0.
pub fn compute_layout(
    nodes: &[DomNode],
    page_width: f32,
    page_margin: f32,
    fonts: &FontManager,
) -> Vec<PositionedBox> {
    let content_width = page_width - 2.0 * page_margin;
    let builder = LayoutBuilder { fonts };
    let root = ComputedStyle::default();
    let (boxes, _) = builder.build_children(nodes, &root, page_margin, 0.0, content_width);
    boxes
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

struct FlatBox<'a> {
    pbox: &'a PositionedBox,
    break_before: bool,
}

fn contains_forced_break(pbox: &PositionedBox) -> bool {
    pbox.children
        .iter()
        .any(|c| c.style.page_break_before || contains_forced_break(c))
}

/// Expand plain containers that are taller than a page, or that hide a forced
/// break inside, so their children can be placed individually.
fn flatten_for_pagination<'a>(
    boxes: &'a [PositionedBox],
    content_height: f32,
    out: &mut Vec<FlatBox<'a>>,
) {
    for pbox in boxes {
        let expand = pbox.is_plain_container()
            && !pbox.children.is_empty()
            && (pbox.height > content_height || contains_forced_break(pbox));
        if expand {
            let first = out.len();
            flatten_for_pagination(&pbox.children, content_height, out);
            if pbox.style.page_break_before {
                if let Some(f) = out.get_mut(first) {
                    f.break_before = true;
                }
            }
        } else {
            out.push(FlatBox {
                pbox,
                break_before: pbox.style.page_break_before,
            });
        }
    }
}

struct Paginator<'a> {
    config: LayoutConfig,
    current: PageLayout,
    /// Document-space y at which the current page begins.
    page_start_doc_y: f32,
    page_margin: f32,
    fonts: &'a FontManager,
}

impl<'a> Paginator<'a> {
    fn break_page(&mut self, next_doc_y: f32) {
        let next = PageLayout {
            page_index: self.config.pages.len() + 1,
            boxes: Vec::new(),
        };
        let done = std::mem::replace(&mut self.current, next);
        self.config.pages.push(done);
        self.page_start_doc_y = next_doc_y;
    }

    fn y_on_page(&self, pbox: &PositionedBox) -> f32 {
        (pbox.y - self.page_start_doc_y).max(0.0)
    }

    fn place(&mut self, pbox: &PositionedBox) {
        let abs_y = self.page_margin + self.y_on_page(pbox);
        let lbox = build_layout_box(pbox, abs_y, self.fonts);
        self.current.boxes.push(lbox);
    }
}

/// Convert positioned boxes into a paginated [`LayoutConfig`].
pub fn paginate(
    boxes: &[PositionedBox],
    title: &str,
    page_width: f32,
    page_height: f32,
    page_margin: f32,
    fonts: &FontManager,
) -> LayoutConfig {
    let content_height = page_height - 2.0 * page_margin;
    let mut flat = Vec::new();
    flatten_for_pagination(boxes, content_height, &mut flat);

    let mut p = Paginator {
        config: LayoutConfig {
            title: title.to_string(),
            page_width_pt: page_width,
            page_height_pt: page_height,
            pages: Vec::new(),
        },
        current: PageLayout {
            page_index: 0,
            boxes: Vec::new(),
        },
        page_start_doc_y: 0.0,
        page_margin,
        fonts,
    };

    for FlatBox { pbox, break_before } in flat {
        if break_before && !p.current.boxes.is_empty() {
            p.break_page(pbox.y);
        }

        let overflows = p.y_on_page(pbox) + pbox.height > content_height;
        if overflows && pbox.kind == BoxKind::Table {
            for row in &pbox.children {
                if p.y_on_page(row) + row.height > content_height && !p.current.boxes.is_empty() {
                    p.break_page(row.y);
                }
                p.place(row);
            }
            continue;
        }
        if overflows && !p.current.boxes.is_empty() {
            p.break_page(pbox.y);
        }
        p.place(pbox);
    }

    let Paginator {
        mut config,
        current,
        ..
    } = p;
    if !current.boxes.is_empty() || config.pages.is_empty() {
        config.pages.push(current);
    }
    config
}

/// Build a [`LayoutBox`] tree with page-absolute coordinates.
///
/// PositionedBox.y values are document-space absolutes, so a child sits at
/// `parent_abs_y + (child.y - parent.y)`.
fn build_layout_box(pbox: &PositionedBox, abs_y: f32, fonts: &FontManager) -> LayoutBox {
    let mut lb = LayoutBox::new(pbox.x, abs_y, pbox.width, pbox.height);
    let style = &pbox.style;

    if !style.background_color.is_transparent() {
        lb.background_color = Some(style.background_color.to_array());
    }
    if style.border_width > 0.0 {
        lb.border = Some(BorderStyle {
            width: style.border_width,
            color: style.border_color.to_array(),
        });
    }
    if pbox.kind == BoxKind::Text && !pbox.lines.is_empty() {
        lb.text = Some(TextContent {
            lines: pbox.lines.clone(),
            font_size: style.font_size,
            bold: style.bold,
            color: style.color.to_array(),
            line_height: fonts.line_height(style.font_size, style.line_height),
            ascender: fonts.ascender(style.font_size),
        });
    }

    for child in &pbox.children {
        let child_abs_y = abs_y + (child.y - pbox.y);
        lb.children.push(build_layout_box(child, child_abs_y, fonts));
    }
    lb
}
