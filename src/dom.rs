//! HTML parser – converts rendered invoice markup into a simple DOM tree.
//!
//! We support the controlled subset the invoice template uses:
//! - Structural: div, p, h1-h3, table, thead, tbody, tr, td, th, br
//! - Inline: span, strong, b
//! - Document: html, head, body, title, meta, style
//! - Styling via `class` and `style` attributes

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

/// The tag name of a supported element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Div,
    P,
    H1,
    H2,
    H3,
    Table,
    Thead,
    Tbody,
    Tr,
    Td,
    Th,
    Span,
    Strong,
    Br,
    Body,
    Html,
    Head,
    Title,
    Meta,
    Style,
    /// Catch-all for unknown tags – they are kept but treated as divs.
    Unknown(String),
}

impl Tag {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "div" => Tag::Div,
            "p" => Tag::P,
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "table" => Tag::Table,
            "thead" => Tag::Thead,
            "tbody" => Tag::Tbody,
            "tr" => Tag::Tr,
            "td" => Tag::Td,
            "th" => Tag::Th,
            "span" => Tag::Span,
            "strong" | "b" => Tag::Strong,
            "br" => Tag::Br,
            "body" => Tag::Body,
            "html" => Tag::Html,
            "head" => Tag::Head,
            "title" => Tag::Title,
            "meta" => Tag::Meta,
            "style" => Tag::Style,
            other => Tag::Unknown(other.to_string()),
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Tag::Span | Tag::Strong | Tag::Br)
    }

    /// Elements without content or a closing tag.
    pub fn is_void(&self) -> bool {
        matches!(self, Tag::Br | Tag::Meta)
    }

    /// Elements whose content is raw text up to the closing tag.
    fn is_raw_text(&self) -> bool {
        matches!(self, Tag::Style | Tag::Title)
    }

    /// Elements that never produce boxes.
    pub fn is_hidden(&self) -> bool {
        matches!(self, Tag::Head | Tag::Title | Tag::Meta | Tag::Style)
    }
}

/// A node in our DOM tree.
#[derive(Debug, Clone)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
}

/// An element node carrying tag, attributes, and children.
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub tag: Tag,
    pub attributes: HashMap<String, String>,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: HashMap::new(),
            children: Vec::new(),
        }
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attributes
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().contains(&class)
    }

    pub fn inline_style(&self) -> Option<&str> {
        self.attributes.get("style").map(|s| s.as_str())
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Element children, skipping text nodes.
    pub fn element_children(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(|c| match c {
            DomNode::Element(e) => Some(e),
            DomNode::Text(_) => None,
        })
    }
}

fn collect_text(nodes: &[DomNode], out: &mut String) {
    for node in nodes {
        match node {
            // Source line breaks are plain whitespace; only <br> breaks lines.
            DomNode::Text(t) => out.extend(t.chars().map(|c| match c {
                '\n' | '\r' | '\t' => ' ',
                c => c,
            })),
            DomNode::Element(e) if e.tag == Tag::Br => out.push('\n'),
            DomNode::Element(e) => collect_text(&e.children, out),
        }
    }
}

// ---------------------------------------------------------------------------
// Parser – simple recursive descent over HTML
// ---------------------------------------------------------------------------

/// Parse an HTML string into a list of DOM nodes.
pub fn parse_html(html: &str) -> Vec<DomNode> {
    let mut parser = Parser::new(html);
    parser.parse_nodes()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse_nodes(&mut self) -> Vec<DomNode> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace_preserve();
            if self.eof() || self.starts_with("</") {
                break;
            }
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }
        nodes
    }

    fn parse_node(&mut self) -> Option<DomNode> {
        if self.starts_with("<!--") {
            self.skip_past("-->");
            return None;
        }
        if self.starts_with("<!") || self.starts_with("<?") {
            // Doctype / processing instruction
            self.skip_past(">");
            return None;
        }
        if self.starts_with("<") {
            Some(self.parse_element())
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_text(&mut self) -> DomNode {
        let start = self.pos;
        let end = self.rest().find('<').map_or(self.input.len(), |i| start + i);
        self.pos = end;
        DomNode::Text(decode_entities(&self.input[start..end]))
    }

    fn parse_element(&mut self) -> DomNode {
        self.pos += 1; // '<'
        let tag_name = self.parse_name();
        let tag = Tag::parse(&tag_name);
        let mut elem = ElementNode::new(tag.clone());

        loop {
            self.skip_whitespace();
            if self.eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            let before = self.pos;
            let (key, value) = self.parse_attribute();
            if self.pos == before {
                // Stray character we cannot interpret; step over it.
                self.advance_char();
                continue;
            }
            elem.attributes.insert(key.to_ascii_lowercase(), value);
        }

        if self.starts_with("/>") {
            self.pos += 2;
            return DomNode::Element(elem);
        }
        if self.starts_with(">") {
            self.pos += 1;
        }
        if tag.is_void() {
            return DomNode::Element(elem);
        }

        if tag.is_raw_text() {
            let close = format!("</{}", tag_name.to_ascii_lowercase());
            let rest_lower = self.rest().to_ascii_lowercase();
            let len = rest_lower.find(&close).unwrap_or(rest_lower.len());
            let raw = &self.input[self.pos..self.pos + len];
            if !raw.is_empty() {
                elem.children.push(DomNode::Text(raw.to_string()));
            }
            self.pos += len;
        } else {
            elem.children = self.parse_nodes();
        }

        // Closing tag
        if self.starts_with("</") {
            self.pos += 2;
            self.parse_name();
            self.skip_past(">");
        }

        DomNode::Element(elem)
    }

    fn parse_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ':' {
                self.advance_char();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_attribute(&mut self) -> (String, String) {
        let key = self.parse_name();
        self.skip_whitespace();
        if !self.starts_with("=") {
            return (key, String::new());
        }
        self.pos += 1;
        self.skip_whitespace();
        let value = self.parse_attr_value();
        (key, value)
    }

    fn parse_attr_value(&mut self) -> String {
        for quote in ['"', '\''] {
            if self.current_char() == Some(quote) {
                self.pos += 1;
                let start = self.pos;
                let len = self.rest().find(quote).unwrap_or(self.rest().len());
                self.pos += len;
                let value = decode_entities(&self.input[start..self.pos]);
                if !self.eof() {
                    self.pos += 1;
                }
                return value;
            }
        }
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_whitespace() || c == '>' || c == '/' {
                break;
            }
            self.advance_char();
        }
        decode_entities(&self.input[start..self.pos])
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance_char();
        }
    }

    fn skip_whitespace_preserve(&mut self) {
        // Skip runs of pure whitespace between elements.
        let saved = self.pos;
        self.skip_whitespace();
        // If we reached a tag or EOF, keep the skip. Otherwise revert.
        if !self.eof() && !self.starts_with("<") {
            self.pos = saved;
        }
    }

    /// Move past the next occurrence of `marker`, or to the end of input.
    fn skip_past(&mut self, marker: &str) {
        match self.rest().find(marker) {
            Some(i) => self.pos += i + marker.len(),
            None => self.pos = self.input.len(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn advance_char(&mut self) {
        if let Some(c) = self.current_char() {
            self.pos += c.len_utf8();
        }
    }
}

/// Decode named and numeric character references.
///
/// Unknown references are kept verbatim.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Convenience helpers
// ---------------------------------------------------------------------------

/// Find the `<body>` element and return its children, or return all nodes if
/// no `<body>` is present.
pub fn body_children(nodes: &[DomNode]) -> Vec<DomNode> {
    for node in nodes {
        if let DomNode::Element(e) = node {
            if e.tag == Tag::Body {
                return e.children.clone();
            }
            if e.tag == Tag::Html {
                let inner = body_children(&e.children);
                if !inner.is_empty() {
                    return inner;
                }
            }
        }
    }
    nodes.to_vec()
}

/// Text of every `<style>` element in the document.
pub fn stylesheet_text(nodes: &[DomNode]) -> String {
    let mut css = String::new();
    for node in nodes {
        if let DomNode::Element(e) = node {
            if e.tag == Tag::Style {
                css.push_str(&e.text_content());
                css.push('\n');
            } else {
                css.push_str(&stylesheet_text(&e.children));
            }
        }
    }
    css
}

/// `src: url(...)` targets of every `@font-face` rule in `css`.
pub fn font_face_sources(css: &str) -> Vec<String> {
    let mut sources = Vec::new();
    let mut rest = css;
    while let Some(at) = rest.find("@font-face") {
        let block_start = &rest[at..];
        let Some(open) = block_start.find('{') else {
            break;
        };
        let close = block_start[open..]
            .find('}')
            .map_or(block_start.len(), |i| open + i);
        let block = &block_start[open + 1..close];

        let mut decls = block;
        while let Some(u) = decls.find("url(") {
            let after = &decls[u + 4..];
            let end = after.find(')').unwrap_or(after.len());
            let target = after[..end].trim().trim_matches(|c| c == '"' || c == '\'');
            if !target.is_empty() {
                sources.push(target.to_string());
            }
            decls = &after[end..];
        }
        rest = &block_start[close..];
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_div() {
        let html = r#"<div class="columns p-4"><p>Hello</p></div>"#;
        let nodes = parse_html(html);
        assert_eq!(nodes.len(), 1);
        if let DomNode::Element(e) = &nodes[0] {
            assert_eq!(e.tag, Tag::Div);
            assert_eq!(e.classes(), vec!["columns", "p-4"]);
            assert!(e.has_class("p-4"));
            assert_eq!(e.children.len(), 1);
        } else {
            panic!("Expected element");
        }
    }

    #[test]
    fn parse_skips_doctype_and_comments() {
        let html = "<!DOCTYPE html><!-- note --><p>x</p>";
        let nodes = parse_html(html);
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn parse_void_meta_and_br() {
        let html = r#"<head><meta charset="utf-8"></head><p>a<br>b</p>"#;
        let nodes = parse_html(html);
        assert_eq!(nodes.len(), 2);
        if let DomNode::Element(p) = &nodes[1] {
            assert_eq!(p.text_content(), "a\nb");
        } else {
            panic!("Expected p element");
        }
    }

    #[test]
    fn parse_table() {
        let html = r#"<table><tr><th>Name</th><th>Qty</th></tr><tr><td>Mug</td><td>3</td></tr></table>"#;
        let nodes = parse_html(html);
        assert_eq!(nodes.len(), 1);
        if let DomNode::Element(table) = &nodes[0] {
            assert_eq!(table.tag, Tag::Table);
            assert_eq!(table.element_children().count(), 2);
        } else {
            panic!("Expected table");
        }
    }

    #[test]
    fn decodes_numeric_entities() {
        assert_eq!(decode_entities("1&#x2f;01&#47;2024"), "1/01/2024");
        assert_eq!(decode_entities("Tom &amp; Jerry&#x27;s"), "Tom & Jerry's");
        assert_eq!(decode_entities("a & b"), "a & b");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn style_content_is_raw_text() {
        let html = r#"<html><head><style>@font-face { src: url("file:///a/inter.ttf"); } p > b { }</style></head><body><p>x</p></body></html>"#;
        let nodes = parse_html(html);
        let css = stylesheet_text(&nodes);
        assert!(css.contains("p > b"));
        assert_eq!(font_face_sources(&css), vec!["file:///a/inter.ttf"]);
        assert_eq!(body_children(&nodes).len(), 1);
    }

    #[test]
    fn font_face_without_url() {
        assert!(font_face_sources("@font-face { font-family: x; }").is_empty());
        assert!(font_face_sources("body { src: url(a.ttf); }").is_empty());
    }
}
