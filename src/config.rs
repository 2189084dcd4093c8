//! Invoicing configuration – project root, font location and page geometry.

use std::env;
use std::path::PathBuf;

use crate::writer::PageConfig;

/// Environment variable overriding the project root.
pub const PROJECT_ROOT_ENV: &str = "INVOICING_PROJECT_ROOT";

/// Font asset path relative to the project root.
pub const FONT_RELATIVE_PATH: [&str; 3] = ["templates", "invoices", "inter.ttf"];

/// Settings for invoice rendering.
#[derive(Debug, Clone)]
pub struct InvoicingConfig {
    /// Directory holding `templates/invoices/`.
    pub project_root: PathBuf,
    /// Document title embedded in the PDF metadata.
    pub title: String,
    /// Page width in points (default: A4 = 595.28).
    pub page_width: f32,
    /// Page height in points (default: A4 = 841.89).
    pub page_height: f32,
    /// Page margin in points (default: 40).
    pub page_margin: f32,
}

impl Default for InvoicingConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from(env!("CARGO_MANIFEST_DIR")),
            title: "Invoice".to_string(),
            page_width: 595.28,
            page_height: 841.89,
            page_margin: 40.0,
        }
    }
}

impl InvoicingConfig {
    /// Defaults with the project root taken from `INVOICING_PROJECT_ROOT`
    /// when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(root) = env::var_os(PROJECT_ROOT_ENV).filter(|v| !v.is_empty()) {
            config.project_root = PathBuf::from(root);
        }
        config
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    /// `<project_root>/templates/invoices/inter.ttf`.
    pub fn font_path(&self) -> PathBuf {
        let mut path = self.project_root.clone();
        path.extend(FONT_RELATIVE_PATH);
        path
    }

    /// The font path as a `file://` URI for the template.
    pub fn font_uri(&self) -> String {
        format!("file://{}", self.font_path().display())
    }

    /// Page settings for the PDF writer.
    pub fn page_config(&self, title: &str) -> PageConfig {
        PageConfig {
            title: title.to_string(),
            page_width: self.page_width,
            page_height: self.page_height,
            page_margin: self.page_margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_path_under_project_root() {
        let config = InvoicingConfig::default().with_project_root("/srv/shop");
        assert_eq!(
            config.font_path(),
            PathBuf::from("/srv/shop/templates/invoices/inter.ttf")
        );
        assert_eq!(
            config.font_uri(),
            "file:///srv/shop/templates/invoices/inter.ttf"
        );
    }

    #[test]
    fn page_config_copies_geometry() {
        let config = InvoicingConfig::default();
        let page = config.page_config("Invoice 1/01/2024");
        assert_eq!(page.title, "Invoice 1/01/2024");
        assert!((page.page_width - 595.28).abs() < 0.01);
        assert!((page.page_margin - 40.0).abs() < 0.01);
    }
}
