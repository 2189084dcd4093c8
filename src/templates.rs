//! The invoice HTML template and its bindings.
//!
//! The template lives in `templates/invoices/invoice.html` and is compiled
//! into the crate by `askama`.

use askama::Template;
use chrono::{DateTime, Utc};

use crate::model::{Invoice, Line, Order};
use crate::pagination::ProductPages;

/// Name of the invoice template below `templates/`.
pub const INVOICE_TEMPLATE: &str = "invoices/invoice.html";

/// Bindings of the invoice template.
#[derive(Template)]
#[template(path = "invoices/invoice.html")]
pub struct InvoiceTemplate<'a> {
    pub invoice: &'a Invoice,
    /// Creation date as `"05 Jan 2024"`.
    pub creation_date: String,
    pub order: &'a Order,
    /// `file://` URI of the invoice font.
    pub font_path: String,
    pub products_first_page: &'a [Line],
    pub rest_of_products: Vec<&'a [Line]>,
    /// First page uses the product table rather than the card layout.
    pub with_table: bool,
}

impl<'a> InvoiceTemplate<'a> {
    pub fn new(
        invoice: &'a Invoice,
        order: &'a Order,
        pages: &ProductPages<'a, Line>,
        created_at: &DateTime<Utc>,
        font_path: String,
    ) -> Self {
        Self {
            invoice,
            creation_date: format_creation_date(created_at),
            order,
            font_path,
            products_first_page: pages.first_page,
            rest_of_products: pages.rest.clone(),
            with_table: pages.uses_table(),
        }
    }
}

/// `"<DD> <Mon> <YYYY>"`, e.g. `"05 Jan 2024"`.
pub fn format_creation_date(created_at: &DateTime<Utc>) -> String {
    created_at.format("%d %b %Y").to_string()
}
