//! Pipeline – turns an invoice into PDF bytes: gather the order and its lines,
//! split them into pages, render the template and convert the markup.

use askama::Template;
use chrono::{DateTime, Utc};

use crate::config::InvoicingConfig;
use crate::error::Result;
use crate::model::{Invoice, Line};
use crate::pagination::ProductPages;
use crate::store::InvoiceStore;
use crate::templates::InvoiceTemplate;
use crate::writer::{HtmlToPdf, PdfWriter};

/// Template output together with the pagination that produced it.
#[derive(Debug, Clone)]
pub struct RenderedInvoice {
    pub html: String,
    /// Creation timestamp printed on the invoice.
    pub created_at: DateTime<Utc>,
    /// Line ids on the first page.
    pub products_first_page: Vec<u64>,
    /// Line ids of every continuation page.
    pub rest_of_products: Vec<Vec<u64>>,
}

fn line_ids(lines: &[Line]) -> Vec<u64> {
    lines.iter().map(|l| l.id).collect()
}

/// Render the invoice template for `invoice`.
pub fn render_invoice_html<S: InvoiceStore + ?Sized>(
    store: &S,
    invoice: &Invoice,
    config: &InvoicingConfig,
) -> Result<RenderedInvoice> {
    let font_path = config.font_uri();
    let order = store.order(invoice.order_id)?;
    let lines = store.order_lines(order.id)?;

    let pages = ProductPages::split(&lines);
    log::debug!(
        "invoice {}: {} line(s), {} on the first page, {} continuation page(s)",
        invoice.id,
        lines.len(),
        pages.first_page.len(),
        pages.rest.len()
    );

    let created_at = Utc::now();
    let html = InvoiceTemplate::new(invoice, &order, &pages, &created_at, font_path).render()?;

    Ok(RenderedInvoice {
        html,
        created_at,
        products_first_page: line_ids(pages.first_page),
        rest_of_products: pages.rest.iter().map(|p| line_ids(p)).collect(),
    })
}

/// Generate the invoice PDF with a caller supplied converter.
///
/// Returns the PDF bytes and the UTC creation timestamp.
pub fn generate_invoice_pdf_with<S, W>(
    store: &S,
    invoice: &Invoice,
    config: &InvoicingConfig,
    writer: &W,
) -> Result<(Vec<u8>, DateTime<Utc>)>
where
    S: InvoiceStore + ?Sized,
    W: HtmlToPdf + ?Sized,
{
    let rendered = render_invoice_html(store, invoice, config)?;
    let bytes = writer.write_pdf(&rendered.html)?;
    log::debug!("invoice {}: wrote {} PDF bytes", invoice.id, bytes.len());
    Ok((bytes, rendered.created_at))
}

/// Generate the invoice PDF with the built-in writer.
pub fn generate_invoice_pdf<S: InvoiceStore + ?Sized>(
    store: &S,
    invoice: &Invoice,
    config: &InvoicingConfig,
) -> Result<(Vec<u8>, DateTime<Utc>)> {
    let writer = PdfWriter::new(config.page_config(&document_title(invoice)));
    generate_invoice_pdf_with(store, invoice, config, &writer)
}

/// PDF metadata title, e.g. `"Invoice 3/01/2024"`.
pub fn document_title(invoice: &Invoice) -> String {
    match invoice.number.as_deref() {
        Some(number) if !number.is_empty() => format!("Invoice {number}"),
        _ => "Invoice".to_string(),
    }
}
