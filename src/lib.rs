//! # invoice-forge – invoice numbering and PDF invoices
//!
//! Two concerns live here:
//!
//! - **Numbering** ([`numbering`]): the next `<n>/<MM>/<YYYY>` number, derived
//!   from the most recent invoice in an [`InvoiceStore`].
//! - **Rendering** ([`pipeline`]): an order's lines are split into pages
//!   ([`pagination`]), rendered through the `invoices/invoice.html` template
//!   ([`templates`]) and converted to PDF.
//!
//! The HTML → PDF writer is a small controlled-subset pipeline:
//!
//! 1. **Parse** – HTML string → DOM tree ([`dom`])
//! 2. **Style** – tag defaults and Tailwind-like classes ([`style`])
//! 3. **Layout** – block flow and page splitting ([`layout`])
//! 4. **Render** – emit PDF bytes via printpdf ([`render`])

pub mod config;
pub mod dom;
pub mod error;
pub mod fonts;
pub mod layout;
pub mod layout_config;
pub mod model;
pub mod numbering;
pub mod pagination;
pub mod pipeline;
pub mod render;
pub mod store;
pub mod style;
pub mod templates;
pub mod writer;

// Re-exports for convenience
pub use config::InvoicingConfig;
pub use error::{Error, Result};
pub use model::{Address, Invoice, Line, Order};
pub use numbering::{generate_invoice_number, InvoiceNumberSequence};
pub use pagination::{chunk_products, first_page_limit};
pub use pipeline::{generate_invoice_pdf, generate_invoice_pdf_with};
pub use store::{InvoiceStore, JsonFileStore, MemoryStore};
pub use writer::{HtmlToPdf, PdfWriter};
