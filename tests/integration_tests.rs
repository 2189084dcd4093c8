//! Integration tests for invoice numbering and PDF rendering.
//!
//! These tests validate:
//! - Numbering continues from the last invoice and resets on bad numbers
//! - Order lines are split into first-page and continuation pages
//! - PDF output exists and has valid format
//! - Rendering failures propagate to the caller

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use chrono::{Datelike, Local, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use invoice_forge::numbering::generate_invoice_number_at;
use invoice_forge::pipeline::render_invoice_html;
use invoice_forge::store::{InvoiceStore, JsonFileStore, MemoryStore};
use invoice_forge::{
    generate_invoice_number, generate_invoice_pdf, generate_invoice_pdf_with, Address, Error,
    HtmlToPdf, Invoice, InvoiceNumberSequence, InvoicingConfig, Line, Order, PdfWriter,
};

// =====================================================================
// Helpers
// =====================================================================

fn assert_valid_pdf(bytes: &[u8]) {
    assert!(bytes.len() > 100, "PDF too small: {} bytes", bytes.len());
    assert_eq!(&bytes[0..5], b"%PDF-", "Missing PDF header");
}

fn order(id: u64) -> Order {
    Order {
        id,
        number: format!("{}", 1000 + id),
        customer_email: Some("jane@example.com".to_string()),
        billing_address: Some(Address {
            name: "Jane Doe".to_string(),
            company: None,
            street: "Main Street 1".to_string(),
            postal_code: "00-001".to_string(),
            city: "Warsaw".to_string(),
            country: "PL".to_string(),
        }),
        shipping_address: None,
        currency: "EUR".to_string(),
        total_net: dec!(100.00),
        total_gross: dec!(123.00),
        shipping_price_gross: dec!(5.00),
    }
}

fn line(id: u64, order_id: u64) -> Line {
    Line {
        id,
        order_id,
        product_name: format!("Product {id}"),
        variant_name: Some("Blue".to_string()),
        product_sku: Some(format!("SKU-{id:03}")),
        quantity: 2,
        unit_price_gross: dec!(6.15),
        total_price_gross: dec!(12.30),
        tax_rate: dec!(0.23),
    }
}

fn invoice(id: u64, number: Option<&str>, order_id: u64) -> Invoice {
    Invoice::new(
        id,
        number.map(str::to_string),
        order_id,
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + chrono::Duration::minutes(id as i64),
    )
}

/// Store with one order of `lines` lines and an invoice for it.
fn store_with_lines(lines: u64) -> (MemoryStore, Invoice) {
    let mut store = MemoryStore::new();
    store.insert_order(order(1));
    // Lines of another order must not leak into the invoice.
    store.insert_order(order(2));
    store.insert_line(line(999, 2));
    for id in 1..=lines {
        store.insert_line(line(id, 1));
    }
    let inv = invoice(1, Some("7/01/2024"), 1);
    store.insert_invoice(inv.clone());
    (store, inv)
}

/// Project root holding a font file at templates/invoices/inter.ttf.
fn project_root() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let fonts = dir.path().join("templates").join("invoices");
    fs::create_dir_all(&fonts).unwrap();
    fs::write(fonts.join("inter.ttf"), b"placeholder font bytes").unwrap();
    dir
}

fn config_for(root: &Path) -> InvoicingConfig {
    InvoicingConfig::default().with_project_root(root)
}

fn jan_2024() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

// =====================================================================
// Numbering
// =====================================================================

#[test]
fn first_invoice_number_starts_at_one() {
    let store = MemoryStore::new();
    assert_eq!(
        generate_invoice_number_at(&store, &jan_2024()).unwrap(),
        "1/01/2024"
    );
}

#[test]
fn number_continues_from_last_invoice() {
    let mut store = MemoryStore::new();
    store.insert_invoice(invoice(1, Some("4/12/2023"), 1));
    store.insert_invoice(invoice(2, Some("5/12/2023"), 1));
    // Counter does not reset when the month changes.
    assert_eq!(
        generate_invoice_number_at(&store, &jan_2024()).unwrap(),
        "6/01/2024"
    );
}

#[test]
fn malformed_last_number_restarts_sequence() {
    for bad in [None, Some(""), Some("abc"), Some("12"), Some("x12/01/2024")] {
        let mut store = MemoryStore::new();
        store.insert_invoice(invoice(1, bad, 1));
        assert_eq!(
            generate_invoice_number_at(&store, &jan_2024()).unwrap(),
            "1/01/2024",
            "last number {bad:?}"
        );
    }
}

#[test]
fn only_the_latest_invoice_counts() {
    let mut store = MemoryStore::new();
    store.insert_invoice(invoice(1, Some("40/01/2024"), 1));
    store.insert_invoice(invoice(2, Some("garbage"), 1));
    assert_eq!(
        generate_invoice_number_at(&store, &jan_2024()).unwrap(),
        "1/01/2024"
    );
}

#[test]
fn number_uses_current_month_and_year() {
    let mut store = MemoryStore::new();
    store.insert_invoice(invoice(1, Some("9/03/2021"), 1));
    let now = Local::now();
    let expected = format!("10/{:02}/{}", now.month(), now.year());
    assert_eq!(generate_invoice_number(&store).unwrap(), expected);
}

#[test]
fn sequence_seeds_from_store() {
    let mut store = MemoryStore::new();
    store.insert_invoice(invoice(1, Some("41/01/2024"), 1));
    let seq = InvoiceNumberSequence::from_store(&store).unwrap();
    assert_eq!(seq.next_number_at(&jan_2024()), "42/01/2024");
    assert_eq!(seq.next_number_at(&jan_2024()), "43/01/2024");
}

#[test]
fn json_store_round_trip_feeds_numbering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("store.json");

    let mut store = JsonFileStore::open(&path).unwrap();
    store.insert_order(order(1));
    store.insert_line(line(1, 1));
    store.insert_invoice(invoice(1, Some("17/01/2024"), 1));
    store.save().unwrap();

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.order_lines(1).unwrap().len(), 1);
    assert_eq!(reopened.order(1).unwrap().total_gross, dec!(123.00));
    assert_eq!(
        generate_invoice_number_at(&reopened, &jan_2024()).unwrap(),
        "18/01/2024"
    );
}

// =====================================================================
// Pagination through the template
// =====================================================================

#[test]
fn one_line_order_fits_first_page() {
    let root = project_root();
    let (store, inv) = store_with_lines(1);
    let rendered = render_invoice_html(&store, &inv, &config_for(root.path())).unwrap();
    assert_eq!(rendered.products_first_page, vec![1]);
    assert!(rendered.rest_of_products.is_empty());
    assert!(rendered.html.contains("Product 1 (Blue)"));
    assert!(!rendered.html.contains("Product 999"));
}

#[test]
fn twenty_line_order_spills_onto_two_pages() {
    let root = project_root();
    let (store, inv) = store_with_lines(20);
    let rendered = render_invoice_html(&store, &inv, &config_for(root.path())).unwrap();
    assert_eq!(rendered.products_first_page, vec![1, 2, 3, 4]);
    let sizes: Vec<usize> = rendered.rest_of_products.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![13, 3]);
    assert_eq!(rendered.rest_of_products[0][0], 5);
    assert_eq!(rendered.rest_of_products[1], vec![18, 19, 20]);
}

#[test]
fn template_receives_font_uri_and_creation_date() {
    let root = project_root();
    let config = config_for(root.path());
    let (store, inv) = store_with_lines(2);
    let rendered = render_invoice_html(&store, &inv, &config).unwrap();
    assert!(rendered.html.contains(&config.font_uri()));
    let date = rendered.created_at.format("%d %b %Y").to_string();
    assert!(rendered.html.contains(&date), "missing date {date}");
}

// =====================================================================
// End-to-end PDF generation
// =====================================================================

#[test]
fn one_line_invoice_renders_pdf() {
    let root = project_root();
    let (store, inv) = store_with_lines(1);
    let before = Utc::now();
    let (bytes, created_at) =
        generate_invoice_pdf(&store, &inv, &config_for(root.path())).unwrap();
    let after = Utc::now();
    assert_valid_pdf(&bytes);
    assert!(created_at >= before && created_at <= after);
}

#[test]
fn twenty_line_invoice_spans_three_pages() {
    let root = project_root();
    let config = config_for(root.path());
    let (store, inv) = store_with_lines(20);
    let rendered = render_invoice_html(&store, &inv, &config).unwrap();
    let (bytes, layout) = PdfWriter::new(config.page_config("Invoice 7/01/2024"))
        .write_pdf_with_layout(&rendered.html)
        .unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(layout.pages.len(), 3);
    assert!(layout.page_text(1).iter().any(|t| t.contains("Product 5")));
    assert!(layout.page_text(2).iter().any(|t| t.contains("Product 20")));
    assert!(layout.page_text(2).iter().any(|t| t.starts_with("Total")));
}

#[test]
fn default_config_renders_with_shipped_font() {
    let config = InvoicingConfig::default();
    assert!(config.font_path().is_file(), "missing {}", config.font_path().display());

    let (store, inv) = store_with_lines(1);
    let (bytes, _) = generate_invoice_pdf(&store, &inv, &config).unwrap();
    assert_valid_pdf(&bytes);
}

#[test]
fn shipped_font_lays_out_long_orders() {
    let config = InvoicingConfig::default();
    let (store, inv) = store_with_lines(20);
    let rendered = render_invoice_html(&store, &inv, &config).unwrap();
    let (bytes, layout) = PdfWriter::new(config.page_config("Invoice 7/01/2024"))
        .write_pdf_with_layout(&rendered.html)
        .unwrap();
    assert_valid_pdf(&bytes);
    assert_eq!(layout.pages.len(), 3);
    assert!(layout.page_text(2).iter().any(|t| t.contains("Product 20")));
}

#[test]
fn missing_font_file_is_fatal() {
    let root = tempfile::tempdir().unwrap();
    let (store, inv) = store_with_lines(1);
    let err = generate_invoice_pdf(&store, &inv, &config_for(root.path())).unwrap_err();
    assert!(matches!(err, Error::Font { .. }), "got {err:?}");
}

#[test]
fn missing_order_is_fatal() {
    let root = project_root();
    let store = MemoryStore::new();
    let inv = invoice(1, Some("1/01/2024"), 77);
    let err = generate_invoice_pdf(&store, &inv, &config_for(root.path())).unwrap_err();
    assert!(matches!(err, Error::OrderNotFound(77)));
}

struct CapturingWriter {
    html: RefCell<String>,
}

impl HtmlToPdf for CapturingWriter {
    fn write_pdf(&self, html: &str) -> invoice_forge::Result<Vec<u8>> {
        *self.html.borrow_mut() = html.to_string();
        Ok(b"%PDF-stub".to_vec())
    }
}

#[test]
fn custom_writer_receives_rendered_markup() {
    let root = project_root();
    let (store, inv) = store_with_lines(3);
    let writer = CapturingWriter {
        html: RefCell::new(String::new()),
    };
    let (bytes, _) =
        generate_invoice_pdf_with(&store, &inv, &config_for(root.path()), &writer).unwrap();
    assert_eq!(bytes, b"%PDF-stub");
    let html = writer.html.borrow();
    assert!(html.contains("Product 3 (Blue)"));
    // Three products use the spacious layout without a table.
    assert!(!html.contains("<table"));
}

struct FailingWriter;

impl HtmlToPdf for FailingWriter {
    fn write_pdf(&self, _html: &str) -> invoice_forge::Result<Vec<u8>> {
        Err(Error::Pdf("converter crashed".to_string()))
    }
}

#[test]
fn converter_errors_propagate() {
    let root = project_root();
    let (store, inv) = store_with_lines(1);
    let err = generate_invoice_pdf_with(&store, &inv, &config_for(root.path()), &FailingWriter)
        .unwrap_err();
    assert!(matches!(err, Error::Pdf(msg) if msg == "converter crashed"));
}
