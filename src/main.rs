//! invoicer – command-line invoice numbering and PDF rendering.
//!
//! Usage:
//!   invoicer next-number <store.json>
//!   invoicer render <store.json> <invoice-id> [output.pdf] [--root DIR] [--layout FILE]
//!
//! If `output.pdf` is omitted the PDF is written to `invoice-<id>.pdf` in the
//! current directory.

use std::{env, fs, path::PathBuf, process};

use invoice_forge::pipeline::{document_title, render_invoice_html};
use invoice_forge::store::{InvoiceStore, JsonFileStore};
use invoice_forge::{generate_invoice_number, InvoicingConfig, PdfWriter};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let prog = args.first().map(String::as_str).unwrap_or("invoicer");

    match args.get(1).map(String::as_str) {
        Some("next-number") => next_number(prog, &args[2..]),
        Some("render") => render(prog, &args[2..]),
        Some("--help" | "-h") => {
            print_usage(prog);
            process::exit(0);
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_usage(prog);
            process::exit(1);
        }
        None => {
            eprintln!("Error: no command specified.");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn open_store(path: &str) -> JsonFileStore {
    match JsonFileStore::open(path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening store '{path}': {e}");
            process::exit(1);
        }
    }
}

fn next_number(prog: &str, args: &[String]) {
    let Some(store_path) = args.first() else {
        eprintln!("Error: no store file specified.");
        print_usage(prog);
        process::exit(1);
    };
    let store = open_store(store_path);
    match generate_invoice_number(&store) {
        Ok(number) => println!("{number}"),
        Err(e) => {
            eprintln!("Error generating invoice number: {e}");
            process::exit(1);
        }
    }
}

fn render(prog: &str, args: &[String]) {
    let mut positional: Vec<&str> = Vec::new();
    let mut root: Option<PathBuf> = None;
    let mut layout_path: Option<PathBuf> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--root" | "-r" => match iter.next() {
                Some(v) => root = Some(PathBuf::from(v)),
                None => {
                    eprintln!("Error: --root needs a directory.");
                    process::exit(1);
                }
            },
            "--layout" => match iter.next() {
                Some(v) => layout_path = Some(PathBuf::from(v)),
                None => {
                    eprintln!("Error: --layout needs a file path.");
                    process::exit(1);
                }
            },
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(prog);
                process::exit(1);
            }
            path => positional.push(path),
        }
    }

    let (store_path, invoice_arg, output) = match positional.as_slice() {
        [store, id] => (*store, *id, None),
        [store, id, out] => (*store, *id, Some(PathBuf::from(out))),
        _ => {
            eprintln!("Error: expected <store.json> <invoice-id> [output.pdf].");
            print_usage(prog);
            process::exit(1);
        }
    };
    let invoice_id: u64 = match invoice_arg.parse() {
        Ok(id) => id,
        Err(_) => {
            eprintln!("Error: invoice id '{invoice_arg}' is not a number.");
            process::exit(1);
        }
    };
    let output = output.unwrap_or_else(|| PathBuf::from(format!("invoice-{invoice_id}.pdf")));

    let mut config = InvoicingConfig::from_env();
    if let Some(root) = root {
        config.project_root = root;
    }

    let store = open_store(store_path);
    let invoice = match store.invoice(invoice_id) {
        Ok(invoice) => invoice,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let writer = PdfWriter::new(config.page_config(&document_title(&invoice)));
    let result = render_invoice_html(&store, &invoice, &config)
        .and_then(|rendered| writer.write_pdf_with_layout(&rendered.html));

    match result {
        Ok((bytes, layout)) => {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        eprintln!("Error creating output directory: {e}");
                        process::exit(1);
                    }
                }
            }
            if let Err(e) = fs::write(&output, &bytes) {
                eprintln!("Error writing '{}': {e}", output.display());
                process::exit(1);
            }
            if let Some(path) = layout_path {
                let written = layout
                    .to_json()
                    .map_err(|e| e.to_string())
                    .and_then(|json| fs::write(&path, json).map_err(|e| e.to_string()));
                if let Err(e) = written {
                    eprintln!("Error writing layout '{}': {e}", path.display());
                    process::exit(1);
                }
            }
            let pages = layout.pages.len();
            eprintln!(
                "Wrote '{}' ({} bytes, {} page{})",
                output.display(),
                bytes.len(),
                pages,
                if pages == 1 { "" } else { "s" }
            );
        }
        Err(e) => {
            eprintln!("Error generating invoice PDF: {e}");
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("invoicer – invoice numbering and PDF rendering (invoice-forge)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} next-number <store.json>");
    eprintln!("  {prog} render <store.json> <invoice-id> [output.pdf] [--root DIR] [--layout FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <store.json>   JSON record store with invoices, orders and lines");
    eprintln!("  <invoice-id>   Id of the invoice to render");
    eprintln!("  [output.pdf]   Output path  (default: invoice-<id>.pdf)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --root, -r     Project root holding templates/invoices/inter.ttf");
    eprintln!("                 (default: $INVOICING_PROJECT_ROOT)");
    eprintln!("  --layout       Also write the computed page layout as JSON");
    eprintln!("  --help         Print this message");
}
