use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while looking up records or producing an invoice PDF.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A caller passed an argument outside the accepted range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The invoice references an order the store does not know.
    #[error("order {0} not found")]
    OrderNotFound(u64),

    /// No invoice with the requested id exists.
    #[error("invoice {0} not found")]
    InvoiceNotFound(u64),

    /// The record store could not answer a query.
    #[error("store error: {0}")]
    Store(String),

    /// The font referenced by the document could not be read.
    #[error("failed to read font '{}': {source}", path.display())]
    Font {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The invoice template failed to render.
    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    /// The HTML to PDF conversion failed.
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
