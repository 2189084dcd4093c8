//! Sequential invoice numbers of the form `<n>/<MM>/<YYYY>`.
//!
//! The counter continues from the last issued invoice; the month and year are
//! always taken from the current date. A last number that cannot be parsed
//! starts a fresh sequence at 1 instead of failing.

use std::num::ParseIntError;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Datelike, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::error::Result;
use crate::store::InvoiceStore;

/// Why a stored invoice number did not yield a counter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberParseError {
    /// No `<digits>/` prefix at the start of the number.
    #[error("invoice number {0:?} has no numeric prefix")]
    NoMatch(String),

    /// The prefix is digits but does not fit the counter type.
    #[error("invoice number prefix is not a valid integer: {0}")]
    InvalidInteger(#[from] ParseIntError),
}

/// Format a full invoice number for `number` in the month of `today`.
pub fn make_full_invoice_number(number: u64, today: &impl Datelike) -> String {
    format!("{number}/{:02}/{:04}", today.month(), today.year())
}

/// Extract the leading counter of an invoice number such as `"12/05/2024"`.
///
/// Only ASCII digits count; a prefix in other scripts (`"١٢/01/2024"`) is
/// reported as [`NumberParseError::NoMatch`].
pub fn parse_invoice_number(number: &str) -> std::result::Result<u64, NumberParseError> {
    static PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]+)/").expect("valid regex"));

    let captures = PREFIX
        .captures(number)
        .ok_or_else(|| NumberParseError::NoMatch(number.to_string()))?;
    let digits = captures
        .get(1)
        .ok_or_else(|| NumberParseError::NoMatch(number.to_string()))?;
    Ok(digits.as_str().parse::<u64>()?)
}

/// Counter that follows `last_number`, or 1 when there is nothing usable.
fn next_counter(last_number: Option<&str>) -> u64 {
    let Some(number) = last_number.filter(|n| !n.is_empty()) else {
        return 1;
    };
    match parse_invoice_number(number).map(|n| n.checked_add(1)) {
        Ok(Some(next)) => next,
        Ok(None) => {
            log::warn!("invoice counter overflow after {number:?}, restarting at 1");
            1
        }
        Err(e) => {
            log::warn!("{e}, restarting invoice numbering at 1");
            1
        }
    }
}

/// Next invoice number based on the store's most recent invoice.
pub fn generate_invoice_number<S: InvoiceStore + ?Sized>(store: &S) -> Result<String> {
    generate_invoice_number_at(store, &Local::now())
}

/// Like [`generate_invoice_number`] with an explicit current date.
pub fn generate_invoice_number_at<S: InvoiceStore + ?Sized>(
    store: &S,
    today: &impl Datelike,
) -> Result<String> {
    let last = store.last_invoice()?;
    let counter = next_counter(last.as_ref().and_then(|i| i.number.as_deref()));
    Ok(make_full_invoice_number(counter, today))
}

/// In-process monotonic allocator for invoice numbers.
///
/// Seeded once from the store, then hands out numbers from an atomic counter
/// so concurrent callers in one process never receive the same number.
#[derive(Debug)]
pub struct InvoiceNumberSequence {
    next: AtomicU64,
}

impl InvoiceNumberSequence {
    /// Start a sequence at `next`.
    pub fn starting_at(next: u64) -> Self {
        Self {
            next: AtomicU64::new(next.max(1)),
        }
    }

    /// Continue from the store's most recent invoice.
    pub fn from_store<S: InvoiceStore + ?Sized>(store: &S) -> Result<Self> {
        let last = store.last_invoice()?;
        let next = next_counter(last.as_ref().and_then(|i| i.number.as_deref()));
        log::debug!("invoice sequence seeded at {next}");
        Ok(Self::starting_at(next))
    }

    /// Allocate the next number for the current month.
    pub fn next_number(&self) -> String {
        self.next_number_at(&Local::now())
    }

    /// Allocate the next number stamped with `today`.
    pub fn next_number_at(&self, today: &impl Datelike) -> String {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        make_full_invoice_number(n, today)
    }

    /// The counter the next call will use.
    pub fn peek(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}
