//! Record store – the read side of invoices, orders and order lines.
//!
//! [`InvoiceStore`] is the seam the numbering and rendering code query. Two
//! implementations are provided: [`MemoryStore`] for embedding and tests, and
//! [`JsonFileStore`] which persists a [`StoreSnapshot`] as a JSON document.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Invoice, Line, Order};

/// Queries the invoicing code needs from the backing store.
pub trait InvoiceStore {
    /// The most recently created invoice, if any.
    fn last_invoice(&self) -> Result<Option<Invoice>>;

    /// Look up an invoice by id.
    fn invoice(&self, id: u64) -> Result<Invoice>;

    /// Look up an order by id.
    fn order(&self, id: u64) -> Result<Order>;

    /// All lines of an order in store-native (insertion) order.
    fn order_lines(&self, order_id: u64) -> Result<Vec<Line>>;
}

/// Plain collections of every record kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub invoices: Vec<Invoice>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub lines: Vec<Line>,
}

impl StoreSnapshot {
    /// Latest invoice by `(created_at, id)`; later entries win ties.
    fn last_invoice(&self) -> Option<&Invoice> {
        self.invoices.iter().max_by_key(|i| (i.created_at, i.id))
    }

    fn invoice(&self, id: u64) -> Result<Invoice> {
        self.invoices
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or(Error::InvoiceNotFound(id))
    }

    fn order(&self, id: u64) -> Result<Order> {
        self.orders
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(Error::OrderNotFound(id))
    }

    fn order_lines(&self, order_id: u64) -> Vec<Line> {
        self.lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store holding every record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: StoreSnapshot,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn insert_invoice(&mut self, invoice: Invoice) {
        self.snapshot.invoices.push(invoice);
    }

    pub fn insert_order(&mut self, order: Order) {
        self.snapshot.orders.push(order);
    }

    pub fn insert_line(&mut self, line: Line) {
        self.snapshot.lines.push(line);
    }

    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }
}

impl InvoiceStore for MemoryStore {
    fn last_invoice(&self) -> Result<Option<Invoice>> {
        Ok(self.snapshot.last_invoice().cloned())
    }

    fn invoice(&self, id: u64) -> Result<Invoice> {
        self.snapshot.invoice(id)
    }

    fn order(&self, id: u64) -> Result<Order> {
        self.snapshot.order(id)
    }

    fn order_lines(&self, order_id: u64) -> Result<Vec<Line>> {
        Ok(self.snapshot.order_lines(order_id))
    }
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

/// Store backed by a JSON document on disk.
///
/// The file is read once in [`JsonFileStore::open`]; [`JsonFileStore::save`]
/// writes the current state back.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open an existing store file. A missing file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            log::debug!("store file '{}' does not exist, starting empty", path.display());
            StoreSnapshot::default()
        };
        Ok(Self {
            path,
            inner: MemoryStore::from_snapshot(snapshot),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn insert_invoice(&mut self, invoice: Invoice) {
        self.inner.insert_invoice(invoice);
    }

    pub fn insert_order(&mut self, order: Order) {
        self.inner.insert_order(order);
    }

    pub fn insert_line(&mut self, line: Line) {
        self.inner.insert_line(line);
    }

    /// Persist the current records as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self.inner.snapshot())?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl InvoiceStore for JsonFileStore {
    fn last_invoice(&self) -> Result<Option<Invoice>> {
        self.inner.last_invoice()
    }

    fn invoice(&self, id: u64) -> Result<Invoice> {
        self.inner.invoice(id)
    }

    fn order(&self, id: u64) -> Result<Order> {
        self.inner.order(id)
    }

    fn order_lines(&self, order_id: u64) -> Result<Vec<Line>> {
        self.inner.order_lines(order_id)
    }
}
