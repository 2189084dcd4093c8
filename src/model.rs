//! Invoice, order and line records as read from the store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An issued invoice. Invoices are append-only and ordered by creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: u64,
    /// Human readable number, `<n>/<MM>/<YYYY>` when present.
    #[serde(default)]
    pub number: Option<String>,
    pub order_id: u64,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(id: u64, number: Option<String>, order_id: u64, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            number,
            order_id,
            created_at,
        }
    }

    /// The number for display, empty when the invoice has none yet.
    pub fn display_number(&self) -> &str {
        self.number.as_deref().unwrap_or("")
    }
}

/// Postal address printed in the invoice header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

impl Address {
    /// `"<postal code> <city>"` line.
    pub fn city_line(&self) -> String {
        format!("{} {}", self.postal_code, self.city).trim().to_string()
    }
}

/// The order an invoice is issued for. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub number: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default)]
    pub shipping_address: Option<Address>,
    pub currency: String,
    pub total_net: Decimal,
    pub total_gross: Decimal,
    #[serde(default)]
    pub shipping_price_gross: Decimal,
}

impl Order {
    pub fn total_tax(&self) -> Decimal {
        self.total_gross - self.total_net
    }

    pub fn customer_email_or_blank(&self) -> &str {
        self.customer_email.as_deref().unwrap_or("")
    }
}

/// One product row of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: u64,
    pub order_id: u64,
    pub product_name: String,
    #[serde(default)]
    pub variant_name: Option<String>,
    #[serde(default)]
    pub product_sku: Option<String>,
    pub quantity: u32,
    pub unit_price_gross: Decimal,
    pub total_price_gross: Decimal,
    #[serde(default)]
    pub tax_rate: Decimal,
}

impl Line {
    /// Product name with the variant appended, e.g. `"T-Shirt (XL)"`.
    pub fn full_name(&self) -> String {
        match self.variant_name.as_deref() {
            Some(variant) if !variant.is_empty() => format!("{} ({variant})", self.product_name),
            _ => self.product_name.clone(),
        }
    }

    pub fn sku_or_blank(&self) -> &str {
        self.product_sku.as_deref().unwrap_or("")
    }

    /// Tax rate as a percentage string, e.g. `"23%"`.
    pub fn tax_percent(&self) -> String {
        format!("{}%", (self.tax_rate * Decimal::ONE_HUNDRED).normalize())
    }
}
