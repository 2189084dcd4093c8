//! Product pagination – decides which order lines land on which page.
//!
//! The invoice template has two first-page layouts: a spacious card list for
//! short orders and a product table that fits one more row. Every page after
//! the first holds a fixed number of table rows.

use crate::error::{Error, Result};

/// First-page capacity of the spacious layout without a product table.
pub const MAX_PRODUCTS_WITHOUT_TABLE: usize = 3;

/// First-page capacity when the product table is used.
pub const MAX_PRODUCTS_WITH_TABLE: usize = 4;

/// Rows per continuation page.
pub const MAX_PRODUCTS_PER_PAGE: usize = 13;

/// Split `products` into consecutive chunks of `limit`, keeping order.
///
/// The final chunk may be shorter. An empty slice yields no chunks.
pub fn chunk_products<T>(products: &[T], limit: usize) -> Result<Vec<&[T]>> {
    if limit == 0 {
        return Err(Error::InvalidArgument(
            "product chunk size must be positive".to_string(),
        ));
    }
    Ok(products.chunks(limit).collect())
}

/// How many products fit on the first page.
pub fn first_page_limit<T>(products: &[T]) -> usize {
    if products.len() < MAX_PRODUCTS_WITH_TABLE {
        MAX_PRODUCTS_WITHOUT_TABLE
    } else {
        MAX_PRODUCTS_WITH_TABLE
    }
}

/// Products split into the first page and the continuation pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPages<'a, T> {
    pub first_page: &'a [T],
    pub rest: Vec<&'a [T]>,
}

impl<'a, T> ProductPages<'a, T> {
    pub fn split(products: &'a [T]) -> Self {
        let limit = first_page_limit(products).min(products.len());
        let (first_page, remainder) = products.split_at(limit);
        // The page size is a positive constant, so chunking cannot fail.
        let rest = chunk_products(remainder, MAX_PRODUCTS_PER_PAGE).unwrap_or_default();
        Self { first_page, rest }
    }

    /// Whether the first page uses the table layout.
    pub fn uses_table(&self) -> bool {
        self.first_page.len() + self.rest.iter().map(|p| p.len()).sum::<usize>()
            >= MAX_PRODUCTS_WITH_TABLE
    }

    /// Total number of pages carrying products (at least one).
    pub fn page_count(&self) -> usize {
        1 + self.rest.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn chunk_shorter_than_limit() {
        let products = items(10);
        let chunks = chunk_products(&products, 13).unwrap();
        assert_eq!(chunks, vec![&products[..]]);
    }

    #[test]
    fn chunk_spills_one_item() {
        let products = items(14);
        let chunks = chunk_products(&products, 13).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], &products[..13]);
        assert_eq!(chunks[1], &[14]);
    }

    #[test]
    fn chunk_empty_yields_nothing() {
        let products: Vec<usize> = Vec::new();
        assert!(chunk_products(&products, 13).unwrap().is_empty());
    }

    #[test]
    fn chunk_rejects_zero_limit() {
        let products = items(3);
        assert!(matches!(
            chunk_products(&products, 0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn first_page_limit_threshold() {
        assert_eq!(first_page_limit(&items(0)), 3);
        assert_eq!(first_page_limit(&items(3)), 3);
        assert_eq!(first_page_limit(&items(4)), 4);
        assert_eq!(first_page_limit(&items(100)), 4);
    }

    #[test]
    fn split_single_item() {
        let products = items(1);
        let pages = ProductPages::split(&products);
        assert_eq!(pages.first_page, &[1]);
        assert!(pages.rest.is_empty());
        assert!(!pages.uses_table());
        assert_eq!(pages.page_count(), 1);
    }

    #[test]
    fn split_twenty_items() {
        let products = items(20);
        let pages = ProductPages::split(&products);
        assert_eq!(pages.first_page.len(), 4);
        let sizes: Vec<usize> = pages.rest.iter().map(|p| p.len()).collect();
        assert_eq!(sizes, vec![13, 3]);
        assert_eq!(pages.rest[0][0], 5);
        assert!(pages.uses_table());
    }

    #[test]
    fn split_rest_matches_chunking_the_remainder() {
        for n in [0, 3, 4, 5, 17, 30, 31] {
            let products = items(n);
            let pages = ProductPages::split(&products);
            let remainder = &products[pages.first_page.len()..];
            assert_eq!(
                pages.rest,
                chunk_products(remainder, MAX_PRODUCTS_PER_PAGE).unwrap(),
                "{n} products"
            );
        }
    }

    #[test]
    fn split_exactly_four_has_no_rest() {
        let products = items(4);
        let pages = ProductPages::split(&products);
        assert_eq!(pages.first_page.len(), 4);
        assert!(pages.rest.is_empty());
        assert!(pages.uses_table());
    }
}
