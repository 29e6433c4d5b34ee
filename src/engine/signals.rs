//! Normalized facts derived from a cart snapshot.

use std::collections::HashSet;

use super::error::{ScoringError, ScoringResult};
use crate::models::{CartLine, CatalogEntry, ProductId};

/// Lower-cases and splits on whitespace. No stemming, no stop words.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Catalog entries that are not in the cart, in catalog order
pub fn candidates<'a>(catalog: &'a [CatalogEntry], cart: &[CartLine]) -> Vec<&'a CatalogEntry> {
    let in_cart: HashSet<&ProductId> = cart.iter().map(|line| &line.product_id).collect();
    catalog
        .iter()
        .filter(|product| !in_cart.contains(&product.id))
        .collect()
}

/// Signals the cart-based scorers work from
#[derive(Debug, Clone, PartialEq)]
pub struct CartSignals {
    pub categories: HashSet<String>,
    /// Mean of line prices; quantities are not weighted in
    pub avg_price: f64,
    /// One token set per cart line, in cart order
    pub description_tokens: Vec<HashSet<String>>,
}

impl CartSignals {
    pub fn extract(cart: &[CartLine]) -> ScoringResult<Self> {
        if cart.is_empty() {
            return Err(ScoringError::EmptyCart);
        }

        let categories = cart.iter().map(|line| line.category.clone()).collect();
        let avg_price = cart.iter().map(|line| line.price).sum::<f64>() / cart.len() as f64;
        let description_tokens = cart.iter().map(|line| tokenize(&line.description)).collect();

        Ok(Self {
            categories,
            avg_price,
            description_tokens,
        })
    }
}
