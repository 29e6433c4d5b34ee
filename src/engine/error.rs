use thiserror::Error;

use crate::models::ProductId;

/// Input errors raised by the scoring engine.
///
/// Signals that cannot be computed for a single candidate (zero average price,
/// empty descriptions) are not errors: the affected factor degrades to `0.0`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("limit must be at least 1, got {0}")]
    InvalidLimit(usize),

    #[error("duplicate product id in catalog: {0}")]
    DuplicateProduct(ProductId),

    #[error("product {product_id} has an invalid price: {price}")]
    NegativePrice { product_id: ProductId, price: f64 },

    #[error("cart line {product_id} has an invalid quantity: {quantity}")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    #[error("cannot extract cart signals from an empty cart")]
    EmptyCart,

    #[error("product not found in catalog: {0}")]
    UnknownProduct(ProductId),

    #[error("product {0} is already in the cart")]
    ProductInCart(ProductId),

    #[error("strategy weights must sum to 1.0, got {0}")]
    InvalidWeights(f64),
}

pub type ScoringResult<T> = Result<T, ScoringError>;
