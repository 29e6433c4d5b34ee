//! Recommendation scoring engine.
//!
//! Pure, synchronous scoring over read-only cart and catalog snapshots. A single
//! [`Recommender`] is built at start-up and shared; it holds no per-customer state,
//! so concurrent calls only need their own snapshots.

pub mod baseline;
pub mod error;
pub mod explanation;
pub mod fallback;
pub mod hybrid;
pub mod scorers;
pub mod signals;
pub mod strategy;

use std::collections::HashSet;

pub use baseline::{CollaborativeStrategy, ContentStrategy, SequentialStrategy};
pub use error::{ScoringError, ScoringResult};
pub use hybrid::{HybridStrategy, StrategyWeights, DEFAULT_WEIGHTS};
pub use strategy::{RecommendationStrategy, ScoringRequest};

use crate::models::{
    Algorithm, CartLine, CatalogEntry, CustomerProfile, Explanation, FeedbackEvent, ProductId,
    Recommendation,
};

/// Entry point of the engine: validates input and dispatches to a strategy by tag
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    hybrid: HybridStrategy,
    collaborative: CollaborativeStrategy,
    content: ContentStrategy,
    sequential: SequentialStrategy,
}

impl Recommender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hybrid_weights(weights: StrategyWeights) -> ScoringResult<Self> {
        Ok(Self {
            hybrid: HybridStrategy::with_weights(weights)?,
            ..Self::default()
        })
    }

    pub fn hybrid_weights(&self) -> StrategyWeights {
        self.hybrid.weights()
    }

    pub fn strategy(&self, algorithm: Algorithm) -> &dyn RecommendationStrategy {
        match algorithm {
            Algorithm::Hybrid => &self.hybrid,
            Algorithm::Collaborative => &self.collaborative,
            Algorithm::Content => &self.content,
            Algorithm::Sequential => &self.sequential,
        }
    }

    /// Explicit request wins, then the profile's preferred algorithm, then hybrid
    pub fn resolve_algorithm(&self, requested: Option<Algorithm>, profile: &CustomerProfile) -> Algorithm {
        requested
            .or_else(|| profile.preferred_algorithm())
            .unwrap_or(Algorithm::Hybrid)
    }

    /// Returns at most `limit` recommendations, best first, never including cart items
    pub fn score(
        &self,
        profile: &CustomerProfile,
        cart: &[CartLine],
        catalog: &[CatalogEntry],
        limit: usize,
        algorithm: Option<Algorithm>,
    ) -> ScoringResult<Vec<Recommendation>> {
        if limit < 1 {
            return Err(ScoringError::InvalidLimit(limit));
        }
        validate_snapshots(cart, catalog)?;

        let algorithm = self.resolve_algorithm(algorithm, profile);
        let request = ScoringRequest {
            cart,
            catalog,
            limit,
        };

        let recommendations = self.strategy(algorithm).generate_recommendations(&request)?;

        tracing::debug!(
            algorithm = %algorithm,
            catalog_size = catalog.len(),
            cart_lines = cart.len(),
            returned = recommendations.len(),
            "Scored recommendations"
        );

        Ok(recommendations)
    }

    /// Explains the hybrid score of one product, using the same scorers as `score`
    pub fn explain(
        &self,
        cart: &[CartLine],
        catalog: &[CatalogEntry],
        product_id: &ProductId,
    ) -> ScoringResult<Explanation> {
        validate_snapshots(cart, catalog)?;

        let product = catalog
            .iter()
            .find(|entry| &entry.id == product_id)
            .ok_or_else(|| ScoringError::UnknownProduct(product_id.clone()))?;

        let request = ScoringRequest {
            cart,
            catalog,
            limit: catalog.len().max(1),
        };

        self.hybrid.explain_recommendation(&request, product)
    }

    /// Hook for folding feedback into strategy weighting; every strategy is notified
    pub fn update_weights(&self, feedback: &FeedbackEvent) {
        for algorithm in Algorithm::ALL {
            let strategy = self.strategy(algorithm);
            tracing::debug!(
                algorithm = %strategy.algorithm(),
                recommendation_id = %feedback.recommendation_id,
                "Forwarding feedback to strategy"
            );
            strategy.update_model(feedback);
        }
    }
}

fn validate_price(product_id: &ProductId, price: f64) -> ScoringResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(ScoringError::NegativePrice {
            product_id: product_id.clone(),
            price,
        });
    }
    Ok(())
}

fn validate_snapshots(cart: &[CartLine], catalog: &[CatalogEntry]) -> ScoringResult<()> {
    let mut seen = HashSet::with_capacity(catalog.len());
    for entry in catalog {
        if !seen.insert(&entry.id) {
            return Err(ScoringError::DuplicateProduct(entry.id.clone()));
        }
        validate_price(&entry.id, entry.price)?;
    }

    for line in cart {
        if line.quantity < 1 {
            return Err(ScoringError::InvalidQuantity {
                product_id: line.product_id.clone(),
                quantity: line.quantity,
            });
        }
        validate_price(&line.product_id, line.price)?;
    }

    Ok(())
}
