//! Single-signal strategies selectable by tag next to the hybrid one.
//!
//! None of them uses purchase history yet: "collaborative" scores by category
//! overlap with the cart, "content" by price proximity and "sequential" by a
//! fixed base score with category and price boosts.

use std::collections::HashSet;

use super::error::ScoringResult;
use super::explanation::popular_in_category;
use super::signals::CartSignals;
use super::strategy::{rank, RecommendationStrategy, ScoringRequest};
use crate::models::{Algorithm, CatalogEntry, FeedbackEvent, Recommendation, Source};

const BASE_POPULARITY_SCORE: f64 = 0.7;
const CATEGORY_MATCH_SCORE: f64 = 0.8;
const CONTENT_PRICE_SCALE: f64 = 100.0;
const SEQUENTIAL_CATEGORY_BOOST: f64 = 0.2;
const SEQUENTIAL_PRICE_BOOST: f64 = 0.1;
const SEQUENTIAL_PRICE_WINDOW: f64 = 50.0;

fn leading(catalog: &[CatalogEntry], limit: usize) -> impl Iterator<Item = &CatalogEntry> {
    catalog.iter().take(limit)
}

/// Category overlap with the cart
#[derive(Debug, Clone, Default)]
pub struct CollaborativeStrategy;

impl RecommendationStrategy for CollaborativeStrategy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Collaborative
    }

    fn generate_recommendations(
        &self,
        request: &ScoringRequest<'_>,
    ) -> ScoringResult<Vec<Recommendation>> {
        if request.cart.is_empty() {
            return Ok(leading(request.catalog, request.limit)
                .map(|product| {
                    Recommendation::new(
                        product,
                        BASE_POPULARITY_SCORE,
                        Source::PopularProduct,
                        popular_in_category(&product.category),
                        Algorithm::Collaborative,
                    )
                })
                .collect());
        }

        let cart_categories: HashSet<&str> =
            request.cart.iter().map(|line| line.category.as_str()).collect();

        let scored = request
            .candidates()
            .into_iter()
            .filter(|product| cart_categories.contains(product.category.as_str()))
            .map(|product| {
                Recommendation::new(
                    product,
                    CATEGORY_MATCH_SCORE,
                    Source::CollaborativeFiltering,
                    format!(
                        "Customers who bought items in {} also bought this",
                        product.category
                    ),
                    Algorithm::Collaborative,
                )
            })
            .collect();

        Ok(rank(scored, request.limit))
    }

    fn update_model(&self, _feedback: &FeedbackEvent) {}
}

/// Price proximity to the cart average on a fixed scale
#[derive(Debug, Clone, Default)]
pub struct ContentStrategy;

impl RecommendationStrategy for ContentStrategy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Content
    }

    fn generate_recommendations(
        &self,
        request: &ScoringRequest<'_>,
    ) -> ScoringResult<Vec<Recommendation>> {
        if request.cart.is_empty() {
            // One featured product per category, first-seen order
            let mut seen = HashSet::new();
            return Ok(request
                .catalog
                .iter()
                .filter(|product| seen.insert(product.category.as_str()))
                .take(request.limit)
                .map(|product| {
                    Recommendation::new(
                        product,
                        BASE_POPULARITY_SCORE,
                        Source::ContentBased,
                        format!("Featured product in {}", product.category),
                        Algorithm::Content,
                    )
                })
                .collect());
        }

        let signals = CartSignals::extract(request.cart)?;
        let explanation = format!(
            "Similar to your preferred price range (${:.2})",
            signals.avg_price
        );

        let scored = request
            .candidates()
            .into_iter()
            .map(|product| {
                let gap = (product.price - signals.avg_price).abs();
                let score = 1.0 / (1.0 + gap / CONTENT_PRICE_SCALE);
                Recommendation::new(
                    product,
                    score,
                    Source::ContentBased,
                    explanation.clone(),
                    Algorithm::Content,
                )
            })
            .collect();

        Ok(rank(scored, request.limit))
    }

    fn update_model(&self, _feedback: &FeedbackEvent) {}
}

/// Fixed base score boosted by category match and a price window
#[derive(Debug, Clone, Default)]
pub struct SequentialStrategy;

impl RecommendationStrategy for SequentialStrategy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Sequential
    }

    fn generate_recommendations(
        &self,
        request: &ScoringRequest<'_>,
    ) -> ScoringResult<Vec<Recommendation>> {
        if request.cart.is_empty() {
            return Ok(leading(request.catalog, request.limit)
                .map(|product| {
                    Recommendation::new(
                        product,
                        BASE_POPULARITY_SCORE,
                        Source::Sequential,
                        format!("Frequently purchased product in {}", product.category),
                        Algorithm::Sequential,
                    )
                })
                .collect());
        }

        let signals = CartSignals::extract(request.cart)?;

        let scored = request
            .candidates()
            .into_iter()
            .map(|product| {
                let mut score = BASE_POPULARITY_SCORE;
                if signals.categories.contains(&product.category) {
                    score += SEQUENTIAL_CATEGORY_BOOST;
                }
                if (product.price - signals.avg_price).abs() <= SEQUENTIAL_PRICE_WINDOW {
                    score += SEQUENTIAL_PRICE_BOOST;
                }
                Recommendation::new(
                    product,
                    score,
                    Source::Sequential,
                    format!("Frequently bought together with {} products", product.category),
                    Algorithm::Sequential,
                )
            })
            .collect();

        Ok(rank(scored, request.limit))
    }

    fn update_model(&self, _feedback: &FeedbackEvent) {}
}
