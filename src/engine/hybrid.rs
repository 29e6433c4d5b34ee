use super::error::{ScoringError, ScoringResult};
use super::explanation::explain_confidence;
use super::fallback::score_by_popularity;
use super::scorers::FactorScores;
use super::signals::CartSignals;
use super::strategy::{rank, RecommendationStrategy, ScoringRequest};
use crate::models::{Algorithm, CatalogEntry, Explanation, FeedbackEvent, Recommendation, Source};

/// Default weights; they sum to 1.0
pub const DEFAULT_WEIGHTS: StrategyWeights = StrategyWeights {
    category: 0.4,
    price: 0.3,
    description: 0.3,
};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Per-factor weights of the hybrid score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyWeights {
    pub category: f64,
    pub price: f64,
    pub description: f64,
}

impl Default for StrategyWeights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl StrategyWeights {
    pub fn sum(&self) -> f64 {
        self.category + self.price + self.description
    }

    /// Rejects negative weights and sets that do not sum to 1.0
    pub fn validate(self) -> ScoringResult<Self> {
        let sum = self.sum();
        let negative = [self.category, self.price, self.description]
            .iter()
            .any(|w| !w.is_finite() || *w < 0.0);

        if negative || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringError::InvalidWeights(sum));
        }
        Ok(self)
    }

    /// Weighted sum, not renormalized
    pub fn combine(&self, factors: &FactorScores) -> f64 {
        factors.category * self.category
            + factors.price * self.price
            + factors.description * self.description
    }
}

/// Blends category, price and description confidence into one score.
///
/// Falls back to popularity/diversity scoring when the cart is empty.
#[derive(Debug, Clone, Default)]
pub struct HybridStrategy {
    weights: StrategyWeights,
}

impl HybridStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: StrategyWeights) -> ScoringResult<Self> {
        Ok(Self {
            weights: weights.validate()?,
        })
    }

    pub fn weights(&self) -> StrategyWeights {
        self.weights
    }

    /// Score and factor breakdown for one candidate against a non-empty cart
    pub fn score_candidate(&self, candidate: &CatalogEntry, signals: &CartSignals) -> (f64, FactorScores) {
        let factors = FactorScores::for_candidate(candidate, signals);
        (self.weights.combine(&factors), factors)
    }

    fn recommend_for_cart(&self, candidates: &[&CatalogEntry], signals: &CartSignals) -> Vec<Recommendation> {
        candidates
            .iter()
            .map(|candidate| {
                let (score, factors) = self.score_candidate(candidate, signals);
                let explanation = explain_confidence(&factors, &candidate.category, signals.avg_price);
                Recommendation::new(candidate, score, Source::Hybrid, explanation, Algorithm::Hybrid)
            })
            .collect()
    }
}

impl RecommendationStrategy for HybridStrategy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Hybrid
    }

    fn generate_recommendations(
        &self,
        request: &ScoringRequest<'_>,
    ) -> ScoringResult<Vec<Recommendation>> {
        let candidates = request.candidates();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let scored = if request.cart.is_empty() {
            score_by_popularity(&candidates, Algorithm::Hybrid)
        } else {
            let signals = CartSignals::extract(request.cart)?;
            self.recommend_for_cart(&candidates, &signals)
        };

        tracing::debug!(
            candidates = candidates.len(),
            cart_lines = request.cart.len(),
            limit = request.limit,
            "Hybrid scoring complete"
        );

        Ok(rank(scored, request.limit))
    }

    fn update_model(&self, feedback: &FeedbackEvent) {
        // Weights stay fixed until a re-weighting scheme is defined.
        tracing::debug!(
            recommendation_id = %feedback.recommendation_id,
            clicked = feedback.clicked,
            "Hybrid weights unchanged by feedback"
        );
    }

    fn explain_recommendation(
        &self,
        request: &ScoringRequest<'_>,
        product: &CatalogEntry,
    ) -> ScoringResult<Explanation> {
        if request.cart.iter().any(|line| line.product_id == product.id) {
            return Err(ScoringError::ProductInCart(product.id.clone()));
        }

        if request.cart.is_empty() {
            let candidates = request.candidates();
            let popular = score_by_popularity(&candidates, Algorithm::Hybrid);
            return popular
                .into_iter()
                .find(|rec| rec.product_id == product.id)
                .map(|rec| Explanation {
                    explanation: rec.explanation,
                    confidence: rec.score,
                })
                .ok_or_else(|| ScoringError::UnknownProduct(product.id.clone()));
        }

        let signals = CartSignals::extract(request.cart)?;
        let (confidence, factors) = self.score_candidate(product, &signals);

        Ok(Explanation {
            explanation: explain_confidence(&factors, &product.category, signals.avg_price),
            confidence,
        })
    }
}
