use super::error::{ScoringError, ScoringResult};
use super::explanation::POPULARITY_FALLBACK;
use super::signals;
use crate::models::{Algorithm, CartLine, CatalogEntry, Explanation, FeedbackEvent, Recommendation};

/// Read-only inputs of one scoring call
#[derive(Debug, Clone, Copy)]
pub struct ScoringRequest<'a> {
    pub cart: &'a [CartLine],
    pub catalog: &'a [CatalogEntry],
    pub limit: usize,
}

impl<'a> ScoringRequest<'a> {
    /// Catalog products not in the cart, in catalog order
    pub fn candidates(&self) -> Vec<&'a CatalogEntry> {
        signals::candidates(self.catalog, self.cart)
    }

    /// Same inputs without truncation
    pub fn unlimited(&self) -> Self {
        Self {
            limit: usize::MAX,
            ..*self
        }
    }
}

/// A recommendation strategy selectable by its `Algorithm` tag
pub trait RecommendationStrategy: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Scores every candidate and returns the top `request.limit`, best first.
    /// Candidates with equal scores keep their catalog order.
    fn generate_recommendations(
        &self,
        request: &ScoringRequest<'_>,
    ) -> ScoringResult<Vec<Recommendation>>;

    /// Folds a feedback event back into the strategy
    fn update_model(&self, feedback: &FeedbackEvent);

    /// Explains the score `product` would get for this request.
    ///
    /// The default implementation reuses the batch path: it scores every candidate
    /// and reads back the entry for `product`.
    fn explain_recommendation(
        &self,
        request: &ScoringRequest<'_>,
        product: &CatalogEntry,
    ) -> ScoringResult<Explanation> {
        if request.cart.iter().any(|line| line.product_id == product.id) {
            return Err(ScoringError::ProductInCart(product.id.clone()));
        }

        let ranked = self.generate_recommendations(&request.unlimited())?;
        let explanation = ranked
            .into_iter()
            .find(|rec| rec.product_id == product.id)
            .map(|rec| Explanation {
                explanation: rec.explanation,
                confidence: rec.score,
            })
            .unwrap_or_else(|| Explanation {
                explanation: POPULARITY_FALLBACK.to_string(),
                confidence: 0.0,
            });

        Ok(explanation)
    }
}

/// Stable sort by score descending, then truncate
pub fn rank(mut recommendations: Vec<Recommendation>, limit: usize) -> Vec<Recommendation> {
    recommendations.sort_by(|a, b| b.score.total_cmp(&a.score));
    recommendations.truncate(limit);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductId, Source};

    fn rec(id: &str, score: f64) -> Recommendation {
        let product = CatalogEntry {
            id: ProductId::from(id),
            name: id.to_string(),
            description: String::new(),
            category: "X".to_string(),
            price: 1.0,
            image_ref: None,
        };
        Recommendation::new(&product, score, Source::Hybrid, String::new(), Algorithm::Hybrid)
    }

    fn ids(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.product_id.0.as_str()).collect()
    }

    #[test]
    fn test_rank_sorts_descending() {
        let ranked = rank(vec![rec("a", 0.1), rec("b", 0.9), rec("c", 0.5)], 10);
        assert_eq!(ids(&ranked), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rank_keeps_input_order_for_ties() {
        let ranked = rank(
            vec![rec("a", 0.5), rec("b", 0.7), rec("c", 0.5), rec("d", 0.5)],
            10,
        );
        assert_eq!(ids(&ranked), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_rank_truncates() {
        let ranked = rank(vec![rec("a", 0.1), rec("b", 0.2), rec("c", 0.3)], 2);
        assert_eq!(ids(&ranked), vec!["c", "b"]);
    }
}
