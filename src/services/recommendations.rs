use std::sync::Arc;

use crate::{
    engine::Recommender,
    error::AppResult,
    models::{
        Algorithm, AlgorithmStats, CartLine, CatalogEntry, CustomerProfile, Explanation,
        FeedbackEvent, IssuedRecommendation, ProductId,
    },
    services::FeedbackSink,
};

/// Result of one recommendation request after the batch has been issued
#[derive(Debug, Clone)]
pub struct RecommendationOutcome {
    pub algorithm: Algorithm,
    pub based_on_cart: bool,
    pub recommendations: Vec<IssuedRecommendation>,
}

/// Ties the scoring engine to the feedback sink
///
/// Scoring runs synchronously on caller-provided snapshots; only recording
/// issued recommendations and feedback touches shared storage.
#[derive(Clone)]
pub struct RecommendationService {
    recommender: Arc<Recommender>,
    feedback: Arc<dyn FeedbackSink>,
}

impl RecommendationService {
    pub fn new(recommender: Arc<Recommender>, feedback: Arc<dyn FeedbackSink>) -> Self {
        Self {
            recommender,
            feedback,
        }
    }

    pub fn feedback_sink_name(&self) -> &'static str {
        self.feedback.name()
    }

    /// Scores the catalog for a customer and records the batch for later feedback
    pub async fn recommend(
        &self,
        customer_id: &str,
        profile: &CustomerProfile,
        cart: &[CartLine],
        catalog: &[CatalogEntry],
        limit: usize,
        requested: Option<Algorithm>,
    ) -> AppResult<RecommendationOutcome> {
        let algorithm = self.recommender.resolve_algorithm(requested, profile);
        let scored = self
            .recommender
            .score(profile, cart, catalog, limit, Some(algorithm))?;

        let recommendations = self.feedback.record_issued(customer_id, &scored).await?;

        tracing::info!(
            customer_id = %customer_id,
            algorithm = %algorithm,
            cart_lines = cart.len(),
            returned = recommendations.len(),
            "Recommendations issued"
        );

        Ok(RecommendationOutcome {
            algorithm,
            based_on_cart: !cart.is_empty(),
            recommendations,
        })
    }

    pub fn explain(
        &self,
        cart: &[CartLine],
        catalog: &[CatalogEntry],
        product_id: &ProductId,
    ) -> AppResult<Explanation> {
        Ok(self.recommender.explain(cart, catalog, product_id)?)
    }

    /// Stores the outcome, then lets the strategies react to it
    pub async fn record_feedback(&self, event: &FeedbackEvent) -> AppResult<()> {
        self.feedback.record_feedback(event).await?;
        self.recommender.update_weights(event);

        tracing::info!(
            recommendation_id = %event.recommendation_id,
            clicked = event.clicked,
            purchased = event.purchased,
            "Feedback recorded"
        );

        Ok(())
    }

    pub async fn algorithm_stats(&self) -> AppResult<Vec<AlgorithmStats>> {
        self.feedback.algorithm_stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::AppError,
        models::Source,
        services::feedback::MockFeedbackSink,
    };
    use serde_json::json;
    use uuid::Uuid;

    fn product(id: &str, category: &str, price: f64) -> CatalogEntry {
        CatalogEntry {
            id: ProductId::from(id),
            name: format!("Product {}", id),
            description: String::new(),
            category: category.to_string(),
            price,
            image_ref: None,
        }
    }

    fn issuing_sink() -> MockFeedbackSink {
        let mut sink = MockFeedbackSink::new();
        sink.expect_record_issued().returning(|customer_id, recs| {
            Ok(recs
                .iter()
                .cloned()
                .map(|rec| IssuedRecommendation::issue(customer_id, rec))
                .collect())
        });
        sink
    }

    fn service(sink: MockFeedbackSink) -> RecommendationService {
        RecommendationService::new(Arc::new(Recommender::new()), Arc::new(sink))
    }

    #[tokio::test]
    async fn test_recommend_issues_scored_batch() {
        let catalog = vec![
            product("1", "Electronics", 100.0),
            product("2", "Electronics", 120.0),
            product("3", "Books", 15.0),
        ];
        let cart = vec![CartLine::from_entry(&catalog[0], 1)];

        let outcome = service(issuing_sink())
            .recommend("C1", &CustomerProfile::new(), &cart, &catalog, 10, None)
            .await
            .unwrap();

        assert_eq!(outcome.algorithm, Algorithm::Hybrid);
        assert!(outcome.based_on_cart);
        assert_eq!(outcome.recommendations.len(), 2);
        assert_eq!(outcome.recommendations[0].recommendation.product_id, ProductId::from("2"));
        assert_eq!(outcome.recommendations[0].customer_id, "C1");
    }

    #[tokio::test]
    async fn test_recommend_uses_profile_algorithm() {
        let catalog = vec![product("1", "Books", 10.0), product("2", "Garden", 30.0)];
        let profile = CustomerProfile::new().with_preference("preferred_algorithm", json!("content"));

        let outcome = service(issuing_sink())
            .recommend("C2", &profile, &[], &catalog, 5, None)
            .await
            .unwrap();

        assert_eq!(outcome.algorithm, Algorithm::Content);
        assert!(!outcome.based_on_cart);
        assert!(outcome
            .recommendations
            .iter()
            .all(|r| r.recommendation.source == Source::ContentBased));
    }

    #[tokio::test]
    async fn test_invalid_limit_never_reaches_sink() {
        let mut sink = MockFeedbackSink::new();
        sink.expect_record_issued().never();

        let result = service(sink)
            .recommend("C1", &CustomerProfile::new(), &[], &[], 0, None)
            .await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_record_feedback_propagates_not_found() {
        let mut sink = MockFeedbackSink::new();
        sink.expect_record_feedback()
            .times(1)
            .returning(|event| Err(AppError::NotFound(event.recommendation_id.to_string())));

        let result = service(sink)
            .record_feedback(&FeedbackEvent {
                recommendation_id: Uuid::new_v4(),
                clicked: true,
                purchased: false,
            })
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_algorithm_stats_pass_through() {
        let mut sink = MockFeedbackSink::new();
        sink.expect_algorithm_stats()
            .returning(|| Ok(vec![AlgorithmStats::new(Algorithm::Hybrid, 4, 1, 0)]));

        let stats = service(sink).algorithm_stats().await.unwrap();
        assert_eq!(stats.len(), 1);
        assert!((stats[0].click_through_rate - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_explain_unknown_product_is_not_found() {
        let result = service(MockFeedbackSink::new()).explain(
            &[],
            &[product("1", "Books", 10.0)],
            &ProductId::from("42"),
        );
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
