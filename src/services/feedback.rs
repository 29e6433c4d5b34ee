use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Algorithm, AlgorithmStats, FeedbackEvent, IssuedRecommendation, Recommendation},
};

/// Storage for issued recommendations and the outcomes reported against them
///
/// Implementations assign every issued recommendation an id that clients echo
/// back with click/purchase feedback. Outcomes are sticky: once a recommendation
/// is marked clicked or purchased, later events do not clear the flag.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FeedbackSink: Send + Sync {
    /// Records a batch of recommendations handed to a customer
    async fn record_issued(
        &self,
        customer_id: &str,
        recommendations: &[Recommendation],
    ) -> AppResult<Vec<IssuedRecommendation>>;

    /// Applies a click/purchase outcome to a previously issued recommendation
    async fn record_feedback(&self, event: &FeedbackEvent) -> AppResult<()>;

    /// Usage and outcome counters for every known algorithm
    async fn algorithm_stats(&self) -> AppResult<Vec<AlgorithmStats>>;

    /// Sink name for logging
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone)]
struct OutcomeRecord {
    algorithm: Algorithm,
    clicked: bool,
    purchased: bool,
}

/// Issued recommendations retained by the in-memory sink before the oldest are evicted
pub const DEFAULT_MEMORY_CAPACITY: usize = 10_000;

#[derive(Debug, Default)]
struct Records {
    outcomes: HashMap<Uuid, OutcomeRecord>,
    issue_order: VecDeque<Uuid>,
}

impl Records {
    fn insert(&mut self, id: Uuid, record: OutcomeRecord, capacity: usize) {
        if self.outcomes.insert(id, record).is_none() {
            self.issue_order.push_back(id);
        }
        while self.issue_order.len() > capacity {
            if let Some(oldest) = self.issue_order.pop_front() {
                self.outcomes.remove(&oldest);
            }
        }
    }
}

/// Process-local sink used when no database is configured
///
/// Meant for development and tests. Only the most recent `capacity` issued
/// recommendations are kept; feedback for an evicted id is `NotFound` and
/// evicted records no longer count towards algorithm stats.
#[derive(Debug)]
pub struct InMemoryFeedbackSink {
    records: RwLock<Records>,
    capacity: usize,
}

impl InMemoryFeedbackSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY)
    }

    /// A capacity of zero is raised to one
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: RwLock::new(Records::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryFeedbackSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FeedbackSink for InMemoryFeedbackSink {
    async fn record_issued(
        &self,
        customer_id: &str,
        recommendations: &[Recommendation],
    ) -> AppResult<Vec<IssuedRecommendation>> {
        let issued: Vec<IssuedRecommendation> = recommendations
            .iter()
            .cloned()
            .map(|rec| IssuedRecommendation::issue(customer_id, rec))
            .collect();

        let mut records = self.records.write().await;
        for rec in &issued {
            records.insert(
                rec.recommendation_id,
                OutcomeRecord {
                    algorithm: rec.recommendation.algorithm,
                    clicked: false,
                    purchased: false,
                },
                self.capacity,
            );
        }

        Ok(issued)
    }

    async fn record_feedback(&self, event: &FeedbackEvent) -> AppResult<()> {
        let mut records = self.records.write().await;
        let record = records.outcomes.get_mut(&event.recommendation_id).ok_or_else(|| {
            AppError::NotFound(format!("recommendation {}", event.recommendation_id))
        })?;

        record.clicked |= event.clicked;
        record.purchased |= event.purchased;
        Ok(())
    }

    async fn algorithm_stats(&self) -> AppResult<Vec<AlgorithmStats>> {
        let records = self.records.read().await;
        let mut counts: HashMap<Algorithm, (u64, u64, u64)> = HashMap::new();

        for record in records.outcomes.values() {
            let entry = counts.entry(record.algorithm).or_default();
            entry.0 += 1;
            entry.1 += u64::from(record.clicked);
            entry.2 += u64::from(record.purchased);
        }

        Ok(AlgorithmStats::zero_filled(&counts))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogEntry, ProductId, Source};

    fn recommendation(id: &str, algorithm: Algorithm) -> Recommendation {
        let product = CatalogEntry {
            id: ProductId::from(id),
            name: id.to_string(),
            description: String::new(),
            category: "Books".to_string(),
            price: 12.0,
            image_ref: None,
        };
        Recommendation::new(&product, 0.5, Source::Hybrid, "why".to_string(), algorithm)
    }

    #[test]
    fn test_record_issued_assigns_unique_ids() {
        let sink = InMemoryFeedbackSink::new();
        let recs = vec![
            recommendation("1", Algorithm::Hybrid),
            recommendation("2", Algorithm::Hybrid),
        ];

        let issued = tokio_test::block_on(sink.record_issued("C1", &recs)).unwrap();
        assert_eq!(issued.len(), 2);
        assert_ne!(issued[0].recommendation_id, issued[1].recommendation_id);
        assert_eq!(issued[0].customer_id, "C1");
        assert_eq!(issued[1].recommendation, recs[1]);
    }

    #[tokio::test]
    async fn test_feedback_for_unknown_recommendation() {
        let sink = InMemoryFeedbackSink::new();
        let event = FeedbackEvent {
            recommendation_id: Uuid::new_v4(),
            clicked: true,
            purchased: false,
        };

        let result = sink.record_feedback(&event).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stats_count_usage_and_sticky_outcomes() {
        let sink = InMemoryFeedbackSink::new();
        let issued = sink
            .record_issued(
                "C1",
                &[
                    recommendation("1", Algorithm::Hybrid),
                    recommendation("2", Algorithm::Hybrid),
                    recommendation("3", Algorithm::Content),
                ],
            )
            .await
            .unwrap();

        let id = issued[0].recommendation_id;
        sink.record_feedback(&FeedbackEvent {
            recommendation_id: id,
            clicked: true,
            purchased: true,
        })
        .await
        .unwrap();
        // A later non-click does not clear the earlier outcome
        sink.record_feedback(&FeedbackEvent {
            recommendation_id: id,
            clicked: false,
            purchased: false,
        })
        .await
        .unwrap();

        let stats = sink.algorithm_stats().await.unwrap();
        let hybrid = stats.iter().find(|s| s.algorithm == Algorithm::Hybrid).unwrap();
        assert_eq!(hybrid.usage_count, 2);
        assert_eq!(hybrid.click_count, 1);
        assert_eq!(hybrid.purchase_count, 1);
        assert!((hybrid.click_through_rate - 0.5).abs() < 1e-12);

        let content = stats.iter().find(|s| s.algorithm == Algorithm::Content).unwrap();
        assert_eq!(content.usage_count, 1);
        assert_eq!(content.click_count, 0);

        let sequential = stats.iter().find(|s| s.algorithm == Algorithm::Sequential).unwrap();
        assert_eq!(sequential.usage_count, 0);
    }

    #[tokio::test]
    async fn test_oldest_records_are_evicted_past_capacity() {
        let sink = InMemoryFeedbackSink::with_capacity(2);
        let first = sink
            .record_issued("C1", &[recommendation("1", Algorithm::Content)])
            .await
            .unwrap();
        let rest = sink
            .record_issued(
                "C1",
                &[
                    recommendation("2", Algorithm::Hybrid),
                    recommendation("3", Algorithm::Hybrid),
                ],
            )
            .await
            .unwrap();

        let evicted = FeedbackEvent {
            recommendation_id: first[0].recommendation_id,
            clicked: true,
            purchased: false,
        };
        assert!(matches!(
            sink.record_feedback(&evicted).await,
            Err(AppError::NotFound(_))
        ));

        for issued in &rest {
            sink.record_feedback(&FeedbackEvent {
                recommendation_id: issued.recommendation_id,
                clicked: true,
                purchased: false,
            })
            .await
            .unwrap();
        }

        let stats = sink.algorithm_stats().await.unwrap();
        let usage = |algorithm| {
            stats
                .iter()
                .find(|s| s.algorithm == algorithm)
                .map(|s| s.usage_count)
                .unwrap()
        };
        assert_eq!(usage(Algorithm::Hybrid), 2);
        assert_eq!(usage(Algorithm::Content), 0);
    }

    #[test]
    fn test_zero_capacity_keeps_latest_record() {
        let sink = InMemoryFeedbackSink::with_capacity(0);
        assert_eq!(sink.capacity(), 1);
        assert_eq!(InMemoryFeedbackSink::new().capacity(), DEFAULT_MEMORY_CAPACITY);
    }
}
