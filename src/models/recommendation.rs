use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::{Algorithm, CatalogEntry, ProductId, Source};

/// A single scored candidate returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub product_id: ProductId,
    pub product: CatalogEntry,
    pub score: f64,
    /// Same value as `score`; kept as its own field for API compatibility
    pub confidence_score: f64,
    pub source: Source,
    pub explanation: String,
    pub algorithm: Algorithm,
}

impl Recommendation {
    pub fn new(
        product: &CatalogEntry,
        score: f64,
        source: Source,
        explanation: String,
        algorithm: Algorithm,
    ) -> Self {
        Self {
            product_id: product.id.clone(),
            product: product.clone(),
            score,
            confidence_score: score,
            source,
            explanation,
            algorithm,
        }
    }
}

/// Answer to "why was this recommended"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Explanation {
    pub explanation: String,
    pub confidence: f64,
}

/// Click/purchase outcome reported against an issued recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackEvent {
    pub recommendation_id: Uuid,
    pub clicked: bool,
    #[serde(default)]
    pub purchased: bool,
}

/// A recommendation after it has been handed out and given an id for feedback
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IssuedRecommendation {
    pub recommendation_id: Uuid,
    pub customer_id: String,
    pub issued_at: DateTime<Utc>,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}

impl IssuedRecommendation {
    pub fn issue(customer_id: &str, recommendation: Recommendation) -> Self {
        Self {
            recommendation_id: Uuid::new_v4(),
            customer_id: customer_id.to_string(),
            issued_at: Utc::now(),
            recommendation,
        }
    }
}

/// Usage and outcome counters for one algorithm
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlgorithmStats {
    pub algorithm: Algorithm,
    pub usage_count: u64,
    pub click_count: u64,
    pub purchase_count: u64,
    pub click_through_rate: f64,
}

impl AlgorithmStats {
    pub fn new(algorithm: Algorithm, usage_count: u64, click_count: u64, purchase_count: u64) -> Self {
        let click_through_rate = if usage_count == 0 {
            0.0
        } else {
            click_count as f64 / usage_count as f64
        };

        Self {
            algorithm,
            usage_count,
            click_count,
            purchase_count,
            click_through_rate,
        }
    }

    /// Builds one entry per known algorithm, in `Algorithm::ALL` order.
    ///
    /// `counts` maps an algorithm to `(usage, clicks, purchases)`; algorithms
    /// without an entry are reported with zero counters.
    pub fn zero_filled(counts: &HashMap<Algorithm, (u64, u64, u64)>) -> Vec<Self> {
        Algorithm::ALL
            .iter()
            .map(|algorithm| {
                let (usage, clicks, purchases) = counts.get(algorithm).copied().unwrap_or_default();
                Self::new(*algorithm, usage, clicks, purchases)
            })
            .collect()
    }
}
