//! Per-factor confidence scorers used by the hybrid strategy.
//!
//! Every scorer returns a value in `[0, 1]`. The hybrid score is a weighted sum of
//! these values, so a scorer that leaves that range breaks the bound on the
//! combined score.

use std::collections::HashSet;

use super::signals::{tokenize, CartSignals};
use crate::models::CatalogEntry;

/// The three confidence factors computed for one candidate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FactorScores {
    pub category: f64,
    pub price: f64,
    pub description: f64,
}

impl FactorScores {
    pub fn for_candidate(candidate: &CatalogEntry, signals: &CartSignals) -> Self {
        Self {
            category: category_confidence(&candidate.category, &signals.categories),
            price: price_confidence(candidate.price, signals.avg_price),
            description: description_confidence(
                &tokenize(&candidate.description),
                &signals.description_tokens,
            ),
        }
    }
}

/// `1.0` when the candidate's category is one of the cart's categories
pub fn category_confidence(candidate_category: &str, cart_categories: &HashSet<String>) -> f64 {
    if cart_categories.contains(candidate_category) {
        1.0
    } else {
        0.0
    }
}

/// `1 / (1 + |price - avg| / avg)`, or `0.0` when the cart average is not positive
pub fn price_confidence(candidate_price: f64, avg_price: f64) -> f64 {
    if !avg_price.is_finite() || avg_price <= 0.0 {
        return 0.0;
    }

    let relative_gap = (candidate_price - avg_price).abs() / avg_price;
    1.0 / (1.0 + relative_gap)
}

/// Best single-line token overlap between the candidate and the cart
pub fn description_confidence(
    candidate_tokens: &HashSet<String>,
    cart_tokens: &[HashSet<String>],
) -> f64 {
    cart_tokens
        .iter()
        .map(|line_tokens| token_overlap(candidate_tokens, line_tokens))
        .fold(0.0, f64::max)
}

fn token_overlap(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let denominator = a.len().max(b.len());
    if denominator == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / denominator as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> HashSet<String> {
        tokenize(text)
    }

    #[test]
    fn test_category_confidence_is_binary() {
        let cart: HashSet<String> = ["Electronics".to_string()].into_iter().collect();
        assert_eq!(category_confidence("Electronics", &cart), 1.0);
        assert_eq!(category_confidence("Fashion", &cart), 0.0);
        assert_eq!(category_confidence("electronics", &cart), 0.0);
    }

    #[test]
    fn test_price_confidence_peaks_at_average() {
        assert_eq!(price_confidence(200.0, 200.0), 1.0);
    }

    #[test]
    fn test_price_confidence_decreases_with_distance() {
        let near = price_confidence(210.0, 200.0);
        let far = price_confidence(300.0, 200.0);
        let farther = price_confidence(1_000.0, 200.0);
        assert!(near > far);
        assert!(far > farther);
        assert!(farther > 0.0);
    }

    #[test]
    fn test_price_confidence_is_symmetric_around_average() {
        assert_eq!(price_confidence(150.0, 200.0), price_confidence(250.0, 200.0));
    }

    #[test]
    fn test_price_confidence_with_zero_average() {
        assert_eq!(price_confidence(10.0, 0.0), 0.0);
        assert_eq!(price_confidence(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_description_confidence_no_shared_tokens() {
        let cart = vec![tokens("red shoes"), tokens("blue hat")];
        assert_eq!(description_confidence(&tokens("fast laptop"), &cart), 0.0);
    }

    #[test]
    fn test_description_confidence_identical_sets() {
        let cart = vec![tokens("fast laptop")];
        assert_eq!(description_confidence(&tokens("Laptop FAST"), &cart), 1.0);
    }

    #[test]
    fn test_description_confidence_takes_best_line() {
        let cart = vec![tokens("red shoes"), tokens("fast laptop"), tokens("laptop bag")];
        let score = description_confidence(&tokens("fast laptop charger"), &cart);
        assert!((score - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_description_confidence_empty_inputs() {
        assert_eq!(description_confidence(&tokens(""), &[tokens("")]), 0.0);
        assert_eq!(description_confidence(&tokens("laptop"), &[]), 0.0);
        assert_eq!(description_confidence(&tokens(""), &[tokens("laptop")]), 0.0);
    }
}
