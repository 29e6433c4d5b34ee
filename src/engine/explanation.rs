//! Human-readable explanations built from factor confidences.
//!
//! The phrases and thresholds below are part of the public output; clients match
//! on them, so they must not drift.

use super::scorers::FactorScores;

/// Returned when no factor is strong enough to mention
pub const POPULARITY_FALLBACK: &str = "Recommended based on general popularity";

const SIMILAR_PRICE_THRESHOLD: f64 = 0.7;
const ACCEPTABLE_PRICE_THRESHOLD: f64 = 0.4;
const SIMILAR_FEATURES_THRESHOLD: f64 = 0.3;

/// Builds the sentence for a cart-based hybrid score.
///
/// Clauses are emitted in a fixed order (category, price, description) and joined
/// with `", "` after a `"This product "` prefix.
pub fn explain_confidence(factors: &FactorScores, category: &str, avg_cart_price: f64) -> String {
    let mut clauses = Vec::new();

    if factors.category > 0.0 {
        clauses.push(format!("matches your preferred category ({})", category));
    }

    if factors.price > SIMILAR_PRICE_THRESHOLD {
        clauses.push(format!("is in a similar price range (${:.2})", avg_cart_price));
    } else if factors.price > ACCEPTABLE_PRICE_THRESHOLD {
        clauses.push("is within an acceptable price range".to_string());
    }

    if factors.description > SIMILAR_FEATURES_THRESHOLD {
        clauses.push("has similar features to items in your cart".to_string());
    }

    if clauses.is_empty() {
        return POPULARITY_FALLBACK.to_string();
    }

    format!("This product {}", clauses.join(", "))
}

/// Explanation used when the cart is empty
pub fn popular_in_category(category: &str) -> String {
    format!("Popular product in the {} category", category)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors(category: f64, price: f64, description: f64) -> FactorScores {
        FactorScores {
            category,
            price,
            description,
        }
    }

    #[test]
    fn test_all_clauses() {
        let text = explain_confidence(&factors(1.0, 0.9, 0.5), "Electronics", 100.0);
        assert_eq!(
            text,
            "This product matches your preferred category (Electronics), \
             is in a similar price range ($100.00), \
             has similar features to items in your cart"
        );
    }

    #[test]
    fn test_price_range_is_formatted_with_two_decimals() {
        let text = explain_confidence(&factors(0.0, 0.75, 0.0), "Books", 33.3333);
        assert_eq!(text, "This product is in a similar price range ($33.33)");
    }

    #[test]
    fn test_acceptable_price_band() {
        let text = explain_confidence(&factors(0.0, 0.5, 0.0), "Books", 10.0);
        assert_eq!(text, "This product is within an acceptable price range");
    }

    #[test]
    fn test_thresholds_are_strict() {
        assert_eq!(
            explain_confidence(&factors(0.0, 0.7, 0.0), "Books", 10.0),
            "This product is within an acceptable price range"
        );
        assert_eq!(
            explain_confidence(&factors(0.0, 0.4, 0.3), "Books", 10.0),
            POPULARITY_FALLBACK
        );
    }

    #[test]
    fn test_fallback_when_nothing_matches() {
        let text = explain_confidence(&factors(0.0, 0.2, 0.1), "Fashion", 100.0);
        assert_eq!(text, "Recommended based on general popularity");
    }

    #[test]
    fn test_category_and_description_only() {
        let text = explain_confidence(&factors(1.0, 0.1, 0.31), "Toys", 5.0);
        assert_eq!(
            text,
            "This product matches your preferred category (Toys), has similar features to items in your cart"
        );
    }

    #[test]
    fn test_popular_in_category() {
        assert_eq!(popular_in_category("Books"), "Popular product in the Books category");
    }
}
