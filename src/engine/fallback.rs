//! Popularity/diversity scoring for customers with an empty cart.

use std::collections::HashMap;

use super::explanation::popular_in_category;
use crate::models::{Algorithm, CatalogEntry, Recommendation, Source};

const DIVERSITY_WEIGHT: f64 = 0.6;
const POSITION_WEIGHT: f64 = 0.4;

/// `1 - index / total`: categories seen earlier in the catalog score higher
pub fn diversity_confidence(category_index: usize, unique_categories: usize) -> f64 {
    if unique_categories == 0 {
        return 0.0;
    }
    1.0 - category_index as f64 / unique_categories as f64
}

/// `1 - index / total`: products earlier in the catalog score higher
pub fn position_confidence(candidate_index: usize, total_candidates: usize) -> f64 {
    if total_candidates == 0 {
        return 0.0;
    }
    1.0 - candidate_index as f64 / total_candidates as f64
}

/// Scores candidates by first-seen category order and catalog position.
///
/// Output is in candidate order; callers rank it.
pub fn score_by_popularity(candidates: &[&CatalogEntry], algorithm: Algorithm) -> Vec<Recommendation> {
    let category_index = first_seen_categories(candidates);
    let unique_categories = category_index.len();

    candidates
        .iter()
        .enumerate()
        .map(|(idx, product)| {
            let category_position = category_index
                .get(product.category.as_str())
                .copied()
                .unwrap_or(unique_categories);
            let diversity = diversity_confidence(category_position, unique_categories);
            let position = position_confidence(idx, candidates.len());
            let score = DIVERSITY_WEIGHT * diversity + POSITION_WEIGHT * position;

            Recommendation::new(
                product,
                score,
                Source::Hybrid,
                popular_in_category(&product.category),
                algorithm,
            )
        })
        .collect()
}

fn first_seen_categories<'a>(candidates: &[&'a CatalogEntry]) -> HashMap<&'a str, usize> {
    let mut index = HashMap::new();
    for product in candidates.iter().copied() {
        let next = index.len();
        index.entry(product.category.as_str()).or_insert(next);
    }
    index
}
