use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt::Display, str::FromStr};

pub mod recommendation;

pub use recommendation::{
    AlgorithmStats, Explanation, FeedbackEvent, IssuedRecommendation, Recommendation,
};

/// Identifier for a catalog product (e.g., "P1000")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A product as handed over by the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub image_ref: Option<String>,
}

/// One line of a customer's cart at the time of the scoring call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub category: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub description: String,
}

impl CartLine {
    /// Builds a cart line from the catalog entry it refers to
    pub fn from_entry(entry: &CatalogEntry, quantity: u32) -> Self {
        Self {
            product_id: entry.id.clone(),
            category: entry.category.clone(),
            price: entry.price,
            quantity,
            description: entry.description.clone(),
        }
    }
}

/// Opaque bag of customer preferences.
///
/// Only `preferred_algorithm` is read by the service; a missing or malformed
/// value is treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CustomerProfile {
    pub preferences: Map<String, Value>,
}

impl CustomerProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preference(mut self, key: impl Into<String>, value: Value) -> Self {
        self.preferences.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.preferences.get(key)
    }

    pub fn preferred_algorithm(&self) -> Option<Algorithm> {
        self.get("preferred_algorithm")
            .and_then(Value::as_str)
            .and_then(|tag| tag.parse().ok())
    }
}

/// Strategy tag selected by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Hybrid,
    Collaborative,
    Content,
    Sequential,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::Hybrid,
        Algorithm::Collaborative,
        Algorithm::Content,
        Algorithm::Sequential,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Hybrid => "hybrid",
            Algorithm::Collaborative => "collaborative",
            Algorithm::Content => "content",
            Algorithm::Sequential => "sequential",
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hybrid" => Ok(Algorithm::Hybrid),
            "collaborative" => Ok(Algorithm::Collaborative),
            "content" => Ok(Algorithm::Content),
            "sequential" => Ok(Algorithm::Sequential),
            other => Err(format!("unknown algorithm: {}", other)),
        }
    }
}

/// Which scoring path produced a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Hybrid,
    PopularProduct,
    CollaborativeFiltering,
    ContentBased,
    Sequential,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Hybrid => "hybrid",
            Source::PopularProduct => "popular_product",
            Source::CollaborativeFiltering => "collaborative_filtering",
            Source::ContentBased => "content_based",
            Source::Sequential => "sequential",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_id_display() {
        let id = ProductId::from("P1000");
        assert_eq!(format!("{}", id), "P1000");
    }

    #[test]
    fn test_product_id_serializes_as_plain_string() {
        let id = ProductId::from("P1000");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""P1000""#);
    }

    #[test]
    fn test_algorithm_parsing() {
        assert_eq!("hybrid".parse::<Algorithm>(), Ok(Algorithm::Hybrid));
        assert_eq!(" Content ".parse::<Algorithm>(), Ok(Algorithm::Content));
        assert!("embedding".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_algorithm_serialization() {
        let json = serde_json::to_string(&Algorithm::Sequential).unwrap();
        assert_eq!(json, "\"sequential\"");
    }

    #[test]
    fn test_empty_profile_has_no_algorithm() {
        let profile = CustomerProfile::new();
        assert_eq!(profile.preferred_algorithm(), None);
    }

    #[test]
    fn test_profile_reads_preferred_algorithm() {
        let profile = CustomerProfile::new()
            .with_preference("favorite_categories", json!(["Books", "Toys"]))
            .with_preference("preferred_algorithm", json!("collaborative"));

        assert_eq!(profile.preferred_algorithm(), Some(Algorithm::Collaborative));
    }

    #[test]
    fn test_profile_tolerates_malformed_keys() {
        let profile = CustomerProfile::new()
            .with_preference("preferred_algorithm", json!("deep-learning"));
        assert_eq!(profile.preferred_algorithm(), None);

        let profile = CustomerProfile::new().with_preference("preferred_algorithm", json!(3));
        assert_eq!(profile.preferred_algorithm(), None);
    }

    #[test]
    fn test_cart_line_from_entry() {
        let entry = CatalogEntry {
            id: ProductId::from("P1"),
            name: "Laptop".to_string(),
            description: "fast laptop".to_string(),
            category: "Electronics".to_string(),
            price: 999.0,
            image_ref: None,
        };

        let line = CartLine::from_entry(&entry, 2);
        assert_eq!(line.product_id, entry.id);
        assert_eq!(line.quantity, 2);
        assert_eq!(line.category, "Electronics");
        assert_eq!(line.description, "fast laptop");
    }
}
