use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    config::Config,
    engine::Recommender,
    error::{AppError, AppResult},
    models::{CartLine, CatalogEntry, CustomerProfile, ProductId},
    services::{FeedbackSink, InMemoryFeedbackSink, RecommendationService},
};

/// A cart line as submitted by the client, before catalog resolution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<RwLock<StoreInner>>,
    pub recommendations: RecommendationService,
    pub config: Arc<Config>,
}

/// Catalog, carts and profiles owned by the collaborating services
#[derive(Debug, Default)]
pub struct StoreInner {
    pub catalog: Vec<CatalogEntry>,
    pub carts: HashMap<String, Vec<CartItem>>,
    pub profiles: HashMap<String, CustomerProfile>,
}

/// Read-only copies handed to the scoring engine
#[derive(Debug, Clone)]
pub struct CustomerSnapshot {
    pub profile: CustomerProfile,
    pub cart: Vec<CartLine>,
    pub catalog: Vec<CatalogEntry>,
}

impl StoreInner {
    fn product(&self, id: &ProductId) -> Option<&CatalogEntry> {
        self.catalog.iter().find(|entry| &entry.id == id)
    }

    /// Unknown customers have an empty cart
    pub fn cart_lines(&self, customer_id: &str) -> Vec<CartLine> {
        self.carts
            .get(customer_id)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        self.product(&item.product_id)
                            .map(|entry| CartLine::from_entry(entry, item.quantity))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl AppState {
    pub fn new(config: Config, feedback: Arc<dyn FeedbackSink>) -> Self {
        let recommender = Arc::new(Recommender::new());
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
            recommendations: RecommendationService::new(recommender, feedback),
            config: Arc::new(config),
        }
    }

    /// Default configuration with feedback kept in process memory
    pub fn in_memory() -> Self {
        Self::new(Config::default(), Arc::new(InMemoryFeedbackSink::new()))
    }

    /// Copies everything needed to score for one customer
    pub async fn snapshot(&self, customer_id: &str) -> CustomerSnapshot {
        let inner = self.inner.read().await;
        CustomerSnapshot {
            profile: inner.profiles.get(customer_id).cloned().unwrap_or_default(),
            cart: inner.cart_lines(customer_id),
            catalog: inner.catalog.clone(),
        }
    }

    pub async fn add_product(&self, product: CatalogEntry) -> AppResult<CatalogEntry> {
        if !product.price.is_finite() || product.price < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "product {} has invalid price {}",
                product.id, product.price
            )));
        }

        let mut inner = self.inner.write().await;
        if inner.product(&product.id).is_some() {
            return Err(AppError::InvalidInput(format!(
                "product {} already exists",
                product.id
            )));
        }

        inner.catalog.push(product.clone());
        Ok(product)
    }

    pub async fn set_profile(&self, customer_id: &str, profile: CustomerProfile) {
        let mut inner = self.inner.write().await;
        inner.profiles.insert(customer_id.to_string(), profile);
    }

    /// Replaces a customer's cart; every line must reference a catalog product
    pub async fn set_cart(&self, customer_id: &str, items: Vec<CartItem>) -> AppResult<Vec<CartLine>> {
        let mut inner = self.inner.write().await;

        for item in &items {
            if inner.product(&item.product_id).is_none() {
                return Err(AppError::NotFound(format!("product {}", item.product_id)));
            }
            if item.quantity < 1 {
                return Err(AppError::InvalidInput(format!(
                    "quantity for product {} must be at least 1",
                    item.product_id
                )));
            }
        }

        inner.carts.insert(customer_id.to_string(), items);
        Ok(inner.cart_lines(customer_id))
    }
}
