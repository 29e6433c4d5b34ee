use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{CatalogEntry, ProductId},
};

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const DEFAULT_SIMILAR_LIMIT: u32 = 5;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Catalog order
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
}

/// Catalog search parameters; every field is optional on the wire
#[derive(Debug, Clone, Deserialize)]
pub struct ProductQuery {
    /// Case-insensitive substring of name, description or category
    #[serde(default)]
    pub query: Option<String>,
    /// Exact category match
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort_by: SortOrder,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            query: None,
            category: None,
            sort_by: SortOrder::default(),
            page: default_page(),
            limit: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductPage {
    pub products: Vec<CatalogEntry>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
    pub total_pages: usize,
}

fn check_page_size(limit: u32) -> AppResult<()> {
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, limit
        )));
    }
    Ok(())
}

fn matches_text(product: &CatalogEntry, needle: &str) -> bool {
    [&product.name, &product.description, &product.category]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Filters, sorts and paginates the catalog
pub fn search(catalog: &[CatalogEntry], params: &ProductQuery) -> AppResult<ProductPage> {
    if params.page < 1 {
        return Err(AppError::InvalidInput("page must be at least 1".to_string()));
    }
    check_page_size(params.limit)?;

    let needle = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);
    let category = params.category.as_deref().filter(|c| !c.is_empty());

    let mut matched: Vec<&CatalogEntry> = catalog
        .iter()
        .filter(|product| needle.as_deref().map_or(true, |n| matches_text(product, n)))
        .filter(|product| category.map_or(true, |c| product.category == c))
        .collect();

    match params.sort_by {
        SortOrder::Relevance => {}
        SortOrder::PriceAsc => matched.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOrder::PriceDesc => matched.sort_by(|a, b| b.price.total_cmp(&a.price)),
    }

    let total = matched.len();
    let page_size = params.limit as usize;
    let offset = (params.page as usize - 1).saturating_mul(page_size);

    Ok(ProductPage {
        products: matched
            .into_iter()
            .skip(offset)
            .take(page_size)
            .cloned()
            .collect(),
        total,
        page: params.page,
        limit: params.limit,
        total_pages: total.div_ceil(page_size),
    })
}

/// Distinct categories, sorted
pub fn categories(catalog: &[CatalogEntry]) -> Vec<String> {
    catalog
        .iter()
        .map(|product| product.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Other products of the same category, in catalog order
pub fn similar(catalog: &[CatalogEntry], product_id: &ProductId, limit: u32) -> AppResult<Vec<CatalogEntry>> {
    check_page_size(limit)?;

    let source = catalog
        .iter()
        .find(|product| &product.id == product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", product_id)))?;

    Ok(catalog
        .iter()
        .filter(|product| product.category == source.category && product.id != source.id)
        .take(limit as usize)
        .cloned()
        .collect())
}
