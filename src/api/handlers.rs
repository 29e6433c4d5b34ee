use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        Algorithm, AlgorithmStats, CartLine, CatalogEntry, CustomerProfile, Explanation,
        FeedbackEvent, IssuedRecommendation, ProductId,
    },
    services::catalog::{self, ProductPage, ProductQuery, DEFAULT_SIMILAR_LIMIT},
};

use super::extract::{ApiJson, ApiQuery};
use super::state::CartItem;
use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub items: Vec<CartItem>,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub customer_id: String,
    pub items: Vec<CartLine>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub customer_id: String,
    pub limit: Option<i64>,
    pub algorithm: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SimilarProductsResponse {
    pub product_id: ProductId,
    pub similar_products: Vec<CatalogEntry>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub status: &'static str,
    pub algorithm: Algorithm,
    pub based_on_cart: bool,
    pub recommendations: Vec<IssuedRecommendation>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Catalog search with text/category filters, price sorting and pagination
pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ProductQuery>,
) -> AppResult<Json<ProductPage>> {
    let inner = state.inner.read().await;
    Ok(Json(catalog::search(&inner.catalog, &params)?))
}

pub async fn list_categories(State(state): State<AppState>) -> Json<CategoriesResponse> {
    let inner = state.inner.read().await;
    Json(CategoriesResponse {
        categories: catalog::categories(&inner.catalog),
    })
}

pub async fn similar_products(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    ApiQuery(params): ApiQuery<SimilarQuery>,
) -> AppResult<Json<SimilarProductsResponse>> {
    let product_id = ProductId::from(product_id);
    let limit = params.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);

    let inner = state.inner.read().await;
    let similar_products = catalog::similar(&inner.catalog, &product_id, limit)?;

    Ok(Json(SimilarProductsResponse {
        product_id,
        similar_products,
    }))
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(product): ApiJson<CatalogEntry>,
) -> AppResult<(StatusCode, Json<CatalogEntry>)> {
    let product = state.add_product(product).await?;

    tracing::info!(
        request_id = %request_id,
        product_id = %product.id,
        category = %product.category,
        "Product added to catalog"
    );

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
    ApiJson(profile): ApiJson<CustomerProfile>,
) -> Json<CustomerProfile> {
    state.set_profile(&customer_id, profile.clone()).await;
    Json(profile)
}

pub async fn get_cart(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Json<CartResponse> {
    let items = state.inner.read().await.cart_lines(&customer_id);
    Json(CartResponse { customer_id, items })
}

pub async fn update_cart(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
    ApiJson(request): ApiJson<UpdateCartRequest>,
) -> AppResult<Json<CartResponse>> {
    let items = state.set_cart(&customer_id, request.items).await?;
    Ok(Json(CartResponse { customer_id, items }))
}

/// Scores the catalog against the customer's current cart
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(request): ApiJson<RecommendationRequest>,
) -> AppResult<Json<RecommendationResponse>> {
    let limit = state.config.effective_limit(request.limit).map_err(|limit| {
        AppError::InvalidInput(format!("limit must be at least 1, got {}", limit))
    })?;

    let algorithm = request
        .algorithm
        .as_deref()
        .map(str::parse::<Algorithm>)
        .transpose()
        .map_err(AppError::InvalidInput)?;

    tracing::info!(
        request_id = %request_id,
        customer_id = %request.customer_id,
        limit,
        requested_algorithm = ?algorithm,
        "Processing recommendation request"
    );

    let snapshot = state.snapshot(&request.customer_id).await;
    let outcome = state
        .recommendations
        .recommend(
            &request.customer_id,
            &snapshot.profile,
            &snapshot.cart,
            &snapshot.catalog,
            limit,
            algorithm,
        )
        .await?;

    Ok(Json(RecommendationResponse {
        status: "success",
        algorithm: outcome.algorithm,
        based_on_cart: outcome.based_on_cart,
        recommendations: outcome.recommendations,
    }))
}

pub async fn explain(
    State(state): State<AppState>,
    Path((customer_id, product_id)): Path<(String, String)>,
) -> AppResult<Json<Explanation>> {
    let snapshot = state.snapshot(&customer_id).await;
    let explanation = state.recommendations.explain(
        &snapshot.cart,
        &snapshot.catalog,
        &ProductId::from(product_id),
    )?;

    Ok(Json(explanation))
}

pub async fn record_feedback(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    ApiJson(event): ApiJson<FeedbackEvent>,
) -> AppResult<Json<Value>> {
    tracing::info!(
        request_id = %request_id,
        recommendation_id = %event.recommendation_id,
        "Processing feedback"
    );

    state.recommendations.record_feedback(&event).await?;
    Ok(Json(json!({ "status": "success" })))
}

pub async fn algorithm_stats(State(state): State<AppState>) -> AppResult<Json<Vec<AlgorithmStats>>> {
    Ok(Json(state.recommendations.algorithm_stats().await?))
}
