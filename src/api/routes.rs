use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/products/:product_id/similar", get(handlers::similar_products))
        .route("/categories", get(handlers::list_categories))
        // Customers
        .route("/customers/:customer_id/profile", put(handlers::update_profile))
        .route(
            "/customers/:customer_id/cart",
            get(handlers::get_cart).put(handlers::update_cart),
        )
        // Recommendations
        .route("/recommendations", post(handlers::recommend))
        .route(
            "/recommendations/:customer_id/explain/:product_id",
            get(handlers::explain),
        )
        .route("/feedback", post(handlers::record_feedback))
        // Admin
        .route("/admin/algorithm-stats", get(handlers::algorithm_stats))
}
