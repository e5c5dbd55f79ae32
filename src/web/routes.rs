use std::any::Any;

use axum::Router;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use super::cart::{add_to_cart, remove_from_cart};
use super::handlers::{
    create_document, delete_document, get_document, health, list_documents, list_featured, list_sorted,
    method_not_allowed, not_found, update_document,
};
use super::{ApiError, AppState};

/// Every route shares the `:collection/:id` parameter names at the same
/// positions; the router rejects differing names for one segment.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/collections/:collection", get(list_documents).post(create_document))
        .route(
            "/collections/:collection/:id",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/collections/:collection/:id/add-to-cart", put(add_to_cart))
        .route("/collections/:collection/:id/remove-from-cart", put(remove_from_cart))
        .route("/collections/:collection/:id/:sort_field/:direction", get(list_sorted))
        .route("/collections1/:collection", get(list_featured))
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!(panic = detail, "request handler panicked");
    ApiError::Internal.into_response()
}
