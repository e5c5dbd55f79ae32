use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use super::{ApiError, AppState, JsonBody, MessageResponse, PathParams, ResolvedCollection, Result};
use crate::core::{Document, ObjectId, document_from_json};
use crate::storage::{Filter, FindOptions, InsertOneResult, SortDirection, Update, UpdateOptions};

pub const FEATURED_LIMIT: usize = 10;
pub const FEATURED_SORT_FIELD: &str = "price";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.connection.is_ready() {
        (StatusCode::OK, Json(HealthResponse { status: "ok" }))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse { status: "connecting" }),
        )
    }
}

pub async fn list_documents(ResolvedCollection(collection): ResolvedCollection) -> Result<Json<Vec<Document>>> {
    Ok(Json(collection.find_all().await?))
}

/// `GET /collections/:collection/:max/:sort_field/:direction`
pub async fn list_sorted(
    ResolvedCollection(collection): ResolvedCollection,
    PathParams((_, max, sort_field, direction)): PathParams<(String, String, String, String)>,
) -> Result<Json<Vec<Document>>> {
    let limit = parse_max(&max)?;
    let options = FindOptions::new()
        .sort(sort_field, SortDirection::from_token(&direction))
        .limit(limit);
    Ok(Json(collection.find(&Filter::new(), &options).await?))
}

/// Top documents by price, highest first.
pub async fn list_featured(ResolvedCollection(collection): ResolvedCollection) -> Result<Json<Vec<Document>>> {
    let options = FindOptions::new()
        .sort(FEATURED_SORT_FIELD, SortDirection::Descending)
        .limit(FEATURED_LIMIT);
    Ok(Json(collection.find(&Filter::new(), &options).await?))
}

pub async fn get_document(
    ResolvedCollection(collection): ResolvedCollection,
    PathParams((_, id)): PathParams<(String, String)>,
) -> Result<Json<Document>> {
    let id = ObjectId::parse(&id)?;
    let document = collection
        .find_one(&Filter::by_id(id))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("document {id} not found")))?;
    Ok(Json(document))
}

pub async fn create_document(
    ResolvedCollection(collection): ResolvedCollection,
    JsonBody(body): JsonBody<JsonValue>,
) -> Result<(StatusCode, Json<InsertOneResult>)> {
    let document = document_from_json(body)?;
    let result = collection.insert_one(document).await?;
    info!(collection = %collection.name(), id = %result.inserted_id, "document created");
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn update_document(
    ResolvedCollection(collection): ResolvedCollection,
    PathParams((_, id)): PathParams<(String, String)>,
    JsonBody(body): JsonBody<JsonValue>,
) -> Result<Json<MessageResponse>> {
    let id = ObjectId::parse(&id)?;
    let update = Update::set_all(document_from_json(body)?);
    if update.is_empty() {
        return Err(ApiError::malformed("update body has no fields"));
    }

    let result = collection
        .update_one(&Filter::by_id(id), &update, UpdateOptions::default())
        .await?;
    if result.matched_count == 0 {
        return Err(ApiError::not_found(format!("document {id} not found")));
    }

    debug!(collection = %collection.name(), id = %id, modified = result.modified_count, "document updated");
    Ok(Json(MessageResponse::success()))
}

pub async fn delete_document(
    ResolvedCollection(collection): ResolvedCollection,
    PathParams((_, id)): PathParams<(String, String)>,
) -> Result<Json<MessageResponse>> {
    let id = ObjectId::parse(&id)?;
    let result = collection.delete_one(&Filter::by_id(id)).await?;
    if result.deleted_count == 0 {
        return Err(ApiError::not_found(format!("document {id} not found")));
    }

    info!(collection = %collection.name(), id = %id, "document deleted");
    Ok(Json(MessageResponse::success()))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("route not found")
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn parse_max(raw: &str) -> Result<usize> {
    match raw.parse::<i64>() {
        Ok(max) if max > 0 => usize::try_from(max).map_err(|_| invalid_max(raw)),
        _ => Err(invalid_max(raw)),
    }
}

fn invalid_max(raw: &str) -> ApiError {
    ApiError::malformed(format!("max must be a positive integer, got '{raw}'"))
}
