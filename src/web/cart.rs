//! `add-to-cart` / `remove-from-cart` endpoints.
//!
//! Routed under the generic `/collections/:collection/:id/...` shape; only the
//! `courses` collection accepts them.

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use serde_json::Number;

use super::{ApiError, AppState, PathParams, Result};
use crate::core::ObjectId;
use crate::reservation::COURSES_COLLECTION;
use crate::storage::UpdateResult;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartResponse {
    pub message: String,
    pub cart_result: UpdateResult,
    pub remaining_space: Number,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartResponse {
    pub message: String,
    pub cart_result: UpdateResult,
    pub cart_entry_removed: bool,
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    PathParams((collection, id)): PathParams<(String, String)>,
) -> Result<Json<AddToCartResponse>> {
    let course_id = course_id(&collection, &id)?;
    let reservation = state.reservations()?.reserve(course_id).await?;

    Ok(Json(AddToCartResponse {
        message: "Course added to cart".to_string(),
        cart_result: reservation.cart_result,
        remaining_space: reservation.remaining_space,
    }))
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    PathParams((collection, id)): PathParams<(String, String)>,
) -> Result<Json<RemoveFromCartResponse>> {
    let course_id = course_id(&collection, &id)?;
    let release = state.reservations()?.release(course_id).await?;

    Ok(Json(RemoveFromCartResponse {
        message: "Course removed from cart".to_string(),
        cart_result: release.cart_result,
        cart_entry_removed: release.cart_entry_removed,
    }))
}

fn course_id(collection: &str, raw_id: &str) -> Result<ObjectId> {
    if collection != COURSES_COLLECTION {
        return Err(ApiError::not_found(format!(
            "collection '{collection}' has no cart operations"
        )));
    }
    Ok(ObjectId::parse(raw_id)?)
}
