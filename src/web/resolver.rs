//! Collection resolver.
//!
//! [`ResolvedCollection`] turns the `:collection` path segment into a handle
//! on the shared connection. Handlers receive it as an argument, so the
//! resolved collection travels with the request and nowhere else.

use std::collections::HashMap;

use axum::async_trait;
use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use tracing::debug;

use super::{ApiError, AppState};
use crate::storage::CollectionHandle;

pub const COLLECTION_PARAM: &str = "collection";

#[derive(Debug, Clone)]
pub struct ResolvedCollection(pub CollectionHandle);

#[async_trait]
impl FromRequestParts<AppState> for ResolvedCollection {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state).await?;
        let name = params
            .get(COLLECTION_PARAM)
            .ok_or_else(|| ApiError::malformed("missing collection name"))?;

        let handle = state.connection.collection(name)?;
        debug!(collection = %name, "collection resolved");
        Ok(Self(handle))
    }
}
