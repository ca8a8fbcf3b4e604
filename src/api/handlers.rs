use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::{Manifest, MediaType};

use super::AppState;

pub const MANIFEST_CACHE_CONTROL: &str = "max-age=604800, public";
pub const CATALOG_CACHE_CONTROL: &str = "max-age=86400, public";

// Request types

/// Raw path segments of a catalog request
///
/// The `.json` suffix sits on whichever segment comes last: `id` when there
/// is no filter, `extra` otherwise.
#[derive(Debug, Deserialize)]
pub struct CatalogPath {
    pub username: String,
    pub media_type: String,
    pub id: String,
    #[serde(default)]
    pub extra: Option<String>,
}

/// A validated catalog request
#[derive(Debug, PartialEq)]
pub struct CatalogRequest {
    pub username: String,
    pub media_type: MediaType,
    pub catalog_id: String,
    pub extra: Option<String>,
}

impl TryFrom<CatalogPath> for CatalogRequest {
    type Error = AppError;

    fn try_from(path: CatalogPath) -> AppResult<Self> {
        if path.username.trim().is_empty() {
            return Err(AppError::Validation("Missing username".to_string()));
        }

        let media_type: MediaType = path.media_type.parse()?;

        let (catalog_id, extra) = match path.extra {
            Some(extra) => (path.id, Some(strip_json_suffix(&extra)?.to_string())),
            None => (strip_json_suffix(&path.id)?.to_string(), None),
        };

        Ok(Self {
            username: path.username,
            media_type,
            catalog_id,
            extra,
        })
    }
}

fn strip_json_suffix(segment: &str) -> AppResult<&str> {
    segment
        .strip_suffix(".json")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(format!("Expected a .json resource, got {}", segment)))
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Serves the add-on manifest for a user, personalized when possible
///
/// An undecodable username gets the default manifest rather than an error.
pub async fn get_manifest(
    State(state): State<AppState>,
    username: Result<Path<String>, PathRejection>,
) -> impl IntoResponse {
    let manifest: Manifest = match username {
        Ok(Path(username)) => state.manifests.get_manifest(&username).await,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Serving default manifest");
            state.manifests.default_manifest().clone()
        }
    };
    ([(CACHE_CONTROL, MANIFEST_CACHE_CONTROL)], Json(manifest))
}

/// Proxies a watchlist catalog from the list-rendering service
pub async fn get_catalog(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    path: Result<Path<CatalogPath>, PathRejection>,
) -> AppResult<Response> {
    let Path(path) = path?;
    let request = CatalogRequest::try_from(path)?;

    tracing::info!(
        request_id = %request_id,
        username = %request.username,
        media_type = %request.media_type,
        catalog_id = %request.catalog_id,
        extra = ?request.extra,
        "Processing catalog request"
    );

    let body = state
        .catalogs
        .fetch_catalog(request.media_type, &request.username, request.extra.as_deref())
        .await?;

    Ok((
        [
            (CONTENT_TYPE, "application/json"),
            (CACHE_CONTROL, CATALOG_CACHE_CONTROL),
        ],
        body,
    )
        .into_response())
}
