use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;

use crate::catalog::Collection;
use crate::handlers::handle_scan_error;
use crate::utils::kolkata_now_rfc3339;
use crate::AppState;

/// Create catalog read-through routes
pub fn create_catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(catalog_status))
        .route("/{kind}", get(list_collection))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStatusResponse {
    pub success: bool,
    pub catalog_url: String,
    pub active_sessions: usize,
    pub collections: Vec<serde_json::Value>,
    pub timestamp: String,
}

/// Catalog configuration and session registry status
/// GET /api/catalog/status
async fn catalog_status(State(state): State<AppState>) -> Json<CatalogStatusResponse> {
    Json(CatalogStatusResponse {
        success: true,
        catalog_url: state.catalog.base_url().to_string(),
        active_sessions: state.sessions.active_count().await,
        collections: Collection::ALL
            .iter()
            .map(|collection| {
                json!({
                    "kind": collection.endpoint(),
                    "idField": collection.id_field()
                })
            })
            .collect(),
        timestamp: kolkata_now_rfc3339(),
    })
}

/// Read a catalog collection through to the upstream service
/// GET /api/catalog/{kind}?search={term}
async fn list_collection(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let collection = match kind.parse::<Collection>() {
        Ok(collection) => collection,
        Err(e) => return handle_scan_error(e),
    };

    match state
        .catalog
        .list(collection, params.get("search").map(|s| s.as_str()))
        .await
    {
        Ok(data) => Ok(Json(json!({
            "success": true,
            "data": data
        }))),
        Err(e) => handle_scan_error(e),
    }
}
