use axum::{http::StatusCode, response::Json};
use serde_json::json;

use crate::models::scan::ScanError;

pub mod catalog;
pub mod scan;

/// Map a domain error to its HTTP shape. Scan outcomes never pass through
/// here - classification is informational and always a 200.
pub(crate) fn handle_scan_error<T>(
    error: ScanError,
) -> Result<T, (StatusCode, Json<serde_json::Value>)> {
    match error {
        ScanError::SessionNotFound { session_id } => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Session not found",
                "message": format!("Scan session '{}' not found", session_id)
            })),
        )),
        ScanError::BarcodeNotMissing { barcode } => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "Barcode not missing",
                "message": format!("Barcode '{}' is not in the missing list", barcode)
            })),
        )),
        ScanError::EmptyReport => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Empty report",
                "message": "No items scanned in this session yet"
            })),
        )),
        ScanError::ValidationError(msg) => Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Validation error",
                "message": msg
            })),
        )),
        ScanError::CatalogError(msg) => {
            tracing::error!("Catalog error: {msg}");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "Catalog error",
                    "message": "Upstream catalog request failed"
                })),
            ))
        }
    }
}
