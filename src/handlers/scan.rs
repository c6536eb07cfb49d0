use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::constants;
use crate::handlers::handle_scan_error;
use crate::models::report::ReportPayload;
use crate::models::scan::{
    BatchInfo, BatchScanRequest, BatchScanResponse, BeginSessionRequest, BeginSessionResponse,
    ScanError, ScanRequest, ScanResponse, ScannerConfig, SessionTallies, SessionView,
};
use crate::services::summary;
use crate::types::ApiResponse;
use crate::AppState;

/// Create scan-session routes
pub fn create_scan_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(begin_session))
        .route("/sessions/{session_id}", get(get_session).delete(discard_session))
        .route("/sessions/{session_id}/scan", post(submit_scan))
        .route("/sessions/{session_id}/scans", post(submit_scan_batch))
        .route("/sessions/{session_id}/mark-found", post(mark_found))
        .route("/sessions/{session_id}/summary", get(get_summary))
        .route("/sessions/{session_id}/report", post(submit_report))
        .route("/config", get(get_scanner_config))
}

/// Start a scan session for a godown x product-type batch
/// POST /api/scan/sessions
async fn begin_session(
    State(state): State<AppState>,
    Json(request): Json<BeginSessionRequest>,
) -> Result<Json<BeginSessionResponse>, (StatusCode, Json<serde_json::Value>)> {
    if let Err(e) = validate_begin_request(&request) {
        return handle_scan_error(e);
    }

    let batch = BatchInfo {
        godown_id: request.godown_id.trim().to_string(),
        godown_name: request.godown_name.trim().to_string(),
        product_type: request.product_type.trim().to_string(),
        product_prefix: request.product_prefix.trim().to_string(),
    };

    match state
        .catalog
        .fetch_expected_items(&batch.godown_id, &batch.product_prefix)
        .await
    {
        Ok(expected_items) => {
            if expected_items.is_empty() {
                warn!(
                    "Catalog has no items for godown {} / prefix {}",
                    batch.godown_id, batch.product_prefix
                );
            }
            let expected_count = expected_items.len();
            let session_id = state.sessions.begin(batch.clone(), expected_items).await;
            info!(
                "🔍 Scan session {} started for godown {} ({} expected)",
                session_id, batch.godown_id, expected_count
            );
            Ok(Json(BeginSessionResponse {
                session_id,
                batch,
                expected_count,
            }))
        }
        Err(e) => handle_scan_error(e),
    }
}

fn validate_begin_request(request: &BeginSessionRequest) -> Result<(), ScanError> {
    if request.godown_id.trim().is_empty() {
        return Err(ScanError::ValidationError(
            "godownId must not be empty".to_string(),
        ));
    }
    if request.product_prefix.trim().chars().count() != constants::BARCODE_PREFIX_LEN {
        return Err(ScanError::ValidationError(format!(
            "productPrefix must be exactly {} characters",
            constants::BARCODE_PREFIX_LEN
        )));
    }
    Ok(())
}

/// Get full session state, optionally narrowed by ?search={term}
/// GET /api/scan/sessions/{session_id}
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<SessionView>, (StatusCode, Json<serde_json::Value>)> {
    let search = params.get("search").map(|s| s.as_str()).unwrap_or("");

    let view = state
        .sessions
        .with_session(session_id, |session| SessionView {
            session_id,
            batch: session.batch.clone(),
            is_scanning: session.is_scanning,
            // tallies stay unfiltered - the counts are authoritative
            tallies: session.tallies(),
            scanned_items: summary::filter_by_barcode(&session.scanned_items, search, |item| {
                &item.barcode
            })
            .into_iter()
            .cloned()
            .collect(),
            missing_items: summary::filter_by_barcode(&session.missing_items, search, |item| {
                &item.barcode
            })
            .into_iter()
            .cloned()
            .collect(),
            wrong_scans: summary::filter_by_barcode(&session.wrong_scans, search, |scan| {
                &scan.barcode
            })
            .into_iter()
            .cloned()
            .collect(),
        })
        .await;

    match view {
        Ok(view) => Ok(Json(view)),
        Err(e) => handle_scan_error(e),
    }
}

/// Classify one barcode from the scanner
/// POST /api/scan/sessions/{session_id}/scan
async fn submit_scan(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ScanResponse>, (StatusCode, Json<serde_json::Value>)> {
    let result = state
        .sessions
        .with_session_mut(session_id, |session| ScanResponse {
            outcome: session.submit_scan(&request.barcode),
            tallies: session.tallies(),
        })
        .await;

    match result {
        Ok(response) => Ok(Json(response)),
        Err(e) => handle_scan_error(e),
    }
}

/// Classify a burst of barcodes in order, one logical scan at a time
/// POST /api/scan/sessions/{session_id}/scans
async fn submit_scan_batch(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<BatchScanRequest>,
) -> Result<Json<BatchScanResponse>, (StatusCode, Json<serde_json::Value>)> {
    if request.barcodes.len() > constants::MAX_BATCH_SCAN_SIZE {
        return handle_scan_error(ScanError::ValidationError(format!(
            "Batch scan accepts at most {} barcodes",
            constants::MAX_BATCH_SCAN_SIZE
        )));
    }

    let result = state
        .sessions
        .with_session_mut(session_id, |session| {
            let outcomes = request
                .barcodes
                .iter()
                .map(|barcode| session.submit_scan(barcode))
                .collect();
            BatchScanResponse {
                outcomes,
                tallies: session.tallies(),
            }
        })
        .await;

    match result {
        Ok(response) => Ok(Json(response)),
        Err(e) => handle_scan_error(e),
    }
}

/// Manually account for a missing item without a scan
/// POST /api/scan/sessions/{session_id}/mark-found
async fn mark_found(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ApiResponse<SessionTallies>>, (StatusCode, Json<serde_json::Value>)> {
    let result = state
        .sessions
        .with_session_mut(session_id, |session| {
            session.mark_found(&request.barcode).map(|_| session.tallies())
        })
        .await;

    match result {
        Ok(Ok(tallies)) => Ok(Json(ApiResponse::success(tallies, "Item marked as found"))),
        Ok(Err(e)) | Err(e) => handle_scan_error(e),
    }
}

/// Per-item-code progress tallies
/// GET /api/scan/sessions/{session_id}/summary
async fn get_summary(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<summary::ItemCodeTally>>, (StatusCode, Json<serde_json::Value>)> {
    match state
        .sessions
        .with_session(session_id, summary::tally_by_item_code)
        .await
    {
        Ok(tallies) => Ok(Json(tallies)),
        Err(e) => handle_scan_error(e),
    }
}

/// Build the verification report and submit it to the catalog. The session
/// is discarded only after the catalog accepts the report; on upstream
/// failure it stays intact so the operator can retry without re-scanning.
/// POST /api/scan/sessions/{session_id}/report
async fn submit_report(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<ReportPayload>>, (StatusCode, Json<serde_json::Value>)> {
    let submitted_by = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or(constants::DEFAULT_SUBMITTED_BY)
        .to_string();

    let report = match state
        .sessions
        .with_session(session_id, |session| session.build_report(&submitted_by))
        .await
    {
        Ok(Ok(report)) => report,
        Ok(Err(ScanError::EmptyReport)) => {
            // Blocked before any catalog call; the UI shows this as a
            // warning, not a failure
            return Ok(Json(ApiResponse::error(
                "No items scanned yet - nothing to submit",
            )));
        }
        Ok(Err(e)) | Err(e) => return handle_scan_error(e),
    };

    if let Err(e) = state.catalog.submit_report(&report).await {
        return handle_scan_error(e);
    }

    if let Err(e) = state.sessions.discard(session_id).await {
        warn!("Report submitted but session cleanup failed: {e}");
    }

    info!(
        "📋 Report submitted for godown {}: {}/{} scanned, {} missing, {} wrong scans",
        report.godown_id,
        report.scanned_count,
        report.expected_count,
        report.missing_count,
        report.wrong_scans_count
    );
    Ok(Json(ApiResponse::success(
        report,
        "Stock verification report submitted",
    )))
}

/// Abandon a session ("start over")
/// DELETE /api/scan/sessions/{session_id}
async fn discard_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<bool>>, (StatusCode, Json<serde_json::Value>)> {
    match state.sessions.discard(session_id).await {
        Ok(()) => Ok(Json(ApiResponse::success(true, "Scan session discarded"))),
        Err(e) => handle_scan_error(e),
    }
}

/// Scanner settings the frontend reads once at startup
/// GET /api/scan/config
async fn get_scanner_config() -> Json<ScannerConfig> {
    Json(ScannerConfig {
        scan_debounce_ms: constants::SCAN_DEBOUNCE_MS,
        prefix_length: constants::BARCODE_PREFIX_LEN,
        max_batch_size: constants::MAX_BATCH_SCAN_SIZE,
    })
}
