use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One barcoded item the godown is expected to hold for the selected
/// product type. Fetched from the inventory catalog when a session begins
/// and immutable for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedItem {
    pub barcode: String,
    /// Three-character product-type prefix derived from the barcode
    pub item_code: String,
}

/// An expected item the operator has accounted for, either by scanning it
/// or by marking it found manually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedItem {
    pub barcode: String,
    pub scan_time: String,
    pub manually_marked: bool,
}

/// A scan whose prefix did not match the session's product type. Recorded
/// for the report but never counted as a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrongScan {
    pub barcode: String,
    pub expected_prefix: String,
    pub actual_prefix: String,
    pub time: String,
}

/// The godown x product-type batch a scan session verifies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInfo {
    pub godown_id: String,
    pub godown_name: String,
    pub product_type: String,
    pub product_prefix: String,
}

/// Classification of a single scan. Every outcome is informational; the
/// frontend renders it as a transient notification, never as a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ScanOutcome {
    /// Empty or whitespace input, or a scan against an ended session
    Ignored,
    /// Barcode already recorded this session (as a match or a wrong scan)
    Duplicate { barcode: String },
    /// Prefix mismatch against the selected product type
    WrongBox {
        expected_prefix: String,
        actual_prefix: String,
    },
    /// Well-formed barcode that is not in this batch's expected set
    NotExpected { barcode: String },
    Matched {
        barcode: String,
        progress: usize,
        total: usize,
    },
}

/// Running counts for a session, returned alongside scan outcomes so the
/// frontend can update its tallies without refetching the arrays
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTallies {
    pub expected_count: usize,
    pub scanned_count: usize,
    pub missing_count: usize,
    pub wrong_scans_count: usize,
}

/// Full session state as served to the frontend
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub batch: BatchInfo,
    pub is_scanning: bool,
    #[serde(flatten)]
    pub tallies: SessionTallies,
    pub scanned_items: Vec<ScannedItem>,
    pub missing_items: Vec<ExpectedItem>,
    pub wrong_scans: Vec<WrongScan>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginSessionRequest {
    pub godown_id: String,
    pub godown_name: String,
    pub product_type: String,
    pub product_prefix: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginSessionResponse {
    pub session_id: Uuid,
    pub batch: BatchInfo,
    pub expected_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub barcode: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchScanRequest {
    pub barcodes: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    #[serde(flatten)]
    pub outcome: ScanOutcome,
    #[serde(flatten)]
    pub tallies: SessionTallies,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchScanResponse {
    pub outcomes: Vec<ScanOutcome>,
    #[serde(flatten)]
    pub tallies: SessionTallies,
}

/// Scanner-facing settings the frontend reads once at startup
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerConfig {
    pub scan_debounce_ms: u64,
    pub prefix_length: usize,
    pub max_batch_size: usize,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Scan session '{session_id}' not found")]
    SessionNotFound { session_id: Uuid },

    #[error("Barcode '{barcode}' is not in the missing list")]
    BarcodeNotMissing { barcode: String },

    #[error("No items scanned in this session yet")]
    EmptyReport,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),
}
