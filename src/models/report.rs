use serde::{Deserialize, Serialize};

use crate::models::scan::{ExpectedItem, ScannedItem, WrongScan};

/// Stock-verification report submitted to the inventory catalog when the
/// operator finishes a session. Field names follow the catalog's JSON
/// contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub godown_id: String,
    pub godown_name: String,
    pub product_type: String,
    pub product_prefix: String,
    pub expected_count: usize,
    pub scanned_count: usize,
    pub missing_count: usize,
    pub wrong_scans_count: usize,
    pub scanned_items: Vec<ScannedItem>,
    pub missing_items: Vec<ExpectedItem>,
    pub wrong_scans: Vec<WrongScan>,
    pub submitted_at: String,
    pub submitted_by: String,
}
