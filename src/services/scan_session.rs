use crate::constants;
use crate::models::report::ReportPayload;
use crate::models::scan::{
    BatchInfo, ExpectedItem, ScanError, ScanOutcome, ScannedItem, SessionTallies, WrongScan,
};
use crate::utils::kolkata_now_rfc3339;

/// Derive the product-type item code from a barcode (its first three
/// characters; shorter barcodes yield the whole string).
pub fn item_code_of(barcode: &str) -> String {
    barcode.chars().take(constants::BARCODE_PREFIX_LEN).collect()
}

/// One operator's in-progress stock verification for a godown x
/// product-type batch.
///
/// The session is a single-writer state machine: the HTTP layer delivers
/// one scan at a time (the frontend debounces scanner keystrokes into
/// whole barcodes), so every mutation here is sequential. Expected items
/// are fetched once at begin and never change; every other list is derived
/// from classified scans.
#[derive(Debug, Clone)]
pub struct ScanSession {
    pub batch: BatchInfo,
    pub expected_items: Vec<ExpectedItem>,
    pub scanned_items: Vec<ScannedItem>,
    pub missing_items: Vec<ExpectedItem>,
    pub wrong_scans: Vec<WrongScan>,
    pub is_scanning: bool,
}

impl ScanSession {
    /// Start a fresh session: everything expected is missing until scanned.
    pub fn begin(batch: BatchInfo, expected_items: Vec<ExpectedItem>) -> Self {
        Self {
            batch,
            missing_items: expected_items.clone(),
            expected_items,
            scanned_items: Vec::new(),
            wrong_scans: Vec::new(),
            is_scanning: true,
        }
    }

    /// Classify one raw barcode from the scanner.
    ///
    /// Checks run in a fixed order: empty input, duplicate, prefix
    /// mismatch, membership. The order is observable behavior - a repeat
    /// of a wrong-box scan must report `Duplicate`, not `WrongBox` again,
    /// so the duplicate check covers wrong scans as well as matches.
    pub fn submit_scan(&mut self, raw_barcode: &str) -> ScanOutcome {
        let barcode = raw_barcode.trim();
        if barcode.is_empty() || !self.is_scanning {
            return ScanOutcome::Ignored;
        }

        if self.already_recorded(barcode) {
            return ScanOutcome::Duplicate {
                barcode: barcode.to_string(),
            };
        }

        let actual_prefix = item_code_of(barcode);
        if actual_prefix != self.batch.product_prefix {
            self.wrong_scans.push(WrongScan {
                barcode: barcode.to_string(),
                expected_prefix: self.batch.product_prefix.clone(),
                actual_prefix: actual_prefix.clone(),
                time: kolkata_now_rfc3339(),
            });
            return ScanOutcome::WrongBox {
                expected_prefix: self.batch.product_prefix.clone(),
                actual_prefix,
            };
        }

        if !self.expected_items.iter().any(|item| item.barcode == barcode) {
            return ScanOutcome::NotExpected {
                barcode: barcode.to_string(),
            };
        }

        self.move_to_scanned(barcode, false);
        ScanOutcome::Matched {
            barcode: barcode.to_string(),
            progress: self.scanned_items.len(),
            total: self.expected_items.len(),
        }
    }

    /// Manually account for a missing item without a scan. Allowed even
    /// after the session has stopped scanning.
    pub fn mark_found(&mut self, barcode: &str) -> Result<(), ScanError> {
        let barcode = barcode.trim();
        if !self.missing_items.iter().any(|item| item.barcode == barcode) {
            return Err(ScanError::BarcodeNotMissing {
                barcode: barcode.to_string(),
            });
        }
        self.move_to_scanned(barcode, true);
        Ok(())
    }

    /// Assemble the report for submission. Purely local - the caller must
    /// see `EmptyReport` before any network call happens.
    pub fn build_report(&self, submitted_by: &str) -> Result<ReportPayload, ScanError> {
        if self.scanned_items.is_empty() {
            return Err(ScanError::EmptyReport);
        }

        Ok(ReportPayload {
            godown_id: self.batch.godown_id.clone(),
            godown_name: self.batch.godown_name.clone(),
            product_type: self.batch.product_type.clone(),
            product_prefix: self.batch.product_prefix.clone(),
            expected_count: self.expected_items.len(),
            scanned_count: self.scanned_items.len(),
            missing_count: self.missing_items.len(),
            wrong_scans_count: self.wrong_scans.len(),
            scanned_items: self.scanned_items.clone(),
            missing_items: self.missing_items.clone(),
            wrong_scans: self.wrong_scans.clone(),
            submitted_at: kolkata_now_rfc3339(),
            submitted_by: submitted_by.to_string(),
        })
    }

    /// Discard all progress and stop accepting scans.
    pub fn end(&mut self) {
        self.expected_items.clear();
        self.scanned_items.clear();
        self.missing_items.clear();
        self.wrong_scans.clear();
        self.is_scanning = false;
    }

    pub fn tallies(&self) -> SessionTallies {
        SessionTallies {
            expected_count: self.expected_items.len(),
            scanned_count: self.scanned_items.len(),
            missing_count: self.missing_items.len(),
            wrong_scans_count: self.wrong_scans.len(),
        }
    }

    fn already_recorded(&self, barcode: &str) -> bool {
        self.scanned_items.iter().any(|item| item.barcode == barcode)
            || self.wrong_scans.iter().any(|scan| scan.barcode == barcode)
    }

    fn move_to_scanned(&mut self, barcode: &str, manually_marked: bool) {
        self.missing_items.retain(|item| item.barcode != barcode);
        self.scanned_items.push(ScannedItem {
            barcode: barcode.to_string(),
            scan_time: kolkata_now_rfc3339(),
            manually_marked,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(barcodes: &[&str]) -> Vec<ExpectedItem> {
        barcodes
            .iter()
            .map(|barcode| ExpectedItem {
                barcode: barcode.to_string(),
                item_code: item_code_of(barcode),
            })
            .collect()
    }

    fn batch(prefix: &str) -> BatchInfo {
        BatchInfo {
            godown_id: "G-01".to_string(),
            godown_name: "Central Godown".to_string(),
            product_type: "Widgets".to_string(),
            product_prefix: prefix.to_string(),
        }
    }

    fn session(prefix: &str, barcodes: &[&str]) -> ScanSession {
        ScanSession::begin(batch(prefix), expected(barcodes))
    }

    fn assert_invariants(session: &ScanSession) {
        // missing and scanned are disjoint by barcode
        for scanned in &session.scanned_items {
            assert!(
                !session
                    .missing_items
                    .iter()
                    .any(|item| item.barcode == scanned.barcode),
                "barcode {} present in both scanned and missing",
                scanned.barcode
            );
        }
        // missing + scanned together cover exactly the expected set
        assert_eq!(
            session.missing_items.len() + session.scanned_items.len(),
            session.expected_items.len()
        );
        for item in &session.expected_items {
            let in_missing = session
                .missing_items
                .iter()
                .any(|missing| missing.barcode == item.barcode);
            let in_scanned = session
                .scanned_items
                .iter()
                .any(|scanned| scanned.barcode == item.barcode);
            assert!(in_missing ^ in_scanned, "barcode {} lost", item.barcode);
        }
    }

    #[test]
    fn begin_starts_with_everything_missing() {
        let session = session("XYZ", &["XYZ001", "XYZ002"]);
        assert!(session.is_scanning);
        assert_eq!(session.missing_items, session.expected_items);
        assert!(session.scanned_items.is_empty());
        assert!(session.wrong_scans.is_empty());
        assert_invariants(&session);
    }

    #[test]
    fn empty_and_whitespace_input_is_ignored() {
        let mut session = session("XYZ", &["XYZ001"]);
        assert_eq!(session.submit_scan(""), ScanOutcome::Ignored);
        assert_eq!(session.submit_scan("   "), ScanOutcome::Ignored);
        assert_eq!(session.submit_scan("\t\n"), ScanOutcome::Ignored);
        assert_eq!(session.missing_items.len(), 1);
        assert_invariants(&session);
    }

    #[test]
    fn matched_then_duplicate_grows_scanned_by_exactly_one() {
        let mut session = session("XYZ", &["XYZ001", "XYZ002"]);
        assert_eq!(
            session.submit_scan("XYZ001"),
            ScanOutcome::Matched {
                barcode: "XYZ001".to_string(),
                progress: 1,
                total: 2,
            }
        );
        assert_eq!(
            session.submit_scan("XYZ001"),
            ScanOutcome::Duplicate {
                barcode: "XYZ001".to_string(),
            }
        );
        assert_eq!(session.scanned_items.len(), 1);
        assert!(!session.scanned_items[0].manually_marked);
        assert_invariants(&session);
    }

    #[test]
    fn wrong_prefix_is_recorded_but_never_touches_the_expected_set() {
        // ABC999 matches an expected barcode elsewhere, but the prefix
        // check comes first
        let mut session = session("XYZ", &["XYZ001", "ABC999"]);
        assert_eq!(
            session.submit_scan("ABC999"),
            ScanOutcome::WrongBox {
                expected_prefix: "XYZ".to_string(),
                actual_prefix: "ABC".to_string(),
            }
        );
        assert_eq!(session.wrong_scans.len(), 1);
        assert_eq!(session.wrong_scans[0].barcode, "ABC999");
        assert!(session.scanned_items.is_empty());
        assert_eq!(session.missing_items.len(), 2);
    }

    #[test]
    fn repeat_of_a_wrong_box_scan_reports_duplicate() {
        let mut session = session("XYZ", &["XYZ001"]);
        assert!(matches!(
            session.submit_scan("ABC999"),
            ScanOutcome::WrongBox { .. }
        ));
        assert_eq!(
            session.submit_scan("ABC999"),
            ScanOutcome::Duplicate {
                barcode: "ABC999".to_string(),
            }
        );
        assert_eq!(session.wrong_scans.len(), 1);
    }

    #[test]
    fn correct_prefix_unknown_barcode_is_not_expected() {
        let mut session = session("XYZ", &["XYZ001"]);
        assert_eq!(
            session.submit_scan("XYZ999"),
            ScanOutcome::NotExpected {
                barcode: "XYZ999".to_string(),
            }
        );
        assert!(session.scanned_items.is_empty());
        assert_eq!(session.missing_items.len(), 1);
        assert_invariants(&session);
    }

    #[test]
    fn short_barcode_classifies_as_wrong_box() {
        let mut session = session("XYZ", &["XYZ001"]);
        assert_eq!(
            session.submit_scan("XY"),
            ScanOutcome::WrongBox {
                expected_prefix: "XYZ".to_string(),
                actual_prefix: "XY".to_string(),
            }
        );
    }

    #[test]
    fn scanner_trailing_newline_is_trimmed_before_matching() {
        let mut session = session("XYZ", &["XYZ001"]);
        assert!(matches!(
            session.submit_scan("XYZ001\n"),
            ScanOutcome::Matched { .. }
        ));
    }

    #[test]
    fn mark_found_moves_the_item_and_flags_it_manual() {
        let mut session = session("ABC", &["ABC123"]);
        session.mark_found("ABC123").unwrap();
        assert!(session.missing_items.is_empty());
        assert_eq!(session.scanned_items.len(), 1);
        assert_eq!(session.scanned_items[0].barcode, "ABC123");
        assert!(session.scanned_items[0].manually_marked);
        assert_invariants(&session);
    }

    #[test]
    fn mark_found_rejects_barcodes_not_in_the_missing_list() {
        let mut session = session("ABC", &["ABC123"]);
        session.mark_found("ABC123").unwrap();
        // already moved
        assert!(matches!(
            session.mark_found("ABC123"),
            Err(ScanError::BarcodeNotMissing { .. })
        ));
        // never expected
        assert!(matches!(
            session.mark_found("ABC999"),
            Err(ScanError::BarcodeNotMissing { .. })
        ));
    }

    #[test]
    fn mark_found_is_allowed_after_scanning_stops() {
        let mut session = session("ABC", &["ABC123", "ABC124"]);
        session.is_scanning = false;
        assert_eq!(session.submit_scan("ABC123"), ScanOutcome::Ignored);
        assert_eq!(session.missing_items.len(), 2);
        session.mark_found("ABC123").unwrap();
        assert_eq!(session.scanned_items.len(), 1);
    }

    #[test]
    fn build_report_on_a_fresh_session_is_an_empty_report() {
        let session = session("XYZ", &["XYZ001"]);
        assert!(matches!(
            session.build_report("operator"),
            Err(ScanError::EmptyReport)
        ));
    }

    #[test]
    fn end_resets_every_list_and_stops_scanning() {
        let mut session = session("XYZ", &["XYZ001", "XYZ002"]);
        session.submit_scan("XYZ001");
        session.submit_scan("ABC999");
        session.end();
        assert!(!session.is_scanning);
        assert!(session.expected_items.is_empty());
        assert!(session.scanned_items.is_empty());
        assert!(session.missing_items.is_empty());
        assert!(session.wrong_scans.is_empty());
    }

    #[test]
    fn full_verification_walkthrough() {
        let mut session = session("XYZ", &["XYZ001", "XYZ002"]);

        assert_eq!(
            session.submit_scan("XYZ001"),
            ScanOutcome::Matched {
                barcode: "XYZ001".to_string(),
                progress: 1,
                total: 2,
            }
        );
        assert_eq!(
            session.submit_scan("XYZ001"),
            ScanOutcome::Duplicate {
                barcode: "XYZ001".to_string(),
            }
        );
        assert!(matches!(
            session.submit_scan("ABC999"),
            ScanOutcome::WrongBox { .. }
        ));
        assert!(matches!(
            session.submit_scan("XYZ999"),
            ScanOutcome::NotExpected { .. }
        ));
        assert_invariants(&session);

        session.mark_found("XYZ002").unwrap();
        assert!(session.missing_items.is_empty());
        assert_eq!(session.scanned_items.len(), 2);
        assert_invariants(&session);

        let report = session.build_report("ramesh").unwrap();
        assert_eq!(report.expected_count, 2);
        assert_eq!(report.scanned_count, 2);
        assert_eq!(report.missing_count, 0);
        assert_eq!(report.wrong_scans_count, 1);
        assert_eq!(report.godown_id, "G-01");
        assert_eq!(report.submitted_by, "ramesh");
        assert_eq!(report.scanned_items, session.scanned_items);
        assert_eq!(report.wrong_scans, session.wrong_scans);
    }

    #[test]
    fn report_payload_uses_the_catalog_json_contract() {
        let mut session = session("XYZ", &["XYZ001"]);
        session.submit_scan("XYZ001");
        let report = session.build_report("ramesh").unwrap();
        let body = serde_json::to_value(&report).unwrap();
        assert_eq!(body["godownId"], "G-01");
        assert_eq!(body["expectedCount"], 1);
        assert_eq!(body["wrongScansCount"], 0);
        assert_eq!(body["scannedItems"][0]["manuallyMarked"], false);
        assert!(body["submittedAt"].is_string());
    }

    #[test]
    fn item_code_is_the_three_character_prefix() {
        assert_eq!(item_code_of("XYZ00123"), "XYZ");
        assert_eq!(item_code_of("AB"), "AB");
        assert_eq!(item_code_of(""), "");
    }
}
