// Application Constants
// Centralized constants to avoid magic numbers

/// Default server configuration
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 4500;

/// Upstream inventory catalog defaults
pub const DEFAULT_CATALOG_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_CATALOG_TIMEOUT_SECS: u64 = 10;

/// Barcode layout: the first three characters of every barcode are the
/// product-type item code
pub const BARCODE_PREFIX_LEN: usize = 3;

/// Scanner input debounce interval published to the frontend. Hardware
/// scanners emit keystrokes character-by-character; the UI waits this long
/// after the last keystroke before treating the input box as one barcode.
pub const SCAN_DEBOUNCE_MS: u64 = 500;

/// Upper bound on barcodes accepted in a single batch-scan request
pub const MAX_BATCH_SCAN_SIZE: usize = 100;

/// Submitter recorded on a report when the client sends no x-user-id header
pub const DEFAULT_SUBMITTED_BY: &str = "unknown";
