use chrono::{DateTime, Utc};
use chrono_tz::{Asia::Kolkata, Tz};

/// Kolkata timezone constant
pub const KOLKATA_TZ: Tz = Kolkata;

/// Get current time in Kolkata timezone
pub fn kolkata_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&KOLKATA_TZ)
}

/// Get current time in Kolkata timezone as RFC3339 string
pub fn kolkata_now_rfc3339() -> String {
    kolkata_now().to_rfc3339()
}
