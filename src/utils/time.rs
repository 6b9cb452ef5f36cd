//! Time helpers

use chrono::Utc;

/// Current wall-clock time as unix milliseconds (the DB timestamp format)
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
