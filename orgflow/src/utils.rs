//! Small shared utilities for ids and timestamps.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generates a new UUID v4.
#[must_use]
pub fn generate_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Formats a timestamp as an ISO 8601 string with microsecond precision.
#[must_use]
pub fn format_iso8601(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uuid_v4() {
        let id = generate_uuid();
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn test_format_iso8601() {
        let ts = format_iso8601(&now_utc());
        assert!(ts.contains('T'));
        assert!(ts.ends_with("+00:00"));
    }
}
