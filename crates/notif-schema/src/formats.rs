//! # Format Extensions
//!
//! Replaces the built-in `date-time` format with the temporal codec's own
//! parser, and adds a `uuid` format backed by the same parser used when the
//! `id` field is materialized. Validation and construction therefore accept
//! exactly the same strings.

use jsonschema::ValidationOptions;
use notif_core::temporal::{self, TemporalMode};
use uuid::Uuid;

/// Format name overridden for timestamps.
pub const DATE_TIME: &str = "date-time";

/// Format name for opaque identifiers.
pub const UUID: &str = "uuid";

/// Install the format extensions on `options`, parsing dates under `mode`.
pub fn register(options: &mut ValidationOptions, mode: TemporalMode) {
    options
        .should_validate_formats(true)
        .with_format(DATE_TIME, move |value: &str| temporal::is_valid(value, mode))
        .with_format(UUID, |value: &str| Uuid::parse_str(value).is_ok());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(mode: TemporalMode) -> jsonschema::Validator {
        let mut options = jsonschema::options();
        options.with_draft(jsonschema::Draft::Draft7);
        register(&mut options, mode);
        options
            .build(&json!({
                "type": "object",
                "properties": {
                    "ts": { "type": "string", "format": "date-time" },
                    "id": { "type": "string", "format": "uuid" }
                }
            }))
            .unwrap()
    }

    #[test]
    fn test_date_time_follows_temporal_mode() {
        let strict = compile(TemporalMode::Strict);
        let relaxed = compile(TemporalMode::Relaxed);

        let zero = json!({ "ts": "2011-12-03T10:15:30+00:00" });
        let shifted = json!({ "ts": "2011-12-03T10:15:30+01:00" });
        let local = json!({ "ts": "2020-07-14T13:22:10.133" });

        assert!(strict.is_valid(&zero));
        assert!(strict.is_valid(&local));
        assert!(!strict.is_valid(&shifted));
        assert!(relaxed.is_valid(&shifted));
    }

    #[test]
    fn test_date_time_rejects_text() {
        let strict = compile(TemporalMode::Strict);
        assert!(!strict.is_valid(&json!({ "ts": "Tomorrow" })));
        assert!(!strict.is_valid(&json!({ "ts": "2020-07-14" })));
    }

    #[test]
    fn test_uuid_format() {
        let validator = compile(TemporalMode::Strict);
        assert!(validator.is_valid(&json!({ "id": "f81d4fae-7dec-11d0-a765-00a0c91e6bf6" })));
        assert!(!validator.is_valid(&json!({ "id": "not-a-uuid" })));
    }
}
