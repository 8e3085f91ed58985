//! # Error Types
//!
//! Errors raised by the foundational types. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Error raised while parsing date-time text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    /// The text is not an ISO-8601 extended date-time.
    #[error("malformed date-time {input:?}: {reason}")]
    Malformed {
        /// The rejected input.
        input: String,
        /// Why parsing failed.
        reason: String,
    },

    /// The text carries a non-zero offset and strict parsing was requested.
    #[error("date-time {input:?} has non-UTC offset {offset}")]
    NonUtcOffset {
        /// The rejected input.
        input: String,
        /// The offset as written in the input.
        offset: String,
    },

    /// The offset is outside the `-18:00..=+18:00` range.
    #[error("date-time {input:?} has out-of-range offset {offset}")]
    OffsetOutOfRange {
        /// The rejected input.
        input: String,
        /// The offset as written in the input.
        offset: String,
    },
}
