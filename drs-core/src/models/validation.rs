use time::Date;

/// The ways in which caller-supplied input can be rejected before any storage
/// is touched.
///
/// Validation failures are never retried; they are surfaced to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A date could not be parsed as `YYYY-MM-DD`
    #[error("malformed {field} date {value:?}: {source}")]
    MalformedDate {
        /// The name of the offending field
        field: &'static str,
        /// The raw input
        value: String,
        /// The underlying parse failure
        #[source]
        source: time::error::Parse,
    },

    /// A date parsed, but its year is outside `0000..=9999`
    #[error("{field} date {value:?} is outside years 0000 to 9999")]
    YearOutOfRange {
        /// The name of the offending field
        field: &'static str,
        /// The raw input
        value: String,
    },

    /// A price could not be parsed as an exact decimal
    #[error("malformed price {value:?}: {source}")]
    MalformedPrice {
        /// The raw input
        value: String,
        /// The underlying parse failure
        #[source]
        source: rust_decimal::Error,
    },

    /// The start date falls after the end date
    #[error("start {start} is after end {end}")]
    Inverted {
        /// The requested start
        start: Date,
        /// The requested end
        end: Date,
    },

    /// A written range must own at least one day
    #[error("range starting {0} has an empty span")]
    EmptySpan(Date),

    /// The key addressed by the request disagrees with the payload
    #[error("path key {path} does not match payload start {payload}")]
    KeyMismatch {
        /// The key taken from the request path
        path: Date,
        /// The start date taken from the payload
        payload: Date,
    },

    /// A filter referenced a column outside the allow-list
    #[error("unknown filter field {0:?}")]
    UnknownField(String),

    /// A filter used an operator outside the allow-list
    #[error("unknown filter operator {0:?}")]
    UnknownOperator(String),
}
