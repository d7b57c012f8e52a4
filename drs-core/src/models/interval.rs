use super::ValidationError;
use rust_decimal::Decimal;
use std::fmt::Display;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

/// The calendar format used for every date that crosses a boundary.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` date, naming `field` in the error.
///
/// Only years `0000` through `9999` are accepted. Within that range the text
/// form sorts in calendar order, which storage relies on.
pub fn parse_date(field: &'static str, value: &str) -> Result<Date, ValidationError> {
    let date = Date::parse(value, DATE_FORMAT).map_err(|source| ValidationError::MalformedDate {
        field,
        value: value.to_owned(),
        source,
    })?;
    if !(0..=9999).contains(&date.year()) {
        return Err(ValidationError::YearOutOfRange {
            field,
            value: value.to_owned(),
        });
    }
    Ok(date)
}

/// Parse an exact decimal price. Inputs that would lose precision are rejected.
pub fn parse_price(value: &str) -> Result<Decimal, ValidationError> {
    Decimal::from_str_exact(value).map_err(|source| ValidationError::MalformedPrice {
        value: value.to_owned(),
        source,
    })
}

/// A priced date range.
///
/// The span is half-open: an interval `[start, end)` owns `start` but not
/// `end`, so two intervals where one ends on the day the other starts are
/// adjacent rather than overlapping. The natural key of a stored interval is
/// its start date.
///
/// Intervals are immutable. Operations that "change" an interval, such as
/// trimming it around a newer range, produce fresh values that carry the
/// original price verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "IntervalDto", into = "IntervalDto")
)]
pub struct Interval {
    start: Date,
    end: Date,
    price: Decimal,
}

impl Interval {
    /// Construct an interval, rejecting `start > end`.
    pub fn new(start: Date, end: Date, price: Decimal) -> Result<Self, ValidationError> {
        if start > end {
            Err(ValidationError::Inverted { start, end })
        } else {
            Ok(Self { start, end, price })
        }
    }

    /// Construct an interval from its textual representation.
    pub fn parse(start: &str, end: &str, price: &str) -> Result<Self, ValidationError> {
        Self::new(
            parse_date("start", start)?,
            parse_date("end", end)?,
            parse_price(price)?,
        )
    }

    /// The first day of the span (inclusive), also the natural key
    pub fn start(&self) -> Date {
        self.start
    }

    /// The boundary of the span (exclusive)
    pub fn end(&self) -> Date {
        self.end
    }

    /// The price attached to the span
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Whether the span owns no days at all
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the half-open spans share at least one day.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }

    /// True when one span ends exactly where the other starts.
    pub fn touches(&self, other: &Interval) -> bool {
        self.end == other.start || other.end == self.start
    }

    /// True when `other`'s span lies within this span, boundaries included.
    pub fn covers(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The part of this interval's span lying within `[start, end)`, at this
    /// interval's price. Returns `None` when that part is empty.
    pub fn remnant(&self, start: Date, end: Date) -> Option<Interval> {
        let start = start.max(self.start);
        let end = end.min(self.end);
        (start < end).then(|| Interval {
            start,
            end,
            price: self.price,
        })
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}) @ {}", self.start, self.end, self.price)
    }
}

/// DTO to ensure that we always validate when we deserialize from an untrusted source.
///
/// Dates are `YYYY-MM-DD` strings and the price is a decimal string, so no
/// precision is lost in transit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntervalDto {
    /// The first day of the range, `YYYY-MM-DD`
    pub start: String,
    /// The exclusive end of the range, `YYYY-MM-DD`
    pub end: String,
    /// The exact decimal price, e.g. `"12.50"`
    pub price: String,
}

impl TryFrom<IntervalDto> for Interval {
    type Error = ValidationError;

    fn try_from(value: IntervalDto) -> Result<Self, Self::Error> {
        Self::parse(&value.start, &value.end, &value.price)
    }
}

impl From<Interval> for IntervalDto {
    fn from(value: Interval) -> Self {
        Self {
            start: value.start.to_string(),
            end: value.end.to_string(),
            price: value.price.to_string(),
        }
    }
}

#[cfg(feature = "schemars")]
impl schemars::JsonSchema for Interval {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "Interval".into()
    }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        <IntervalDto as schemars::JsonSchema>::json_schema(generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn iv(start: Date, end: Date, price: i64) -> Interval {
        Interval::new(start, end, Decimal::from(price)).unwrap()
    }

    #[test]
    fn test_negative_years_rejected() {
        assert!(matches!(
            parse_date("start", "-0004-01-01"),
            Err(ValidationError::YearOutOfRange { field: "start", .. })
        ));
        assert!(matches!(
            Interval::parse("-0005-01-01", "-0001-01-01", "9"),
            Err(ValidationError::YearOutOfRange { .. })
        ));
        assert_eq!(parse_date("end", "0000-01-01").unwrap().year(), 0);
        assert_eq!(parse_date("end", "9999-12-31").unwrap().year(), 9999);
    }

    #[test]
    fn test_inverted_span() {
        let err = Interval::new(date!(2024 - 02 - 01), date!(2024 - 01 - 01), Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, ValidationError::Inverted { .. }));
    }

    #[test]
    fn test_parse() {
        let interval = Interval::parse("2024-01-01", "2024-02-01", "10.50").unwrap();
        assert_eq!(interval.start(), date!(2024 - 01 - 01));
        assert_eq!(interval.end(), date!(2024 - 02 - 01));
        assert_eq!(interval.price().to_string(), "10.50");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Interval::parse("2024-13-01", "2024-02-01", "1"),
            Err(ValidationError::MalformedDate { field: "start", .. })
        ));
        assert!(matches!(
            Interval::parse("2024-01-01", "tomorrow", "1"),
            Err(ValidationError::MalformedDate { field: "end", .. })
        ));
        assert!(matches!(
            Interval::parse("2024-01-01", "2024-02-01", "ten"),
            Err(ValidationError::MalformedPrice { .. })
        ));
    }

    #[test]
    fn test_adjacent_is_not_overlap() {
        let a = iv(date!(2023 - 12 - 01), date!(2024 - 02 - 01), 10);
        let b = iv(date!(2024 - 02 - 01), date!(2024 - 03 - 01), 20);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.touches(&b));
        assert!(b.touches(&a));
    }

    #[test]
    fn test_overlap() {
        let a = iv(date!(2024 - 01 - 01), date!(2024 - 06 - 01), 10);
        let b = iv(date!(2024 - 05 - 01), date!(2024 - 08 - 01), 20);
        assert!(a.overlaps(&b));
        assert!(!a.touches(&b));
        assert!(!a.covers(&b));
    }

    #[test]
    fn test_remnant_keeps_price() {
        let a = iv(date!(2024 - 01 - 01), date!(2024 - 12 - 31), 10);
        let left = a
            .remnant(date!(2023 - 01 - 01), date!(2024 - 06 - 01))
            .unwrap();
        assert_eq!(left.start(), date!(2024 - 01 - 01));
        assert_eq!(left.end(), date!(2024 - 06 - 01));
        assert_eq!(left.price(), Decimal::from(10));
        assert!(a.remnant(date!(2024 - 12 - 31), date!(2025 - 06 - 01)).is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip_preserves_scale() {
        let interval = Interval::parse("2024-01-01", "2024-02-01", "7.250").unwrap();
        let json = serde_json::to_value(&interval).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"start": "2024-01-01", "end": "2024-02-01", "price": "7.250"})
        );
        let back: Interval = serde_json::from_value(json).unwrap();
        assert_eq!(back, interval);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let json = serde_json::json!({"start": "2024-03-01", "end": "2024-02-01", "price": "1"});
        assert!(serde_json::from_value::<Interval>(json).is_err());
    }
}
