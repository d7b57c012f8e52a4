//! Row types for the SQLite implementation.
//!
//! Dates are bound and decoded through `sqlx`'s `time` support, which stores a
//! [`time::Date`] as `YYYY-MM-DD` text. Prices are kept as decimal text so no
//! precision is lost; they are re-validated when a row is hydrated.

use drs_core::models::{Interval, parse_price};

/// A raw row of the `daterange` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IntervalRow {
    /// The first day of the range, and the primary key
    pub date_start: time::Date,
    /// The exclusive end of the range
    pub date_end: time::Date,
    /// The exact decimal price, as text
    pub price: String,
}

impl TryFrom<IntervalRow> for Interval {
    type Error = sqlx::Error;

    fn try_from(row: IntervalRow) -> Result<Self, Self::Error> {
        let price = parse_price(&row.price).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        Interval::new(row.date_start, row.date_end, price)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))
    }
}

/// Hydrate a batch of rows, failing on the first corrupted one.
pub(crate) fn hydrate(rows: Vec<IntervalRow>) -> Result<Vec<Interval>, sqlx::Error> {
    rows.into_iter().map(Interval::try_from).collect()
}
