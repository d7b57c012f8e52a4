mod interval;
mod outcome;
mod query;
mod validation;

pub use interval::{DATE_FORMAT, Interval, IntervalDto, parse_date, parse_price};
pub use outcome::{CommitSummary, ResolutionOutcome};
pub use query::{Field, IntervalQuery, Operand, Operator, Predicate};
pub use validation::ValidationError;
