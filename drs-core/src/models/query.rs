use super::{Interval, ValidationError, parse_date, parse_price};
use rust_decimal::Decimal;
use std::{cmp::Ordering, fmt::Display, str::FromStr};
use time::Date;

/// The columns a filter may reference.
///
/// This is an allow-list: anything else in a query string is rejected before
/// a statement is ever assembled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// The start date (natural key)
    Start,
    /// The exclusive end date
    End,
    /// The decimal price
    Price,
}

impl Field {
    /// The storage column backing this field
    pub fn column(self) -> &'static str {
        match self {
            Self::Start => "date_start",
            Self::End => "date_end",
            Self::Price => "price",
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Price => "price",
        }
    }
}

impl FromStr for Field {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Self::Start),
            "end" => Ok(Self::End),
            "price" => Ok(Self::Price),
            other => Err(ValidationError::UnknownField(other.to_owned())),
        }
    }
}

/// Comparison operators available to filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Operator {
    /// The SQL spelling of the operator
    pub fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Whether `lhs.cmp(rhs) == ordering` satisfies the operator
    pub fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering.is_eq(),
            Self::Ne => ordering.is_ne(),
            Self::Lt => ordering.is_lt(),
            Self::Le => ordering.is_le(),
            Self::Gt => ordering.is_gt(),
            Self::Ge => ordering.is_ge(),
        }
    }
}

impl FromStr for Operator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eq" => Ok(Self::Eq),
            "ne" => Ok(Self::Ne),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Le),
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Ge),
            other => Err(ValidationError::UnknownOperator(other.to_owned())),
        }
    }
}

/// A typed value on the right-hand side of a predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    /// A calendar date
    Date(Date),
    /// An exact price
    Price(Decimal),
}

/// One `field op value` constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Predicate {
    /// The constrained field
    pub field: Field,
    /// The comparison
    pub op: Operator,
    /// The value to compare against, typed according to `field`
    pub operand: Operand,
}

impl Predicate {
    /// Parse a query-string pair of the form `field[.op]=value`.
    ///
    /// The operator defaults to `eq`. The value is parsed according to the
    /// field's type, so `start.gte=2024-01-01` and `price.lt=12.5` are both
    /// valid while `price.lt=2024-01-01` is not.
    pub fn parse(key: &str, value: &str) -> Result<Self, ValidationError> {
        let (field, op) = match key.split_once('.') {
            Some((field, op)) => (field.parse::<Field>()?, op.parse::<Operator>()?),
            None => (key.parse::<Field>()?, Operator::Eq),
        };
        let operand = match field {
            Field::Start => Operand::Date(parse_date("start", value)?),
            Field::End => Operand::Date(parse_date("end", value)?),
            Field::Price => Operand::Price(parse_price(value)?),
        };
        Ok(Self { field, op, operand })
    }

    /// Evaluate the predicate against an interval.
    pub fn matches(&self, interval: &Interval) -> bool {
        let ordering = match (self.field, self.operand) {
            (Field::Start, Operand::Date(d)) => interval.start().cmp(&d),
            (Field::End, Operand::Date(d)) => interval.end().cmp(&d),
            (Field::Price, Operand::Price(p)) => interval.price().cmp(&p),
            // Predicate::parse never pairs a field with the wrong operand type
            _ => return false,
        };
        self.op.accepts(ordering)
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.operand {
            Operand::Date(d) => write!(f, "{} {} {}", self.field.name(), self.op.sql(), d),
            Operand::Price(p) => write!(f, "{} {} {}", self.field.name(), self.op.sql(), p),
        }
    }
}

/// A conjunction of predicates over the stored intervals.
///
/// An empty query matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IntervalQuery {
    predicates: Vec<Predicate>,
}

impl IntervalQuery {
    /// Build a query from raw query-string pairs, validating every key against
    /// the allow-list.
    pub fn from_params<I, K, V>(params: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let predicates = params
            .into_iter()
            .map(|(k, v)| Predicate::parse(k.as_ref(), v.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { predicates })
    }

    /// Add a predicate to the conjunction
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// The predicates making up this query
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Whether the query has no constraints
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Evaluate every predicate against an interval.
    pub fn matches(&self, interval: &Interval) -> bool {
        self.predicates.iter().all(|p| p.matches(interval))
    }
}
