use super::Interval;
use time::Date;

/// The replacement set computed by the resolver for a single candidate.
///
/// Applying `to_delete` and then `to_add` to the stored partition yields a
/// partition that is still pairwise non-overlapping. Both sequences are
/// ordered by start date.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolutionOutcome {
    pub(crate) to_delete: Vec<Interval>,
    pub(crate) to_add: Vec<Interval>,
}

impl ResolutionOutcome {
    /// The outcome for a candidate with nothing to reconcile against.
    pub fn insert_only(candidate: Interval) -> Self {
        Self {
            to_delete: Vec::new(),
            to_add: vec![candidate],
        }
    }

    /// Stored intervals superseded by the candidate
    pub fn to_delete(&self) -> &[Interval] {
        &self.to_delete
    }

    /// The candidate plus any surviving remnants of trimmed neighbors
    pub fn to_add(&self) -> &[Interval] {
        &self.to_add
    }

    /// The natural keys of every row that will be inserted
    pub fn added_keys(&self) -> Vec<Date> {
        self.to_add.iter().map(Interval::start).collect()
    }

    /// Whether applying this outcome is a plain insert of a single row
    pub fn is_insert_only(&self) -> bool {
        self.to_delete.is_empty() && self.to_add.len() == 1
    }
}

/// The result of a committed unit of work.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommitSummary {
    /// The number of stored rows that were deleted
    pub deleted: usize,
    /// The number of rows that were inserted, including the candidate
    pub added: usize,
}
