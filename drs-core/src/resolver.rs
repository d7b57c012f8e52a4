//! Given a candidate interval and the stored intervals around it, compute the
//! rows to delete and insert so that the stored partition stays pairwise
//! non-overlapping and the candidate's price governs its own span.
//!
//! The resolver performs no I/O and holds no state; it is safe to call from
//! any number of requests concurrently.

use crate::models::{Interval, ResolutionOutcome};
use time::Date;
use tracing::{Level, event};

/// How a stored neighbor relates to the candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    /// The spans do not intersect (they may share a boundary date). The
    /// neighbor is left as it is.
    Untouched,
    /// The neighbor lies entirely within the candidate and disappears.
    Superseded,
    /// The neighbor strictly contains the candidate and is split into a left
    /// and/or right remnant.
    Split,
    /// The neighbor overlaps one side of the candidate and is cut back to the
    /// part outside of it.
    Trimmed,
}

/// Classify `neighbor` against `candidate`.
///
/// A zero-length neighbor owns no days, so overlap alone never catches it.
/// One that starts on or inside the candidate is superseded, since it would
/// otherwise collide with the candidate's key or sit within its span. One that
/// sits on the candidate's end only touches it and is left alone.
pub fn classify(candidate: &Interval, neighbor: &Interval) -> Relation {
    let swept = neighbor.start() < candidate.end() || neighbor.start() == candidate.start();
    if candidate.covers(neighbor) && swept {
        Relation::Superseded
    } else if !candidate.overlaps(neighbor) {
        Relation::Untouched
    } else if neighbor.covers(candidate) {
        Relation::Split
    } else {
        Relation::Trimmed
    }
}

/// Compute the replacement set for `candidate`.
///
/// `neighbors` may be in any order and may contain duplicates. The returned
/// outcome lists deletions and insertions ordered by start date; the candidate
/// itself is always among the insertions, and remnants of split or trimmed
/// neighbors carry their original price.
///
/// # Errors
///
/// Returns [`InvariantViolation`] if the computed outcome would leave two
/// intervals overlapping or sharing a key. With a consistent set of neighbors
/// this cannot happen; it signals either a bug or a corrupted store.
pub fn resolve(
    candidate: &Interval,
    neighbors: &[Interval],
) -> Result<ResolutionOutcome, InvariantViolation> {
    if neighbors.is_empty() {
        return Ok(ResolutionOutcome::insert_only(candidate.clone()));
    }

    let mut neighbors = neighbors.to_vec();
    neighbors.sort_by_key(Interval::start);
    neighbors.dedup();

    let mut to_delete = Vec::new();
    let mut to_add = Vec::new();

    for neighbor in neighbors.iter() {
        let relation = classify(candidate, neighbor);
        event!(
            Level::TRACE,
            candidate = %candidate,
            neighbor = %neighbor,
            relation = ?relation,
            "classified neighbor"
        );
        match relation {
            Relation::Untouched => {}
            Relation::Superseded => to_delete.push(neighbor.clone()),
            Relation::Split | Relation::Trimmed => {
                to_delete.push(neighbor.clone());
                // at most one of these is empty for a trim, neither for a split
                to_add.extend(neighbor.remnant(neighbor.start(), candidate.start()));
                to_add.extend(neighbor.remnant(candidate.end(), neighbor.end()));
            }
        }
    }

    to_add.push(candidate.clone());
    to_add.sort_by_key(Interval::start);

    let outcome = ResolutionOutcome { to_delete, to_add };
    if let Err(kind) = verify(candidate, &neighbors, &outcome) {
        event!(
            Level::ERROR,
            candidate = %candidate,
            neighbors = ?neighbors,
            outcome = ?outcome,
            violation = %kind,
            "resolver produced an inconsistent partition"
        );
        return Err(InvariantViolation {
            candidate: candidate.clone(),
            neighbors,
            kind,
        });
    }

    Ok(outcome)
}

/// Check that applying `outcome` on top of `neighbors` leaves a partition.
fn verify(
    candidate: &Interval,
    neighbors: &[Interval],
    outcome: &ResolutionOutcome,
) -> Result<(), ViolationKind> {
    if let Some(stray) = outcome.to_delete.iter().find(|d| !neighbors.contains(*d)) {
        return Err(ViolationKind::UnknownDeletion(stray.clone()));
    }
    if outcome.to_add.iter().filter(|a| *a == candidate).count() != 1 {
        return Err(ViolationKind::MissingCandidate);
    }

    let mut survivors = neighbors
        .iter()
        .filter(|n| !outcome.to_delete.contains(*n))
        .chain(outcome.to_add.iter())
        .collect::<Vec<_>>();
    survivors.sort_by_key(|i| i.start());

    let mut reach: Option<&Interval> = None;
    for next in survivors {
        if let Some(prev) = reach {
            if prev.start() == next.start() {
                return Err(ViolationKind::DuplicateKey(next.start()));
            }
            if prev.end() > next.start() {
                return Err(ViolationKind::Overlap(prev.clone(), next.clone()));
            }
        }
        if reach.is_none_or(|prev| next.end() >= prev.end()) {
            reach = Some(next);
        }
    }

    Ok(())
}

/// A resolution that would break the non-overlap invariant.
///
/// Carries the full input state so the failure can be reproduced.
#[derive(Debug, thiserror::Error)]
#[error("resolving {candidate} against {} neighbor(s) failed: {kind}", .neighbors.len())]
pub struct InvariantViolation {
    /// The candidate being resolved
    pub candidate: Interval,
    /// The neighbors it was resolved against, sorted and deduplicated
    pub neighbors: Vec<Interval>,
    /// What went wrong
    pub kind: ViolationKind,
}

/// The specific inconsistency detected in a resolution.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ViolationKind {
    /// Two surviving intervals overlap
    #[error("{0} overlaps {1}")]
    Overlap(Interval, Interval),
    /// Two surviving intervals share a natural key
    #[error("two intervals start on {0}")]
    DuplicateKey(Date),
    /// The candidate is missing from the insertions
    #[error("the candidate is not inserted exactly once")]
    MissingCandidate,
    /// A deletion does not correspond to a known neighbor
    #[error("{0} is not a stored neighbor")]
    UnknownDeletion(Interval),
}
