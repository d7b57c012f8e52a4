//! Each write runs as a single unit: locate the candidate's neighbors, resolve
//! the replacement set, then apply it atomically. Before applying, the
//! neighbors are looked up again from inside the unit and compared against the
//! snapshot the resolution was computed from, so two writers racing on the
//! same span cannot silently overwrite each other's changes.

use crate::{
    models::{CommitSummary, Interval, ResolutionOutcome, ValidationError},
    ports::{IntervalRepository, NeighborLocator, RecordStore},
    resolver::{self, InvariantViolation},
};
use rustc_hash::FxHasher;
use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};
use time::Date;
use tracing::{Level, event};

/// The lifecycle of a single write.
///
/// `Committed` and `RolledBack` are terminal; no partially applied state is
/// ever exposed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Validated, nothing has happened yet
    Pending,
    /// Looking up neighbors and computing the outcome
    Resolving,
    /// Writing the outcome inside a unit of work
    Applying,
    /// The unit was committed
    Committed,
    /// The unit was discarded
    RolledBack,
}

impl Phase {
    /// Whether the lifecycle permits moving from `self` to `next`.
    pub fn can_advance_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Resolving)
                | (Self::Resolving, Self::Applying)
                | (Self::Resolving, Self::RolledBack)
                | (Self::Applying, Self::Committed)
                | (Self::Applying, Self::RolledBack)
        )
    }

    /// Whether this phase ends the write
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Resolving => "resolving",
            Self::Applying => "applying",
            Self::Committed => "committed",
            Self::RolledBack => "rolled-back",
        };
        f.write_str(name)
    }
}

/// The neighbors a resolution was computed from, with a fingerprint for cheap
/// comparison and logging.
#[derive(Clone, Debug)]
pub struct NeighborSnapshot {
    neighbors: Vec<Interval>,
    fingerprint: u64,
}

impl NeighborSnapshot {
    /// Normalize (sort, deduplicate) and fingerprint a neighbor set.
    pub fn new(mut neighbors: Vec<Interval>) -> Self {
        neighbors.sort_by_key(Interval::start);
        neighbors.dedup();
        let mut hasher = FxHasher::default();
        neighbors.hash(&mut hasher);
        Self {
            fingerprint: hasher.finish(),
            neighbors,
        }
    }

    /// The normalized neighbors
    pub fn neighbors(&self) -> &[Interval] {
        &self.neighbors
    }

    /// A hash of the normalized neighbors
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Whether both snapshots hold exactly the same neighbors.
    ///
    /// The fingerprints are compared first; equal fingerprints are confirmed
    /// against the neighbors themselves, since the hash may collide.
    pub fn matches(&self, other: &NeighborSnapshot) -> bool {
        self.fingerprint == other.fingerprint && self.neighbors == other.neighbors
    }
}

/// A failure at the storage boundary while applying a unit of work.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed for [{}]: {source}", display_keys(.keys))]
pub struct PersistenceError<E: std::error::Error + 'static> {
    /// The store operation that failed
    pub operation: &'static str,
    /// The natural keys the operation was acting on
    pub keys: Vec<Date>,
    /// The underlying storage failure
    #[source]
    pub source: E,
}

fn display_keys(keys: &[Date]) -> String {
    keys.iter()
        .map(Date::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Everything that can go wrong with a write.
///
/// Every variant aborts the write as a whole.
#[derive(Debug, thiserror::Error)]
pub enum WriteError<E: std::error::Error + 'static> {
    /// The candidate was malformed
    #[error("invalid candidate: {0}")]
    Validation(#[from] ValidationError),

    /// An update addressed a key with no stored interval
    #[error("no interval starts on {0}")]
    NotFound(Date),

    /// The neighbor lookup failed
    #[error("neighbor lookup failed: {0}")]
    Lookup(#[source] E),

    /// The resolver refused to produce an inconsistent partition
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// The neighbors changed between resolution and commit
    #[error("the neighbors of {0} changed while the write was in flight")]
    Conflict(Interval),

    /// The unit of work failed and was rolled back
    #[error(transparent)]
    Persistence(#[from] PersistenceError<E>),
}

impl<E: std::error::Error + 'static> WriteError<E> {
    /// Whether repeating the whole write may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Lookup(_) | Self::Conflict(_) | Self::Persistence(_)
        )
    }
}

/// Drives a write from lookup to commit against a storage adapter.
pub struct CommitOrchestrator<'a, R> {
    repository: &'a R,
}

impl<'a, R> CommitOrchestrator<'a, R>
where
    R: NeighborLocator + RecordStore + Sync,
{
    /// Wrap a storage adapter.
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// Reconcile `candidate` into the stored partition.
    pub async fn create(&self, candidate: Interval) -> Result<CommitSummary, WriteError<R::Error>> {
        if candidate.is_empty() {
            return Err(ValidationError::EmptySpan(candidate.start()).into());
        }

        let mut phase = Phase::Pending;
        advance(&mut phase, Phase::Resolving, &candidate);
        let (snapshot, outcome) = match self.resolve(&candidate).await {
            Ok(resolved) => resolved,
            Err(err) => {
                advance(&mut phase, Phase::RolledBack, &candidate);
                return Err(err);
            }
        };

        if outcome.is_insert_only() {
            event!(Level::DEBUG, candidate = %candidate, "nothing to reconcile, inserting as-is");
        }

        advance(&mut phase, Phase::Applying, &candidate);
        let result = self.apply(&candidate, &snapshot, outcome).await;
        let terminal = if result.is_ok() {
            Phase::Committed
        } else {
            Phase::RolledBack
        };
        advance(&mut phase, terminal, &candidate);
        result
    }

    /// Look up the candidate's neighbors and compute the replacement set.
    pub async fn resolve(
        &self,
        candidate: &Interval,
    ) -> Result<(NeighborSnapshot, ResolutionOutcome), WriteError<R::Error>> {
        let neighbors = self
            .repository
            .find_neighbors(candidate)
            .await
            .map_err(WriteError::Lookup)?;
        let snapshot = NeighborSnapshot::new(neighbors);
        let outcome = resolver::resolve(candidate, snapshot.neighbors())?;
        Ok((snapshot, outcome))
    }

    /// Apply a resolved outcome inside one unit of work.
    ///
    /// The unit first re-validates `snapshot`, then deletes every superseded
    /// row by key and inserts every new row. Any failure rolls the whole unit
    /// back.
    pub async fn apply(
        &self,
        candidate: &Interval,
        snapshot: &NeighborSnapshot,
        outcome: ResolutionOutcome,
    ) -> Result<CommitSummary, WriteError<R::Error>> {
        let mut unit = self
            .repository
            .begin_unit()
            .await
            .map_err(|source| PersistenceError {
                operation: "begin",
                keys: vec![candidate.start()],
                source,
            })?;

        if let Err(err) = self.stage(&mut unit, candidate, snapshot, &outcome).await {
            self.repository.rollback(unit).await;
            event!(
                Level::WARN,
                candidate = %candidate,
                err = err.to_string(),
                "unit of work rolled back"
            );
            return Err(err);
        }

        self.repository
            .commit(unit)
            .await
            .map_err(|source| PersistenceError {
                operation: "commit",
                keys: outcome.added_keys(),
                source,
            })?;

        let summary = CommitSummary {
            deleted: outcome.to_delete().len(),
            added: outcome.to_add().len(),
        };
        event!(
            Level::INFO,
            candidate = %candidate,
            deleted = summary.deleted,
            added = summary.added,
            "unit of work committed"
        );
        Ok(summary)
    }

    async fn stage(
        &self,
        unit: &mut R::Unit,
        candidate: &Interval,
        snapshot: &NeighborSnapshot,
        outcome: &ResolutionOutcome,
    ) -> Result<(), WriteError<R::Error>> {
        let current = self
            .repository
            .find_neighbors_in(unit, candidate)
            .await
            .map_err(|source| PersistenceError {
                operation: "revalidate",
                keys: vec![candidate.start()],
                source,
            })?;
        let current = NeighborSnapshot::new(current);
        if !snapshot.matches(&current) {
            event!(
                Level::DEBUG,
                candidate = %candidate,
                resolved = snapshot.fingerprint(),
                current = current.fingerprint(),
                "neighbors changed since resolution"
            );
            return Err(WriteError::Conflict(candidate.clone()));
        }

        for interval in outcome.to_delete() {
            self.repository
                .delete(unit, interval.start())
                .await
                .map_err(|source| PersistenceError {
                    operation: "delete",
                    keys: vec![interval.start()],
                    source,
                })?;
        }

        for interval in outcome.to_add() {
            self.repository
                .insert(unit, interval)
                .await
                .map_err(|source| PersistenceError {
                    operation: "insert",
                    keys: vec![interval.start()],
                    source,
                })?;
        }

        Ok(())
    }
}

impl<'a, R> CommitOrchestrator<'a, R>
where
    R: IntervalRepository + NeighborLocator + RecordStore + Sync,
{
    /// Replace the interval stored under `key` with `candidate`, reconciling
    /// the neighbors exactly as [`create`](Self::create) does.
    ///
    /// The key must match the candidate's start and must already exist.
    pub async fn update(
        &self,
        key: Date,
        candidate: Interval,
    ) -> Result<CommitSummary, WriteError<R::Error>> {
        if key != candidate.start() {
            return Err(ValidationError::KeyMismatch {
                path: key,
                payload: candidate.start(),
            }
            .into());
        }

        let existing = self
            .repository
            .get_interval(key)
            .await
            .map_err(WriteError::Lookup)?;
        if existing.is_none() {
            return Err(WriteError::NotFound(key));
        }

        self.create(candidate).await
    }
}

fn advance(phase: &mut Phase, next: Phase, candidate: &Interval) {
    debug_assert!(
        phase.can_advance_to(next),
        "invalid transition {phase} -> {next}"
    );
    event!(Level::DEBUG, candidate = %candidate, from = %phase, to = %next, "write phase");
    *phase = next;
}
