use crate::models::{Interval, IntervalQuery};
use time::Date;

/// Base trait for every storage adapter, fixing the error type they report.
pub trait Repository {
    /// The adapter's native error type
    type Error: std::error::Error + Send + Sync + 'static;
}

/// Locates the stored intervals a candidate must be reconciled against.
pub trait NeighborLocator: Repository {
    /// Return every stored interval whose span overlaps or touches
    /// `candidate`, and at least the immediately preceding and following
    /// intervals by start date.
    ///
    /// The result need not be sorted. An empty result means the candidate can
    /// be inserted without reconciliation.
    fn find_neighbors(
        &self,
        candidate: &Interval,
    ) -> impl Future<Output = Result<Vec<Interval>, Self::Error>> + Send;
}

/// Durable row storage with atomic units of work.
///
/// A unit is opened with [`begin_unit`](RecordStore::begin_unit), receives any
/// number of deletions and insertions, and is then either committed or rolled
/// back as a whole. Nothing written into a unit is visible to other readers
/// before the commit.
pub trait RecordStore: Repository {
    /// An open unit of work
    type Unit: Send;

    /// Open a new unit of work.
    fn begin_unit(&self) -> impl Future<Output = Result<Self::Unit, Self::Error>> + Send;

    /// Re-run the neighbor lookup for `candidate` from inside the unit.
    ///
    /// The orchestrator compares this against the snapshot it resolved with,
    /// so the contract is the same as [`NeighborLocator::find_neighbors`].
    fn find_neighbors_in(
        &self,
        unit: &mut Self::Unit,
        candidate: &Interval,
    ) -> impl Future<Output = Result<Vec<Interval>, Self::Error>> + Send;

    /// Delete the row with the given natural key.
    ///
    /// Deleting a key that does not exist is an error.
    fn delete(
        &self,
        unit: &mut Self::Unit,
        key: Date,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Insert a new row.
    fn insert(
        &self,
        unit: &mut Self::Unit,
        interval: &Interval,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Make the unit's changes durable and visible.
    fn commit(&self, unit: Self::Unit) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Discard every change made in the unit.
    fn rollback(&self, unit: Self::Unit) -> impl Future<Output = ()> + Send;
}

/// Read and maintenance operations over the stored partition.
pub trait IntervalRepository: Repository {
    /// Get the interval with the given natural key, if any.
    fn get_interval(
        &self,
        start: Date,
    ) -> impl Future<Output = Result<Option<Interval>, Self::Error>> + Send;

    /// List every stored interval, ordered by start date.
    fn list_intervals(&self) -> impl Future<Output = Result<Vec<Interval>, Self::Error>> + Send;

    /// List the stored intervals matching `query`, ordered by start date.
    fn query_intervals(
        &self,
        query: &IntervalQuery,
    ) -> impl Future<Output = Result<Vec<Interval>, Self::Error>> + Send;

    /// Delete the interval with the given natural key.
    ///
    /// # Returns
    ///
    /// - Ok(true) if a row was deleted
    /// - Ok(false) if no such row exists
    fn delete_interval(&self, start: Date)
    -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Delete every stored interval, returning the number of rows removed.
    fn clear(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send;
}

/// The "marker" trait for a storage adapter implementing every port.
pub trait PartitionRepository: IntervalRepository + NeighborLocator + RecordStore {}

impl<T: IntervalRepository + NeighborLocator + RecordStore> PartitionRepository for T {}

/// Binds a storage adapter to the rest of an application.
///
/// The HTTP layer is generic over this trait, so an application can carry
/// whatever extra context it needs alongside its repository.
pub trait Application {
    /// The storage adapter
    type Repository: PartitionRepository;

    /// Get a handle to the storage adapter
    fn database(&self) -> &Self::Repository;
}
