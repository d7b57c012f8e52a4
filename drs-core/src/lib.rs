#![warn(missing_docs)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

/// Core domain models for the daterange service.
///
/// The models are value types: an [`Interval`](models::Interval) is never
/// mutated in place, and every computation produces new values.
pub mod models;

/// Interface traits for the daterange service.
///
/// These are the "ports" of the hexagonal architecture: the contract between
/// the resolver/orchestrator and the storage adapters that back them.
pub mod ports;

/// The partition resolver, a pure function from a candidate and its stored
/// neighbors to a set of deletions and insertions.
pub mod resolver;

/// The commit orchestrator, which drives lookup, resolution and the atomic
/// unit of work against a [`RecordStore`](ports::RecordStore).
pub mod orchestrator;
