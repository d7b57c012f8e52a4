#![allow(dead_code)]

use drs_core::{
    models::{Interval, IntervalQuery},
    ports::{IntervalRepository, NeighborLocator, RecordStore, Repository},
};
use rust_decimal::Decimal;
use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};
use time::Date;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("injected failure for {0}")]
    Injected(Date),
    #[error("no row starting {0}")]
    Missing(Date),
    #[error("a row already starts {0}")]
    Duplicate(Date),
    #[error("store unavailable")]
    Unavailable,
}

/// An in-memory partition with failure injection, standing in for a database.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<BTreeMap<Date, Interval>>,
    fail_insert: Mutex<Option<Date>>,
    fail_lookup: AtomicBool,
    sneak_in: Mutex<Option<Interval>>,
}

pub struct Unit {
    staged: BTreeMap<Date, Interval>,
}

impl MemoryStore {
    pub fn with_rows(rows: impl IntoIterator<Item = Interval>) -> Self {
        let store = Self::default();
        store
            .rows
            .lock()
            .unwrap()
            .extend(rows.into_iter().map(|i| (i.start(), i)));
        store
    }

    pub fn rows(&self) -> Vec<Interval> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    /// Make the next insert of `key` fail
    pub fn fail_insert_of(&self, key: Date) {
        *self.fail_insert.lock().unwrap() = Some(key);
    }

    pub fn fail_lookups(&self) {
        self.fail_lookup.store(true, Ordering::SeqCst);
    }

    /// Simulate a concurrent writer committing `interval` right before the
    /// next unit of work begins
    pub fn sneak_in(&self, interval: Interval) {
        *self.sneak_in.lock().unwrap() = Some(interval);
    }
}

fn neighbors_of(rows: &BTreeMap<Date, Interval>, candidate: &Interval) -> Vec<Interval> {
    let mut found: Vec<Interval> = rows
        .values()
        .filter(|row| row.start() <= candidate.end() && row.end() >= candidate.start())
        .cloned()
        .collect();
    if let Some(prev) = rows.range(..candidate.start()).next_back() {
        found.push(prev.1.clone());
    }
    if let Some(next) = rows
        .range(candidate.end()..)
        .find(|(start, _)| **start > candidate.end())
    {
        found.push(next.1.clone());
    }
    found
}

impl Repository for MemoryStore {
    type Error = StoreError;
}

impl NeighborLocator for MemoryStore {
    async fn find_neighbors(&self, candidate: &Interval) -> Result<Vec<Interval>, StoreError> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(neighbors_of(&self.rows.lock().unwrap(), candidate))
    }
}

impl RecordStore for MemoryStore {
    type Unit = Unit;

    async fn begin_unit(&self) -> Result<Unit, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(interval) = self.sneak_in.lock().unwrap().take() {
            rows.insert(interval.start(), interval);
        }
        Ok(Unit {
            staged: rows.clone(),
        })
    }

    async fn find_neighbors_in(
        &self,
        unit: &mut Unit,
        candidate: &Interval,
    ) -> Result<Vec<Interval>, StoreError> {
        Ok(neighbors_of(&unit.staged, candidate))
    }

    async fn delete(&self, unit: &mut Unit, key: Date) -> Result<(), StoreError> {
        unit.staged
            .remove(&key)
            .map(|_| ())
            .ok_or(StoreError::Missing(key))
    }

    async fn insert(&self, unit: &mut Unit, interval: &Interval) -> Result<(), StoreError> {
        if self.fail_insert.lock().unwrap().take_if(|k| *k == interval.start()).is_some() {
            return Err(StoreError::Injected(interval.start()));
        }
        if unit.staged.contains_key(&interval.start()) {
            return Err(StoreError::Duplicate(interval.start()));
        }
        unit.staged.insert(interval.start(), interval.clone());
        Ok(())
    }

    async fn commit(&self, unit: Unit) -> Result<(), StoreError> {
        *self.rows.lock().unwrap() = unit.staged;
        Ok(())
    }

    async fn rollback(&self, _unit: Unit) {}
}

impl IntervalRepository for MemoryStore {
    async fn get_interval(&self, start: Date) -> Result<Option<Interval>, StoreError> {
        Ok(self.rows.lock().unwrap().get(&start).cloned())
    }

    async fn list_intervals(&self) -> Result<Vec<Interval>, StoreError> {
        Ok(self.rows())
    }

    async fn query_intervals(&self, query: &IntervalQuery) -> Result<Vec<Interval>, StoreError> {
        Ok(self.rows().into_iter().filter(|i| query.matches(i)).collect())
    }

    async fn delete_interval(&self, start: Date) -> Result<bool, StoreError> {
        Ok(self.rows.lock().unwrap().remove(&start).is_some())
    }

    async fn clear(&self) -> Result<u64, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let n = rows.len() as u64;
        rows.clear();
        Ok(n)
    }
}

pub fn iv(start: &str, end: &str, price: &str) -> Interval {
    Interval::parse(start, end, price).unwrap()
}

/// The price governing `day`, if any stored interval owns it
pub fn price_on(rows: &[Interval], day: Date) -> Option<Decimal> {
    rows.iter()
        .find(|i| i.start() <= day && day < i.end())
        .map(Interval::price)
}

/// Panics if any two rows overlap
pub fn assert_partition(rows: &[Interval]) {
    for (i, a) in rows.iter().enumerate() {
        for b in rows.iter().skip(i + 1) {
            assert!(!a.overlaps(b), "{a} overlaps {b}");
        }
    }
}
