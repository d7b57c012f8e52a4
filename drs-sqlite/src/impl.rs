//! Repository trait implementations for the SQLite database.
//!
//! This module contains the implementations of all repository traits defined in
//! `drs-core` for the SQLite database backend.

use crate::Db;
use drs_core::ports::Repository;

mod interval;
mod locator;
mod store;

impl Repository for Db {
    type Error = sqlx::Error;
}
