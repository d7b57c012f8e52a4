//! The concrete application served by the binary.

use drs_core::ports::Application;
use drs_sqlite::Db;

/// Binds the SQLite backend to the HTTP layer.
#[derive(Clone)]
pub struct ServerApp {
    /// The database handle
    pub db: Db,
}

impl Application for ServerApp {
    type Repository = Db;

    fn database(&self) -> &Self::Repository {
        &self.db
    }
}
