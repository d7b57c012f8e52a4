#![allow(dead_code)]

use drs_core::{models::Interval, orchestrator::CommitOrchestrator, ports::Application};
use drs_sqlite::{Db, config::SqliteConfig};

pub struct TestApp(pub Db);

impl Application for TestApp {
    type Repository = Db;

    fn database(&self) -> &Self::Repository {
        &self.0
    }
}

/// A fresh in-memory database
pub async fn app() -> anyhow::Result<TestApp> {
    Ok(TestApp(Db::open(&SqliteConfig::default()).await?))
}

/// Write each interval in order through the orchestrator
pub async fn seed(db: &Db, rows: impl IntoIterator<Item = Interval>) -> anyhow::Result<()> {
    let orchestrator = CommitOrchestrator::new(db);
    for row in rows {
        orchestrator.create(row).await?;
    }
    Ok(())
}

pub fn iv(start: &str, end: &str, price: &str) -> Interval {
    Interval::parse(start, end, price).unwrap()
}
