use super::locator::neighbors;
use crate::Db;
use drs_core::{models::Interval, ports::RecordStore};
use time::Date;
use tracing::{Level, event};

impl RecordStore for Db {
    type Unit = sqlx::Transaction<'static, sqlx::Sqlite>;

    async fn begin_unit(&self) -> Result<Self::Unit, Self::Error> {
        self.writer.begin().await
    }

    async fn find_neighbors_in(
        &self,
        unit: &mut Self::Unit,
        candidate: &Interval,
    ) -> Result<Vec<Interval>, Self::Error> {
        neighbors(&mut **unit, candidate).await
    }

    async fn delete(&self, unit: &mut Self::Unit, key: Date) -> Result<(), Self::Error> {
        let result = sqlx::query(
            r#"
            delete from
                daterange
            where
                date_start = $1
            "#,
        )
        .bind(key)
        .execute(&mut **unit)
        .await?;

        if result.rows_affected() == 0 {
            Err(sqlx::Error::RowNotFound)
        } else {
            Ok(())
        }
    }

    async fn insert(&self, unit: &mut Self::Unit, interval: &Interval) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            insert into
                daterange (date_start, date_end, price)
            values
                ($1, $2, $3)
            "#,
        )
        .bind(interval.start())
        .bind(interval.end())
        .bind(interval.price().to_string())
        .execute(&mut **unit)
        .await?;
        Ok(())
    }

    async fn commit(&self, unit: Self::Unit) -> Result<(), Self::Error> {
        unit.commit().await
    }

    async fn rollback(&self, unit: Self::Unit) {
        if let Err(err) = unit.rollback().await {
            // the transaction is discarded when the connection returns to the pool regardless
            event!(Level::ERROR, err = err.to_string(), "rollback failed");
        }
    }
}
