use crate::{
    Db,
    types::{IntervalRow, hydrate},
};
use drs_core::{
    models::{Interval, IntervalQuery, Operand},
    ports::IntervalRepository,
};
use time::Date;

impl IntervalRepository for Db {
    async fn get_interval(&self, start: Date) -> Result<Option<Interval>, Self::Error> {
        sqlx::query_as::<_, IntervalRow>(
            r#"
            select
                date_start, date_end, price
            from
                daterange
            where
                date_start = $1
            "#,
        )
        .bind(start)
        .fetch_optional(&self.reader)
        .await?
        .map(Interval::try_from)
        .transpose()
    }

    async fn list_intervals(&self) -> Result<Vec<Interval>, Self::Error> {
        let rows = sqlx::query_as::<_, IntervalRow>(
            r#"
            select
                date_start, date_end, price
            from
                daterange
            order by
                date_start
            "#,
        )
        .fetch_all(&self.reader)
        .await?;
        hydrate(rows)
    }

    async fn query_intervals(&self, query: &IntervalQuery) -> Result<Vec<Interval>, Self::Error> {
        let mut query_builder =
            sqlx::QueryBuilder::new("select date_start, date_end, price from daterange where 1 = 1");

        // Column names and operators come from closed enums, so only the
        // operands are ever bound. Prices are stored as text and would compare
        // lexically, so those predicates are applied after hydration instead.
        for predicate in query.predicates() {
            if let Operand::Date(date) = predicate.operand {
                query_builder
                    .push(" and ")
                    .push(predicate.field.column())
                    .push(" ")
                    .push(predicate.op.sql())
                    .push(" ")
                    .push_bind(date);
            }
        }
        query_builder.push(" order by date_start");

        let rows = query_builder
            .build_query_as::<IntervalRow>()
            .fetch_all(&self.reader)
            .await?;

        Ok(hydrate(rows)?
            .into_iter()
            .filter(|interval| query.matches(interval))
            .collect())
    }

    async fn delete_interval(&self, start: Date) -> Result<bool, Self::Error> {
        let result = sqlx::query(
            r#"
            delete from
                daterange
            where
                date_start = $1
            "#,
        )
        .bind(start)
        .execute(&self.writer)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<u64, Self::Error> {
        let result = sqlx::query("delete from daterange")
            .execute(&self.writer)
            .await?;
        Ok(result.rows_affected())
    }
}
