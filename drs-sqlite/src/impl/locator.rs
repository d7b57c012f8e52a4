use crate::{
    Db,
    types::{IntervalRow, hydrate},
};
use drs_core::{models::Interval, ports::NeighborLocator};
use sqlx::{Executor, Sqlite};

// Every row overlapping or touching [$1, $2], plus the closest row on either
// side. Dates are stored as ISO-8601 text, so text comparison is calendar order.
const NEIGHBORS: &str = r#"
    select
        date_start, date_end, price
    from
        daterange
    where
        date_start <= $2
    and
        date_end >= $1
    union
    select * from (
        select
            date_start, date_end, price
        from
            daterange
        where
            date_start < $1
        order by
            date_start desc
        limit 1
    )
    union
    select * from (
        select
            date_start, date_end, price
        from
            daterange
        where
            date_start > $2
        order by
            date_start asc
        limit 1
    )
    order by
        date_start
"#;

/// Run the neighbor lookup against any executor, so the same query serves the
/// reader pool and an open unit of work.
pub(crate) async fn neighbors<'e, E>(
    executor: E,
    candidate: &Interval,
) -> Result<Vec<Interval>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, IntervalRow>(NEIGHBORS)
        .bind(candidate.start())
        .bind(candidate.end())
        .fetch_all(executor)
        .await?;
    hydrate(rows)
}

impl NeighborLocator for Db {
    async fn find_neighbors(&self, candidate: &Interval) -> Result<Vec<Interval>, Self::Error> {
        neighbors(&self.reader, candidate).await
    }
}
