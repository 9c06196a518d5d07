//! [`Investor`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{investor, Investor},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Maps a row of the `investors` table into an [`Investor`].
fn from_row(row: &Row) -> Investor {
    Investor {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Investor>, investor::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Investor>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Investor>, investor::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: investor::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, created_at \
            FROM investors \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Investor>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(investor): Insert<Investor>,
    ) -> Result<Self::Ok, Self::Err> {
        let Investor {
            id,
            name,
            created_at,
        } = investor;

        const SQL: &str = "\
            INSERT INTO investors (id, name, created_at) \
            VALUES ($1::UUID, $2::VARCHAR, $3::TIMESTAMPTZ)";
        self.exec(SQL, &[&id, &name, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
