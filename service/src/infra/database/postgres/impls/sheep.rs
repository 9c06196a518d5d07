//! [`Sheep`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{allocation, sheep, Sheep},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Maps a row of the `sheep` table into a [`Sheep`].
fn from_row(row: &Row) -> Sheep {
    Sheep {
        id: row.get("id"),
        tag: row.get("tag"),
        health: row.get("health"),
        status: row.get("status"),
        market_value: row.get::<_, Option<_>>("market_value").map(|amount| {
            Money {
                amount,
                currency: row.get("market_value_currency"),
            }
        }),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Sheep>, sheep::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Sheep>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Sheep>, sheep::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: sheep::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, tag, health, status, \
                   market_value, market_value_currency, \
                   created_at \
            FROM sheep \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Sheep>, read::sheep::Available>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Sheep>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Sheep>, read::sheep::Available>>,
    ) -> Result<Self::Ok, Self::Err> {
        const SQL: &str = "\
            SELECT s.id, s.tag, s.health, s.status, \
                   s.market_value, s.market_value_currency, \
                   s.created_at \
            FROM sheep AS s \
            WHERE s.status = $1::INT2 \
              AND s.health = $2::INT2 \
              AND NOT EXISTS (\
                  SELECT 1 \
                  FROM contract_sheep AS cs \
                  WHERE cs.sheep_id = s.id \
                    AND cs.status = $3::INT2\
              ) \
            ORDER BY s.tag";
        Ok(self
            .query(
                SQL,
                &[
                    &sheep::Status::InStock,
                    &sheep::Health::Healthy,
                    &allocation::Status::Active,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Sheep>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sheep): Insert<Sheep>,
    ) -> Result<Self::Ok, Self::Err> {
        let Sheep {
            id,
            tag,
            health,
            status,
            market_value,
            created_at,
        } = sheep;

        const SQL: &str = "\
            INSERT INTO sheep (\
                id, tag, health, status, \
                market_value, market_value_currency, \
                created_at\
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::INT2, $4::INT2, \
                $5::NUMERIC, $6::INT2, \
                $7::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &tag,
                &health,
                &status,
                &market_value.map(|v| v.amount),
                &market_value.map(|v| v.currency),
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Sheep>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(sheep): Update<Sheep>,
    ) -> Result<Self::Ok, Self::Err> {
        let Sheep {
            id,
            tag,
            health,
            status,
            market_value,
            created_at: _,
        } = sheep;

        const SQL: &str = "\
            UPDATE sheep \
            SET tag = $2::VARCHAR, \
                health = $3::INT2, \
                status = $4::INT2, \
                market_value = $5::NUMERIC, \
                market_value_currency = $6::INT2 \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[
                &id,
                &tag,
                &health,
                &status,
                &market_value.map(|v| v.amount),
                &market_value.map(|v| v.currency),
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Sheep, sheep::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Sheep, sheep::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: sheep::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM sheep \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
