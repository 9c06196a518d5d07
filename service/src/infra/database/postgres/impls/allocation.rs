//! [`Allocation`]-related [`Database`] implementations.

use common::{
    money::Currency,
    operations::{By, Delete, Insert, Select, Update},
    Money,
};
use rust_decimal::Decimal;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{allocation, contract, sheep, Allocation},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::contract::{Active, Allocated},
};

/// Maps a row of the `contract_sheep` table into an [`Allocation`].
fn from_row(row: &Row) -> Allocation {
    let currency: Currency = row.get("currency");
    let disposition = match row.get("status") {
        allocation::Status::Active => None,
        allocation::Status::Sold => Some(allocation::Disposition::Sold {
            price: Money {
                amount: row.get("sale_price"),
                currency,
            },
            at: row.get("disposed_at"),
        }),
        allocation::Status::Deceased => {
            Some(allocation::Disposition::Deceased {
                at: row.get("disposed_at"),
            })
        }
    };
    Allocation {
        id: row.get("id"),
        contract_id: row.get("contract_id"),
        sheep_id: row.get("sheep_id"),
        purchase_price: Money {
            amount: row.get("purchase_price"),
            currency,
        },
        origin: row.get("origin"),
        allocated_at: row.get("allocated_at"),
        disposition,
    }
}

impl<C> Database<Select<By<Vec<Allocated>, contract::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Allocated>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Allocated>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let contract_id: contract::Id = by.into_inner();

        const SQL: &str = "\
            SELECT cs.id, cs.contract_id, cs.sheep_id, \
                   cs.purchase_price, cs.currency, cs.origin, \
                   cs.allocated_at, cs.status, \
                   cs.sale_price, cs.disposed_at, \
                   s.market_value, s.market_value_currency \
            FROM contract_sheep AS cs \
            INNER JOIN sheep AS s ON s.id = cs.sheep_id \
            WHERE cs.contract_id = $1::UUID \
            ORDER BY cs.allocated_at, cs.id";
        Ok(self
            .query(SQL, &[&contract_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| Allocated {
                allocation: from_row(row),
                market_value: row
                    .get::<_, Option<Decimal>>("market_value")
                    .map(|amount| Money {
                        amount,
                        currency: row.get("market_value_currency"),
                    }),
            })
            .collect())
    }
}

impl<C> Database<Select<By<Option<Active<Allocation>>, sheep::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Active<Allocation>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Allocation>>, sheep::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let sheep_id: sheep::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, contract_id, sheep_id, \
                   purchase_price, currency, origin, \
                   allocated_at, status, \
                   sale_price, disposed_at \
            FROM contract_sheep \
            WHERE sheep_id = $1::UUID \
              AND status = $2::INT2";
        Ok(self
            .query_opt(SQL, &[&sheep_id, &allocation::Status::Active])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row)
            .map(Active))
    }
}

impl<C> Database<Insert<Allocation>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(allocation): Insert<Allocation>,
    ) -> Result<Self::Ok, Self::Err> {
        let status = allocation.status();
        let sale_price = allocation.sale_price().map(|p| p.amount);
        let disposed_at = allocation.disposition.as_ref().map(|d| d.at());
        let Allocation {
            id,
            contract_id,
            sheep_id,
            purchase_price,
            origin,
            allocated_at,
            disposition: _,
        } = allocation;

        const SQL: &str = "\
            INSERT INTO contract_sheep (\
                id, contract_id, sheep_id, \
                purchase_price, currency, origin, \
                allocated_at, status, \
                sale_price, disposed_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::NUMERIC, $5::INT2, $6::INT2, \
                $7::TIMESTAMPTZ, $8::INT2, \
                $9::NUMERIC, $10::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &contract_id,
                &sheep_id,
                &purchase_price.amount,
                &purchase_price.currency,
                &origin,
                &allocated_at,
                &status,
                &sale_price,
                &disposed_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Allocation>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(allocation): Update<Allocation>,
    ) -> Result<Self::Ok, Self::Err> {
        let status = allocation.status();
        let sale_price = allocation.sale_price().map(|p| p.amount);
        let disposed_at = allocation.disposition.as_ref().map(|d| d.at());

        // Only the disposition of an `Allocation` is mutable.
        const SQL: &str = "\
            UPDATE contract_sheep \
            SET status = $2::INT2, \
                sale_price = $3::NUMERIC, \
                disposed_at = $4::TIMESTAMPTZ \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&allocation.id, &status, &sale_price, &disposed_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Delete<By<Allocation, allocation::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Allocation, allocation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: allocation::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM contract_sheep \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
