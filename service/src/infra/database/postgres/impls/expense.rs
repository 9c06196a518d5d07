//! [`Expense`]-related [`Database`] implementations.

use common::{
    operations::{By, Delete, Insert, Select},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{contract, expense, Expense},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Maps a row of the `contract_expenses` table into an [`Expense`].
fn from_row(row: &Row) -> Expense {
    Expense {
        id: row.get("id"),
        contract_id: row.get("contract_id"),
        category: row.get("category"),
        description: row.get("description"),
        amount: Money {
            amount: row.get("amount"),
            currency: row.get("currency"),
        },
        spent_on: row.get("spent_on"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Vec<Expense>, contract::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Expense>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Expense>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let contract_id: contract::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, contract_id, category, description, \
                   amount, currency, spent_on, created_at \
            FROM contract_expenses \
            WHERE contract_id = $1::UUID \
            ORDER BY spent_on, created_at, id";
        Ok(self
            .query(SQL, &[&contract_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Option<Expense>, expense::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Expense>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Expense>, expense::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: expense::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, contract_id, category, description, \
                   amount, currency, spent_on, created_at \
            FROM contract_expenses \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Expense>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(expense): Insert<Expense>,
    ) -> Result<Self::Ok, Self::Err> {
        let Expense {
            id,
            contract_id,
            category,
            description,
            amount,
            spent_on,
            created_at,
        } = expense;

        const SQL: &str = "\
            INSERT INTO contract_expenses (\
                id, contract_id, category, description, \
                amount, currency, spent_on, created_at\
            ) VALUES (\
                $1::UUID, $2::UUID, $3::INT2, $4::VARCHAR, \
                $5::NUMERIC, $6::INT2, $7::DATE, $8::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &contract_id,
                &category,
                &description,
                &amount.amount,
                &amount.currency,
                &spent_on,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Delete<By<Expense, expense::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Expense, expense::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: expense::Id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM contract_expenses \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
