//! [`Contract`]-related [`Database`] implementations.

use common::{
    money::Currency,
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use rust_decimal::Decimal;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{contract, investor, Contract},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of the `contracts` table read by [`from_row()`].
macro_rules! columns {
    () => {
        "id, investor_id, \
         investment, currency, profit_share, \
         duration_months, start_date, created_at, \
         status, closed_at, notes, \
         total_revenue, total_expenses, investor_profit, actual_roi"
    };
}

/// Maps a row of the `contracts` table into a [`Contract`].
fn from_row(row: &Row) -> Contract {
    let currency: Currency = row.get("currency");
    let money = |column: &str| Money {
        amount: row.get::<_, Decimal>(column),
        currency,
    };
    let state = match row.get("status") {
        contract::Status::Active => contract::State::Active,
        contract::Status::Completed => {
            contract::State::Completed(contract::Settlement {
                settled_at: row.get("closed_at"),
                total_revenue: money("total_revenue"),
                total_expenses: money("total_expenses"),
                investor_profit: money("investor_profit"),
                actual_roi: row.get("actual_roi"),
                notes: row.get("notes"),
            })
        }
        contract::Status::Cancelled => {
            contract::State::Cancelled(contract::Cancellation {
                cancelled_at: row.get("closed_at"),
                notes: row.get("notes"),
            })
        }
    };
    Contract {
        id: row.get("id"),
        investor_id: row.get("investor_id"),
        investment: money("investment"),
        profit_share: row.get("profit_share"),
        duration: row.get("duration_months"),
        start_date: row.get("start_date"),
        created_at: row.get("created_at"),
        state,
    }
}

impl<C> Database<Select<By<Option<Contract>, contract::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: contract::Id = by.into_inner();

        const SQL: &str = concat!(
            "SELECT ",
            columns!(),
            " FROM contracts \
              WHERE id = $1::UUID",
        );
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Contract>, investor::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, investor::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let investor_id: investor::Id = by.into_inner();

        const SQL: &str = concat!(
            "SELECT ",
            columns!(),
            " FROM contracts \
              WHERE investor_id = $1::UUID \
              ORDER BY created_at, id",
        );
        Ok(self
            .query(SQL, &[&investor_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Contract>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        let status = contract.status();
        let Contract {
            id,
            investor_id,
            investment,
            profit_share,
            duration,
            start_date,
            created_at,
            state: _,
        } = contract;

        const SQL: &str = "\
            INSERT INTO contracts (\
                id, investor_id, \
                investment, currency, profit_share, \
                duration_months, start_date, created_at, \
                status\
            ) VALUES (\
                $1::UUID, $2::UUID, \
                $3::NUMERIC, $4::INT2, $5::NUMERIC, \
                $6::INT2, $7::DATE, $8::TIMESTAMPTZ, \
                $9::INT2\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &investor_id,
                &investment.amount,
                &investment.currency,
                &profit_share,
                &duration,
                &start_date,
                &created_at,
                &status,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<contract::Transition>> for Postgres<C>
where
    C: Connection,
{
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transition): Update<contract::Transition>,
    ) -> Result<Self::Ok, Self::Err> {
        let contract::Transition { id, outcome } = transition;

        const SQL: &str = "\
            UPDATE contracts \
            SET status = $2::INT2, \
                closed_at = $3::TIMESTAMPTZ, \
                notes = $4::VARCHAR, \
                total_revenue = $5::NUMERIC, \
                total_expenses = $6::NUMERIC, \
                investor_profit = $7::NUMERIC, \
                actual_roi = $8::NUMERIC \
            WHERE id = $1::UUID \
              AND status = $9::INT2";
        let updated = match outcome {
            contract::Outcome::Completed(s) => {
                self.exec(
                    SQL,
                    &[
                        &id,
                        &contract::Status::Completed,
                        &s.settled_at,
                        &s.notes,
                        &Some(s.total_revenue.amount),
                        &Some(s.total_expenses.amount),
                        &Some(s.investor_profit.amount),
                        &Some(s.actual_roi),
                        &contract::Status::Active,
                    ],
                )
                .await
            }
            contract::Outcome::Cancelled(c) => {
                self.exec(
                    SQL,
                    &[
                        &id,
                        &contract::Status::Cancelled,
                        &c.cancelled_at,
                        &c.notes,
                        &None::<Decimal>,
                        &None::<Decimal>,
                        &None::<Decimal>,
                        &None::<contract::Roi>,
                        &contract::Status::Active,
                    ],
                )
                .await
            }
        }
        .map_err(tracerr::wrap!())?;
        Ok(updated == 1)
    }
}

impl<C> Database<Lock<By<Contract, contract::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Contract, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: contract::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM contracts \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
