//! [`Command`] for selling a [`Sheep`] held by a [`Contract`].

use common::{
    money::Currency,
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{allocation, contract, sheep, Allocation, Contract, Sheep},
    error::{self, Classify},
    infra::{database, Database},
    read::contract::Active,
    Service,
};

use super::Command;

/// [`Command`] for selling a [`Sheep`] actively held by a [`Contract`].
///
/// The sale proceeds are accounted as a revenue of the [`Contract`].
#[derive(Clone, Copy, Debug)]
pub struct SellSheep {
    /// ID of the [`Contract`] holding the [`Sheep`].
    pub contract_id: contract::Id,

    /// ID of the [`Sheep`] to be sold.
    pub sheep_id: sheep::Id,

    /// Sale proceeds.
    pub price: Money,
}

impl<Db> Command<SellSheep> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Contract, contract::Id>>,
            Err = Traced<database::Error>,
        > + Database<Lock<By<Sheep, sheep::Id>>, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Sheep>, sheep::Id>>,
            Ok = Option<Sheep>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Active<Allocation>>, sheep::Id>>,
            Ok = Option<Active<Allocation>>,
            Err = Traced<database::Error>,
        > + Database<Update<Allocation>, Err = Traced<database::Error>>
        + Database<Update<Sheep>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Allocation;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SellSheep) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SellSheep {
            contract_id,
            sheep_id,
            price,
        } = cmd;

        if !price.is_positive() {
            return Err(tracerr::new!(E::NonPositivePrice(price)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Serialize with other ledger writes and the settlement.
        tx.execute(Lock(By::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let contract = tx
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;

        let currency = contract.investment.currency;
        if price.currency != currency {
            return Err(tracerr::new!(E::CurrencyMismatch {
                expected: currency,
                actual: price.currency,
            }));
        }
        if !contract.is_active() {
            return Err(tracerr::new!(E::ContractNotActive(contract_id)));
        }

        tx.execute(Lock(By::new(sheep_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut sheep = tx
            .execute(Select(By::<Option<Sheep>, _>::new(sheep_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SheepNotExists(sheep_id))
            .map_err(tracerr::wrap!())?;

        let Active(mut allocation) = tx
            .execute(Select(By::<Option<Active<Allocation>>, _>::new(
                sheep_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|Active(a)| a.contract_id == contract_id)
            .ok_or(E::SheepNotAllocated(sheep_id))
            .map_err(tracerr::wrap!())?;

        allocation.disposition = Some(allocation::Disposition::Sold {
            price,
            at: DateTime::now().coerce(),
        });
        sheep.status = sheep::Status::Sold;

        tx.execute(Update(allocation.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Update(sheep))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Sheep(id: {sheep_id})` of `Contract(id: {contract_id})` sold \
             for {price}",
        );
        Ok(allocation)
    }
}

/// Error of [`SellSheep`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] is not active anymore.
    #[display("`Contract(id: {_0})` is not active")]
    ContractNotActive(#[error(not(source))] contract::Id),

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// Sale price is in a [`Currency`] other than the [`Contract`]'s one.
    #[display("expected `{expected}` currency, got `{actual}`")]
    CurrencyMismatch {
        /// [`Currency`] of the [`Contract`].
        expected: Currency,

        /// Provided [`Currency`].
        actual: Currency,
    },

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided sale price is not positive.
    #[display("sale price `{_0}` is not positive")]
    NonPositivePrice(#[error(not(source))] Money),

    /// [`Sheep`] is not actively allocated to the [`Contract`].
    #[display("`Sheep(id: {_0})` is not allocated to the `Contract`")]
    SheepNotAllocated(#[error(not(source))] sheep::Id),

    /// [`Sheep`] with the provided ID does not exist.
    #[display("`Sheep(id: {_0})` does not exist")]
    SheepNotExists(#[error(not(source))] sheep::Id),
}

impl Classify for ExecutionError {
    fn kind(&self) -> error::Kind {
        match self {
            Self::ContractNotActive(_) | Self::SheepNotAllocated(_) => {
                error::Kind::InvalidState
            }
            Self::ContractNotExists(_) | Self::SheepNotExists(_) => {
                error::Kind::NotFound
            }
            Self::CurrencyMismatch { .. } | Self::NonPositivePrice(_) => {
                error::Kind::Validation
            }
            Self::Db(e) => e.kind(),
        }
    }
}
