//! [`Command`] for allocating a [`Sheep`] to a [`Contract`].

use common::{
    money::Currency,
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{allocation, contract, sheep, Allocation, Contract, Sheep},
    error::{self, Classify},
    infra::{
        database::{self, constraint},
        Database,
    },
    read::contract::Active,
    Service,
};

use super::Command;

/// [`Command`] for allocating an available [`Sheep`] to an active
/// [`Contract`].
#[derive(Clone, Copy, Debug)]
pub struct AllocateSheep {
    /// ID of the [`Contract`] to allocate the [`Sheep`] to.
    pub contract_id: contract::Id,

    /// ID of the [`Sheep`] to be allocated.
    pub sheep_id: sheep::Id,

    /// Price the [`Sheep`] is purchased for.
    pub purchase_price: Money,

    /// [`allocation::Origin`] of the [`Sheep`].
    pub origin: allocation::Origin,
}

impl<Db> Command<AllocateSheep> for Service<Db>
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
        > + Database<Insert<Allocation>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Allocation;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AllocateSheep) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AllocateSheep {
            contract_id,
            sheep_id,
            purchase_price,
            origin,
        } = cmd;

        if purchase_price.is_negative() {
            return Err(tracerr::new!(E::NegativePurchasePrice(
                purchase_price
            )));
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
        if purchase_price.currency != currency {
            return Err(tracerr::new!(E::CurrencyMismatch {
                expected: currency,
                actual: purchase_price.currency,
            }));
        }
        if !contract.is_active() {
            return Err(tracerr::new!(E::ContractNotActive(contract_id)));
        }

        tx.execute(Lock(By::new(sheep_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let sheep = tx
            .execute(Select(By::<Option<Sheep>, _>::new(sheep_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SheepNotExists(sheep_id))
            .map_err(tracerr::wrap!())?;
        if !sheep.is_allocatable() {
            return Err(tracerr::new!(E::SheepNotAllocatable(sheep_id)));
        }

        let allocated = tx
            .execute(Select(By::<Option<Active<Allocation>>, _>::new(
                sheep_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if let Some(Active(a)) = allocated {
            log::warn!(
                "`Sheep(id: {sheep_id})` is held by `Contract(id: {})` \
                 already",
                a.contract_id,
            );
            return Err(tracerr::new!(E::SheepAlreadyAllocated(sheep_id)));
        }

        let allocation = Allocation {
            id: allocation::Id::new(),
            contract_id,
            sheep_id,
            purchase_price,
            origin,
            allocated_at: DateTime::now().coerce(),
            disposition: None,
        };

        let res = tx.execute(Insert(allocation.clone())).await;
        if let Err(e) = &res {
            if e.as_ref()
                .is_unique_violation(Some(constraint::ACTIVE_ALLOCATION))
            {
                log::warn!(
                    "`Sheep(id: {sheep_id})` was allocated concurrently",
                );
                return Err(tracerr::new!(E::SheepAlreadyAllocated(sheep_id)));
            }
        }
        res.map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Sheep(id: {sheep_id})` allocated to `Contract(id: {contract_id})` \
             for {purchase_price}",
        );
        Ok(allocation)
    }
}

/// Error of [`AllocateSheep`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] is not active anymore.
    #[display("`Contract(id: {_0})` is not active")]
    ContractNotActive(#[error(not(source))] contract::Id),

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// Purchase price is in a [`Currency`] other than the [`Contract`]'s
    /// one.
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

    /// Provided purchase price is negative.
    #[display("purchase price `{_0}` is negative")]
    NegativePurchasePrice(#[error(not(source))] Money),

    /// [`Sheep`] is actively allocated to some [`Contract`] already.
    #[display("`Sheep(id: {_0})` is allocated already")]
    SheepAlreadyAllocated(#[error(not(source))] sheep::Id),

    /// [`Sheep`] is not in stock or not healthy.
    #[display("`Sheep(id: {_0})` cannot be allocated")]
    SheepNotAllocatable(#[error(not(source))] sheep::Id),

    /// [`Sheep`] with the provided ID does not exist.
    #[display("`Sheep(id: {_0})` does not exist")]
    SheepNotExists(#[error(not(source))] sheep::Id),
}

impl Classify for ExecutionError {
    fn kind(&self) -> error::Kind {
        match self {
            Self::ContractNotActive(_) | Self::SheepNotAllocatable(_) => {
                error::Kind::InvalidState
            }
            Self::ContractNotExists(_) | Self::SheepNotExists(_) => {
                error::Kind::NotFound
            }
            Self::CurrencyMismatch { .. } | Self::NegativePurchasePrice(_) => {
                error::Kind::Validation
            }
            Self::Db(e) => e.kind(),
            Self::SheepAlreadyAllocated(_) => error::Kind::Conflict,
        }
    }
}
