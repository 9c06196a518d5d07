//! [`Command`] for deallocating a [`Sheep`] from a [`Contract`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
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

/// [`Command`] for deallocating a [`Sheep`] actively held by a [`Contract`].
///
/// The [`Allocation`] is removed entirely. Disposed [`Allocation`]s cannot be
/// deallocated, since they feed the revenue and headcount of the
/// [`Contract`].
#[derive(Clone, Copy, Debug)]
pub struct DeallocateSheep {
    /// ID of the [`Contract`] holding the [`Sheep`].
    pub contract_id: contract::Id,

    /// ID of the [`Sheep`] to be deallocated.
    pub sheep_id: sheep::Id,
}

impl<Db> Command<DeallocateSheep> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Contract, contract::Id>>,
            Err = Traced<database::Error>,
        > + Database<
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
        > + Database<
            Delete<By<Allocation, allocation::Id>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Allocation;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeallocateSheep,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeallocateSheep {
            contract_id,
            sheep_id,
        } = cmd;

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
        if !contract.is_active() {
            return Err(tracerr::new!(E::ContractNotActive(contract_id)));
        }

        tx.execute(Select(By::<Option<Sheep>, _>::new(sheep_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::SheepNotExists(sheep_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let Active(allocation) = tx
            .execute(Select(By::<Option<Active<Allocation>>, _>::new(
                sheep_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|Active(a)| a.contract_id == contract_id)
            .ok_or(E::SheepNotAllocated(sheep_id))
            .map_err(tracerr::wrap!())?;

        tx.execute(Delete(By::<Allocation, _>::new(allocation.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Sheep(id: {sheep_id})` deallocated from \
             `Contract(id: {contract_id})`",
        );
        Ok(allocation)
    }
}

/// Error of [`DeallocateSheep`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] is not active anymore.
    #[display("`Contract(id: {_0})` is not active")]
    ContractNotActive(#[error(not(source))] contract::Id),

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

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
            Self::Db(e) => e.kind(),
        }
    }
}
