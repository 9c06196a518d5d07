//! [`ContractSummary`] [`Query`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{contract, Contract, Expense},
    error::{self, Classify},
    infra::{database, Database},
    read::contract::{Allocated, Summary},
    Service,
};

use super::Query;

/// [`Query`] calculating a financial [`Summary`] of a [`Contract`].
///
/// Completed [`Contract`]s are summarized from their frozen settlement,
/// others are estimated from their live ledgers.
#[derive(Clone, Copy, Debug)]
pub struct ContractSummary {
    /// ID of the [`Contract`] to be summarized.
    pub contract_id: contract::Id,
}

impl<Db> Query<ContractSummary> for Service<Db>
where
    Db: Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Allocated>, contract::Id>>,
            Ok = Vec<Allocated>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Expense>, contract::Id>>,
            Ok = Vec<Expense>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Summary;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        query: ContractSummary,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ContractSummary { contract_id } = query;

        let contract = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;

        let allocations = self
            .database()
            .execute(Select(By::<Vec<Allocated>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        if contract.settlement().is_some() {
            return Ok(Summary::of(&contract, &allocations, &[]));
        }

        let expenses = self
            .database()
            .execute(Select(By::<Vec<Expense>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Settlement may land while the ledgers are being read, and frozen
        // figures always win over an estimate.
        let settled = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|c| c.settlement().is_some());

        Ok(Summary::of(
            settled.as_ref().unwrap_or(&contract),
            &allocations,
            &expenses,
        ))
    }
}

/// Error of [`ContractSummary`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}

impl Classify for ExecutionError {
    fn kind(&self) -> error::Kind {
        match self {
            Self::ContractNotExists(_) => error::Kind::NotFound,
            Self::Db(e) => e.kind(),
        }
    }
}
