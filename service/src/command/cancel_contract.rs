//! [`Command`] for cancelling a [`Contract`].

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{contract, Contract},
    error::{self, Classify},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for cancelling an active [`Contract`] before its settlement.
#[derive(Clone, Debug)]
pub struct CancelContract {
    /// ID of the [`Contract`] to be cancelled.
    pub contract_id: contract::Id,

    /// Optional [`contract::Notes`] to leave on cancellation.
    pub notes: Option<contract::Notes>,
}

impl<Db> Command<CancelContract> for Service<Db>
where
    Db: Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<
            Update<contract::Transition>,
            Ok = bool,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CancelContract) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelContract { contract_id, notes } = cmd;

        let mut contract = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;

        if !contract.is_active() {
            return Err(tracerr::new!(E::ContractNotActive(contract_id)));
        }

        let cancellation = contract::Cancellation {
            cancelled_at: DateTime::now().coerce(),
            notes,
        };
        let cancelled = self
            .database()
            .execute(Update(contract::Transition {
                id: contract_id,
                outcome: cancellation.clone().into(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !cancelled {
            log::warn!(
                "`Contract(id: {contract_id})` was closed concurrently, \
                 cancellation rejected",
            );
            return Err(tracerr::new!(E::ContractNotActive(contract_id)));
        }

        log::info!("`Contract(id: {contract_id})` cancelled");
        contract.state = contract::State::Cancelled(cancellation);
        Ok(contract)
    }
}

/// Error of [`CancelContract`] [`Command`] execution.
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
}

impl Classify for ExecutionError {
    fn kind(&self) -> error::Kind {
        match self {
            Self::ContractNotActive(_) => error::Kind::InvalidState,
            Self::ContractNotExists(_) => error::Kind::NotFound,
            Self::Db(e) => e.kind(),
        }
    }
}
