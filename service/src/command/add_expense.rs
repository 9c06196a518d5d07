//! [`Command`] for adding an [`Expense`] to a [`Contract`].

use common::{
    money::Currency,
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Date, DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{contract, expense, Contract, Expense},
    error::{self, Classify},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording an [`Expense`] of an active [`Contract`].
#[derive(Clone, Debug)]
pub struct AddExpense {
    /// ID of the [`Contract`] the [`Expense`] belongs to.
    pub contract_id: contract::Id,

    /// [`expense::Category`] of the new [`Expense`].
    pub category: expense::Category,

    /// [`expense::Description`] of the new [`Expense`].
    pub description: expense::Description,

    /// Amount spent.
    pub amount: Money,

    /// [`Date`] the money was spent on.
    ///
    /// Must not precede the start of the [`Contract`].
    pub spent_on: Date,
}

impl<Db> Command<AddExpense> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Contract, contract::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Contract>, contract::Id>>,
            Ok = Option<Contract>,
            Err = Traced<database::Error>,
        > + Database<Insert<Expense>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Expense;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AddExpense) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddExpense {
            contract_id,
            category,
            description,
            amount,
            spent_on,
        } = cmd;

        if !amount.is_positive() {
            return Err(tracerr::new!(E::NonPositiveAmount(amount)));
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
        if amount.currency != currency {
            return Err(tracerr::new!(E::CurrencyMismatch {
                expected: currency,
                actual: amount.currency,
            }));
        }
        if spent_on < contract.start_date {
            return Err(tracerr::new!(E::SpentBeforeStart {
                spent_on,
                start_date: contract.start_date,
            }));
        }
        if !contract.is_active() {
            return Err(tracerr::new!(E::ContractNotActive(contract_id)));
        }

        let expense = Expense {
            id: expense::Id::new(),
            contract_id,
            category,
            description,
            amount,
            spent_on,
            created_at: DateTime::now().coerce(),
        };

        tx.execute(Insert(expense.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Expense(id: {})` of {amount} added to \
             `Contract(id: {contract_id})`",
            expense.id,
        );
        Ok(expense)
    }
}

/// Error of [`AddExpense`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] is not active anymore.
    #[display("`Contract(id: {_0})` is not active")]
    ContractNotActive(#[error(not(source))] contract::Id),

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// Amount is in a [`Currency`] other than the [`Contract`]'s one.
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

    /// Provided amount is not positive.
    #[display("amount `{_0}` is not positive")]
    NonPositiveAmount(#[error(not(source))] Money),

    /// [`Expense`] is dated before the [`Contract`] starts.
    #[display("spent on `{spent_on}`, before the start at `{start_date}`")]
    SpentBeforeStart {
        /// [`Date`] of the [`Expense`].
        spent_on: Date,

        /// [`Date`] the [`Contract`] starts at.
        start_date: Date,
    },
}

impl Classify for ExecutionError {
    fn kind(&self) -> error::Kind {
        match self {
            Self::ContractNotActive(_) => error::Kind::InvalidState,
            Self::ContractNotExists(_) => error::Kind::NotFound,
            Self::CurrencyMismatch { .. }
            | Self::NonPositiveAmount(_)
            | Self::SpentBeforeStart { .. } => error::Kind::Validation,
            Self::Db(e) => e.kind(),
        }
    }
}
