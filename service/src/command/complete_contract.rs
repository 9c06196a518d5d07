//! [`Command`] for completing a [`Contract`].

use common::{
    money::Currency,
    operations::{By, Select, Update},
    Money,
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

/// [`Command`] for completing an active [`Contract`], freezing its financial
/// outcome into a [`contract::Settlement`].
#[derive(Clone, Debug)]
pub struct CompleteContract {
    /// ID of the [`Contract`] to be completed.
    pub contract_id: contract::Id,

    /// Total revenue realized by the [`Contract`].
    ///
    /// Includes the value of the sheep remaining at settlement.
    pub total_revenue: Money,

    /// Total expenses of the [`Contract`].
    pub total_expenses: Money,

    /// Optional [`contract::Notes`] to leave on settlement.
    pub notes: Option<contract::Notes>,
}

impl<Db> Command<CompleteContract> for Service<Db>
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

    async fn execute(
        &self,
        cmd: CompleteContract,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteContract {
            contract_id,
            total_revenue,
            total_expenses,
            notes,
        } = cmd;

        if total_revenue.is_negative() {
            return Err(tracerr::new!(E::NegativeTotal(total_revenue)));
        }
        if total_expenses.is_negative() {
            return Err(tracerr::new!(E::NegativeTotal(total_expenses)));
        }

        let mut contract = self
            .database()
            .execute(Select(By::<Option<Contract>, _>::new(contract_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ContractNotExists(contract_id))
            .map_err(tracerr::wrap!())?;

        let currency = contract.investment.currency;
        for total in [total_revenue, total_expenses] {
            if total.currency != currency {
                return Err(tracerr::new!(E::CurrencyMismatch {
                    expected: currency,
                    actual: total.currency,
                }));
            }
        }

        if !contract.is_active() {
            return Err(tracerr::new!(E::ContractNotActive(contract_id)));
        }

        let settlement = contract.settle(total_revenue, total_expenses, notes);
        let settled = self
            .database()
            .execute(Update(contract::Transition {
                id: contract_id,
                outcome: settlement.clone().into(),
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !settled {
            log::warn!(
                "`Contract(id: {contract_id})` was closed concurrently, \
                 settlement rejected",
            );
            return Err(tracerr::new!(E::ContractNotActive(contract_id)));
        }

        log::info!(
            "`Contract(id: {contract_id})` completed with investor profit \
             {} and ROI {}%",
            settlement.investor_profit,
            settlement.actual_roi.rounded(),
        );
        contract.state = contract::State::Completed(settlement);
        Ok(contract)
    }
}

/// Error of [`CompleteContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Contract`] is not active anymore.
    #[display("`Contract(id: {_0})` is not active")]
    ContractNotActive(#[error(not(source))] contract::Id),

    /// [`Contract`] with the provided ID does not exist.
    #[display("`Contract(id: {_0})` does not exist")]
    ContractNotExists(#[error(not(source))] contract::Id),

    /// Provided total is in a [`Currency`] other than the [`Contract`]'s
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

    /// Provided total is negative.
    #[display("total `{_0}` is negative")]
    NegativeTotal(#[error(not(source))] Money),
}

impl Classify for ExecutionError {
    fn kind(&self) -> error::Kind {
        match self {
            Self::ContractNotActive(_) => error::Kind::InvalidState,
            Self::ContractNotExists(_) => error::Kind::NotFound,
            Self::CurrencyMismatch { .. } | Self::NegativeTotal(_) => {
                error::Kind::Validation
            }
            Self::Db(e) => e.kind(),
        }
    }
}
