//! [`Command`] for creating a [`Contract`].

use common::{
    operations::{By, Insert, Select},
    Date, DateTime, Money, Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{contract, investor, Contract, Investor},
    error::{self, Classify},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new active [`Contract`] of an [`Investor`].
#[derive(Clone, Copy, Debug)]
pub struct CreateContract {
    /// ID of the [`Investor`] funding the new [`Contract`].
    pub investor_id: investor::Id,

    /// Principal invested into the new [`Contract`].
    pub investment: Money,

    /// Share of the gain going to the [`Investor`].
    pub profit_share: Percent,

    /// Duration of the new [`Contract`].
    pub duration: contract::Months,

    /// [`Date`] the new [`Contract`] starts at.
    pub start_date: Date,
}

impl<Db> Command<CreateContract> for Service<Db>
where
    Db: Database<
            Select<By<Option<Investor>, investor::Id>>,
            Ok = Option<Investor>,
            Err = Traced<database::Error>,
        > + Database<Insert<Contract>, Err = Traced<database::Error>>,
{
    type Ok = Contract;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateContract) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateContract {
            investor_id,
            investment,
            profit_share,
            duration,
            start_date,
        } = cmd;

        if !investment.is_positive() {
            return Err(tracerr::new!(E::NonPositiveInvestment(investment)));
        }

        let investor = self
            .database()
            .execute(Select(By::<Option<Investor>, _>::new(investor_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InvestorNotExists(investor_id))
            .map_err(tracerr::wrap!())?;

        let contract = Contract {
            id: contract::Id::new(),
            investor_id: investor.id,
            investment,
            profit_share,
            duration,
            start_date,
            created_at: DateTime::now().coerce(),
            state: contract::State::Active,
        };
        if contract.end_date().is_none() {
            return Err(tracerr::new!(E::EndOutOfRange(start_date)));
        }

        self.database()
            .execute(Insert(contract.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Contract(id: {})` created for `Investor(id: {investor_id})` \
             with investment {investment}",
            contract.id,
        );
        Ok(contract)
    }
}

/// Error of [`CreateContract`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Contract`] would end outside the supported calendar.
    #[display("`Contract` starting at `{_0}` ends out of range")]
    EndOutOfRange(#[error(not(source))] Date),

    /// [`Investor`] with the provided ID does not exist.
    #[display("`Investor(id: {_0})` does not exist")]
    InvestorNotExists(#[error(not(source))] investor::Id),

    /// Provided investment is not positive.
    #[display("investment `{_0}` is not positive")]
    NonPositiveInvestment(#[error(not(source))] Money),
}

impl Classify for ExecutionError {
    fn kind(&self) -> error::Kind {
        match self {
            Self::Db(e) => e.kind(),
            Self::EndOutOfRange(_) | Self::NonPositiveInvestment(_) => {
                error::Kind::Validation
            }
            Self::InvestorNotExists(_) => error::Kind::NotFound,
        }
    }
}
