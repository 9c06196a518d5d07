//! [`Contract`]-related definitions.

use std::future;

use common::{Date, DateTime, Money, Percent};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{
    domain,
    query::{self, Retrying},
    Query as _,
};
use tokio::sync::OnceCell;
use uuid::Uuid;

#[cfg(doc)]
use crate::api::Investor;
use crate::{api, api::scalar, AsError, Context, Error};

/// Profit-sharing agreement between an [`Investor`] and the farm.
#[derive(Clone, Debug)]
pub struct Contract {
    /// ID of this [`Contract`].
    id: Id,

    /// Underlying [`domain::Contract`].
    contract: OnceCell<domain::Contract>,
}

impl From<domain::Contract> for Contract {
    fn from(contract: domain::Contract) -> Self {
        Self {
            id: contract.id.into(),
            contract: OnceCell::new_with(Some(contract)),
        }
    }
}

impl Contract {
    /// Creates a new [`Contract`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Contract`] with the provided ID exists,
    /// otherwise accessing this [`Contract`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            contract: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Contract`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Contract`] doesn't exist.
    async fn contract(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Contract, Error> {
        let id = self.id.into();
        self.contract
            .get_or_try_init(|| {
                ctx.service()
                    .execute(Retrying(query::contract::ById::by(id)))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|c| {
                        future::ready(c.ok_or_else(|| {
                            api::query::ContractError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// Profit-sharing agreement between an `Investor` and the farm.
#[graphql_object(context = Context)]
impl Contract {
    /// Unique identifier of this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `Investor` funding this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.investor",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn investor(
        &self,
        ctx: &Context,
    ) -> Result<api::Investor, Error> {
        let investor_id = self.contract(ctx).await?.investor_id;

        #[expect(
            unsafe_code,
            reason = "`Contract` references an existing `Investor`"
        )]
        let investor = unsafe { api::Investor::new_unchecked(investor_id) };
        Ok(investor)
    }

    /// Capital invested, defining the `Contract` currency.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.investment",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn investment(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.contract(ctx).await?.investment.rounded())
    }

    /// Share of the gain belonging to the `Investor`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.profitShare",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn profit_share(&self, ctx: &Context) -> Result<Percent, Error> {
        Ok(self.contract(ctx).await?.profit_share)
    }

    /// Share of the gain belonging to the farm.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.ownerShare",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn owner_share(&self, ctx: &Context) -> Result<Percent, Error> {
        Ok(self.contract(ctx).await?.owner_share())
    }

    /// Duration of this `Contract` in months.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.durationMonths",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn duration_months(&self, ctx: &Context) -> Result<i32, Error> {
        i32::try_from(self.contract(ctx).await?.duration.get())
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// `Date` when this `Contract` starts.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.startDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn start_date(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.contract(ctx).await?.start_date)
    }

    /// `Date` when this `Contract` ends.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.endDate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn end_date(&self, ctx: &Context) -> Result<Date, Error> {
        self.contract(ctx)
            .await?
            .end_date()
            .ok_or_else(|| Error::internal(&"`Contract` end is out of range"))
            .map_err(ctx.error())
    }

    /// `DateTime` when this `Contract` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.contract(ctx).await?.created_at.coerce())
    }

    /// Status of this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.contract(ctx).await?.status().into())
    }

    /// Frozen figures of this `Contract`, if it was completed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.settlement",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn settlement(
        &self,
        ctx: &Context,
    ) -> Result<Option<Settlement>, Error> {
        Ok(self
            .contract(ctx)
            .await?
            .settlement()
            .cloned()
            .map(Into::into))
    }

    /// Cancellation details of this `Contract`, if it was cancelled.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.cancellation",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn cancellation(
        &self,
        ctx: &Context,
    ) -> Result<Option<Cancellation>, Error> {
        use domain::contract::State;

        Ok(match &self.contract(ctx).await?.state {
            State::Cancelled(c) => Some(c.clone().into()),
            State::Active | State::Completed(_) => None,
        })
    }

    /// Every `Sheep` ever allocated to this `Contract`, disposed ones
    /// included.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.allocations",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn allocations(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Allocation>, Error> {
        ctx.service()
            .execute(Retrying(query::contract::Allocations::by(self.id.into())))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|allocs| allocs.into_iter().map(Into::into).collect())
    }

    /// `Expense`s booked against this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.expenses",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn expenses(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Expense>, Error> {
        ctx.service()
            .execute(Retrying(query::contract::Expenses::by(self.id.into())))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|exps| exps.into_iter().map(Into::into).collect())
    }

    /// Financial `Summary` of this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.summary",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn summary(&self, ctx: &Context) -> Result<api::Summary, Error> {
        api::Query::contract_summary(self.id, ctx).await
    }
}

/// Frozen figures of a completed `Contract`.
#[derive(Clone, Debug, From, Into)]
pub struct Settlement(domain::contract::Settlement);

/// Frozen figures of a completed `Contract`.
#[graphql_object(name = "ContractSettlement", context = Context)]
impl Settlement {
    /// `DateTime` when the `Contract` was settled.
    #[must_use]
    pub fn settled_at(&self) -> DateTime {
        self.0.settled_at.coerce()
    }

    /// Total revenue recorded at settlement.
    #[must_use]
    pub fn total_revenue(&self) -> Money {
        self.0.total_revenue.rounded()
    }

    /// Total expenses recorded at settlement.
    #[must_use]
    pub fn total_expenses(&self) -> Money {
        self.0.total_expenses.rounded()
    }

    /// Profit paid out to the `Investor`, negative for a shared loss.
    #[must_use]
    pub fn investor_profit(&self) -> Money {
        self.0.investor_profit.rounded()
    }

    /// Return on investment achieved, in percents.
    #[must_use]
    pub fn actual_roi(&self) -> Roi {
        self.0.actual_roi.rounded().into()
    }

    /// Free-form notes left at settlement.
    #[must_use]
    pub fn notes(&self) -> Option<Notes> {
        self.0.notes.clone().map(Into::into)
    }
}

/// Cancellation details of a `Contract`.
#[derive(Clone, Debug, From, Into)]
pub struct Cancellation(domain::contract::Cancellation);

/// Cancellation details of a `Contract`.
#[graphql_object(name = "ContractCancellation", context = Context)]
impl Cancellation {
    /// `DateTime` when the `Contract` was cancelled.
    #[must_use]
    pub fn cancelled_at(&self) -> DateTime {
        self.0.cancelled_at.coerce()
    }

    /// Free-form notes left at cancellation.
    #[must_use]
    pub fn notes(&self) -> Option<Notes> {
        self.0.notes.clone().map(Into::into)
    }
}

/// Unique identifier of a `Contract`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::contract::Id)]
#[into(domain::contract::Id)]
#[graphql(name = "ContractId", transparent)]
pub struct Id(Uuid);

/// Free-form notes on a `Contract`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ContractNotes",
    with = scalar::Via::<domain::contract::Notes>,
)]
pub struct Notes(domain::contract::Notes);

/// Return on investment in percents, negative for a loss.
#[derive(AsRef, Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "Roi", with = scalar::Via::<domain::contract::Roi>)]
pub struct Roi(domain::contract::Roi);

/// Status of a `Contract`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ContractStatus")]
pub enum Status {
    /// `Contract` is running.
    Active,

    /// `Contract` is settled.
    Completed,

    /// `Contract` is cancelled.
    Cancelled,
}

impl From<domain::contract::Status> for Status {
    fn from(status: domain::contract::Status) -> Self {
        use domain::contract::Status as S;
        match status {
            S::Active => Self::Active,
            S::Completed => Self::Completed,
            S::Cancelled => Self::Cancelled,
        }
    }
}
