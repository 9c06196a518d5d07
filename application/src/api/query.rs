//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{
    query::{self, contract_summary, Retrying},
    read, Query as _,
};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Investor` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVESTOR_NOT_EXISTS` - the `Investor` with the specified ID does
    ///                           not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "investor",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn investor(
        id: api::investor::Id,
        ctx: &Context,
    ) -> Result<api::Investor, Error> {
        ctx.service()
            .execute(Retrying(query::investor::ById::by(id.into())))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| InvestorError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Contract` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does
    ///                           not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "contract",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn contract(
        id: api::contract::Id,
        ctx: &Context,
    ) -> Result<api::Contract, Error> {
        ctx.service()
            .execute(Retrying(query::contract::ById::by(id.into())))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ContractError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the `Contract`s of the specified `Investor`, oldest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "contracts",
            investor_id = %investor_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn contracts(
        investor_id: api::investor::Id,
        ctx: &Context,
    ) -> Result<Vec<api::Contract>, Error> {
        ctx.service()
            .execute(Retrying(query::contract::ByInvestor::by(
                investor_id.into(),
            )))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cs| cs.into_iter().map(Into::into).collect())
    }

    /// Calculates the financial summary of the `Contract` with the specified
    /// ID.
    ///
    /// Figures of an active or cancelled `Contract` are estimated from its
    /// ledgers, while a completed `Contract` reports the figures frozen at
    /// settlement.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does
    ///                           not exist;
    /// - `STORAGE_UNAVAILABLE` - the storage stayed unavailable after
    ///                           retrying.
    #[tracing::instrument(
        skip_all,
        fields(
            contract_id = %contract_id,
            gql.name = "contractSummary",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn contract_summary(
        contract_id: api::contract::Id,
        ctx: &Context,
    ) -> Result<api::Summary, Error> {
        ctx.service()
            .execute(Retrying(query::ContractSummary {
                contract_id: contract_id.into(),
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Sheep` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `SHEEP_NOT_EXISTS` - the `Sheep` with the specified ID does not
    ///                        exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "sheep",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn sheep(
        id: api::sheep::Id,
        ctx: &Context,
    ) -> Result<api::Sheep, Error> {
        ctx.service()
            .execute(Retrying(query::sheep::ById::by(id.into())))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| SheepError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Sheep` which may be allocated to a `Contract`: healthy,
    /// in stock and not held by any `Contract`, ordered by tag.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "availableSheep",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn available_sheep(
        ctx: &Context,
    ) -> Result<Vec<api::Sheep>, Error> {
        ctx.service()
            .execute(Retrying(query::sheep::Available::by(
                read::sheep::Available,
            )))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|ss| ss.into_iter().map(Into::into).collect())
    }
}

impl AsError for contract_summary::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ContractNotExists(_) => ContractError::NotExists.into(),
        })
    }
}

define_error! {
    enum ContractError {
        #[code = "CONTRACT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Contract` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum InvestorError {
        #[code = "INVESTOR_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Investor` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum SheepError {
        #[code = "SHEEP_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Sheep` with the specified ID does not exist"]
        NotExists,
    }
}
