//! [`Investor`]-related definitions.

use std::future;

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLScalar};
use service::{
    domain,
    query::{self, Retrying},
    Query as _,
};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, api::scalar, AsError, Context, Error};

/// An investor funding sheep fattening [`api::Contract`]s.
#[derive(Clone, Debug)]
pub struct Investor {
    /// ID of this [`Investor`].
    id: Id,

    /// Underlying [`domain::Investor`].
    investor: OnceCell<domain::Investor>,
}

impl From<domain::Investor> for Investor {
    fn from(investor: domain::Investor) -> Self {
        Self {
            id: investor.id.into(),
            investor: OnceCell::new_with(Some(investor)),
        }
    }
}

impl Investor {
    /// Creates a new [`Investor`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Investor`] with the provided ID exists,
    /// otherwise accessing this [`Investor`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            investor: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Investor`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Investor`] doesn't exist.
    async fn investor(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Investor, Error> {
        let id = self.id.into();
        self.investor
            .get_or_try_init(|| {
                ctx.service()
                    .execute(Retrying(query::investor::ById::by(id)))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|i| {
                        future::ready(i.ok_or_else(|| {
                            api::query::InvestorError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// An investor funding sheep fattening `Contract`s.
#[graphql_object(context = Context)]
impl Investor {
    /// Unique identifier of this `Investor`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Investor.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `Investor`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Investor.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.investor(ctx).await?.name.clone().into())
    }

    /// `DateTime` when this `Investor` was registered.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Investor.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.investor(ctx).await?.created_at.coerce())
    }

    /// `Contract`s of this `Investor`, oldest first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Investor.contracts",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn contracts(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Contract>, Error> {
        ctx.service()
            .execute(Retrying(query::contract::ByInvestor::by(self.id.into())))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|cs| cs.into_iter().map(Into::into).collect())
    }
}

/// Unique identifier of an `Investor`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::investor::Id)]
#[into(domain::investor::Id)]
#[graphql(name = "InvestorId", transparent)]
pub struct Id(Uuid);

/// Name of an `Investor`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "InvestorName",
    with = scalar::Via::<domain::investor::Name>,
)]
pub struct Name(domain::investor::Name);
