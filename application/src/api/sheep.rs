//! [`Sheep`]-related definitions.

use std::future;

use common::{DateTime, Money};
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

use crate::{api, api::scalar, AsError, Context, Error};

/// A sheep kept on the farm.
#[derive(Clone, Debug)]
pub struct Sheep {
    /// ID of this [`Sheep`].
    id: Id,

    /// Underlying [`domain::Sheep`].
    sheep: OnceCell<domain::Sheep>,
}

impl From<domain::Sheep> for Sheep {
    fn from(sheep: domain::Sheep) -> Self {
        Self {
            id: sheep.id.into(),
            sheep: OnceCell::new_with(Some(sheep)),
        }
    }
}

impl Sheep {
    /// Creates a new [`Sheep`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Sheep`] with the provided ID exists,
    /// otherwise accessing this [`Sheep`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            sheep: OnceCell::new(),
        }
    }

    /// Returns the underlying [`domain::Sheep`].
    ///
    /// # Errors
    ///
    /// Errors if the [`domain::Sheep`] doesn't exist.
    async fn sheep(&self, ctx: &Context) -> Result<&domain::Sheep, Error> {
        let id = self.id.into();
        self.sheep
            .get_or_try_init(|| {
                ctx.service()
                    .execute(Retrying(query::sheep::ById::by(id)))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|s| {
                        future::ready(s.ok_or_else(|| {
                            api::query::SheepError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A sheep kept on the farm.
#[graphql_object(context = Context)]
impl Sheep {
    /// Unique identifier of this `Sheep`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sheep.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Ear tag of this `Sheep`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sheep.tag",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn tag(&self, ctx: &Context) -> Result<Tag, Error> {
        Ok(self.sheep(ctx).await?.tag.clone().into())
    }

    /// Health of this `Sheep`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sheep.health",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn health(&self, ctx: &Context) -> Result<Health, Error> {
        Ok(self.sheep(ctx).await?.health.into())
    }

    /// Status of this `Sheep` on the farm.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sheep.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.sheep(ctx).await?.status.into())
    }

    /// Current market value of this `Sheep`, if appraised.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sheep.marketValue",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn market_value(
        &self,
        ctx: &Context,
    ) -> Result<Option<Money>, Error> {
        Ok(self.sheep(ctx).await?.market_value.map(Money::rounded))
    }

    /// `DateTime` when this `Sheep` was registered.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Sheep.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.sheep(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Sheep`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::sheep::Id)]
#[into(domain::sheep::Id)]
#[graphql(name = "SheepId", transparent)]
pub struct Id(Uuid);

/// Ear tag of a `Sheep`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "SheepTag", with = scalar::Via::<domain::sheep::Tag>)]
pub struct Tag(domain::sheep::Tag);

/// Health of a `Sheep`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "SheepHealth")]
pub enum Health {
    /// Healthy `Sheep`, which may be allocated.
    Healthy,

    /// Sick `Sheep`.
    Sick,
}

impl From<domain::sheep::Health> for Health {
    fn from(health: domain::sheep::Health) -> Self {
        use domain::sheep::Health as H;
        match health {
            H::Healthy => Self::Healthy,
            H::Sick => Self::Sick,
        }
    }
}

impl From<Health> for domain::sheep::Health {
    fn from(health: Health) -> Self {
        match health {
            Health::Healthy => Self::Healthy,
            Health::Sick => Self::Sick,
        }
    }
}

/// Status of a `Sheep` on the farm.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "SheepStatus")]
pub enum Status {
    /// `Sheep` is kept on the farm.
    InStock,

    /// `Sheep` was sold.
    Sold,

    /// `Sheep` died.
    Deceased,
}

impl From<domain::sheep::Status> for Status {
    fn from(status: domain::sheep::Status) -> Self {
        use domain::sheep::Status as S;
        match status {
            S::InStock => Self::InStock,
            S::Sold => Self::Sold,
            S::Deceased => Self::Deceased,
        }
    }
}
