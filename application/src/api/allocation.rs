//! [`Allocation`]-related definitions.

use common::{DateTime, Money};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, read};
use uuid::Uuid;

use crate::{api, Context};

/// A sheep allocated to a `Contract`.
#[derive(Clone, Debug, From, Into)]
pub struct Allocation(domain::Allocation);

impl From<read::contract::Allocated> for Allocation {
    fn from(allocated: read::contract::Allocated) -> Self {
        Self(allocated.allocation)
    }
}

/// A sheep allocated to a `Contract`.
#[graphql_object(context = Context)]
impl Allocation {
    /// Unique identifier of this `Allocation`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `Contract` holding the `Sheep`.
    #[must_use]
    pub fn contract(&self) -> api::Contract {
        #[expect(
            unsafe_code,
            reason = "`Allocation` references an existing `Contract`"
        )]
        unsafe {
            api::Contract::new_unchecked(self.0.contract_id)
        }
    }

    /// Allocated `Sheep`.
    #[must_use]
    pub fn sheep(&self) -> api::Sheep {
        #[expect(
            unsafe_code,
            reason = "`Allocation` references an existing `Sheep`"
        )]
        unsafe {
            api::Sheep::new_unchecked(self.0.sheep_id)
        }
    }

    /// Price the `Sheep` entered the `Contract` at.
    #[must_use]
    pub fn purchase_price(&self) -> Money {
        self.0.purchase_price.rounded()
    }

    /// Origin of the `Sheep` within the `Contract`.
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.0.origin.into()
    }

    /// Status of this `Allocation`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status().into()
    }

    /// Proceeds of the sale, if the `Sheep` was sold.
    #[must_use]
    pub fn sale_price(&self) -> Option<Money> {
        self.0.sale_price().map(Money::rounded)
    }

    /// `DateTime` when the `Sheep` was allocated.
    #[must_use]
    pub fn allocated_at(&self) -> DateTime {
        self.0.allocated_at.coerce()
    }

    /// `DateTime` when the `Sheep` was sold or died.
    #[must_use]
    pub fn disposed_at(&self) -> Option<DateTime> {
        self.0.disposition.map(|d| d.at().coerce())
    }
}

/// Unique identifier of an `Allocation`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::allocation::Id)]
#[into(domain::allocation::Id)]
#[graphql(name = "AllocationId", transparent)]
pub struct Id(Uuid);

/// Origin of an allocated `Sheep`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "AllocationOrigin")]
pub enum Origin {
    /// `Sheep` was purchased into the `Contract`.
    Purchased,

    /// `Sheep` was born within the `Contract`.
    Born,
}

impl From<domain::allocation::Origin> for Origin {
    fn from(origin: domain::allocation::Origin) -> Self {
        use domain::allocation::Origin as O;
        match origin {
            O::Purchased => Self::Purchased,
            O::Born => Self::Born,
        }
    }
}

impl From<Origin> for domain::allocation::Origin {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::Purchased => Self::Purchased,
            Origin::Born => Self::Born,
        }
    }
}

/// Status of an `Allocation`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "AllocationStatus")]
pub enum Status {
    /// `Sheep` is held by the `Contract`.
    Active,

    /// `Sheep` was sold.
    Sold,

    /// `Sheep` died.
    Deceased,
}

impl From<domain::allocation::Status> for Status {
    fn from(status: domain::allocation::Status) -> Self {
        use domain::allocation::Status as S;
        match status {
            S::Active => Self::Active,
            S::Sold => Self::Sold,
            S::Deceased => Self::Deceased,
        }
    }
}
