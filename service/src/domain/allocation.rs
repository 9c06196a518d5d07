//! [`Allocation`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{contract, sheep};
#[cfg(doc)]
use crate::domain::{Contract, Sheep};

/// [`Sheep`] allocated to a [`Contract`] at a recorded purchase price.
#[derive(Clone, Debug)]
pub struct Allocation {
    /// ID of this [`Allocation`].
    pub id: Id,

    /// ID of the [`Contract`] the [`Sheep`] is allocated to.
    pub contract_id: contract::Id,

    /// ID of the allocated [`Sheep`].
    pub sheep_id: sheep::Id,

    /// Price the [`Sheep`] was purchased for at allocation time.
    ///
    /// Independent of the current market value of the [`Sheep`].
    pub purchase_price: Money,

    /// [`Origin`] of the [`Sheep`] within the [`Contract`].
    pub origin: Origin,

    /// [`DateTime`] when the [`Sheep`] was allocated.
    pub allocated_at: AllocationDateTime,

    /// [`Disposition`] of the [`Sheep`], if it has left the [`Contract`].
    pub disposition: Option<Disposition>,
}

impl Allocation {
    /// Returns [`Status`] of this [`Allocation`].
    #[must_use]
    pub fn status(&self) -> Status {
        match self.disposition {
            None => Status::Active,
            Some(Disposition::Sold { .. }) => Status::Sold,
            Some(Disposition::Deceased { .. }) => Status::Deceased,
        }
    }

    /// Indicates whether this [`Allocation`] is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.disposition.is_none()
    }

    /// Returns proceeds of selling the allocated [`Sheep`], if it was sold.
    #[must_use]
    pub fn sale_price(&self) -> Option<Money> {
        match self.disposition {
            Some(Disposition::Sold { price, .. }) => Some(price),
            Some(Disposition::Deceased { .. }) | None => None,
        }
    }
}

/// ID of an [`Allocation`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Origin of an allocated [`Sheep`]."]
    enum Origin {
        #[doc = "[`Sheep`] was purchased into the [`Contract`]."]
        Purchased = 1,

        #[doc = "[`Sheep`] was born within the [`Contract`]."]
        Born = 2,
    }
}

define_kind! {
    #[doc = "Status of an [`Allocation`]."]
    enum Status {
        #[doc = "[`Sheep`] is held by the [`Contract`]."]
        Active = 1,

        #[doc = "[`Sheep`] was sold."]
        Sold = 2,

        #[doc = "[`Sheep`] died."]
        Deceased = 3,
    }
}

/// Way an allocated [`Sheep`] left its [`Contract`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Disposition {
    /// [`Sheep`] was sold.
    Sold {
        /// Realized sale proceeds.
        price: Money,

        /// [`DateTime`] of the sale.
        at: DisposalDateTime,
    },

    /// [`Sheep`] died.
    Deceased {
        /// [`DateTime`] the death was reported at.
        at: DisposalDateTime,
    },
}

impl Disposition {
    /// Returns [`DateTime`] of this [`Disposition`].
    #[must_use]
    pub fn at(&self) -> DisposalDateTime {
        match self {
            Self::Sold { at, .. } | Self::Deceased { at } => *at,
        }
    }
}

/// [`DateTime`] when a [`Sheep`] was allocated.
pub type AllocationDateTime = DateTimeOf<(Allocation, Origin)>;

/// [`DateTime`] when an allocated [`Sheep`] left its [`Contract`].
pub type DisposalDateTime = DateTimeOf<(Allocation, Disposition)>;
