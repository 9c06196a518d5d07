//! [`Sheep`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Animal kept on the farm.
#[derive(Clone, Debug)]
pub struct Sheep {
    /// ID of this [`Sheep`].
    pub id: Id,

    /// Ear [`Tag`] of this [`Sheep`].
    pub tag: Tag,

    /// [`Health`] of this [`Sheep`].
    pub health: Health,

    /// [`Status`] of this [`Sheep`] on the farm.
    pub status: Status,

    /// Current market value of this [`Sheep`], if assessed.
    pub market_value: Option<Money>,

    /// [`DateTime`] when this [`Sheep`] was registered.
    pub created_at: CreationDateTime,
}

impl Sheep {
    /// Indicates whether this [`Sheep`] may be allocated to a [`Contract`],
    /// not taking existing allocations into account.
    ///
    /// [`Contract`]: crate::domain::Contract
    #[must_use]
    pub fn is_allocatable(&self) -> bool {
        self.status == Status::InStock && self.health == Health::Healthy
    }
}

/// ID of a [`Sheep`].
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

/// Ear tag identifying a [`Sheep`] on the farm.
#[derive(
    AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Tag(String);

impl Tag {
    /// Creates a new [`Tag`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `tag` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Creates a new [`Tag`] if the given `tag` is valid.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Option<Self> {
        let tag = tag.into();
        Self::check(&tag).then_some(Self(tag))
    }

    /// Checks whether the given `tag` is a valid [`Tag`].
    fn check(tag: impl AsRef<str>) -> bool {
        let tag = tag.as_ref();
        tag.trim() == tag && !tag.is_empty() && tag.len() <= 64
    }
}

impl FromStr for Tag {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Tag`")
    }
}

define_kind! {
    #[doc = "Health of a [`Sheep`]."]
    enum Health {
        #[doc = "[`Sheep`] is healthy."]
        Healthy = 1,

        #[doc = "[`Sheep`] is sick."]
        Sick = 2,
    }
}

define_kind! {
    #[doc = "Status of a [`Sheep`] on the farm."]
    enum Status {
        #[doc = "[`Sheep`] is kept on the farm."]
        InStock = 1,

        #[doc = "[`Sheep`] was sold."]
        Sold = 2,

        #[doc = "[`Sheep`] died."]
        Deceased = 3,
    }
}

/// [`DateTime`] when a [`Sheep`] was registered.
pub type CreationDateTime = DateTimeOf<(Sheep, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{Health, Id, Sheep, Status, Tag};

    fn sheep(health: Health, status: Status) -> Sheep {
        Sheep {
            id: Id::new(),
            tag: Tag::new("AF-0001").unwrap(),
            health,
            status,
            market_value: None,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn only_healthy_sheep_in_stock_is_allocatable() {
        assert!(sheep(Health::Healthy, Status::InStock).is_allocatable());
        assert!(!sheep(Health::Sick, Status::InStock).is_allocatable());
        assert!(!sheep(Health::Healthy, Status::Sold).is_allocatable());
        assert!(!sheep(Health::Healthy, Status::Deceased).is_allocatable());
    }

    #[test]
    fn tag_is_trimmed_and_bounded() {
        assert!(Tag::new("AF-0001").is_some());
        assert!(Tag::new(" AF-0001").is_none());
        assert!(Tag::new("").is_none());
        assert!(Tag::new("T".repeat(64)).is_some());
        assert!(Tag::new("T".repeat(65)).is_none());
    }
}
