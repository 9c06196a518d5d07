//! [`Expense`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::contract;
#[cfg(doc)]
use crate::domain::Contract;

/// Expense recorded against a [`Contract`].
#[derive(Clone, Debug)]
pub struct Expense {
    /// ID of this [`Expense`].
    pub id: Id,

    /// ID of the [`Contract`] this [`Expense`] belongs to.
    pub contract_id: contract::Id,

    /// [`Category`] of this [`Expense`].
    pub category: Category,

    /// [`Description`] of this [`Expense`].
    pub description: Description,

    /// Amount spent.
    pub amount: Money,

    /// [`Date`] the money was spent on.
    pub spent_on: Date,

    /// [`DateTime`] when this [`Expense`] was recorded.
    pub created_at: CreationDateTime,
}

/// ID of an [`Expense`].
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
    #[doc = "Category of an [`Expense`]."]
    enum Category {
        #[doc = "Fodder and supplements."]
        Feed = 1,

        #[doc = "Medicine."]
        Medicine = 2,

        #[doc = "Vaccination."]
        Vaccination = 3,

        #[doc = "Shepherd labor."]
        Labor = 4,

        #[doc = "Transportation of animals or supplies."]
        Transport = 5,

        #[doc = "Maintenance of cages and equipment."]
        Maintenance = 6,

        #[doc = "Anything else."]
        Other = 7,
    }
}

/// Description of an [`Expense`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `description` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        description.trim() == description
            && !description.is_empty()
            && description.len() <= 512
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// [`DateTime`] when an [`Expense`] was recorded.
pub type CreationDateTime = DateTimeOf<(Expense, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use super::{Category, Description};

    #[test]
    fn parses_categories() {
        assert_eq!(Category::from_str("FEED").unwrap(), Category::Feed);
        assert_eq!(
            Category::from_str("VACCINATION").unwrap(),
            Category::Vaccination,
        );
        assert!(Category::from_str("Fuel").is_err());
        assert_eq!(Category::Maintenance.to_string(), "MAINTENANCE");
    }

    #[test]
    fn description_is_trimmed_and_non_empty() {
        assert!(Description::new("Rumput gajah 200kg").is_some());
        assert!(Description::new("").is_none());
        assert!(Description::new("hay ").is_none());
    }
}
