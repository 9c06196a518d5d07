//! [`Investor`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Person funding [`Contract`]s.
///
/// [`Contract`]: crate::domain::Contract
#[derive(Clone, Debug)]
pub struct Investor {
    /// ID of this [`Investor`].
    pub id: Id,

    /// [`Name`] of this [`Investor`].
    pub name: Name,

    /// [`DateTime`] when this [`Investor`] was created.
    pub created_at: CreationDateTime,
}

/// ID of an [`Investor`].
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

/// Name of an [`Investor`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` is not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// [`DateTime`] when an [`Investor`] was created.
pub type CreationDateTime = DateTimeOf<(Investor, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Name;

    #[test]
    fn name_is_trimmed_and_bounded() {
        assert!(Name::new("Ahmad Fauzi").is_some());
        assert!(Name::new(" Ahmad").is_none());
        assert!(Name::new("Ahmad ").is_none());
        assert!(Name::new("").is_none());
        assert!(Name::new("a".repeat(512)).is_some());
        assert!(Name::new("a".repeat(513)).is_none());
    }
}
