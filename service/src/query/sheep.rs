//! [`Query`] collection related to [`Sheep`].

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{sheep, Sheep},
    read,
};

use super::DatabaseQuery;

/// Queries a [`Sheep`] by its [`sheep::Id`].
pub type ById = DatabaseQuery<By<Option<Sheep>, sheep::Id>>;

/// Queries [`Sheep`] available for allocation, ordered by tag.
pub type Available = DatabaseQuery<By<Vec<Sheep>, read::sheep::Available>>;
