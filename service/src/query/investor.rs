//! [`Query`] collection related to [`Investor`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::domain::{investor, Investor};

use super::DatabaseQuery;

/// Queries an [`Investor`] by its [`investor::Id`].
pub type ById = DatabaseQuery<By<Option<Investor>, investor::Id>>;
