//! [`Query`] collection related to [`Contract`]s.

use common::operations::By;

#[cfg(doc)]
use crate::{
    domain::{Allocation, Investor},
    Query,
};
use crate::{
    domain::{contract, investor, Contract, Expense},
    read::contract::Allocated,
};

use super::DatabaseQuery;

/// Queries a [`Contract`] by its [`contract::Id`].
pub type ById = DatabaseQuery<By<Option<Contract>, contract::Id>>;

/// Queries all [`Contract`]s of an [`Investor`], oldest first.
pub type ByInvestor = DatabaseQuery<By<Vec<Contract>, investor::Id>>;

/// Queries every [`Allocation`] of a [`Contract`], including disposed ones.
pub type Allocations = DatabaseQuery<By<Vec<Allocated>, contract::Id>>;

/// Queries every [`Expense`] of a [`Contract`].
pub type Expenses = DatabaseQuery<By<Vec<Expense>, contract::Id>>;
