//! GraphQL API definitions.

pub mod allocation;
pub mod contract;
pub mod expense;
pub mod investor;
mod mutation;
mod query;
pub mod scalar;
pub mod sheep;
pub mod summary;

use juniper::EmptySubscription;

use crate::Context;

pub use self::{
    allocation::Allocation, contract::Contract, expense::Expense,
    investor::Investor, mutation::Mutation, query::Query, sheep::Sheep,
    summary::Summary,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;
