//! Domain definitions.

pub mod allocation;
pub mod contract;
pub mod expense;
pub mod investor;
pub mod sheep;

pub use self::{
    allocation::Allocation, contract::Contract, expense::Expense,
    investor::Investor, sheep::Sheep,
};
