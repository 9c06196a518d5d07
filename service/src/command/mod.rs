//! [`Command`] definition.

pub mod add_expense;
pub mod allocate_sheep;
pub mod cancel_contract;
pub mod complete_contract;
pub mod create_contract;
pub mod create_investor;
pub mod deallocate_sheep;
pub mod delete_expense;
pub mod register_sheep;
pub mod report_sheep_death;
pub mod sell_sheep;
pub mod update_sheep_health;
pub mod update_sheep_market_value;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_expense::AddExpense, allocate_sheep::AllocateSheep,
    cancel_contract::CancelContract, complete_contract::CompleteContract,
    create_contract::CreateContract, create_investor::CreateInvestor,
    deallocate_sheep::DeallocateSheep, delete_expense::DeleteExpense,
    register_sheep::RegisterSheep, report_sheep_death::ReportSheepDeath,
    sell_sheep::SellSheep, update_sheep_health::UpdateSheepHealth,
    update_sheep_market_value::UpdateSheepMarketValue,
};
