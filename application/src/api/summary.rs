//! [`Summary`]-related definitions.

use common::{Money, Percent};
use derive_more::{From, Into};
use juniper::{graphql_object, GraphQLEnum};
use service::read;

use crate::{api, AsError, Context, Error};

/// Financial summary of a `Contract`.
///
/// Money amounts are rounded to the minor units of the `Contract` currency,
/// while the underlying sums stay exact.
#[derive(Clone, Debug, From, Into)]
pub struct Summary(read::Summary);

/// Financial summary of a `Contract`.
#[graphql_object(name = "ContractSummary", context = Context)]
impl Summary {
    /// Summarized `Contract`.
    #[must_use]
    pub fn contract(&self) -> api::Contract {
        #[expect(
            unsafe_code,
            reason = "`Summary` is computed for an existing `Contract`"
        )]
        unsafe {
            api::Contract::new_unchecked(self.0.contract_id)
        }
    }

    /// Status of the `Contract` at the moment of summarizing.
    #[must_use]
    pub fn status(&self) -> api::contract::Status {
        self.0.status.into()
    }

    /// Whether the figures are estimated from live ledgers or frozen at
    /// settlement.
    #[must_use]
    pub fn basis(&self) -> Basis {
        self.0.basis.into()
    }

    /// Capital invested.
    #[must_use]
    pub fn investment(&self) -> Money {
        self.0.investment.rounded()
    }

    /// Share of the gain belonging to the `Investor`.
    #[must_use]
    pub fn profit_share(&self) -> Percent {
        self.0.profit_share
    }

    /// Share of the gain belonging to the farm.
    #[must_use]
    pub fn owner_share(&self) -> Percent {
        self.0.profit_share.complement()
    }

    /// Sum of purchase prices of every allocated `Sheep`.
    #[must_use]
    pub fn total_purchase_value(&self) -> Money {
        self.0.total_purchase_value.rounded()
    }

    /// Current value of the `Sheep` still held.
    #[must_use]
    pub fn total_current_value(&self) -> Money {
        self.0.total_current_value.rounded()
    }

    /// Sum of `Expense`s.
    #[must_use]
    pub fn total_expenses(&self) -> Money {
        self.0.total_expenses.rounded()
    }

    /// Proceeds of sold `Sheep`.
    #[must_use]
    pub fn total_revenue(&self) -> Money {
        self.0.total_revenue.rounded()
    }

    /// Current value plus revenue minus expenses.
    #[must_use]
    pub fn net_result(&self) -> Money {
        self.0.net_result.rounded()
    }

    /// Return on investment, in percents.
    #[must_use]
    pub fn roi(&self) -> api::contract::Roi {
        self.0.roi.rounded().into()
    }

    /// Gain share of the `Investor`, negative for a shared loss.
    #[must_use]
    pub fn investor_profit(&self) -> Money {
        self.0.investor_profit.rounded()
    }

    /// Gain share of the farm, negative for a shared loss.
    #[must_use]
    pub fn owner_profit(&self) -> Money {
        self.0.owner_profit.rounded()
    }

    /// Counts of the `Sheep` allocated to the `Contract`.
    #[must_use]
    pub fn headcount(&self) -> Headcount {
        self.0.headcount.into()
    }
}

/// Counts of `Sheep` allocated to a `Contract`.
#[derive(Clone, Copy, Debug, From, Into)]
pub struct Headcount(read::contract::Headcount);

/// Counts of `Sheep` allocated to a `Contract`.
#[graphql_object(name = "ContractHeadcount", context = Context)]
impl Headcount {
    /// Every allocation, disposed ones included.
    pub fn total(&self) -> Result<i32, Error> {
        i32::try_from(self.0.total).map_err(AsError::into_error)
    }

    /// `Sheep` still held.
    pub fn active(&self) -> Result<i32, Error> {
        i32::try_from(self.0.active).map_err(AsError::into_error)
    }

    /// `Sheep` born within the `Contract`.
    pub fn born(&self) -> Result<i32, Error> {
        i32::try_from(self.0.born).map_err(AsError::into_error)
    }

    /// `Sheep` sold.
    pub fn sold(&self) -> Result<i32, Error> {
        i32::try_from(self.0.sold).map_err(AsError::into_error)
    }

    /// `Sheep` deceased.
    pub fn deceased(&self) -> Result<i32, Error> {
        i32::try_from(self.0.deceased).map_err(AsError::into_error)
    }
}

/// Basis of `ContractSummary` figures.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "SummaryBasis")]
pub enum Basis {
    /// Estimated from live ledgers and current market values.
    Estimated,

    /// Frozen at settlement.
    Actual,
}

impl From<read::contract::Basis> for Basis {
    fn from(basis: read::contract::Basis) -> Self {
        use read::contract::Basis as B;
        match basis {
            B::Estimated => Self::Estimated,
            B::Actual => Self::Actual,
        }
    }
}
