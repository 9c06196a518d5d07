//! [`Contract`] read model definitions.

use common::{Money, Percent};
use rust_decimal::Decimal;

use crate::domain::{
    allocation::Origin,
    contract::{self, Roi},
    Allocation, Contract, Expense,
};
#[cfg(doc)]
use crate::domain::{Investor, Sheep};

/// Wrapper around a value indicating that it's active.
#[derive(Clone, Copy, Debug)]
pub struct Active<T>(pub T);

/// [`Allocation`] joined with the current market value of its [`Sheep`].
#[derive(Clone, Debug)]
pub struct Allocated {
    /// [`Allocation`] itself.
    pub allocation: Allocation,

    /// Current market value of the allocated [`Sheep`], if assessed.
    pub market_value: Option<Money>,
}

impl Allocated {
    /// Returns the current value of the allocated [`Sheep`] in the provided
    /// currency.
    ///
    /// Falls back to the purchase price if the market value is not assessed
    /// or is in another currency. Disposed [`Sheep`] have no current value.
    #[must_use]
    pub fn current_value(&self) -> Decimal {
        if !self.allocation.is_active() {
            return Decimal::ZERO;
        }
        let price = self.allocation.purchase_price;
        self.market_value
            .filter(|v| v.currency == price.currency)
            .unwrap_or(price)
            .amount
    }
}

/// Where the financial figures of a [`Summary`] come from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Basis {
    /// Figures are estimated from the live ledgers.
    Estimated,

    /// Figures are frozen on settlement.
    Actual,
}

/// Number of [`Sheep`] in a [`Contract`] by their state.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Headcount {
    /// All [`Sheep`] ever allocated.
    pub total: usize,

    /// [`Sheep`] currently held.
    pub active: usize,

    /// [`Sheep`] born within the [`Contract`].
    pub born: usize,

    /// [`Sheep`] sold.
    pub sold: usize,

    /// [`Sheep`] deceased.
    pub deceased: usize,
}

impl Headcount {
    /// Counts the provided [`Allocated`] [`Sheep`].
    #[must_use]
    pub fn of(allocations: &[Allocated]) -> Self {
        use crate::domain::allocation::Status as S;

        allocations.iter().fold(Self::default(), |mut count, a| {
            count.total += 1;
            if a.allocation.origin == Origin::Born {
                count.born += 1;
            }
            match a.allocation.status() {
                S::Active => count.active += 1,
                S::Sold => count.sold += 1,
                S::Deceased => count.deceased += 1,
            }
            count
        })
    }
}

/// Financial summary of a [`Contract`].
///
/// Derived on demand and never persisted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Summary {
    /// ID of the summarized [`Contract`].
    pub contract_id: contract::Id,

    /// [`contract::Status`] of the [`Contract`] at calculation time.
    pub status: contract::Status,

    /// [`Basis`] of the financial figures.
    pub basis: Basis,

    /// Principal invested by the [`Investor`].
    pub investment: Money,

    /// Share of the gain going to the [`Investor`].
    pub profit_share: Percent,

    /// Sum of purchase prices of all the [`Sheep`] ever allocated.
    pub total_purchase_value: Money,

    /// Current value of the [`Sheep`] still held.
    pub total_current_value: Money,

    /// Sum of all the [`Expense`]s.
    pub total_expenses: Money,

    /// Realized revenue.
    pub total_revenue: Money,

    /// `total_current_value + total_revenue - total_expenses`.
    pub net_result: Money,

    /// [`Roi`] of the `net_result`.
    pub roi: Roi,

    /// Share of the gain going to the [`Investor`].
    pub investor_profit: Money,

    /// Share of the gain going to the farm owner.
    pub owner_profit: Money,

    /// [`Headcount`] of the [`Sheep`].
    pub headcount: Headcount,
}

impl Summary {
    /// Calculates [`Summary`] of the provided [`Contract`] and its ledgers.
    ///
    /// A completed [`Contract`] is summarized from its frozen settlement only,
    /// so the ledgers affect just the informational figures.
    #[must_use]
    pub fn of(
        contract: &Contract,
        allocations: &[Allocated],
        expenses: &[Expense],
    ) -> Self {
        let currency = contract.investment.currency;
        let money = |amount| Money { amount, currency };

        let total_purchase_value: Decimal = allocations
            .iter()
            .map(|a| a.allocation.purchase_price.amount)
            .sum();
        let headcount = Headcount::of(allocations);

        let (basis, current_value, revenue, expenses, roi, investor_profit) =
            if let Some(s) = contract.settlement() {
                (
                    Basis::Actual,
                    Decimal::ZERO,
                    s.total_revenue.amount,
                    s.total_expenses.amount,
                    s.actual_roi,
                    s.investor_profit,
                )
            } else {
                let current_value: Decimal =
                    allocations.iter().map(Allocated::current_value).sum();
                let revenue: Decimal = allocations
                    .iter()
                    .filter_map(|a| a.allocation.sale_price())
                    .map(|p| p.amount)
                    .sum();
                let expenses: Decimal =
                    expenses.iter().map(|e| e.amount.amount).sum();
                let net_result = current_value + revenue - expenses;
                (
                    Basis::Estimated,
                    current_value,
                    revenue,
                    expenses,
                    contract.roi(net_result),
                    contract.investor_profit(net_result),
                )
            };
        let net_result = current_value + revenue - expenses;

        Self {
            contract_id: contract.id,
            status: contract.status(),
            basis,
            investment: contract.investment,
            profit_share: contract.profit_share,
            total_purchase_value: money(total_purchase_value),
            total_current_value: money(current_value),
            total_expenses: money(expenses),
            total_revenue: money(revenue),
            net_result: money(net_result),
            roi,
            investor_profit,
            owner_profit: contract.owner_profit(net_result),
            headcount,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date, DateTime, Money, Percent};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::domain::{
        allocation::{self, Disposition, Origin},
        contract::{self, Months, State},
        expense, investor, sheep, Allocation, Contract, Expense,
    };

    use super::{Allocated, Basis, Headcount, Summary};

    fn idr(amount: Decimal) -> Money {
        Money {
            amount,
            currency: Currency::Idr,
        }
    }

    fn contract(investment: Decimal, share: Decimal) -> Contract {
        Contract {
            id: contract::Id::new(),
            investor_id: investor::Id::new(),
            investment: idr(investment),
            profit_share: Percent::new(share).unwrap(),
            duration: Months::new(12).unwrap(),
            start_date: Date::from_calendar(2024, 1, 1).unwrap(),
            created_at: DateTime::now().coerce(),
            state: State::Active,
        }
    }

    fn allocated(
        contract: &Contract,
        purchase_price: Decimal,
        market_value: Option<Money>,
    ) -> Allocated {
        Allocated {
            allocation: Allocation {
                id: allocation::Id::new(),
                contract_id: contract.id,
                sheep_id: sheep::Id::new(),
                purchase_price: idr(purchase_price),
                origin: Origin::Purchased,
                allocated_at: DateTime::now().coerce(),
                disposition: None,
            },
            market_value,
        }
    }

    fn expense(contract: &Contract, amount: Decimal) -> Expense {
        Expense {
            id: expense::Id::new(),
            contract_id: contract.id,
            category: expense::Category::Feed,
            description: expense::Description::new("Hay").unwrap(),
            amount: idr(amount),
            spent_on: contract.start_date,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn estimates_unrealized_gain() {
        let c = contract(dec!(4500000), dec!(70));
        let sheep = [allocated(&c, dec!(4500000), Some(idr(dec!(5200000))))];

        let s = Summary::of(&c, &sheep, &[]);

        assert_eq!(s.basis, Basis::Estimated);
        assert_eq!(s.total_purchase_value.amount, dec!(4500000));
        assert_eq!(s.total_current_value.amount, dec!(5200000));
        assert_eq!(s.total_revenue.amount, dec!(0));
        assert_eq!(s.net_result.amount, dec!(5200000));
        assert_eq!(s.roi.rounded().value(), dec!(15.56));
        assert_eq!(s.investor_profit.amount, dec!(490000));
        assert_eq!(s.owner_profit.amount, dec!(210000));
    }

    #[test]
    fn subtracts_expenses() {
        let c = contract(dec!(4500000), dec!(70));
        let sheep = [allocated(&c, dec!(4500000), Some(idr(dec!(5200000))))];
        let expenses = [expense(&c, dec!(200000))];

        let s = Summary::of(&c, &sheep, &expenses);

        assert_eq!(s.total_expenses.amount, dec!(200000));
        assert_eq!(s.net_result.amount, dec!(5000000));
        assert_eq!(s.roi.rounded().value(), dec!(11.11));
        assert_eq!(s.investor_profit.amount, dec!(350000));
    }

    #[test]
    fn zero_investment_has_zero_roi() {
        let c = contract(dec!(0), dec!(70));
        let sheep = [allocated(&c, dec!(1000000), None)];

        let s = Summary::of(&c, &sheep, &[]);

        assert_eq!(s.roi.value(), dec!(0));
        assert_eq!(s.investor_profit.amount, dec!(700000));
    }

    #[test]
    fn completed_contract_uses_frozen_figures() {
        let mut c = contract(dec!(2000000), dec!(50));
        let settlement = c.settle(idr(dec!(1000000)), idr(dec!(300000)), None);
        c.state = State::Completed(settlement);
        let before = [allocated(&c, dec!(1500000), Some(idr(dec!(1500000))))];
        let mut after = before.clone();
        after[0].market_value = Some(idr(dec!(9000000)));

        let s = Summary::of(&c, &before, &[expense(&c, dec!(50000))]);

        assert_eq!(s.basis, Basis::Actual);
        assert_eq!(s.total_current_value.amount, dec!(0));
        assert_eq!(s.total_revenue.amount, dec!(1000000));
        assert_eq!(s.total_expenses.amount, dec!(300000));
        assert_eq!(s.net_result.amount, dec!(700000));
        assert_eq!(s.roi.value(), dec!(-65));
        assert_eq!(s.investor_profit.amount, dec!(-650000));
        assert_eq!(Summary::of(&c, &after, &[]), s);
    }

    #[test]
    fn falls_back_to_purchase_price() {
        let c = contract(dec!(1000000), dec!(70));
        let usd = Money {
            amount: dec!(500),
            currency: Currency::Usd,
        };
        let sheep = [
            allocated(&c, dec!(400000), None),
            allocated(&c, dec!(600000), Some(usd)),
        ];

        let s = Summary::of(&c, &sheep, &[]);

        assert_eq!(s.total_current_value.amount, dec!(1000000));
    }

    #[test]
    fn disposed_sheep_count_as_revenue_only() {
        let c = contract(dec!(3000000), dec!(60));
        let mut sold = allocated(&c, dec!(1000000), Some(idr(dec!(1200000))));
        sold.allocation.disposition = Some(Disposition::Sold {
            price: idr(dec!(1300000)),
            at: DateTime::now().coerce(),
        });
        let mut dead = allocated(&c, dec!(1000000), None);
        dead.allocation.disposition = Some(Disposition::Deceased {
            at: DateTime::now().coerce(),
        });
        let mut born = allocated(&c, dec!(0), Some(idr(dec!(800000))));
        born.allocation.origin = Origin::Born;
        let held = allocated(&c, dec!(1000000), None);

        let s = Summary::of(&c, &[sold, dead, born, held], &[]);

        assert_eq!(s.total_purchase_value.amount, dec!(3000000));
        assert_eq!(s.total_current_value.amount, dec!(1800000));
        assert_eq!(s.total_revenue.amount, dec!(1300000));
        assert_eq!(s.net_result.amount, dec!(3100000));
        assert_eq!(s.investor_profit.amount, dec!(60000));
        assert_eq!(
            s.headcount,
            Headcount {
                total: 4,
                active: 2,
                born: 1,
                sold: 1,
                deceased: 1,
            },
        );
    }

    #[test]
    fn is_idempotent() {
        let c = contract(dec!(4500000), dec!(70));
        let sheep = [allocated(&c, dec!(4500000), Some(idr(dec!(5200000))))];
        let expenses = [expense(&c, dec!(200000))];

        assert_eq!(
            Summary::of(&c, &sheep, &expenses),
            Summary::of(&c, &sheep, &expenses),
        );
    }
}
