//! [`Contract`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::investor;
#[cfg(doc)]
use crate::domain::{Allocation, Investor};

/// Profit-sharing agreement between an [`Investor`] and the farm, backed by
/// the [`Allocation`]s of sheep.
#[derive(Clone, Debug)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: Id,

    /// ID of the [`Investor`] funding this [`Contract`].
    pub investor_id: investor::Id,

    /// Principal invested by the [`Investor`].
    ///
    /// Every other amount of this [`Contract`] is in the same currency.
    pub investment: Money,

    /// Share of the gain going to the [`Investor`].
    ///
    /// The farm owner receives the [`complement`].
    ///
    /// [`complement`]: Percent::complement
    pub profit_share: Percent,

    /// Duration of this [`Contract`].
    pub duration: Months,

    /// [`Date`] this [`Contract`] starts at.
    pub start_date: Date,

    /// [`DateTime`] when this [`Contract`] was created.
    pub created_at: CreationDateTime,

    /// Current [`State`] of this [`Contract`].
    pub state: State,
}

impl Contract {
    /// Returns [`Status`] of this [`Contract`].
    #[must_use]
    pub fn status(&self) -> Status {
        match self.state {
            State::Active => Status::Active,
            State::Completed(_) => Status::Completed,
            State::Cancelled(_) => Status::Cancelled,
        }
    }

    /// Indicates whether this [`Contract`] is active, so its ledgers may
    /// change.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Active)
    }

    /// Returns [`Settlement`] of this [`Contract`], if it's completed.
    #[must_use]
    pub fn settlement(&self) -> Option<&Settlement> {
        match &self.state {
            State::Completed(s) => Some(s),
            State::Active | State::Cancelled(_) => None,
        }
    }

    /// Returns [`Date`] this [`Contract`] ends at.
    ///
    /// [`None`] is returned if the end falls outside the supported calendar.
    #[must_use]
    pub fn end_date(&self) -> Option<Date> {
        self.start_date.checked_add_months(self.duration.get())
    }

    /// Returns share of the gain going to the farm owner.
    #[must_use]
    pub fn owner_share(&self) -> Percent {
        self.profit_share.complement()
    }

    /// Returns gain of the provided net result over the investment.
    ///
    /// Negative for a loss.
    #[must_use]
    pub fn gain(&self, net_result: Decimal) -> Decimal {
        net_result - self.investment.amount
    }

    /// Calculates [`Roi`] of the provided net result.
    #[must_use]
    pub fn roi(&self, net_result: Decimal) -> Roi {
        Roi::of(self.gain(net_result), self.investment.amount)
    }

    /// Calculates the [`Investor`] profit of the provided net result.
    ///
    /// Losses are shared with the same proportion and result in a negative
    /// profit.
    #[must_use]
    pub fn investor_profit(&self, net_result: Decimal) -> Money {
        self.share_of(net_result, self.profit_share)
    }

    /// Calculates the farm owner profit of the provided net result.
    #[must_use]
    pub fn owner_profit(&self, net_result: Decimal) -> Money {
        self.share_of(net_result, self.owner_share())
    }

    /// Calculates the provided share of the gain.
    fn share_of(&self, net_result: Decimal, share: Percent) -> Money {
        Money {
            amount: self.gain(net_result) * share.ratio(),
            currency: self.investment.currency,
        }
    }

    /// Freezes the provided totals into a [`Settlement`] of this
    /// [`Contract`].
    ///
    /// The value of remaining sheep is expected to be realized in the
    /// `total_revenue` already.
    #[must_use]
    pub fn settle(
        &self,
        total_revenue: Money,
        total_expenses: Money,
        notes: Option<Notes>,
    ) -> Settlement {
        let net_result = total_revenue.amount - total_expenses.amount;
        Settlement {
            settled_at: common::DateTime::now().coerce(),
            total_revenue,
            total_expenses,
            investor_profit: self.investor_profit(net_result),
            actual_roi: self.roi(net_result),
            notes,
        }
    }
}

/// ID of a [`Contract`].
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

/// Duration of a [`Contract`] in whole months.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Months(i16);

impl Months {
    /// Longest supported [`Contract`] duration.
    pub const MAX: u16 = 600;

    /// Creates new [`Months`] if the given number is in the `1..=600` range.
    #[must_use]
    pub fn new(months: u16) -> Option<Self> {
        if !(1..=Self::MAX).contains(&months) {
            return None;
        }
        i16::try_from(months).ok().map(Self)
    }

    /// Returns the number of months.
    #[must_use]
    pub fn get(self) -> u32 {
        u32::from(self.0.unsigned_abs())
    }
}

/// Return on investment, in percents of the principal.
///
/// Negative for a loss.
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    FromStr,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Roi(Decimal);

impl Roi {
    /// [`Roi`] of a zero gain.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Calculates [`Roi`] of the provided `gain` over the `investment`.
    ///
    /// Zero `investment` results in [`Roi::ZERO`].
    #[must_use]
    pub fn of(gain: Decimal, investment: Decimal) -> Self {
        if investment.is_zero() {
            return Self::ZERO;
        }
        Self(gain / investment * Decimal::ONE_HUNDRED)
    }

    /// Returns the value of this [`Roi`].
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }

    /// Rounds this [`Roi`] to 2 decimal places.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self(self.0.round_dp_with_strategy(
            2,
            RoundingStrategy::MidpointAwayFromZero,
        ))
    }
}

/// Free-text notes attached to a closed [`Contract`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Notes(String);

impl Notes {
    /// Creates new [`Notes`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `notes` are not empty.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(notes: impl Into<String>) -> Self {
        Self(notes.into())
    }

    /// Creates new [`Notes`] if the given `notes` are valid.
    #[must_use]
    pub fn new(notes: impl Into<String>) -> Option<Self> {
        let notes = notes.into();
        Self::check(&notes).then_some(Self(notes))
    }

    /// Checks whether the given `notes` are valid [`Notes`].
    fn check(notes: impl AsRef<str>) -> bool {
        let notes = notes.as_ref();
        notes.trim() == notes && !notes.is_empty() && notes.len() <= 2048
    }
}

impl FromStr for Notes {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Notes`")
    }
}

/// State of a [`Contract`].
#[derive(Clone, Debug)]
pub enum State {
    /// [`Contract`] is running, its ledgers may change.
    Active,

    /// [`Contract`] is settled and its financial outcome is frozen.
    Completed(Settlement),

    /// [`Contract`] was cancelled before settlement.
    Cancelled(Cancellation),
}

define_kind! {
    #[doc = "Status of a [`Contract`]."]
    enum Status {
        #[doc = "[`Contract`] is running."]
        Active = 1,

        #[doc = "[`Contract`] is settled."]
        Completed = 2,

        #[doc = "[`Contract`] is cancelled."]
        Cancelled = 3,
    }
}

/// Frozen financial outcome of a completed [`Contract`].
#[derive(Clone, Debug)]
pub struct Settlement {
    /// [`DateTime`] when the [`Contract`] was settled.
    pub settled_at: SettlementDateTime,

    /// Total revenue realized by the [`Contract`].
    pub total_revenue: Money,

    /// Total expenses of the [`Contract`].
    pub total_expenses: Money,

    /// Profit paid to the [`Investor`].
    pub investor_profit: Money,

    /// Actual [`Roi`] of the [`Contract`].
    pub actual_roi: Roi,

    /// [`Notes`] left on settlement.
    pub notes: Option<Notes>,
}

/// Cancellation details of a [`Contract`].
#[derive(Clone, Debug)]
pub struct Cancellation {
    /// [`DateTime`] when the [`Contract`] was cancelled.
    pub cancelled_at: CancellationDateTime,

    /// [`Notes`] left on cancellation.
    pub notes: Option<Notes>,
}

/// Transition of an active [`Contract`] into a terminal [`State`].
#[derive(Clone, Debug)]
pub struct Transition {
    /// ID of the transitioned [`Contract`].
    pub id: Id,

    /// Terminal [`State`] the [`Contract`] transitions into.
    pub outcome: Outcome,
}

/// Terminal [`State`] of a [`Contract`].
#[derive(Clone, Debug, From)]
pub enum Outcome {
    /// [`Contract`] is settled.
    Completed(Settlement),

    /// [`Contract`] is cancelled.
    Cancelled(Cancellation),
}

impl From<Outcome> for State {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Completed(s) => Self::Completed(s),
            Outcome::Cancelled(c) => Self::Cancelled(c),
        }
    }
}

/// [`DateTime`] when a [`Contract`] was created.
pub type CreationDateTime = DateTimeOf<(Contract, unit::Creation)>;

/// [`DateTime`] when a [`Contract`] was settled.
pub type SettlementDateTime = DateTimeOf<(Contract, Settlement)>;

/// [`DateTime`] when a [`Contract`] was cancelled.
pub type CancellationDateTime = DateTimeOf<(Contract, Cancellation)>;

#[cfg(test)]
mod spec {
    use common::{money::Currency, Date, DateTime, Money, Percent};
    use rust_decimal_macros::dec;

    use crate::domain::investor;

    use super::{Contract, Id, Months, Roi, State, Status};

    fn contract(investment: Money, share: Percent, months: u16) -> Contract {
        Contract {
            id: Id::new(),
            investor_id: investor::Id::new(),
            investment,
            profit_share: share,
            duration: Months::new(months).unwrap(),
            start_date: "2024-01-31".parse().unwrap(),
            created_at: DateTime::now().coerce(),
            state: State::Active,
        }
    }

    fn idr(amount: rust_decimal::Decimal) -> Money {
        Money {
            amount,
            currency: Currency::Idr,
        }
    }

    #[test]
    fn end_date_is_calendar_aware() {
        let c = contract(idr(dec!(4500000)), Percent::new(dec!(70)).unwrap(), 1);
        assert_eq!(c.end_date(), Date::from_calendar(2024, 2, 29));

        let c = contract(idr(dec!(4500000)), Percent::new(dec!(70)).unwrap(), 13);
        assert_eq!(c.end_date(), Date::from_calendar(2025, 2, 28));

        let c =
            contract(idr(dec!(4500000)), Percent::new(dec!(70)).unwrap(), 600);
        assert_eq!(c.end_date(), Date::from_calendar(2074, 1, 31));
    }

    #[test]
    fn months_are_bounded() {
        assert!(Months::new(0).is_none());
        assert_eq!(Months::new(1).map(Months::get), Some(1));
        assert_eq!(Months::new(600).map(Months::get), Some(600));
        assert!(Months::new(601).is_none());
    }

    #[test]
    fn shares_gain_linearly() {
        let c = contract(idr(dec!(4500000)), Percent::new(dec!(70)).unwrap(), 12);

        assert_eq!(c.investor_profit(dec!(5200000)).amount, dec!(490000));
        assert_eq!(c.owner_profit(dec!(5200000)).amount, dec!(210000));
        assert_eq!(c.roi(dec!(5200000)).rounded().value(), dec!(15.56));
    }

    #[test]
    fn shares_losses_unclamped() {
        let c = contract(idr(dec!(2000000)), Percent::new(dec!(50)).unwrap(), 12);

        assert_eq!(c.investor_profit(dec!(700000)).amount, dec!(-650000));
        assert_eq!(c.owner_profit(dec!(700000)).amount, dec!(-650000));
        assert_eq!(c.roi(dec!(700000)).value(), dec!(-65));
    }

    #[test]
    fn zero_investment_has_zero_roi() {
        assert_eq!(Roi::of(dec!(100), dec!(0)), Roi::ZERO);

        let c = contract(idr(dec!(0)), Percent::new(dec!(70)).unwrap(), 12);
        assert_eq!(c.roi(dec!(1000000)), Roi::ZERO);
    }

    #[test]
    fn settles_from_frozen_totals() {
        let c = contract(idr(dec!(2000000)), Percent::new(dec!(50)).unwrap(), 12);

        let s = c.settle(idr(dec!(1000000)), idr(dec!(300000)), None);

        assert_eq!(s.total_revenue.amount, dec!(1000000));
        assert_eq!(s.total_expenses.amount, dec!(300000));
        assert_eq!(s.investor_profit.amount, dec!(-650000));
        assert_eq!(s.actual_roi.value(), dec!(-65));
        assert_eq!(c.status(), Status::Active);
    }
}
