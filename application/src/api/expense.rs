//! [`Expense`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, api::scalar, Context};

/// An operational expense booked against a `Contract`.
#[derive(Clone, Debug, From, Into)]
pub struct Expense(domain::Expense);

/// An operational expense booked against a `Contract`.
#[graphql_object(context = Context)]
impl Expense {
    /// Unique identifier of this `Expense`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// `Contract` this `Expense` is booked against.
    #[must_use]
    pub fn contract(&self) -> api::Contract {
        #[expect(
            unsafe_code,
            reason = "`Expense` references an existing `Contract`"
        )]
        unsafe {
            api::Contract::new_unchecked(self.0.contract_id)
        }
    }

    /// Category of this `Expense`.
    #[must_use]
    pub fn category(&self) -> Category {
        self.0.category.into()
    }

    /// Description of this `Expense`.
    #[must_use]
    pub fn description(&self) -> Description {
        self.0.description.clone().into()
    }

    /// Amount spent.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.0.amount.rounded()
    }

    /// `Date` when the money was spent.
    #[must_use]
    pub fn spent_on(&self) -> Date {
        self.0.spent_on
    }

    /// `DateTime` when this `Expense` was booked.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of an `Expense`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::expense::Id)]
#[into(domain::expense::Id)]
#[graphql(name = "ExpenseId", transparent)]
pub struct Id(Uuid);

/// Description of an `Expense`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ExpenseDescription",
    with = scalar::Via::<domain::expense::Description>,
)]
pub struct Description(domain::expense::Description);

/// Category of an `Expense`.
#[derive(Clone, Copy, Debug, GraphQLEnum)]
#[graphql(name = "ExpenseCategory")]
pub enum Category {
    /// Fodder and supplements.
    Feed,

    /// Medicine.
    Medicine,

    /// Vaccination.
    Vaccination,

    /// Shepherd labor.
    Labor,

    /// Transportation of animals or supplies.
    Transport,

    /// Maintenance of cages and equipment.
    Maintenance,

    /// Anything else.
    Other,
}

impl From<domain::expense::Category> for Category {
    fn from(category: domain::expense::Category) -> Self {
        use domain::expense::Category as C;
        match category {
            C::Feed => Self::Feed,
            C::Medicine => Self::Medicine,
            C::Vaccination => Self::Vaccination,
            C::Labor => Self::Labor,
            C::Transport => Self::Transport,
            C::Maintenance => Self::Maintenance,
            C::Other => Self::Other,
        }
    }
}

impl From<Category> for domain::expense::Category {
    fn from(category: Category) -> Self {
        match category {
            Category::Feed => Self::Feed,
            Category::Medicine => Self::Medicine,
            Category::Vaccination => Self::Vaccination,
            Category::Labor => Self::Labor,
            Category::Transport => Self::Transport,
            Category::Maintenance => Self::Maintenance,
            Category::Other => Self::Other,
        }
    }
}
