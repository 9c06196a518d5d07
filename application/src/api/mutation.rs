//! GraphQL [`Mutation`]s definitions.

use common::{Date, Money, Percent};
use juniper::graphql_object;
use service::{command, domain, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers a new `Investor`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createInvestor",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_investor(
        name: api::investor::Name,
        ctx: &Context,
    ) -> Result<api::Investor, Error> {
        ctx.service()
            .execute(command::CreateInvestor { name: name.into() })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Registers a new `Sheep` on the farm.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `NEGATIVE_AMOUNT` - the provided market value is negative;
    /// - `SHEEP_TAG_OCCUPIED` - the provided `SheepTag` belongs to another
    ///                          `Sheep`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "registerSheep",
            health = ?health,
            market_value = ?market_value.map(|v| v.to_string()),
            otel.name = Self::SPAN_NAME,
            tag = %tag,
        ),
    )]
    pub async fn register_sheep(
        tag: api::sheep::Tag,
        health: api::sheep::Health,
        market_value: Option<Money>,
        ctx: &Context,
    ) -> Result<api::Sheep, Error> {
        ctx.service()
            .execute(command::RegisterSheep {
                tag: tag.into(),
                health: health.into(),
                market_value,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the market value of a `Sheep`, or clears it when omitted.
    ///
    /// Summaries of completed `Contract`s are not affected.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `SHEEP_NOT_EXISTS` - the `Sheep` with the specified ID does not
    ///                        exist;
    /// - `NEGATIVE_AMOUNT` - the provided market value is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateSheepMarketValue",
            market_value = ?market_value.map(|v| v.to_string()),
            otel.name = Self::SPAN_NAME,
            sheep_id = %sheep_id,
        ),
    )]
    pub async fn update_sheep_market_value(
        sheep_id: api::sheep::Id,
        market_value: Option<Money>,
        ctx: &Context,
    ) -> Result<api::Sheep, Error> {
        ctx.service()
            .execute(command::UpdateSheepMarketValue {
                sheep_id: sheep_id.into(),
                market_value,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the health of a `Sheep`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `SHEEP_NOT_EXISTS` - the `Sheep` with the specified ID does not
    ///                        exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateSheepHealth",
            health = ?health,
            otel.name = Self::SPAN_NAME,
            sheep_id = %sheep_id,
        ),
    )]
    pub async fn update_sheep_health(
        sheep_id: api::sheep::Id,
        health: api::sheep::Health,
        ctx: &Context,
    ) -> Result<api::Sheep, Error> {
        ctx.service()
            .execute(command::UpdateSheepHealth {
                sheep_id: sheep_id.into(),
                health: health.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new active `Contract` for the specified `Investor`.
    ///
    /// The `investment` currency becomes the `Contract` currency.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVESTOR_NOT_EXISTS` - the `Investor` with the specified ID does
    ///                           not exist;
    /// - `NON_POSITIVE_AMOUNT` - the provided investment is not positive;
    /// - `INVALID_CONTRACT_DURATION` - the duration is not within
    ///                                 `1..=600` months;
    /// - `CONTRACT_END_OUT_OF_RANGE` - the `Contract` would end beyond the
    ///                                 supported calendar.
    #[tracing::instrument(
        skip_all,
        fields(
            duration_months = duration_months,
            gql.name = "createContract",
            investment = %investment,
            investor_id = %investor_id,
            otel.name = Self::SPAN_NAME,
            profit_share = %profit_share,
            start_date = %start_date,
        ),
    )]
    pub async fn create_contract(
        investor_id: api::investor::Id,
        investment: Money,
        profit_share: Percent,
        duration_months: i32,
        start_date: Date,
        ctx: &Context,
    ) -> Result<api::Contract, Error> {
        define_error! {
            enum DurationError {
                #[code = "INVALID_CONTRACT_DURATION"]
                #[status = BAD_REQUEST]
                #[message = "`Contract` duration must be within `1..=600` \
                             months"]
                OutOfRange,
            }
        }

        let duration = u16::try_from(duration_months)
            .ok()
            .and_then(domain::contract::Months::new)
            .ok_or_else(|| DurationError::OutOfRange.into())
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateContract {
                investor_id: investor_id.into(),
                investment,
                profit_share,
                duration,
                start_date,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Allocates a `Sheep` to an active `Contract`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does
    ///                           not exist;
    /// - `CONTRACT_NOT_ACTIVE` - the `Contract` is completed or cancelled;
    /// - `CURRENCY_MISMATCH` - the price is not in the `Contract` currency;
    /// - `NEGATIVE_AMOUNT` - the provided purchase price is negative;
    /// - `SHEEP_NOT_EXISTS` - the `Sheep` with the specified ID does not
    ///                        exist;
    /// - `SHEEP_NOT_ALLOCATABLE` - the `Sheep` is sick or not in stock;
    /// - `SHEEP_ALREADY_ALLOCATED` - the `Sheep` is held by a `Contract`
    ///                               already.
    #[tracing::instrument(
        skip_all,
        fields(
            contract_id = %contract_id,
            gql.name = "allocateSheep",
            origin = ?origin,
            otel.name = Self::SPAN_NAME,
            purchase_price = %purchase_price,
            sheep_id = %sheep_id,
        ),
    )]
    pub async fn allocate_sheep(
        contract_id: api::contract::Id,
        sheep_id: api::sheep::Id,
        purchase_price: Money,
        origin: api::allocation::Origin,
        ctx: &Context,
    ) -> Result<api::Allocation, Error> {
        ctx.service()
            .execute(command::AllocateSheep {
                contract_id: contract_id.into(),
                sheep_id: sheep_id.into(),
                purchase_price,
                origin: origin.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Removes an active `Sheep` allocation from a `Contract`, as if it was
    /// never allocated.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does
    ///                           not exist;
    /// - `CONTRACT_NOT_ACTIVE` - the `Contract` is completed or cancelled;
    /// - `SHEEP_NOT_EXISTS` - the `Sheep` with the specified ID does not
    ///                        exist;
    /// - `SHEEP_NOT_ALLOCATED` - the `Sheep` is not held by the `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            contract_id = %contract_id,
            gql.name = "deallocateSheep",
            otel.name = Self::SPAN_NAME,
            sheep_id = %sheep_id,
        ),
    )]
    pub async fn deallocate_sheep(
        contract_id: api::contract::Id,
        sheep_id: api::sheep::Id,
        ctx: &Context,
    ) -> Result<api::Allocation, Error> {
        ctx.service()
            .execute(command::DeallocateSheep {
                contract_id: contract_id.into(),
                sheep_id: sheep_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Records the sale of a `Sheep` held by a `Contract`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does
    ///                           not exist;
    /// - `CONTRACT_NOT_ACTIVE` - the `Contract` is completed or cancelled;
    /// - `CURRENCY_MISMATCH` - the price is not in the `Contract` currency;
    /// - `NON_POSITIVE_AMOUNT` - the provided price is not positive;
    /// - `SHEEP_NOT_EXISTS` - the `Sheep` with the specified ID does not
    ///                        exist;
    /// - `SHEEP_NOT_ALLOCATED` - the `Sheep` is not held by the `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            contract_id = %contract_id,
            gql.name = "sellSheep",
            otel.name = Self::SPAN_NAME,
            price = %price,
            sheep_id = %sheep_id,
        ),
    )]
    pub async fn sell_sheep(
        contract_id: api::contract::Id,
        sheep_id: api::sheep::Id,
        price: Money,
        ctx: &Context,
    ) -> Result<api::Allocation, Error> {
        ctx.service()
            .execute(command::SellSheep {
                contract_id: contract_id.into(),
                sheep_id: sheep_id.into(),
                price,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Records the death of a `Sheep` held by a `Contract`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does
    ///                           not exist;
    /// - `CONTRACT_NOT_ACTIVE` - the `Contract` is completed or cancelled;
    /// - `SHEEP_NOT_EXISTS` - the `Sheep` with the specified ID does not
    ///                        exist;
    /// - `SHEEP_NOT_ALLOCATED` - the `Sheep` is not held by the `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            contract_id = %contract_id,
            gql.name = "reportSheepDeath",
            otel.name = Self::SPAN_NAME,
            sheep_id = %sheep_id,
        ),
    )]
    pub async fn report_sheep_death(
        contract_id: api::contract::Id,
        sheep_id: api::sheep::Id,
        ctx: &Context,
    ) -> Result<api::Allocation, Error> {
        ctx.service()
            .execute(command::ReportSheepDeath {
                contract_id: contract_id.into(),
                sheep_id: sheep_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Books an `Expense` against an active `Contract`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does
    ///                           not exist;
    /// - `CONTRACT_NOT_ACTIVE` - the `Contract` is completed or cancelled;
    /// - `CURRENCY_MISMATCH` - the amount is not in the `Contract` currency;
    /// - `NON_POSITIVE_AMOUNT` - the provided amount is not positive;
    /// - `EXPENSE_BEFORE_START` - the money was spent before the `Contract`
    ///                            start date.
    #[tracing::instrument(
        skip_all,
        fields(
            amount = %amount,
            category = ?category,
            contract_id = %contract_id,
            gql.name = "addExpense",
            otel.name = Self::SPAN_NAME,
            spent_on = %spent_on,
        ),
    )]
    pub async fn add_expense(
        contract_id: api::contract::Id,
        category: api::expense::Category,
        description: api::expense::Description,
        amount: Money,
        spent_on: Date,
        ctx: &Context,
    ) -> Result<api::Expense, Error> {
        ctx.service()
            .execute(command::AddExpense {
                contract_id: contract_id.into(),
                category: category.into(),
                description: description.into(),
                amount,
                spent_on,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Deletes an `Expense` of an active `Contract`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EXPENSE_NOT_EXISTS` - the `Expense` with the specified ID does not
    ///                          exist;
    /// - `CONTRACT_NOT_ACTIVE` - the `Contract` is completed or cancelled.
    #[tracing::instrument(
        skip_all,
        fields(
            expense_id = %expense_id,
            gql.name = "deleteExpense",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_expense(
        expense_id: api::expense::Id,
        ctx: &Context,
    ) -> Result<api::Expense, Error> {
        ctx.service()
            .execute(command::DeleteExpense {
                expense_id: expense_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Completes an active `Contract`, freezing its final figures.
    ///
    /// A `Contract` is settled at most once.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does
    ///                           not exist;
    /// - `CONTRACT_NOT_ACTIVE` - the `Contract` is completed or cancelled
    ///                           already;
    /// - `CURRENCY_MISMATCH` - a total is not in the `Contract` currency;
    /// - `NEGATIVE_AMOUNT` - a provided total is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            contract_id = %contract_id,
            gql.name = "completeContract",
            otel.name = Self::SPAN_NAME,
            total_expenses = %total_expenses,
            total_revenue = %total_revenue,
        ),
    )]
    pub async fn complete_contract(
        contract_id: api::contract::Id,
        total_revenue: Money,
        total_expenses: Money,
        notes: Option<api::contract::Notes>,
        ctx: &Context,
    ) -> Result<api::Contract, Error> {
        ctx.service()
            .execute(command::CompleteContract {
                contract_id: contract_id.into(),
                total_revenue,
                total_expenses,
                notes: notes.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels an active `Contract`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `CONTRACT_NOT_EXISTS` - the `Contract` with the specified ID does
    ///                           not exist;
    /// - `CONTRACT_NOT_ACTIVE` - the `Contract` is completed or cancelled
    ///                           already.
    #[tracing::instrument(
        skip_all,
        fields(
            contract_id = %contract_id,
            gql.name = "cancelContract",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_contract(
        contract_id: api::contract::Id,
        notes: Option<api::contract::Notes>,
        ctx: &Context,
    ) -> Result<api::Contract, Error> {
        ctx.service()
            .execute(command::CancelContract {
                contract_id: contract_id.into(),
                notes: notes.map(Into::into),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum LedgerError {
        #[code = "CONTRACT_NOT_ACTIVE"]
        #[status = CONFLICT]
        #[message = "`Contract` is completed or cancelled"]
        ContractNotActive,

        #[code = "CURRENCY_MISMATCH"]
        #[status = BAD_REQUEST]
        #[message = "Amount is not in the `Contract` currency"]
        CurrencyMismatch,

        #[code = "SHEEP_NOT_ALLOCATED"]
        #[status = CONFLICT]
        #[message = "`Sheep` is not held by the `Contract`"]
        SheepNotAllocated,
    }
}

define_error! {
    enum AmountError {
        #[code = "NEGATIVE_AMOUNT"]
        #[status = BAD_REQUEST]
        #[message = "Amount must not be negative"]
        Negative,

        #[code = "NON_POSITIVE_AMOUNT"]
        #[status = BAD_REQUEST]
        #[message = "Amount must be positive"]
        NonPositive,
    }
}

impl AsError for command::create_investor::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::register_sheep::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SHEEP_TAG_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`SheepTag` is occupied by another `Sheep`"]
                TagOccupied,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NegativeMarketValue(_) => AmountError::Negative.into(),
            Self::TagOccupied(_) => Error::TagOccupied.into(),
        })
    }
}

impl AsError for command::update_sheep_market_value::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NegativeMarketValue(_) => AmountError::Negative.into(),
            Self::SheepNotExists(_) => api::query::SheepError::NotExists.into(),
        })
    }
}

impl AsError for command::update_sheep_health::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::SheepNotExists(_) => api::query::SheepError::NotExists.into(),
        })
    }
}

impl AsError for command::create_contract::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CONTRACT_END_OUT_OF_RANGE"]
                #[status = BAD_REQUEST]
                #[message = "`Contract` would end beyond the supported \
                             calendar"]
                EndOutOfRange,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::EndOutOfRange(_) => Error::EndOutOfRange.into(),
            Self::InvestorNotExists(_) => {
                api::query::InvestorError::NotExists.into()
            }
            Self::NonPositiveInvestment(_) => AmountError::NonPositive.into(),
        })
    }
}

impl AsError for command::allocate_sheep::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "SHEEP_ALREADY_ALLOCATED"]
                #[status = CONFLICT]
                #[message = "`Sheep` is held by a `Contract` already"]
                SheepAlreadyAllocated,

                #[code = "SHEEP_NOT_ALLOCATABLE"]
                #[status = CONFLICT]
                #[message = "`Sheep` is sick or not in stock"]
                SheepNotAllocatable,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ContractNotActive(_) => LedgerError::ContractNotActive.into(),
            Self::ContractNotExists(_) => {
                api::query::ContractError::NotExists.into()
            }
            Self::CurrencyMismatch { .. } => {
                LedgerError::CurrencyMismatch.into()
            }
            Self::NegativePurchasePrice(_) => AmountError::Negative.into(),
            Self::SheepAlreadyAllocated(_) => {
                Error::SheepAlreadyAllocated.into()
            }
            Self::SheepNotAllocatable(_) => Error::SheepNotAllocatable.into(),
            Self::SheepNotExists(_) => api::query::SheepError::NotExists.into(),
        })
    }
}

impl AsError for command::deallocate_sheep::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ContractNotActive(_) => LedgerError::ContractNotActive.into(),
            Self::ContractNotExists(_) => {
                api::query::ContractError::NotExists.into()
            }
            Self::SheepNotAllocated(_) => LedgerError::SheepNotAllocated.into(),
            Self::SheepNotExists(_) => api::query::SheepError::NotExists.into(),
        })
    }
}

impl AsError for command::sell_sheep::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ContractNotActive(_) => LedgerError::ContractNotActive.into(),
            Self::ContractNotExists(_) => {
                api::query::ContractError::NotExists.into()
            }
            Self::CurrencyMismatch { .. } => {
                LedgerError::CurrencyMismatch.into()
            }
            Self::NonPositivePrice(_) => AmountError::NonPositive.into(),
            Self::SheepNotAllocated(_) => LedgerError::SheepNotAllocated.into(),
            Self::SheepNotExists(_) => api::query::SheepError::NotExists.into(),
        })
    }
}

impl AsError for command::report_sheep_death::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ContractNotActive(_) => LedgerError::ContractNotActive.into(),
            Self::ContractNotExists(_) => {
                api::query::ContractError::NotExists.into()
            }
            Self::SheepNotAllocated(_) => LedgerError::SheepNotAllocated.into(),
            Self::SheepNotExists(_) => api::query::SheepError::NotExists.into(),
        })
    }
}

impl AsError for command::add_expense::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EXPENSE_BEFORE_START"]
                #[status = BAD_REQUEST]
                #[message = "`Expense` is dated before the `Contract` start"]
                SpentBeforeStart,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ContractNotActive(_) => LedgerError::ContractNotActive.into(),
            Self::ContractNotExists(_) => {
                api::query::ContractError::NotExists.into()
            }
            Self::CurrencyMismatch { .. } => {
                LedgerError::CurrencyMismatch.into()
            }
            Self::NonPositiveAmount(_) => AmountError::NonPositive.into(),
            Self::SpentBeforeStart { .. } => Error::SpentBeforeStart.into(),
        })
    }
}

impl AsError for command::delete_expense::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EXPENSE_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Expense` with the specified ID does not exist"]
                ExpenseNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ContractNotActive(_) => LedgerError::ContractNotActive.into(),
            Self::ContractNotExists(_) => {
                api::query::ContractError::NotExists.into()
            }
            Self::ExpenseNotExists(_) => Error::ExpenseNotExists.into(),
        })
    }
}

impl AsError for command::complete_contract::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ContractNotActive(_) => LedgerError::ContractNotActive.into(),
            Self::ContractNotExists(_) => {
                api::query::ContractError::NotExists.into()
            }
            Self::CurrencyMismatch { .. } => {
                LedgerError::CurrencyMismatch.into()
            }
            Self::NegativeTotal(_) => AmountError::Negative.into(),
        })
    }
}

impl AsError for command::cancel_contract::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::ContractNotActive(_) => LedgerError::ContractNotActive.into(),
            Self::ContractNotExists(_) => {
                api::query::ContractError::NotExists.into()
            }
        })
    }
}
