//! Fixtures shared by the [`Service`] integration tests.

#![allow(dead_code, reason = "not every test uses every fixture")]

use std::time::Duration;

use common::{money::Currency, Money, Percent};
use rust_decimal::Decimal;
use service::{
    command::{
        AllocateSheep, CreateContract, CreateInvestor, RegisterSheep,
    },
    domain::{allocation, contract, investor, sheep, Allocation, Contract},
    infra::Memory,
    Command as _, Config, RetryPolicy, Service,
};

/// [`Service`] over a [`Memory`] database.
pub struct Farm {
    /// [`Service`] under test.
    pub service: Service<Memory>,

    /// [`Memory`] database of the [`Service`].
    pub memory: Memory,
}

impl Farm {
    /// Creates a new empty [`Farm`].
    pub fn new() -> Self {
        let memory = Memory::new();
        let config = Config {
            read_retry: RetryPolicy {
                attempts: 3,
                backoff: Duration::from_millis(1),
            },
        };
        Self {
            service: Service::new(config, memory.clone()),
            memory,
        }
    }

    /// Creates a new active IDR [`Contract`] starting at `2024-01-01`.
    pub async fn contract(&self, investment: Decimal, share: Decimal) -> Contract {
        let investor = self
            .service
            .execute(CreateInvestor {
                name: investor::Name::new("Budi").unwrap(),
            })
            .await
            .unwrap();
        self.service
            .execute(CreateContract {
                investor_id: investor.id,
                investment: idr(investment),
                profit_share: Percent::new(share).unwrap(),
                duration: contract::Months::new(12).unwrap(),
                start_date: "2024-01-01".parse().unwrap(),
            })
            .await
            .unwrap()
    }

    /// Registers a new healthy [`sheep::Sheep`] with the provided market
    /// value.
    pub async fn sheep(
        &self,
        tag: &str,
        market_value: Option<Decimal>,
    ) -> sheep::Id {
        self.service
            .execute(RegisterSheep {
                tag: sheep::Tag::new(tag).unwrap(),
                health: sheep::Health::Healthy,
                market_value: market_value.map(idr),
            })
            .await
            .unwrap()
            .id
    }

    /// Allocates the provided purchased [`sheep::Sheep`] to the provided
    /// [`Contract`].
    pub async fn allocate(
        &self,
        contract_id: contract::Id,
        sheep_id: sheep::Id,
        price: Decimal,
    ) -> Allocation {
        self.service
            .execute(AllocateSheep {
                contract_id,
                sheep_id,
                purchase_price: idr(price),
                origin: allocation::Origin::Purchased,
            })
            .await
            .unwrap()
    }
}

/// Creates an IDR [`Money`] amount.
pub fn idr(amount: Decimal) -> Money {
    Money {
        amount,
        currency: Currency::Idr,
    }
}
