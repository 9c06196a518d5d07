mod common;

use ::common::operations::{By, Select};
use rust_decimal_macros::dec;
use service::{
    command::{AddExpense, CompleteContract, SellSheep, UpdateSheepMarketValue},
    domain::{contract, expense, Contract, Expense},
    error::Kind,
    infra::{database, Database, Memory},
    query::{self, ContractSummary, Retrying},
    read::contract::{Allocated, Basis},
    Classify as _, Command as _, Config, Query as _, Service,
};
use tracerr::Traced;

use self::common::{idr, Farm};

#[tokio::test]
async fn estimates_active_contract() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(4500000), dec!(70)).await;
    let sheep_id = farm.sheep("A-001", Some(dec!(5200000))).await;
    _ = farm.allocate(contract.id, sheep_id, dec!(4500000)).await;

    let summary = farm
        .service
        .execute(ContractSummary {
            contract_id: contract.id,
        })
        .await
        .unwrap();
    assert_eq!(summary.basis, Basis::Estimated);
    assert_eq!(summary.total_current_value.amount, dec!(5200000));
    assert_eq!(summary.net_result.amount, dec!(5200000));
    assert_eq!(summary.roi.rounded().value(), dec!(15.56));
    assert_eq!(summary.investor_profit.amount, dec!(490000));

    _ = farm
        .service
        .execute(AddExpense {
            contract_id: contract.id,
            category: expense::Category::Feed,
            description: expense::Description::new("feed").unwrap(),
            amount: idr(dec!(200000)),
            spent_on: "2024-02-01".parse().unwrap(),
        })
        .await
        .unwrap();

    let summary = farm
        .service
        .execute(ContractSummary {
            contract_id: contract.id,
        })
        .await
        .unwrap();
    assert_eq!(summary.total_expenses.amount, dec!(200000));
    assert_eq!(summary.net_result.amount, dec!(5000000));
    assert_eq!(summary.roi.rounded().value(), dec!(11.11));
    assert_eq!(summary.investor_profit.amount, dec!(350000));
    assert_eq!(summary.owner_profit.amount, dec!(150000));
}

#[tokio::test]
async fn accounts_sales_as_revenue() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(4000000), dec!(50)).await;
    let sold = farm.sheep("A-001", Some(dec!(2500000))).await;
    let kept = farm.sheep("A-002", None).await;
    _ = farm.allocate(contract.id, sold, dec!(2000000)).await;
    _ = farm.allocate(contract.id, kept, dec!(2000000)).await;

    _ = farm
        .service
        .execute(SellSheep {
            contract_id: contract.id,
            sheep_id: sold,
            price: idr(dec!(3000000)),
        })
        .await
        .unwrap();

    let summary = farm
        .service
        .execute(ContractSummary {
            contract_id: contract.id,
        })
        .await
        .unwrap();
    assert_eq!(summary.total_purchase_value.amount, dec!(4000000));
    assert_eq!(summary.total_current_value.amount, dec!(2000000));
    assert_eq!(summary.total_revenue.amount, dec!(3000000));
    assert_eq!(summary.net_result.amount, dec!(5000000));
    assert_eq!(summary.investor_profit.amount, dec!(500000));
    assert_eq!(summary.headcount.total, 2);
    assert_eq!(summary.headcount.active, 1);
    assert_eq!(summary.headcount.sold, 1);
}

#[tokio::test]
async fn completed_contract_keeps_frozen_figures() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(2000000), dec!(50)).await;
    let sheep_id = farm.sheep("A-001", Some(dec!(2000000))).await;
    _ = farm.allocate(contract.id, sheep_id, dec!(2000000)).await;

    _ = farm
        .service
        .execute(CompleteContract {
            contract_id: contract.id,
            total_revenue: idr(dec!(1000000)),
            total_expenses: idr(dec!(300000)),
            notes: None,
        })
        .await
        .unwrap();
    let before = farm
        .service
        .execute(ContractSummary {
            contract_id: contract.id,
        })
        .await
        .unwrap();

    _ = farm
        .service
        .execute(UpdateSheepMarketValue {
            sheep_id,
            market_value: Some(idr(dec!(9000000))),
        })
        .await
        .unwrap();
    let after = farm
        .service
        .execute(ContractSummary {
            contract_id: contract.id,
        })
        .await
        .unwrap();

    assert_eq!(before, after);
    assert_eq!(after.basis, Basis::Actual);
    assert_eq!(after.total_current_value.amount, dec!(0));
    assert_eq!(after.net_result.amount, dec!(700000));
    assert_eq!(after.roi.value(), dec!(-65));
    assert_eq!(after.investor_profit.amount, dec!(-650000));
}

#[tokio::test]
async fn summary_is_idempotent() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(4500000), dec!(70)).await;
    let sheep_id = farm.sheep("A-001", Some(dec!(5200000))).await;
    _ = farm.allocate(contract.id, sheep_id, dec!(4500000)).await;

    let query = ContractSummary {
        contract_id: contract.id,
    };
    let first = farm.service.execute(query).await.unwrap();
    let second = farm.service.execute(query).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn missing_contract_is_not_found() {
    let farm = Farm::new();

    let err = farm
        .service
        .execute(ContractSummary {
            contract_id: service::domain::contract::Id::new(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Kind::NotFound);
}

#[tokio::test]
async fn retries_transient_read_failures() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(4500000), dec!(70)).await;

    farm.memory.fail_next(2);
    let summary = farm
        .service
        .execute(Retrying(ContractSummary {
            contract_id: contract.id,
        }))
        .await
        .unwrap();
    assert_eq!(summary.contract_id, contract.id);

    farm.memory.fail_next(3);
    let err = farm
        .service
        .execute(Retrying(query::contract::ById::by(contract.id)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Kind::TransientStorage);

    let found = farm
        .service
        .execute(Retrying(query::contract::ById::by(contract.id)))
        .await
        .unwrap();
    assert!(found.is_some());
}

/// [`Memory`] completing the [`Contract`] right after its [`Expense`]s are
/// read.
struct SettlingOnRead {
    memory: Memory,
    service: Service<Memory>,
}

impl Database<Select<By<Option<Contract>, contract::Id>>> for SettlingOnRead {
    type Ok = Option<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        op: Select<By<Option<Contract>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.memory.execute(op).await
    }
}

impl Database<Select<By<Vec<Allocated>, contract::Id>>> for SettlingOnRead {
    type Ok = Vec<Allocated>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        op: Select<By<Vec<Allocated>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.memory.execute(op).await
    }
}

impl Database<Select<By<Vec<Expense>, contract::Id>>> for SettlingOnRead {
    type Ok = Vec<Expense>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        op: Select<By<Vec<Expense>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let contract_id = op.0.into_inner();
        let expenses = self
            .memory
            .execute(Select(By::<Vec<Expense>, _>::new(contract_id)))
            .await?;
        _ = self
            .service
            .execute(CompleteContract {
                contract_id,
                total_revenue: idr(dec!(1000000)),
                total_expenses: idr(dec!(300000)),
                notes: None,
            })
            .await
            .unwrap();
        Ok(expenses)
    }
}

#[tokio::test]
async fn settlement_during_summary_wins_over_estimate() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(2000000), dec!(50)).await;
    let sheep_id = farm.sheep("A-001", Some(dec!(9000000))).await;
    _ = farm.allocate(contract.id, sheep_id, dec!(2000000)).await;

    let settling = Service::new(
        Config::default(),
        SettlingOnRead {
            memory: farm.memory.clone(),
            service: farm.service.clone(),
        },
    );
    let summary = settling
        .execute(ContractSummary {
            contract_id: contract.id,
        })
        .await
        .unwrap();

    assert_eq!(summary.basis, Basis::Actual);
    assert_eq!(summary.total_current_value.amount, dec!(0));
    assert_eq!(summary.total_revenue.amount, dec!(1000000));
    assert_eq!(summary.net_result.amount, dec!(700000));
    assert_eq!(summary.roi.value(), dec!(-65));
    assert_eq!(summary.investor_profit.amount, dec!(-650000));
}
