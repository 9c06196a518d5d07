mod common;

use rust_decimal_macros::dec;
use service::{
    command::{add_expense, AddExpense, CancelContract, DeleteExpense},
    domain::expense,
    error::Kind,
    query, Classify as _, Command as _, Query as _,
};

use self::common::{idr, Farm};

fn feed(contract_id: service::domain::contract::Id, on: &str) -> AddExpense {
    AddExpense {
        contract_id,
        category: expense::Category::Feed,
        description: expense::Description::new("hay bales").unwrap(),
        amount: idr(dec!(200000)),
        spent_on: on.parse().unwrap(),
    }
}

#[tokio::test]
async fn expense_date_is_bounded_by_start() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(4500000), dec!(70)).await;

    let err = farm
        .service
        .execute(feed(contract.id, "2023-12-31"))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        add_expense::ExecutionError::SpentBeforeStart { .. },
    ));
    assert_eq!(err.kind(), Kind::Validation);

    let expense = farm
        .service
        .execute(feed(contract.id, "2024-01-01"))
        .await
        .unwrap();
    assert_eq!(expense.spent_on, contract.start_date);
}

#[tokio::test]
async fn rejects_non_positive_amount() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(4500000), dec!(70)).await;

    for amount in [dec!(0), dec!(-5)] {
        let err = farm
            .service
            .execute(AddExpense {
                amount: idr(amount),
                ..feed(contract.id, "2024-02-01")
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            add_expense::ExecutionError::NonPositiveAmount(_),
        ));
    }
}

#[tokio::test]
async fn deletes_expense_of_active_contract_only() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(4500000), dec!(70)).await;
    let kept = farm
        .service
        .execute(feed(contract.id, "2024-02-01"))
        .await
        .unwrap();
    let removed = farm
        .service
        .execute(feed(contract.id, "2024-03-01"))
        .await
        .unwrap();

    _ = farm
        .service
        .execute(DeleteExpense {
            expense_id: removed.id,
        })
        .await
        .unwrap();

    let expenses = farm
        .service
        .execute(query::contract::Expenses::by(contract.id))
        .await
        .unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].id, kept.id);

    let err = farm
        .service
        .execute(DeleteExpense {
            expense_id: removed.id,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Kind::NotFound);

    _ = farm
        .service
        .execute(CancelContract {
            contract_id: contract.id,
            notes: None,
        })
        .await
        .unwrap();

    let err = farm
        .service
        .execute(DeleteExpense { expense_id: kept.id })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Kind::InvalidState);

    let err = farm
        .service
        .execute(feed(contract.id, "2024-04-01"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Kind::InvalidState);
}
