mod common;

use ::common::money::Currency;
use rust_decimal_macros::dec;
use service::{
    command::{
        cancel_contract, complete_contract, CancelContract, CompleteContract,
    },
    domain::contract,
    error::Kind,
    query, Classify as _, Command as _, Query as _,
};

use self::common::{idr, Farm};

fn complete(contract_id: contract::Id) -> CompleteContract {
    CompleteContract {
        contract_id,
        total_revenue: idr(dec!(1000000)),
        total_expenses: idr(dec!(300000)),
        notes: contract::Notes::new("harvest sold"),
    }
}

#[tokio::test]
async fn settles_only_once() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(2000000), dec!(50)).await;

    let completed = farm.service.execute(complete(contract.id)).await.unwrap();
    let settlement = completed.settlement().unwrap();
    assert_eq!(completed.status(), contract::Status::Completed);
    assert_eq!(settlement.investor_profit.amount, dec!(-650000));
    assert_eq!(settlement.actual_roi.value(), dec!(-65));

    let err = farm
        .service
        .execute(complete(contract.id))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        complete_contract::ExecutionError::ContractNotActive(id)
            if *id == contract.id,
    ));
    assert_eq!(err.kind(), Kind::InvalidState);

    let stored = farm
        .service
        .execute(query::contract::ById::by(contract.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.settlement().unwrap().investor_profit.amount,
        dec!(-650000),
    );
}

#[tokio::test]
async fn concurrent_completions_settle_once() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(2000000), dec!(50)).await;

    let (first, second) = tokio::join!(
        farm.service.execute(complete(contract.id)),
        farm.service.execute(complete(contract.id)),
    );

    assert_eq!(
        usize::from(first.is_ok()) + usize::from(second.is_ok()),
        1,
        "exactly one completion must win",
    );
    let loser = first.err().or(second.err()).unwrap();
    assert_eq!(loser.kind(), Kind::InvalidState);
}

#[tokio::test]
async fn cancelled_contract_cannot_be_completed() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(2000000), dec!(50)).await;

    let cancelled = farm
        .service
        .execute(CancelContract {
            contract_id: contract.id,
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(cancelled.status(), contract::Status::Cancelled);

    let err = farm
        .service
        .execute(complete(contract.id))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Kind::InvalidState);

    let err = farm
        .service
        .execute(CancelContract {
            contract_id: contract.id,
            notes: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        cancel_contract::ExecutionError::ContractNotActive(_),
    ));
}

#[tokio::test]
async fn rejects_invalid_totals() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(2000000), dec!(50)).await;

    let err = farm
        .service
        .execute(CompleteContract {
            total_revenue: idr(dec!(-1)),
            ..complete(contract.id)
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Kind::Validation);

    let err = farm
        .service
        .execute(CompleteContract {
            total_expenses: ::common::Money {
                amount: dec!(10),
                currency: Currency::Usd,
            },
            ..complete(contract.id)
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        complete_contract::ExecutionError::CurrencyMismatch {
            expected: Currency::Idr,
            actual: Currency::Usd,
        },
    ));

    let err = farm
        .service
        .execute(complete(contract::Id::new()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Kind::NotFound);

    let stored = farm
        .service
        .execute(query::contract::ById::by(contract.id))
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_active());
}
