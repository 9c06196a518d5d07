mod common;

use rust_decimal_macros::dec;
use service::{
    command::{
        allocate_sheep, AllocateSheep, CompleteContract, DeallocateSheep,
        ReportSheepDeath, SellSheep, UpdateSheepHealth,
    },
    domain::{allocation, sheep},
    error::Kind,
    query, read, Classify as _, Command as _, Query as _,
};

use self::common::{idr, Farm};

#[tokio::test]
async fn sheep_is_held_by_one_contract() {
    let farm = Farm::new();
    let first = farm.contract(dec!(4500000), dec!(70)).await;
    let second = farm.contract(dec!(4500000), dec!(70)).await;
    let sheep_id = farm.sheep("A-001", Some(dec!(5200000))).await;

    _ = farm.allocate(first.id, sheep_id, dec!(4500000)).await;

    let err = farm
        .service
        .execute(AllocateSheep {
            contract_id: second.id,
            sheep_id,
            purchase_price: idr(dec!(4500000)),
            origin: allocation::Origin::Purchased,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        allocate_sheep::ExecutionError::SheepAlreadyAllocated(id)
            if *id == sheep_id,
    ));
    assert_eq!(err.kind(), Kind::Conflict);

    let available = farm
        .service
        .execute(query::sheep::Available::by(read::sheep::Available))
        .await
        .unwrap();
    assert!(available.is_empty());
}

#[tokio::test]
async fn concurrent_allocations_admit_one() {
    let farm = Farm::new();
    let first = farm.contract(dec!(4500000), dec!(70)).await;
    let second = farm.contract(dec!(4500000), dec!(70)).await;
    let sheep_id = farm.sheep("A-001", None).await;

    let allocate = |contract_id| AllocateSheep {
        contract_id,
        sheep_id,
        purchase_price: idr(dec!(4500000)),
        origin: allocation::Origin::Purchased,
    };
    let (a, b) = tokio::join!(
        farm.service.execute(allocate(first.id)),
        farm.service.execute(allocate(second.id)),
    );

    assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
    let loser = a.err().or(b.err()).unwrap();
    assert_eq!(loser.kind(), Kind::Conflict);
}

#[tokio::test]
async fn deallocated_sheep_becomes_available() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(4500000), dec!(70)).await;
    let sheep_id = farm.sheep("A-001", None).await;
    _ = farm.allocate(contract.id, sheep_id, dec!(4500000)).await;

    _ = farm
        .service
        .execute(DeallocateSheep {
            contract_id: contract.id,
            sheep_id,
        })
        .await
        .unwrap();

    let allocations = farm
        .service
        .execute(query::contract::Allocations::by(contract.id))
        .await
        .unwrap();
    assert!(allocations.is_empty());

    let available = farm
        .service
        .execute(query::sheep::Available::by(read::sheep::Available))
        .await
        .unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].id, sheep_id);
}

#[tokio::test]
async fn disposed_sheep_cannot_be_deallocated() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(4500000), dec!(70)).await;
    let sold = farm.sheep("A-001", None).await;
    let dead = farm.sheep("A-002", None).await;
    _ = farm.allocate(contract.id, sold, dec!(2000000)).await;
    _ = farm.allocate(contract.id, dead, dec!(2500000)).await;

    let allocation = farm
        .service
        .execute(SellSheep {
            contract_id: contract.id,
            sheep_id: sold,
            price: idr(dec!(3000000)),
        })
        .await
        .unwrap();
    assert_eq!(allocation.status(), allocation::Status::Sold);
    assert_eq!(allocation.sale_price(), Some(idr(dec!(3000000))));

    let allocation = farm
        .service
        .execute(ReportSheepDeath {
            contract_id: contract.id,
            sheep_id: dead,
        })
        .await
        .unwrap();
    assert_eq!(allocation.status(), allocation::Status::Deceased);

    for sheep_id in [sold, dead] {
        let err = farm
            .service
            .execute(DeallocateSheep {
                contract_id: contract.id,
                sheep_id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Kind::InvalidState);
    }

    let sheep = farm
        .service
        .execute(query::sheep::ById::by(sold))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sheep.status, sheep::Status::Sold);
    let sheep = farm
        .service
        .execute(query::sheep::ById::by(dead))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sheep.status, sheep::Status::Deceased);
}

#[tokio::test]
async fn sick_sheep_is_not_allocatable() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(4500000), dec!(70)).await;
    let sheep_id = farm.sheep("A-001", None).await;

    _ = farm
        .service
        .execute(UpdateSheepHealth {
            sheep_id,
            health: sheep::Health::Sick,
        })
        .await
        .unwrap();

    let err = farm
        .service
        .execute(AllocateSheep {
            contract_id: contract.id,
            sheep_id,
            purchase_price: idr(dec!(4500000)),
            origin: allocation::Origin::Purchased,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_ref(),
        allocate_sheep::ExecutionError::SheepNotAllocatable(_),
    ));
}

#[tokio::test]
async fn settled_contract_rejects_ledger_writes() {
    let farm = Farm::new();
    let contract = farm.contract(dec!(4500000), dec!(70)).await;
    let held = farm.sheep("A-001", None).await;
    let free = farm.sheep("A-002", None).await;
    _ = farm.allocate(contract.id, held, dec!(4500000)).await;

    _ = farm
        .service
        .execute(CompleteContract {
            contract_id: contract.id,
            total_revenue: idr(dec!(5000000)),
            total_expenses: idr(dec!(0)),
            notes: None,
        })
        .await
        .unwrap();

    let err = farm
        .service
        .execute(AllocateSheep {
            contract_id: contract.id,
            sheep_id: free,
            purchase_price: idr(dec!(1)),
            origin: allocation::Origin::Born,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Kind::InvalidState);

    let err = farm
        .service
        .execute(SellSheep {
            contract_id: contract.id,
            sheep_id: held,
            price: idr(dec!(1)),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Kind::InvalidState);
}
