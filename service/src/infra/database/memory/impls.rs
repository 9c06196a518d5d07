//! [`Memory`] [`Database`] implementations.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use tracerr::Traced;

use crate::{
    domain::{
        allocation, contract, expense, investor, sheep, Allocation, Contract,
        Expense, Investor, Sheep,
    },
    infra::{
        database::{self, constraint},
        Database,
    },
    read::{
        self,
        contract::{Active, Allocated},
    },
};

use super::{Client, Error, Memory, NonTx, Pending, Tables, Tx};

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let writer = self.storage.lock_writer().await;
        self.storage
            .ensure_available()
            .map_err(tracerr::wrap!())?;
        let pending = Pending {
            storage: Arc::clone(&self.storage),
            snapshot: Some(self.storage.tables().clone()),
            _writer: writer,
        };
        Ok(Memory {
            storage: Arc::clone(&self.storage),
            client: Tx(Arc::new(Mutex::new(Some(pending)))),
        })
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        self.client.commit();
        Ok(())
    }
}

impl<C> Database<Select<By<Option<Investor>, investor::Id>>> for Memory<C> {
    type Ok = Option<Investor>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Investor>, investor::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|t| t.investors.get(&id).cloned())
            .map_err(tracerr::wrap!())
    }
}

impl<C: Client> Database<Insert<Investor>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(investor): Insert<Investor>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|t| {
            _ = t.investors.insert(investor.id, investor);
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Option<Sheep>, sheep::Id>>> for Memory<C> {
    type Ok = Option<Sheep>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Sheep>, sheep::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|t| t.sheep.get(&id).cloned())
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Sheep>, read::sheep::Available>>>
    for Memory<C>
{
    type Ok = Vec<Sheep>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Sheep>, read::sheep::Available>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.read(|t| {
            let allocated = t
                .allocations
                .values()
                .filter(|a| a.is_active())
                .map(|a| a.sheep_id)
                .collect::<HashSet<_>>();
            let mut sheep = t
                .sheep
                .values()
                .filter(|s| s.is_allocatable() && !allocated.contains(&s.id))
                .cloned()
                .collect::<Vec<_>>();
            sheep.sort_by(|a, b| a.tag.cmp(&b.tag));
            sheep
        })
        .map_err(tracerr::wrap!())
    }
}

/// Stores the provided [`Sheep`] keeping its tag unique.
fn put_sheep(t: &mut Tables, sheep: Sheep) -> Result<(), Error> {
    if t.sheep.values().any(|s| s.id != sheep.id && s.tag == sheep.tag) {
        return Err(Error::UniqueViolation {
            constraint: constraint::SHEEP_TAG,
        });
    }
    _ = t.sheep.insert(sheep.id, sheep);
    Ok(())
}

impl<C: Client> Database<Insert<Sheep>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(sheep): Insert<Sheep>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|t| put_sheep(t, sheep))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Client> Database<Update<Sheep>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(sheep): Update<Sheep>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|t| put_sheep(t, sheep))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Option<Contract>, contract::Id>>> for Memory<C> {
    type Ok = Option<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Contract>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|t| t.contracts.get(&id).cloned())
            .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Contract>, investor::Id>>> for Memory<C> {
    type Ok = Vec<Contract>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Contract>, investor::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let investor_id = by.into_inner();
        self.read(|t| {
            let mut contracts = t
                .contracts
                .values()
                .filter(|c| c.investor_id == investor_id)
                .cloned()
                .collect::<Vec<_>>();
            contracts.sort_by_key(|c| (c.created_at, c.id));
            contracts
        })
        .map_err(tracerr::wrap!())
    }
}

impl<C: Client> Database<Insert<Contract>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(contract): Insert<Contract>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|t| {
            _ = t.contracts.insert(contract.id, contract);
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Client> Database<Update<contract::Transition>> for Memory<C> {
    type Ok = bool;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(transition): Update<contract::Transition>,
    ) -> Result<Self::Ok, Self::Err> {
        let contract::Transition { id, outcome } = transition;
        self.write(|t| {
            Ok(match t.contracts.get_mut(&id) {
                Some(c) if c.is_active() => {
                    c.state = outcome.into();
                    true
                }
                Some(_) | None => false,
            })
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl Database<Lock<By<Contract, contract::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Contract, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Writer lock is held for the whole `Tx` already.
        self.read(|_| ()).map_err(tracerr::wrap!())
    }
}

impl Database<Lock<By<Sheep, sheep::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Sheep, sheep::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Writer lock is held for the whole `Tx` already.
        self.read(|_| ()).map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Allocated>, contract::Id>>> for Memory<C> {
    type Ok = Vec<Allocated>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Allocated>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let contract_id = by.into_inner();
        self.read(|t| {
            let mut allocated = t
                .allocations
                .values()
                .filter(|a| a.contract_id == contract_id)
                .map(|a| Allocated {
                    allocation: a.clone(),
                    market_value: t
                        .sheep
                        .get(&a.sheep_id)
                        .and_then(|s| s.market_value),
                })
                .collect::<Vec<_>>();
            allocated.sort_by_key(|a| {
                (a.allocation.allocated_at, a.allocation.id)
            });
            allocated
        })
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Option<Active<Allocation>>, sheep::Id>>>
    for Memory<C>
{
    type Ok = Option<Active<Allocation>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Active<Allocation>>, sheep::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sheep_id = by.into_inner();
        self.read(|t| {
            t.allocations
                .values()
                .find(|a| a.sheep_id == sheep_id && a.is_active())
                .cloned()
                .map(Active)
        })
        .map_err(tracerr::wrap!())
    }
}

/// Stores the provided [`Allocation`] keeping at most one active
/// [`Allocation`] per [`Sheep`].
fn put_allocation(t: &mut Tables, allocation: Allocation) -> Result<(), Error> {
    let taken = allocation.is_active()
        && t.allocations.values().any(|a| {
            a.id != allocation.id
                && a.sheep_id == allocation.sheep_id
                && a.is_active()
        });
    if taken {
        return Err(Error::UniqueViolation {
            constraint: constraint::ACTIVE_ALLOCATION,
        });
    }
    _ = t.allocations.insert(allocation.id, allocation);
    Ok(())
}

impl<C: Client> Database<Insert<Allocation>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(allocation): Insert<Allocation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|t| put_allocation(t, allocation))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Client> Database<Update<Allocation>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(allocation): Update<Allocation>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|t| put_allocation(t, allocation))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Client> Database<Delete<By<Allocation, allocation::Id>>>
    for Memory<C>
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Allocation, allocation::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.write(|t| {
            _ = t.allocations.remove(&id);
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Expense>, contract::Id>>> for Memory<C> {
    type Ok = Vec<Expense>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Expense>, contract::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let contract_id = by.into_inner();
        self.read(|t| {
            let mut expenses = t
                .expenses
                .values()
                .filter(|e| e.contract_id == contract_id)
                .cloned()
                .collect::<Vec<_>>();
            expenses.sort_by_key(|e| (e.spent_on, e.created_at, e.id));
            expenses
        })
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Option<Expense>, expense::Id>>> for Memory<C> {
    type Ok = Option<Expense>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Expense>, expense::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.read(|t| t.expenses.get(&id).cloned())
            .map_err(tracerr::wrap!())
    }
}

impl<C: Client> Database<Insert<Expense>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(expense): Insert<Expense>,
    ) -> Result<Self::Ok, Self::Err> {
        self.write(|t| {
            _ = t.expenses.insert(expense.id, expense);
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C: Client> Database<Delete<By<Expense, expense::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Expense, expense::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.write(|t| {
            _ = t.expenses.remove(&id);
            Ok(())
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
