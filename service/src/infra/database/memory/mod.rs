//! In-memory [`Database`] implementation.
//!
//! Every operation is atomic under a single table lock. Writes are serialized
//! by an exclusive writer lock, which a [`Tx`] holds until it's committed or
//! dropped. A dropped uncommitted [`Tx`] rolls the tables back.

mod impls;

use std::{
    collections::HashMap,
    future::Future,
    sync::{
        atomic::{self, AtomicUsize},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{
        allocation, contract, expense, investor, sheep, Allocation, Contract,
        Expense, Investor, Sheep,
    },
    infra::database,
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
#[derive(Clone, Debug)]
pub struct Memory<T = NonTx> {
    /// [`Storage`] shared by all the clients.
    storage: Arc<Storage>,

    /// Client performing the operations.
    client: T,
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arc::new(Storage::default()),
            client: NonTx,
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Memory<T> {
    /// Makes the next `count` operations fail as if the storage was
    /// unavailable.
    pub fn fail_next(&self, count: usize) {
        self.storage
            .outages
            .store(count, atomic::Ordering::SeqCst);
    }

    /// Runs the provided read over the tables.
    fn read<R>(
        &self,
        f: impl FnOnce(&Tables) -> R,
    ) -> Result<R, Traced<database::Error>> {
        self.storage.ensure_available()?;
        Ok(f(&self.storage.tables()))
    }
}

impl<T: Client> Memory<T> {
    /// Runs the provided write over the tables, holding the writer lock.
    async fn write<R>(
        &self,
        f: impl FnOnce(&mut Tables) -> Result<R, Error>,
    ) -> Result<R, Traced<database::Error>> {
        let _writer = self.client.writer(&self.storage).await;
        self.storage.ensure_available()?;
        f(&mut self.storage.tables())
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

/// Storage shared by [`Memory`] clients.
#[derive(Debug, Default)]
pub struct Storage {
    /// Stored tables.
    tables: Mutex<Tables>,

    /// Lock serializing writes.
    writer: Arc<AsyncMutex<()>>,

    /// Number of upcoming operations to fail.
    outages: AtomicUsize,
}

impl Storage {
    /// Locks the [`Tables`].
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires the writer lock.
    async fn lock_writer(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.writer).lock_owned().await
    }

    /// Fails if an outage is scheduled for the current operation.
    fn ensure_available(&self) -> Result<(), Traced<database::Error>> {
        let failed = self
            .outages
            .fetch_update(
                atomic::Ordering::SeqCst,
                atomic::Ordering::SeqCst,
                |n| n.checked_sub(1),
            )
            .is_ok();
        if failed {
            return Err(tracerr::new!(database::Error::from(
                Error::Unavailable
            )));
        }
        Ok(())
    }
}

/// Tables stored in [`Memory`].
#[derive(Clone, Debug, Default)]
struct Tables {
    /// Stored [`Investor`]s.
    investors: HashMap<investor::Id, Investor>,

    /// Stored [`Sheep`].
    sheep: HashMap<sheep::Id, Sheep>,

    /// Stored [`Contract`]s.
    contracts: HashMap<contract::Id, Contract>,

    /// Stored [`Allocation`]s.
    allocations: HashMap<allocation::Id, Allocation>,

    /// Stored [`Expense`]s.
    expenses: HashMap<expense::Id, Expense>,
}

/// Client of a [`Memory`] database.
pub trait Client {
    /// Acquires the writer lock of the provided [`Storage`] for a single
    /// write, unless this [`Client`] holds it already.
    fn writer(
        &self,
        storage: &Storage,
    ) -> impl Future<Output = Option<OwnedMutexGuard<()>>>;
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Copy, Debug, Default)]
pub struct NonTx;

impl Client for NonTx {
    async fn writer(&self, storage: &Storage) -> Option<OwnedMutexGuard<()>> {
        Some(storage.lock_writer().await)
    }
}

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx(Arc<Mutex<Option<Pending>>>);

impl Client for Tx {
    async fn writer(&self, _: &Storage) -> Option<OwnedMutexGuard<()>> {
        None
    }
}

impl Tx {
    /// Commits this [`Tx`], releasing the writer lock.
    fn commit(&self) {
        let pending = self
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut pending) = pending {
            pending.snapshot = None;
        }
    }
}

/// Uncommitted [`Tx`] state.
#[derive(Debug)]
struct Pending {
    /// [`Storage`] the [`Tx`] writes to.
    storage: Arc<Storage>,

    /// [`Tables`] to restore on rollback.
    snapshot: Option<Tables>,

    /// Writer lock held for the whole [`Tx`].
    _writer: OwnedMutexGuard<()>,
}

impl Drop for Pending {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.storage.tables() = snapshot;
        }
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Storage is unavailable.
    #[display("Storage is unavailable")]
    Unavailable,

    /// Uniqueness constraint is violated.
    #[display("Unique constraint `{constraint}` is violated")]
    UniqueViolation {
        /// Name of the violated constraint.
        constraint: &'static str,
    },
}

impl Error {
    /// Indicates whether this [`Error`] is temporary.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation { constraint: c } => {
                constraint.map_or(true, |expected| expected == *c)
            }
            Self::Unavailable => false,
        }
    }
}
