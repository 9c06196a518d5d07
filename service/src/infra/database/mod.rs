//! [`Database`]-related implementations.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

use crate::error::{Classify, Kind};

pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// Names of the uniqueness constraints the [`Database`] enforces.
pub mod constraint {
    /// A sheep has at most one active allocation.
    pub const ACTIVE_ALLOCATION: &str = "contract_sheep_active_sheep_idx";

    /// Sheep tags are unique.
    pub const SHEEP_TAG: &str = "sheep_tag_key";
}

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),

    /// [`Memory`] error.
    Memory(memory::Error),
}

impl Error {
    /// Indicates whether this [`Error`] is a temporary unavailability of the
    /// [`Database`], so the failed read may be retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_transient(),
            Self::Memory(e) => e.is_transient(),
        }
    }

    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_unique_violation(constraint),
            Self::Memory(e) => e.is_unique_violation(constraint),
        }
    }
}

impl Classify for Error {
    fn kind(&self) -> Kind {
        if self.is_transient() {
            Kind::TransientStorage
        } else if self.is_unique_violation(None) {
            Kind::Conflict
        } else {
            Kind::Storage
        }
    }
}
