//! Classification of [`Command`] and [`Query`] errors.
//!
//! [`Command`]: crate::Command
//! [`Query`]: crate::Query

use derive_more::Display;
use tracerr::Traced;

/// Kind of a failure, telling the caller how to react to it.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Kind {
    /// Referenced entity does not exist.
    NotFound,

    /// Entity is not in the state required by the operation.
    InvalidState,

    /// Operation collides with a concurrent one.
    ///
    /// Caller should re-fetch the current state before trying again.
    Conflict,

    /// Malformed input, rejected before any write.
    Validation,

    /// Storage is temporarily unavailable.
    ///
    /// Reads may be retried, writes must not be retried blindly.
    TransientStorage,

    /// Storage failed in an unexpected way.
    Storage,
}

/// Classification of an error into its [`Kind`].
pub trait Classify {
    /// Returns [`Kind`] of this error.
    fn kind(&self) -> Kind;

    /// Indicates whether this error is a transient storage failure.
    fn is_transient(&self) -> bool {
        self.kind() == Kind::TransientStorage
    }
}

impl<E: Classify> Classify for Traced<E> {
    fn kind(&self) -> Kind {
        self.as_ref().kind()
    }
}
