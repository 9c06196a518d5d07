//! [`Sheep`] read model definitions.

#[cfg(doc)]
use crate::domain::{Contract, Sheep};

/// Selector of [`Sheep`] available for allocation to a [`Contract`]: healthy,
/// in stock and not actively allocated.
#[derive(Clone, Copy, Debug, Default)]
pub struct Available;
