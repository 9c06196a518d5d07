//! Marker types shared by entities.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;
