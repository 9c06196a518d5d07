//! Read entities definitions.

pub mod contract;
pub mod sheep;

pub use self::contract::Summary;
