//! Error conversions at the adapter boundary.

pub(crate) mod conversions;

pub use conversions::InfraError;
