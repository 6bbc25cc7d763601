//! Monthly salary withholding ("retención en la fuente") for Colombian
//! employees.
//!
//! The crate is pure: every calculation takes its constants explicitly and
//! returns a value, so callers can run as many scenarios as they like against
//! the built-in 2026 constants or a loaded set.

pub mod calculations;
pub mod models;

pub use models::*;
