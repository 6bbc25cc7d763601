//! File formats for withholding constants and scenarios.
//!
//! - [`ConstantsLoader`]: a full [`TaxConstants`](retencion_core::TaxConstants) set as TOML.
//! - [`BracketLoader`]: a withholding table as CSV, one row per bracket.
//! - [`ScenarioLoader`]: named [`TaxInputs`](retencion_core::TaxInputs) rows as CSV.

mod bracket_loader;
mod constants_loader;
mod scenario_loader;

pub use bracket_loader::{BracketLoader, BracketLoaderError, BracketRecord};
pub use constants_loader::{ConstantsLoader, ConstantsLoaderError};
pub use scenario_loader::{Scenario, ScenarioLoader, ScenarioLoaderError, ScenarioRecord};
