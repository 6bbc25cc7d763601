//! Withholding calculations.
//!
//! [`BaseCalculator`] turns a month's income into a taxable base;
//! [`WithholdingEngine`] applies Procedure 1 or 2 on top of it and also drives
//! the comparison and annual simulation.

pub mod common;

mod base;
mod comparison;
mod engine;
mod simulation;

pub use base::{BaseCalculator, table_withholding_uvt};
pub use comparison::{ProcedureComparison, RECOMMENDATION_TOLERANCE, Recommendation};
pub use engine::{RATE_RULES, WithholdingEngine, calculate_tax};
pub use simulation::{
    ANNUAL_TIE_THRESHOLD, AnnualSimulation, MonthlyProjection, STABILITY_TIE_THRESHOLD,
    SimulationTotals, StabilityAnalysis, StabilityWinner, flat_year,
};
