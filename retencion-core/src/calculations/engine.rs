//! Withholding engine: picks a procedure and assembles the final result.
//!
//! Procedure 1 takes the table withholding of the current month as is.
//! Procedure 2 multiplies the current base by a fixed rate chosen by the first
//! matching rule of [`RATE_RULES`]:
//!
//! | Order | Rule | Rate |
//! |-------|------|------|
//! | 1 | Manual rate set and non-zero | the manual rate |
//! | 2 | Historical income set and positive | table / base on the historical month (0 if that base is 0) |
//! | 3 | Always | table / base on the current month (0 if that base is 0) |
//!
//! Rule 2 decides as soon as a positive historical income is present: a
//! historical month that falls in the 0% bracket yields a rate of 0 and does
//! not fall through to rule 3.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use retencion_core::calculations::WithholdingEngine;
//! use retencion_core::calculations::common::round_pesos;
//! use retencion_core::{Procedure, TaxConstants, TaxInputs};
//!
//! let constants = TaxConstants::colombia_2026();
//! let engine = WithholdingEngine::new(&constants);
//! let inputs = TaxInputs {
//!     monthly_salary: dec!(15000000),
//!     ..Default::default()
//! };
//!
//! let result = engine.calculate_tax(&inputs, Procedure::One);
//!
//! assert_eq!(result.taxable_base, dec!(10237500));
//! assert_eq!(round_pesos(result.withholding), dec!(1190532));
//! assert_eq!(result.effective_rate, None);
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::BaseCalculator;
use crate::calculations::common::floor_zero;
use crate::models::{
    IntermediateCalc, Procedure, RateSource, TaxConstants, TaxInputs, TaxResult,
};

/// Procedure 2 rate rules, tried in order; the first that yields a rate wins.
pub const RATE_RULES: [RateSource; 3] = [
    RateSource::Manual,
    RateSource::Historical,
    RateSource::CurrentMonth,
];

/// Entry point for withholding calculations under one set of constants.
///
/// The engine holds nothing but a borrow of the constants, so every call is
/// independent and the engine can be shared freely between threads.
#[derive(Debug, Clone, Copy)]
pub struct WithholdingEngine<'a> {
    constants: &'a TaxConstants,
    base: BaseCalculator<'a>,
}

impl<'a> WithholdingEngine<'a> {
    pub fn new(constants: &'a TaxConstants) -> Self {
        Self {
            constants,
            base: BaseCalculator::new(constants),
        }
    }

    /// Calculates the month's withholding under `procedure`.
    ///
    /// Never fails: out-of-range inputs are clamped before use.
    pub fn calculate_tax(
        &self,
        inputs: &TaxInputs,
        procedure: Procedure,
    ) -> TaxResult {
        let inputs = inputs.sanitized();
        let gross_income = inputs.gross_income();
        let current = self.base.compute_sanitized(gross_income, &inputs);

        let (withholding_uvt, effective_rate, rate_source) = match procedure {
            Procedure::One => (current.table_withholding_uvt, None, None),
            Procedure::Two => {
                let (rate, source) = self.procedure2_rate(&inputs, &current);
                let withholding_uvt = current.taxable_base_uvt * (rate / Decimal::ONE_HUNDRED);
                (withholding_uvt, Some(rate), Some(source))
            }
        };

        let withholding = self.constants.uvt_to_cop(withholding_uvt);
        let net_income = floor_zero(gross_income - current.mandatory_contributions - withholding);

        TaxResult {
            procedure,
            taxable_base: current.taxable_base,
            taxable_base_uvt: current.taxable_base_uvt,
            withholding_uvt,
            withholding,
            net_income,
            effective_rate,
            rate_source,
            details: current,
        }
    }

    /// Resolves the Procedure 2 rate by walking [`RATE_RULES`].
    fn procedure2_rate(
        &self,
        inputs: &TaxInputs,
        current: &IntermediateCalc,
    ) -> (Decimal, RateSource) {
        let resolved = RATE_RULES
            .iter()
            .find_map(|source| self.apply_rule(*source, inputs, current).map(|rate| (rate, *source)));

        // The last rule always matches; the fallback only keeps the engine total.
        let (rate, source) =
            resolved.unwrap_or_else(|| (current.implied_rate(), RateSource::CurrentMonth));

        debug!(rate = %rate, source = %source, "procedure 2 rate resolved");
        (rate, source)
    }

    fn apply_rule(
        &self,
        source: RateSource,
        inputs: &TaxInputs,
        current: &IntermediateCalc,
    ) -> Option<Decimal> {
        match source {
            RateSource::Manual => inputs.manual_rate(),
            RateSource::Historical => inputs.historical_income().map(|income| {
                self.base
                    .compute_sanitized(income, inputs)
                    .implied_rate()
            }),
            RateSource::CurrentMonth => Some(current.implied_rate()),
        }
    }
}

/// Convenience wrapper around [`WithholdingEngine::calculate_tax`].
pub fn calculate_tax(
    inputs: &TaxInputs,
    procedure: Procedure,
    constants: &TaxConstants,
) -> TaxResult {
    WithholdingEngine::new(constants).calculate_tax(inputs, procedure)
}
