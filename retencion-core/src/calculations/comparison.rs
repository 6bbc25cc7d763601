//! Side-by-side comparison of both withholding procedures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::WithholdingEngine;
use crate::models::{Procedure, TaxInputs, TaxResult};

/// Withholding differences at or below this amount (COP) count as a tie.
pub const RECOMMENDATION_TOLERANCE: Decimal = Decimal::ONE_HUNDRED;

/// Which procedure withholds less.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Procedure1,
    Procedure2,
    Equal,
}

/// Both procedures run on the same inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureComparison {
    pub procedure1: TaxResult,
    pub procedure2: TaxResult,
    pub recommendation: Recommendation,
    /// Absolute withholding difference in COP.
    pub difference: Decimal,
}

impl ProcedureComparison {
    /// The result of the recommended procedure, or Procedure 1 on a tie.
    pub fn preferred(&self) -> &TaxResult {
        match self.recommendation {
            Recommendation::Procedure2 => &self.procedure2,
            Recommendation::Procedure1 | Recommendation::Equal => &self.procedure1,
        }
    }
}

impl WithholdingEngine<'_> {
    /// Runs both procedures and recommends the one that withholds less.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use retencion_core::calculations::{Recommendation, WithholdingEngine};
    /// use retencion_core::{TaxConstants, TaxInputs};
    ///
    /// let constants = TaxConstants::colombia_2026();
    /// let engine = WithholdingEngine::new(&constants);
    /// let inputs = TaxInputs {
    ///     monthly_salary: dec!(15000000),
    ///     procedure2_rate: Some(dec!(5)),
    ///     ..Default::default()
    /// };
    ///
    /// let comparison = engine.compare_procedures(&inputs);
    ///
    /// assert_eq!(comparison.recommendation, Recommendation::Procedure2);
    /// ```
    pub fn compare_procedures(
        &self,
        inputs: &TaxInputs,
    ) -> ProcedureComparison {
        let procedure1 = self.calculate_tax(inputs, Procedure::One);
        let procedure2 = self.calculate_tax(inputs, Procedure::Two);
        let delta = procedure1.withholding - procedure2.withholding;

        ProcedureComparison {
            recommendation: recommend(delta),
            difference: delta.abs(),
            procedure1,
            procedure2,
        }
    }
}

/// Maps `P1 - P2` withholding onto a recommendation.
fn recommend(delta: Decimal) -> Recommendation {
    if delta < -RECOMMENDATION_TOLERANCE {
        Recommendation::Procedure1
    } else if delta > RECOMMENDATION_TOLERANCE {
        Recommendation::Procedure2
    } else {
        Recommendation::Equal
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::TaxConstants;

    #[test]
    fn recommend_prefers_procedure1_when_it_withholds_less() {
        assert_eq!(recommend(dec!(-100.01)), Recommendation::Procedure1);
    }

    #[test]
    fn recommend_prefers_procedure2_when_it_withholds_less() {
        assert_eq!(recommend(dec!(100.01)), Recommendation::Procedure2);
    }

    #[test]
    fn recommend_treats_small_differences_as_equal() {
        assert_eq!(recommend(dec!(100)), Recommendation::Equal);
        assert_eq!(recommend(dec!(-100)), Recommendation::Equal);
        assert_eq!(recommend(dec!(0)), Recommendation::Equal);
    }

    #[test]
    fn compare_without_history_is_equal() {
        let constants = TaxConstants::colombia_2026();
        let engine = WithholdingEngine::new(&constants);
        let inputs = TaxInputs {
            monthly_salary: dec!(15000000),
            ..Default::default()
        };

        let comparison = engine.compare_procedures(&inputs);

        assert_eq!(comparison.recommendation, Recommendation::Equal);
        assert!(comparison.difference < dec!(1));
    }

    #[test]
    fn compare_with_lower_historical_income_prefers_procedure2() {
        let constants = TaxConstants::colombia_2026();
        let engine = WithholdingEngine::new(&constants);
        let inputs = TaxInputs {
            monthly_salary: dec!(25000000),
            historical_monthly_income: Some(dec!(15000000)),
            ..Default::default()
        };

        let comparison = engine.compare_procedures(&inputs);

        assert_eq!(comparison.recommendation, Recommendation::Procedure2);
        assert_eq!(
            comparison.difference,
            comparison.procedure1.withholding - comparison.procedure2.withholding
        );
        assert_eq!(comparison.preferred().procedure, Procedure::Two);
    }

    #[test]
    fn compare_with_higher_historical_income_prefers_procedure1() {
        let constants = TaxConstants::colombia_2026();
        let engine = WithholdingEngine::new(&constants);
        let inputs = TaxInputs {
            monthly_salary: dec!(15000000),
            historical_monthly_income: Some(dec!(40000000)),
            ..Default::default()
        };

        let comparison = engine.compare_procedures(&inputs);

        assert_eq!(comparison.recommendation, Recommendation::Procedure1);
        assert_eq!(comparison.preferred().procedure, Procedure::One);
    }
}
