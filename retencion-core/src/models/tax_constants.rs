//! Fiscal-year constants consumed by the withholding engine.
//!
//! Every statutory figure the engine needs lives here so that a new fiscal
//! year only requires a new [`TaxConstants`] value, never a code change.
//! [`TaxConstants::colombia_2026`] carries the built-in 2026 figures.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::TaxBracket;

/// Errors reported by [`TaxConstants::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxConstantsError {
    /// The UVT value must be positive.
    #[error("UVT value must be positive, got {0}")]
    InvalidUvt(Decimal),

    /// The minimum wage must be positive.
    #[error("SMMLV value must be positive, got {0}")]
    InvalidSmmlv(Decimal),

    /// A rate field is outside `[0, 1]`.
    #[error("{field} must be between 0 and 1, got {value}")]
    RateOutOfRange { field: &'static str, value: Decimal },

    /// A cap or multiple is negative.
    #[error("{field} must be non-negative, got {value}")]
    NegativeLimit { field: &'static str, value: Decimal },

    /// The bracket table is empty.
    #[error("no tax brackets provided")]
    NoTaxBrackets,

    /// The first bracket does not start at zero.
    #[error("first tax bracket must start at 0 UVT, got {0}")]
    FirstBracketNotZero(Decimal),

    /// A bracket does not start where the previous one ended.
    #[error("tax bracket {index} does not start where the previous bracket ends")]
    BracketGap { index: usize },

    /// A bracket other than the last has no upper bound.
    #[error("only the last tax bracket may be unbounded (bracket {index} is not last)")]
    UnboundedBracketNotLast { index: usize },

    /// The solidarity-fund bands are not ordered or overlap.
    #[error("solidarity band {index} overlaps or precedes the previous band")]
    SolidarityBandOrder { index: usize },
}

/// One step of the solidarity-fund surcharge, measured in SMMLV multiples of
/// the contribution base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidarityBand {
    pub min_smmlv: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_smmlv: Option<Decimal>,
    pub rate: Decimal,
}

impl SolidarityBand {
    /// Returns true if `contribution_base` falls inside
    /// `[min_smmlv, max_smmlv)` times the minimum wage.
    pub fn applies_to(
        &self,
        contribution_base: Decimal,
        smmlv_value: Decimal,
    ) -> bool {
        contribution_base >= self.min_smmlv.saturating_mul(smmlv_value)
            && self
                .max_smmlv
                .is_none_or(|max| contribution_base < max.saturating_mul(smmlv_value))
    }
}

/// Mandatory social-security contribution rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRules {
    /// Employee health contribution rate (4%).
    pub health_rate: Decimal,

    /// Employee pension contribution rate (4%).
    pub pension_rate: Decimal,

    /// Share of an integral salary that forms the contribution base (70%).
    pub integral_salary_factor: Decimal,

    /// Contribution base ceiling in SMMLV (25).
    pub ibc_cap_smmlv: Decimal,

    /// Solidarity-fund surcharge bands, ordered by `min_smmlv`.
    pub solidarity_bands: Vec<SolidarityBand>,
}

/// Deduction, exemption and global caps.
///
/// Monthly caps are in UVT per month; annual caps are prorated by twelve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLimits {
    pub housing_interest_uvt: Decimal,
    pub prepaid_medicine_uvt: Decimal,
    pub dependents_uvt: Decimal,
    pub dependents_rate: Decimal,
    /// Combined cap for voluntary pension and AFC, as a share of gross income.
    pub voluntary_contribution_rate: Decimal,
    /// Labour exempt income (25%).
    pub exempt_income_rate: Decimal,
    pub exempt_income_annual_cap_uvt: Decimal,
    /// Global ceiling on deductions plus exemptions (40%).
    pub global_limit_rate: Decimal,
    pub global_limit_annual_cap_uvt: Decimal,
}

/// Everything the engine needs to know about one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxConstants {
    pub fiscal_year: i32,

    /// Monetary value of one UVT in COP.
    pub uvt_value: Decimal,

    /// Monthly minimum wage in COP.
    pub smmlv_value: Decimal,

    pub contributions: ContributionRules,

    pub limits: DeductionLimits,

    /// Withholding table, ordered by `min_uvt`.
    pub brackets: Vec<TaxBracket>,
}

impl Default for TaxConstants {
    fn default() -> Self {
        Self::colombia_2026()
    }
}

impl TaxConstants {
    /// Built-in 2026 figures: UVT 52,374 COP and the Art. 383 table.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use retencion_core::TaxConstants;
    ///
    /// let constants = TaxConstants::colombia_2026();
    ///
    /// assert_eq!(constants.uvt_value, dec!(52374));
    /// assert_eq!(constants.brackets.len(), 7);
    /// assert!(constants.validate().is_ok());
    /// ```
    pub fn colombia_2026() -> Self {
        Self {
            fiscal_year: 2026,
            uvt_value: dec!(52374),
            smmlv_value: dec!(1500000),
            contributions: ContributionRules {
                health_rate: dec!(0.04),
                pension_rate: dec!(0.04),
                integral_salary_factor: dec!(0.70),
                ibc_cap_smmlv: dec!(25),
                solidarity_bands: vec![
                    solidarity_band(dec!(4), Some(dec!(16)), dec!(0.010)),
                    solidarity_band(dec!(16), Some(dec!(17)), dec!(0.012)),
                    solidarity_band(dec!(17), Some(dec!(18)), dec!(0.014)),
                    solidarity_band(dec!(18), Some(dec!(19)), dec!(0.016)),
                    solidarity_band(dec!(19), Some(dec!(20)), dec!(0.018)),
                    solidarity_band(dec!(20), None, dec!(0.020)),
                ],
            },
            limits: DeductionLimits {
                housing_interest_uvt: dec!(100),
                prepaid_medicine_uvt: dec!(16),
                dependents_uvt: dec!(32),
                dependents_rate: dec!(0.10),
                voluntary_contribution_rate: dec!(0.30),
                exempt_income_rate: dec!(0.25),
                exempt_income_annual_cap_uvt: dec!(790),
                global_limit_rate: dec!(0.40),
                global_limit_annual_cap_uvt: dec!(1340),
            },
            brackets: vec![
                bracket(dec!(0), Some(dec!(95)), dec!(0.00), dec!(0)),
                bracket(dec!(95), Some(dec!(150)), dec!(0.19), dec!(0)),
                bracket(dec!(150), Some(dec!(360)), dec!(0.28), dec!(10)),
                bracket(dec!(360), Some(dec!(640)), dec!(0.33), dec!(69)),
                bracket(dec!(640), Some(dec!(945)), dec!(0.35), dec!(162)),
                bracket(dec!(945), Some(dec!(2300)), dec!(0.37), dec!(268)),
                bracket(dec!(2300), None, dec!(0.39), dec!(770)),
            ],
        }
    }

    /// Converts UVT to COP.
    pub fn uvt_to_cop(
        &self,
        uvt: Decimal,
    ) -> Decimal {
        uvt.saturating_mul(self.uvt_value)
    }

    /// Converts COP to UVT. Returns zero if the UVT value is zero.
    pub fn cop_to_uvt(
        &self,
        cop: Decimal,
    ) -> Decimal {
        cop.checked_div(self.uvt_value).unwrap_or(Decimal::ZERO)
    }

    /// Monthly share, in COP, of an annual cap expressed in UVT.
    pub fn monthly_cap_from_annual_uvt(
        &self,
        annual_uvt: Decimal,
    ) -> Decimal {
        self.uvt_to_cop(annual_uvt) / Decimal::from(12)
    }

    /// Validates the constants.
    ///
    /// The engine itself never fails on bad constants; this check belongs at
    /// the boundary where constants are loaded from outside the program.
    ///
    /// # Errors
    ///
    /// Returns [`TaxConstantsError`] for the first violation found.
    pub fn validate(&self) -> Result<(), TaxConstantsError> {
        if self.uvt_value <= Decimal::ZERO {
            return Err(TaxConstantsError::InvalidUvt(self.uvt_value));
        }
        if self.smmlv_value <= Decimal::ZERO {
            return Err(TaxConstantsError::InvalidSmmlv(self.smmlv_value));
        }

        let c = &self.contributions;
        let l = &self.limits;
        let rates = [
            ("health_rate", c.health_rate),
            ("pension_rate", c.pension_rate),
            ("integral_salary_factor", c.integral_salary_factor),
            ("dependents_rate", l.dependents_rate),
            ("voluntary_contribution_rate", l.voluntary_contribution_rate),
            ("exempt_income_rate", l.exempt_income_rate),
            ("global_limit_rate", l.global_limit_rate),
        ];
        for (field, value) in rates {
            check_rate(field, value)?;
        }

        let caps = [
            ("ibc_cap_smmlv", c.ibc_cap_smmlv),
            ("housing_interest_uvt", l.housing_interest_uvt),
            ("prepaid_medicine_uvt", l.prepaid_medicine_uvt),
            ("dependents_uvt", l.dependents_uvt),
            ("exempt_income_annual_cap_uvt", l.exempt_income_annual_cap_uvt),
            ("global_limit_annual_cap_uvt", l.global_limit_annual_cap_uvt),
        ];
        for (field, value) in caps {
            if value < Decimal::ZERO {
                return Err(TaxConstantsError::NegativeLimit { field, value });
            }
        }

        for (index, band) in c.solidarity_bands.iter().enumerate() {
            check_rate("solidarity rate", band.rate)?;
            if index == 0 {
                continue;
            }
            let previous = &c.solidarity_bands[index - 1];
            match previous.max_smmlv {
                Some(max) if band.min_smmlv >= max => {}
                _ => return Err(TaxConstantsError::SolidarityBandOrder { index }),
            }
        }

        self.validate_brackets()
    }

    fn validate_brackets(&self) -> Result<(), TaxConstantsError> {
        let first = self
            .brackets
            .first()
            .ok_or(TaxConstantsError::NoTaxBrackets)?;
        if first.min_uvt != Decimal::ZERO {
            return Err(TaxConstantsError::FirstBracketNotZero(first.min_uvt));
        }

        for (index, bracket) in self.brackets.iter().enumerate() {
            check_rate("bracket rate", bracket.rate)?;
            if bracket.base_tax_uvt < Decimal::ZERO {
                return Err(TaxConstantsError::NegativeLimit {
                    field: "base_tax_uvt",
                    value: bracket.base_tax_uvt,
                });
            }
            match (bracket.max_uvt, self.brackets.get(index + 1)) {
                (Some(max), Some(next)) if next.min_uvt == max && max > bracket.min_uvt => {}
                (Some(_), Some(_)) => return Err(TaxConstantsError::BracketGap { index: index + 1 }),
                (None, Some(_)) => return Err(TaxConstantsError::UnboundedBracketNotLast { index }),
                (_, None) => {}
            }
        }

        Ok(())
    }
}

fn check_rate(
    field: &'static str,
    value: Decimal,
) -> Result<(), TaxConstantsError> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(TaxConstantsError::RateOutOfRange { field, value });
    }
    Ok(())
}

fn bracket(
    min_uvt: Decimal,
    max_uvt: Option<Decimal>,
    rate: Decimal,
    base_tax_uvt: Decimal,
) -> TaxBracket {
    TaxBracket {
        min_uvt,
        max_uvt,
        rate,
        base_tax_uvt,
    }
}

fn solidarity_band(
    min_smmlv: Decimal,
    max_smmlv: Option<Decimal>,
    rate: Decimal,
) -> SolidarityBand {
    SolidarityBand {
        min_smmlv,
        max_smmlv,
        rate,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // colombia_2026 tests
    // =========================================================================

    #[test]
    fn colombia_2026_is_valid() {
        assert_eq!(TaxConstants::colombia_2026().validate(), Ok(()));
    }

    #[test]
    fn default_is_colombia_2026() {
        assert_eq!(TaxConstants::default(), TaxConstants::colombia_2026());
    }

    #[test]
    fn colombia_2026_top_bracket_is_unbounded() {
        let constants = TaxConstants::colombia_2026();
        let top = constants.brackets.last().unwrap();

        assert_eq!(top.min_uvt, dec!(2300));
        assert_eq!(top.max_uvt, None);
        assert_eq!(top.rate, dec!(0.39));
        assert_eq!(top.base_tax_uvt, dec!(770));
    }

    // =========================================================================
    // conversion tests
    // =========================================================================

    #[test]
    fn uvt_to_cop_multiplies_by_uvt_value() {
        let constants = TaxConstants::colombia_2026();

        assert_eq!(constants.uvt_to_cop(dec!(100)), dec!(5237400));
    }

    #[test]
    fn cop_to_uvt_divides_by_uvt_value() {
        let constants = TaxConstants::colombia_2026();

        assert_eq!(constants.cop_to_uvt(dec!(5237400)), dec!(100));
    }

    #[test]
    fn cop_to_uvt_returns_zero_for_zero_uvt() {
        let mut constants = TaxConstants::colombia_2026();
        constants.uvt_value = Decimal::ZERO;

        assert_eq!(constants.cop_to_uvt(dec!(5237400)), Decimal::ZERO);
    }

    #[test]
    fn monthly_cap_prorates_annual_uvt() {
        let constants = TaxConstants::colombia_2026();

        // 790 * 52374 / 12 = 3447955
        assert_eq!(constants.monthly_cap_from_annual_uvt(dec!(790)), dec!(3447955));
    }

    // =========================================================================
    // validate tests
    // =========================================================================

    #[test]
    fn validate_rejects_zero_uvt() {
        let mut constants = TaxConstants::colombia_2026();
        constants.uvt_value = dec!(0);

        assert_eq!(constants.validate(), Err(TaxConstantsError::InvalidUvt(dec!(0))));
    }

    #[test]
    fn validate_rejects_negative_smmlv() {
        let mut constants = TaxConstants::colombia_2026();
        constants.smmlv_value = dec!(-1);

        assert_eq!(constants.validate(), Err(TaxConstantsError::InvalidSmmlv(dec!(-1))));
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let mut constants = TaxConstants::colombia_2026();
        constants.limits.global_limit_rate = dec!(40);

        assert_eq!(
            constants.validate(),
            Err(TaxConstantsError::RateOutOfRange {
                field: "global_limit_rate",
                value: dec!(40),
            })
        );
    }

    #[test]
    fn validate_rejects_negative_cap() {
        let mut constants = TaxConstants::colombia_2026();
        constants.limits.housing_interest_uvt = dec!(-100);

        assert_eq!(
            constants.validate(),
            Err(TaxConstantsError::NegativeLimit {
                field: "housing_interest_uvt",
                value: dec!(-100),
            })
        );
    }

    #[test]
    fn validate_rejects_empty_brackets() {
        let mut constants = TaxConstants::colombia_2026();
        constants.brackets.clear();

        assert_eq!(constants.validate(), Err(TaxConstantsError::NoTaxBrackets));
    }

    #[test]
    fn validate_rejects_first_bracket_above_zero() {
        let mut constants = TaxConstants::colombia_2026();
        constants.brackets.remove(0);

        assert_eq!(
            constants.validate(),
            Err(TaxConstantsError::FirstBracketNotZero(dec!(95)))
        );
    }

    #[test]
    fn validate_rejects_gap_between_brackets() {
        let mut constants = TaxConstants::colombia_2026();
        constants.brackets.remove(2);

        assert_eq!(constants.validate(), Err(TaxConstantsError::BracketGap { index: 2 }));
    }

    #[test]
    fn validate_rejects_unbounded_bracket_in_the_middle() {
        let mut constants = TaxConstants::colombia_2026();
        constants.brackets[3].max_uvt = None;

        assert_eq!(
            constants.validate(),
            Err(TaxConstantsError::UnboundedBracketNotLast { index: 3 })
        );
    }

    #[test]
    fn validate_rejects_overlapping_solidarity_bands() {
        let mut constants = TaxConstants::colombia_2026();
        constants.contributions.solidarity_bands[1].min_smmlv = dec!(10);

        assert_eq!(
            constants.validate(),
            Err(TaxConstantsError::SolidarityBandOrder { index: 1 })
        );
    }

    #[test]
    fn validate_accepts_empty_solidarity_table() {
        let mut constants = TaxConstants::colombia_2026();
        constants.contributions.solidarity_bands.clear();

        assert_eq!(constants.validate(), Ok(()));
    }
}
