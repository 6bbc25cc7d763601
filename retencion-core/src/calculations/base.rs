//! Taxable base calculation ("depuración de la base gravable").
//!
//! Turns one month of income plus the employee's deduction figures into the
//! taxable base, independently of the procedure that will consume it.
//!
//! # Stages
//!
//! | Stage | Description |
//! |-------|-------------|
//! | 1     | Contribution base (IBC): 70% of an integral salary, capped at 25 SMMLV |
//! | 2     | Health 4% + pension 4% + solidarity-fund surcharge on the IBC |
//! | 3     | Housing interest, prepaid medicine, dependents, voluntary pension + AFC, each capped |
//! | 4     | 25% exempt income on (net income - deductions), capped at 790 UVT / 12 |
//! | 5     | Global ceiling: deductions + exemption limited to min(40% of net, 1,340 UVT / 12) |
//! | 6     | Taxable base = net income - allowed relief, in COP and UVT |
//! | 7     | Table withholding on the UVT base (always computed) |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use retencion_core::calculations::BaseCalculator;
//! use retencion_core::{TaxConstants, TaxInputs};
//!
//! let constants = TaxConstants::colombia_2026();
//! let calculator = BaseCalculator::new(&constants);
//!
//! let calc = calculator.compute(dec!(15000000), &TaxInputs::default());
//!
//! assert_eq!(calc.mandatory_contributions, dec!(1350000));
//! assert_eq!(calc.exempt_income, dec!(3412500));
//! assert_eq!(calc.taxable_base, dec!(10237500));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::floor_zero;
use crate::models::{IntermediateCalc, TaxBracket, TaxConstants, TaxInputs};

/// Calculator for the taxable base of a single month.
///
/// Borrowing the constants keeps the calculator cheap to build per call; it
/// holds no other state.
#[derive(Debug, Clone, Copy)]
pub struct BaseCalculator<'a> {
    constants: &'a TaxConstants,
}

impl<'a> BaseCalculator<'a> {
    pub fn new(constants: &'a TaxConstants) -> Self {
        Self { constants }
    }

    /// Computes the taxable base for `income` with the deductions in `inputs`.
    ///
    /// `income` replaces the salary and other income fields of `inputs`, which
    /// lets the same inputs describe both the current month and a historical
    /// reference month. Negative figures are clamped to zero.
    pub fn compute(
        &self,
        income: Decimal,
        inputs: &TaxInputs,
    ) -> IntermediateCalc {
        self.compute_sanitized(income, &inputs.sanitized())
    }

    /// Same as [`compute`](Self::compute) for inputs that are already clamped.
    pub(crate) fn compute_sanitized(
        &self,
        income: Decimal,
        inputs: &TaxInputs,
    ) -> IntermediateCalc {
        let gross_income = floor_zero(income);

        // Stage 1: contribution base
        let contribution_base = self.contribution_base(gross_income, inputs.is_salario_integral);

        // Stage 2: mandatory contributions
        let rules = &self.constants.contributions;
        let health = contribution_base * rules.health_rate;
        let pension = contribution_base * rules.pension_rate;
        let solidarity_rate = self.solidarity_rate(contribution_base);
        let solidarity = contribution_base * solidarity_rate;
        let mandatory_contributions = health + pension + solidarity;
        let net_of_contributions = floor_zero(gross_income - mandatory_contributions);

        // Stage 3: capped deductions
        let housing_interest = self.housing_interest(inputs.housing_interest);
        let prepaid_medicine = self.prepaid_medicine(inputs.prepaid_medicine);
        let dependents = self.dependents(gross_income, inputs.has_dependents);
        let voluntary_contributions = self.voluntary_contributions(
            gross_income,
            inputs.voluntary_pension,
            inputs.afc_contribution,
        );
        let total_deductions =
            housing_interest + prepaid_medicine + dependents + voluntary_contributions;

        // Stage 4: exempt income
        let exempt_income = self.exempt_income(net_of_contributions, total_deductions);

        // Stage 5: global ceiling
        let claimed_relief = total_deductions + exempt_income;
        let global_limit = self.global_limit(net_of_contributions);
        let allowed_relief = claimed_relief.min(global_limit);

        // Stage 6: taxable base
        let taxable_base = floor_zero(net_of_contributions - allowed_relief);
        let taxable_base_uvt = self.constants.cop_to_uvt(taxable_base);

        // Stage 7: table withholding
        let table_withholding_uvt = table_withholding_uvt(&self.constants.brackets, taxable_base_uvt);

        debug!(
            gross_income = %gross_income,
            contribution_base = %contribution_base,
            mandatory_contributions = %mandatory_contributions,
            total_deductions = %total_deductions,
            exempt_income = %exempt_income,
            global_limit = %global_limit,
            taxable_base = %taxable_base,
            table_withholding_uvt = %table_withholding_uvt,
            "taxable base computed"
        );

        IntermediateCalc {
            gross_income,
            contribution_base,
            health,
            pension,
            solidarity_rate,
            solidarity,
            mandatory_contributions,
            net_of_contributions,
            housing_interest,
            prepaid_medicine,
            dependents,
            voluntary_contributions,
            total_deductions,
            exempt_income,
            claimed_relief,
            global_limit,
            allowed_relief,
            taxable_base,
            taxable_base_uvt,
            table_withholding_uvt,
        }
    }

    /// IBC: 70% of an integral salary (100% otherwise), capped at 25 SMMLV.
    fn contribution_base(
        &self,
        gross_income: Decimal,
        is_salario_integral: bool,
    ) -> Decimal {
        let rules = &self.constants.contributions;
        let raw = if is_salario_integral {
            gross_income * rules.integral_salary_factor
        } else {
            gross_income
        };
        let cap = rules.ibc_cap_smmlv.saturating_mul(self.constants.smmlv_value);
        raw.min(cap)
    }

    /// Solidarity-fund rate for the band containing the contribution base.
    ///
    /// Bases below the first band pay no surcharge.
    fn solidarity_rate(
        &self,
        contribution_base: Decimal,
    ) -> Decimal {
        let smmlv = self.constants.smmlv_value;
        self.constants
            .contributions
            .solidarity_bands
            .iter()
            .find(|band| band.applies_to(contribution_base, smmlv))
            .map_or(Decimal::ZERO, |band| band.rate)
    }

    fn housing_interest(
        &self,
        paid: Decimal,
    ) -> Decimal {
        let cap = self
            .constants
            .uvt_to_cop(self.constants.limits.housing_interest_uvt);
        paid.min(cap)
    }

    fn prepaid_medicine(
        &self,
        paid: Decimal,
    ) -> Decimal {
        let cap = self
            .constants
            .uvt_to_cop(self.constants.limits.prepaid_medicine_uvt);
        paid.min(cap)
    }

    /// 10% of gross income, capped at 32 UVT, only when dependents are claimed.
    fn dependents(
        &self,
        gross_income: Decimal,
        has_dependents: bool,
    ) -> Decimal {
        if !has_dependents {
            return Decimal::ZERO;
        }
        let limits = &self.constants.limits;
        let cap = self.constants.uvt_to_cop(limits.dependents_uvt);
        (gross_income * limits.dependents_rate).min(cap)
    }

    /// Voluntary pension and AFC share a single cap of 30% of gross income.
    fn voluntary_contributions(
        &self,
        gross_income: Decimal,
        voluntary_pension: Decimal,
        afc_contribution: Decimal,
    ) -> Decimal {
        let cap = gross_income * self.constants.limits.voluntary_contribution_rate;
        voluntary_pension.saturating_add(afc_contribution).min(cap)
    }

    /// 25% of what remains after deductions, capped at the prorated annual cap.
    ///
    /// Computed even when deductions already exceed net income, in which case
    /// the remainder floors at zero and so does the exemption.
    fn exempt_income(
        &self,
        net_of_contributions: Decimal,
        total_deductions: Decimal,
    ) -> Decimal {
        let limits = &self.constants.limits;
        let remainder = floor_zero(net_of_contributions - total_deductions);
        let cap = self
            .constants
            .monthly_cap_from_annual_uvt(limits.exempt_income_annual_cap_uvt);
        (remainder * limits.exempt_income_rate).min(cap)
    }

    /// The lesser of 40% of net income and the prorated annual cap.
    fn global_limit(
        &self,
        net_of_contributions: Decimal,
    ) -> Decimal {
        let limits = &self.constants.limits;
        let cap = self
            .constants
            .monthly_cap_from_annual_uvt(limits.global_limit_annual_cap_uvt);
        (net_of_contributions * limits.global_limit_rate).min(cap)
    }
}

/// Withholding in UVT the bracket table assigns to `base_uvt`.
///
/// Scans the table for the half-open bracket containing the base. A base
/// outside every bracket (only possible for a negative base or a malformed
/// table) yields zero.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use retencion_core::calculations::table_withholding_uvt;
/// use retencion_core::TaxConstants;
///
/// let constants = TaxConstants::colombia_2026();
///
/// // (200 - 150) * 0.28 + 10
/// assert_eq!(table_withholding_uvt(&constants.brackets, dec!(200)), dec!(24));
/// assert_eq!(table_withholding_uvt(&constants.brackets, dec!(80)), dec!(0));
/// ```
pub fn table_withholding_uvt(
    brackets: &[TaxBracket],
    base_uvt: Decimal,
) -> Decimal {
    brackets
        .iter()
        .find(|bracket| bracket.contains(base_uvt))
        .map_or(Decimal::ZERO, |bracket| bracket.withholding_uvt(base_uvt))
}
