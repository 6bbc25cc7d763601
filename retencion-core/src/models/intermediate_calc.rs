use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Breakdown of one taxable-base computation.
///
/// Every field is in COP unless its name ends in `_uvt`. All amounts are
/// non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntermediateCalc {
    /// Income the base was computed from.
    pub gross_income: Decimal,

    /// Contribution base (IBC) after the integral-salary factor and the cap.
    pub contribution_base: Decimal,

    pub health: Decimal,
    pub pension: Decimal,

    /// Solidarity-fund surcharge rate applied to the contribution base.
    pub solidarity_rate: Decimal,
    pub solidarity: Decimal,

    /// Health + pension + solidarity.
    pub mandatory_contributions: Decimal,

    /// Gross income minus mandatory contributions.
    pub net_of_contributions: Decimal,

    pub housing_interest: Decimal,
    pub prepaid_medicine: Decimal,
    pub dependents: Decimal,
    /// Voluntary pension plus AFC, capped together.
    pub voluntary_contributions: Decimal,

    /// Sum of the four capped deductions.
    pub total_deductions: Decimal,

    /// 25% labour exempt income after its monthly cap.
    pub exempt_income: Decimal,

    /// Deductions plus exempt income before the global ceiling.
    pub claimed_relief: Decimal,

    /// Global ceiling: the lesser of 40% of net income and the monthly cap.
    pub global_limit: Decimal,

    /// Relief actually subtracted from net income.
    pub allowed_relief: Decimal,

    pub taxable_base: Decimal,
    pub taxable_base_uvt: Decimal,

    /// Withholding the bracket table yields for `taxable_base_uvt`.
    pub table_withholding_uvt: Decimal,
}

impl IntermediateCalc {
    /// Ratio of table withholding to base, as a percentage.
    ///
    /// Zero when the base is zero.
    pub fn implied_rate(&self) -> Decimal {
        if self.taxable_base_uvt.is_zero() {
            return Decimal::ZERO;
        }
        self.table_withholding_uvt / self.taxable_base_uvt * Decimal::ONE_HUNDRED
    }
}
