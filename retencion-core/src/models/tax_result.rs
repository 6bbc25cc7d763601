use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{IntermediateCalc, Procedure, RateSource};

/// Withholding for one month under one procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub procedure: Procedure,

    pub taxable_base: Decimal,
    pub taxable_base_uvt: Decimal,

    pub withholding_uvt: Decimal,
    pub withholding: Decimal,

    /// Gross income minus mandatory contributions and withholding.
    pub net_income: Decimal,

    /// Fixed rate applied, as a percentage. Only set for Procedure 2.
    pub effective_rate: Option<Decimal>,

    /// Rule that produced `effective_rate`. Only set for Procedure 2.
    pub rate_source: Option<RateSource>,

    /// Breakdown of the current month's base.
    pub details: IntermediateCalc,
}
