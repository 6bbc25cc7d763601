mod intermediate_calc;
mod procedure;
mod tax_bracket;
mod tax_constants;
mod tax_inputs;
mod tax_result;

pub use intermediate_calc::IntermediateCalc;
pub use procedure::{Procedure, ProcedureError, RateSource};
pub use tax_bracket::TaxBracket;
pub use tax_constants::{
    ContributionRules, DeductionLimits, SolidarityBand, TaxConstants, TaxConstantsError,
};
pub use tax_inputs::TaxInputs;
pub use tax_result::TaxResult;
