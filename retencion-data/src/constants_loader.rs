use retencion_core::{TaxConstants, TaxConstantsError};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading a constants file.
#[derive(Debug, Error)]
pub enum ConstantsLoaderError {
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("invalid constants: {0}")]
    Invalid(#[from] TaxConstantsError),
}

/// Loader for a complete set of fiscal-year constants in TOML.
///
/// The file mirrors [`TaxConstants`] field for field: top-level
/// `fiscal_year`, `uvt_value` and `smmlv_value`, a `[contributions]` table with
/// `[[contributions.solidarity_bands]]`, a `[limits]` table and one
/// `[[brackets]]` entry per row of the withholding table. Amounts may be
/// written as strings to keep them exact.
pub struct ConstantsLoader;

impl ConstantsLoader {
    /// Parses and validates constants from TOML text.
    pub fn parse(contents: &str) -> Result<TaxConstants, ConstantsLoaderError> {
        let constants: TaxConstants = toml::from_str(contents)?;
        constants.validate()?;

        debug!(
            fiscal_year = constants.fiscal_year,
            uvt_value = %constants.uvt_value,
            brackets = constants.brackets.len(),
            "constants loaded"
        );
        Ok(constants)
    }

    /// Renders constants as TOML in the format [`parse`](Self::parse) reads.
    pub fn to_toml(constants: &TaxConstants) -> Result<String, ConstantsLoaderError> {
        Ok(toml::to_string(constants)?)
    }
}
