use std::collections::HashSet;
use std::io::Read;

use retencion_core::TaxInputs;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::bracket_loader::deserialize_optional_decimal;

/// Errors that can occur when loading a scenarios file.
#[derive(Debug, Error)]
pub enum ScenarioLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("scenario on row {0} has no name")]
    MissingName(usize),

    #[error("scenario '{0}' appears more than once")]
    DuplicateName(String),
}

impl From<csv::Error> for ScenarioLoaderError {
    fn from(err: csv::Error) -> Self {
        ScenarioLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the scenarios CSV file.
///
/// Only `name` is required. Every other column may be left out of the header
/// or left empty on a row: amounts default to zero, flags to `false`, and the
/// Procedure 2 rate and historical income to unset.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ScenarioRecord {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub monthly_salary: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub other_income: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub voluntary_pension: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub afc_contribution: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub housing_interest: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub prepaid_medicine: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub has_dependents: bool,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_salario_integral: bool,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub procedure2_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub historical_monthly_income: Option<Decimal>,
}

impl ScenarioRecord {
    pub fn to_inputs(&self) -> TaxInputs {
        TaxInputs {
            monthly_salary: self.monthly_salary.unwrap_or_default(),
            other_income: self.other_income.unwrap_or_default(),
            voluntary_pension: self.voluntary_pension.unwrap_or_default(),
            afc_contribution: self.afc_contribution.unwrap_or_default(),
            housing_interest: self.housing_interest.unwrap_or_default(),
            prepaid_medicine: self.prepaid_medicine.unwrap_or_default(),
            has_dependents: self.has_dependents,
            is_salario_integral: self.is_salario_integral,
            procedure2_rate: self.procedure2_rate,
            historical_monthly_income: self.historical_monthly_income,
        }
    }
}

/// A named set of inputs ready for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub inputs: TaxInputs,
}

/// Accepts `true`/`false`, `yes`/`no`, `1`/`0` in any case; empty is `false`.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    let Some(s) = s else {
        return Ok(false);
    };
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "no" | "0" => Ok(false),
        "true" | "yes" | "1" => Ok(true),
        other => Err(serde::de::Error::custom(format!("invalid flag '{other}'"))),
    }
}

/// Loader for batches of named scenarios from CSV files.
pub struct ScenarioLoader;

impl ScenarioLoader {
    /// Parse scenario records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ScenarioRecord>, ScenarioLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ScenarioRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse and convert records into scenarios.
    ///
    /// Names are trimmed and must be present and unique.
    pub fn load<R: Read>(reader: R) -> Result<Vec<Scenario>, ScenarioLoaderError> {
        let records = Self::parse(reader)?;
        let mut seen = HashSet::new();
        let mut scenarios = Vec::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            let name = record.name.trim();
            if name.is_empty() {
                // Row 1 is the header.
                return Err(ScenarioLoaderError::MissingName(row + 2));
            }
            if !seen.insert(name.to_string()) {
                return Err(ScenarioLoaderError::DuplicateName(name.to_string()));
            }
            scenarios.push(Scenario {
                name: name.to_string(),
                inputs: record.to_inputs(),
            });
        }

        Ok(scenarios)
    }
}
