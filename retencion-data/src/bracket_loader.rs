use std::io::Read;

use retencion_core::{TaxBracket, TaxConstants, TaxConstantsError};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading a withholding table.
#[derive(Debug, Error)]
pub enum BracketLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("no brackets for fiscal year {0}")]
    NoBracketsForYear(i32),

    #[error("invalid bracket table: {0}")]
    Invalid(#[from] TaxConstantsError),
}

impl From<csv::Error> for BracketLoaderError {
    fn from(err: csv::Error) -> Self {
        BracketLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the brackets CSV file.
///
/// - `fiscal_year`: the year the row applies to (e.g., 2026)
/// - `min_uvt`: lower bound of the bracket in UVT
/// - `max_uvt`: upper bound in UVT (empty for the open top bracket)
/// - `rate`: marginal rate as a fraction (e.g., 0.28 for 28%)
/// - `base_tax_uvt`: withholding accrued by the lower brackets, in UVT
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BracketRecord {
    pub fiscal_year: i32,
    pub min_uvt: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub max_uvt: Option<Decimal>,
    pub rate: Decimal,
    pub base_tax_uvt: Decimal,
}

impl From<&BracketRecord> for TaxBracket {
    fn from(record: &BracketRecord) -> Self {
        TaxBracket {
            min_uvt: record.min_uvt,
            max_uvt: record.max_uvt,
            rate: record.rate,
            base_tax_uvt: record.base_tax_uvt,
        }
    }
}

/// Reads an empty or blank cell as `None`.
pub(crate) fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Loader for withholding tables from CSV files.
///
/// A file may hold several fiscal years; only the rows matching the year of
/// the constants being replaced are used.
pub struct BracketLoader;

impl BracketLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or a
    /// byte slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<BracketRecord>, BracketLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: BracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// The brackets for `fiscal_year`, ordered by lower bound.
    pub fn brackets_for_year(
        records: &[BracketRecord],
        fiscal_year: i32,
    ) -> Result<Vec<TaxBracket>, BracketLoaderError> {
        let mut brackets: Vec<TaxBracket> = records
            .iter()
            .filter(|record| record.fiscal_year == fiscal_year)
            .map(TaxBracket::from)
            .collect();

        if brackets.is_empty() {
            return Err(BracketLoaderError::NoBracketsForYear(fiscal_year));
        }

        brackets.sort_by(|a, b| a.min_uvt.cmp(&b.min_uvt));
        Ok(brackets)
    }

    /// Returns `constants` with its bracket table replaced by the records for
    /// its fiscal year.
    ///
    /// The result is validated as a whole, so a table with gaps or an
    /// unbounded middle bracket is rejected.
    pub fn apply(
        constants: &TaxConstants,
        records: &[BracketRecord],
    ) -> Result<TaxConstants, BracketLoaderError> {
        let brackets = Self::brackets_for_year(records, constants.fiscal_year)?;
        debug!(
            fiscal_year = constants.fiscal_year,
            count = brackets.len(),
            "replacing withholding table"
        );

        let updated = TaxConstants {
            brackets,
            ..constants.clone()
        };
        updated.validate()?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const TEST_CSV: &str = r#"fiscal_year,min_uvt,max_uvt,rate,base_tax_uvt
2025,0,95,0,0
2025,95,150,0.19,0
2025,150,,0.28,10
2026,0,95,0,0
2026,95,150,0.19,0
2026,150,360,0.28,10
2026,360,640,0.33,69
2026,640,945,0.35,162
2026,945,2300,0.37,268
2026,2300,,0.39,770
"#;

    // =========================================================================
    // parse tests
    // =========================================================================

    #[test]
    fn test_parse_csv_single_bracket() {
        let csv = "fiscal_year,min_uvt,max_uvt,rate,base_tax_uvt\n2026,150,360,0.28,10";

        let records = BracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![BracketRecord {
                fiscal_year: 2026,
                min_uvt: dec!(150),
                max_uvt: Some(dec!(360)),
                rate: dec!(0.28),
                base_tax_uvt: dec!(10),
            }]
        );
    }

    #[test]
    fn test_parse_csv_unbounded_max() {
        let csv = "fiscal_year,min_uvt,max_uvt,rate,base_tax_uvt\n2026,2300,,0.39,770";

        let records = BracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].max_uvt, None);
        assert_eq!(records[0].base_tax_uvt, dec!(770));
    }

    #[test]
    fn test_parse_csv_multiple_years() {
        let records = BracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 10);
        assert_eq!(records.iter().filter(|r| r.fiscal_year == 2025).count(), 3);
    }

    #[test]
    fn test_parse_invalid_csv_missing_column() {
        let csv = "fiscal_year,min_uvt,max_uvt\n2026,0,95";

        let result = BracketLoader::parse(csv.as_bytes());

        let err = result.expect_err("Should fail for missing column");
        let BracketLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_invalid_csv_bad_decimal() {
        let csv = "fiscal_year,min_uvt,max_uvt,rate,base_tax_uvt\n2026,0,abc,0,0";

        let result = BracketLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(BracketLoaderError::CsvParse(_))));
    }

    // =========================================================================
    // brackets_for_year tests
    // =========================================================================

    #[test]
    fn test_brackets_for_year_filters_and_sorts() {
        let csv = "fiscal_year,min_uvt,max_uvt,rate,base_tax_uvt\n\
                   2026,95,,0.19,0\n\
                   2025,0,10,0,0\n\
                   2026,0,95,0,0";
        let records = BracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let brackets = BracketLoader::brackets_for_year(&records, 2026).expect("brackets");

        assert_eq!(brackets.len(), 2);
        assert_eq!(brackets[0].min_uvt, dec!(0));
        assert_eq!(brackets[1].min_uvt, dec!(95));
        assert_eq!(brackets[1].max_uvt, None);
    }

    #[test]
    fn test_brackets_for_missing_year() {
        let records = BracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

        let result = BracketLoader::brackets_for_year(&records, 2030);

        assert!(matches!(result, Err(BracketLoaderError::NoBracketsForYear(2030))));
    }

    // =========================================================================
    // apply tests
    // =========================================================================

    #[test]
    fn test_apply_replaces_table_for_constants_year() {
        let records = BracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
        let constants = TaxConstants::colombia_2026();

        let updated = BracketLoader::apply(&constants, &records).expect("apply");

        assert_eq!(updated, constants);
    }

    #[test]
    fn test_apply_uses_year_of_constants() {
        let records = BracketLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");
        let constants = TaxConstants {
            fiscal_year: 2025,
            ..TaxConstants::colombia_2026()
        };

        let updated = BracketLoader::apply(&constants, &records).expect("apply");

        assert_eq!(updated.brackets.len(), 3);
        assert_eq!(updated.uvt_value, constants.uvt_value);
    }

    #[test]
    fn test_apply_rejects_gap_in_table() {
        let csv = "fiscal_year,min_uvt,max_uvt,rate,base_tax_uvt\n\
                   2026,0,95,0,0\n\
                   2026,100,,0.19,0";
        let records = BracketLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        let result = BracketLoader::apply(&TaxConstants::colombia_2026(), &records);

        assert!(matches!(
            result,
            Err(BracketLoaderError::Invalid(TaxConstantsError::BracketGap { index: 1 }))
        ));
    }
}
