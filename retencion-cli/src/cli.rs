use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use retencion_core::{Procedure, TaxInputs};
use rust_decimal::Decimal;

/// Monthly salary withholding calculator (retención en la fuente).
///
/// Computes the withholding under Procedure 1 or 2, compares both, projects a
/// year of variable income and runs batches of scenarios from CSV.
#[derive(Debug, Parser)]
#[command(name = "retencion", version, about)]
pub struct Cli {
    /// TOML file replacing the built-in 2026 constants.
    #[arg(long, global = true)]
    pub constants: Option<PathBuf>,

    /// CSV file replacing the withholding table of the active constants.
    #[arg(long, global = true)]
    pub brackets: Option<PathBuf>,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log level or filter directive; overrides RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Withholding for one month under one procedure.
    Calculate {
        /// Procedure number (1 or 2).
        #[arg(short, long, value_parser = parse_procedure)]
        procedure: Procedure,

        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Run both procedures and recommend one.
    Compare {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Project twelve months under both procedures.
    Simulate {
        /// Twelve comma-separated monthly incomes, January first.
        /// Defaults to the salary every month.
        #[arg(long, value_delimiter = ',', value_parser = parse_amount)]
        months: Vec<Decimal>,

        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Compare every scenario of a CSV file.
    Batch {
        /// Scenarios CSV: a `name` column plus any input columns.
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the active constants as TOML.
    Constants,
}

/// Employee figures for one month. Amounts are in COP and accept `_` or `,`
/// as thousands separators.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// Monthly salary.
    #[arg(long, value_parser = parse_amount)]
    pub salary: Decimal,

    /// Other taxable labour income for the month.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub other_income: Decimal,

    /// Voluntary pension contribution.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub voluntary_pension: Decimal,

    /// AFC (housing savings) contribution.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub afc: Decimal,

    /// Mortgage interest paid.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub housing_interest: Decimal,

    /// Prepaid medicine paid.
    #[arg(long, value_parser = parse_amount, default_value = "0")]
    pub prepaid_medicine: Decimal,

    /// Claim the dependents deduction.
    #[arg(long)]
    pub dependents: bool,

    /// The salary is an integral salary.
    #[arg(long)]
    pub integral: bool,

    /// Fixed Procedure 2 rate in percent; 0 or absent derives it.
    #[arg(long, value_parser = parse_amount)]
    pub rate: Option<Decimal>,

    /// Average monthly income of the reference period, for the Procedure 2 rate.
    #[arg(long, value_parser = parse_amount)]
    pub historical_income: Option<Decimal>,
}

impl InputArgs {
    pub fn to_inputs(&self) -> TaxInputs {
        TaxInputs {
            monthly_salary: self.salary,
            other_income: self.other_income,
            voluntary_pension: self.voluntary_pension,
            afc_contribution: self.afc,
            housing_interest: self.housing_interest,
            prepaid_medicine: self.prepaid_medicine,
            has_dependents: self.dependents,
            is_salario_integral: self.integral,
            procedure2_rate: self.rate,
            historical_monthly_income: self.historical_income,
        }
    }
}

/// Parses an amount, ignoring `_` and `,` thousands separators.
pub fn parse_amount(s: &str) -> Result<Decimal, String> {
    let normalized: String = s.trim().chars().filter(|c| !matches!(c, '_' | ',')).collect();
    normalized
        .parse()
        .map_err(|e| format!("invalid amount '{s}': {e}"))
}

fn parse_procedure(s: &str) -> Result<Procedure, String> {
    let number: u8 = s
        .trim()
        .parse()
        .map_err(|_| format!("invalid procedure '{s}' (expected 1 or 2)"))?;
    Procedure::try_from(number).map_err(|e| e.to_string())
}
