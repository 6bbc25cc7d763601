use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use retencion_core::TaxConstants;
use retencion_core::calculations::{WithholdingEngine, flat_year};
use retencion_data::{BracketLoader, ConstantsLoader, ScenarioLoader};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::{Cli, Command, InputArgs};
use crate::report::{self, BatchRow};

/// Resolves the active constants: the built-in set or a TOML file, with the
/// bracket table optionally replaced from CSV.
pub fn load_constants(
    constants_path: Option<&Path>,
    brackets_path: Option<&Path>,
) -> Result<TaxConstants> {
    let constants = match constants_path {
        Some(path) => {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read constants file: {}", path.display()))?;
            ConstantsLoader::parse(&contents)
                .with_context(|| format!("Failed to load constants from: {}", path.display()))?
        }
        None => TaxConstants::colombia_2026(),
    };

    let Some(path) = brackets_path else {
        return Ok(constants);
    };
    let file = File::open(path)
        .with_context(|| format!("Failed to open brackets file: {}", path.display()))?;
    let records = BracketLoader::parse(file)
        .with_context(|| format!("Failed to parse brackets file: {}", path.display()))?;
    info!(path = %path.display(), rows = records.len(), "bracket table loaded");
    BracketLoader::apply(&constants, &records)
        .with_context(|| format!("Failed to apply brackets from: {}", path.display()))
}

/// Runs the selected subcommand, writing its report to `out`.
pub fn run<W: Write>(
    cli: &Cli,
    out: &mut W,
) -> Result<()> {
    let constants = load_constants(cli.constants.as_deref(), cli.brackets.as_deref())?;
    let engine = WithholdingEngine::new(&constants);
    debug!(fiscal_year = constants.fiscal_year, "constants ready");

    match &cli.command {
        Command::Calculate { procedure, inputs } => {
            let result = engine.calculate_tax(&inputs.to_inputs(), *procedure);
            emit(out, cli.json, &result, |text| report::render_result(text, &result, &constants))
        }
        Command::Compare { inputs } => {
            let comparison = engine.compare_procedures(&inputs.to_inputs());
            emit(out, cli.json, &comparison, |text| report::render_comparison(text, &comparison))
        }
        Command::Simulate { months, inputs } => {
            let incomes = monthly_incomes(months, inputs)?;
            let base_inputs = inputs.to_inputs();
            let fixed_rate = engine
                .compare_procedures(&base_inputs)
                .procedure2
                .effective_rate
                .unwrap_or(Decimal::ZERO);
            let simulation = engine.simulate_year(&base_inputs, &incomes, fixed_rate);
            emit(out, cli.json, &simulation, |text| report::render_simulation(text, &simulation))
        }
        Command::Batch { file } => {
            let reader = File::open(file)
                .with_context(|| format!("Failed to open scenarios file: {}", file.display()))?;
            let scenarios = ScenarioLoader::load(reader)
                .with_context(|| format!("Failed to load scenarios from: {}", file.display()))?;
            info!(count = scenarios.len(), "running batch");

            let rows: Vec<BatchRow<'_>> = scenarios
                .iter()
                .map(|scenario| BatchRow {
                    name: &scenario.name,
                    comparison: engine.compare_procedures(&scenario.inputs),
                })
                .collect();
            emit(out, cli.json, &rows, |text| report::render_batch(text, &rows))
        }
        Command::Constants => {
            if cli.json {
                return write_json(out, &constants);
            }
            let text = ConstantsLoader::to_toml(&constants).context("Failed to render constants")?;
            out.write_all(text.as_bytes())
                .context("Failed to write output")
        }
    }
}

/// Twelve incomes from `--months`, or the salary repeated.
fn monthly_incomes(
    months: &[Decimal],
    inputs: &InputArgs,
) -> Result<[Decimal; 12]> {
    if months.is_empty() {
        return Ok(flat_year(inputs.salary));
    }
    match <[Decimal; 12]>::try_from(months) {
        Ok(incomes) => Ok(incomes),
        Err(_) => bail!("--months needs 12 values, got {}", months.len()),
    }
}

fn emit<W: Write, T: Serialize>(
    out: &mut W,
    json: bool,
    value: &T,
    render: impl FnOnce(&mut String) -> fmt::Result,
) -> Result<()> {
    if json {
        return write_json(out, value);
    }
    let mut text = String::new();
    render(&mut text).context("Failed to render report")?;
    out.write_all(text.as_bytes())
        .context("Failed to write output")
}

fn write_json<W: Write, T: Serialize>(
    out: &mut W,
    value: &T,
) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("Failed to serialize output")?;
    writeln!(out).context("Failed to write output")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn monthly_incomes_defaults_to_salary() {
        let inputs = InputArgs {
            salary: dec!(8000000),
            ..Default::default()
        };

        let incomes = monthly_incomes(&[], &inputs).expect("incomes");

        assert_eq!(incomes, [dec!(8000000); 12]);
    }

    #[test]
    fn monthly_incomes_requires_twelve_values() {
        let err = monthly_incomes(&[dec!(1), dec!(2)], &InputArgs::default())
            .expect_err("two months should fail");

        assert_eq!(err.to_string(), "--months needs 12 values, got 2");
    }

    #[test]
    fn load_constants_defaults_to_builtin() {
        let constants = load_constants(None, None).expect("constants");

        assert_eq!(constants, TaxConstants::colombia_2026());
    }

    #[test]
    fn load_constants_reports_missing_file() {
        let err = load_constants(Some(Path::new("does-not-exist.toml")), None)
            .expect_err("missing file should fail");

        assert!(err.to_string().contains("does-not-exist.toml"));
    }
}
