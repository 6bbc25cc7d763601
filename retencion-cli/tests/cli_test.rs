//! End-to-end tests: parse a command line and run it against an in-memory
//! output buffer.

use std::path::{Path, PathBuf};

use clap::Parser;
use pretty_assertions::assert_eq;
use retencion_cli::app;
use retencion_cli::cli::{Cli, Command};
use retencion_core::Procedure;
use rust_decimal_macros::dec;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run(args: &[&str]) -> String {
    let cli = Cli::try_parse_from(args).expect("arguments should parse");
    let mut out = Vec::new();
    app::run(&cli, &mut out).expect("command should succeed");
    String::from_utf8(out).expect("output should be UTF-8")
}

// =============================================================================
// Argument parsing
// =============================================================================

#[test]
fn test_parse_calculate_arguments() {
    let cli = Cli::try_parse_from([
        "retencion",
        "calculate",
        "--procedure",
        "2",
        "--salary",
        "15,000,000",
        "--rate",
        "11.63",
        "--dependents",
        "--json",
    ])
    .expect("arguments should parse");

    assert!(cli.json);
    let Command::Calculate { procedure, inputs } = cli.command else {
        panic!("Expected calculate, got: {:?}", cli.command);
    };
    assert_eq!(procedure, Procedure::Two);
    assert_eq!(inputs.salary, dec!(15000000));
    assert_eq!(inputs.rate, Some(dec!(11.63)));
    assert!(inputs.dependents);
    assert_eq!(inputs.other_income, dec!(0));
}

#[test]
fn test_parse_rejects_unknown_procedure() {
    let result = Cli::try_parse_from(["retencion", "calculate", "-p", "3", "--salary", "1"]);

    assert!(result.is_err());
}

#[test]
fn test_parse_requires_salary() {
    let result = Cli::try_parse_from(["retencion", "compare"]);

    assert!(result.is_err());
}

#[test]
fn test_parse_simulate_months() {
    let cli = Cli::try_parse_from([
        "retencion",
        "simulate",
        "--salary",
        "15000000",
        "--months",
        "1,2,3,4,5,6,7,8,9,10,11,12",
    ])
    .expect("arguments should parse");

    let Command::Simulate { months, .. } = cli.command else {
        panic!("Expected simulate, got: {:?}", cli.command);
    };
    assert_eq!(months.len(), 12);
    assert_eq!(months[11], dec!(12));
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["retencion", "constants", "--log-level", "debug", "--json"])
        .expect("arguments should parse");

    assert_eq!(cli.log_level.as_deref(), Some("debug"));
    assert!(cli.json);
}

// =============================================================================
// Commands
// =============================================================================

#[test]
fn test_calculate_text_report() {
    let output = run(&["retencion", "calculate", "-p", "1", "--salary", "15000000"]);

    assert!(output.contains("Procedure 1"));
    assert!(output.contains("$10,237,500"));
    assert!(output.contains("$1,190,532"));
}

#[test]
fn test_calculate_json_report() {
    let output = run(&["retencion", "--json", "calculate", "-p", "2", "--salary", "15000000", "--rate", "5"]);

    let value: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
    assert_eq!(value["procedure"], "Two");
    assert_eq!(value["rate_source"], "Manual");
}

#[test]
fn test_compare_recommends_fixed_rate() {
    let output = run(&["retencion", "compare", "--salary", "15000000", "--rate", "5"]);

    assert!(output.contains("Recommended: Procedure 2"));
}

#[test]
fn test_simulate_with_bonus_month() {
    let output = run(&[
        "retencion",
        "simulate",
        "--salary",
        "15000000",
        "--months",
        "15000000,15000000,15000000,15000000,15000000,25000000,15000000,15000000,15000000,15000000,15000000,15000000",
    ]);

    assert!(output.contains("June"));
    assert!(output.contains("$25,000,000"));
    assert!(output.contains("Cheapest over the year: Procedure 2 (saves $"));
    assert!(output.contains("More stable: Procedure 1"));
}

#[test]
fn test_simulate_survives_extreme_month() {
    let output = run(&[
        "retencion",
        "simulate",
        "--salary",
        "0",
        "--months",
        "10000000000000000,0,0,0,0,0,0,0,0,0,0,0",
    ]);

    assert!(output.contains("January"));
    assert!(output.contains("More stable:"));
}

#[test]
fn test_simulate_rejects_short_month_list() {
    let cli = Cli::try_parse_from(["retencion", "simulate", "--salary", "1", "--months", "1,2"])
        .expect("arguments should parse");
    let mut out = Vec::new();

    let err = app::run(&cli, &mut out).expect_err("two months should fail");

    assert!(err.to_string().contains("12 values"));
}

#[test]
fn test_batch_from_fixture() {
    let file = fixture_path("scenarios.csv");
    let output = run(&["retencion", "batch", "--file", file.to_str().expect("UTF-8 path")]);

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("reference"));
    assert!(lines[3].starts_with("bonus"));
    assert!(lines[3].ends_with("Procedure 2"));
}

#[test]
fn test_brackets_override() {
    let file = fixture_path("brackets_flat.csv");
    let output = run(&[
        "retencion",
        "calculate",
        "-p",
        "1",
        "--salary",
        "15000000",
        "--brackets",
        file.to_str().expect("UTF-8 path"),
    ]);

    // A single 10% bracket on the 10,237,500 base.
    assert!(output.contains("$1,023,750"));
}

#[test]
fn test_constants_dump_round_trips() {
    let output = run(&["retencion", "constants"]);

    let constants = retencion_data::ConstantsLoader::parse(&output).expect("dump should reload");
    assert_eq!(constants, retencion_core::TaxConstants::colombia_2026());
}
