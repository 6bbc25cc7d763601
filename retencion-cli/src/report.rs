//! Plain-text rendering of engine results.
//!
//! Pesos are rounded to whole units with thousands separators; UVT figures
//! and percentages to two decimals. JSON output bypasses this module and
//! serializes the results at full precision.

use std::fmt::{self, Write};

use retencion_core::calculations::common::{round_half_up, round_pesos};
use retencion_core::calculations::{
    AnnualSimulation, ProcedureComparison, Recommendation, StabilityWinner,
};
use retencion_core::{TaxConstants, TaxResult};
use rust_decimal::Decimal;
use serde::Serialize;

/// `$1,190,532`; negative amounts get a leading `-`.
pub fn format_pesos(amount: Decimal) -> String {
    let rounded = round_pesos(amount);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}${grouped}")
}

pub fn format_uvt(uvt: Decimal) -> String {
    format!("{:.2} UVT", round_half_up(uvt))
}

/// Formats a value already expressed in percent.
pub fn format_percent(percent: Decimal) -> String {
    format!("{:.2}%", round_half_up(percent))
}

fn line<W: Write>(
    out: &mut W,
    label: &str,
    value: &str,
) -> fmt::Result {
    writeln!(out, "  {label:<28}{value:>18}")
}

fn recommendation_label(recommendation: Recommendation) -> &'static str {
    match recommendation {
        Recommendation::Procedure1 => "Procedure 1",
        Recommendation::Procedure2 => "Procedure 2",
        Recommendation::Equal => "either (equal)",
    }
}

fn winner_label(winner: StabilityWinner) -> &'static str {
    match winner {
        StabilityWinner::Procedure1 => "Procedure 1",
        StabilityWinner::Procedure2 => "Procedure 2",
        StabilityWinner::Tie => "tie",
    }
}

/// Full breakdown of one calculation.
pub fn render_result<W: Write>(
    out: &mut W,
    result: &TaxResult,
    constants: &TaxConstants,
) -> fmt::Result {
    let d = &result.details;
    writeln!(
        out,
        "{} (fiscal year {}, UVT {})",
        result.procedure,
        constants.fiscal_year,
        format_pesos(constants.uvt_value)
    )?;

    line(out, "Gross income", &format_pesos(d.gross_income))?;
    line(out, "Contribution base (IBC)", &format_pesos(d.contribution_base))?;
    line(out, "Health", &format_pesos(d.health))?;
    line(out, "Pension", &format_pesos(d.pension))?;
    line(
        out,
        &format!("Solidarity fund ({})", format_percent(d.solidarity_rate * Decimal::ONE_HUNDRED)),
        &format_pesos(d.solidarity),
    )?;
    line(out, "Net of contributions", &format_pesos(d.net_of_contributions))?;
    line(out, "Housing interest", &format_pesos(d.housing_interest))?;
    line(out, "Prepaid medicine", &format_pesos(d.prepaid_medicine))?;
    line(out, "Dependents", &format_pesos(d.dependents))?;
    line(out, "Voluntary pension + AFC", &format_pesos(d.voluntary_contributions))?;
    line(out, "Exempt income (25%)", &format_pesos(d.exempt_income))?;
    line(out, "Global limit", &format_pesos(d.global_limit))?;
    line(out, "Allowed relief", &format_pesos(d.allowed_relief))?;
    line(out, "Taxable base", &format_pesos(result.taxable_base))?;
    line(out, "Taxable base (UVT)", &format_uvt(result.taxable_base_uvt))?;
    if let (Some(rate), Some(source)) = (result.effective_rate, result.rate_source) {
        line(out, &format!("Rate ({source})"), &format_percent(rate))?;
    }
    line(out, "Withholding (UVT)", &format_uvt(result.withholding_uvt))?;
    line(out, "Withholding", &format_pesos(result.withholding))?;
    line(out, "Net income", &format_pesos(result.net_income))
}

pub fn render_comparison<W: Write>(
    out: &mut W,
    comparison: &ProcedureComparison,
) -> fmt::Result {
    writeln!(out, "{:<30}{:>18}{:>18}", "", "Procedure 1", "Procedure 2")?;
    let rows = [
        ("Taxable base", comparison.procedure1.taxable_base, comparison.procedure2.taxable_base),
        ("Withholding", comparison.procedure1.withholding, comparison.procedure2.withholding),
        ("Net income", comparison.procedure1.net_income, comparison.procedure2.net_income),
    ];
    for (label, p1, p2) in rows {
        writeln!(out, "  {label:<28}{:>18}{:>18}", format_pesos(p1), format_pesos(p2))?;
    }
    if let Some(rate) = comparison.procedure2.effective_rate {
        writeln!(out, "  {:<28}{:>18}{:>18}", "Procedure 2 rate", "", format_percent(rate))?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Recommended: {} (withholds {}, difference {})",
        recommendation_label(comparison.recommendation),
        format_pesos(comparison.preferred().withholding),
        format_pesos(comparison.difference)
    )
}

pub fn render_simulation<W: Write>(
    out: &mut W,
    simulation: &AnnualSimulation,
) -> fmt::Result {
    writeln!(
        out,
        "Annual simulation, Procedure 2 fixed rate {}",
        format_percent(simulation.fixed_rate)
    )?;
    writeln!(
        out,
        "{:<10}{:>16}{:>16}{:>16}{:>16}",
        "Month", "Income", "P1 withheld", "P2 withheld", "P1 - P2"
    )?;
    for month in &simulation.months {
        writeln!(
            out,
            "{:<10}{:>16}{:>16}{:>16}{:>16}",
            month.month.name(),
            format_pesos(month.income),
            format_pesos(month.procedure1_withholding),
            format_pesos(month.procedure2_withholding),
            format_pesos(month.difference)
        )?;
    }
    let totals = &simulation.totals;
    writeln!(
        out,
        "{:<10}{:>16}{:>16}{:>16}{:>16}",
        "Total",
        "",
        format_pesos(totals.procedure1),
        format_pesos(totals.procedure2),
        format_pesos(totals.difference)
    )?;

    writeln!(out)?;
    match simulation.cheapest {
        Recommendation::Equal => writeln!(out, "Cheapest over the year: tie")?,
        cheapest => writeln!(
            out,
            "Cheapest over the year: {} (saves {})",
            recommendation_label(cheapest),
            format_pesos(simulation.annual_saving)
        )?,
    }

    let stability = &simulation.stability;
    writeln!(
        out,
        "Net income std dev: P1 {}, P2 {}",
        format_pesos(stability.std_dev_procedure1),
        format_pesos(stability.std_dev_procedure2)
    )?;
    match stability.winner {
        StabilityWinner::Tie => writeln!(out, "More stable: {}", winner_label(stability.winner)),
        winner => writeln!(
            out,
            "More stable: {} ({} lower)",
            winner_label(winner),
            format_percent(stability.percent_difference)
        ),
    }
}

/// One scenario of a batch run.
#[derive(Debug, Serialize)]
pub struct BatchRow<'a> {
    pub name: &'a str,
    pub comparison: ProcedureComparison,
}

pub fn render_batch<W: Write>(
    out: &mut W,
    rows: &[BatchRow<'_>],
) -> fmt::Result {
    writeln!(
        out,
        "{:<20}{:>16}{:>16}{:>16}  {}",
        "Scenario", "P1 withheld", "P2 withheld", "Difference", "Recommended"
    )?;
    for row in rows {
        let c = &row.comparison;
        writeln!(
            out,
            "{:<20}{:>16}{:>16}{:>16}  {}",
            row.name,
            format_pesos(c.procedure1.withholding),
            format_pesos(c.procedure2.withholding),
            format_pesos(c.difference),
            recommendation_label(c.recommendation)
        )?;
    }
    Ok(())
}
