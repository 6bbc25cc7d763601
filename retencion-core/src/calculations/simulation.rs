//! Twelve-month projection of both procedures.
//!
//! Each month is an independent engine call: Procedure 1 re-derives its
//! withholding from that month's income, while Procedure 2 applies one fixed
//! rate to every month. The stability analysis compares how much the monthly
//! take-home pay swings under each procedure, and the yearly totals decide
//! which procedure withholds less overall.
//!
//! Sums saturate at the `Decimal` range instead of overflowing, so extreme
//! incomes still produce a (clamped) projection.

use chrono::Month;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::{Recommendation, WithholdingEngine};
use crate::models::{Procedure, TaxInputs};

/// Standard deviations closer than this (COP) are reported as a tie.
pub const STABILITY_TIE_THRESHOLD: Decimal = Decimal::ONE_THOUSAND;

/// Yearly withholding differences below this amount (COP) are a technical tie.
pub const ANNUAL_TIE_THRESHOLD: Decimal = Decimal::ONE_THOUSAND;

/// One month of the projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyProjection {
    pub month: Month,
    pub income: Decimal,
    pub procedure1_withholding: Decimal,
    pub procedure2_withholding: Decimal,
    pub procedure1_net: Decimal,
    pub procedure2_net: Decimal,
    /// Procedure 1 withholding minus Procedure 2 withholding.
    pub difference: Decimal,
}

/// Yearly sums of the monthly withholdings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTotals {
    pub procedure1: Decimal,
    pub procedure2: Decimal,
    pub difference: Decimal,
}

/// Which procedure gives the steadier monthly take-home pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StabilityWinner {
    Procedure1,
    Procedure2,
    Tie,
}

/// Volatility of monthly net income under each procedure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilityAnalysis {
    pub std_dev_procedure1: Decimal,
    pub std_dev_procedure2: Decimal,
    pub winner: StabilityWinner,
    /// How much lower the winner's deviation is, as a percentage of the larger one.
    pub percent_difference: Decimal,
}

/// Result of [`WithholdingEngine::simulate_year`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualSimulation {
    /// Procedure 2 rate used for every month (0 means derived per month).
    pub fixed_rate: Decimal,
    pub months: Vec<MonthlyProjection>,
    pub totals: SimulationTotals,
    /// Procedure withholding less over the whole year.
    pub cheapest: Recommendation,
    /// Absolute yearly withholding difference in COP.
    pub annual_saving: Decimal,
    pub stability: StabilityAnalysis,
}

/// Twelve copies of `income`, for a year without variable pay.
pub fn flat_year(income: Decimal) -> [Decimal; 12] {
    [income; 12]
}

impl WithholdingEngine<'_> {
    /// Projects a calendar year, January first.
    ///
    /// Every month uses `base_inputs` with the month's income as the whole
    /// salary. Procedure 2 uses `fixed_rate` as its manual rate; a zero rate
    /// lets the engine derive one as it would for a single month.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use retencion_core::calculations::{
    ///     Recommendation, StabilityWinner, WithholdingEngine, flat_year,
    /// };
    /// use retencion_core::{TaxConstants, TaxInputs};
    ///
    /// let constants = TaxConstants::colombia_2026();
    /// let engine = WithholdingEngine::new(&constants);
    ///
    /// let mut incomes = flat_year(dec!(15000000));
    /// incomes[5] = dec!(25000000);
    ///
    /// let simulation = engine.simulate_year(&TaxInputs::default(), &incomes, dec!(11.63));
    ///
    /// assert_eq!(simulation.months.len(), 12);
    /// assert!(simulation.totals.difference > dec!(0));
    /// assert_eq!(simulation.cheapest, Recommendation::Procedure2);
    /// assert_eq!(simulation.stability.winner, StabilityWinner::Procedure1);
    /// ```
    pub fn simulate_year(
        &self,
        base_inputs: &TaxInputs,
        monthly_incomes: &[Decimal; 12],
        fixed_rate: Decimal,
    ) -> AnnualSimulation {
        let months: Vec<MonthlyProjection> = monthly_incomes
            .iter()
            .enumerate()
            .map(|(index, income)| self.project_month(base_inputs, index, *income, fixed_rate))
            .collect();

        let totals = months
            .iter()
            .fold(SimulationTotals::default(), |acc, month| SimulationTotals {
                procedure1: acc.procedure1.saturating_add(month.procedure1_withholding),
                procedure2: acc.procedure2.saturating_add(month.procedure2_withholding),
                difference: acc.difference.saturating_add(month.difference),
            });
        let cheapest = cheapest_procedure(totals.difference);

        let procedure1_net: Vec<Decimal> = months.iter().map(|m| m.procedure1_net).collect();
        let procedure2_net: Vec<Decimal> = months.iter().map(|m| m.procedure2_net).collect();
        let stability = stability_analysis(
            population_std_dev(&procedure1_net),
            population_std_dev(&procedure2_net),
        );

        debug!(
            fixed_rate = %fixed_rate,
            total_procedure1 = %totals.procedure1,
            total_procedure2 = %totals.procedure2,
            cheapest = ?cheapest,
            winner = ?stability.winner,
            "annual simulation complete"
        );

        AnnualSimulation {
            fixed_rate,
            months,
            annual_saving: totals.difference.abs(),
            totals,
            cheapest,
            stability,
        }
    }

    fn project_month(
        &self,
        base_inputs: &TaxInputs,
        index: usize,
        income: Decimal,
        fixed_rate: Decimal,
    ) -> MonthlyProjection {
        let month_inputs = base_inputs.with_monthly_income(income);
        let procedure1 = self.calculate_tax(&month_inputs, Procedure::One);
        let procedure2 =
            self.calculate_tax(&month_inputs.with_procedure2_rate(fixed_rate), Procedure::Two);

        MonthlyProjection {
            month: month_from_index(index),
            income,
            procedure1_withholding: procedure1.withholding,
            procedure2_withholding: procedure2.withholding,
            procedure1_net: procedure1.net_income,
            procedure2_net: procedure2.net_income,
            difference: procedure1.withholding.saturating_sub(procedure2.withholding),
        }
    }
}

fn month_from_index(index: usize) -> Month {
    // Index is always 0..12; `Month::try_from` counts from 1.
    u8::try_from(index + 1)
        .ok()
        .and_then(|number| Month::try_from(number).ok())
        .unwrap_or(Month::December)
}

/// Maps the yearly `P1 - P2` withholding onto the cheaper procedure.
fn cheapest_procedure(total_difference: Decimal) -> Recommendation {
    if total_difference.abs() < ANNUAL_TIE_THRESHOLD {
        Recommendation::Equal
    } else if total_difference > Decimal::ZERO {
        Recommendation::Procedure2
    } else {
        Recommendation::Procedure1
    }
}

/// Arithmetic mean. Falls back to summing `value / count` when the plain sum
/// would overflow.
fn arithmetic_mean(values: &[Decimal]) -> Decimal {
    let count = Decimal::from(values.len());
    match values
        .iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(*value))
    {
        Some(sum) => sum / count,
        None => values
            .iter()
            .map(|value| *value / count)
            .fold(Decimal::ZERO, Decimal::saturating_add),
    }
}

/// Population standard deviation; zero for an empty slice.
///
/// Squared deviations saturate at `Decimal::MAX`.
fn population_std_dev(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let count = Decimal::from(values.len());
    let mean = arithmetic_mean(values);
    let variance = values
        .iter()
        .map(|value| {
            let deviation = value.saturating_sub(mean);
            deviation.checked_mul(deviation).unwrap_or(Decimal::MAX)
        })
        .fold(Decimal::ZERO, Decimal::saturating_add)
        / count;
    variance.sqrt().unwrap_or(Decimal::ZERO)
}

fn stability_analysis(
    std_dev_procedure1: Decimal,
    std_dev_procedure2: Decimal,
) -> StabilityAnalysis {
    let gap = (std_dev_procedure1 - std_dev_procedure2).abs();
    let (winner, percent_difference) = if gap < STABILITY_TIE_THRESHOLD {
        (StabilityWinner::Tie, Decimal::ZERO)
    } else {
        let winner = if std_dev_procedure1 < std_dev_procedure2 {
            StabilityWinner::Procedure1
        } else {
            StabilityWinner::Procedure2
        };
        let larger = std_dev_procedure1.max(std_dev_procedure2);
        (winner, gap / larger * Decimal::ONE_HUNDRED)
    };

    StabilityAnalysis {
        std_dev_procedure1,
        std_dev_procedure2,
        winner,
        percent_difference,
    }
}
