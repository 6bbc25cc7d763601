use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Monthly income and deduction figures supplied by the employee.
///
/// Amounts are in COP. Optional fields left as `None` (or zero) mean
/// "not provided". The engine clamps every field to its valid range before
/// use, so a `TaxInputs` value never has to be validated by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxInputs {
    /// Monthly salary.
    pub monthly_salary: Decimal,

    /// Bonuses, commissions and other non-salary income for the month.
    pub other_income: Decimal,

    /// Voluntary pension fund contributions.
    pub voluntary_pension: Decimal,

    /// AFC (housing savings account) contributions.
    pub afc_contribution: Decimal,

    /// Mortgage interest paid on the employee's home.
    pub housing_interest: Decimal,

    /// Prepaid medicine or health insurance premiums.
    pub prepaid_medicine: Decimal,

    /// Whether the employee claims the dependents deduction.
    pub has_dependents: bool,

    /// Whether the employee earns an integral salary (70% contribution base).
    pub is_salario_integral: bool,

    /// Manual Procedure 2 rate as a percentage (0-100).
    /// `None` or zero means the rate is derived automatically.
    pub procedure2_rate: Option<Decimal>,

    /// Average monthly income of the reference period, used to derive the
    /// Procedure 2 rate.
    pub historical_monthly_income: Option<Decimal>,
}

impl TaxInputs {
    /// Returns a copy with every amount clamped to its valid range.
    ///
    /// Negative amounts become zero and the manual rate is clamped to
    /// `[0, 100]`. Each adjustment is logged at `warn` level.
    pub fn sanitized(&self) -> Self {
        Self {
            monthly_salary: clamp_amount("monthly_salary", self.monthly_salary),
            other_income: clamp_amount("other_income", self.other_income),
            voluntary_pension: clamp_amount("voluntary_pension", self.voluntary_pension),
            afc_contribution: clamp_amount("afc_contribution", self.afc_contribution),
            housing_interest: clamp_amount("housing_interest", self.housing_interest),
            prepaid_medicine: clamp_amount("prepaid_medicine", self.prepaid_medicine),
            has_dependents: self.has_dependents,
            is_salario_integral: self.is_salario_integral,
            procedure2_rate: self.procedure2_rate.map(clamp_rate),
            historical_monthly_income: self
                .historical_monthly_income
                .map(|income| clamp_amount("historical_monthly_income", income)),
        }
    }

    /// Gross monthly income: salary plus other income, each floored at zero.
    pub fn gross_income(&self) -> Decimal {
        self.monthly_salary
            .max(Decimal::ZERO)
            .saturating_add(self.other_income.max(Decimal::ZERO))
    }

    /// The manual Procedure 2 rate, if one was set to a non-zero value.
    pub fn manual_rate(&self) -> Option<Decimal> {
        self.procedure2_rate
            .map(clamp_rate)
            .filter(|rate| !rate.is_zero())
    }

    /// The historical reference income, if one was set to a positive value.
    pub fn historical_income(&self) -> Option<Decimal> {
        self.historical_monthly_income
            .filter(|income| *income > Decimal::ZERO)
    }

    /// Returns a copy whose whole income for the month is `income`.
    ///
    /// Used when projecting a year month by month: the month's figure
    /// replaces the salary and other income is dropped.
    pub fn with_monthly_income(
        &self,
        income: Decimal,
    ) -> Self {
        Self {
            monthly_salary: income,
            other_income: Decimal::ZERO,
            ..self.clone()
        }
    }

    /// Returns a copy with the manual Procedure 2 rate set to `rate`.
    pub fn with_procedure2_rate(
        &self,
        rate: Decimal,
    ) -> Self {
        Self {
            procedure2_rate: Some(rate),
            ..self.clone()
        }
    }
}

fn clamp_amount(
    field: &'static str,
    value: Decimal,
) -> Decimal {
    if value < Decimal::ZERO {
        warn!(field, value = %value, "negative amount clamped to zero");
        return Decimal::ZERO;
    }
    value
}

fn clamp_rate(rate: Decimal) -> Decimal {
    let clamped = rate.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    if clamped != rate {
        warn!(rate = %rate, clamped = %clamped, "procedure 2 rate clamped to [0, 100]");
    }
    clamped
}
