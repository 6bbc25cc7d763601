use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the withholding table, expressed in UVT.
///
/// A bracket covers the half-open range `[min_uvt, max_uvt)`. The last
/// bracket of a table has no upper bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min_uvt: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_uvt: Option<Decimal>,
    /// Marginal rate as a fraction (e.g. 0.28 for 28%).
    pub rate: Decimal,
    /// Withholding already accrued by the lower brackets, in UVT.
    pub base_tax_uvt: Decimal,
}

impl TaxBracket {
    /// Returns true if `base_uvt` falls inside `[min_uvt, max_uvt)`.
    pub fn contains(
        &self,
        base_uvt: Decimal,
    ) -> bool {
        base_uvt >= self.min_uvt && self.max_uvt.is_none_or(|max| base_uvt < max)
    }

    /// Withholding in UVT for a base that falls inside this bracket.
    pub fn withholding_uvt(
        &self,
        base_uvt: Decimal,
    ) -> Decimal {
        (base_uvt - self.min_uvt) * self.rate + self.base_tax_uvt
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn bracket_28() -> TaxBracket {
        TaxBracket {
            min_uvt: dec!(150),
            max_uvt: Some(dec!(360)),
            rate: dec!(0.28),
            base_tax_uvt: dec!(10),
        }
    }

    #[test]
    fn contains_includes_lower_bound() {
        assert!(bracket_28().contains(dec!(150)));
    }

    #[test]
    fn contains_excludes_upper_bound() {
        assert!(!bracket_28().contains(dec!(360)));
    }

    #[test]
    fn contains_without_upper_bound_is_open_ended() {
        let top = TaxBracket {
            min_uvt: dec!(2300),
            max_uvt: None,
            rate: dec!(0.39),
            base_tax_uvt: dec!(770),
        };

        assert!(top.contains(dec!(1000000)));
        assert!(!top.contains(dec!(2299.99)));
    }

    #[test]
    fn withholding_uvt_applies_marginal_rate_and_base_tax() {
        // (200 - 150) * 0.28 + 10 = 24
        assert_eq!(bracket_28().withholding_uvt(dec!(200)), dec!(24));
    }
}
