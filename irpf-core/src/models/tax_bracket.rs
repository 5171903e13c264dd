use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a progressive withholding table.
///
/// `range_end` is `None` for the unbounded top bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub range_start: Decimal,
    pub range_end: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn bounded(
        range_start: Decimal,
        range_end: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            range_start,
            range_end: Some(range_end),
            rate,
        }
    }

    pub fn unbounded(
        range_start: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            range_start,
            range_end: None,
            rate,
        }
    }

    /// Width of the income band, or `None` for the unbounded top bracket.
    pub fn width(&self) -> Option<Decimal> {
        self.range_end.map(|end| end - self.range_start)
    }

    pub fn is_unbounded(&self) -> bool {
        self.range_end.is_none()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn width_of_bounded_bracket() {
        let bracket = TaxBracket::bounded(dec!(12450), dec!(20200), dec!(0.12));

        assert_eq!(bracket.width(), Some(dec!(7750)));
        assert!(!bracket.is_unbounded());
    }

    #[test]
    fn width_of_unbounded_bracket_is_none() {
        let bracket = TaxBracket::unbounded(dec!(300000), dec!(0.245));

        assert_eq!(bracket.width(), None);
        assert!(bracket.is_unbounded());
    }
}
