use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::WithholdingError;
use crate::calculations::common::round_half_up;
use crate::calculations::worksheets::withholding::check_amount;

/// Regional credit for rented housing: `rate` of the yearly rent, up to `cap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentDeductionRule {
    pub rate: Decimal,
    pub cap: Decimal,
}

impl RentDeductionRule {
    pub fn validate(&self) -> Result<(), WithholdingError> {
        if self.rate < Decimal::ZERO || self.rate > Decimal::ONE {
            return Err(WithholdingError::InvalidRentDeductionRate(self.rate));
        }
        check_amount("rent_deduction_cap", self.cap)
    }

    /// Yearly credit for a monthly rent paid by the taxpayer.
    ///
    /// # Example
    ///
    /// ```
    /// use irpf_core::RentDeductionRule;
    /// use rust_decimal_macros::dec;
    ///
    /// let madrid = RentDeductionRule { rate: dec!(0.30), cap: dec!(1000) };
    ///
    /// assert_eq!(madrid.deduction(dec!(200)).unwrap(), dec!(720.00));
    /// assert_eq!(madrid.deduction(dec!(500)).unwrap(), dec!(1000));
    /// ```
    pub fn deduction(
        &self,
        monthly_rent: Decimal,
    ) -> Result<Decimal, WithholdingError> {
        check_amount("monthly_rent", monthly_rent)?;
        let yearly_credit = round_half_up(self.rate * monthly_rent * Decimal::from(12));
        Ok(yearly_credit.min(self.cap))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn catalonia() -> RentDeductionRule {
        RentDeductionRule {
            rate: dec!(0.10),
            cap: dec!(300),
        }
    }

    #[test]
    fn deduction_below_cap() {
        // 0.10 * 200 * 12 = 240
        assert_eq!(catalonia().deduction(dec!(200)), Ok(dec!(240.00)));
    }

    #[test]
    fn deduction_capped() {
        assert_eq!(catalonia().deduction(dec!(500)), Ok(dec!(300)));
    }

    #[test]
    fn deduction_zero_rent() {
        assert_eq!(catalonia().deduction(dec!(0)), Ok(dec!(0)));
    }

    #[test]
    fn deduction_rejects_negative_rent() {
        assert_eq!(
            catalonia().deduction(dec!(-10)),
            Err(WithholdingError::NegativeAmount {
                field: "monthly_rent",
                value: dec!(-10),
            })
        );
    }

    #[test]
    fn deduction_rejects_rent_beyond_range() {
        assert_eq!(
            catalonia().deduction(Decimal::MAX),
            Err(WithholdingError::AmountOutOfRange {
                field: "monthly_rent",
                value: Decimal::MAX,
            })
        );
    }

    #[test]
    fn validate_rejects_rate_above_one() {
        let rule = RentDeductionRule {
            rate: dec!(30),
            cap: dec!(1000),
        };

        assert_eq!(
            rule.validate(),
            Err(WithholdingError::InvalidRentDeductionRate(dec!(30)))
        );
    }

    #[test]
    fn validate_rejects_negative_cap() {
        let rule = RentDeductionRule {
            rate: dec!(0.3),
            cap: dec!(-1),
        };

        assert!(rule.validate().is_err());
    }
}
