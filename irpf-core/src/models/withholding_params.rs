use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ContractType;
use crate::calculations::WithholdingError;
use crate::calculations::worksheets::withholding::check_amount;

/// Per-tax-year parameters of the gross-to-net derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingParams {
    pub tax_year: i32,
    /// Flat deduction for employment expenses (2000 in 2021-2022).
    pub work_expenses_deduction: Decimal,
    /// Personal and family minimum; taxed at the table rates and subtracted
    /// from the quota of each jurisdiction.
    pub personal_minimum: Decimal,
    /// Employee social security rate on an indefinite contract.
    pub indefinite_ss_rate: Decimal,
    /// Employee social security rate on a temporary contract.
    pub temporary_ss_rate: Decimal,
}

impl WithholdingParams {
    pub fn social_security_rate(
        &self,
        contract: ContractType,
    ) -> Decimal {
        match contract {
            ContractType::Indefinite => self.indefinite_ss_rate,
            ContractType::Temporary => self.temporary_ss_rate,
        }
    }

    /// Checks every rate lies in `[0, 1]` and each deduction lies in
    /// `[0, MAX_AMOUNT]`.
    ///
    /// # Example
    ///
    /// ```
    /// use irpf_core::WithholdingParams;
    /// use irpf_core::calculations::WithholdingError;
    /// use rust_decimal_macros::dec;
    ///
    /// let params = WithholdingParams {
    ///     tax_year: 2021,
    ///     work_expenses_deduction: dec!(2000),
    ///     personal_minimum: dec!(-5550),
    ///     indefinite_ss_rate: dec!(0.0635),
    ///     temporary_ss_rate: dec!(0.064),
    /// };
    ///
    /// assert_eq!(
    ///     params.validate(),
    ///     Err(WithholdingError::NegativeAmount {
    ///         field: "personal_minimum",
    ///         value: dec!(-5550),
    ///     })
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), WithholdingError> {
        check_amount("work_expenses_deduction", self.work_expenses_deduction)?;
        check_amount("personal_minimum", self.personal_minimum)?;
        for contract in [ContractType::Indefinite, ContractType::Temporary] {
            let rate = self.social_security_rate(contract);
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(WithholdingError::InvalidSocialSecurityRate {
                    contract: contract.as_str(),
                    rate,
                });
            }
        }
        Ok(())
    }
}
