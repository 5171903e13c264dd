//! Gross-to-net withholding for salaried employees.
//!
//! # Derivation
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Total gross: taxable + non-taxable salary |
//! | 2    | Social security: total gross × contract rate |
//! | 3    | Total deductions: social security + work expenses deduction |
//! | 4    | Computable income: taxable gross − total deductions (may be negative) |
//! | 5    | Quota per jurisdiction: tax on computable income − tax on personal minimum (min 0) |
//! | 6    | Total withholding: state quota + regional quota − rent deduction (min 0) |
//! | 7    | Withholding rate: total withholding ÷ taxable gross × 100 |
//! | 8    | Yearly net: taxable gross − social security − total withholding; monthly net over 12 payments |
//!
//! Each step is rounded half-up to cents. Steps 5 and 6 are floored at zero
//! instead of going negative: a personal minimum or rent credit larger than
//! the tax never turns into a refund.
//!
//! Input amounts and parameters above [`MAX_AMOUNT`] are rejected before any
//! arithmetic runs.
//!
//! # Example
//!
//! ```
//! use irpf_core::calculations::{WithholdingInput, WithholdingWorksheet};
//! use irpf_core::{BracketTable, ContractType, TaxBracket, WithholdingParams};
//! use rust_decimal_macros::dec;
//!
//! let state = BracketTable::new(vec![
//!     TaxBracket::bounded(dec!(0), dec!(12450), dec!(0.095)),
//!     TaxBracket::bounded(dec!(12450), dec!(20200), dec!(0.12)),
//!     TaxBracket::unbounded(dec!(20200), dec!(0.15)),
//! ])
//! .unwrap();
//! let regional = state.clone();
//! let params = WithholdingParams {
//!     tax_year: 2021,
//!     work_expenses_deduction: dec!(2000),
//!     personal_minimum: dec!(5550),
//!     indefinite_ss_rate: dec!(0.0635),
//!     temporary_ss_rate: dec!(0.064),
//! };
//!
//! let worksheet = WithholdingWorksheet::new(&state, &regional, &params);
//! let result = worksheet
//!     .calculate(&WithholdingInput::new(dec!(25000), ContractType::Indefinite))
//!     .unwrap();
//!
//! assert_eq!(result.social_security, dec!(1587.50));
//! assert_eq!(result.computable_income, dec!(21412.50));
//! assert_eq!(result.total_withholding, dec!(3534.76));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::apportion::BracketApportioner;
use crate::calculations::common::{max, round_half_up};
use crate::{BracketTable, ContractType, WithholdingParams};

/// Largest yearly amount accepted anywhere in the derivation: one trillion
/// euros. Every intermediate product stays far inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Errors that can occur during the withholding derivation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WithholdingError {
    #[error("{field} must not be negative, got {value}")]
    NegativeAmount { field: &'static str, value: Decimal },

    #[error("{field} is too large, got {value}")]
    AmountOutOfRange { field: &'static str, value: Decimal },

    #[error("social security rate for {contract} contracts must be between 0 and 1, got {rate}")]
    InvalidSocialSecurityRate { contract: &'static str, rate: Decimal },

    #[error("rent deduction rate must be between 0 and 1, got {0}")]
    InvalidRentDeductionRate(Decimal),
}

/// Salary figures supplied by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingInput {
    /// Yearly salary subject to withholding.
    pub taxable_gross: Decimal,

    /// Yearly exempt income (meal vouchers, transport, nursery).
    /// Counts towards social security but not towards the quota.
    pub non_taxable_gross: Decimal,

    pub contract: ContractType,

    /// Regional rent credit, already capped by its rule.
    pub rent_deduction: Decimal,
}

impl WithholdingInput {
    pub fn new(
        taxable_gross: Decimal,
        contract: ContractType,
    ) -> Self {
        Self {
            taxable_gross,
            non_taxable_gross: Decimal::ZERO,
            contract,
            rent_deduction: Decimal::ZERO,
        }
    }

    fn validate(&self) -> Result<(), WithholdingError> {
        let fields = [
            ("taxable_gross", self.taxable_gross),
            ("non_taxable_gross", self.non_taxable_gross),
            ("rent_deduction", self.rent_deduction),
        ];
        for (field, value) in fields {
            check_amount(field, value)?;
        }
        Ok(())
    }
}

/// Rejects a negative amount or one above [`MAX_AMOUNT`].
pub(crate) fn check_amount(
    field: &'static str,
    value: Decimal,
) -> Result<(), WithholdingError> {
    if value < Decimal::ZERO {
        return Err(WithholdingError::NegativeAmount { field, value });
    }
    if value > MAX_AMOUNT {
        return Err(WithholdingError::AmountOutOfRange { field, value });
    }
    Ok(())
}

/// Quota owed to one jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionQuota {
    /// Tax on the computable income, before the personal minimum.
    pub gross_quota: Decimal,

    /// Tax on the personal minimum.
    pub personal_minimum_quota: Decimal,

    /// `gross_quota - personal_minimum_quota`, rounded, floored at zero.
    pub quota: Decimal,

    pub marginal_rate: Decimal,
}

/// Result of the withholding derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingResult {
    pub taxable_gross: Decimal,
    pub non_taxable_gross: Decimal,
    pub total_gross: Decimal,
    pub social_security: Decimal,
    pub total_deductions: Decimal,

    /// Taxable gross minus deductions. Negative for very low salaries.
    pub computable_income: Decimal,

    pub state: JurisdictionQuota,
    pub regional: JurisdictionQuota,

    pub rent_deduction: Decimal,

    /// Yearly IRPF withholding after the rent credit.
    pub total_withholding: Decimal,

    /// Withholding as a percentage of the taxable gross (e.g. `9.88`).
    pub withholding_rate: Decimal,

    /// Combined state and regional marginal rate, as a fraction.
    pub marginal_rate: Decimal,

    pub yearly_net: Decimal,

    /// Net per month over twelve payments.
    pub monthly_net: Decimal,
}

/// Calculator for the gross-to-net derivation.
///
/// Holds the state table, the regional table and the year's parameters; it
/// keeps no other state, so one worksheet can serve any number of inputs.
#[derive(Debug, Clone)]
pub struct WithholdingWorksheet<'a> {
    state: BracketApportioner<'a>,
    regional: BracketApportioner<'a>,
    params: &'a WithholdingParams,
}

impl<'a> WithholdingWorksheet<'a> {
    pub fn new(
        state_table: &'a BracketTable,
        regional_table: &'a BracketTable,
        params: &'a WithholdingParams,
    ) -> Self {
        Self {
            state: BracketApportioner::new(state_table),
            regional: BracketApportioner::new(regional_table),
            params,
        }
    }

    /// Runs every step of the derivation.
    ///
    /// # Errors
    ///
    /// Returns [`WithholdingError`] if an input amount is negative or above
    /// [`MAX_AMOUNT`], or the parameters are out of range.
    pub fn calculate(
        &self,
        input: &WithholdingInput,
    ) -> Result<WithholdingResult, WithholdingError> {
        input.validate()?;
        self.params.validate()?;

        let total_gross = input.taxable_gross + input.non_taxable_gross;
        let social_security = self.social_security(total_gross, input.contract);
        let total_deductions = self.total_deductions(social_security);
        let computable_income = round_half_up(input.taxable_gross - total_deductions);

        let state = self.quota(&self.state, computable_income);
        let regional = self.quota(&self.regional, computable_income);

        let total_withholding =
            self.total_withholding(state.quota, regional.quota, input.rent_deduction);
        let withholding_rate = self.withholding_rate(total_withholding, input.taxable_gross);

        let yearly_net =
            round_half_up(input.taxable_gross - social_security - total_withholding);
        let monthly_net = round_half_up(yearly_net / Decimal::from(12));

        debug!(
            tax_year = self.params.tax_year,
            %computable_income,
            %total_withholding,
            %yearly_net,
            "withholding calculated"
        );

        Ok(WithholdingResult {
            taxable_gross: input.taxable_gross,
            non_taxable_gross: input.non_taxable_gross,
            total_gross,
            social_security,
            total_deductions,
            computable_income,
            state,
            regional,
            rent_deduction: input.rent_deduction,
            total_withholding,
            withholding_rate,
            marginal_rate: state.marginal_rate + regional.marginal_rate,
            yearly_net,
            monthly_net,
        })
    }

    fn social_security(
        &self,
        total_gross: Decimal,
        contract: ContractType,
    ) -> Decimal {
        round_half_up(self.params.social_security_rate(contract) * total_gross)
    }

    fn total_deductions(
        &self,
        social_security: Decimal,
    ) -> Decimal {
        round_half_up(social_security + self.params.work_expenses_deduction)
    }

    /// Tax on the computable income minus tax on the personal minimum, both
    /// apportioned over the same table.
    fn quota(
        &self,
        apportioner: &BracketApportioner<'_>,
        computable_income: Decimal,
    ) -> JurisdictionQuota {
        let income = apportioner.apportion(computable_income);
        let minimum = apportioner.apportion(self.params.personal_minimum);

        JurisdictionQuota {
            gross_quota: income.retained_amount,
            personal_minimum_quota: minimum.retained_amount,
            quota: max(
                round_half_up(income.retained_amount - minimum.retained_amount),
                Decimal::ZERO,
            ),
            marginal_rate: income.marginal_rate,
        }
    }

    fn total_withholding(
        &self,
        state_quota: Decimal,
        regional_quota: Decimal,
        rent_deduction: Decimal,
    ) -> Decimal {
        max(
            round_half_up(state_quota + regional_quota - rent_deduction),
            Decimal::ZERO,
        )
    }

    fn withholding_rate(
        &self,
        total_withholding: Decimal,
        taxable_gross: Decimal,
    ) -> Decimal {
        if taxable_gross <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        round_half_up(total_withholding / taxable_gross * Decimal::ONE_HUNDRED)
    }
}
