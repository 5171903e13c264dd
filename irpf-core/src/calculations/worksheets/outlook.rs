//! Figures derived from a finished withholding result: how the salary
//! compares to the average, what it allows to save and to spend on rent, and
//! how the gross splits between net, contributions and withholding.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::withholding::WithholdingResult;
use crate::calculations::common::{round_half_up, round_whole};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OutlookError {
    #[error("average salary must be positive, got {0}")]
    InvalidAverageSalary(Decimal),

    #[error("{name} must be between 0 and 1, got {value}")]
    ShareOutOfRange { name: &'static str, value: Decimal },
}

/// Shares of net salary used for the savings and rent figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlookConfig {
    /// Share of monthly net saved by the average household.
    pub average_savings_rate: Decimal,
    /// Share of monthly net advisers recommend saving.
    pub recommended_savings_rate: Decimal,
    /// Share of net salary that keeps rent comfortable.
    pub comfortable_rent_share: Decimal,
    /// Share of net salary rent should not exceed.
    pub max_rent_share: Decimal,
}

impl Default for OutlookConfig {
    fn default() -> Self {
        Self {
            average_savings_rate: Decimal::new(57, 3),
            recommended_savings_rate: Decimal::new(15, 2),
            comfortable_rent_share: Decimal::new(25, 2),
            max_rent_share: Decimal::new(35, 2),
        }
    }
}

impl OutlookConfig {
    pub fn validate(&self) -> Result<(), OutlookError> {
        let shares = [
            ("average_savings_rate", self.average_savings_rate),
            ("recommended_savings_rate", self.recommended_savings_rate),
            ("comfortable_rent_share", self.comfortable_rent_share),
            ("max_rent_share", self.max_rent_share),
        ];
        for (name, value) in shares {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(OutlookError::ShareOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Standing {
    Above,
    Below,
    Equal,
}

/// Salary compared with a reference average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComparison {
    pub average_salary: Decimal,
    /// Signed percentage difference, e.g. `-16.67` for a salary 16.67% below.
    pub difference_pct: Decimal,
    pub standing: Standing,
}

impl SalaryComparison {
    /// Compares a total gross salary with `average_salary`.
    ///
    /// # Example
    ///
    /// ```
    /// use irpf_core::calculations::{SalaryComparison, Standing};
    /// use rust_decimal_macros::dec;
    ///
    /// let comparison = SalaryComparison::against(dec!(25000), dec!(20000)).unwrap();
    ///
    /// assert_eq!(comparison.difference_pct, dec!(25.00));
    /// assert_eq!(comparison.standing, Standing::Above);
    /// ```
    pub fn against(
        total_gross: Decimal,
        average_salary: Decimal,
    ) -> Result<Self, OutlookError> {
        if average_salary <= Decimal::ZERO {
            return Err(OutlookError::InvalidAverageSalary(average_salary));
        }

        let standing = match total_gross.cmp(&average_salary) {
            std::cmp::Ordering::Greater => Standing::Above,
            std::cmp::Ordering::Less => Standing::Below,
            std::cmp::Ordering::Equal => Standing::Equal,
        };
        let difference_pct =
            round_half_up((total_gross / average_salary - Decimal::ONE) * Decimal::ONE_HUNDRED);

        Ok(Self {
            average_salary,
            difference_pct,
            standing,
        })
    }
}

/// Monthly and yearly savings targets, in whole euros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsPlan {
    pub average_monthly: Decimal,
    pub average_yearly: Decimal,
    pub recommended_monthly: Decimal,
    pub recommended_yearly: Decimal,
}

impl SavingsPlan {
    pub fn from_monthly_net(
        monthly_net: Decimal,
        config: &OutlookConfig,
    ) -> Self {
        let twelve = Decimal::from(12);
        let average_monthly = round_whole(config.average_savings_rate * monthly_net);
        let recommended_monthly = round_whole(config.recommended_savings_rate * monthly_net);

        Self {
            average_monthly,
            average_yearly: average_monthly * twelve,
            recommended_monthly,
            recommended_yearly: recommended_monthly * twelve,
        }
    }
}

/// Monthly rent the net salary supports, in whole euros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentAffordability {
    pub comfortable_monthly: Decimal,
    pub max_monthly: Decimal,
}

impl RentAffordability {
    pub fn from_yearly_net(
        yearly_net: Decimal,
        config: &OutlookConfig,
    ) -> Self {
        let twelve = Decimal::from(12);
        Self {
            comfortable_monthly: round_whole(config.comfortable_rent_share * yearly_net / twelve),
            max_monthly: round_whole(config.max_rent_share * yearly_net / twelve),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Yearly,
    Monthly,
}

impl Period {
    pub fn divisor(&self) -> Decimal {
        match self {
            Self::Yearly => Decimal::ONE,
            Self::Monthly => Decimal::from(12),
        }
    }
}

/// How the total gross splits, per period. What a chart would plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    pub period: Period,
    pub net: Decimal,
    pub non_taxable: Decimal,
    pub social_security: Decimal,
    pub withholding: Decimal,
    /// Set when exempt income is present: the withholding share of the total
    /// is then lower than the withholding rate on the taxable gross.
    pub withholding_share_understated: bool,
}

impl SalaryBreakdown {
    pub fn new(
        result: &WithholdingResult,
        period: Period,
    ) -> Self {
        let divisor = period.divisor();
        Self {
            period,
            net: round_half_up(result.yearly_net / divisor),
            non_taxable: round_half_up(result.non_taxable_gross / divisor),
            social_security: round_half_up(result.social_security / divisor),
            withholding: round_half_up(result.total_withholding / divisor),
            withholding_share_understated: result.non_taxable_gross > Decimal::ZERO,
        }
    }

    pub fn total(&self) -> Decimal {
        self.net + self.non_taxable + self.social_security + self.withholding
    }

    /// Percentage of the total taken by `part`; zero for an empty breakdown.
    pub fn share_pct(
        &self,
        part: Decimal,
    ) -> Decimal {
        let total = self.total();
        if total.is_zero() {
            return Decimal::ZERO;
        }
        round_half_up(part / total * Decimal::ONE_HUNDRED)
    }
}

/// Everything derived from one withholding result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryOutlook {
    pub state_comparison: Option<SalaryComparison>,
    pub regional_comparison: Option<SalaryComparison>,
    pub savings: SavingsPlan,
    pub rent: RentAffordability,
    pub yearly: SalaryBreakdown,
    pub monthly: SalaryBreakdown,
}

impl SalaryOutlook {
    /// Builds the outlook. Comparisons are skipped when no average is known.
    pub fn build(
        result: &WithholdingResult,
        config: &OutlookConfig,
        state_average: Option<Decimal>,
        regional_average: Option<Decimal>,
    ) -> Result<Self, OutlookError> {
        config.validate()?;

        let compare = |average: Option<Decimal>| {
            average
                .map(|average| SalaryComparison::against(result.total_gross, average))
                .transpose()
        };

        Ok(Self {
            state_comparison: compare(state_average)?,
            regional_comparison: compare(regional_average)?,
            savings: SavingsPlan::from_monthly_net(result.monthly_net, config),
            rent: RentAffordability::from_yearly_net(result.yearly_net, config),
            yearly: SalaryBreakdown::new(result, Period::Yearly),
            monthly: SalaryBreakdown::new(result, Period::Monthly),
        })
    }
}
