use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::OutlookConfig;
use crate::models::{BracketTable, Jurisdiction, RegionId, RentDeductionRule, WithholdingParams};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("no tables configured for tax year {0}")]
    TaxYearNotFound(i32),

    #[error("region '{region}' not configured for tax year {year}")]
    RegionNotFound { year: i32, region: RegionId },
}

/// Read access to validated tables and parameters, keyed by tax year.
///
/// Everything handed out has already passed validation, so callers can feed
/// it straight into the worksheets.
pub trait TableSource: Send + Sync {
    /// Configured tax years, ascending.
    fn list_tax_years(&self) -> Vec<i32>;

    fn list_regions(
        &self,
        year: i32,
    ) -> Result<Vec<RegionId>, SourceError>;

    fn state_table(
        &self,
        year: i32,
    ) -> Result<&BracketTable, SourceError>;

    fn regional_table(
        &self,
        year: i32,
        region: &RegionId,
    ) -> Result<&BracketTable, SourceError>;

    fn params(
        &self,
        year: i32,
    ) -> Result<&WithholdingParams, SourceError>;

    /// Rent credit rule for a region. `Ok(None)` when the region exists but
    /// grants no credit.
    fn rent_rule(
        &self,
        year: i32,
        region: &RegionId,
    ) -> Result<Option<&RentDeductionRule>, SourceError>;

    /// Reference average gross salary, if one is known.
    fn average_salary(
        &self,
        jurisdiction: &Jurisdiction,
    ) -> Option<Decimal>;

    /// Name to show for a region. Defaults to the title-cased slug.
    fn region_name(
        &self,
        _year: i32,
        region: &RegionId,
    ) -> String {
        region.display_name()
    }

    fn outlook_config(&self) -> OutlookConfig {
        OutlookConfig::default()
    }

    /// Most recent configured tax year.
    fn latest_tax_year(&self) -> Option<i32> {
        self.list_tax_years().into_iter().max()
    }
}
