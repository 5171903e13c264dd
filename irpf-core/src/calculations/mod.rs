//! Withholding calculations.
//!
//! [`apportion`] is the progressive-bracket core; the worksheets compose it
//! into the gross-to-net derivation and the figures derived from net salary.

pub mod apportion;
pub mod common;
pub mod worksheets;

pub use apportion::{BandShare, BracketApportioner, TaxationResult, apportion};
pub use worksheets::{
    JurisdictionQuota, MAX_AMOUNT, OutlookConfig, OutlookError, Period, RentAffordability,
    SalaryBreakdown, SalaryComparison, SalaryOutlook, SavingsPlan, Standing,
    WithholdingError, WithholdingInput, WithholdingResult, WithholdingWorksheet,
};
