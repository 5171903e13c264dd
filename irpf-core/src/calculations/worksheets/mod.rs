//! Worksheets built on top of the bracket apportioner.

pub mod outlook;
pub mod withholding;

pub use outlook::{
    OutlookConfig, OutlookError, Period, RentAffordability, SalaryBreakdown, SalaryComparison,
    SalaryOutlook, SavingsPlan, Standing,
};
pub use withholding::{
    JurisdictionQuota, MAX_AMOUNT, WithholdingError, WithholdingInput, WithholdingResult,
    WithholdingWorksheet,
};
