mod bracket_table;
mod contract_type;
mod jurisdiction;
mod rent_deduction;
mod tax_bracket;
mod withholding_params;

pub use bracket_table::{BracketTable, ConfigurationError};
pub use contract_type::ContractType;
pub use jurisdiction::{Jurisdiction, RegionId};
pub use rent_deduction::RentDeductionRule;
pub use tax_bracket::TaxBracket;
pub use withholding_params::WithholdingParams;
