pub mod config;
pub mod decimal;

pub use config::{ConfigLoadError, IrpfConfig, RegionTables, YearTables};
pub use decimal::{ParseDecimalError, RawDecimal, parse_locale_decimal};
