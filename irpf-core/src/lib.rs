pub mod calculations;
pub mod models;
pub mod source;

pub use calculations::{BracketApportioner, TaxationResult, apportion};
pub use models::*;
pub use source::{SourceError, TableSource};
