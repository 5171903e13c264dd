pub mod table_source;

pub use table_source::{SourceError, TableSource};
