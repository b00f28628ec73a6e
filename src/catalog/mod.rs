//! Catalog Module
//!
//! Row schemas, field values, and the registry that maps table IDs to open
//! heap files.

pub mod catalog;
pub mod column;
pub mod schema;
pub mod value;

// Re-export key types
pub use self::catalog::{Catalog, CatalogError};
pub use self::column::Column;
pub use self::schema::{DataType, RowSchema};
pub use self::value::DataValue;
