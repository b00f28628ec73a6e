// Column Module
//
// This module defines the Column type that describes one field of a row.

use super::schema::DataType;

/// Represents a column in a table's row schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name
    name: String,
    /// Column data type
    data_type: DataType,
}

impl Column {
    /// Create a new column
    pub fn new(name: String, data_type: DataType) -> Self {
        Column { name, data_type }
    }

    /// Get the column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the column data type
    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    /// Get the size of this column in bytes
    pub fn size_in_bytes(&self) -> usize {
        self.data_type.size_in_bytes()
    }
}
