// Row Schema Module
//
// This module defines the fixed-width data types and the RowSchema that
// describes the shape of every tuple stored in a heap file.

use std::fmt;

use super::column::Column;
use crate::catalog::value::DataValue;

/// Size of the length prefix stored in front of every text field
pub const TEXT_LEN_PREFIX: usize = 4;

/// Data types that can be stored in a fixed-width slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Integer,
    Float,
    Boolean,
    /// UTF-8 text of at most `max_len` bytes
    Text { max_len: u32 },
}

impl DataType {
    /// Convert a string representation to a DataType.
    ///
    /// Accepts `int`, `float`, `bool` and `text(N)` (case-insensitive).
    pub fn from_str(s: &str) -> Result<Self, String> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "INT" | "INTEGER" => return Ok(DataType::Integer),
            "FLOAT" | "REAL" | "DOUBLE" => return Ok(DataType::Float),
            "BOOL" | "BOOLEAN" => return Ok(DataType::Boolean),
            _ => {}
        }

        let inner = upper
            .strip_prefix("TEXT(")
            .or_else(|| upper.strip_prefix("VARCHAR("))
            .and_then(|rest| rest.strip_suffix(')'));
        match inner.map(|n| n.trim().parse::<u32>()) {
            Some(Ok(max_len)) => Ok(DataType::Text { max_len }),
            _ => Err(format!("Unknown data type: {}", s)),
        }
    }

    /// Get the on-disk size in bytes of this data type
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DataType::Integer => 8,
            DataType::Float => 8,
            DataType::Boolean => 1,
            DataType::Text { max_len } => TEXT_LEN_PREFIX + *max_len as usize,
        }
    }

    /// Check whether a value can be stored in a field of this type
    pub fn accepts(&self, value: &DataValue) -> bool {
        match (self, value) {
            (DataType::Integer, DataValue::Integer(_)) => true,
            (DataType::Float, DataValue::Float(_)) => true,
            (DataType::Boolean, DataValue::Boolean(_)) => true,
            (DataType::Text { max_len }, DataValue::Text(s)) => s.len() <= *max_len as usize,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Text { max_len } => write!(f, "TEXT({})", max_len),
        }
    }
}

/// The shape of a table's rows: an ordered list of fixed-width columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSchema {
    columns: Vec<Column>,
    /// Byte offset of each column inside a slot
    offsets: Vec<usize>,
    slot_width: usize,
}

impl RowSchema {
    /// Create a schema from its columns
    pub fn new(columns: Vec<Column>) -> Self {
        let mut offsets = Vec::with_capacity(columns.len());
        let mut slot_width = 0;
        for column in &columns {
            offsets.push(slot_width);
            slot_width += column.size_in_bytes();
        }

        Self {
            columns,
            offsets,
            slot_width,
        }
    }

    /// Build a schema of unnamed columns (`col0`, `col1`, ...)
    pub fn from_types(types: &[DataType]) -> Self {
        let columns = types
            .iter()
            .enumerate()
            .map(|(i, data_type)| Column::new(format!("col{}", i), *data_type))
            .collect();
        Self::new(columns)
    }

    /// Parse a schema from `name:type,name:type,...`
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut columns = Vec::new();
        for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, type_str) = part
                .split_once(':')
                .ok_or_else(|| format!("Expected name:type, got '{}'", part))?;
            columns.push(Column::new(name.trim().to_string(), DataType::from_str(type_str)?));
        }
        if columns.is_empty() {
            return Err("Schema must have at least one column".to_string());
        }
        Ok(Self::new(columns))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Byte offset of column `index` within a slot
    pub fn offset_of(&self, index: usize) -> usize {
        self.offsets[index]
    }

    /// Width in bytes of one encoded tuple
    pub fn slot_width(&self) -> usize {
        self.slot_width
    }

    /// Check that the values have this schema's arity and per-column types
    pub fn conforms(&self, values: &[DataValue]) -> bool {
        values.len() == self.columns.len()
            && self
                .columns
                .iter()
                .zip(values)
                .all(|(column, value)| column.data_type().accepts(value))
    }
}

impl fmt::Display for RowSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name(), c.data_type()))
            .collect();
        write!(f, "({})", parts.join(", "))
    }
}
