use std::fmt;

use crate::catalog::schema::RowSchema;
use crate::catalog::value::DataValue;
use crate::common::types::RecordId;

/// One row: its field values plus the record ID once it has been stored
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    values: Vec<DataValue>,
    record_id: Option<RecordId>,
}

impl Tuple {
    pub fn new(values: Vec<DataValue>) -> Self {
        Self {
            values,
            record_id: None,
        }
    }

    pub fn values(&self) -> &[DataValue] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<&DataValue> {
        self.values.get(index)
    }

    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn set_record_id(&mut self, record_id: Option<RecordId>) {
        self.record_id = record_id;
    }

    /// Encode into a slot of exactly `schema.slot_width()` bytes
    pub(crate) fn encode_into(&self, schema: &RowSchema, slot: &mut [u8]) {
        for (i, (column, value)) in schema.columns().iter().zip(&self.values).enumerate() {
            let start = schema.offset_of(i);
            let end = start + column.size_in_bytes();
            value.encode_into(column.data_type(), &mut slot[start..end]);
        }
    }

    pub(crate) fn decode(schema: &RowSchema, slot: &[u8]) -> Result<Self, String> {
        let mut values = Vec::with_capacity(schema.num_columns());
        for (i, column) in schema.columns().iter().enumerate() {
            let start = schema.offset_of(i);
            let end = start + column.size_in_bytes();
            let value = DataValue::decode(column.data_type(), &slot[start..end])
                .map_err(|e| format!("column '{}': {}", column.name(), e))?;
            values.push(value);
        }
        Ok(Self::new(values))
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|v| v.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
