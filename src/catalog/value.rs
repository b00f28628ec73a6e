use std::fmt;
use byteorder::{ByteOrder, LittleEndian};

use crate::catalog::schema::{DataType, TEXT_LEN_PREFIX};

/// A single typed field value
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
}

impl DataValue {
    /// Parse a value of the given type from its textual form
    pub fn parse(s: &str, data_type: &DataType) -> Result<Self, String> {
        let value = match data_type {
            DataType::Integer => s
                .parse::<i64>()
                .map(DataValue::Integer)
                .map_err(|e| format!("Invalid integer '{}': {}", s, e))?,
            DataType::Float => s
                .parse::<f64>()
                .map(DataValue::Float)
                .map_err(|e| format!("Invalid float '{}': {}", s, e))?,
            DataType::Boolean => match s.to_lowercase().as_str() {
                "true" | "t" | "1" => DataValue::Boolean(true),
                "false" | "f" | "0" => DataValue::Boolean(false),
                _ => return Err(format!("Invalid boolean '{}'", s)),
            },
            DataType::Text { .. } => DataValue::Text(s.to_string()),
        };

        if !data_type.accepts(&value) {
            return Err(format!("Value '{}' does not fit {}", s, data_type));
        }
        Ok(value)
    }

    /// Write this value into `buf`, which must be exactly `data_type.size_in_bytes()` long.
    /// Unused trailing bytes of a text field are zeroed.
    pub fn encode_into(&self, data_type: &DataType, buf: &mut [u8]) {
        debug_assert!(data_type.accepts(self), "{:?} does not fit {}", self, data_type);
        match (self, data_type) {
            (DataValue::Integer(v), DataType::Integer) => LittleEndian::write_i64(buf, *v),
            (DataValue::Float(v), DataType::Float) => LittleEndian::write_f64(buf, *v),
            (DataValue::Boolean(v), DataType::Boolean) => buf[0] = u8::from(*v),
            (DataValue::Text(s), DataType::Text { .. }) => {
                let bytes = s.as_bytes();
                LittleEndian::write_u32(&mut buf[0..TEXT_LEN_PREFIX], bytes.len() as u32);
                let body = &mut buf[TEXT_LEN_PREFIX..];
                body[..bytes.len()].copy_from_slice(bytes);
                body[bytes.len()..].fill(0);
            }
            // Callers check conformance before encoding
            _ => buf.fill(0),
        }
    }

    /// Read a value of `data_type` from `buf`
    pub fn decode(data_type: &DataType, buf: &[u8]) -> Result<Self, String> {
        match data_type {
            DataType::Integer => Ok(DataValue::Integer(LittleEndian::read_i64(buf))),
            DataType::Float => Ok(DataValue::Float(LittleEndian::read_f64(buf))),
            DataType::Boolean => match buf[0] {
                0 => Ok(DataValue::Boolean(false)),
                1 => Ok(DataValue::Boolean(true)),
                other => Err(format!("Invalid boolean byte {:#04x}", other)),
            },
            DataType::Text { max_len } => {
                let len = LittleEndian::read_u32(&buf[0..TEXT_LEN_PREFIX]) as usize;
                if len > *max_len as usize {
                    return Err(format!("Text length {} exceeds column limit {}", len, max_len));
                }
                let body = &buf[TEXT_LEN_PREFIX..TEXT_LEN_PREFIX + len];
                String::from_utf8(body.to_vec())
                    .map(DataValue::Text)
                    .map_err(|e| format!("Invalid UTF-8 in text field: {}", e))
            }
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Integer(i) => write!(f, "{}", i),
            DataValue::Float(v) => write!(f, "{}", v),
            DataValue::Boolean(b) => write!(f, "{}", b),
            DataValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}
