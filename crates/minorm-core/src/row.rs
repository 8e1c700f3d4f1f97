//! Rows returned by a store, with by-name column access.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, TypeError};
use crate::value::Value;

/// Column metadata shared across all rows of a result set.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    names: Vec<String>,
    name_to_index: HashMap<String, usize>,
}

impl ColumnInfo {
    pub fn new(names: Vec<String>) -> Self {
        let name_to_index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        Self {
            names,
            name_to_index,
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A single row of values plus shared column metadata.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<ColumnInfo>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<ColumnInfo>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Build a row from (column, value) pairs. Convenient for stores that
    /// materialize rows one at a time.
    pub fn from_pairs(pairs: Vec<(String, Value)>) -> Self {
        let (names, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self {
            columns: Arc::new(ColumnInfo::new(names)),
            values,
        }
    }

    pub fn columns(&self) -> &ColumnInfo {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Raw value by column name, `Value::Null` when the column is absent.
    pub fn value_named(&self, name: &str) -> &Value {
        self.columns
            .index_of(name)
            .and_then(|i| self.values.get(i))
            .unwrap_or(&Value::Null)
    }

    /// Typed value by column name.
    pub fn get_named<T: FromValue>(&self, name: &str) -> Result<T> {
        match self.columns.index_of(name) {
            Some(i) => T::from_value(&self.values[i]).map_err(|mut e| {
                e.column = Some(name.to_string());
                e.into()
            }),
            None => Err(TypeError {
                expected: "column",
                actual: format!("no column named '{name}'"),
                column: Some(name.to_string()),
            }
            .into()),
        }
    }
}

/// Conversion from a stored [`Value`] into a concrete Rust type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeError>;
}

fn mismatch(expected: &'static str, value: &Value) -> TypeError {
    TypeError {
        expected,
        actual: value.type_name().to_string(),
        column: None,
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeError> {
        value.as_bool().ok_or_else(|| mismatch("bool", value))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeError> {
        match value {
            Value::Int(i) => Ok(*i),
            _ => Err(mismatch("int", value)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeError> {
        value.as_i64().ok_or_else(|| mismatch("bigint", value))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeError> {
        value.as_f64().ok_or_else(|| mismatch("double", value))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeError> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            _ => Err(mismatch("text", value)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeError> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            _ => Err(mismatch("bytes", value)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> std::result::Result<Self, TypeError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
