//! Schema loading and typed access to schema nodes.
//!
//! The loader only parses JSON; structural validation is the generators'
//! job. Key order is preserved (`serde_json/preserve_order`) so generated
//! struct members follow the order of `properties` in the document.
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Error, Result, SchemaError};

pub fn load_schema(path: &Path) -> Result<Value> {
    let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    crate::path_de::from_str_with_path::<Value>(&source).map_err(|message| Error::Json {
        path: path.to_path_buf(),
        message,
    })
}

/// A borrowed schema mapping together with its dotted path.
#[derive(Debug, Clone, Copy)]
pub struct SchemaNode<'a> {
    pub map: &'a Map<String, Value>,
    pub path: &'a str,
}

impl<'a> SchemaNode<'a> {
    pub fn new(map: &'a Map<String, Value>, path: &'a str) -> Self {
        Self { map, path }
    }

    pub fn error(&self, message: impl Into<String>) -> SchemaError {
        SchemaError::new(self.path, message)
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    pub fn type_name(&self) -> Option<&'a str> {
        self.map.get("type").and_then(Value::as_str)
    }

    pub fn description(&self) -> Option<String> {
        self.str("description").ok().flatten().map(str::to_owned)
    }

    pub fn str(&self, key: &str) -> std::result::Result<Option<&'a str>, SchemaError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.error(format!("'{key}' must be a string, found {other}"))),
        }
    }

    pub fn bool(&self, key: &str) -> std::result::Result<Option<bool>, SchemaError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.error(format!("'{key}' must be a boolean, found {other}"))),
        }
    }

    /// Integer-valued key. Integral floats (`5.0`) are accepted.
    pub fn int(&self, key: &str) -> std::result::Result<Option<i128>, SchemaError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(value) => value_as_i128(value)
                .map(Some)
                .ok_or_else(|| self.error(format!("'{key}' must be an integer, found {value}"))),
        }
    }

    /// Non-negative integer key (lengths and item counts).
    pub fn count(&self, key: &str) -> std::result::Result<Option<u64>, SchemaError> {
        match self.int(key)? {
            None => Ok(None),
            Some(n) => u64::try_from(n)
                .map(Some)
                .map_err(|_| self.error(format!("'{key}' must be a non-negative integer, found {n}"))),
        }
    }

    pub fn float(&self, key: &str) -> std::result::Result<Option<f64>, SchemaError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_f64()),
            Some(other) => Err(self.error(format!("'{key}' must be a number, found {other}"))),
        }
    }
}

pub fn value_as_i128(value: &Value) -> Option<i128> {
    let Value::Number(n) = value else { return None };
    if let Some(i) = n.as_i64() {
        return Some(i as i128);
    }
    if let Some(u) = n.as_u64() {
        return Some(u as i128);
    }
    let f = n.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1.9e19 {
        Some(f as i128)
    } else {
        None
    }
}
