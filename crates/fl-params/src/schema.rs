//! Parameter value model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ParamsError, ParamsResult};

/// One YAML value.
///
/// Untagged, so plain YAML reads naturally. Variant order matters for
/// deserialization: booleans and integers must be tried before floats, or
/// `3` would come back as `3.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<ParamValue>),
    Map(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// Kind name used in type errors.
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Integer(_) => "integer",
            ParamValue::Float(_) => "float",
            ParamValue::Text(_) => "text",
            ParamValue::List(_) => "list",
            ParamValue::Map(_) => "mapping",
        }
    }
}

/// A loaded parameter mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(pub BTreeMap<String, ParamValue>);

impl Params {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn require(&self, key: &str) -> ParamsResult<&ParamValue> {
        self.get(key).ok_or_else(|| ParamsError::Missing {
            key: key.to_owned(),
        })
    }

    /// Float parameter. Integers are accepted and widened, since YAML
    /// authors write `5` where `5.0` is meant.
    pub fn float(&self, key: &str) -> ParamsResult<f64> {
        match self.require(key)? {
            ParamValue::Float(value) => Ok(*value),
            ParamValue::Integer(value) => Ok(*value as f64),
            other => Err(self.wrong_type(key, "float", other)),
        }
    }

    pub fn integer(&self, key: &str) -> ParamsResult<i64> {
        match self.require(key)? {
            ParamValue::Integer(value) => Ok(*value),
            other => Err(self.wrong_type(key, "integer", other)),
        }
    }

    pub fn boolean(&self, key: &str) -> ParamsResult<bool> {
        match self.require(key)? {
            ParamValue::Bool(value) => Ok(*value),
            other => Err(self.wrong_type(key, "boolean", other)),
        }
    }

    pub fn text(&self, key: &str) -> ParamsResult<&str> {
        match self.require(key)? {
            ParamValue::Text(value) => Ok(value),
            other => Err(self.wrong_type(key, "text", other)),
        }
    }

    pub fn list(&self, key: &str) -> ParamsResult<&[ParamValue]> {
        match self.require(key)? {
            ParamValue::List(values) => Ok(values),
            other => Err(self.wrong_type(key, "list", other)),
        }
    }

    pub fn mapping(&self, key: &str) -> ParamsResult<&BTreeMap<String, ParamValue>> {
        match self.require(key)? {
            ParamValue::Map(entries) => Ok(entries),
            other => Err(self.wrong_type(key, "mapping", other)),
        }
    }

    fn wrong_type(&self, key: &str, expected: &'static str, found: &ParamValue) -> ParamsError {
        ParamsError::WrongType {
            key: key.to_owned(),
            expected,
            found: found.kind(),
        }
    }
}
