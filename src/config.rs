//! Assembly options and garment design parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ParameterError;
use crate::math::LENGTH_TOLERANCE;

/// Options controlling [`Component::assembly_with`](crate::pattern::Component::assembly_with).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyOptions {
    /// Relative tolerance on the ruffle-adjusted lengths of stitched interfaces.
    pub length_tolerance: f64,
    /// Reject panels whose flattened boundary crosses itself.
    pub check_self_intersection: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            length_tolerance: LENGTH_TOLERANCE,
            check_self_intersection: true,
        }
    }
}

/// A single design or body parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

/// Flat key/value set of design and body parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignParams {
    values: BTreeMap<String, ParamValue>,
}

impl DesignParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: ParamValue) -> &mut Self {
        self.values.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn require(&self, key: &str) -> Result<&ParamValue, ParameterError> {
        self.values
            .get(key)
            .ok_or_else(|| ParameterError::Missing(key.to_owned()))
    }

    /// # Errors
    ///
    /// Returns an error if the key is missing or not a number.
    pub fn number(&self, key: &str) -> Result<f64, ParameterError> {
        match self.require(key)? {
            ParamValue::Number(v) => Ok(*v),
            _ => Err(wrong_type(key, "number")),
        }
    }

    /// Number value, or `default` when the key is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is present but not a number.
    pub fn number_or(&self, key: &str, default: f64) -> Result<f64, ParameterError> {
        if self.contains(key) {
            self.number(key)
        } else {
            Ok(default)
        }
    }

    /// # Errors
    ///
    /// Returns an error if the key is missing or not text.
    pub fn text(&self, key: &str) -> Result<&str, ParameterError> {
        match self.require(key)? {
            ParamValue::Text(v) => Ok(v),
            _ => Err(wrong_type(key, "string")),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the key is missing or not a flag.
    pub fn flag(&self, key: &str) -> Result<bool, ParameterError> {
        match self.require(key)? {
            ParamValue::Flag(v) => Ok(*v),
            _ => Err(wrong_type(key, "boolean")),
        }
    }
}

fn wrong_type(key: &str, expected: &'static str) -> ParameterError {
    ParameterError::WrongType {
        key: key.to_owned(),
        expected,
    }
}
