//! Dataset attribute metadata.
//!
//! A reader-neutral view of the variable attributes of a gridded dataset
//! (what `ncdump -h` shows). Readers fill it in; projection and time
//! decoding read CF attributes from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Numbers(Vec<f64>),
    Text(String),
}

impl AttrValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(v) => Some(*v),
            AttrValue::Numbers(v) if v.len() == 1 => Some(v[0]),
            _ => None,
        }
    }

    pub fn as_numbers(&self) -> Option<Vec<f64>> {
        match self {
            AttrValue::Number(v) => Some(vec![*v]),
            AttrValue::Numbers(v) => Some(v.clone()),
            AttrValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Attributes and dimension names of one variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableMetadata {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
}

impl VariableMetadata {
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }
}

/// Metadata of a whole dataset keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub global_attributes: BTreeMap<String, AttrValue>,
    #[serde(default)]
    pub variables: BTreeMap<String, VariableMetadata>,
}

impl DatasetMetadata {
    /// Parse metadata from its JSON representation.
    pub fn from_json(s: &str) -> CommonResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn variable(&self, name: &str) -> CommonResult<&VariableMetadata> {
        self.variables
            .get(name)
            .ok_or_else(|| CommonError::VariableNotFound(name.to_string()))
    }

    /// Text attribute of a variable.
    pub fn text(&self, variable: &str, attribute: &str) -> CommonResult<&str> {
        self.variable(variable)?
            .attribute(attribute)
            .ok_or_else(|| CommonError::missing_attribute(variable, attribute))?
            .as_text()
            .ok_or_else(|| CommonError::attribute_type(variable, attribute))
    }

    /// Numeric attribute of a variable.
    pub fn number(&self, variable: &str, attribute: &str) -> CommonResult<f64> {
        self.variable(variable)?
            .attribute(attribute)
            .ok_or_else(|| CommonError::missing_attribute(variable, attribute))?
            .as_number()
            .ok_or_else(|| CommonError::attribute_type(variable, attribute))
    }

    /// Find the first variable whose text attribute equals `value`.
    pub fn find_by_attribute(&self, attribute: &str, value: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|(_, var)| {
                var.attribute(attribute)
                    .and_then(AttrValue::as_text)
                    .map(|v| v == value)
                    .unwrap_or(false)
            })
            .map(|(name, _)| name.as_str())
    }
}
