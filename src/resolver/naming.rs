//! Parameter naming convention of baked materials.
//!
//! A baked material exposes each property `P` through up to three parameters:
//! a texture named `P`, a switch `UseP` selecting the texture, and a constant
//! `PConst` holding either a vector or a scalar.

use crate::bake::MaterialProperty;
use crate::error::{ExporterError, Result};
use std::collections::BTreeSet;

pub const SWITCH_PREFIX: &str = "Use";
pub const CONSTANT_SUFFIX: &str = "Const";

/// Parameter names for one property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterNames {
    pub property: MaterialProperty,
    /// Texture parameter, also used as `ParameterName` in the manifest.
    pub parameter: &'static str,
    pub switch: String,
    pub constant: String,
}

impl ParameterNames {
    pub fn for_property(property: MaterialProperty) -> Self {
        let parameter = property.parameter_name();
        Self {
            property,
            parameter,
            switch: format!("{}{}", SWITCH_PREFIX, parameter),
            constant: format!("{}{}", parameter, CONSTANT_SUFFIX),
        }
    }
}

/// The ordered set of properties resolved for every baked material.
#[derive(Debug, Clone, PartialEq)]
pub struct NamingTable {
    entries: Vec<ParameterNames>,
}

impl NamingTable {
    /// Build a table, rejecting empty or ambiguous property lists.
    pub fn new(properties: &[MaterialProperty]) -> Result<Self> {
        if properties.is_empty() {
            return Err(ExporterError::InvalidSettings(
                "at least one material property must be resolved".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        let mut entries = Vec::with_capacity(properties.len());
        for &property in properties {
            let names = ParameterNames::for_property(property);
            for name in [names.parameter, names.switch.as_str(), names.constant.as_str()] {
                if !seen.insert(name.to_string()) {
                    return Err(ExporterError::InvalidSettings(format!(
                        "parameter name {} is used more than once",
                        name
                    )));
                }
            }
            entries.push(names);
        }

        Ok(Self { entries })
    }

    /// All seven properties in bake order.
    pub fn standard() -> Self {
        Self {
            entries: MaterialProperty::ALL
                .iter()
                .map(|&p| ParameterNames::for_property(p))
                .collect(),
        }
    }

    pub fn get(&self, property: MaterialProperty) -> Option<&ParameterNames> {
        self.entries.iter().find(|names| names.property == property)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterNames> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NamingTable {
    fn default() -> Self {
        Self::standard()
    }
}
