//! Material assets with a fixed parameter vocabulary.

use super::{AssetPath, LinearColor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a material's output is blended. Serialized as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BlendMode {
    #[default]
    Opaque = 0,
    Masked = 1,
    Translucent = 2,
    Additive = 3,
    Modulate = 4,
    AlphaComposite = 5,
    AlphaHoldout = 6,
}

impl From<BlendMode> for u8 {
    fn from(mode: BlendMode) -> Self {
        mode as u8
    }
}

impl TryFrom<u8> for BlendMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => BlendMode::Opaque,
            1 => BlendMode::Masked,
            2 => BlendMode::Translucent,
            3 => BlendMode::Additive,
            4 => BlendMode::Modulate,
            5 => BlendMode::AlphaComposite,
            6 => BlendMode::AlphaHoldout,
            other => return Err(format!("unknown blend mode {}", other)),
        })
    }
}

/// A material described by named parameters.
///
/// Texture, vector, scalar and switch parameters live in separate namespaces,
/// so `BaseColor` may be both a texture parameter and the stem of the
/// `BaseColorConst` vector parameter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Asset path, assigned by the store when loaded from disk.
    pub path: AssetPath,
    pub blend_mode: BlendMode,
    /// Texture parameters, bound to texture asset paths.
    pub textures: BTreeMap<String, AssetPath>,
    pub vectors: BTreeMap<String, LinearColor>,
    pub scalars: BTreeMap<String, f32>,
    pub switches: BTreeMap<String, bool>,
}

impl Material {
    pub fn new(path: impl Into<AssetPath>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    pub fn with_texture(mut self, name: &str, texture: impl Into<AssetPath>) -> Self {
        self.textures.insert(name.to_string(), texture.into());
        self
    }

    pub fn with_vector(mut self, name: &str, value: LinearColor) -> Self {
        self.vectors.insert(name.to_string(), value);
        self
    }

    pub fn with_scalar(mut self, name: &str, value: f32) -> Self {
        self.scalars.insert(name.to_string(), value);
        self
    }

    pub fn with_switch(mut self, name: &str, value: bool) -> Self {
        self.switches.insert(name.to_string(), value);
        self
    }

    /// Copy this material under a new path.
    pub fn duplicate(&self, path: AssetPath) -> Self {
        Self {
            path,
            ..self.clone()
        }
    }

    pub fn texture_parameter(&self, name: &str) -> Option<&AssetPath> {
        self.textures.get(name)
    }

    pub fn switch_parameter(&self, name: &str) -> Option<bool> {
        self.switches.get(name).copied()
    }

    /// A vector parameter, if present and finite.
    pub fn vector_parameter(&self, name: &str) -> Option<LinearColor> {
        self.vectors
            .get(name)
            .copied()
            .filter(|c| c.to_array().iter().all(|v| v.is_finite()))
    }

    /// A scalar parameter, if present and finite.
    pub fn scalar_parameter(&self, name: &str) -> Option<f32> {
        self.scalars.get(name).copied().filter(|v| v.is_finite())
    }

    /// Check whether any parameter namespace holds `name`.
    pub fn has_parameter(&self, name: &str) -> bool {
        self.textures.contains_key(name)
            || self.vectors.contains_key(name)
            || self.scalars.contains_key(name)
            || self.switches.contains_key(name)
    }
}
