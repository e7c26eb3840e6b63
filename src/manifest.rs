//! The import descriptor: the document handed to the external importer.
//!
//! Field names follow the importer's expectations exactly (`ExportDirectory`,
//! `bUseTexture`, ...). All paths inside are relative to `ExportDirectory`
//! and use `/` separators.

use crate::error::Result;
use crate::export::paths::{manifest_path, to_disk_path};
use crate::types::{BlendMode, LinearColor};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a texture-like parameter was resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolutionMode {
    Texture,
    Color,
    Scalar,
}

/// One resolved parameter of a baked material.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextureDescriptor {
    #[serde(rename = "ParameterName")]
    pub parameter_name: String,
    #[serde(rename = "bUseTexture")]
    pub use_texture: bool,
    #[serde(rename = "bUseColor")]
    pub use_color: bool,
    #[serde(rename = "bUseScalar")]
    pub use_scalar: bool,
    #[serde(rename = "Color")]
    pub color: LinearColor,
    #[serde(rename = "Scalar")]
    pub scalar: f32,
    #[serde(rename = "TexturePath")]
    pub texture_path: String,
}

impl TextureDescriptor {
    pub fn texture(parameter_name: &str, texture_path: String) -> Self {
        Self {
            parameter_name: parameter_name.to_string(),
            use_texture: true,
            texture_path,
            ..Default::default()
        }
    }

    pub fn color(parameter_name: &str, color: LinearColor) -> Self {
        Self {
            parameter_name: parameter_name.to_string(),
            use_color: true,
            color,
            ..Default::default()
        }
    }

    pub fn scalar(parameter_name: &str, scalar: f32) -> Self {
        Self {
            parameter_name: parameter_name.to_string(),
            use_scalar: true,
            scalar,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> Option<ResolutionMode> {
        if self.use_texture {
            Some(ResolutionMode::Texture)
        } else if self.use_color {
            Some(ResolutionMode::Color)
        } else if self.use_scalar {
            Some(ResolutionMode::Scalar)
        } else {
            None
        }
    }
}

/// One unique baked material.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialDescriptor {
    #[serde(rename = "MaterialPath")]
    pub material_path: String,
    #[serde(rename = "BlendMode")]
    pub blend_mode: BlendMode,
    #[serde(rename = "TextureDescriptors")]
    pub texture_descriptors: Vec<TextureDescriptor>,
}

impl MaterialDescriptor {
    pub fn texture_descriptor(&self, parameter_name: &str) -> Option<&TextureDescriptor> {
        self.texture_descriptors
            .iter()
            .find(|d| d.parameter_name == parameter_name)
    }
}

/// One exported mesh.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshDescriptor {
    #[serde(rename = "MeshPath")]
    pub mesh_path: String,
    #[serde(rename = "bEnableReadWrite")]
    pub enable_read_write: bool,
}

/// The root manifest document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImportDescriptor {
    #[serde(rename = "ExportDirectory")]
    pub export_directory: String,
    #[serde(rename = "MaterialDescriptors")]
    pub material_descriptors: Vec<MaterialDescriptor>,
    #[serde(rename = "MeshDescriptors")]
    pub mesh_descriptors: Vec<MeshDescriptor>,
}

impl ImportDescriptor {
    pub fn new(export_root: &Path) -> Self {
        Self {
            export_directory: export_root.to_string_lossy().into_owned(),
            ..Default::default()
        }
    }

    /// Relative file paths referenced by the document that do not exist on disk.
    pub fn missing_files(&self) -> Vec<String> {
        let root = Path::new(&self.export_directory);
        let textures = self
            .material_descriptors
            .iter()
            .flat_map(|m| m.texture_descriptors.iter())
            .filter(|t| t.use_texture)
            .map(|t| t.texture_path.as_str());
        let meshes = self.mesh_descriptors.iter().map(|m| m.mesh_path.as_str());

        textures
            .chain(meshes)
            .filter(|relative| !to_disk_path(root, relative).is_file())
            .map(str::to_string)
            .collect()
    }
}

/// Write the manifest to `<export_root>/ImportDescriptor.txt`, replacing any previous one.
pub fn save_manifest(descriptor: &ImportDescriptor, export_root: &Path) -> Result<PathBuf> {
    let path = manifest_path(export_root);
    std::fs::create_dir_all(export_root)?;
    let json = serde_json::to_string_pretty(descriptor)?;
    std::fs::write(&path, json)?;

    info!(
        "Saved import descriptor ({} materials, {} meshes) to {:?}",
        descriptor.material_descriptors.len(),
        descriptor.mesh_descriptors.len(),
        path
    );
    Ok(path)
}

/// Read a manifest back.
pub fn load_manifest(path: &Path) -> Result<ImportDescriptor> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
