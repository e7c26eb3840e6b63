//! Static mesh assets and their triangle geometry.

use super::AssetPath;
use crate::error::{ExporterError, Result};
use serde::{Deserialize, Serialize};

/// A vertex in a section's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Position in 3D space.
    pub position: [f32; 3],
    /// Normal vector.
    #[serde(default = "default_normal")]
    pub normal: [f32; 3],
    /// Texture coordinates.
    #[serde(default)]
    pub uv: [f32; 2],
    /// Vertex color (RGBA).
    #[serde(default = "default_color")]
    pub color: [f32; 4],
}

fn default_normal() -> [f32; 3] {
    [0.0, 1.0, 0.0]
}

fn default_color() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
            color: default_color(),
        }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            normal: default_normal(),
            uv: [0.0, 0.0],
            color: default_color(),
        }
    }
}

/// A triangle mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, vertex: Vertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle by vertex indices.
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Add a quad (two triangles) by vertex indices, wound CCW.
    pub fn add_quad(&mut self, i0: u32, i1: u32, i2: u32, i3: u32) {
        self.add_triangle(i0, i2, i1);
        self.add_triangle(i0, i3, i2);
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check if the mesh is empty.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Get positions as a flat array (for glTF export).
    pub fn positions_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.position).collect()
    }

    /// Get normals as a flat array (for glTF export).
    pub fn normals_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.normal).collect()
    }

    /// Get UVs as a flat array (for glTF export).
    pub fn uvs_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.uv).collect()
    }

    /// Get colors as a flat array (for glTF export).
    pub fn colors_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.color).collect()
    }
}

/// One drawable section of a LOD, bound to a material slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub material_index: usize,
    #[serde(default)]
    pub geometry: Mesh,
}

impl Section {
    pub fn new(material_index: usize, geometry: Mesh) -> Self {
        Self {
            material_index,
            geometry,
        }
    }
}

/// A level of detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lod {
    pub sections: Vec<Section>,
}

/// A material slot on a static mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSlot {
    #[serde(default)]
    pub slot_name: String,
    pub material: AssetPath,
}

impl MaterialSlot {
    pub fn new(slot_name: impl Into<String>, material: impl Into<AssetPath>) -> Self {
        Self {
            slot_name: slot_name.into(),
            material: material.into(),
        }
    }
}

/// An engine-owned static mesh: LODs of sections that reference material slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticMesh {
    /// Asset path, assigned by the store when loaded from disk.
    #[serde(default)]
    pub path: AssetPath,
    pub lods: Vec<Lod>,
    pub materials: Vec<MaterialSlot>,
}

impl StaticMesh {
    pub fn new(path: impl Into<AssetPath>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_material(mut self, slot: MaterialSlot) -> Self {
        self.materials.push(slot);
        self
    }

    pub fn with_lod(mut self, lod: Lod) -> Self {
        self.lods.push(lod);
        self
    }

    pub fn num_lods(&self) -> usize {
        self.lods.len()
    }

    pub fn num_sections(&self, lod_index: usize) -> usize {
        self.lods.get(lod_index).map_or(0, |lod| lod.sections.len())
    }

    pub fn section(&self, lod_index: usize, section_index: usize) -> Option<&Section> {
        self.lods.get(lod_index)?.sections.get(section_index)
    }

    /// The material assigned to the slot a section references.
    pub fn section_material(&self, lod_index: usize, section_index: usize) -> Option<&AssetPath> {
        let section = self.section(lod_index, section_index)?;
        self.materials.get(section.material_index).map(|slot| &slot.material)
    }

    /// Material slot index of every section, per LOD.
    pub fn section_material_indices(&self) -> Vec<Vec<usize>> {
        self.lods
            .iter()
            .map(|lod| lod.sections.iter().map(|s| s.material_index).collect())
            .collect()
    }

    /// Iterate `(lod, section, section)` in LOD-then-section order.
    pub fn sections(&self) -> impl Iterator<Item = (usize, usize, &Section)> {
        self.lods.iter().enumerate().flat_map(|(lod_index, lod)| {
            lod.sections
                .iter()
                .enumerate()
                .map(move |(section_index, section)| (lod_index, section_index, section))
        })
    }

    /// Reassign the material of a slot.
    pub fn set_material(&mut self, index: usize, material: AssetPath) -> Result<()> {
        let slot_count = self.materials.len();
        let slot = self.materials.get_mut(index).ok_or_else(|| {
            ExporterError::invalid_asset(
                &self.path,
                format!("material slot {} out of range ({} slots)", index, slot_count),
            )
        })?;
        slot.material = material;
        Ok(())
    }

    /// Check that every section references an existing material slot.
    pub fn validate(&self) -> Result<()> {
        for (lod_index, section_index, section) in self.sections() {
            if section.material_index >= self.materials.len() {
                return Err(ExporterError::invalid_asset(
                    &self.path,
                    format!(
                        "LOD {} section {} references material slot {} of {}",
                        lod_index,
                        section_index,
                        section.material_index,
                        self.materials.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Check whether any LOD carries drawable geometry.
    pub fn has_geometry(&self) -> bool {
        self.sections().any(|(_, _, section)| !section.geometry.is_empty())
    }
}
