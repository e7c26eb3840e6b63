//! In-memory asset store.

use super::{delegate_asset_maps, AssetMaps, AssetStore};
use crate::error::{ExporterError, Result};
use crate::types::{AssetPath, Material, StaticMesh, Texture};
use std::collections::BTreeMap;

/// An asset store held entirely in memory.
///
/// Inserting a mesh also records it as the saved copy; [`AssetStore::reload_mesh`]
/// restores that copy, standing in for a reload from disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    assets: AssetMaps,
    saved_meshes: BTreeMap<AssetPath, StaticMesh>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh and save it.
    pub fn insert_mesh(&mut self, mesh: StaticMesh) {
        self.saved_meshes.insert(mesh.path.clone(), mesh.clone());
        self.assets.meshes.insert(mesh.path.clone(), mesh);
    }

    pub fn with_mesh(mut self, mesh: StaticMesh) -> Self {
        self.insert_mesh(mesh);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.assets.insert_material(material);
        self
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.assets.insert_texture(texture);
        self
    }
}

impl AssetStore for MemoryStore {
    delegate_asset_maps!();

    fn reload_mesh(&mut self, path: &AssetPath) -> Result<()> {
        let saved = self
            .saved_meshes
            .get(path)
            .cloned()
            .ok_or_else(|| ExporterError::AssetNotFound(path.to_string()))?;
        self.assets.meshes.insert(path.clone(), saved);
        Ok(())
    }
}
