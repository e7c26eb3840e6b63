//! The engine-side asset store the pipeline reads and mutates.
//!
//! [`AssetStore`] is the seam to the host engine: the pipeline only borrows
//! meshes for its duration, mutates them during the bake and hands them back
//! through [`AssetStore::reload_mesh`]. Two implementations ship with the crate:
//! [`MemoryStore`] for embedding and tests, and [`ProjectStore`] which reads a
//! project from a directory or ZIP archive.

mod memory;
pub mod project;

pub use memory::MemoryStore;
pub use project::ProjectStore;

use crate::error::{ExporterError, Result};
use crate::types::{AssetPath, Material, StaticMesh, Texture};
use std::collections::BTreeMap;

/// Access to engine-owned assets.
pub trait AssetStore {
    fn mesh(&self, path: &AssetPath) -> Option<&StaticMesh>;

    fn mesh_mut(&mut self, path: &AssetPath) -> Option<&mut StaticMesh>;

    fn material(&self, path: &AssetPath) -> Option<&Material>;

    fn texture(&self, path: &AssetPath) -> Option<&Texture>;

    /// Add or replace a material.
    fn insert_material(&mut self, material: Material);

    /// Add or replace a texture.
    fn insert_texture(&mut self, texture: Texture);

    fn remove_material(&mut self, path: &AssetPath) -> Option<Material>;

    fn remove_texture(&mut self, path: &AssetPath) -> Option<Texture>;

    fn mesh_paths(&self) -> Vec<AssetPath>;

    fn material_paths(&self) -> Vec<AssetPath>;

    fn texture_paths(&self) -> Vec<AssetPath>;

    /// Discard in-memory state of a mesh and reload it from its on-disk representation.
    fn reload_mesh(&mut self, path: &AssetPath) -> Result<()>;

    /// Like [`AssetStore::mesh`], but missing meshes are an error.
    fn require_mesh(&self, path: &AssetPath) -> Result<&StaticMesh> {
        self.mesh(path)
            .ok_or_else(|| ExporterError::AssetNotFound(path.to_string()))
    }
}

/// Live asset maps shared by the store implementations.
#[derive(Debug, Default, Clone)]
pub(crate) struct AssetMaps {
    pub meshes: BTreeMap<AssetPath, StaticMesh>,
    pub materials: BTreeMap<AssetPath, Material>,
    pub textures: BTreeMap<AssetPath, Texture>,
}

impl AssetMaps {
    pub fn mesh(&self, path: &AssetPath) -> Option<&StaticMesh> {
        self.meshes.get(path)
    }

    pub fn mesh_mut(&mut self, path: &AssetPath) -> Option<&mut StaticMesh> {
        self.meshes.get_mut(path)
    }

    pub fn material(&self, path: &AssetPath) -> Option<&Material> {
        self.materials.get(path)
    }

    pub fn texture(&self, path: &AssetPath) -> Option<&Texture> {
        self.textures.get(path)
    }

    pub fn insert_material(&mut self, material: Material) {
        self.materials.insert(material.path.clone(), material);
    }

    pub fn insert_texture(&mut self, texture: Texture) {
        self.textures.insert(texture.path.clone(), texture);
    }

    pub fn remove_material(&mut self, path: &AssetPath) -> Option<Material> {
        self.materials.remove(path)
    }

    pub fn remove_texture(&mut self, path: &AssetPath) -> Option<Texture> {
        self.textures.remove(path)
    }

    pub fn mesh_paths(&self) -> Vec<AssetPath> {
        self.meshes.keys().cloned().collect()
    }

    pub fn material_paths(&self) -> Vec<AssetPath> {
        self.materials.keys().cloned().collect()
    }

    pub fn texture_paths(&self) -> Vec<AssetPath> {
        self.textures.keys().cloned().collect()
    }
}

/// Implement the lookup half of [`AssetStore`] by delegating to an `assets: AssetMaps` field.
macro_rules! delegate_asset_maps {
    () => {
        fn mesh(&self, path: &AssetPath) -> Option<&StaticMesh> {
            self.assets.mesh(path)
        }

        fn mesh_mut(&mut self, path: &AssetPath) -> Option<&mut StaticMesh> {
            self.assets.mesh_mut(path)
        }

        fn material(&self, path: &AssetPath) -> Option<&Material> {
            self.assets.material(path)
        }

        fn texture(&self, path: &AssetPath) -> Option<&Texture> {
            self.assets.texture(path)
        }

        fn insert_material(&mut self, material: Material) {
            self.assets.insert_material(material)
        }

        fn insert_texture(&mut self, texture: Texture) {
            self.assets.insert_texture(texture)
        }

        fn remove_material(&mut self, path: &AssetPath) -> Option<Material> {
            self.assets.remove_material(path)
        }

        fn remove_texture(&mut self, path: &AssetPath) -> Option<Texture> {
            self.assets.remove_texture(path)
        }

        fn mesh_paths(&self) -> Vec<AssetPath> {
            self.assets.mesh_paths()
        }

        fn material_paths(&self) -> Vec<AssetPath> {
            self.assets.material_paths()
        }

        fn texture_paths(&self) -> Vec<AssetPath> {
            self.assets.texture_paths()
        }
    };
}

pub(crate) use delegate_asset_maps;
