//! Writing baked assets into the export directory.
//!
//! Meshes are exported as GLB under `Models/`, texture-mode material maps as
//! PNG under `Textures/`. See [`paths`] for the layout.

pub mod gltf;
pub mod paths;
pub mod texture;

pub use gltf::{export_glb, SlotMaterial};
pub use texture::write_png;

use crate::manifest::MeshDescriptor;
use crate::store::AssetStore;
use crate::types::{AssetPath, StaticMesh};
use log::{debug, info, warn};
use paths::{mesh_relative_path, to_disk_path};
use std::path::Path;

/// Slot materials of `mesh` as currently bound in the store.
pub fn slot_materials(store: &dyn AssetStore, mesh: &StaticMesh) -> Vec<SlotMaterial> {
    mesh.materials
        .iter()
        .map(|slot| SlotMaterial {
            name: slot.material.name().to_string(),
            blend_mode: store
                .material(&slot.material)
                .map(|m| m.blend_mode)
                .unwrap_or_default(),
        })
        .collect()
}

/// Export every mesh to `<export_root>/Models/...glb`.
///
/// Meshes that are missing, empty or fail to write are skipped with a warning
/// and get no descriptor.
pub fn export_meshes(
    store: &dyn AssetStore,
    meshes: &[AssetPath],
    export_root: &Path,
    enable_read_write: bool,
) -> Vec<MeshDescriptor> {
    let mut descriptors = Vec::with_capacity(meshes.len());

    for mesh_path in meshes {
        let Some(mesh) = store.mesh(mesh_path) else {
            warn!("Mesh {} is not loaded; skipping export", mesh_path);
            continue;
        };
        if !mesh.has_geometry() {
            warn!("Mesh {} has no geometry; skipping export", mesh_path);
            continue;
        }

        let relative = mesh_relative_path(mesh_path);
        let target = to_disk_path(export_root, &relative);
        let written = export_glb(mesh, &slot_materials(store, mesh)).and_then(|glb| {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, &glb)?;
            Ok(glb.len())
        });

        match written {
            Ok(bytes) => {
                debug!("Wrote {} ({} bytes)", relative, bytes);
                descriptors.push(MeshDescriptor {
                    mesh_path: relative,
                    enable_read_write,
                });
            }
            Err(e) => warn!("Failed to export {}: {}", mesh_path, e),
        }
    }

    info!("Exported {} of {} meshes", descriptors.len(), meshes.len());
    descriptors
}
