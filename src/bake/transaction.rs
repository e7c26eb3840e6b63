//! Snapshot-and-restore scope around the in-place bake.
//!
//! Opening a [`BakeTransaction`] copies the mutable part of every selected
//! mesh (its slot table and per-section slot indices) and records which
//! materials and textures already exist. Reverting copies the slots back,
//! discards every asset created since the snapshot and reloads the meshes
//! from disk. If the transaction is dropped without an explicit revert (an
//! early return or `?` out of the mutation phase), the revert runs in `Drop`.

use crate::error::Result;
use crate::store::AssetStore;
use crate::types::{AssetPath, MaterialSlot};
use log::{debug, error, info, warn};
use std::collections::BTreeSet;

/// Pre-bake copy of a mesh's slot assignments.
#[derive(Debug, Clone, PartialEq)]
struct MeshSnapshot {
    path: AssetPath,
    materials: Vec<MaterialSlot>,
    section_materials: Vec<Vec<usize>>,
}

/// Outcome of a revert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevertReport {
    pub meshes_restored: usize,
    pub materials_discarded: usize,
    pub textures_discarded: usize,
}

/// A reversible edit scope spanning the whole bake batch.
pub struct BakeTransaction<'a> {
    store: &'a mut dyn AssetStore,
    snapshots: Vec<MeshSnapshot>,
    materials_before: BTreeSet<AssetPath>,
    textures_before: BTreeSet<AssetPath>,
    reverted: bool,
}

impl<'a> BakeTransaction<'a> {
    /// Snapshot `meshes`. Fails without touching the store if any mesh is missing.
    pub fn begin(store: &'a mut dyn AssetStore, meshes: &[AssetPath]) -> Result<Self> {
        let mut snapshots = Vec::with_capacity(meshes.len());
        for path in meshes {
            let mesh = store.require_mesh(path)?;
            snapshots.push(MeshSnapshot {
                path: path.clone(),
                materials: mesh.materials.clone(),
                section_materials: mesh.section_material_indices(),
            });
        }

        let materials_before = store.material_paths().into_iter().collect();
        let textures_before = store.texture_paths().into_iter().collect();
        debug!("Opened bake transaction over {} meshes", snapshots.len());

        Ok(Self {
            store,
            snapshots,
            materials_before,
            textures_before,
            reverted: false,
        })
    }

    pub fn store(&self) -> &dyn AssetStore {
        &*self.store
    }

    pub fn store_mut(&mut self) -> &mut dyn AssetStore {
        &mut *self.store
    }

    /// Undo the bake. Every step runs even if an earlier one fails; the first
    /// error is returned.
    pub fn revert(mut self) -> Result<RevertReport> {
        self.rollback()
    }

    fn rollback(&mut self) -> Result<RevertReport> {
        self.reverted = true;
        let mut report = RevertReport::default();
        let mut first_error = None;

        for snapshot in &self.snapshots {
            if let Some(mesh) = self.store.mesh_mut(&snapshot.path) {
                mesh.materials = snapshot.materials.clone();
                for (lod_index, indices) in snapshot.section_materials.iter().enumerate() {
                    let Some(lod) = mesh.lods.get_mut(lod_index) else {
                        continue;
                    };
                    if lod.sections.len() != indices.len() {
                        debug!(
                            "{} LOD {} section count changed during bake ({} -> {})",
                            snapshot.path,
                            lod_index,
                            indices.len(),
                            lod.sections.len()
                        );
                    }
                    for (section, &material_index) in lod.sections.iter_mut().zip(indices) {
                        section.material_index = material_index;
                    }
                }
            }
        }

        for path in self.store.material_paths() {
            if !self.materials_before.contains(&path) && self.store.remove_material(&path).is_some() {
                report.materials_discarded += 1;
            }
        }
        for path in self.store.texture_paths() {
            if !self.textures_before.contains(&path) && self.store.remove_texture(&path).is_some() {
                report.textures_discarded += 1;
            }
        }

        for snapshot in &self.snapshots {
            match self.store.reload_mesh(&snapshot.path) {
                Ok(()) => report.meshes_restored += 1,
                Err(e) => {
                    error!("Failed to reload {}: {}", snapshot.path, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        info!(
            "Reverted bake: {} meshes restored, {} materials and {} textures discarded",
            report.meshes_restored, report.materials_discarded, report.textures_discarded
        );

        match first_error {
            Some(e) => Err(e),
            None => Ok(report),
        }
    }
}

impl Drop for BakeTransaction<'_> {
    fn drop(&mut self) {
        if !self.reverted {
            warn!("Bake transaction dropped without revert; reverting now");
            if let Err(e) = self.rollback() {
                error!("Revert after failed export did not complete: {}", e);
            }
        }
    }
}
