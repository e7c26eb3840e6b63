//! Material baking.
//!
//! The bake stage hands every selected mesh to a [`MaterialBaker`], which
//! flattens each referenced material into a fixed set of maps and rewrites
//! the mesh's slot assignments in place. Before the baker runs, the original
//! material of every `(LOD, section)` is recorded, because afterwards the
//! slots only point at baked materials. After the bake each first-seen slot
//! is renamed to a deterministic baked name and registered in the
//! [`MaterialTable`], so meshes sharing a source material share one output.
//!
//! Mutations are undone by [`BakeTransaction`]; the caller opens it before
//! [`bake_meshes`] and reverts it once the baked state has been exported.

pub mod dedup;
pub mod flatten;
pub mod transaction;

pub use dedup::{baked_material_name, BakedMaterial, MaterialTable};
pub use flatten::FlattenBaker;
pub use transaction::{BakeTransaction, RevertReport};

use crate::error::{ExporterError, Result};
use crate::store::AssetStore;
use crate::types::{AssetPath, BlendMode, StaticMesh};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};

/// Material inputs flattened by the bake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialProperty {
    BaseColor,
    Metallic,
    Specular,
    Roughness,
    Normal,
    Opacity,
    EmissiveColor,
}

impl MaterialProperty {
    /// Every property, in bake order.
    pub const ALL: [MaterialProperty; 7] = [
        MaterialProperty::BaseColor,
        MaterialProperty::Metallic,
        MaterialProperty::Specular,
        MaterialProperty::Roughness,
        MaterialProperty::Normal,
        MaterialProperty::Opacity,
        MaterialProperty::EmissiveColor,
    ];

    /// Name of the parameter that carries this property on a baked material.
    pub fn parameter_name(self) -> &'static str {
        match self {
            MaterialProperty::BaseColor => "BaseColor",
            MaterialProperty::Metallic => "Metallic",
            MaterialProperty::Specular => "Specular",
            MaterialProperty::Roughness => "Roughness",
            MaterialProperty::Normal => "Normal",
            MaterialProperty::Opacity => "Opacity",
            MaterialProperty::EmissiveColor => "EmissiveColor",
        }
    }

    /// Whether a constant for this property is a color rather than a scalar.
    pub fn is_color(self) -> bool {
        matches!(
            self,
            MaterialProperty::BaseColor | MaterialProperty::Normal | MaterialProperty::EmissiveColor
        )
    }
}

/// A request to the baking capability for one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct BakeConfig {
    /// LODs whose sections are baked.
    pub lod_indices: Vec<usize>,
    /// Output texture size (width, height).
    pub texture_size: (u32, u32),
    /// Properties to flatten.
    pub properties: Vec<MaterialProperty>,
}

impl BakeConfig {
    /// Bake every LOD of `mesh` into square textures of `texture_size`.
    pub fn for_mesh(mesh: &StaticMesh, texture_size: u32) -> Self {
        Self {
            lod_indices: (0..mesh.num_lods()).collect(),
            texture_size: (texture_size, texture_size),
            properties: MaterialProperty::ALL.to_vec(),
        }
    }
}

/// The baking capability.
///
/// Implementations flatten the materials of `mesh` and apply the result in
/// place: new materials and textures are inserted into the store and the
/// mesh's slots are pointed at them.
pub trait MaterialBaker {
    fn bake(&mut self, store: &mut dyn AssetStore, mesh: &AssetPath, config: &BakeConfig) -> Result<()>;
}

impl<F> MaterialBaker for F
where
    F: FnMut(&mut dyn AssetStore, &AssetPath, &BakeConfig) -> Result<()>,
{
    fn bake(&mut self, store: &mut dyn AssetStore, mesh: &AssetPath, config: &BakeConfig) -> Result<()> {
        self(store, mesh, config)
    }
}

/// Material of a section before the bake.
#[derive(Debug, Clone)]
struct OriginalMaterial {
    identity: AssetPath,
    blend_mode: BlendMode,
}

/// Bake every mesh and collect the deduplicated baked materials.
///
/// Meshes are mutated in place; run this inside a [`BakeTransaction`].
pub fn bake_meshes(
    store: &mut dyn AssetStore,
    baker: &mut dyn MaterialBaker,
    meshes: &[AssetPath],
    texture_size: u32,
) -> Result<MaterialTable> {
    let mut table = MaterialTable::new();

    for mesh_path in meshes {
        let mesh = store.require_mesh(mesh_path)?;
        let config = BakeConfig::for_mesh(mesh, texture_size);
        let originals = record_original_materials(store, mesh)?;

        debug!(
            "Baking {} ({} LODs, {} sections) at {}x{}",
            mesh_path,
            config.lod_indices.len(),
            originals.len(),
            config.texture_size.0,
            config.texture_size.1
        );
        baker.bake(store, mesh_path, &config)?;

        register_baked_materials(store, mesh_path, &originals, &mut table)?;
    }

    info!("Baked {} meshes into {} unique materials", meshes.len(), table.len());
    Ok(table)
}

/// Snapshot the material identity and blend mode of every `(LOD, section)`.
fn record_original_materials(
    store: &dyn AssetStore,
    mesh: &StaticMesh,
) -> Result<BTreeMap<(usize, usize), OriginalMaterial>> {
    let mut originals = BTreeMap::new();

    for (lod_index, section_index, _) in mesh.sections() {
        let identity = mesh.section_material(lod_index, section_index).ok_or_else(|| {
            ExporterError::invalid_asset(
                &mesh.path,
                format!("LOD {} section {} has no material slot", lod_index, section_index),
            )
        })?;

        let blend_mode = match store.material(identity) {
            Some(material) => material.blend_mode,
            None => {
                warn!("Material {} used by {} is not loaded; assuming opaque", identity, mesh.path);
                BlendMode::default()
            }
        };

        originals.insert(
            (lod_index, section_index),
            OriginalMaterial {
                identity: identity.clone(),
                blend_mode,
            },
        );
    }

    Ok(originals)
}

/// Rename each first-seen baked slot and merge it into the table.
fn register_baked_materials(
    store: &mut dyn AssetStore,
    mesh_path: &AssetPath,
    originals: &BTreeMap<(usize, usize), OriginalMaterial>,
    table: &mut MaterialTable,
) -> Result<()> {
    let mesh = store.require_mesh(mesh_path)?;
    let mut processed = BTreeSet::new();
    let mut pending = Vec::new();

    for (lod_index, section_index, section) in mesh.sections() {
        let material_index = section.material_index;
        if !processed.insert(material_index) {
            continue;
        }

        let Some(original) = originals.get(&(lod_index, section_index)) else {
            warn!(
                "{} LOD {} section {} appeared during the bake; skipping",
                mesh_path, lod_index, section_index
            );
            continue;
        };
        let Some(slot) = mesh.materials.get(material_index) else {
            return Err(ExporterError::Bake {
                mesh: mesh_path.to_string(),
                reason: format!("baked section references missing slot {}", material_index),
            });
        };

        pending.push((material_index, original.clone(), slot.material.clone()));
    }

    for (material_index, original, post_bake) in pending {
        let baked = table.resolve_with(&original.identity, original.blend_mode, |name| {
            let source = store.material(&post_bake).ok_or_else(|| ExporterError::Bake {
                mesh: mesh_path.to_string(),
                reason: format!("baked material {} not found", post_bake),
            })?;
            let duplicate = source.duplicate(AssetPath::transient(name));
            let path = duplicate.path.clone();
            store.insert_material(duplicate);
            Ok(path)
        })?;
        baked.add_user(mesh_path);
        let baked_path = baked.material.clone();

        store
            .mesh_mut(mesh_path)
            .ok_or_else(|| ExporterError::AssetNotFound(mesh_path.to_string()))?
            .set_material(material_index, baked_path)?;
    }

    Ok(())
}
