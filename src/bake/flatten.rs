//! Reference baking capability.
//!
//! [`FlattenBaker`] does not render anything: it resamples each bound source
//! texture to the requested size and copies constants across, producing a
//! baked material with the `P` / `UseP` / `PConst` layout the resolver reads.

use super::{BakeConfig, MaterialBaker};
use crate::error::{ExporterError, Result};
use crate::resolver::ParameterNames;
use crate::store::AssetStore;
use crate::types::{AssetPath, Material, Texture, TextureData};
use log::{debug, warn};
use std::collections::BTreeSet;

/// Flattens materials by resampling their textures and copying constants.
#[derive(Debug, Default)]
pub struct FlattenBaker {
    baked: usize,
}

impl FlattenBaker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of materials produced so far.
    pub fn baked_count(&self) -> usize {
        self.baked
    }

    /// Next unused `/Transient/<name>_Baked_<n>` path.
    fn next_path(&self, store: &dyn AssetStore, source: &AssetPath) -> AssetPath {
        let mut n = self.baked;
        loop {
            let path = AssetPath::transient(&format!("{}_Baked_{}", source.name(), n));
            if store.material(&path).is_none() {
                return path;
            }
            n += 1;
        }
    }

    fn flatten(&mut self, store: &mut dyn AssetStore, source_path: &AssetPath, config: &BakeConfig) -> Result<AssetPath> {
        let source = store
            .material(source_path)
            .cloned()
            .ok_or_else(|| ExporterError::AssetNotFound(source_path.to_string()))?;
        let path = self.next_path(store, source_path);
        let mut baked = Material::new(path.clone()).with_blend_mode(source.blend_mode);
        let (width, height) = config.texture_size;

        for &property in &config.properties {
            let names = ParameterNames::for_property(property);

            if let Some(map) = sampled_texture(store, &source, &names, width, height)? {
                let texture_path = AssetPath::transient(&format!("T_{}_{}", path.name(), names.parameter));
                store.insert_texture(Texture::new(texture_path.clone(), map));
                baked = baked
                    .with_texture(names.parameter, texture_path)
                    .with_switch(&names.switch, true);
                continue;
            }

            if let Some(color) = source.vector_parameter(&names.constant) {
                baked = baked.with_vector(&names.constant, color).with_switch(&names.switch, false);
            } else if let Some(scalar) = source.scalar_parameter(&names.constant) {
                baked = baked.with_scalar(&names.constant, scalar).with_switch(&names.switch, false);
            }
        }

        store.insert_material(baked);
        self.baked += 1;
        debug!("Flattened {} into {}", source_path, path);
        Ok(path)
    }
}

/// The source texture for one property resampled to `width`x`height`, if it
/// is selected and readable.
fn sampled_texture(
    store: &dyn AssetStore,
    source: &Material,
    names: &ParameterNames,
    width: u32,
    height: u32,
) -> Result<Option<TextureData>> {
    if source.switch_parameter(&names.switch) == Some(false) {
        return Ok(None);
    }
    let Some(texture_path) = source.texture_parameter(names.parameter) else {
        return Ok(None);
    };
    match store.texture(texture_path).and_then(Texture::top_mip) {
        Some(mip) => Ok(Some(mip.resized(width, height)?)),
        None => {
            warn!(
                "{} binds {} to unreadable texture {}; using constants",
                source.path, names.parameter, texture_path
            );
            Ok(None)
        }
    }
}

impl MaterialBaker for FlattenBaker {
    fn bake(&mut self, store: &mut dyn AssetStore, mesh: &AssetPath, config: &BakeConfig) -> Result<()> {
        let used_slots: BTreeSet<usize> = {
            let static_mesh = store.require_mesh(mesh)?;
            config
                .lod_indices
                .iter()
                .filter_map(|&lod| static_mesh.lods.get(lod))
                .flat_map(|lod| lod.sections.iter().map(|s| s.material_index))
                .collect()
        };

        for slot in used_slots {
            let source_path = store
                .require_mesh(mesh)?
                .materials
                .get(slot)
                .map(|s| s.material.clone())
                .ok_or_else(|| ExporterError::Bake {
                    mesh: mesh.to_string(),
                    reason: format!("section references missing slot {}", slot),
                })?;

            let baked = self.flatten(store, &source_path, config).map_err(|e| ExporterError::Bake {
                mesh: mesh.to_string(),
                reason: e.to_string(),
            })?;

            store
                .mesh_mut(mesh)
                .ok_or_else(|| ExporterError::AssetNotFound(mesh.to_string()))?
                .set_material(slot, baked)?;
        }

        Ok(())
    }
}
