//! Per-parameter resolution of baked materials.
//!
//! Each texture-like parameter of a baked material resolves to exactly one of
//! a written texture, a constant color, a constant scalar, or nothing:
//!
//! 1. If the `Use<Param>` switch is true, or there is no switch and a texture
//!    is bound, the texture's top mip is written to
//!    `<texture folder>/<Param>.png`.
//! 2. Otherwise a readable `<Param>Const` vector gives a color.
//! 3. Otherwise a readable `<Param>Const` scalar gives a scalar.
//! 4. Otherwise the parameter is left out of the descriptor.
//!
//! A failed lookup never aborts the batch; it is reported as a
//! [`ResolutionMiss`] and the parameter degrades.

pub mod naming;

pub use naming::{NamingTable, ParameterNames};

use crate::bake::BakedMaterial;
use crate::error::ExporterError;
use crate::export::paths::{material_relative_path, texture_folder, texture_relative_path, to_disk_path};
use crate::export::texture::write_png;
use crate::manifest::{MaterialDescriptor, TextureDescriptor};
use crate::store::AssetStore;
use crate::types::{LinearColor, Material, TextureData};
use log::{debug, warn};
use std::fmt;
use std::path::Path;

/// A parameter that could not be resolved the way the material asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionMiss {
    /// Baked material name.
    pub material: String,
    pub parameter: String,
    pub reason: String,
}

impl fmt::Display for ResolutionMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.material, self.parameter, self.reason)
    }
}

/// Value a single parameter resolved to, before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Texture(&'a TextureData),
    Color(LinearColor),
    Scalar(f32),
    Absent,
}

/// Resolve one parameter of `material`.
///
/// Returns the resolution and, when the material asked for something it could
/// not deliver, the reason.
pub fn resolve_parameter<'a>(
    store: &'a dyn AssetStore,
    material: &Material,
    names: &ParameterNames,
) -> (Resolution<'a>, Option<String>) {
    let switch = material.switch_parameter(&names.switch);
    let bound_texture = material.texture_parameter(names.parameter);
    let wants_texture = switch.unwrap_or(bound_texture.is_some());
    let mut miss = None;

    if wants_texture {
        match bound_texture {
            Some(texture_path) => match store.texture(texture_path).and_then(|t| t.top_mip()) {
                Some(mip) => return (Resolution::Texture(mip), None),
                None => {
                    miss = Some(format!("texture {} has no readable top mip", texture_path));
                }
            },
            None => {
                miss = Some(format!("{} is set but no texture is bound", names.switch));
            }
        }
    }

    if let Some(color) = material.vector_parameter(&names.constant) {
        return (Resolution::Color(color), miss);
    }
    if let Some(scalar) = material.scalar_parameter(&names.constant) {
        return (Resolution::Scalar(scalar), miss);
    }

    let expected = switch.is_some() || bound_texture.is_some() || material.has_parameter(&names.constant);
    if miss.is_none() && expected {
        miss = Some(format!("{} is missing or unreadable", names.constant));
    }
    (Resolution::Absent, miss)
}

/// Descriptor for one baked material plus every miss encountered.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialResolution {
    pub descriptor: MaterialDescriptor,
    pub misses: Vec<ResolutionMiss>,
}

/// Resolve all parameters of a baked material, writing texture-mode maps under `export_root`.
pub fn resolve_material(
    store: &dyn AssetStore,
    baked: &BakedMaterial,
    naming: &NamingTable,
    export_root: &Path,
) -> MaterialResolution {
    let mut descriptor = MaterialDescriptor {
        material_path: material_relative_path(baked),
        blend_mode: baked.blend_mode,
        texture_descriptors: Vec::new(),
    };
    let mut misses = Vec::new();
    let mut report_miss = |parameter: &str, reason: String| {
        let miss = ResolutionMiss {
            material: baked.name.clone(),
            parameter: parameter.to_string(),
            reason,
        };
        warn!("Resolution miss: {}", miss);
        misses.push(miss);
    };

    let Some(material) = store.material(&baked.material) else {
        report_miss("*", format!("baked material {} is not loaded", baked.material));
        return MaterialResolution { descriptor, misses };
    };

    let folder = texture_folder(baked);

    for names in naming.iter() {
        let (resolution, miss) = resolve_parameter(store, material, names);
        if let Some(reason) = miss {
            report_miss(names.parameter, reason);
        }

        let texture_descriptor = match resolution {
            Resolution::Texture(mip) => {
                let relative = texture_relative_path(&folder, names.parameter);
                match write_png(&to_disk_path(export_root, &relative), mip) {
                    Ok(()) => {
                        debug!("Wrote {} ({}x{})", relative, mip.width, mip.height);
                        Some(TextureDescriptor::texture(names.parameter, relative))
                    }
                    Err(e) => {
                        report_miss(names.parameter, write_failure(&relative, e));
                        None
                    }
                }
            }
            Resolution::Color(color) => Some(TextureDescriptor::color(names.parameter, color)),
            Resolution::Scalar(scalar) => Some(TextureDescriptor::scalar(names.parameter, scalar)),
            Resolution::Absent => None,
        };

        descriptor.texture_descriptors.extend(texture_descriptor);
    }

    MaterialResolution { descriptor, misses }
}

fn write_failure(relative: &str, error: ExporterError) -> String {
    format!("failed to write {}: {}", relative, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bake::{baked_material_name, MaterialProperty};
    use crate::manifest::ResolutionMode;
    use crate::store::MemoryStore;
    use crate::types::{AssetPath, BlendMode, Texture};

    fn names(property: MaterialProperty) -> ParameterNames {
        ParameterNames::for_property(property)
    }

    fn store_with(material: Material) -> MemoryStore {
        MemoryStore::new()
            .with_material(material)
            .with_texture(Texture::new("/Transient/T_Color", TextureData::solid(4, 4, [255, 0, 0, 255])))
    }

    fn mode(resolution: &Resolution<'_>) -> &'static str {
        match resolution {
            Resolution::Texture(_) => "texture",
            Resolution::Color(_) => "color",
            Resolution::Scalar(_) => "scalar",
            Resolution::Absent => "absent",
        }
    }

    #[test]
    fn test_true_switch_and_texture_wins_over_constants() {
        let material = Material::new("/Transient/M")
            .with_switch("UseBaseColor", true)
            .with_texture("BaseColor", "/Transient/T_Color")
            .with_vector("BaseColorConst", LinearColor::WHITE)
            .with_scalar("BaseColorConst", 1.0);
        let store = store_with(material.clone());

        let (resolution, miss) = resolve_parameter(&store, &material, &names(MaterialProperty::BaseColor));
        assert_eq!(mode(&resolution), "texture");
        assert!(miss.is_none());
    }

    #[test]
    fn test_bound_texture_without_switch_is_texture() {
        let material = Material::new("/Transient/M").with_texture("BaseColor", "/Transient/T_Color");
        let store = store_with(material.clone());
        let (resolution, _) = resolve_parameter(&store, &material, &names(MaterialProperty::BaseColor));
        assert_eq!(mode(&resolution), "texture");
    }

    #[test]
    fn test_false_switch_falls_back_to_color() {
        let material = Material::new("/Transient/M")
            .with_switch("UseBaseColor", false)
            .with_texture("BaseColor", "/Transient/T_Color")
            .with_vector("BaseColorConst", LinearColor::new(0.2, 0.4, 0.6, 1.0));
        let store = store_with(material.clone());

        let (resolution, miss) = resolve_parameter(&store, &material, &names(MaterialProperty::BaseColor));
        assert_eq!(resolution, Resolution::Color(LinearColor::new(0.2, 0.4, 0.6, 1.0)));
        assert!(miss.is_none());
    }

    #[test]
    fn test_scalar_when_no_texture_or_vector() {
        let material = Material::new("/Transient/M")
            .with_switch("UseRoughness", false)
            .with_scalar("RoughnessConst", 0.7);
        let store = store_with(material.clone());

        let (resolution, _) = resolve_parameter(&store, &material, &names(MaterialProperty::Roughness));
        assert_eq!(resolution, Resolution::Scalar(0.7));
    }

    #[test]
    fn test_absent_when_nothing_matches() {
        let material = Material::new("/Transient/M");
        let store = store_with(material.clone());

        let (resolution, miss) = resolve_parameter(&store, &material, &names(MaterialProperty::Metallic));
        assert_eq!(resolution, Resolution::Absent);
        assert!(miss.is_none());
    }

    #[test]
    fn test_unreadable_constant_is_a_miss() {
        let material = Material::new("/Transient/M")
            .with_switch("UseMetallic", false)
            .with_scalar("MetallicConst", f32::NAN);
        let store = store_with(material.clone());

        let (resolution, miss) = resolve_parameter(&store, &material, &names(MaterialProperty::Metallic));
        assert_eq!(resolution, Resolution::Absent);
        assert!(miss.unwrap().contains("MetallicConst"));
    }

    #[test]
    fn test_switch_without_texture_falls_through() {
        let material = Material::new("/Transient/M")
            .with_switch("UseNormal", true)
            .with_texture("Normal", "/Transient/T_Missing")
            .with_vector("NormalConst", LinearColor::new(0.5, 0.5, 1.0, 1.0));
        let store = store_with(material.clone());

        let (resolution, miss) = resolve_parameter(&store, &material, &names(MaterialProperty::Normal));
        assert_eq!(mode(&resolution), "color");
        assert!(miss.is_some());
    }

    #[test]
    fn test_resolve_material_writes_only_texture_mode() {
        let dir = tempfile::tempdir().unwrap();
        let original = AssetPath::new("/Game/Props/M_Wood");
        let name = baked_material_name(&original);
        let baked_path = AssetPath::transient(&name);
        let material = Material::new(baked_path.clone())
            .with_switch("UseBaseColor", true)
            .with_texture("BaseColor", "/Transient/T_Color")
            .with_switch("UseRoughness", false)
            .with_scalar("RoughnessConst", 0.3)
            .with_vector("EmissiveColorConst", LinearColor::BLACK);
        let store = store_with(material);
        let baked = BakedMaterial {
            original,
            name: name.clone(),
            material: baked_path,
            blend_mode: BlendMode::Translucent,
            users: Vec::new(),
        };

        let resolution = resolve_material(&store, &baked, &NamingTable::standard(), dir.path());
        let descriptor = resolution.descriptor;

        assert!(resolution.misses.is_empty());
        assert_eq!(descriptor.material_path, format!("Materials/Game/Props/{}", name));
        assert_eq!(descriptor.blend_mode, BlendMode::Translucent);
        assert_eq!(descriptor.texture_descriptors.len(), 3);

        let base = descriptor.texture_descriptor("BaseColor").unwrap();
        assert_eq!(base.mode(), Some(ResolutionMode::Texture));
        assert_eq!(base.texture_path, format!("Textures/Game/Props/{}/BaseColor.png", name));
        assert!(to_disk_path(dir.path(), &base.texture_path).is_file());

        assert_eq!(
            descriptor.texture_descriptor("Roughness").unwrap().mode(),
            Some(ResolutionMode::Scalar)
        );
        assert_eq!(
            descriptor.texture_descriptor("EmissiveColor").unwrap().mode(),
            Some(ResolutionMode::Color)
        );
        assert!(descriptor.texture_descriptor("Metallic").is_none());

        let written: Vec<_> = std::fs::read_dir(to_disk_path(dir.path(), &texture_folder(&baked)))
            .unwrap()
            .collect();
        assert_eq!(written.len(), 1);
    }

    #[test]
    fn test_missing_baked_material_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let original = AssetPath::new("/Game/M_Gone");
        let name = baked_material_name(&original);
        let baked = BakedMaterial {
            original,
            material: AssetPath::transient(&name),
            name,
            blend_mode: BlendMode::Opaque,
            users: Vec::new(),
        };

        let resolution = resolve_material(&store, &baked, &NamingTable::standard(), dir.path());
        assert!(resolution.descriptor.texture_descriptors.is_empty());
        assert_eq!(resolution.misses.len(), 1);
    }
}
