//! Deterministic layout of the export directory.
//!
//! All paths are built from asset identities alone, so the same selection
//! always lands at the same relative paths. Relative paths use `/`
//! separators; [`to_disk_path`] turns them into platform paths.

use crate::bake::BakedMaterial;
use crate::types::AssetPath;
use std::path::{Path, PathBuf};

pub const MODELS_DIR: &str = "Models";
pub const MATERIALS_DIR: &str = "Materials";
pub const TEXTURES_DIR: &str = "Textures";
pub const MESH_EXTENSION: &str = "glb";
pub const TEXTURE_EXTENSION: &str = "png";
pub const MANIFEST_FILE_NAME: &str = "ImportDescriptor.txt";

/// `Models/<mesh path>.glb`
pub fn mesh_relative_path(mesh: &AssetPath) -> String {
    format!("{}.{}", join_segments(&[MODELS_DIR, mesh.relative()]), MESH_EXTENSION)
}

/// `Materials/<original folder>/<baked name>`
pub fn material_relative_path(baked: &BakedMaterial) -> String {
    join_segments(&[MATERIALS_DIR, baked.original.parent(), &baked.name])
}

/// `Textures/<original folder>/<baked name>`
pub fn texture_folder(baked: &BakedMaterial) -> String {
    join_segments(&[TEXTURES_DIR, baked.original.parent(), &baked.name])
}

/// `<folder>/<parameter>.png`
pub fn texture_relative_path(folder: &str, parameter: &str) -> String {
    format!("{}.{}", join_segments(&[folder, parameter]), TEXTURE_EXTENSION)
}

pub fn manifest_path(export_root: &Path) -> PathBuf {
    export_root.join(MANIFEST_FILE_NAME)
}

/// Resolve a `/`-separated relative path under `export_root`.
pub fn to_disk_path(export_root: &Path, relative: &str) -> PathBuf {
    relative
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(export_root.to_path_buf(), |path, segment| path.join(segment))
}

/// Join path segments with single `/` separators, dropping empty segments.
fn join_segments(segments: &[&str]) -> String {
    segments
        .iter()
        .flat_map(|segment| segment.split('/'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
