//! Shared types used throughout the library.

mod material;
mod mesh;
mod texture;

pub use material::{BlendMode, Material};
pub use mesh::{Lod, MaterialSlot, Mesh, Section, StaticMesh, Vertex};
pub use texture::{load_texture_from_bytes, Texture, TextureData};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root under which assets created during a bake live.
pub const TRANSIENT_ROOT: &str = "/Transient";

/// A fully qualified engine asset path, e.g. `/Game/Props/M_Wood`.
///
/// For materials this is the Original Material Identity used to deduplicate
/// baked output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct AssetPath(String);

impl AssetPath {
    /// Create a path, normalizing to exactly one leading slash and no trailing slash.
    pub fn new(path: impl AsRef<str>) -> Self {
        let trimmed = path.as_ref().trim().trim_matches('/');
        Self(format!("/{}", trimmed))
    }

    /// Path of an asset created in the transient root.
    pub fn transient(name: &str) -> Self {
        Self::new(format!("{}/{}", TRANSIENT_ROOT, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The clean asset name (last path component).
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// The containing folder, e.g. `/Game/Props` for `/Game/Props/M_Wood`.
    /// Empty for assets directly under the root.
    pub fn parent(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// The path without its leading slash, suitable for joining under a directory.
    pub fn relative(&self) -> &str {
        self.0.trim_start_matches('/')
    }

    /// Check whether this asset lives in `folder` or any of its subfolders.
    pub fn is_under(&self, folder: &str) -> bool {
        let folder = folder.trim().trim_end_matches('/');
        let folder = folder.trim_start_matches('/');
        if folder.is_empty() {
            return true;
        }
        let relative = self.relative();
        relative.len() > folder.len()
            && relative.starts_with(folder)
            && relative.as_bytes()[folder.len()] == b'/'
    }

    pub fn is_transient(&self) -> bool {
        self.is_under(TRANSIENT_ROOT)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Default for AssetPath {
    fn default() -> Self {
        Self::new("")
    }
}

impl From<&str> for AssetPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for AssetPath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<AssetPath> for String {
    fn from(path: AssetPath) -> Self {
        path.0
    }
}

/// A linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl LinearColor {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[f32; 4]> for LinearColor {
    fn from(c: [f32; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}
