//! Project loading from directories and ZIP archives.
//!
//! A project keeps its assets under `Content/`:
//!
//! ```text
//! Content/Props/SM_Chair.mesh.json     -> /Game/Props/SM_Chair
//! Content/Props/M_Wood.material.json   -> /Game/Props/M_Wood
//! Content/Props/T_Wood.png             -> /Game/Props/T_Wood
//! ```

use super::{delegate_asset_maps, AssetMaps, AssetStore};
use crate::error::{ExporterError, Result};
use crate::types::{load_texture_from_bytes, AssetPath, Material, StaticMesh, Texture};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Folder inside a project that holds its assets.
pub const CONTENT_DIR: &str = "Content";
/// Mount point of the content folder in asset paths.
pub const CONTENT_MOUNT: &str = "/Game";

const MESH_SUFFIX: &str = ".mesh.json";
const MATERIAL_SUFFIX: &str = ".material.json";
const TEXTURE_SUFFIX: &str = ".png";

/// Where project files are read from.
#[derive(Debug, Clone)]
enum ProjectSource {
    Directory(PathBuf),
    Archive(PathBuf),
}

impl ProjectSource {
    /// Read one file, given its path relative to the content folder.
    fn read(&self, relative: &str) -> Result<Vec<u8>> {
        match self {
            ProjectSource::Directory(root) => Ok(std::fs::read(root.join(CONTENT_DIR).join(relative))?),
            ProjectSource::Archive(path) => {
                let file = std::fs::File::open(path)?;
                let mut archive = zip::ZipArchive::new(file)?;
                let mut entry = archive.by_name(&format!("{}/{}", CONTENT_DIR, relative))?;
                let mut data = Vec::new();
                entry.read_to_end(&mut data)?;
                Ok(data)
            }
        }
    }
}

/// An asset store backed by a project on disk.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    source: ProjectSource,
    assets: AssetMaps,
    /// Mesh asset path -> file path relative to the content folder.
    mesh_files: BTreeMap<AssetPath, String>,
}

impl ProjectStore {
    /// Load a project from a directory or a ZIP archive.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = if path.is_dir() {
            ProjectSource::Directory(path.to_path_buf())
        } else {
            ProjectSource::Archive(path.to_path_buf())
        };

        let mut store = Self {
            source,
            assets: AssetMaps::default(),
            mesh_files: BTreeMap::new(),
        };

        match store.source.clone() {
            ProjectSource::Directory(root) => store.load_directory(&root)?,
            ProjectSource::Archive(archive) => store.load_archive(&archive)?,
        }

        debug!(
            "Loaded project {:?}: {} meshes, {} materials, {} textures",
            path,
            store.assets.meshes.len(),
            store.assets.materials.len(),
            store.assets.textures.len()
        );
        Ok(store)
    }

    /// Directory the project lives in (the archive's folder for ZIP projects).
    pub fn root(&self) -> &Path {
        match &self.source {
            ProjectSource::Directory(root) => root,
            ProjectSource::Archive(path) => path.parent().unwrap_or_else(|| Path::new(".")),
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.assets.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.assets.materials.len()
    }

    pub fn texture_count(&self) -> usize {
        self.assets.textures.len()
    }

    fn load_directory(&mut self, root: &Path) -> Result<()> {
        let content = root.join(CONTENT_DIR);
        if !content.is_dir() {
            return Err(ExporterError::invalid_asset(
                root.display(),
                "no Content directory found",
            ));
        }

        let mut files = Vec::new();
        collect_files_recursive(&content, &content, &mut files)?;
        for relative in files {
            let data = std::fs::read(content.join(&relative))?;
            self.add_file(&relative, &data);
        }
        Ok(())
    }

    fn load_archive(&mut self, path: &Path) -> Result<()> {
        let file = std::fs::File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)?;
        let prefix = format!("{}/", CONTENT_DIR);

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let Some(relative) = entry.name().strip_prefix(&prefix).map(str::to_string) else {
                continue;
            };
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            self.add_file(&relative, &data);
        }
        Ok(())
    }

    /// Parse one content file. Unparseable files are skipped with a warning.
    fn add_file(&mut self, relative: &str, data: &[u8]) {
        if let Some(stem) = relative.strip_suffix(MESH_SUFFIX) {
            let path = content_asset_path(stem);
            match parse_mesh(&path, data) {
                Ok(mesh) => {
                    self.mesh_files.insert(path.clone(), relative.to_string());
                    self.assets.meshes.insert(path, mesh);
                }
                Err(e) => warn!("Failed to parse mesh {}: {}", path, e),
            }
        } else if let Some(stem) = relative.strip_suffix(MATERIAL_SUFFIX) {
            let path = content_asset_path(stem);
            match serde_json::from_slice::<Material>(data) {
                Ok(mut material) => {
                    material.path = path;
                    self.assets.insert_material(material);
                }
                Err(e) => warn!("Failed to parse material {}: {}", path, e),
            }
        } else if let Some(stem) = relative.strip_suffix(TEXTURE_SUFFIX) {
            let path = content_asset_path(stem);
            match load_texture_from_bytes(data) {
                Ok(texture) => self.assets.insert_texture(Texture::new(path, texture)),
                Err(e) => warn!("Failed to load texture {}: {}", path, e),
            }
        }
    }
}

impl AssetStore for ProjectStore {
    delegate_asset_maps!();

    fn reload_mesh(&mut self, path: &AssetPath) -> Result<()> {
        let relative = self
            .mesh_files
            .get(path)
            .ok_or_else(|| ExporterError::AssetNotFound(path.to_string()))?;
        let data = self.source.read(relative)?;
        let mesh = parse_mesh(path, &data)?;
        self.assets.meshes.insert(path.clone(), mesh);
        debug!("Reloaded {} from disk", path);
        Ok(())
    }
}

/// Asset path for a content-relative file stem.
fn content_asset_path(stem: &str) -> AssetPath {
    AssetPath::new(format!("{}/{}", CONTENT_MOUNT, stem))
}

fn parse_mesh(path: &AssetPath, data: &[u8]) -> Result<StaticMesh> {
    let mut mesh: StaticMesh = serde_json::from_slice(data)?;
    mesh.path = path.clone();
    mesh.validate()?;
    Ok(mesh)
}

/// Collect content-relative paths of all files under `dir`, with `/` separators.
fn collect_files_recursive(base: &Path, dir: &Path, files: &mut Vec<String>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_files_recursive(base, &path, files)?;
        } else if let Ok(relative) = path.strip_prefix(base) {
            files.push(relative.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}
