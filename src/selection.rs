//! Building the list of meshes to export.
//!
//! Assets can be picked directly, looked up by path, or collected from
//! folders with exclusions. The resulting list is unique and keeps insertion
//! order; it becomes [`ExportSettings::selected_assets`](crate::ExportSettings).

use crate::store::AssetStore;
use crate::types::AssetPath;
use log::{debug, warn};

/// An ordered, duplicate-free set of mesh paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetSelection {
    assets: Vec<AssetPath>,
    /// Lookups that matched nothing.
    pub error_count: usize,
}

impl AssetSelection {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, path: AssetPath) -> bool {
        if self.assets.contains(&path) {
            return false;
        }
        self.assets.push(path);
        true
    }

    /// Add already-chosen assets.
    pub fn add_assets<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<AssetPath>,
    {
        let mut added = 0;
        for path in paths {
            if self.push(path.into()) {
                added += 1;
            }
        }
        added
    }

    /// Add assets by path, keeping only those that are meshes in `store`.
    pub fn add_by_path<S: AsRef<str>>(&mut self, store: &dyn AssetStore, paths: &[S]) -> usize {
        let mut added = 0;
        for raw in paths {
            let path = AssetPath::new(raw.as_ref());
            if store.mesh(&path).is_none() {
                warn!("No static mesh at {}", path);
                self.error_count += 1;
                continue;
            }
            if self.push(path) {
                added += 1;
            }
        }
        added
    }

    /// Add every mesh under `folders`, minus exclusions.
    ///
    /// `exclude_paths` drop exact assets; each one that matches no collected
    /// asset counts as an error. `exclude_strings` drop assets whose name
    /// contains any of them.
    pub fn add_by_folder<S: AsRef<str>>(
        &mut self,
        store: &dyn AssetStore,
        folders: &[S],
        exclude_strings: &[S],
        exclude_paths: &[S],
    ) -> usize {
        let mut found: Vec<AssetPath> = store
            .mesh_paths()
            .into_iter()
            .filter(|mesh| folders.iter().any(|folder| mesh.is_under(folder.as_ref())))
            .collect();

        for raw in exclude_paths {
            let excluded = AssetPath::new(raw.as_ref());
            let before = found.len();
            found.retain(|mesh| *mesh != excluded);
            if found.len() == before {
                warn!("Excluded path {} is not among the collected meshes", excluded);
                self.error_count += 1;
            }
        }

        found.retain(|mesh| {
            !exclude_strings
                .iter()
                .map(AsRef::as_ref)
                .filter(|needle| !needle.is_empty())
                .any(|needle| mesh.name().contains(needle))
        });

        let added = found.into_iter().filter(|mesh| self.push(mesh.clone())).count();
        debug!("Collected {} meshes from {} folders", added, folders.len());
        added
    }

    pub fn assets(&self) -> &[AssetPath] {
        &self.assets
    }

    pub fn into_assets(self) -> Vec<AssetPath> {
        self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
