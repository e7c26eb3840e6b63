//! Export settings and pipeline options.

use crate::error::{ExporterError, Result};
use crate::notify::NotifyTarget;
use crate::types::AssetPath;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TEXTURE_SIZE: u32 = 2048;
/// Largest accepted baked texture edge.
pub const MAX_TEXTURE_SIZE: u32 = 8192;
/// Export root relative to the project directory.
pub const DEFAULT_EXPORT_DIR: &str = "Saved/UnrealToUnityExporter";

/// User choices for one export run.
///
/// The pipeline takes a snapshot of this and never mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportSettings {
    /// Edge length of baked textures.
    pub texture_size: u32,
    /// Copied into every mesh descriptor.
    pub enable_read_write: bool,
    /// Meshes to export, in order.
    pub selected_assets: Vec<AssetPath>,
    /// The user backed out; the pipeline does nothing.
    pub canceled: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            texture_size: DEFAULT_TEXTURE_SIZE,
            enable_read_write: false,
            selected_assets: Vec::new(),
            canceled: false,
        }
    }
}

impl ExportSettings {
    pub fn new(selected_assets: Vec<AssetPath>) -> Self {
        Self {
            selected_assets,
            ..Default::default()
        }
    }

    pub fn with_texture_size(mut self, texture_size: u32) -> Self {
        self.texture_size = texture_size;
        self
    }

    pub fn with_read_write(mut self, enable_read_write: bool) -> Self {
        self.enable_read_write = enable_read_write;
        self
    }

    pub fn canceled() -> Self {
        Self {
            canceled: true,
            ..Default::default()
        }
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.texture_size == 0 {
            return Err(ExporterError::InvalidSettings(
                "texture size must be positive".to_string(),
            ));
        }
        if self.texture_size > MAX_TEXTURE_SIZE {
            return Err(ExporterError::InvalidSettings(format!(
                "texture size {} exceeds {}",
                self.texture_size, MAX_TEXTURE_SIZE
            )));
        }
        if self.selected_assets.is_empty() {
            return Err(ExporterError::EmptySelection);
        }
        Ok(())
    }
}

/// Where and how the pipeline delivers its output.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Export root; relative paths resolve against the working directory.
    pub export_root: PathBuf,
    pub notify: NotifyTarget,
    /// Send the import command after the manifest is saved.
    pub send_notification: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            export_root: PathBuf::from(DEFAULT_EXPORT_DIR),
            notify: NotifyTarget::default(),
            send_notification: true,
        }
    }
}

impl PipelineOptions {
    /// Options exporting to `<project>/Saved/UnrealToUnityExporter`.
    pub fn for_project(project_root: &Path) -> Self {
        Self {
            export_root: project_root.join(DEFAULT_EXPORT_DIR),
            ..Default::default()
        }
    }

    pub fn with_export_root(mut self, export_root: impl Into<PathBuf>) -> Self {
        self.export_root = export_root.into();
        self
    }

    pub fn with_notify_target(mut self, notify: NotifyTarget) -> Self {
        self.notify = notify;
        self
    }

    pub fn with_notification(mut self, send_notification: bool) -> Self {
        self.send_notification = send_notification;
        self
    }

    /// The export root as an absolute path.
    pub fn absolute_export_root(&self) -> Result<PathBuf> {
        if self.export_root.is_absolute() {
            Ok(self.export_root.clone())
        } else {
            Ok(std::env::current_dir()?.join(&self.export_root))
        }
    }
}
