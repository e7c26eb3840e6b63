//! The bake, export, describe and notify pipeline.
//!
//! ```text
//! settings ─► bake (in place) ─► export meshes ─► resolve materials ─► revert ─► save manifest ─► notify
//!             └──────────── inside BakeTransaction ───────────────┘
//! ```
//!
//! Everything between opening the transaction and reverting it reads the
//! mutated store. The revert runs on every exit path out of that window, and
//! errors from the window are returned only after it.

use crate::bake::{bake_meshes, BakeTransaction, MaterialBaker, MaterialProperty, RevertReport};
use crate::config::{ExportSettings, PipelineOptions};
use crate::error::{ExporterError, Result};
use crate::export::export_meshes;
use crate::manifest::{save_manifest, ImportDescriptor};
use crate::notify::notify_importer;
use crate::resolver::{resolve_material, NamingTable, ResolutionMiss};
use crate::store::AssetStore;
use crate::types::AssetPath;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// Number of progress frames reported by [`run_pipeline`].
pub const PROGRESS_FRAMES: usize = 5;

/// Receives coarse progress updates.
pub trait ProgressSink {
    /// A new stage of `amount` work units begins.
    fn enter_frame(&mut self, amount: f32, message: &str);
}

impl ProgressSink for () {
    fn enter_frame(&mut self, _amount: f32, _message: &str) {}
}

/// Logs each stage with a running fraction.
#[derive(Debug, Clone)]
pub struct LogProgress {
    total: f32,
    done: f32,
}

impl LogProgress {
    pub fn new(total: f32) -> Self {
        Self { total, done: 0.0 }
    }

    pub fn fraction(&self) -> f32 {
        if self.total <= 0.0 {
            return 1.0;
        }
        (self.done / self.total).min(1.0)
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(PROGRESS_FRAMES as f32)
    }
}

impl ProgressSink for LogProgress {
    fn enter_frame(&mut self, amount: f32, message: &str) {
        info!("[{:>3.0}%] {}", self.fraction() * 100.0, message);
        self.done += amount;
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub export_root: PathBuf,
    pub manifest_path: PathBuf,
    pub mesh_count: usize,
    pub material_count: usize,
    pub misses: Vec<ResolutionMiss>,
    pub revert: RevertReport,
    /// Whether the importer accepted the notification.
    pub notified: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// Settings were canceled; nothing was touched.
    Canceled,
    Completed(PipelineReport),
}

impl PipelineOutcome {
    pub fn report(&self) -> Option<&PipelineReport> {
        match self {
            PipelineOutcome::Completed(report) => Some(report),
            PipelineOutcome::Canceled => None,
        }
    }
}

/// Output of the mutation window.
struct Staged {
    descriptor: ImportDescriptor,
    misses: Vec<ResolutionMiss>,
}

/// Run the whole pipeline over `settings.selected_assets`.
///
/// Selected entries that are not static meshes are skipped. Cancellation
/// and precondition failures return before any asset is touched. Bake or
/// export failures are returned after the store has been reverted.
/// Notification failures are logged and reflected in
/// [`PipelineReport::notified`] only.
pub fn run_pipeline(
    store: &mut dyn AssetStore,
    baker: &mut dyn MaterialBaker,
    settings: &ExportSettings,
    options: &PipelineOptions,
    progress: &mut dyn ProgressSink,
) -> Result<PipelineOutcome> {
    if settings.canceled {
        info!("Export canceled");
        return Ok(PipelineOutcome::Canceled);
    }
    settings.validate()?;
    let naming = NamingTable::new(&MaterialProperty::ALL)?;
    let export_root = options.absolute_export_root()?;

    let meshes = selected_meshes(store, &settings.selected_assets)?;

    std::fs::create_dir_all(&export_root)?;
    info!("Exporting {} meshes to {:?}", meshes.len(), export_root);

    let mut transaction = BakeTransaction::begin(store, &meshes)?;
    let staged = stage(
        transaction.store_mut(),
        baker,
        settings,
        &meshes,
        &naming,
        &export_root,
        progress,
    );

    progress.enter_frame(1.0, "Reverting baked assets");
    let reverted = transaction.revert();
    let Staged { descriptor, misses } = staged?;
    let revert = reverted?;

    progress.enter_frame(1.0, "Saving import descriptor");
    let manifest_path = save_manifest(&descriptor, &export_root)?;

    let notified = options.send_notification && notify_importer(&options.notify, &manifest_path);

    Ok(PipelineOutcome::Completed(PipelineReport {
        export_root,
        manifest_path,
        mesh_count: descriptor.mesh_descriptors.len(),
        material_count: descriptor.material_descriptors.len(),
        misses,
        revert,
        notified,
    }))
}

/// Keep the static meshes of a selection, first occurrence wins.
///
/// Other entries are skipped with a warning. Nothing left is an error.
fn selected_meshes(store: &dyn AssetStore, selection: &[AssetPath]) -> Result<Vec<AssetPath>> {
    let mut meshes: Vec<AssetPath> = Vec::with_capacity(selection.len());
    for path in selection {
        if store.mesh(path).is_none() {
            warn!("Skipping {}: not a static mesh", path);
            continue;
        }
        if !meshes.contains(path) {
            meshes.push(path.clone());
        }
    }
    if meshes.is_empty() {
        return Err(ExporterError::EmptySelection);
    }
    Ok(meshes)
}

/// Bake, export and describe while the store holds baked state.
fn stage(
    store: &mut dyn AssetStore,
    baker: &mut dyn MaterialBaker,
    settings: &ExportSettings,
    meshes: &[AssetPath],
    naming: &NamingTable,
    export_root: &Path,
    progress: &mut dyn ProgressSink,
) -> Result<Staged> {
    progress.enter_frame(1.0, "Baking materials");
    let table = bake_meshes(store, baker, meshes, settings.texture_size)?;

    progress.enter_frame(1.0, "Exporting meshes");
    let mut descriptor = ImportDescriptor::new(export_root);
    descriptor.mesh_descriptors = export_meshes(store, meshes, export_root, settings.enable_read_write);

    progress.enter_frame(1.0, "Exporting materials");
    let mut misses = Vec::new();
    for baked in table.iter() {
        let resolution = resolve_material(store, baked, naming, export_root);
        misses.extend(resolution.misses);
        descriptor.material_descriptors.push(resolution.descriptor);
    }

    Ok(Staged { descriptor, misses })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl ProgressSink for Recorder {
        fn enter_frame(&mut self, _amount: f32, message: &str) {
            self.0.push(message.to_string());
        }
    }

    #[test]
    fn test_log_progress_fraction() {
        let mut progress = LogProgress::new(4.0);
        progress.enter_frame(1.0, "one");
        progress.enter_frame(2.0, "two");
        assert_eq!(progress.fraction(), 0.75);
        progress.enter_frame(5.0, "overflow");
        assert_eq!(progress.fraction(), 1.0);
    }

    #[test]
    fn test_canceled_reports_nothing() {
        let mut store = crate::store::MemoryStore::new();
        let mut baker = crate::bake::FlattenBaker::new();
        let mut recorder = Recorder::default();
        let outcome = run_pipeline(
            &mut store,
            &mut baker,
            &ExportSettings::canceled(),
            &PipelineOptions::default(),
            &mut recorder,
        )
        .unwrap();
        assert_eq!(outcome, PipelineOutcome::Canceled);
        assert!(outcome.report().is_none());
        assert!(recorder.0.is_empty());
    }
}
