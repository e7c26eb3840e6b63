//! # Mesh Bake Exporter
//!
//! A Rust library for handing static meshes from an engine project to an
//! external importer.
//!
//! ## Overview
//!
//! The pipeline bakes every selected mesh's materials into a fixed set of
//! flat maps, deduplicates the baked materials across meshes, writes meshes
//! (GLB) and texture-mode maps (PNG) under a deterministic layout, describes
//! the bundle in `ImportDescriptor.txt`, reverts the in-place bake and finally
//! pings the importer over a loopback TCP socket.
//!
//! ## Quick Start
//!
//! ```ignore
//! use mesh_bake_exporter::{
//!     run_pipeline, AssetPath, ExportSettings, FlattenBaker, LogProgress, PipelineOptions, ProjectStore,
//! };
//!
//! let mut store = ProjectStore::open("path/to/Project")?;
//! let settings = ExportSettings::new(vec![AssetPath::new("/Game/Props/SM_Crate")]).with_texture_size(1024);
//! let options = PipelineOptions::for_project(store.root());
//!
//! let outcome = run_pipeline(
//!     &mut store,
//!     &mut FlattenBaker::new(),
//!     &settings,
//!     &options,
//!     &mut LogProgress::default(),
//! )?;
//! ```
//!
//! ## Engine Integration
//!
//! Implement [`AssetStore`] over the host engine's assets and
//! [`MaterialBaker`] over its baking facility. Any
//! `FnMut(&mut dyn AssetStore, &AssetPath, &BakeConfig) -> Result<()>` is a
//! baker, which keeps test doubles short.

pub mod bake;
pub mod config;
pub mod error;
pub mod export;
pub mod manifest;
pub mod notify;
pub mod pipeline;
pub mod resolver;
pub mod selection;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use bake::{BakeConfig, BakeTransaction, BakedMaterial, FlattenBaker, MaterialBaker, MaterialProperty, MaterialTable};
pub use config::{ExportSettings, PipelineOptions};
pub use error::{ExporterError, Result};
pub use manifest::{load_manifest, ImportDescriptor, MaterialDescriptor, MeshDescriptor, TextureDescriptor};
pub use notify::NotifyTarget;
pub use pipeline::{run_pipeline, LogProgress, PipelineOutcome, PipelineReport, ProgressSink};
pub use resolver::{NamingTable, ResolutionMiss};
pub use selection::AssetSelection;
pub use store::{AssetStore, MemoryStore, ProjectStore};
pub use types::{AssetPath, BlendMode, LinearColor, Material, StaticMesh, Texture, TextureData};

/// Open a project from a directory or ZIP archive.
pub fn open_project<P: AsRef<std::path::Path>>(path: P) -> Result<ProjectStore> {
    ProjectStore::open(path)
}
