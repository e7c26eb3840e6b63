//! Mesh Bake Exporter CLI
//!
//! Bake and export static meshes from a project directory or archive.

use clap::{Parser, Subcommand};
use mesh_bake_exporter::notify::{NotifyTarget, DEFAULT_PORT};
use mesh_bake_exporter::{
    open_project, run_pipeline, AssetSelection, AssetStore, ExportSettings, FlattenBaker, LogProgress,
    PipelineOptions, PipelineOutcome,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mesh-bake-exporter")]
#[command(author, version, about = "Bake static meshes and export them for an external importer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bake and export meshes
    Export {
        /// Project directory or ZIP archive
        #[arg(short, long)]
        project: PathBuf,

        /// Mesh asset paths (e.g., "/Game/Props/SM_Crate")
        #[arg(short, long)]
        asset: Vec<String>,

        /// Export every mesh under these folders
        #[arg(short, long)]
        folder: Vec<String>,

        /// With --folder: skip meshes whose name contains this string
        #[arg(long)]
        exclude: Vec<String>,

        /// With --folder: skip this exact mesh path
        #[arg(long)]
        exclude_path: Vec<String>,

        /// Settings JSON (textureSize, enableReadWrite, selectedAssets, canceled)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Baked texture size
        #[arg(long)]
        texture_size: Option<u32>,

        /// Mark exported meshes as read/write enabled
        #[arg(long)]
        read_write: bool,

        /// Export directory (default: <project>/Saved/UnrealToUnityExporter)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not notify the importer
        #[arg(long)]
        no_notify: bool,

        /// Importer port on 127.0.0.1
        #[arg(long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Show information about a project
    Info {
        /// Project directory or ZIP archive
        #[arg(short, long)]
        project: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            project,
            asset,
            folder,
            exclude,
            exclude_path,
            settings,
            texture_size,
            read_write,
            output,
            no_notify,
            port,
        } => {
            let mut store = open_project(&project)?;

            let mut settings = match settings {
                Some(path) => ExportSettings::load(&path)?,
                None => ExportSettings::default(),
            };
            if let Some(size) = texture_size {
                settings.texture_size = size;
            }
            settings.enable_read_write |= read_write;

            let mut selection = AssetSelection::new();
            selection.add_assets(settings.selected_assets.drain(..));
            selection.add_by_path(&store, &asset);
            if !folder.is_empty() {
                selection.add_by_folder(&store, &folder, &exclude, &exclude_path);
            }
            if selection.error_count > 0 {
                log::warn!("{} selection entries did not match a mesh", selection.error_count);
            }
            settings.selected_assets = selection.into_assets();

            let mut options = PipelineOptions::for_project(store.root())
                .with_notification(!no_notify)
                .with_notify_target(NotifyTarget::localhost(port));
            if let Some(output) = output {
                options = options.with_export_root(output);
            }

            let outcome = run_pipeline(
                &mut store,
                &mut FlattenBaker::new(),
                &settings,
                &options,
                &mut LogProgress::default(),
            )?;

            match outcome {
                PipelineOutcome::Canceled => println!("Export canceled"),
                PipelineOutcome::Completed(report) => {
                    println!(
                        "Exported {} meshes and {} materials to {:?}",
                        report.mesh_count, report.material_count, report.export_root
                    );
                    println!("  Import descriptor: {:?}", report.manifest_path);
                    if !report.misses.is_empty() {
                        println!("  {} parameters could not be resolved", report.misses.len());
                    }
                    if !no_notify && !report.notified {
                        println!("  Importer was not reachable on port {}", port);
                    }
                }
            }
        }
        Commands::Info { project } => {
            let store = open_project(&project)?;

            println!("\nProject Info:");
            println!("  Root: {:?}", store.root());
            println!("  Meshes: {}", store.mesh_count());
            println!("  Materials: {}", store.material_count());
            println!("  Textures: {}", store.texture_count());
            for mesh in store.mesh_paths() {
                println!("    {}", mesh);
            }
        }
    }

    Ok(())
}
