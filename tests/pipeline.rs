//! End-to-end runs of the export pipeline against an in-memory store.

use mesh_bake_exporter::bake::BakeConfig;
use mesh_bake_exporter::export::paths::{manifest_path, mesh_relative_path, to_disk_path};
use mesh_bake_exporter::manifest::ResolutionMode;
use mesh_bake_exporter::notify::NotifyTarget;
use mesh_bake_exporter::types::{load_texture_from_bytes, Lod, MaterialSlot, Mesh, Section, Vertex};
use mesh_bake_exporter::{
    load_manifest, run_pipeline, AssetPath, AssetStore, BlendMode, ExportSettings, ExporterError, FlattenBaker,
    LinearColor, Material, MemoryStore, PipelineOptions, PipelineOutcome, PipelineReport, StaticMesh, Texture,
    TextureData,
};
use std::io::Read;
use std::net::TcpListener;
use std::path::Path;

fn quad() -> Mesh {
    let mut mesh = Mesh::new();
    for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
        mesh.add_vertex(Vertex::new([x, y, 0.0], [0.0, 0.0, 1.0], [x, y]));
    }
    mesh.add_quad(0, 1, 2, 3);
    mesh
}

/// A mesh with one LOD and one section per material slot.
fn static_mesh(path: &str, materials: &[&str]) -> StaticMesh {
    let mut mesh = StaticMesh::new(path).with_lod(Lod {
        sections: (0..materials.len()).map(|i| Section::new(i, quad())).collect(),
    });
    for (i, material) in materials.iter().enumerate() {
        mesh = mesh.with_material(MaterialSlot::new(format!("Slot{}", i), *material));
    }
    mesh
}

fn project() -> MemoryStore {
    MemoryStore::new()
        .with_mesh(static_mesh("/Game/Level/SM_Wall", &["/Game/Materials/M_Brick"]))
        .with_mesh(static_mesh("/Game/Level/SM_Pillar", &["/Game/Materials/M_Brick", "/Game/Materials/M_Metal"]))
        .with_mesh(StaticMesh::new("/Game/Level/SM_Empty").with_material(MaterialSlot::new("Slot0", "/Game/Materials/M_Metal")))
        .with_material(
            Material::new("/Game/Materials/M_Brick")
                .with_blend_mode(BlendMode::Masked)
                .with_texture("BaseColor", "/Game/Textures/T_Brick")
                .with_scalar("RoughnessConst", 0.9)
                .with_vector("EmissiveColorConst", LinearColor::BLACK),
        )
        .with_material(
            Material::new("/Game/Materials/M_Metal")
                .with_vector("BaseColorConst", LinearColor::new(0.8, 0.8, 0.8, 1.0))
                .with_scalar("MetallicConst", 1.0),
        )
        .with_texture(Texture::new("/Game/Textures/T_Brick", TextureData::solid(4, 4, [150, 60, 40, 255])))
}

fn options(root: &Path) -> PipelineOptions {
    PipelineOptions::default()
        .with_export_root(root)
        .with_notification(false)
}

fn completed(outcome: PipelineOutcome) -> PipelineReport {
    match outcome {
        PipelineOutcome::Completed(report) => report,
        PipelineOutcome::Canceled => panic!("pipeline was canceled"),
    }
}

fn snapshot(store: &MemoryStore, meshes: &[&str]) -> Vec<StaticMesh> {
    meshes
        .iter()
        .map(|path| store.mesh(&AssetPath::new(path)).unwrap().clone())
        .collect()
}

fn closed_port() -> u16 {
    TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

#[test]
fn single_mesh_exports_one_material_with_textures() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = project();
    let settings = ExportSettings::new(vec![AssetPath::new("/Game/Level/SM_Wall")])
        .with_texture_size(1024)
        .with_read_write(true);

    let report = completed(
        run_pipeline(&mut store, &mut FlattenBaker::new(), &settings, &options(dir.path()), &mut ()).unwrap(),
    );
    assert_eq!(report.mesh_count, 1);
    assert_eq!(report.material_count, 1);
    assert!(report.misses.is_empty());

    let manifest = load_manifest(&manifest_path(dir.path())).unwrap();
    assert_eq!(manifest.export_directory, dir.path().to_string_lossy());
    assert_eq!(manifest.mesh_descriptors.len(), 1);
    assert_eq!(manifest.mesh_descriptors[0].mesh_path, "Models/Game/Level/SM_Wall.glb");
    assert!(manifest.mesh_descriptors[0].enable_read_write);

    let material = &manifest.material_descriptors[0];
    assert!(material.material_path.starts_with("Materials/Game/Materials/M_Brick_"));
    assert_eq!(material.blend_mode, BlendMode::Masked);

    let base_color = material.texture_descriptor("BaseColor").unwrap();
    assert_eq!(base_color.mode(), Some(ResolutionMode::Texture));
    assert!(base_color.texture_path.starts_with("Textures/Game/Materials/M_Brick_"));
    let png = std::fs::read(to_disk_path(dir.path(), &base_color.texture_path)).unwrap();
    let baked = load_texture_from_bytes(&png).unwrap();
    assert_eq!((baked.width, baked.height), (1024, 1024));
    assert_eq!(baked.get_pixel(512, 512), [150, 60, 40, 255]);

    let roughness = material.texture_descriptor("Roughness").unwrap();
    assert_eq!(roughness.mode(), Some(ResolutionMode::Scalar));
    assert_eq!(roughness.scalar, 0.9);
    assert_eq!(
        material.texture_descriptor("EmissiveColor").unwrap().mode(),
        Some(ResolutionMode::Color)
    );
    assert!(material.texture_descriptor("Metallic").is_none());
    assert!(material.texture_descriptor("Normal").is_none());
}

#[test]
fn shared_material_yields_one_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = project();
    let settings = ExportSettings::new(vec![
        AssetPath::new("/Game/Level/SM_Wall"),
        AssetPath::new("/Game/Level/SM_Pillar"),
    ])
    .with_texture_size(32);

    completed(run_pipeline(&mut store, &mut FlattenBaker::new(), &settings, &options(dir.path()), &mut ()).unwrap());

    let manifest = load_manifest(&manifest_path(dir.path())).unwrap();
    assert_eq!(manifest.mesh_descriptors.len(), 2);
    assert_eq!(manifest.material_descriptors.len(), 2);
    let bricks = manifest
        .material_descriptors
        .iter()
        .filter(|m| m.material_path.contains("M_Brick_"))
        .count();
    assert_eq!(bricks, 1);

    let metal = manifest
        .material_descriptors
        .iter()
        .find(|m| m.material_path.contains("M_Metal_"))
        .unwrap();
    let base_color = metal.texture_descriptor("BaseColor").unwrap();
    assert_eq!(base_color.mode(), Some(ResolutionMode::Color));
    assert_eq!(base_color.color, LinearColor::new(0.8, 0.8, 0.8, 1.0));
    assert_eq!(metal.texture_descriptor("Metallic").unwrap().mode(), Some(ResolutionMode::Scalar));
}

#[test]
fn canceled_run_writes_nothing_and_sends_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("export");
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut store = project();
    let before = snapshot(&store, &["/Game/Level/SM_Wall"]);
    let mut settings = ExportSettings::new(vec![AssetPath::new("/Game/Level/SM_Wall")]);
    settings.canceled = true;
    let options = options(&root)
        .with_notification(true)
        .with_notify_target(NotifyTarget::localhost(port));

    let outcome = run_pipeline(&mut store, &mut FlattenBaker::new(), &settings, &options, &mut ()).unwrap();

    assert_eq!(outcome, PipelineOutcome::Canceled);
    assert!(!root.exists());
    assert!(listener.accept().is_err());
    assert_eq!(snapshot(&store, &["/Game/Level/SM_Wall"]), before);
}

#[test]
fn unreachable_importer_still_leaves_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = project();
    let settings = ExportSettings::new(vec![AssetPath::new("/Game/Level/SM_Wall")]).with_texture_size(16);
    let options = options(dir.path())
        .with_notification(true)
        .with_notify_target(NotifyTarget::localhost(closed_port()));

    let report = completed(run_pipeline(&mut store, &mut FlattenBaker::new(), &settings, &options, &mut ()).unwrap());

    assert!(!report.notified);
    assert_eq!(report.manifest_path, manifest_path(dir.path()));
    assert!(report.manifest_path.is_file());
}

#[test]
fn reachable_importer_receives_manifest_path() {
    let dir = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let receiver = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut message = String::new();
        stream.read_to_string(&mut message).unwrap();
        message
    });

    let mut store = project();
    let settings = ExportSettings::new(vec![AssetPath::new("/Game/Level/SM_Wall")]).with_texture_size(16);
    let options = options(dir.path())
        .with_notification(true)
        .with_notify_target(NotifyTarget::localhost(port));

    let report = completed(run_pipeline(&mut store, &mut FlattenBaker::new(), &settings, &options, &mut ()).unwrap());

    assert!(report.notified);
    assert_eq!(
        receiver.join().unwrap(),
        format!("unrealToUnityImporter?ImportDescriptorPath={}", report.manifest_path.display())
    );
}

#[test]
fn export_paths_are_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let settings = ExportSettings::new(vec![
        AssetPath::new("/Game/Level/SM_Pillar"),
        AssetPath::new("/Game/Level/SM_Wall"),
    ])
    .with_texture_size(8);

    let mut first_store = project();
    completed(run_pipeline(&mut first_store, &mut FlattenBaker::new(), &settings, &options(dir.path()), &mut ()).unwrap());
    let first = load_manifest(&manifest_path(dir.path())).unwrap();

    let mut second_store = project();
    completed(run_pipeline(&mut second_store, &mut FlattenBaker::new(), &settings, &options(dir.path()), &mut ()).unwrap());
    let second = load_manifest(&manifest_path(dir.path())).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        mesh_relative_path(&AssetPath::new("/Game/Level/SM_Wall")),
        mesh_relative_path(&AssetPath::new("/Game/Level/SM_Wall"))
    );
}

#[test]
fn store_is_restored_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let meshes = ["/Game/Level/SM_Wall", "/Game/Level/SM_Pillar"];
    let mut store = project();
    let before = snapshot(&store, &meshes);
    let materials_before = store.material_paths();
    let textures_before = store.texture_paths();
    let settings = ExportSettings::new(meshes.iter().map(|p| AssetPath::new(p)).collect()).with_texture_size(8);

    let report = completed(
        run_pipeline(&mut store, &mut FlattenBaker::new(), &settings, &options(dir.path()), &mut ()).unwrap(),
    );

    assert_eq!(report.revert.meshes_restored, 2);
    assert!(report.revert.materials_discarded >= 2);
    assert_eq!(snapshot(&store, &meshes), before);
    assert_eq!(store.material_paths(), materials_before);
    assert_eq!(store.texture_paths(), textures_before);
}

#[test]
fn store_is_restored_after_bake_failure() {
    let dir = tempfile::tempdir().unwrap();
    let meshes = ["/Game/Level/SM_Wall", "/Game/Level/SM_Pillar"];
    let mut store = project();
    let before = snapshot(&store, &meshes);
    let materials_before = store.material_paths();

    let mut flatten = FlattenBaker::new();
    let mut baked = 0;
    let mut flaky = |store: &mut dyn AssetStore, mesh: &AssetPath, config: &BakeConfig| {
        baked += 1;
        if baked > 1 {
            return Err(ExporterError::Bake {
                mesh: mesh.to_string(),
                reason: "renderer lost".to_string(),
            });
        }
        mesh_bake_exporter::MaterialBaker::bake(&mut flatten, store, mesh, config)
    };
    let settings = ExportSettings::new(meshes.iter().map(|p| AssetPath::new(p)).collect()).with_texture_size(8);

    let result = run_pipeline(&mut store, &mut flaky, &settings, &options(dir.path()), &mut ());

    assert!(matches!(result, Err(ExporterError::Bake { .. })));
    assert_eq!(snapshot(&store, &meshes), before);
    assert_eq!(store.material_paths(), materials_before);
    assert!(!manifest_path(dir.path()).exists());
}

#[test]
fn non_mesh_entries_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = project();
    let settings = ExportSettings::new(vec![
        AssetPath::new("/Game/Level/SM_Wall"),
        AssetPath::new("/Game/Materials/M_Brick"),
        AssetPath::new("/Game/Level/SM_Gone"),
    ])
    .with_texture_size(8);

    let report = completed(
        run_pipeline(&mut store, &mut FlattenBaker::new(), &settings, &options(dir.path()), &mut ()).unwrap(),
    );

    assert_eq!(report.mesh_count, 1);
    assert_eq!(report.material_count, 1);
    let manifest = load_manifest(&report.manifest_path).unwrap();
    assert_eq!(manifest.mesh_descriptors.len(), 1);
    assert!(manifest.mesh_descriptors[0].mesh_path.contains("SM_Wall"));
}

#[test]
fn selection_without_meshes_fails_before_any_mutation() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = project();
    let materials_before = store.material_paths();
    let settings = ExportSettings::new(vec![
        AssetPath::new("/Game/Materials/M_Brick"),
        AssetPath::new("/Game/Level/SM_Gone"),
    ]);

    let result = run_pipeline(&mut store, &mut FlattenBaker::new(), &settings, &options(dir.path()), &mut ());

    assert!(matches!(result, Err(ExporterError::EmptySelection)));
    assert_eq!(store.material_paths(), materials_before);
    assert!(!manifest_path(dir.path()).exists());
}

#[test]
fn empty_selection_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = project();
    let result = run_pipeline(
        &mut store,
        &mut FlattenBaker::new(),
        &ExportSettings::default(),
        &options(dir.path()),
        &mut (),
    );
    assert!(matches!(result, Err(ExporterError::EmptySelection)));
}

#[test]
fn manifest_only_references_written_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = project();
    let settings = ExportSettings::new(vec![
        AssetPath::new("/Game/Level/SM_Wall"),
        AssetPath::new("/Game/Level/SM_Pillar"),
        AssetPath::new("/Game/Level/SM_Empty"),
    ])
    .with_texture_size(8);

    let report = completed(
        run_pipeline(&mut store, &mut FlattenBaker::new(), &settings, &options(dir.path()), &mut ()).unwrap(),
    );
    let manifest = load_manifest(&report.manifest_path).unwrap();

    // The empty mesh is skipped rather than described.
    assert_eq!(manifest.mesh_descriptors.len(), 2);
    assert!(manifest.missing_files().is_empty());
}
