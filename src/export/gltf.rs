//! glTF/GLB export of static meshes.

use crate::error::{ExporterError, Result};
use crate::types::{BlendMode, Mesh, StaticMesh};
use glam::Vec3;
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;
use std::collections::BTreeMap;

/// Name and blend mode of the material bound to one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotMaterial {
    pub name: String,
    pub blend_mode: BlendMode,
}

/// Export a static mesh to GLB (binary glTF).
///
/// Every LOD becomes its own glTF mesh and node (`<name>_LOD<n>`), every
/// section one primitive. Slots become untextured glTF materials carrying
/// the bound material's name and alpha mode; textures travel separately.
pub fn export_glb(mesh: &StaticMesh, slots: &[SlotMaterial]) -> Result<Vec<u8>> {
    if !mesh.has_geometry() {
        return Err(ExporterError::Export(format!("Cannot export empty mesh {}", mesh.path)));
    }

    let mut buffer_data: Vec<u8> = Vec::new();
    let mut buffer_views = Vec::new();
    let mut accessors = Vec::new();
    let mut meshes = Vec::new();
    let mut nodes = Vec::new();

    for (lod_index, lod) in mesh.lods.iter().enumerate() {
        let mut primitives = Vec::new();

        for section in lod.sections.iter().filter(|s| !s.geometry.is_empty()) {
            if section.material_index >= slots.len() {
                return Err(ExporterError::Export(format!(
                    "{} LOD {} references slot {} but only {} slots were provided",
                    mesh.path,
                    lod_index,
                    section.material_index,
                    slots.len()
                )));
            }
            primitives.push(add_section_primitive(
                &section.geometry,
                section.material_index as u32,
                &mut buffer_data,
                &mut buffer_views,
                &mut accessors,
            ));
        }

        if primitives.is_empty() {
            continue;
        }

        let mesh_index = meshes.len() as u32;
        meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(format!("{}_LOD{}", mesh.path.name(), lod_index)),
            primitives,
            weights: None,
        });
        nodes.push(json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(json::Index::new(mesh_index)),
            name: Some(format!("{}_LOD{}", mesh.path.name(), lod_index)),
            rotation: None,
            scale: None,
            translation: None,
            skin: None,
            weights: None,
        });
    }

    let materials = slots.iter().map(create_material).collect();
    let scene_nodes = (0..nodes.len() as u32).map(json::Index::new).collect();

    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(buffer_data.len() as u64),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        }],
        buffer_views,
        materials,
        meshes,
        nodes,
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(mesh.path.name().to_string()),
            nodes: scene_nodes,
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| ExporterError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;

    Ok(assemble_glb(json_string.as_bytes(), &buffer_data))
}

/// Append one section's vertex streams and indices, returning its primitive.
fn add_section_primitive(
    geometry: &Mesh,
    material: u32,
    buffer: &mut Vec<u8>,
    buffer_views: &mut Vec<json::buffer::View>,
    accessors: &mut Vec<json::Accessor>,
) -> json::mesh::Primitive {
    let vertex_count = geometry.vertex_count();
    let (min, max) = calculate_bounds(geometry);

    let streams: [(Vec<f32>, json::accessor::Type); 4] = [
        (geometry.positions_flat(), json::accessor::Type::Vec3),
        (geometry.normals_flat(), json::accessor::Type::Vec3),
        (geometry.uvs_flat(), json::accessor::Type::Vec2),
        (geometry.colors_flat(), json::accessor::Type::Vec4),
    ];

    let accessor_start = accessors.len() as u32;
    for (i, (data, type_)) in streams.into_iter().enumerate() {
        let offset = buffer.len();
        buffer.extend(data.iter().flat_map(|v| v.to_le_bytes()));
        let view = push_view(buffer_views, offset, buffer.len() - offset, json::buffer::Target::ArrayBuffer);
        let bounds = if i == 0 { Some((min, max)) } else { None };
        accessors.push(create_accessor(
            view,
            vertex_count,
            type_,
            json::accessor::ComponentType::F32,
            bounds,
        ));
    }

    let offset = buffer.len();
    buffer.extend(geometry.indices.iter().flat_map(|i| i.to_le_bytes()));
    let view = push_view(
        buffer_views,
        offset,
        buffer.len() - offset,
        json::buffer::Target::ElementArrayBuffer,
    );
    accessors.push(create_accessor(
        view,
        geometry.indices.len(),
        json::accessor::Type::Scalar,
        json::accessor::ComponentType::U32,
        None,
    ));

    create_primitive(accessor_start, accessor_start + 4, material)
}

/// Wrap JSON and binary chunks into a GLB container.
fn assemble_glb(json_bytes: &[u8], buffer_data: &[u8]) -> Vec<u8> {
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;

    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    let total_size = 12 + // GLB header
        8 + padded_json_len + // JSON chunk
        8 + padded_buffer_len; // BIN chunk

    let mut glb = Vec::with_capacity(total_size);

    // GLB Header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    // JSON Chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat(0x20u8).take(json_padding));

    // BIN Chunk
    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes());
    glb.extend_from_slice(buffer_data);
    glb.extend(std::iter::repeat(0u8).take(buffer_padding));

    glb
}

/// Bounding box of a section's positions.
fn calculate_bounds(geometry: &Mesh) -> ([f32; 3], [f32; 3]) {
    let mut positions = geometry.vertices.iter().map(|v| Vec3::from_array(v.position));
    let Some(first) = positions.next() else {
        return ([0.0; 3], [0.0; 3]);
    };
    let (min, max) = positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
    (min.to_array(), max.to_array())
}

/// Push a buffer view and return its index.
fn push_view(
    buffer_views: &mut Vec<json::buffer::View>,
    offset: usize,
    size: usize,
    target: json::buffer::Target,
) -> u32 {
    buffer_views.push(json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        target: Some(Valid(target)),
    });
    (buffer_views.len() - 1) as u32
}

/// Create an accessor.
fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    bounds: Option<([f32; 3], [f32; 3])>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: bounds.map(|(min, _)| json::Value::from(min.to_vec())),
        max: bounds.map(|(_, max)| json::Value::from(max.to_vec())),
        name: None,
        normalized: false,
        sparse: None,
    }
}

/// Create a primitive whose four vertex streams start at `positions_accessor`.
fn create_primitive(positions_accessor: u32, indices_accessor: u32, material: u32) -> json::mesh::Primitive {
    let mut attributes = BTreeMap::new();
    attributes.insert(Valid(json::mesh::Semantic::Positions), json::Index::new(positions_accessor));
    attributes.insert(Valid(json::mesh::Semantic::Normals), json::Index::new(positions_accessor + 1));
    attributes.insert(Valid(json::mesh::Semantic::TexCoords(0)), json::Index::new(positions_accessor + 2));
    attributes.insert(Valid(json::mesh::Semantic::Colors(0)), json::Index::new(positions_accessor + 3));

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(indices_accessor)),
        material: Some(json::Index::new(material)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

/// Untextured material for a slot.
fn create_material(slot: &SlotMaterial) -> json::Material {
    let (alpha_mode, alpha_cutoff) = match slot.blend_mode {
        BlendMode::Opaque => (json::material::AlphaMode::Opaque, None),
        BlendMode::Masked => (
            json::material::AlphaMode::Mask,
            Some(json::material::AlphaCutoff(0.5)),
        ),
        _ => (json::material::AlphaMode::Blend, None),
    };

    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: None,
            base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, 1.0]),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(alpha_mode),
        alpha_cutoff,
        double_sided: false,
        name: Some(slot.name.clone()),
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Lod, MaterialSlot, Section, Vertex};

    fn triangle(offset: f32) -> Mesh {
        let mut mesh = Mesh::new();
        let v0 = mesh.add_vertex(Vertex::new([offset, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0]));
        let v1 = mesh.add_vertex(Vertex::new([offset + 1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]));
        let v2 = mesh.add_vertex(Vertex::new([offset, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 1.0]));
        mesh.add_triangle(v0, v1, v2);
        mesh
    }

    fn slot(name: &str, blend_mode: BlendMode) -> SlotMaterial {
        SlotMaterial {
            name: name.to_string(),
            blend_mode,
        }
    }

    /// Parse the JSON chunk back out of a GLB.
    fn json_chunk(glb: &[u8]) -> serde_json::Value {
        let len = u32::from_le_bytes([glb[12], glb[13], glb[14], glb[15]]) as usize;
        serde_json::from_slice(&glb[20..20 + len]).unwrap()
    }

    #[test]
    fn test_export_single_section() {
        let mesh = StaticMesh::new("/Game/SM_Tri")
            .with_material(MaterialSlot::new("Body", "/Transient/M_A"))
            .with_lod(Lod {
                sections: vec![Section::new(0, triangle(0.0))],
            });

        let glb = export_glb(&mesh, &[slot("M_A_baked", BlendMode::Opaque)]).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([glb[4], glb[5], glb[6], glb[7]]), 2);
        assert_eq!(u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize, glb.len());
        assert_eq!(glb.len() % 4, 0);

        let json = json_chunk(&glb);
        assert_eq!(json["materials"][0]["name"], "M_A_baked");
        assert_eq!(json["meshes"][0]["name"], "SM_Tri_LOD0");
        assert_eq!(json["accessors"][0]["max"][0], 1.0);
    }

    #[test]
    fn test_export_lods_and_alpha_modes() {
        let mesh = StaticMesh::new("/Game/SM_Two")
            .with_material(MaterialSlot::new("A", "/Transient/M_A"))
            .with_material(MaterialSlot::new("B", "/Transient/M_B"))
            .with_lod(Lod {
                sections: vec![Section::new(0, triangle(0.0)), Section::new(1, triangle(2.0))],
            })
            .with_lod(Lod {
                sections: vec![Section::new(1, triangle(0.0))],
            });

        let glb = export_glb(
            &mesh,
            &[slot("A", BlendMode::Masked), slot("B", BlendMode::Translucent)],
        )
        .unwrap();
        let json = json_chunk(&glb);

        assert_eq!(json["meshes"].as_array().unwrap().len(), 2);
        assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(json["meshes"][0]["primitives"].as_array().unwrap().len(), 2);
        assert_eq!(json["meshes"][1]["primitives"][0]["material"], 1);
        assert_eq!(json["materials"][0]["alphaMode"], "MASK");
        assert_eq!(json["materials"][1]["alphaMode"], "BLEND");
    }

    #[test]
    fn test_export_empty_mesh_fails() {
        let mesh = StaticMesh::new("/Game/SM_Empty").with_material(MaterialSlot::new("A", "/Game/M_A"));
        assert!(export_glb(&mesh, &[slot("A", BlendMode::Opaque)]).is_err());
    }

    #[test]
    fn test_missing_slot_material_fails() {
        let mesh = StaticMesh::new("/Game/SM_Tri")
            .with_material(MaterialSlot::new("Body", "/Game/M_A"))
            .with_lod(Lod {
                sections: vec![Section::new(0, triangle(0.0))],
            });
        assert!(export_glb(&mesh, &[]).is_err());
    }

    #[test]
    fn test_bounds() {
        let (min, max) = calculate_bounds(&triangle(2.0));
        assert_eq!(min, [2.0, 0.0, 0.0]);
        assert_eq!(max, [3.0, 0.0, 1.0]);
    }
}
