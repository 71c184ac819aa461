//! Model conversion to OBJ and glTF

use anyhow::{Context, Result, bail};
use std::fs;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};

use eq_eqg::model::{Material, MaterialProperty, PropertyValue, Triangle, Vertex};
use eq_eqg::{Mds, Mod, Ter};
use eq_export::gltf::Gltf;
use eq_export::{diffuse_texture, normal_texture, obj};
use eq_pfs::Archive;
use eq_wld::raw::Wld;
use eq_wld::vwld::VWld;
use glam::{Vec2, Vec3};

use crate::cli::ExportFormat;

const ARCHIVE_EXTENSIONS: [&str; 4] = ["eqg", "s3d", "pfs", "pak"];

pub fn execute(input: PathBuf, format: ExportFormat, output: PathBuf) -> Result<()> {
    fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    let extension = input
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if ARCHIVE_EXTENSIONS.contains(&extension.as_str()) {
        return convert_archive(&input, format, &output);
    }

    let file = File::open(&input)
        .with_context(|| format!("Failed to open file: {}", input.display()))?;
    let mut reader = BufReader::new(file);

    let exported = match extension.as_str() {
        "mod" => {
            let model = Mod::read(&mut reader)
                .with_context(|| format!("Failed to parse MOD file: {}", input.display()))?;
            export_model(
                format,
                &output,
                &stem,
                &model.vertices,
                &model.triangles,
                &model.materials,
                None,
            )?;
            1
        }
        "ter" => {
            let ter = Ter::read(&mut reader)
                .with_context(|| format!("Failed to parse TER file: {}", input.display()))?;
            export_model(
                format,
                &output,
                &stem,
                &ter.vertices,
                &ter.triangles,
                &ter.materials,
                None,
            )?;
            1
        }
        "mds" => {
            let mds = Mds::read(&mut reader)
                .with_context(|| format!("Failed to parse MDS file: {}", input.display()))?;
            export_mds(format, &output, &stem, &mds, None)?
        }
        "wld" => {
            let wld = Wld::read(&mut reader)
                .with_context(|| format!("Failed to parse WLD file: {}", input.display()))?;
            let graph = VWld::decode(&wld)
                .with_context(|| format!("Failed to decode: {}", input.display()))?;
            export_wld_meshes(format, &output, &graph, None)?
        }
        _ => bail!("Unrecognized model extension: {}", input.display()),
    };

    println!("Exported {exported} models to {}", output.display());
    Ok(())
}

/// Converts every model file inside an archive. A file that fails to
/// decode or export is logged and skipped.
fn convert_archive(path: &Path, format: ExportFormat, output: &Path) -> Result<()> {
    let archive = Archive::open(path)
        .with_context(|| format!("Failed to open archive: {}", path.display()))?;

    let mut exported = 0usize;
    for entry in archive.files() {
        let name = entry.name();
        let extension = name.rsplit('.').next().unwrap_or_default();
        if !matches!(extension, "mod" | "ter" | "mds" | "wld") {
            continue;
        }
        let stem = name.strip_suffix(&format!(".{extension}")).unwrap_or(name);

        match convert_entry(format, output, stem, extension, entry.data(), &archive) {
            Ok(count) => exported += count,
            Err(err) => log::warn!("skipping {name}: {err}"),
        }
    }

    println!("Exported {exported} models to {}", output.display());
    Ok(())
}

fn convert_entry(
    format: ExportFormat,
    output: &Path,
    stem: &str,
    extension: &str,
    data: &[u8],
    archive: &Archive,
) -> Result<usize> {
    let mut reader = Cursor::new(data);
    match extension {
        "mod" => {
            let model = Mod::read(&mut reader)?;
            export_model(
                format,
                output,
                stem,
                &model.vertices,
                &model.triangles,
                &model.materials,
                Some(archive),
            )?;
            Ok(1)
        }
        "ter" => {
            let ter = Ter::read(&mut reader)?;
            export_model(
                format,
                output,
                stem,
                &ter.vertices,
                &ter.triangles,
                &ter.materials,
                Some(archive),
            )?;
            Ok(1)
        }
        "mds" => {
            let mds = Mds::read(&mut reader)?;
            export_mds(format, output, stem, &mds, Some(archive))
        }
        "wld" => {
            let wld = Wld::read(&mut reader)?;
            let graph = VWld::decode(&wld)?;
            export_wld_meshes(format, output, &graph, Some(archive))
        }
        _ => Ok(0),
    }
}

/// One export per MDS sub-model; the archive stem prefixes each name so
/// multi-part models do not collide on disk.
fn export_mds(
    format: ExportFormat,
    output: &Path,
    stem: &str,
    mds: &Mds,
    archive: Option<&Archive>,
) -> Result<usize> {
    let mut exported = 0usize;
    for model in &mds.models {
        let name = if model.name.is_empty() {
            stem.to_string()
        } else {
            format!("{stem}_{}", model.name.to_lowercase())
        };
        export_model(
            format,
            output,
            &name,
            &model.vertices,
            &model.faces,
            &mds.materials,
            archive,
        )?;
        exported += 1;
    }
    Ok(exported)
}

/// One export per WLD mesh, geometry unpacked from fixed point. A mesh
/// whose export fails is logged and skipped.
fn export_wld_meshes(
    format: ExportFormat,
    output: &Path,
    graph: &VWld,
    archive: Option<&Archive>,
) -> Result<usize> {
    let mut exported = 0usize;
    for mesh in &graph.meshes {
        let materials = wld_materials(graph, mesh);
        let (vertices, triangles) = wld_geometry(mesh, &materials);
        let name = mesh.tag.to_lowercase();
        match export_model(
            format, output, &name, &vertices, &triangles, &materials, archive,
        ) {
            Ok(()) => exported += 1,
            Err(err) => log::warn!("skipping mesh {}: {err}", mesh.tag),
        }
    }
    Ok(exported)
}

fn export_model(
    format: ExportFormat,
    output: &Path,
    name: &str,
    vertices: &[Vertex],
    triangles: &[Triangle],
    materials: &[Material],
    archive: Option<&Archive>,
) -> eq_export::Result<()> {
    match format {
        ExportFormat::Obj => obj::export(output, name, vertices, triangles, materials),
        ExportFormat::Gltf => {
            let mut gltf = Gltf::new();
            for material in materials {
                let diffuse = texture_bytes(archive, diffuse_texture(material));
                let normal = texture_bytes(archive, normal_texture(material));
                gltf.material_add(material, &diffuse, &normal)?;
            }
            gltf.mesh_add(name, vertices, triangles)?;
            gltf.write_to_dir(output, name)
        }
    }
}

/// Texture bytes from the source archive; empty when the texture is
/// absent so the material falls back untextured.
fn texture_bytes(archive: Option<&Archive>, texture: Option<&str>) -> Vec<u8> {
    let (Some(archive), Some(texture)) = (archive, texture) else {
        return Vec::new();
    };
    match archive.file(&texture.to_lowercase()) {
        Ok(data) => data.to_vec(),
        Err(err) => {
            log::debug!("texture {texture} not in archive: {err}");
            Vec::new()
        }
    }
}

/// Flattens a WLD mesh's material palette into standalone materials,
/// resolving each texture through the sprite chain down to its first
/// bitmap file name.
fn wld_materials(graph: &VWld, mesh: &eq_wld::vwld::Mesh) -> Vec<Material> {
    let Some(palette) = graph.material_instance_by_tag(&mesh.material_instance) else {
        return Vec::new();
    };

    let mut materials = Vec::with_capacity(palette.materials.len());
    for (id, tag) in palette.materials.iter().enumerate() {
        let mut properties = Vec::new();
        if let Some(texture) = graph
            .material_by_tag(tag)
            .filter(|m| !m.texture.is_empty())
            .and_then(|m| graph.sprite_instance_by_tag(&m.texture))
            .and_then(|si| graph.sprite_by_tag(&si.sprite))
            .and_then(|s| s.bitmaps.first())
            .and_then(|b| graph.bitmap_by_tag(b))
            .and_then(|b| b.textures.first())
        {
            properties.push(MaterialProperty {
                name: "e_TextureDiffuse0".into(),
                value: PropertyValue::Name(texture.clone()),
            });
        }
        materials.push(Material {
            id: id as i32,
            name: tag.clone(),
            shader_name: String::new(),
            properties,
        });
    }
    materials
}

/// Unpacks a WLD mesh's fixed-point geometry into world-space vertices
/// and material-tagged triangles.
fn wld_geometry(mesh: &eq_wld::vwld::Mesh, materials: &[Material]) -> (Vec<Vertex>, Vec<Triangle>) {
    let scale = 1.0 / f32::from(1u16 << mesh.scale.min(15));

    let vertices = mesh
        .vertices
        .iter()
        .enumerate()
        .map(|(i, v)| Vertex {
            position: mesh.center
                + Vec3::new(f32::from(v[0]), f32::from(v[1]), f32::from(v[2])) * scale,
            normal: mesh
                .normals
                .get(i)
                .map(|n| {
                    Vec3::new(
                        f32::from(n[0]) / 127.0,
                        f32::from(n[1]) / 127.0,
                        f32::from(n[2]) / 127.0,
                    )
                })
                .unwrap_or(Vec3::Z),
            tint: mesh.colors.get(i).copied().unwrap_or([128, 128, 128, 255]),
            uv: mesh
                .uvs
                .get(i)
                .map(|uv| Vec2::new(uv[0], uv[1]))
                .unwrap_or_default(),
            uv2: Vec2::ZERO,
        })
        .collect();

    // face_material_groups maps runs of faces to palette slots, in face
    // declaration order
    let mut triangles = Vec::with_capacity(mesh.faces.len());
    let mut faces = mesh.faces.iter();
    for &[count, palette_index] in &mesh.face_material_groups {
        let material_name = materials
            .get(palette_index as usize)
            .map(|m| m.name.clone())
            .unwrap_or_default();
        for face in faces.by_ref().take(count as usize) {
            triangles.push(Triangle {
                index: face.index.map(u32::from),
                material_name: material_name.clone(),
                flags: u32::from(face.flags),
            });
        }
    }
    // faces past the declared groups keep an empty material
    for face in faces {
        triangles.push(Triangle {
            index: face.index.map(u32::from),
            material_name: String::new(),
            flags: u32::from(face.flags),
        });
    }

    (vertices, triangles)
}
