//! glTF 2.0 export.
//!
//! Builds a document with one external binary buffer and external PNG
//! images, then serializes it as `.gltf` JSON. Materials and meshes are
//! deduplicated by name: adding the same name twice returns the first
//! index. DDS textures are converted to PNG; a texture that cannot be
//! converted demotes its material to an untextured PBR entry instead of
//! failing the whole export.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use eq_eqg::model::{Material, Triangle, Vertex};

use crate::error::{Error, Result};
use crate::{diffuse_texture, normal_texture};

const COMPONENT_F32: u32 = 5126;
const COMPONENT_U32: u32 = 5125;
const TARGET_ARRAY_BUFFER: u32 = 34962;
const TARGET_ELEMENT_ARRAY_BUFFER: u32 = 34963;

#[derive(Debug, Serialize)]
struct Asset {
    version: &'static str,
    generator: &'static str,
}

#[derive(Debug, Serialize)]
struct Scene {
    nodes: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct Node {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mesh: Option<usize>,
}

#[derive(Debug, Serialize)]
struct Primitive {
    attributes: HashMap<&'static str, usize>,
    indices: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    material: Option<usize>,
}

#[derive(Debug, Serialize)]
struct JsonMesh {
    name: String,
    primitives: Vec<Primitive>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct PbrMetallicRoughness {
    #[serde(skip_serializing_if = "Option::is_none")]
    base_color_factor: Option<[f32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_color_texture: Option<TextureRef>,
    metallic_factor: f32,
}

#[derive(Debug, Serialize)]
struct TextureRef {
    index: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonMaterial {
    name: String,
    pbr_metallic_roughness: PbrMetallicRoughness,
    #[serde(skip_serializing_if = "Option::is_none")]
    normal_texture: Option<TextureRef>,
}

#[derive(Debug, Serialize)]
struct Texture {
    source: usize,
}

#[derive(Debug, Serialize)]
struct Image {
    uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Buffer {
    uri: String,
    byte_length: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BufferView {
    buffer: usize,
    byte_offset: usize,
    byte_length: usize,
    target: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Accessor {
    buffer_view: usize,
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<Vec<f32>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    asset: Asset,
    scene: usize,
    scenes: Vec<Scene>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    nodes: Vec<Node>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    meshes: Vec<JsonMesh>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    materials: Vec<JsonMaterial>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    textures: Vec<Texture>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<Image>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buffers: Vec<Buffer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    buffer_views: Vec<BufferView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    accessors: Vec<Accessor>,
}

/// An in-progress glTF export.
#[derive(Debug)]
pub struct Gltf {
    doc: Document,
    bin: Vec<u8>,
    /// PNG files to write next to the document, `(file name, bytes)`
    image_files: Vec<(String, Vec<u8>)>,
    materials: HashMap<String, usize>,
    meshes: HashMap<String, usize>,
}

impl Gltf {
    pub fn new() -> Self {
        Self {
            doc: Document {
                asset: Asset {
                    version: "2.0",
                    generator: "everquest-rs",
                },
                scene: 0,
                scenes: vec![Scene { nodes: Vec::new() }],
                nodes: Vec::new(),
                meshes: Vec::new(),
                materials: Vec::new(),
                textures: Vec::new(),
                images: Vec::new(),
                buffers: Vec::new(),
                buffer_views: Vec::new(),
                accessors: Vec::new(),
            },
            bin: Vec::new(),
            image_files: Vec::new(),
            materials: HashMap::new(),
            meshes: HashMap::new(),
        }
    }

    /// The document index of an already-added material.
    pub fn material(&self, name: &str) -> Option<usize> {
        self.materials.get(name).copied()
    }

    /// The document index of an already-added mesh.
    pub fn mesh(&self, name: &str) -> Option<usize> {
        self.meshes.get(name).copied()
    }

    /// Adds a material, converting its textures to PNG.
    ///
    /// A second add with the same name is a no-op returning the existing
    /// index. `diffuse_data`/`normal_data` are the raw texture bytes from
    /// the archive; either may be empty. A texture that cannot be
    /// converted logs a warning and leaves the material untextured.
    pub fn material_add(
        &mut self,
        material: &Material,
        diffuse_data: &[u8],
        normal_data: &[u8],
    ) -> Result<usize> {
        if let Some(index) = self.materials.get(&material.name) {
            return Ok(*index);
        }

        let diffuse_name = diffuse_texture(material).unwrap_or_default().to_string();
        let base_color_texture = if diffuse_name.is_empty() || diffuse_data.is_empty() {
            None
        } else {
            match to_png(diffuse_data, &diffuse_name) {
                Ok(png) => Some(self.texture_add(&diffuse_name, png)),
                Err(err) => {
                    log::warn!("material {}: diffuse {diffuse_name}: {err}", material.name);
                    None
                }
            }
        };

        let normal_name = normal_texture(material).unwrap_or_default().to_string();
        let normal = if normal_name.is_empty() || normal_data.is_empty() {
            None
        } else {
            match to_png(normal_data, &normal_name) {
                Ok(png) => Some(self.texture_add(&normal_name, png)),
                Err(err) => {
                    log::warn!("material {}: normal {normal_name}: {err}", material.name);
                    None
                }
            }
        };

        let base_color_factor = base_color_texture
            .is_none()
            .then_some([1.0, 1.0, 1.0, 1.0]);
        self.doc.materials.push(JsonMaterial {
            name: material.name.clone(),
            pbr_metallic_roughness: PbrMetallicRoughness {
                base_color_factor,
                base_color_texture: base_color_texture.map(|index| TextureRef { index }),
                metallic_factor: 0.0,
            },
            normal_texture: normal.map(|index| TextureRef { index }),
        });
        let index = self.doc.materials.len() - 1;
        self.materials.insert(material.name.clone(), index);
        Ok(index)
    }

    /// Adds a mesh and a scene node pointing at it.
    ///
    /// Triangles are grouped into one primitive per referenced material,
    /// in first-appearance order. A second add with the same name is a
    /// no-op returning the existing index.
    pub fn mesh_add(
        &mut self,
        name: &str,
        vertices: &[Vertex],
        triangles: &[Triangle],
    ) -> Result<usize> {
        if let Some(index) = self.meshes.get(name) {
            return Ok(*index);
        }
        for triangle in triangles {
            for index in triangle.index {
                if index as usize >= vertices.len() {
                    return Err(Error::VertexOutOfRange {
                        index,
                        count: vertices.len(),
                    });
                }
            }
        }

        let position_accessor = self.push_vec3_accessor(
            vertices.iter().map(|v| [v.position.x, v.position.y, v.position.z]),
            vertices.len(),
            true,
        );
        let normal_accessor = self.push_vec3_accessor(
            vertices.iter().map(|v| [v.normal.x, v.normal.y, v.normal.z]),
            vertices.len(),
            false,
        );
        let uv_accessor = self.push_vec2_accessor(vertices.iter().map(|v| [v.uv.x, v.uv.y]));

        // one primitive per material, triangles grouped in first-appearance
        // order
        let mut groups: Vec<(String, Vec<u32>)> = Vec::new();
        for triangle in triangles {
            match groups.iter_mut().find(|(m, _)| *m == triangle.material_name) {
                Some((_, indices)) => indices.extend(triangle.index),
                None => groups.push((triangle.material_name.clone(), triangle.index.to_vec())),
            }
        }

        let mut primitives = Vec::with_capacity(groups.len());
        for (material_name, indices) in groups {
            let indices_accessor = self.push_index_accessor(&indices);
            let mut attributes = HashMap::new();
            attributes.insert("POSITION", position_accessor);
            attributes.insert("NORMAL", normal_accessor);
            attributes.insert("TEXCOORD_0", uv_accessor);
            primitives.push(Primitive {
                attributes,
                indices: indices_accessor,
                material: self.materials.get(&material_name).copied(),
            });
        }

        self.doc.meshes.push(JsonMesh {
            name: name.to_string(),
            primitives,
        });
        let index = self.doc.meshes.len() - 1;
        self.meshes.insert(name.to_string(), index);

        self.doc.nodes.push(Node {
            name: name.to_string(),
            mesh: Some(index),
        });
        self.doc.scenes[0].nodes.push(self.doc.nodes.len() - 1);
        Ok(index)
    }

    /// Writes `<name>.gltf`, `<name>.bin` and the converted PNG images
    /// into `dir`.
    pub fn write_to_dir(mut self, dir: &Path, name: &str) -> Result<()> {
        if !self.bin.is_empty() {
            let uri = format!("{name}.bin");
            std::fs::write(dir.join(&uri), &self.bin)?;
            self.doc.buffers.push(Buffer {
                uri,
                byte_length: self.bin.len(),
            });
        }
        for (file_name, data) in &self.image_files {
            std::fs::write(dir.join(file_name), data)?;
        }
        let mut out = BufWriter::new(File::create(dir.join(format!("{name}.gltf")))?);
        serde_json::to_writer_pretty(&mut out, &self.doc)?;
        out.flush()?;
        Ok(())
    }

    fn texture_add(&mut self, texture_name: &str, png: Vec<u8>) -> usize {
        let file_name = png_file_name(texture_name);
        self.image_files.push((file_name.clone(), png));
        self.doc.images.push(Image { uri: file_name });
        self.doc.textures.push(Texture {
            source: self.doc.images.len() - 1,
        });
        self.doc.textures.len() - 1
    }

    fn push_view(&mut self, data: &[u8], target: u32) -> usize {
        let byte_offset = self.bin.len();
        self.bin.extend_from_slice(data);
        self.doc.buffer_views.push(BufferView {
            buffer: 0,
            byte_offset,
            byte_length: data.len(),
            target,
        });
        self.doc.buffer_views.len() - 1
    }

    fn push_vec3_accessor(
        &mut self,
        values: impl Iterator<Item = [f32; 3]>,
        count: usize,
        with_bounds: bool,
    ) -> usize {
        let mut data = Vec::with_capacity(count * 12);
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for value in values {
            for (i, component) in value.into_iter().enumerate() {
                min[i] = min[i].min(component);
                max[i] = max[i].max(component);
                data.extend_from_slice(&component.to_le_bytes());
            }
        }
        let buffer_view = self.push_view(&data, TARGET_ARRAY_BUFFER);
        self.doc.accessors.push(Accessor {
            buffer_view,
            component_type: COMPONENT_F32,
            count,
            kind: "VEC3",
            min: (with_bounds && count > 0).then(|| min.to_vec()),
            max: (with_bounds && count > 0).then(|| max.to_vec()),
        });
        self.doc.accessors.len() - 1
    }

    fn push_vec2_accessor(&mut self, values: impl ExactSizeIterator<Item = [f32; 2]>) -> usize {
        let count = values.len();
        let mut data = Vec::with_capacity(count * 8);
        for value in values {
            for component in value {
                data.extend_from_slice(&component.to_le_bytes());
            }
        }
        let buffer_view = self.push_view(&data, TARGET_ARRAY_BUFFER);
        self.doc.accessors.push(Accessor {
            buffer_view,
            component_type: COMPONENT_F32,
            count,
            kind: "VEC2",
            min: None,
            max: None,
        });
        self.doc.accessors.len() - 1
    }

    fn push_index_accessor(&mut self, indices: &[u32]) -> usize {
        let mut data = Vec::with_capacity(indices.len() * 4);
        for index in indices {
            data.extend_from_slice(&index.to_le_bytes());
        }
        let buffer_view = self.push_view(&data, TARGET_ELEMENT_ARRAY_BUFFER);
        self.doc.accessors.push(Accessor {
            buffer_view,
            component_type: COMPONENT_U32,
            count: indices.len(),
            kind: "SCALAR",
            min: None,
            max: None,
        });
        self.doc.accessors.len() - 1
    }
}

impl Default for Gltf {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts raw texture bytes to PNG based on the file extension.
fn to_png(data: &[u8], name: &str) -> Result<Vec<u8>> {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".png") {
        return Ok(data.to_vec());
    }
    if lower.ends_with(".dds") {
        let img = image::load_from_memory_with_format(data, image::ImageFormat::Dds)?;
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)?;
        return Ok(out.into_inner());
    }
    Err(Error::UnsupportedTexture(name.to_string()))
}

fn png_file_name(texture_name: &str) -> String {
    let lower = texture_name.to_ascii_lowercase();
    match lower.strip_suffix(".dds") {
        Some(stem) => format!("{stem}.png"),
        None => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eq_eqg::model::{MaterialProperty, PropertyValue};
    use glam::{Vec2, Vec3};
    use pretty_assertions::assert_eq;

    fn textured_material(name: &str) -> Material {
        Material {
            id: 0,
            name: name.into(),
            shader_name: "Opaque_MaxCB1.fx".into(),
            properties: vec![MaterialProperty {
                name: "e_TextureDiffuse0".into(),
                value: PropertyValue::Name("rock.tga".into()),
            }],
        }
    }

    fn triangle_mesh() -> (Vec<Vertex>, Vec<Triangle>) {
        let vertices = vec![
            Vertex {
                position: Vec3::new(0.0, 0.0, 0.0),
                normal: Vec3::Z,
                uv: Vec2::ZERO,
                ..Vertex::default()
            },
            Vertex {
                position: Vec3::new(1.0, 0.0, 0.0),
                normal: Vec3::Z,
                uv: Vec2::X,
                ..Vertex::default()
            },
            Vertex {
                position: Vec3::new(0.0, 1.0, 0.0),
                normal: Vec3::Z,
                uv: Vec2::Y,
                ..Vertex::default()
            },
        ];
        let triangles = vec![Triangle {
            index: [0, 1, 2],
            material_name: "ROCK".into(),
            flags: 0,
        }];
        (vertices, triangles)
    }

    #[test]
    fn material_add_deduplicates_by_name() {
        let mut gltf = Gltf::new();
        let material = textured_material("ROCK");
        let first = gltf.material_add(&material, &[], &[]).unwrap();
        let second = gltf.material_add(&material, &[], &[]).unwrap();
        assert_eq!(first, second);
        assert_eq!(gltf.doc.materials.len(), 1);
    }

    #[test]
    fn mesh_add_deduplicates_by_name() {
        let mut gltf = Gltf::new();
        let (vertices, triangles) = triangle_mesh();
        let first = gltf.mesh_add("ROCK_MESH", &vertices, &triangles).unwrap();
        let second = gltf.mesh_add("ROCK_MESH", &vertices, &triangles).unwrap();
        assert_eq!(first, second);
        assert_eq!(gltf.doc.meshes.len(), 1);
        assert_eq!(gltf.doc.nodes.len(), 1);
    }

    #[test]
    fn unconvertible_texture_demotes_material() {
        let mut gltf = Gltf::new();
        let material = textured_material("ROCK");
        // .tga has no converter; the material must fall back untextured
        let index = gltf.material_add(&material, b"not an image", &[]).unwrap();
        let entry = &gltf.doc.materials[index];
        assert!(entry.pbr_metallic_roughness.base_color_texture.is_none());
        assert_eq!(
            entry.pbr_metallic_roughness.base_color_factor,
            Some([1.0, 1.0, 1.0, 1.0])
        );
        assert!(gltf.doc.images.is_empty());
    }

    #[test]
    fn document_written_with_external_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let mut gltf = Gltf::new();
        let (vertices, triangles) = triangle_mesh();
        gltf.mesh_add("ROCK_MESH", &vertices, &triangles).unwrap();
        gltf.write_to_dir(dir.path(), "rock").unwrap();

        let json = std::fs::read_to_string(dir.path().join("rock.gltf")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(doc["asset"]["version"], "2.0");
        assert_eq!(doc["buffers"][0]["uri"], "rock.bin");
        assert_eq!(doc["meshes"][0]["name"], "ROCK_MESH");

        let bin = std::fs::read(dir.path().join("rock.bin")).unwrap();
        // 3 vertices * (12 position + 12 normal + 8 uv) + 3 u32 indices
        assert_eq!(bin.len(), 3 * 32 + 12);
    }

    #[test]
    fn primitives_grouped_per_material() {
        let mut gltf = Gltf::new();
        let (vertices, _) = triangle_mesh();
        let triangles = vec![
            Triangle {
                index: [0, 1, 2],
                material_name: "A".into(),
                flags: 0,
            },
            Triangle {
                index: [2, 1, 0],
                material_name: "B".into(),
                flags: 0,
            },
            Triangle {
                index: [1, 0, 2],
                material_name: "A".into(),
                flags: 0,
            },
        ];
        gltf.mesh_add("MULTI", &vertices, &triangles).unwrap();
        assert_eq!(gltf.doc.meshes[0].primitives.len(), 2);
    }
}
