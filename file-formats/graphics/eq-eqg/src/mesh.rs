//! The three EQG geometry formats: MOD (`"EQGM"`), TER (`"EQGT"`), and
//! MDS (`"EQGS"`).
//!
//! All three share the material/vertex/triangle record layouts from
//! [`crate::model`]; they differ in header counts and skeleton data. TER
//! is MOD without bones; MDS adds quaternion bones and per-sub-model
//! vertex weights.

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};

use crate::error::{Error, Result};
use crate::model::{
    BoneWeight, Material, MdsBone, ModBone, Triangle, Vertex, collect_material_names,
    read_materials, read_triangles, read_vertices, write_materials, write_name_ref,
    write_triangles, write_vertices,
};
use crate::name::NameTable;

const MOD_MAGIC: &str = "EQGM";
const TER_MAGIC: &str = "EQGT";
const MDS_MAGIC: &str = "EQGS";

/// A decoded MOD model file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mod {
    pub version: u32,
    pub materials: Vec<Material>,
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    pub bones: Vec<ModBone>,
}

impl Mod {
    /// Reads a MOD file
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_fixed_string(4)?;
        if magic != MOD_MAGIC {
            return Err(Error::InvalidMagic {
                expected: MOD_MAGIC,
                found: magic,
            });
        }

        let version = reader.read_u32_le()?;
        let name_length = reader.read_u32_le()?;
        let material_count = reader.read_u32_le()?;
        let vertex_count = reader.read_u32_le()?;
        let triangle_count = reader.read_u32_le()?;
        let bone_count = reader.read_u32_le()?;
        let name_data = reader.read_bytes(name_length as usize)?;
        let names = NameTable::parse(&name_data);

        let materials = read_materials(reader, &names, material_count)?;
        let vertices = read_vertices(reader, version, vertex_count)?;
        let triangles = read_triangles(reader, &materials, triangle_count)?;

        let mut bones = Vec::with_capacity(bone_count as usize);
        for _ in 0..bone_count {
            bones.push(ModBone {
                name: names.get_or_unknown(reader.read_i32_le()?),
                next: reader.read_i32_le()?,
                children_count: reader.read_u32_le()?,
                child_index: reader.read_i32_le()?,
                pivot: reader.read_vec3_le()?,
                rotation: reader.read_vec3_le()?,
                scale: reader.read_vec3_le()?,
                scale2: reader.read_f32_le()?,
            });
        }

        Ok(Self {
            version,
            materials,
            vertices,
            triangles,
            bones,
        })
    }

    /// Writes a MOD file
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut names = NameTable::new();
        collect_material_names(&self.materials, &mut names);
        for bone in &self.bones {
            names.add(&bone.name);
        }

        writer.write_all(MOD_MAGIC.as_bytes())?;
        writer.write_u32_le(self.version)?;
        writer.write_u32_le(names.data().len() as u32)?;
        writer.write_u32_le(self.materials.len() as u32)?;
        writer.write_u32_le(self.vertices.len() as u32)?;
        writer.write_u32_le(self.triangles.len() as u32)?;
        writer.write_u32_le(self.bones.len() as u32)?;
        writer.write_all(names.data())?;

        write_materials(writer, &names, &self.materials)?;
        write_vertices(writer, self.version, &self.vertices)?;
        write_triangles(writer, &self.materials, &self.triangles)?;

        for bone in &self.bones {
            write_name_ref(writer, &names, &bone.name)?;
            writer.write_i32_le(bone.next)?;
            writer.write_u32_le(bone.children_count)?;
            writer.write_i32_le(bone.child_index)?;
            writer.write_vec3_le(bone.pivot)?;
            writer.write_vec3_le(bone.rotation)?;
            writer.write_vec3_le(bone.scale)?;
            writer.write_f32_le(bone.scale2)?;
        }
        Ok(())
    }
}

/// A decoded TER terrain file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ter {
    pub version: u32,
    pub materials: Vec<Material>,
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Ter {
    /// Reads a TER file
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_fixed_string(4)?;
        if magic != TER_MAGIC {
            return Err(Error::InvalidMagic {
                expected: TER_MAGIC,
                found: magic,
            });
        }

        let version = reader.read_u32_le()?;
        let name_length = reader.read_u32_le()?;
        let material_count = reader.read_u32_le()?;
        let vertex_count = reader.read_u32_le()?;
        let triangle_count = reader.read_u32_le()?;
        let name_data = reader.read_bytes(name_length as usize)?;
        let names = NameTable::parse(&name_data);

        let materials = read_materials(reader, &names, material_count)?;
        let vertices = read_vertices(reader, version, vertex_count)?;
        let triangles = read_triangles(reader, &materials, triangle_count)?;

        Ok(Self {
            version,
            materials,
            vertices,
            triangles,
        })
    }

    /// Writes a TER file
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut names = NameTable::new();
        collect_material_names(&self.materials, &mut names);

        writer.write_all(TER_MAGIC.as_bytes())?;
        writer.write_u32_le(self.version)?;
        writer.write_u32_le(names.data().len() as u32)?;
        writer.write_u32_le(self.materials.len() as u32)?;
        writer.write_u32_le(self.vertices.len() as u32)?;
        writer.write_u32_le(self.triangles.len() as u32)?;
        writer.write_all(names.data())?;

        write_materials(writer, &names, &self.materials)?;
        write_vertices(writer, self.version, &self.vertices)?;
        write_triangles(writer, &self.materials, &self.triangles)?;
        Ok(())
    }
}

/// A decoded MDS skinned model file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mds {
    pub version: u32,
    pub materials: Vec<Material>,
    pub bones: Vec<MdsBone>,
    pub models: Vec<MdsModel>,
}

/// One sub-model inside an MDS file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MdsModel {
    /// Nonzero marks the main body piece
    pub main_piece: u32,
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Triangle>,
    /// Parallel to `vertices`; empty when the file has no skeleton
    pub weights: Vec<Vec<BoneWeight>>,
}

impl Mds {
    /// Reads an MDS file
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_fixed_string(4)?;
        if magic != MDS_MAGIC {
            return Err(Error::InvalidMagic {
                expected: MDS_MAGIC,
                found: magic,
            });
        }

        let version = reader.read_u32_le()?;
        let name_length = reader.read_u32_le()?;
        let material_count = reader.read_u32_le()?;
        let bone_count = reader.read_u32_le()?;
        let model_count = reader.read_u32_le()?;
        let name_data = reader.read_bytes(name_length as usize)?;
        let names = NameTable::parse(&name_data);

        let materials = read_materials(reader, &names, material_count)?;

        let mut bones = Vec::with_capacity(bone_count as usize);
        for _ in 0..bone_count {
            bones.push(MdsBone {
                name: names.get_or_unknown(reader.read_i32_le()?),
                next: reader.read_i32_le()?,
                children_count: reader.read_u32_le()?,
                child_index: reader.read_i32_le()?,
                pivot: reader.read_vec3_le()?,
                quaternion: reader.read_quat_xyzw_le()?,
                scale: reader.read_vec3_le()?,
            });
        }

        let mut models = Vec::with_capacity(model_count as usize);
        for _ in 0..model_count {
            let main_piece = reader.read_u32_le()?;
            let name = names.get_or_unknown(reader.read_i32_le()?);
            let vertex_count = reader.read_u32_le()?;
            let face_count = reader.read_u32_le()?;
            let _model_bone_count = reader.read_u32_le()?;

            let vertices = read_vertices(reader, version, vertex_count)?;
            let faces = read_triangles(reader, &materials, face_count)?;

            let mut weights = Vec::new();
            if !bones.is_empty() {
                weights.reserve(vertex_count as usize);
                for _ in 0..vertex_count {
                    let count = reader.read_i32_le()?;
                    let mut vertex_weights = Vec::new();
                    // always four pairs on disk, only `count` are live
                    for j in 0..4 {
                        let weight = BoneWeight {
                            bone_index: reader.read_i32_le()?,
                            value: reader.read_f32_le()?,
                        };
                        if (j as i32) < count {
                            vertex_weights.push(weight);
                        }
                    }
                    weights.push(vertex_weights);
                }
            }

            models.push(MdsModel {
                main_piece,
                name,
                vertices,
                faces,
                weights,
            });
        }

        Ok(Self {
            version,
            materials,
            bones,
            models,
        })
    }

    /// Writes an MDS file
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut names = NameTable::new();
        collect_material_names(&self.materials, &mut names);
        for bone in &self.bones {
            names.add(&bone.name);
        }
        for model in &self.models {
            names.add(&model.name);
        }

        writer.write_all(MDS_MAGIC.as_bytes())?;
        writer.write_u32_le(self.version)?;
        writer.write_u32_le(names.data().len() as u32)?;
        writer.write_u32_le(self.materials.len() as u32)?;
        writer.write_u32_le(self.bones.len() as u32)?;
        writer.write_u32_le(self.models.len() as u32)?;
        writer.write_all(names.data())?;

        write_materials(writer, &names, &self.materials)?;

        for bone in &self.bones {
            write_name_ref(writer, &names, &bone.name)?;
            writer.write_i32_le(bone.next)?;
            writer.write_u32_le(bone.children_count)?;
            writer.write_i32_le(bone.child_index)?;
            writer.write_vec3_le(bone.pivot)?;
            writer.write_quat_xyzw_le(bone.quaternion)?;
            writer.write_vec3_le(bone.scale)?;
        }

        for model in &self.models {
            writer.write_u32_le(model.main_piece)?;
            write_name_ref(writer, &names, &model.name)?;
            writer.write_u32_le(model.vertices.len() as u32)?;
            writer.write_u32_le(model.faces.len() as u32)?;
            writer.write_u32_le(self.bones.len() as u32)?;

            write_vertices(writer, self.version, &model.vertices)?;
            write_triangles(writer, &self.materials, &model.faces)?;

            if !self.bones.is_empty() {
                for i in 0..model.vertices.len() {
                    let vertex_weights = model.weights.get(i).map_or(&[][..], Vec::as_slice);
                    if vertex_weights.len() > 4 {
                        return Err(Error::invalid_record(format!(
                            "vertex {i} has {} bone weights, at most 4 fit",
                            vertex_weights.len()
                        )));
                    }
                    writer.write_i32_le(vertex_weights.len() as i32)?;
                    for j in 0..4 {
                        let weight = vertex_weights.get(j).copied().unwrap_or_default();
                        writer.write_i32_le(weight.bone_index)?;
                        writer.write_f32_le(weight.value)?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MaterialProperty, PropertyValue};
    use glam::{Vec2, Vec3};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn sample_material() -> Material {
        Material {
            id: 0,
            name: "crate_top".to_string(),
            shader_name: "Opaque_MaxCB1.fx".to_string(),
            properties: vec![
                MaterialProperty {
                    name: "e_TextureDiffuse0".to_string(),
                    value: PropertyValue::Name("crate.dds".to_string()),
                },
                MaterialProperty {
                    name: "e_fShininess0".to_string(),
                    value: PropertyValue::Float(0.25),
                },
            ],
        }
    }

    fn sample_vertices() -> Vec<Vertex> {
        vec![
            Vertex {
                position: Vec3::new(0.0, 0.0, 0.0),
                normal: Vec3::Z,
                tint: [128, 128, 128, 255],
                uv: Vec2::new(0.0, 0.0),
                uv2: Vec2::ZERO,
            },
            Vertex {
                position: Vec3::new(1.0, 0.0, 0.0),
                normal: Vec3::Z,
                tint: [128, 128, 128, 255],
                uv: Vec2::new(1.0, 0.0),
                uv2: Vec2::ZERO,
            },
            Vertex {
                position: Vec3::new(0.0, 1.0, 0.0),
                normal: Vec3::Z,
                tint: [128, 128, 128, 255],
                uv: Vec2::new(0.0, 1.0),
                uv2: Vec2::ZERO,
            },
        ]
    }

    #[test]
    fn mod_round_trip() {
        let model = Mod {
            version: 2,
            materials: vec![sample_material()],
            vertices: sample_vertices(),
            triangles: vec![Triangle {
                index: [0, 1, 2],
                material_name: "crate_top".to_string(),
                flags: 0,
            }],
            bones: vec![ModBone {
                name: "root".to_string(),
                next: -1,
                children_count: 0,
                child_index: -1,
                pivot: Vec3::ZERO,
                rotation: Vec3::ZERO,
                scale: Vec3::ONE,
                scale2: 1.0,
            }],
        };
        let mut buf = Vec::new();
        model.write(&mut buf).unwrap();
        let read_back = Mod::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back, model);
    }

    #[test]
    fn ter_round_trip_v3_carries_tint_and_uv2() {
        let mut vertices = sample_vertices();
        for v in &mut vertices {
            v.tint = [10, 20, 30, 255];
            v.uv2 = Vec2::new(0.5, 0.5);
        }
        let ter = Ter {
            version: 3,
            materials: vec![sample_material()],
            vertices,
            triangles: vec![Triangle {
                index: [0, 1, 2],
                material_name: "crate_top".to_string(),
                flags: 1,
            }],
        };
        let mut buf = Vec::new();
        ter.write(&mut buf).unwrap();
        let read_back = Ter::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back, ter);
    }

    #[test]
    fn mds_round_trip_with_weights() {
        let mds = Mds {
            version: 3,
            materials: vec![sample_material()],
            bones: vec![MdsBone {
                name: "root".to_string(),
                ..MdsBone::default()
            }],
            models: vec![MdsModel {
                main_piece: 1,
                name: "torso".to_string(),
                vertices: {
                    let mut vs = sample_vertices();
                    for v in &mut vs {
                        v.tint = [1, 2, 3, 4];
                    }
                    vs
                },
                faces: vec![Triangle {
                    index: [0, 1, 2],
                    material_name: "crate_top".to_string(),
                    flags: 0,
                }],
                weights: vec![
                    vec![BoneWeight {
                        bone_index: 0,
                        value: 1.0,
                    }],
                    vec![],
                    vec![BoneWeight {
                        bone_index: 0,
                        value: 0.5,
                    }],
                ],
            }],
        };
        let mut buf = Vec::new();
        mds.write(&mut buf).unwrap();
        let read_back = Mds::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back, mds);
    }

    #[test]
    fn triangle_without_material_writes_minus_one() {
        let model = Mod {
            version: 2,
            materials: Vec::new(),
            vertices: sample_vertices(),
            triangles: vec![Triangle {
                index: [0, 1, 2],
                material_name: String::new(),
                flags: 0,
            }],
            bones: Vec::new(),
        };
        let mut buf = Vec::new();
        model.write(&mut buf).unwrap();
        let read_back = Mod::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back.triangles[0].material_name, "");
    }
}
