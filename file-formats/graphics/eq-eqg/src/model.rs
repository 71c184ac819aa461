//! Record types and codec helpers shared by the MOD, MDS, and TER
//! geometry formats.

use std::io::{Read, Write};

use glam::{Quat, Vec2, Vec3};

use eq_data::{ReadExt, WriteExt};

use crate::error::{Error, Result};
use crate::name::NameTable;

/// A surface material with its shader and typed properties
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Material {
    pub id: i32,
    pub name: String,
    pub shader_name: String,
    pub properties: Vec<MaterialProperty>,
}

/// One named, typed material property
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialProperty {
    pub name: String,
    pub value: PropertyValue,
}

/// Material property payload, discriminated by the on-disk category field
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Category 0
    Float(f32),
    /// Category 2, a name-table reference (usually a texture filename)
    Name(String),
    /// Any other category, stored with its original category code
    Int { category: u32, value: i32 },
}

impl PropertyValue {
    /// The category code written to disk for this value
    pub fn category(&self) -> u32 {
        match self {
            Self::Float(_) => 0,
            Self::Name(_) => 2,
            Self::Int { category, .. } => *category,
        }
    }
}

/// One mesh vertex.
///
/// Version 2 and earlier files lack tint and the second UV channel; the
/// decoder fills in the defaults (128,128,128,255) and (0,0).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tint: [u8; 4],
    pub uv: Vec2,
    pub uv2: Vec2,
}

/// One triangle, referencing its material by resolved name
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Triangle {
    pub index: [u32; 3],
    pub material_name: String,
    pub flags: u32,
}

/// A MOD skeleton bone (euler rotation plus a scalar scale)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModBone {
    pub name: String,
    pub next: i32,
    pub children_count: u32,
    pub child_index: i32,
    pub pivot: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub scale2: f32,
}

/// An MDS skeleton bone (quaternion rotation)
#[derive(Debug, Clone, PartialEq)]
pub struct MdsBone {
    pub name: String,
    pub next: i32,
    pub children_count: u32,
    pub child_index: i32,
    pub pivot: Vec3,
    pub quaternion: Quat,
    pub scale: Vec3,
}

impl Default for MdsBone {
    fn default() -> Self {
        Self {
            name: String::new(),
            next: -1,
            children_count: 0,
            child_index: -1,
            pivot: Vec3::ZERO,
            quaternion: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// A bone influence on one vertex
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoneWeight {
    pub bone_index: i32,
    pub value: f32,
}

pub(crate) fn read_materials<R: Read>(
    reader: &mut R,
    names: &NameTable,
    count: u32,
) -> Result<Vec<Material>> {
    let mut materials = Vec::with_capacity(count as usize);
    for i in 0..count {
        let id = reader.read_i32_le()?;
        let name = names.get(reader.read_i32_le()?).map_err(|_| {
            Error::invalid_record(format!("material {i} has dangling name offset"))
        })?;
        let shader_name = names.get_or_unknown(reader.read_i32_le()?);

        let mut material = Material {
            id,
            name: name.to_string(),
            shader_name,
            properties: Vec::new(),
        };

        let property_count = reader.read_u32_le()?;
        for _ in 0..property_count {
            let prop_name = names.get_or_unknown(reader.read_i32_le()?);
            let category = reader.read_u32_le()?;
            let value = match category {
                0 => PropertyValue::Float(reader.read_f32_le()?),
                2 => PropertyValue::Name(names.get_or_unknown(reader.read_i32_le()?)),
                _ => PropertyValue::Int {
                    category,
                    value: reader.read_i32_le()?,
                },
            };
            material
                .properties
                .push(MaterialProperty { name: prop_name, value });
        }
        materials.push(material);
    }
    Ok(materials)
}

pub(crate) fn collect_material_names(materials: &[Material], names: &mut NameTable) {
    for material in materials {
        names.add(&material.name);
        names.add(&material.shader_name);
        for property in &material.properties {
            names.add(&property.name);
            if let PropertyValue::Name(value) = &property.value {
                names.add(value);
            }
        }
    }
}

pub(crate) fn write_materials<W: Write>(
    writer: &mut W,
    names: &NameTable,
    materials: &[Material],
) -> Result<()> {
    for material in materials {
        writer.write_i32_le(material.id)?;
        write_name_ref(writer, names, &material.name)?;
        write_name_ref(writer, names, &material.shader_name)?;
        writer.write_u32_le(material.properties.len() as u32)?;
        for property in &material.properties {
            write_name_ref(writer, names, &property.name)?;
            writer.write_u32_le(property.value.category())?;
            match &property.value {
                PropertyValue::Float(f) => writer.write_f32_le(*f)?,
                PropertyValue::Name(n) => write_name_ref(writer, names, n)?,
                PropertyValue::Int { value, .. } => writer.write_i32_le(*value)?,
            }
        }
    }
    Ok(())
}

pub(crate) fn write_name_ref<W: Write>(
    writer: &mut W,
    names: &NameTable,
    name: &str,
) -> Result<()> {
    let offset = names
        .offset_of(name)
        .ok_or_else(|| Error::invalid_record(format!("name '{name}' was never interned")))?;
    writer.write_i32_le(offset as i32)?;
    Ok(())
}

pub(crate) fn read_vertices<R: Read>(
    reader: &mut R,
    version: u32,
    count: u32,
) -> Result<Vec<Vertex>> {
    let mut vertices = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let position = reader.read_vec3_le()?;
        let normal = reader.read_vec3_le()?;
        let tint = if version <= 2 {
            [128, 128, 128, 255]
        } else {
            [
                reader.read_u8()?,
                reader.read_u8()?,
                reader.read_u8()?,
                reader.read_u8()?,
            ]
        };
        let uv = reader.read_vec2_le()?;
        let uv2 = if version <= 2 {
            Vec2::ZERO
        } else {
            reader.read_vec2_le()?
        };
        vertices.push(Vertex {
            position,
            normal,
            tint,
            uv,
            uv2,
        });
    }
    Ok(vertices)
}

pub(crate) fn write_vertices<W: Write>(
    writer: &mut W,
    version: u32,
    vertices: &[Vertex],
) -> Result<()> {
    for v in vertices {
        writer.write_vec3_le(v.position)?;
        writer.write_vec3_le(v.normal)?;
        if version > 2 {
            writer.write_all(&v.tint)?;
        }
        writer.write_vec2_le(v.uv)?;
        if version > 2 {
            writer.write_vec2_le(v.uv2)?;
        }
    }
    Ok(())
}

pub(crate) fn read_triangles<R: Read>(
    reader: &mut R,
    materials: &[Material],
    count: u32,
) -> Result<Vec<Triangle>> {
    let mut triangles = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let index = [
            reader.read_u32_le()?,
            reader.read_u32_le()?,
            reader.read_u32_le()?,
        ];
        let material_id = reader.read_i32_le()?;
        let material_name = match materials.iter().find(|m| m.id == material_id) {
            Some(material) => material.name.clone(),
            None => {
                if material_id != -1 {
                    log::warn!("triangle references unknown material id {material_id}");
                }
                String::new()
            }
        };
        let flags = reader.read_u32_le()?;
        triangles.push(Triangle {
            index,
            material_name,
            flags,
        });
    }
    Ok(triangles)
}

pub(crate) fn write_triangles<W: Write>(
    writer: &mut W,
    materials: &[Material],
    triangles: &[Triangle],
) -> Result<()> {
    for t in triangles {
        writer.write_u32_le(t.index[0])?;
        writer.write_u32_le(t.index[1])?;
        writer.write_u32_le(t.index[2])?;
        let material_id = materials
            .iter()
            .find(|m| m.name == t.material_name)
            .map_or(-1, |m| m.id);
        writer.write_i32_le(material_id)?;
        writer.write_u32_le(t.flags)?;
    }
    Ok(())
}
