//! Mesh fragments: DmSpriteDef2 (0x36), DmSprite (0x2D) and Sphere (0x16).

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};

use crate::error::Result;

/// One triangle of a mesh. Flag 0x10 marks the face as passable.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MeshFace {
    pub flags: u16,
    pub index: [u16; 3],
}

/// An animation helper entry. When `type_field` is 4 it carries a float
/// offset, otherwise a pair of vertex indices.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MeshOp {
    pub index1: u16,
    pub index2: u16,
    pub offset: f32,
    pub param1: u8,
    pub type_field: u8,
}

/// DmSpriteDef2 (0x36): the main mesh fragment.
///
/// Vertices are stored as fixed-point triples scaled by `1 << scale`; UVs
/// are 16-bit fixed-point in old-world files and floats in new-world files.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DmSpriteDef2 {
    pub name_ref: i32,
    pub flags: u32,
    pub material_palette_ref: u32,
    pub dm_track_ref: i32,
    pub fragment3_ref: i32,
    pub fragment4_ref: i32,
    pub center_offset: [f32; 3],
    pub params2: [u32; 3],
    pub bounding_radius: f32,
    pub bounding_box_min: [f32; 3],
    pub bounding_box_max: [f32; 3],
    pub scale: u16,
    pub vertices: Vec<[i16; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub normals: Vec<[i8; 3]>,
    pub colors: Vec<[u8; 4]>,
    pub faces: Vec<MeshFace>,
    /// `(vertex_count, bone_index)` runs grouping vertices by skeleton bone
    pub skin_assignment_groups: Vec<[i16; 2]>,
    /// `(face_count, material_index)` runs grouping faces by palette entry
    pub face_material_groups: Vec<[u16; 2]>,
    pub vertex_material_groups: Vec<[i16; 2]>,
    pub mesh_ops: Vec<MeshOp>,
}

impl DmSpriteDef2 {
    pub(crate) fn read(r: &mut impl Read, is_new_world: bool) -> Result<Self> {
        let mut frag = Self {
            name_ref: r.read_i32_le()?,
            flags: r.read_u32_le()?,
            material_palette_ref: r.read_u32_le()?,
            dm_track_ref: r.read_i32_le()?,
            fragment3_ref: r.read_i32_le()?,
            fragment4_ref: r.read_i32_le()?,
            center_offset: [r.read_f32_le()?, r.read_f32_le()?, r.read_f32_le()?],
            params2: [r.read_u32_le()?, r.read_u32_le()?, r.read_u32_le()?],
            bounding_radius: r.read_f32_le()?,
            bounding_box_min: [r.read_f32_le()?, r.read_f32_le()?, r.read_f32_le()?],
            bounding_box_max: [r.read_f32_le()?, r.read_f32_le()?, r.read_f32_le()?],
            ..Self::default()
        };
        let vertex_count = r.read_u16_le()?;
        let uv_count = r.read_u16_le()?;
        let normal_count = r.read_u16_le()?;
        let color_count = r.read_u16_le()?;
        let face_count = r.read_u16_le()?;
        let skin_group_count = r.read_u16_le()?;
        let face_material_count = r.read_u16_le()?;
        let vertex_material_count = r.read_u16_le()?;
        let mesh_op_count = r.read_u16_le()?;
        frag.scale = r.read_u16_le()?;

        for _ in 0..vertex_count {
            frag.vertices
                .push([r.read_i16_le()?, r.read_i16_le()?, r.read_i16_le()?]);
        }
        for _ in 0..uv_count {
            if is_new_world {
                frag.uvs.push([r.read_f32_le()?, r.read_f32_le()?]);
            } else {
                frag.uvs
                    .push([f32::from(r.read_i16_le()?), f32::from(r.read_i16_le()?)]);
            }
        }
        for _ in 0..normal_count {
            frag.normals
                .push([r.read_i8()?, r.read_i8()?, r.read_i8()?]);
        }
        for _ in 0..color_count {
            frag.colors.push([
                r.read_u8()?,
                r.read_u8()?,
                r.read_u8()?,
                r.read_u8()?,
            ]);
        }
        for _ in 0..face_count {
            frag.faces.push(MeshFace {
                flags: r.read_u16_le()?,
                index: [r.read_u16_le()?, r.read_u16_le()?, r.read_u16_le()?],
            });
        }
        for _ in 0..skin_group_count {
            frag.skin_assignment_groups
                .push([r.read_i16_le()?, r.read_i16_le()?]);
        }
        for _ in 0..face_material_count {
            frag.face_material_groups
                .push([r.read_u16_le()?, r.read_u16_le()?]);
        }
        for _ in 0..vertex_material_count {
            frag.vertex_material_groups
                .push([r.read_i16_le()?, r.read_i16_le()?]);
        }
        for _ in 0..mesh_op_count {
            let raw = r.read_bytes(4)?;
            let param1 = r.read_u8()?;
            let type_field = r.read_u8()?;
            let mut op = MeshOp {
                param1,
                type_field,
                ..MeshOp::default()
            };
            if type_field == 4 {
                op.offset = f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            } else {
                op.index1 = u16::from_le_bytes([raw[0], raw[1]]);
                op.index2 = u16::from_le_bytes([raw[2], raw[3]]);
            }
            frag.mesh_ops.push(op);
        }
        Ok(frag)
    }

    pub(crate) fn write(&self, w: &mut impl Write, is_new_world: bool) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_u32_le(self.material_palette_ref)?;
        w.write_i32_le(self.dm_track_ref)?;
        w.write_i32_le(self.fragment3_ref)?;
        w.write_i32_le(self.fragment4_ref)?;
        for v in &self.center_offset {
            w.write_f32_le(*v)?;
        }
        for v in &self.params2 {
            w.write_u32_le(*v)?;
        }
        w.write_f32_le(self.bounding_radius)?;
        for v in &self.bounding_box_min {
            w.write_f32_le(*v)?;
        }
        for v in &self.bounding_box_max {
            w.write_f32_le(*v)?;
        }
        w.write_u16_le(self.vertices.len() as u16)?;
        w.write_u16_le(self.uvs.len() as u16)?;
        w.write_u16_le(self.normals.len() as u16)?;
        w.write_u16_le(self.colors.len() as u16)?;
        w.write_u16_le(self.faces.len() as u16)?;
        w.write_u16_le(self.skin_assignment_groups.len() as u16)?;
        w.write_u16_le(self.face_material_groups.len() as u16)?;
        w.write_u16_le(self.vertex_material_groups.len() as u16)?;
        w.write_u16_le(self.mesh_ops.len() as u16)?;
        w.write_u16_le(self.scale)?;
        for vertex in &self.vertices {
            for v in vertex {
                w.write_i16_le(*v)?;
            }
        }
        for uv in &self.uvs {
            if is_new_world {
                w.write_f32_le(uv[0])?;
                w.write_f32_le(uv[1])?;
            } else {
                w.write_i16_le(uv[0] as i16)?;
                w.write_i16_le(uv[1] as i16)?;
            }
        }
        for normal in &self.normals {
            for v in normal {
                w.write_i8(*v)?;
            }
        }
        for color in &self.colors {
            w.write_all(color)?;
        }
        for face in &self.faces {
            w.write_u16_le(face.flags)?;
            for v in &face.index {
                w.write_u16_le(*v)?;
            }
        }
        for group in &self.skin_assignment_groups {
            w.write_i16_le(group[0])?;
            w.write_i16_le(group[1])?;
        }
        for group in &self.face_material_groups {
            w.write_u16_le(group[0])?;
            w.write_u16_le(group[1])?;
        }
        for group in &self.vertex_material_groups {
            w.write_i16_le(group[0])?;
            w.write_i16_le(group[1])?;
        }
        for op in &self.mesh_ops {
            if op.type_field == 4 {
                w.write_f32_le(op.offset)?;
            } else {
                w.write_u16_le(op.index1)?;
                w.write_u16_le(op.index2)?;
            }
            w.write_u8(op.param1)?;
            w.write_u8(op.type_field)?;
        }
        Ok(())
    }
}

/// DmSprite (0x2D): instance of a mesh.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DmSprite {
    pub name_ref: i32,
    pub dm_sprite_ref: i32,
    pub params: u32,
}

impl DmSprite {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        Ok(Self {
            name_ref: r.read_i32_le()?,
            dm_sprite_ref: r.read_i32_le()?,
            params: r.read_u32_le()?,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_i32_le(self.dm_sprite_ref)?;
        w.write_u32_le(self.params)?;
        Ok(())
    }
}

/// Sphere (0x16): a bounding sphere, typically referenced by an actor
/// instance.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sphere {
    pub name_ref: i32,
    pub radius: f32,
}

impl Sphere {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        Ok(Self {
            name_ref: r.read_i32_le()?,
            radius: r.read_f32_le()?,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_f32_le(self.radius)?;
        Ok(())
    }
}
