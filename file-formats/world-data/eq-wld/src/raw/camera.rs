//! Camera fragments: Sprite3DDef (0x08) and Sprite3D (0x09).

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};
use glam::Vec3;

use crate::error::Result;

/// Texture-plane parameters inside a 3D sprite BSP node.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Sprite3DUvInfo {
    pub uv_origin: [f32; 3],
    pub u_axis: [f32; 3],
    pub v_axis: [f32; 3],
}

/// One node of a 3D sprite's internal BSP.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sprite3DBspNode {
    pub front_tree: u32,
    pub back_tree: u32,
    pub vertex_indexes: Vec<u32>,
    pub render_method: u32,
    pub render_flags: u8,
    /// Present when `render_flags & 0x01`
    pub render_pen: u32,
    /// Present when `render_flags & 0x02`
    pub render_brightness: f32,
    /// Present when `render_flags & 0x04`
    pub render_scaled_ambient: f32,
    /// Present when `render_flags & 0x08`
    pub render_simple_sprite_ref: u32,
    /// Present when `render_flags & 0x10`
    pub render_uv_origin: Vec3,
    pub render_u_axis: Vec3,
    pub render_v_axis: Vec3,
    /// Present when `render_flags & 0x20`
    pub render_uv_map_entries: Vec<Sprite3DUvInfo>,
}

/// Sprite3DDef (0x08): a camera or generic 3D sprite definition.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sprite3DDef {
    pub name_ref: i32,
    pub flags: u32,
    pub sphere_list_ref: u32,
    /// Present when `flags & 0x01`
    pub center_offset: Vec3,
    /// Present when `flags & 0x02`
    pub radius: f32,
    pub vertices: Vec<Vec3>,
    pub bsp_nodes: Vec<Sprite3DBspNode>,
}

impl Sprite3DDef {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let name_ref = r.read_i32_le()?;
        let flags = r.read_u32_le()?;
        let vertex_count = r.read_u32_le()?;
        let node_count = r.read_u32_le()?;
        let sphere_list_ref = r.read_u32_le()?;
        let mut frag = Self {
            name_ref,
            flags,
            sphere_list_ref,
            ..Self::default()
        };
        if flags & 0x01 != 0 {
            frag.center_offset = r.read_vec3_le()?;
        }
        if flags & 0x02 != 0 {
            frag.radius = r.read_f32_le()?;
        }
        for _ in 0..vertex_count {
            frag.vertices.push(r.read_vec3_le()?);
        }
        for _ in 0..node_count {
            let index_count = r.read_u32_le()?;
            let mut node = Sprite3DBspNode {
                front_tree: r.read_u32_le()?,
                back_tree: r.read_u32_le()?,
                ..Sprite3DBspNode::default()
            };
            for _ in 0..index_count {
                node.vertex_indexes.push(r.read_u32_le()?);
            }
            node.render_method = r.read_u32_le()?;
            node.render_flags = r.read_u8()?;
            if node.render_flags & 0x01 != 0 {
                node.render_pen = r.read_u32_le()?;
            }
            if node.render_flags & 0x02 != 0 {
                node.render_brightness = r.read_f32_le()?;
            }
            if node.render_flags & 0x04 != 0 {
                node.render_scaled_ambient = r.read_f32_le()?;
            }
            if node.render_flags & 0x08 != 0 {
                node.render_simple_sprite_ref = r.read_u32_le()?;
            }
            if node.render_flags & 0x10 != 0 {
                node.render_uv_origin = r.read_vec3_le()?;
                node.render_u_axis = r.read_vec3_le()?;
                node.render_v_axis = r.read_vec3_le()?;
            }
            if node.render_flags & 0x20 != 0 {
                let entry_count = r.read_u32_le()?;
                for _ in 0..entry_count {
                    node.render_uv_map_entries.push(Sprite3DUvInfo {
                        uv_origin: [r.read_f32_le()?, r.read_f32_le()?, r.read_f32_le()?],
                        u_axis: [r.read_f32_le()?, r.read_f32_le()?, r.read_f32_le()?],
                        v_axis: [r.read_f32_le()?, r.read_f32_le()?, r.read_f32_le()?],
                    });
                }
            }
            frag.bsp_nodes.push(node);
        }
        Ok(frag)
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_u32_le(self.vertices.len() as u32)?;
        w.write_u32_le(self.bsp_nodes.len() as u32)?;
        w.write_u32_le(self.sphere_list_ref)?;
        if self.flags & 0x01 != 0 {
            w.write_vec3_le(self.center_offset)?;
        }
        if self.flags & 0x02 != 0 {
            w.write_f32_le(self.radius)?;
        }
        for vertex in &self.vertices {
            w.write_vec3_le(*vertex)?;
        }
        for node in &self.bsp_nodes {
            w.write_u32_le(node.vertex_indexes.len() as u32)?;
            w.write_u32_le(node.front_tree)?;
            w.write_u32_le(node.back_tree)?;
            for index in &node.vertex_indexes {
                w.write_u32_le(*index)?;
            }
            w.write_u32_le(node.render_method)?;
            w.write_u8(node.render_flags)?;
            if node.render_flags & 0x01 != 0 {
                w.write_u32_le(node.render_pen)?;
            }
            if node.render_flags & 0x02 != 0 {
                w.write_f32_le(node.render_brightness)?;
            }
            if node.render_flags & 0x04 != 0 {
                w.write_f32_le(node.render_scaled_ambient)?;
            }
            if node.render_flags & 0x08 != 0 {
                w.write_u32_le(node.render_simple_sprite_ref)?;
            }
            if node.render_flags & 0x10 != 0 {
                w.write_vec3_le(node.render_uv_origin)?;
                w.write_vec3_le(node.render_u_axis)?;
                w.write_vec3_le(node.render_v_axis)?;
            }
            if node.render_flags & 0x20 != 0 {
                w.write_u32_le(node.render_uv_map_entries.len() as u32)?;
                for entry in &node.render_uv_map_entries {
                    for v in entry
                        .uv_origin
                        .iter()
                        .chain(entry.u_axis.iter())
                        .chain(entry.v_axis.iter())
                    {
                        w.write_f32_le(*v)?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Sprite3D (0x09): instance of a Sprite3DDef.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sprite3D {
    pub name_ref: i32,
    pub sprite_3d_def_ref: i32,
    pub flags: u32,
}

impl Sprite3D {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        Ok(Self {
            name_ref: r.read_i32_le()?,
            sprite_3d_def_ref: r.read_i32_le()?,
            flags: r.read_u32_le()?,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_i32_le(self.sprite_3d_def_ref)?;
        w.write_u32_le(self.flags)?;
        Ok(())
    }
}
