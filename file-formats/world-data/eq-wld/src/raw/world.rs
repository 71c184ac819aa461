//! World geometry fragments: WorldTree (0x21), Region (0x22) and
//! Zone (0x29).

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};
use glam::{Vec2, Vec3, Vec4};

use crate::error::Result;
use crate::names::{decode_string, encode_string};

/// One BSP split plane. A leaf carries a 1-based region ordinal in
/// `region_ref`; internal nodes carry child node indices.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct WorldTreeNode {
    pub normal: Vec4,
    pub region_ref: i32,
    pub front_ref: i32,
    pub back_ref: i32,
}

/// WorldTree (0x21): the zone-level BSP tree.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WorldTree {
    pub name_ref: i32,
    pub nodes: Vec<WorldTreeNode>,
}

impl WorldTree {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let name_ref = r.read_i32_le()?;
        let count = r.read_u32_le()?;
        let mut nodes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            nodes.push(WorldTreeNode {
                normal: r.read_vec4_le()?,
                region_ref: r.read_i32_le()?,
                front_ref: r.read_i32_le()?,
                back_ref: r.read_i32_le()?,
            });
        }
        Ok(Self { name_ref, nodes })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.nodes.len() as u32)?;
        for node in &self.nodes {
            w.write_vec4_le(node.normal)?;
            w.write_i32_le(node.region_ref)?;
            w.write_i32_le(node.front_ref)?;
            w.write_i32_le(node.back_ref)?;
        }
        Ok(())
    }
}

/// A renderable wall of a BSP region.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RegionWall {
    pub flags: u32,
    pub render_method: u32,
    pub render_flags: u32,
    pub render_pen: u32,
    pub render_brightness: f32,
    pub render_scaled_ambient: f32,
    pub render_simple_sprite_ref: u32,
    pub render_uv_origin: Vec3,
    pub render_u_axis: Vec3,
    pub render_v_axis: Vec3,
    pub render_uv_map_entries: Vec<Vec2>,
    pub normal: Vec4,
    pub vertices: Vec<u32>,
}

/// A collision obstacle of a BSP region.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RegionObstacle {
    pub flags: u32,
    pub next_region: i32,
    /// -15 carries a plane normal, 18 carries an edge wall index
    pub kind: i32,
    pub vertices: Vec<u32>,
    pub normal: Vec4,
    pub edge_wall: u32,
    pub user_data: String,
}

/// A visibility BSP node inside a region.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VisNode {
    pub normal: Vec4,
    pub vis_list_index: u32,
    pub front_tree: u32,
    pub back_tree: u32,
}

/// A run-length-coded list of visible region ordinals.
///
/// Entries are single bytes when the region's `flags & 0x80` is set and
/// 16-bit pairs otherwise.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct VisList {
    pub ranges: Vec<u8>,
}

/// Region (0x22): one leaf of the zone BSP with geometry, obstacles and
/// visibility data.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Region {
    pub name_ref: i32,
    pub flags: u32,
    pub ambient_light_ref: i32,
    pub cutting_obstacle_count: u32,
    pub region_vertices: Vec<Vec3>,
    pub region_proximals: Vec<Vec2>,
    pub render_vertices: Vec<Vec3>,
    pub walls: Vec<RegionWall>,
    pub obstacles: Vec<RegionObstacle>,
    pub vis_nodes: Vec<VisNode>,
    pub vis_lists: Vec<VisList>,
    /// Present when `flags & 0x01`
    pub sphere: [f32; 4],
    /// Present when `flags & 0x02`
    pub reverb_volume: f32,
    /// Present when `flags & 0x04`
    pub reverb_offset: i32,
    pub user_data: String,
    /// Present when `flags & 0x100`
    pub mesh_ref: i32,
}

impl Region {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let mut frag = Self {
            name_ref: r.read_i32_le()?,
            flags: r.read_u32_le()?,
            ambient_light_ref: r.read_i32_le()?,
            ..Self::default()
        };
        let region_vertex_count = r.read_u32_le()?;
        let region_proximal_count = r.read_u32_le()?;
        let render_vertex_count = r.read_u32_le()?;
        let wall_count = r.read_u32_le()?;
        let obstacle_count = r.read_u32_le()?;
        frag.cutting_obstacle_count = r.read_u32_le()?;
        let vis_node_count = r.read_u32_le()?;
        let vis_list_count = r.read_u32_le()?;
        for _ in 0..region_vertex_count {
            frag.region_vertices.push(r.read_vec3_le()?);
        }
        for _ in 0..region_proximal_count {
            frag.region_proximals.push(r.read_vec2_le()?);
        }
        for _ in 0..render_vertex_count {
            frag.render_vertices.push(r.read_vec3_le()?);
        }
        for _ in 0..wall_count {
            let mut wall = RegionWall {
                flags: r.read_u32_le()?,
                ..RegionWall::default()
            };
            let vertex_count = r.read_u32_le()?;
            wall.render_method = r.read_u32_le()?;
            wall.render_flags = r.read_u32_le()?;
            wall.render_pen = r.read_u32_le()?;
            wall.render_brightness = r.read_f32_le()?;
            wall.render_scaled_ambient = r.read_f32_le()?;
            wall.render_simple_sprite_ref = r.read_u32_le()?;
            wall.render_uv_origin = r.read_vec3_le()?;
            wall.render_u_axis = r.read_vec3_le()?;
            wall.render_v_axis = r.read_vec3_le()?;
            let uv_count = r.read_u32_le()?;
            for _ in 0..uv_count {
                wall.render_uv_map_entries.push(r.read_vec2_le()?);
            }
            wall.normal = r.read_vec4_le()?;
            for _ in 0..vertex_count {
                wall.vertices.push(r.read_u32_le()?);
            }
            frag.walls.push(wall);
        }
        for _ in 0..obstacle_count {
            let mut obstacle = RegionObstacle {
                flags: r.read_u32_le()?,
                next_region: r.read_i32_le()?,
                kind: r.read_i32_le()?,
                ..RegionObstacle::default()
            };
            let vertex_count = r.read_u32_le()?;
            for _ in 0..vertex_count {
                obstacle.vertices.push(r.read_u32_le()?);
            }
            if obstacle.kind == -15 {
                obstacle.normal = r.read_vec4_le()?;
            }
            if obstacle.kind == 18 {
                obstacle.edge_wall = r.read_u32_le()?;
            }
            if obstacle.flags & 0x04 != 0 {
                let len = r.read_u32_le()? as usize;
                let raw = r.read_bytes(len)?;
                obstacle.user_data = String::from_utf8_lossy(&raw).into_owned();
            }
            frag.obstacles.push(obstacle);
        }
        for _ in 0..vis_node_count {
            frag.vis_nodes.push(VisNode {
                normal: r.read_vec4_le()?,
                vis_list_index: r.read_u32_le()?,
                front_tree: r.read_u32_le()?,
                back_tree: r.read_u32_le()?,
            });
        }
        for _ in 0..vis_list_count {
            let mut vis_list = VisList::default();
            let range_count = r.read_u16_le()?;
            for _ in 0..range_count {
                if frag.flags & 0x80 != 0 {
                    vis_list.ranges.push(r.read_u8()?);
                } else {
                    vis_list.ranges.push(r.read_u8()?);
                    vis_list.ranges.push(r.read_u8()?);
                }
            }
            frag.vis_lists.push(vis_list);
        }
        if frag.flags & 0x01 != 0 {
            for v in &mut frag.sphere {
                *v = r.read_f32_le()?;
            }
        }
        if frag.flags & 0x02 != 0 {
            frag.reverb_volume = r.read_f32_le()?;
        }
        if frag.flags & 0x04 != 0 {
            frag.reverb_offset = r.read_i32_le()?;
        }
        let user_data_len = r.read_u32_le()? as usize;
        if user_data_len > 0 {
            let raw = r.read_bytes(user_data_len)?;
            frag.user_data = String::from_utf8_lossy(&raw).into_owned();
        }
        if frag.flags & 0x100 != 0 {
            frag.mesh_ref = r.read_i32_le()?;
        }
        Ok(frag)
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_i32_le(self.ambient_light_ref)?;
        w.write_u32_le(self.region_vertices.len() as u32)?;
        w.write_u32_le(self.region_proximals.len() as u32)?;
        w.write_u32_le(self.render_vertices.len() as u32)?;
        w.write_u32_le(self.walls.len() as u32)?;
        w.write_u32_le(self.obstacles.len() as u32)?;
        w.write_u32_le(self.cutting_obstacle_count)?;
        w.write_u32_le(self.vis_nodes.len() as u32)?;
        w.write_u32_le(self.vis_lists.len() as u32)?;
        for vertex in &self.region_vertices {
            w.write_vec3_le(*vertex)?;
        }
        for proximal in &self.region_proximals {
            w.write_vec2_le(*proximal)?;
        }
        for vertex in &self.render_vertices {
            w.write_vec3_le(*vertex)?;
        }
        for wall in &self.walls {
            w.write_u32_le(wall.flags)?;
            w.write_u32_le(wall.vertices.len() as u32)?;
            w.write_u32_le(wall.render_method)?;
            w.write_u32_le(wall.render_flags)?;
            w.write_u32_le(wall.render_pen)?;
            w.write_f32_le(wall.render_brightness)?;
            w.write_f32_le(wall.render_scaled_ambient)?;
            w.write_u32_le(wall.render_simple_sprite_ref)?;
            w.write_vec3_le(wall.render_uv_origin)?;
            w.write_vec3_le(wall.render_u_axis)?;
            w.write_vec3_le(wall.render_v_axis)?;
            w.write_u32_le(wall.render_uv_map_entries.len() as u32)?;
            for entry in &wall.render_uv_map_entries {
                w.write_vec2_le(*entry)?;
            }
            w.write_vec4_le(wall.normal)?;
            for vertex in &wall.vertices {
                w.write_u32_le(*vertex)?;
            }
        }
        for obstacle in &self.obstacles {
            w.write_u32_le(obstacle.flags)?;
            w.write_i32_le(obstacle.next_region)?;
            w.write_i32_le(obstacle.kind)?;
            w.write_u32_le(obstacle.vertices.len() as u32)?;
            for vertex in &obstacle.vertices {
                w.write_u32_le(*vertex)?;
            }
            if obstacle.kind == -15 {
                w.write_vec4_le(obstacle.normal)?;
            }
            if obstacle.kind == 18 {
                w.write_u32_le(obstacle.edge_wall)?;
            }
            if obstacle.flags & 0x04 != 0 {
                w.write_u32_le(obstacle.user_data.len() as u32)?;
                w.write_all(obstacle.user_data.as_bytes())?;
            }
        }
        for vis_node in &self.vis_nodes {
            w.write_vec4_le(vis_node.normal)?;
            w.write_u32_le(vis_node.vis_list_index)?;
            w.write_u32_le(vis_node.front_tree)?;
            w.write_u32_le(vis_node.back_tree)?;
        }
        for vis_list in &self.vis_lists {
            if self.flags & 0x80 != 0 {
                w.write_u16_le(vis_list.ranges.len() as u16)?;
            } else {
                w.write_u16_le((vis_list.ranges.len() / 2) as u16)?;
            }
            w.write_all(&vis_list.ranges)?;
        }
        if self.flags & 0x01 != 0 {
            for v in &self.sphere {
                w.write_f32_le(*v)?;
            }
        }
        if self.flags & 0x02 != 0 {
            w.write_f32_le(self.reverb_volume)?;
        }
        if self.flags & 0x04 != 0 {
            w.write_i32_le(self.reverb_offset)?;
        }
        w.write_u32_le(self.user_data.len() as u32)?;
        w.write_all(self.user_data.as_bytes())?;
        if self.flags & 0x100 != 0 {
            w.write_i32_le(self.mesh_ref)?;
        }
        Ok(())
    }
}

/// Zone (0x29): a named group of region ordinals (water volumes, PvP
/// areas, teleports).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Zone {
    pub name_ref: i32,
    pub flags: u32,
    /// Zero-based ordinals of member regions
    pub regions: Vec<u32>,
    /// XOR-coded free-form text on disk
    pub user_data: String,
}

impl Zone {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let name_ref = r.read_i32_le()?;
        let flags = r.read_u32_le()?;
        let count = r.read_u32_le()?;
        let mut regions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            regions.push(r.read_u32_le()?);
        }
        let user_data_size = r.read_u32_le()? as usize;
        let user_data = if user_data_size > 0 {
            let raw = r.read_bytes(user_data_size)?;
            let decoded = decode_string(&raw);
            String::from_utf8_lossy(&decoded).into_owned()
        } else {
            String::new()
        };
        Ok(Self {
            name_ref,
            flags,
            regions,
            user_data,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_u32_le(self.regions.len() as u32)?;
        for region in &self.regions {
            w.write_u32_le(*region)?;
        }
        let coded = encode_string(self.user_data.as_bytes());
        w.write_u32_le(coded.len() as u32)?;
        if !coded.is_empty() {
            w.write_all(&coded)?;
            let padding = (4 - coded.len() % 4) % 4;
            w.write_all(&vec![0u8; padding])?;
        }
        Ok(())
    }
}
