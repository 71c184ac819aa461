//! Actor fragments: ActorDef (0x14) and Actor (0x15).

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};
use glam::Vec3;

use crate::error::Result;
use crate::names::{decode_string, encode_string};

/// ActorDef flag bits.
pub const ACTOR_HAS_CURRENT_ACTION: u32 = 0x0001;
pub const ACTOR_HAS_LOCATION: u32 = 0x0002;
pub const ACTOR_HAS_BOUNDING_RADIUS: u32 = 0x0004;
pub const ACTOR_HAS_SCALE_FACTOR: u32 = 0x0008;
pub const ACTOR_HAS_SOUND: u32 = 0x0010;

/// One action of an actor definition, with level-of-detail distances.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActorAction {
    pub unk1: u32,
    pub lods: Vec<f32>,
}

/// ActorDef (0x14): a placeable object or character definition that
/// bundles sprite references (skeletons, meshes, cameras).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ActorDef {
    pub name_ref: i32,
    pub flags: u32,
    pub callback_name_ref: i32,
    /// Reference to a sphere, sphere list or polyhedron bounds fragment
    pub bounds_ref: i32,
    /// Present when `flags & 0x1`
    pub current_action: u32,
    /// Present when `flags & 0x2`
    pub location: [f32; 6],
    pub unk1: u32,
    pub actions: Vec<ActorAction>,
    pub sprite_refs: Vec<u32>,
    /// XOR-coded free-form text on disk
    pub user_data: String,
}

impl ActorDef {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let name_ref = r.read_i32_le()?;
        let flags = r.read_u32_le()?;
        let callback_name_ref = r.read_i32_le()?;
        let action_count = r.read_u32_le()?;
        let sprite_count = r.read_u32_le()?;
        let bounds_ref = r.read_i32_le()?;
        let mut frag = Self {
            name_ref,
            flags,
            callback_name_ref,
            bounds_ref,
            ..Self::default()
        };
        if flags & ACTOR_HAS_CURRENT_ACTION != 0 {
            frag.current_action = r.read_u32_le()?;
        }
        if flags & ACTOR_HAS_LOCATION != 0 {
            for v in &mut frag.location {
                *v = r.read_f32_le()?;
            }
            frag.unk1 = r.read_u32_le()?;
        }
        for _ in 0..action_count {
            let lod_count = r.read_u32_le()?;
            let mut action = ActorAction {
                unk1: r.read_u32_le()?,
                lods: Vec::with_capacity(lod_count as usize),
            };
            for _ in 0..lod_count {
                action.lods.push(r.read_f32_le()?);
            }
            frag.actions.push(action);
        }
        for _ in 0..sprite_count {
            frag.sprite_refs.push(r.read_u32_le()?);
        }
        let user_data_size = r.read_u32_le()? as usize;
        if user_data_size > 0 {
            let raw = r.read_bytes(user_data_size)?;
            let decoded = decode_string(&raw);
            frag.user_data = String::from_utf8_lossy(&decoded).into_owned();
        }
        Ok(frag)
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_i32_le(self.callback_name_ref)?;
        w.write_u32_le(self.actions.len() as u32)?;
        w.write_u32_le(self.sprite_refs.len() as u32)?;
        w.write_i32_le(self.bounds_ref)?;
        if self.flags & ACTOR_HAS_CURRENT_ACTION != 0 {
            w.write_u32_le(self.current_action)?;
        }
        if self.flags & ACTOR_HAS_LOCATION != 0 {
            for v in &self.location {
                w.write_f32_le(*v)?;
            }
            w.write_u32_le(self.unk1)?;
        }
        for action in &self.actions {
            w.write_u32_le(action.lods.len() as u32)?;
            w.write_u32_le(action.unk1)?;
            for lod in &action.lods {
                w.write_f32_le(*lod)?;
            }
        }
        for sprite_ref in &self.sprite_refs {
            w.write_u32_le(*sprite_ref)?;
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

/// Actor (0x15): a placed instance of an ActorDef.
///
/// `actor_def_ref` is positive when it indexes a fragment in this stream
/// and negative when it names a definition from another file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Actor {
    pub name_ref: i32,
    pub actor_def_ref: i32,
    pub flags: u32,
    pub sphere_ref: u32,
    /// Present when `flags & 0x1`
    pub current_action: u32,
    /// Present when `flags & 0x2`
    pub offset: Vec3,
    pub rotation: Vec3,
    pub unk1: u32,
    /// Present when `flags & 0x4`
    pub bounding_radius: f32,
    /// Present when `flags & 0x8`
    pub scale: f32,
    /// Present when `flags & 0x10`
    pub sound_name_ref: i32,
    pub unk2: i32,
}

impl Actor {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let mut frag = Self {
            name_ref: r.read_i32_le()?,
            actor_def_ref: r.read_i32_le()?,
            flags: r.read_u32_le()?,
            sphere_ref: r.read_u32_le()?,
            ..Self::default()
        };
        if frag.flags & ACTOR_HAS_CURRENT_ACTION != 0 {
            frag.current_action = r.read_u32_le()?;
        }
        if frag.flags & ACTOR_HAS_LOCATION != 0 {
            frag.offset = r.read_vec3_le()?;
            frag.rotation = r.read_vec3_le()?;
            frag.unk1 = r.read_u32_le()?;
        }
        if frag.flags & ACTOR_HAS_BOUNDING_RADIUS != 0 {
            frag.bounding_radius = r.read_f32_le()?;
        }
        if frag.flags & ACTOR_HAS_SCALE_FACTOR != 0 {
            frag.scale = r.read_f32_le()?;
        }
        if frag.flags & ACTOR_HAS_SOUND != 0 {
            frag.sound_name_ref = r.read_i32_le()?;
        }
        frag.unk2 = r.read_i32_le()?;
        Ok(frag)
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_i32_le(self.actor_def_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_u32_le(self.sphere_ref)?;
        if self.flags & ACTOR_HAS_CURRENT_ACTION != 0 {
            w.write_u32_le(self.current_action)?;
        }
        if self.flags & ACTOR_HAS_LOCATION != 0 {
            w.write_vec3_le(self.offset)?;
            w.write_vec3_le(self.rotation)?;
            w.write_u32_le(self.unk1)?;
        }
        if self.flags & ACTOR_HAS_BOUNDING_RADIUS != 0 {
            w.write_f32_le(self.bounding_radius)?;
        }
        if self.flags & ACTOR_HAS_SCALE_FACTOR != 0 {
            w.write_f32_le(self.scale)?;
        }
        if self.flags & ACTOR_HAS_SOUND != 0 {
            w.write_i32_le(self.sound_name_ref)?;
        }
        w.write_i32_le(self.unk2)?;
        Ok(())
    }
}
