//! Skeleton and animation fragments: HierarchicalSpriteDef (0x10),
//! HierarchicalSprite (0x11), TrackDef (0x12) and Track (0x13).

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};

use crate::error::Result;

/// One frame of a bone track. Rotation is a denominator-scaled quaternion,
/// shift a denominator-scaled translation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrackTransform {
    pub rotate_denominator: i16,
    pub rotate: [i16; 3],
    pub shift_denominator: i16,
    pub shift: [i16; 3],
}

/// TrackDef (0x12): per-bone animation frames.
///
/// Two frame encodings exist: when `flags & 0x08` is set each component is
/// a single byte, otherwise 16-bit components are stored shift-first.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TrackDef {
    pub name_ref: i32,
    pub flags: u32,
    pub transforms: Vec<TrackTransform>,
}

impl TrackDef {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let name_ref = r.read_i32_le()?;
        let flags = r.read_u32_le()?;
        let count = r.read_u32_le()?;
        let mut transforms = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let mut ft = TrackTransform::default();
            if flags & 0x08 != 0 {
                ft.rotate_denominator = i16::from(r.read_i8()?);
                for v in &mut ft.rotate {
                    *v = i16::from(r.read_i8()?);
                }
                ft.shift_denominator = i16::from(r.read_i8()?);
                for v in &mut ft.shift {
                    *v = i16::from(r.read_i8()?);
                }
            } else {
                ft.shift_denominator = r.read_i16_le()?;
                for v in &mut ft.shift {
                    *v = r.read_i16_le()?;
                }
                for v in &mut ft.rotate {
                    *v = r.read_i16_le()?;
                }
                ft.rotate_denominator = r.read_i16_le()?;
            }
            transforms.push(ft);
        }
        Ok(Self {
            name_ref,
            flags,
            transforms,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_u32_le(self.transforms.len() as u32)?;
        for ft in &self.transforms {
            if self.flags & 0x08 != 0 {
                w.write_i8(ft.rotate_denominator as i8)?;
                for v in &ft.rotate {
                    w.write_i8(*v as i8)?;
                }
                w.write_i8(ft.shift_denominator as i8)?;
                for v in &ft.shift {
                    w.write_i8(*v as i8)?;
                }
            } else {
                w.write_i16_le(ft.shift_denominator)?;
                for v in &ft.shift {
                    w.write_i16_le(*v)?;
                }
                for v in &ft.rotate {
                    w.write_i16_le(*v)?;
                }
                w.write_i16_le(ft.rotate_denominator)?;
            }
        }
        Ok(())
    }
}

/// Track (0x13): instance of a TrackDef attached to a skeleton bone.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Track {
    pub name_ref: i32,
    pub track_ref: i32,
    pub flags: u32,
    /// Milliseconds before the animation starts, present when `flags & 0x01`
    pub sleep: u32,
}

impl Track {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let name_ref = r.read_i32_le()?;
        let track_ref = r.read_i32_le()?;
        let flags = r.read_u32_le()?;
        let sleep = if flags & 0x01 != 0 {
            r.read_u32_le()?
        } else {
            0
        };
        Ok(Self {
            name_ref,
            track_ref,
            flags,
            sleep,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_i32_le(self.track_ref)?;
        w.write_u32_le(self.flags)?;
        if self.flags & 0x01 != 0 {
            w.write_u32_le(self.sleep)?;
        }
        Ok(())
    }
}

/// One bone of a skeleton hierarchy.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dag {
    pub name_ref: i32,
    pub flags: u32,
    pub track_ref: u32,
    /// Mesh, sprite or particle attached to the bone; 0 when none
    pub sprite_ref: u32,
    pub sub_dags: Vec<u32>,
}

/// HierarchicalSpriteDef (0x10): a skeleton of bones with optional
/// mesh attachments and skin links.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HierarchicalSpriteDef {
    pub name_ref: i32,
    pub flags: u32,
    pub collision_volume_ref: u32,
    /// Present when `flags & 0x1` is set
    pub center_offset: [f32; 3],
    /// Present when `flags & 0x2` is set
    pub bounding_radius: f32,
    pub dags: Vec<Dag>,
    /// DMSprite refs, present when `flags & 0x200` is set
    pub dm_sprite_refs: Vec<u32>,
    pub skin_links: Vec<u32>,
}

impl HierarchicalSpriteDef {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let name_ref = r.read_i32_le()?;
        let flags = r.read_u32_le()?;
        let dag_count = r.read_u32_le()?;
        let collision_volume_ref = r.read_u32_le()?;
        let mut frag = Self {
            name_ref,
            flags,
            collision_volume_ref,
            ..Self::default()
        };
        if flags & 0x1 != 0 {
            frag.center_offset = [r.read_f32_le()?, r.read_f32_le()?, r.read_f32_le()?];
        }
        if flags & 0x2 != 0 {
            frag.bounding_radius = r.read_f32_le()?;
        }
        for _ in 0..dag_count {
            let mut dag = Dag {
                name_ref: r.read_i32_le()?,
                flags: r.read_u32_le()?,
                track_ref: r.read_u32_le()?,
                sprite_ref: r.read_u32_le()?,
                sub_dags: Vec::new(),
            };
            let sub_count = r.read_u32_le()?;
            for _ in 0..sub_count {
                dag.sub_dags.push(r.read_u32_le()?);
            }
            frag.dags.push(dag);
        }
        if flags & 0x200 != 0 {
            let skin_count = r.read_u32_le()?;
            for _ in 0..skin_count {
                frag.dm_sprite_refs.push(r.read_u32_le()?);
            }
            for _ in 0..skin_count {
                frag.skin_links.push(r.read_u32_le()?);
            }
        }
        Ok(frag)
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_u32_le(self.dags.len() as u32)?;
        w.write_u32_le(self.collision_volume_ref)?;
        if self.flags & 0x1 != 0 {
            for v in &self.center_offset {
                w.write_f32_le(*v)?;
            }
        }
        if self.flags & 0x2 != 0 {
            w.write_f32_le(self.bounding_radius)?;
        }
        for dag in &self.dags {
            w.write_i32_le(dag.name_ref)?;
            w.write_u32_le(dag.flags)?;
            w.write_u32_le(dag.track_ref)?;
            w.write_u32_le(dag.sprite_ref)?;
            w.write_u32_le(dag.sub_dags.len() as u32)?;
            for sub in &dag.sub_dags {
                w.write_u32_le(*sub)?;
            }
        }
        if self.flags & 0x200 != 0 {
            w.write_u32_le(self.dm_sprite_refs.len() as u32)?;
            for dm_sprite in &self.dm_sprite_refs {
                w.write_u32_le(*dm_sprite)?;
            }
            for link in &self.skin_links {
                w.write_u32_le(*link)?;
            }
        }
        Ok(())
    }
}

/// HierarchicalSprite (0x11): instance of a skeleton.
///
/// Unlike nearly every other fragment, the name reference and the def
/// reference are 16-bit here.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct HierarchicalSprite {
    pub name_ref: i16,
    pub flags: u32,
    pub hierarchical_sprite_ref: i16,
}

impl HierarchicalSprite {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        Ok(Self {
            name_ref: r.read_i16_le()?,
            flags: r.read_u32_le()?,
            hierarchical_sprite_ref: r.read_i16_le()?,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i16_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_i16_le(self.hierarchical_sprite_ref)?;
        Ok(())
    }
}
