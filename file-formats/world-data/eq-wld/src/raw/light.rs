//! Light fragments: LightDef (0x1B), Light (0x1C), PointLight (0x28),
//! AmbientLight (0x2A) and GlobalAmbientLightDef (0x35).

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};
use glam::Vec3;

use crate::error::Result;

/// LightDef (0x1B): light levels and colors over animation frames.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LightDef {
    pub name_ref: i32,
    pub flags: u32,
    /// Present when `flags & 0x1`
    pub frame_current_ref: u32,
    /// Present when `flags & 0x2`
    pub sleep: u32,
    /// Present when `flags & 0x4`
    pub light_levels: Vec<f32>,
    /// Present when `flags & 0x10`
    pub colors: Vec<Vec3>,
}

impl LightDef {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let name_ref = r.read_i32_le()?;
        let flags = r.read_u32_le()?;
        let frame_count = r.read_u32_le()?;
        let mut frag = Self {
            name_ref,
            flags,
            ..Self::default()
        };
        if flags & 0x1 != 0 {
            frag.frame_current_ref = r.read_u32_le()?;
        }
        if flags & 0x2 != 0 {
            frag.sleep = r.read_u32_le()?;
        }
        if flags & 0x4 != 0 {
            for _ in 0..frame_count {
                frag.light_levels.push(r.read_f32_le()?);
            }
        }
        if flags & 0x10 != 0 {
            for _ in 0..frame_count {
                frag.colors.push(r.read_vec3_le()?);
            }
        }
        Ok(frag)
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        let frame_count = self.light_levels.len().max(self.colors.len()) as u32;
        w.write_u32_le(frame_count)?;
        if self.flags & 0x1 != 0 {
            w.write_u32_le(self.frame_current_ref)?;
        }
        if self.flags & 0x2 != 0 {
            w.write_u32_le(self.sleep)?;
        }
        if self.flags & 0x4 != 0 {
            for level in &self.light_levels {
                w.write_f32_le(*level)?;
            }
        }
        if self.flags & 0x10 != 0 {
            for color in &self.colors {
                w.write_vec3_le(*color)?;
            }
        }
        Ok(())
    }
}

/// Light (0x1C): instance of a LightDef.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Light {
    pub name_ref: i32,
    pub light_def_ref: i32,
    pub flags: u32,
}

impl Light {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        Ok(Self {
            name_ref: r.read_i32_le()?,
            light_def_ref: r.read_i32_le()?,
            flags: r.read_u32_le()?,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_i32_le(self.light_def_ref)?;
        w.write_u32_le(self.flags)?;
        Ok(())
    }
}

/// PointLight (0x28): a placed light with position and radius.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PointLight {
    pub name_ref: i32,
    pub light_ref: i32,
    pub flags: u32,
    pub location: Vec3,
    pub radius: f32,
}

impl PointLight {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        Ok(Self {
            name_ref: r.read_i32_le()?,
            light_ref: r.read_i32_le()?,
            flags: r.read_u32_le()?,
            location: r.read_vec3_le()?,
            radius: r.read_f32_le()?,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_i32_le(self.light_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_vec3_le(self.location)?;
        w.write_f32_le(self.radius)?;
        Ok(())
    }
}

/// AmbientLight (0x2A): a light applied to a list of BSP regions.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AmbientLight {
    pub name_ref: i32,
    pub light_ref: i32,
    pub flags: u32,
    /// Zero-based ordinals of the regions the light applies to
    pub regions: Vec<u32>,
}

impl AmbientLight {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let name_ref = r.read_i32_le()?;
        let light_ref = r.read_i32_le()?;
        let flags = r.read_u32_le()?;
        let count = r.read_u32_le()?;
        let mut regions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            regions.push(r.read_u32_le()?);
        }
        Ok(Self {
            name_ref,
            light_ref,
            flags,
            regions,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_i32_le(self.light_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_u32_le(self.regions.len() as u32)?;
        for region in &self.regions {
            w.write_u32_le(*region)?;
        }
        Ok(())
    }
}

/// GlobalAmbientLightDef (0x35): a single named global ambient light.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GlobalAmbientLightDef {
    pub name_ref: i32,
}

impl GlobalAmbientLightDef {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        Ok(Self {
            name_ref: r.read_i32_le()?,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        Ok(())
    }
}
