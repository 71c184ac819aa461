//! Texture and material fragments: BmInfo (0x03), SimpleSpriteDef (0x04),
//! SimpleSprite (0x05), BlitSpriteDef (0x26), MaterialDef (0x30) and
//! MaterialPalette (0x31).

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};

use crate::error::Result;
use crate::names::{decode_string, encode_string};

/// BmInfo (0x03): a list of bitmap file names, XOR-coded on disk.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BmInfo {
    pub name_ref: i32,
    pub texture_names: Vec<String>,
}

impl BmInfo {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let name_ref = r.read_i32_le()?;
        // stored count is one less than the actual number of names
        let count = r.read_i32_le()?.wrapping_add(1);
        let mut texture_names = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count {
            let len = r.read_u16_le()? as usize;
            let raw = r.read_bytes(len)?;
            let mut decoded = decode_string(&raw);
            while decoded.last() == Some(&0) {
                decoded.pop();
            }
            texture_names.push(String::from_utf8_lossy(&decoded).into_owned());
        }
        Ok(Self {
            name_ref,
            texture_names,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_i32_le(self.texture_names.len() as i32 - 1)?;
        for name in &self.texture_names {
            let mut plain = name.as_bytes().to_vec();
            plain.push(0);
            let coded = encode_string(&plain);
            w.write_u16_le(coded.len() as u16)?;
            w.write_all(&coded)?;
        }
        Ok(())
    }
}

/// SimpleSpriteDef (0x04): an animated set of bitmap references.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SimpleSpriteDef {
    pub name_ref: i32,
    pub flags: u32,
    /// Present when `flags & 0x20` is set
    pub current_frame: i32,
    /// Frame delay in ms, present when `flags & 0x08` and `flags & 0x10` are set
    pub sleep: u32,
    pub bitmap_refs: Vec<u32>,
}

impl SimpleSpriteDef {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let name_ref = r.read_i32_le()?;
        let flags = r.read_u32_le()?;
        let count = r.read_u32_le()?;
        let mut frag = Self {
            name_ref,
            flags,
            ..Self::default()
        };
        if flags & 0x20 != 0 {
            frag.current_frame = r.read_i32_le()?;
        }
        if flags & 0x08 != 0 && flags & 0x10 != 0 {
            frag.sleep = r.read_u32_le()?;
        }
        for _ in 0..count {
            frag.bitmap_refs.push(r.read_u32_le()?);
        }
        Ok(frag)
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_u32_le(self.bitmap_refs.len() as u32)?;
        if self.flags & 0x20 != 0 {
            w.write_i32_le(self.current_frame)?;
        }
        if self.flags & 0x08 != 0 && self.flags & 0x10 != 0 {
            w.write_u32_le(self.sleep)?;
        }
        for bitmap_ref in &self.bitmap_refs {
            w.write_u32_le(*bitmap_ref)?;
        }
        Ok(())
    }
}

/// SimpleSprite (0x05): instance of a SimpleSpriteDef.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SimpleSprite {
    pub name_ref: i32,
    pub sprite_ref: i16,
    pub flags: u32,
}

impl SimpleSprite {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        Ok(Self {
            name_ref: r.read_i32_le()?,
            sprite_ref: r.read_i16_le()?,
            flags: r.read_u32_le()?,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_i16_le(self.sprite_ref)?;
        w.write_u32_le(self.flags)?;
        // observed in retail files: two trailing pad bytes
        w.write_all(&[0, 0])?;
        Ok(())
    }
}

/// BlitSpriteDef (0x26): a particle sprite referencing a SimpleSprite.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BlitSpriteDef {
    pub name_ref: i32,
    pub flags: u32,
    pub sprite_instance_ref: u32,
    pub unknown: i32,
}

impl BlitSpriteDef {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        Ok(Self {
            name_ref: r.read_i32_le()?,
            flags: r.read_u32_le()?,
            sprite_instance_ref: r.read_u32_le()?,
            unknown: r.read_i32_le()?,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_u32_le(self.sprite_instance_ref)?;
        w.write_i32_le(self.unknown)?;
        Ok(())
    }
}

/// MaterialDef (0x30): render method, tint and a sprite instance reference.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MaterialDef {
    pub name_ref: i32,
    pub flags: u32,
    pub render_method: u32,
    pub rgb_pen: [u8; 4],
    pub brightness: f32,
    pub scaled_ambient: f32,
    pub sprite_instance_ref: u32,
    /// Pair fields are present when `flags & 0x2` is set
    pub pair1: u32,
    pub pair2: f32,
}

impl MaterialDef {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let mut frag = Self {
            name_ref: r.read_i32_le()?,
            flags: r.read_u32_le()?,
            render_method: r.read_u32_le()?,
            rgb_pen: [
                r.read_u8()?,
                r.read_u8()?,
                r.read_u8()?,
                r.read_u8()?,
            ],
            brightness: r.read_f32_le()?,
            scaled_ambient: r.read_f32_le()?,
            sprite_instance_ref: r.read_u32_le()?,
            ..Self::default()
        };
        if frag.flags & 0x2 != 0 {
            frag.pair1 = r.read_u32_le()?;
            frag.pair2 = r.read_f32_le()?;
        }
        Ok(frag)
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_u32_le(self.render_method)?;
        w.write_all(&self.rgb_pen)?;
        w.write_f32_le(self.brightness)?;
        w.write_f32_le(self.scaled_ambient)?;
        w.write_u32_le(self.sprite_instance_ref)?;
        if self.flags & 0x2 != 0 {
            w.write_u32_le(self.pair1)?;
            w.write_f32_le(self.pair2)?;
        }
        Ok(())
    }
}

/// MaterialPalette (0x31): the ordered material list a mesh indexes into.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MaterialPalette {
    pub name_ref: i32,
    pub flags: u32,
    pub material_refs: Vec<u32>,
}

impl MaterialPalette {
    pub(crate) fn read(r: &mut impl Read) -> Result<Self> {
        let name_ref = r.read_i32_le()?;
        let flags = r.read_u32_le()?;
        let count = r.read_u32_le()?;
        let mut material_refs = Vec::with_capacity(count as usize);
        for _ in 0..count {
            material_refs.push(r.read_u32_le()?);
        }
        Ok(Self {
            name_ref,
            flags,
            material_refs,
        })
    }

    pub(crate) fn write(&self, w: &mut impl Write) -> Result<()> {
        w.write_i32_le(self.name_ref)?;
        w.write_u32_le(self.flags)?;
        w.write_u32_le(self.material_refs.len() as u32)?;
        for material_ref in &self.material_refs {
            w.write_u32_le(*material_ref)?;
        }
        Ok(())
    }
}
