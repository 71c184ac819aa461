//! ANI animation files (`"EQGA"`).
//!
//! One flat record per bone: frame count, name, delay, then a single
//! translation/rotation/scale triple. Version 1 carries an extra
//! `is_strict` flag after the counts; strict animations use exact frame
//! timing downstream and the flag is kept on the decoded struct.

use std::io::{Read, Write};

use glam::{Vec3, Vec4};

use eq_data::{ReadExt, WriteExt};

use crate::error::{Error, Result};
use crate::name::NameTable;

const MAGIC: &str = "EQGA";

/// A decoded animation file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ani {
    pub version: u32,
    pub is_strict: bool,
    pub bones: Vec<AniBone>,
}

/// One bone's animation record
#[derive(Debug, Clone, PartialEq)]
pub struct AniBone {
    pub name: String,
    pub frame_count: u32,
    /// Frame delay in milliseconds
    pub delay: u32,
    pub translation: Vec3,
    /// Stored x, y, z, w
    pub rotation: Vec4,
    pub scale: Vec3,
}

impl Default for AniBone {
    fn default() -> Self {
        Self {
            name: String::new(),
            frame_count: 1,
            delay: 0,
            translation: Vec3::ZERO,
            rotation: Vec4::new(0.0, 0.0, 0.0, 1.0),
            scale: Vec3::ONE,
        }
    }
}

impl Ani {
    /// Reads an ANI file
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_fixed_string(4)?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic {
                expected: MAGIC,
                found: magic,
            });
        }

        let version = reader.read_u32_le()?;
        let name_length = reader.read_u32_le()?;
        let bone_count = reader.read_u32_le()?;

        let mut is_strict = false;
        if version == 1 {
            is_strict = reader.read_u32_le()? > 0;
        }

        let name_data = reader.read_bytes(name_length as usize)?;
        let names = NameTable::parse(&name_data);

        let mut bones = Vec::with_capacity(bone_count as usize);
        for i in 0..bone_count {
            let frame_count = reader.read_u32_le()?;
            let name_offset = reader.read_u32_le()?;
            let name = names.get(name_offset as i32).map_err(|_| {
                Error::invalid_record(format!("bone {i} has dangling name offset {name_offset}"))
            })?;
            let delay = reader.read_u32_le()?;
            let translation = reader.read_vec3_le()?;
            let rotation = reader.read_vec4_le()?;
            let scale = reader.read_vec3_le()?;
            bones.push(AniBone {
                name: name.to_string(),
                frame_count,
                delay,
                translation,
                rotation,
                scale,
            });
        }

        Ok(Self {
            version,
            is_strict,
            bones,
        })
    }

    /// Writes an ANI file
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let mut names = NameTable::new();
        for bone in &self.bones {
            names.add(&bone.name);
        }

        writer.write_all(MAGIC.as_bytes())?;
        writer.write_u32_le(self.version)?;
        writer.write_u32_le(names.data().len() as u32)?;
        writer.write_u32_le(self.bones.len() as u32)?;
        if self.version == 1 {
            writer.write_u32_le(u32::from(self.is_strict))?;
        }
        writer.write_all(names.data())?;

        for bone in &self.bones {
            writer.write_u32_le(bone.frame_count)?;
            // interned above, lookup cannot miss
            writer.write_u32_le(names.offset_of(&bone.name).unwrap_or(0))?;
            writer.write_u32_le(bone.delay)?;
            writer.write_vec3_le(bone.translation)?;
            writer.write_vec4_le(bone.rotation)?;
            writer.write_vec3_le(bone.scale)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn sample() -> Ani {
        Ani {
            version: 1,
            is_strict: true,
            bones: vec![
                AniBone {
                    name: "root".to_string(),
                    frame_count: 1,
                    delay: 100,
                    ..AniBone::default()
                },
                AniBone {
                    name: "root_arm".to_string(),
                    frame_count: 4,
                    delay: 250,
                    translation: Vec3::new(0.0, 1.0, 0.5),
                    ..AniBone::default()
                },
            ],
        }
    }

    #[test]
    fn round_trip() {
        let ani = sample();
        let mut buf = Vec::new();
        ani.write(&mut buf).unwrap();
        let read_back = Ani::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back, ani);
    }

    #[test]
    fn version_zero_has_no_strict_flag() {
        let ani = Ani {
            version: 0,
            is_strict: false,
            bones: vec![AniBone {
                name: "root".to_string(),
                frame_count: 1,
                delay: 100,
                ..AniBone::default()
            }],
        };
        let mut buf = Vec::new();
        ani.write(&mut buf).unwrap();

        // magic + version + nameLength + boneCount, then name blob directly
        assert_eq!(&buf[..4], b"EQGA");
        let name_length = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
        assert_eq!(name_length, 5); // "root\0"
        assert_eq!(&buf[16..21], b"root\0");

        let read_back = Ani::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back.bones[0].name, "root");
        assert_eq!(read_back.bones[0].delay, 100);
    }

    #[test]
    fn bad_magic_rejected() {
        let err = Ani::read(&mut Cursor::new(b"EQGM\x00\x00\x00\x00".to_vec()));
        assert!(matches!(err, Err(Error::InvalidMagic { .. })));
    }
}
