//! PTS particle point files (`"EQPT"`).

use std::io::{Read, Write};

use glam::Vec3;

use eq_data::{ReadExt, WriteExt};

use crate::error::{Error, Result};

const MAGIC: &str = "EQPT";
const NAME_WIDTH: usize = 64;

/// A decoded particle point file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pts {
    pub version: u32,
    pub entries: Vec<PtsEntry>,
}

/// One attachment point: a named transform hung off a bone
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PtsEntry {
    pub name: String,
    pub bone_name: String,
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Pts {
    /// Reads a PTS file
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_fixed_string(4)?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic {
                expected: MAGIC,
                found: magic,
            });
        }

        let particle_count = reader.read_u32_le()?;
        let version = reader.read_u32_le()?;
        if version != 1 {
            return Err(Error::UnsupportedVersion {
                format: "pts",
                version,
            });
        }

        let mut entries = Vec::with_capacity(particle_count as usize);
        for _ in 0..particle_count {
            entries.push(PtsEntry {
                name: reader.read_fixed_string(NAME_WIDTH)?,
                bone_name: reader.read_fixed_string(NAME_WIDTH)?,
                translation: reader.read_vec3_le()?,
                rotation: reader.read_vec3_le()?,
                scale: reader.read_vec3_le()?,
            });
        }

        Ok(Self { version, entries })
    }

    /// Writes a PTS file
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.version != 1 {
            return Err(Error::UnsupportedVersion {
                format: "pts",
                version: self.version,
            });
        }

        writer.write_all(MAGIC.as_bytes())?;
        writer.write_u32_le(self.entries.len() as u32)?;
        writer.write_u32_le(self.version)?;

        for entry in &self.entries {
            writer.write_fixed_string(&entry.name, NAME_WIDTH)?;
            writer.write_fixed_string(&entry.bone_name, NAME_WIDTH)?;
            writer.write_vec3_le(entry.translation)?;
            writer.write_vec3_le(entry.rotation)?;
            writer.write_vec3_le(entry.scale)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn round_trip() {
        let pts = Pts {
            version: 1,
            entries: vec![PtsEntry {
                name: "flame_l".to_string(),
                bone_name: "hand_l".to_string(),
                translation: Vec3::new(0.1, 0.0, 1.2),
                rotation: Vec3::ZERO,
                scale: Vec3::ONE,
            }],
        };
        let mut buf = Vec::new();
        pts.write(&mut buf).unwrap();
        assert_eq!(buf.len(), 12 + 64 + 64 + 36);
        let read_back = Pts::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back, pts);
    }

    #[test]
    fn wrong_version_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"EQPT");
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        assert!(Pts::read(&mut Cursor::new(buf)).is_err());
    }
}
