//! PRT particle render files (`"PTCL"`).
//!
//! Unlike the other EQG headers, the count comes before the version here.
//! Names are fixed 64-byte NUL-padded fields rather than name-table
//! references.

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};

use crate::error::{Error, Result};

const MAGIC: &str = "PTCL";
const NAME_WIDTH: usize = 64;

/// A decoded particle render file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prt {
    pub version: u32,
    pub entries: Vec<PrtEntry>,
}

/// One particle render entry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrtEntry {
    pub id: u32,
    /// Present from version 5 on
    pub id2: u32,
    pub particle_point: String,
    pub unknown_a: [u32; 5],
    pub duration: u32,
    pub unknown_b: u32,
    pub unknown_ffffffff: i32,
    pub unknown_c: u32,
}

impl Prt {
    /// Reads a PRT file
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
        if version < 4 {
            return Err(Error::UnsupportedVersion {
                format: "prt",
                version,
            });
        }

        let mut entries = Vec::with_capacity(particle_count as usize);
        for _ in 0..particle_count {
            let mut entry = PrtEntry {
                id: reader.read_u32_le()?,
                ..PrtEntry::default()
            };
            if version >= 5 {
                entry.id2 = reader.read_u32_le()?;
            }
            entry.particle_point = reader.read_fixed_string(NAME_WIDTH)?;
            for slot in &mut entry.unknown_a {
                *slot = reader.read_u32_le()?;
            }
            entry.duration = reader.read_u32_le()?;
            entry.unknown_b = reader.read_u32_le()?;
            entry.unknown_ffffffff = reader.read_i32_le()?;
            entry.unknown_c = reader.read_u32_le()?;
            entries.push(entry);
        }

        Ok(Self { version, entries })
    }

    /// Writes a PRT file
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.version < 4 {
            return Err(Error::UnsupportedVersion {
                format: "prt",
                version: self.version,
            });
        }

        writer.write_all(MAGIC.as_bytes())?;
        writer.write_u32_le(self.entries.len() as u32)?;
        writer.write_u32_le(self.version)?;

        for entry in &self.entries {
            writer.write_u32_le(entry.id)?;
            if self.version >= 5 {
                writer.write_u32_le(entry.id2)?;
            }
            writer.write_fixed_string(&entry.particle_point, NAME_WIDTH)?;
            for slot in &entry.unknown_a {
                writer.write_u32_le(*slot)?;
            }
            writer.write_u32_le(entry.duration)?;
            writer.write_u32_le(entry.unknown_b)?;
            writer.write_i32_le(entry.unknown_ffffffff)?;
            writer.write_u32_le(entry.unknown_c)?;
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
    fn round_trip_v5() {
        let prt = Prt {
            version: 5,
            entries: vec![PrtEntry {
                id: 11,
                id2: 12,
                particle_point: "sparkle_tip".to_string(),
                unknown_a: [1, 2, 3, 4, 5],
                duration: 5000,
                unknown_b: 0,
                unknown_ffffffff: -1,
                unknown_c: u32::MAX,
            }],
        };
        let mut buf = Vec::new();
        prt.write(&mut buf).unwrap();
        let read_back = Prt::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back, prt);
    }

    #[test]
    fn v4_omits_id2() {
        let prt = Prt {
            version: 4,
            entries: vec![PrtEntry {
                id: 1,
                particle_point: "p".to_string(),
                ..PrtEntry::default()
            }],
        };
        let mut buf = Vec::new();
        prt.write(&mut buf).unwrap();
        // header (12) + id (4) + 64-byte name + 9 u32 fields
        assert_eq!(buf.len(), 12 + 4 + 64 + 36);
        let read_back = Prt::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back.entries[0].id2, 0);
    }

    #[test]
    fn old_version_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"PTCL");
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&3u32.to_le_bytes());
        assert!(matches!(
            Prt::read(&mut Cursor::new(buf)),
            Err(Error::UnsupportedVersion { format: "prt", version: 3 })
        ));
    }
}
