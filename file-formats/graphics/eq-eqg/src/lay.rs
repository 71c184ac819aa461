//! LAY material layer files (`"EQGL"`).
//!
//! Entries are triples of name references (material, diffuse, normal) with
//! `0xFFFFFFFF` marking an empty slot, followed by a version-dependent run
//! of bytes this codec does not model and must skip exactly.

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};

use crate::error::{Error, Result};
use crate::name::NameTable;

const MAGIC: &str = "EQGL";
const EMPTY_REF: u32 = 0xFFFF_FFFF;

/// A decoded layer file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lay {
    pub version: u32,
    pub entries: Vec<LayEntry>,
}

/// One material layer; empty strings mean the slot was unset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayEntry {
    pub material: String,
    pub diffuse: String,
    pub normal: String,
}

/// Bytes to skip after each entry, keyed by version
fn version_padding(version: u32) -> Result<usize> {
    match version {
        2 => Ok(52),
        3 => Ok(16),
        4 => Ok(20),
        _ => Err(Error::UnsupportedVersion {
            format: "lay",
            version,
        }),
    }
}

impl Lay {
    /// Reads a LAY file
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let magic = reader.read_fixed_string(4)?;
        if magic != MAGIC {
            return Err(Error::InvalidMagic {
                expected: MAGIC,
                found: magic,
            });
        }

        let version = reader.read_u32_le()?;
        let padding = version_padding(version)?;

        let name_length = reader.read_u32_le()?;
        let layer_count = reader.read_u32_le()?;
        let name_data = reader.read_bytes(name_length as usize)?;
        let names = NameTable::parse(&name_data);

        let mut entries = Vec::with_capacity(layer_count as usize);
        for _ in 0..layer_count {
            let mut entry = LayEntry::default();
            for slot in [&mut entry.material, &mut entry.diffuse, &mut entry.normal] {
                let offset = reader.read_u32_le()?;
                if offset != EMPTY_REF {
                    *slot = names.get_or_unknown(offset as i32);
                }
            }
            reader.read_bytes(padding)?;
            entries.push(entry);
        }

        Ok(Self { version, entries })
    }

    /// Writes a LAY file
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let padding = version_padding(self.version)?;

        let mut names = NameTable::new();
        for entry in &self.entries {
            for name in [&entry.material, &entry.diffuse, &entry.normal] {
                if !name.is_empty() {
                    names.add(name);
                }
            }
        }

        writer.write_all(MAGIC.as_bytes())?;
        writer.write_u32_le(self.version)?;
        writer.write_u32_le(names.data().len() as u32)?;
        writer.write_u32_le(self.entries.len() as u32)?;
        writer.write_all(names.data())?;

        let pad = vec![0u8; padding];
        for entry in &self.entries {
            for name in [&entry.material, &entry.diffuse, &entry.normal] {
                if name.is_empty() {
                    writer.write_u32_le(EMPTY_REF)?;
                } else {
                    writer.write_u32_le(names.offset_of(name).unwrap_or(0))?;
                }
            }
            writer.write_all(&pad)?;
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
    fn round_trip_with_empty_slots() {
        let lay = Lay {
            version: 3,
            entries: vec![
                LayEntry {
                    material: "skin0".to_string(),
                    diffuse: "skin0.dds".to_string(),
                    normal: String::new(),
                },
                LayEntry {
                    material: "skin1".to_string(),
                    diffuse: "skin0.dds".to_string(),
                    normal: "skin1_n.dds".to_string(),
                },
            ],
        };

        let mut buf = Vec::new();
        lay.write(&mut buf).unwrap();
        let read_back = Lay::read(&mut Cursor::new(buf)).unwrap();
        assert_eq!(read_back, lay);
    }

    #[test]
    fn unknown_version_is_a_hard_error() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"EQGL");
        buf.extend_from_slice(&7u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        let err = Lay::read(&mut Cursor::new(buf));
        assert!(matches!(
            err,
            Err(Error::UnsupportedVersion {
                format: "lay",
                version: 7
            })
        ));
    }

    #[test]
    fn shared_diffuse_interned_once() {
        let lay = Lay {
            version: 2,
            entries: vec![
                LayEntry {
                    material: "a".to_string(),
                    diffuse: "shared.dds".to_string(),
                    normal: String::new(),
                },
                LayEntry {
                    material: "b".to_string(),
                    diffuse: "shared.dds".to_string(),
                    normal: String::new(),
                },
            ],
        };
        let mut buf = Vec::new();
        lay.write(&mut buf).unwrap();

        let name_length = u32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]) as usize;
        let name_blob = &buf[16..16 + name_length];
        let occurrences = name_blob
            .windows(b"shared.dds".len())
            .filter(|w| *w == b"shared.dds")
            .count();
        assert_eq!(occurrences, 1);
    }
}
