//! WLD string table with the rotating XOR obfuscation applied on disk.
//!
//! Every string that leaves or enters a WLD stream (the shared name blob,
//! bitmap file names, user data blocks) is XOR-coded with a fixed 8-byte
//! key. Fragments address the decoded blob by byte offset; a fragment's
//! `name_ref` field stores the negated offset, with 0 meaning unnamed.

use crate::error::{Error, Result};

/// Rotating key applied to every string section of a WLD stream.
pub const XOR_KEY: [u8; 8] = [0x95, 0x3A, 0xC5, 0x2A, 0x95, 0x7A, 0x95, 0x6A];

/// Applies the rotating XOR in place. The transform is its own inverse.
pub fn crypt(data: &mut [u8]) {
    for (i, b) in data.iter_mut().enumerate() {
        *b ^= XOR_KEY[i % XOR_KEY.len()];
    }
}

/// Decodes a XOR-coded string section into plain bytes.
pub fn decode_string(raw: &[u8]) -> Vec<u8> {
    let mut data = raw.to_vec();
    crypt(&mut data);
    data
}

/// Encodes plain bytes into a XOR-coded string section.
pub fn encode_string(plain: &[u8]) -> Vec<u8> {
    let mut data = plain.to_vec();
    crypt(&mut data);
    data
}

/// The shared name table of a WLD stream, keyed by byte offset.
///
/// Offsets are byte-exact: they must match the raw offsets fragments
/// reference, so entries are kept in buffer order and the buffer is the
/// concatenation of `name + NUL` for each unique name.
#[derive(Debug, Default, Clone)]
pub struct WldNames {
    entries: Vec<(u32, String)>,
    buf: Vec<u8>,
}

impl WldNames {
    /// Creates an empty name table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an already-decoded name blob, splitting on NUL bytes and
    /// recording the starting offset of each run.
    pub fn parse(decoded: &[u8]) -> Self {
        let mut entries = Vec::new();
        let mut start = 0usize;
        for (i, b) in decoded.iter().enumerate() {
            if *b == 0 {
                let name = String::from_utf8_lossy(&decoded[start..i]).into_owned();
                entries.push((start as u32, name));
                start = i + 1;
            }
        }
        Self {
            entries,
            buf: decoded.to_vec(),
        }
    }

    /// Resolves a fragment name reference.
    ///
    /// `name_ref` is the negated byte offset of the name; `0` and positive
    /// values mean the fragment is unnamed. An offset that does not land on
    /// the start of a table entry is an error.
    pub fn resolve(&self, name_ref: i32) -> Result<Option<&str>> {
        if name_ref >= 0 {
            return Ok(None);
        }
        let offset = name_ref.unsigned_abs();
        match self.entries.iter().find(|(off, _)| *off == offset) {
            Some((_, name)) if name.is_empty() => Ok(None),
            Some((_, name)) => Ok(Some(name)),
            None => Err(Error::NameNotFound { offset }),
        }
    }

    /// Interns a tag and returns the `name_ref` to store in a fragment.
    ///
    /// Duplicate tags reuse the first occurrence's offset; an empty tag
    /// yields 0 (unnamed). A fresh table is seeded with a single NUL so
    /// no real name lands on the reserved offset 0.
    pub fn add(&mut self, tag: &str) -> i32 {
        if self.buf.is_empty() {
            self.entries.push((0, String::new()));
            self.buf.push(0);
        }
        if tag.is_empty() {
            return 0;
        }
        if let Some((offset, _)) = self.entries.iter().find(|(_, name)| name == tag) {
            return -(*offset as i32);
        }
        let offset = self.buf.len() as u32;
        self.entries.push((offset, tag.to_string()));
        self.buf.extend_from_slice(tag.as_bytes());
        self.buf.push(0);
        -(offset as i32)
    }

    /// The decoded name blob.
    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn crypt_is_involution() {
        let original = b"SOMETAG_DMSPRITEDEF\0".to_vec();
        let mut data = original.clone();
        crypt(&mut data);
        assert_ne!(data, original);
        crypt(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn add_then_resolve() {
        let mut names = WldNames::new();
        let r1 = names.add("FIRE1_SPRITE");
        let r2 = names.add("WATER_SPRITE");
        assert_eq!(r1, -1);
        assert_eq!(r2, -(1 + ("FIRE1_SPRITE".len() + 1) as i32));
        assert_eq!(names.resolve(r2).unwrap(), Some("WATER_SPRITE"));
    }

    #[test]
    fn duplicate_add_reuses_offset() {
        let mut names = WldNames::new();
        let r1 = names.add("GRASS_MDF");
        let len = names.data().len();
        let r2 = names.add("GRASS_MDF");
        assert_eq!(r1, r2);
        assert_eq!(names.data().len(), len);
    }

    #[test]
    fn zero_ref_is_unnamed() {
        let names = WldNames::parse(b"ROOT\0CHILD\0");
        assert_eq!(names.resolve(0).unwrap(), None);
        assert_eq!(names.resolve(-5).unwrap(), Some("CHILD"));
    }

    #[test]
    fn unknown_offset_is_error() {
        let names = WldNames::parse(b"ROOT\0");
        assert!(matches!(
            names.resolve(-3),
            Err(Error::NameNotFound { offset: 3 })
        ));
    }

    #[test]
    fn parse_round_trip() {
        let mut names = WldNames::new();
        names.add("A_ACTORDEF");
        names.add("B_DMSPRITEDEF");
        let reparsed = WldNames::parse(names.data());
        assert_eq!(reparsed.len(), names.len());
        assert_eq!(reparsed.resolve(-12).unwrap(), Some("B_DMSPRITEDEF"));
    }
}
