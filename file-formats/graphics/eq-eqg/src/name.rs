//! Offset-keyed name table shared by every EQG format.
//!
//! Each EQG file carries one blob of NUL-terminated strings; records refer
//! to a name by the byte offset where it starts. The table is byte-exact:
//! offsets recorded while parsing are the raw offsets records reference,
//! and offsets handed out while building are the buffer length at the
//! moment the name was appended.

use crate::error::{Error, Result};

/// An offset-addressed string table.
#[derive(Debug, Default, Clone)]
pub struct NameTable {
    entries: Vec<(u32, String)>,
    buf: Vec<u8>,
}

impl NameTable {
    /// Creates an empty table for building
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a raw name blob, splitting on NUL bytes.
    ///
    /// The starting offset of each run is its key. A trailing run without
    /// a terminator is ignored, matching the on-disk convention.
    pub fn parse(data: &[u8]) -> Self {
        let mut entries = Vec::new();
        let mut start = 0usize;
        for (i, &b) in data.iter().enumerate() {
            if b == 0 {
                let name = String::from_utf8_lossy(&data[start..i]).into_owned();
                entries.push((start as u32, name));
                start = i + 1;
            }
        }
        Self {
            entries,
            buf: data.to_vec(),
        }
    }

    /// Looks up the name starting at `offset`.
    ///
    /// Negative offsets take their absolute value first; some writers hand
    /// out negated offsets to mark already-interned names.
    pub fn get(&self, offset: i32) -> Result<&str> {
        let offset = offset.unsigned_abs();
        self.entries
            .iter()
            .find(|(o, _)| *o == offset)
            .map(|(_, n)| n.as_str())
            .ok_or(Error::NameNotFound(offset))
    }

    /// Like [`get`](Self::get) but renders a missing offset as
    /// `!UNK(<offset>)` instead of failing.
    pub fn get_or_unknown(&self, offset: i32) -> String {
        let abs = offset.unsigned_abs();
        match self.get(offset) {
            Ok(name) => name.to_string(),
            Err(_) => format!("!UNK({abs})"),
        }
    }

    /// Interns `name`, returning its offset.
    ///
    /// Names are deduplicated by first occurrence; adding the same name
    /// twice returns the original offset without growing the buffer.
    pub fn add(&mut self, name: &str) -> u32 {
        if let Some(offset) = self.offset_of(name) {
            return offset;
        }
        let offset = self.buf.len() as u32;
        self.entries.push((offset, name.to_string()));
        self.buf.extend_from_slice(name.as_bytes());
        self.buf.push(0);
        offset
    }

    /// Returns the offset of an already-interned name
    pub fn offset_of(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(_, n)| n == name)
            .map(|(o, _)| *o)
    }

    /// The raw blob, as written to disk
    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    /// Number of interned names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(offset, name)` pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(o, n)| (*o, n.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn build_then_parse_round_trips() {
        let mut table = NameTable::new();
        let a = table.add("chest");
        let b = table.add("lid");
        let c = table.add("hinge_l");
        assert_eq!(a, 0);
        assert_eq!(b, 6);
        assert_eq!(c, 10);

        let parsed = NameTable::parse(table.data());
        assert_eq!(parsed.get(0).unwrap(), "chest");
        assert_eq!(parsed.get(6).unwrap(), "lid");
        assert_eq!(parsed.get(10).unwrap(), "hinge_l");
    }

    #[test]
    fn add_is_idempotent() {
        let mut table = NameTable::new();
        let first = table.add("stone");
        let len = table.data().len();
        let second = table.add("stone");
        assert_eq!(first, second);
        assert_eq!(table.data().len(), len);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn negative_offset_takes_absolute_value() {
        let mut table = NameTable::new();
        table.add("root");
        table.add("leaf");
        assert_eq!(table.get(-5).unwrap(), "leaf");
    }

    #[test]
    fn missing_offset_is_an_error() {
        let table = NameTable::parse(b"ab\0");
        assert!(matches!(table.get(1), Err(Error::NameNotFound(1))));
        assert_eq!(table.get_or_unknown(7), "!UNK(7)");
    }

    #[test]
    fn offset_zero_is_valid() {
        let table = NameTable::parse(b"\0after\0");
        assert_eq!(table.get(0).unwrap(), "");
        assert_eq!(table.get(1).unwrap(), "after");
    }
}
