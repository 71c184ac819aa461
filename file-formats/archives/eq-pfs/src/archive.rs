//! PFS archive reading, mutation, and writing.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use eq_data::{ReadExt, WriteExt};

use crate::compression::{deflate, inflate};
use crate::crc::filename_crc;
use crate::error::{Error, Result};

/// Magic bytes at offset 4 of every PFS archive
pub const PFS_MAGIC: [u8; 4] = *b"PFS ";

/// The only PFS version in the wild
pub const PFS_VERSION: u32 = 0x0002_0000;

/// CRC key the filename directory entry is written under
pub const NAME_DIRECTORY_CRC: u32 = 0x6158_0AC9;

const FOOTER_MAGIC: [u8; 5] = *b"STEVE";

/// One named file inside an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    data: Vec<u8>,
}

impl Entry {
    pub fn new<S: Into<String>>(name: S, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// An in-memory PFS/EQG archive.
///
/// Reading inflates every payload up front; the archive owns plain byte
/// buffers from then on and can be mutated and re-serialized freely.
/// Round trips are semantic, not byte-identical: writing re-sorts entries
/// by name hash and re-compresses payloads.
#[derive(Debug, Default)]
pub struct Archive {
    files: Vec<Entry>,
}

struct DirEntry {
    crc: u32,
    offset: u32,
    size: u32,
}

impl Archive {
    /// Creates an empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens and reads an archive from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::read(&mut BufReader::new(file))
    }

    /// Reads an archive from a seekable stream
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let dir_offset = reader.read_u32_le()?;

        reader.seek(SeekFrom::Start(4))?;
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != PFS_MAGIC {
            return Err(Error::invalid_format(format!(
                "bad magic {magic:02X?}, expected \"PFS \""
            )));
        }
        let version = reader.read_u32_le()?;
        if version != PFS_VERSION {
            return Err(Error::UnsupportedVersion(version));
        }

        reader.seek(SeekFrom::Start(u64::from(dir_offset)))?;
        let file_count = reader.read_u32_le()?;
        let mut dir = Vec::with_capacity(file_count as usize);
        for i in 0..file_count {
            let crc = reader.read_u32_le().map_err(|e| {
                Error::Directory(format!("read entry {i} crc: {e}"))
            })?;
            let offset = reader.read_u32_le()?;
            let size = reader.read_u32_le()?;
            dir.push(DirEntry { crc, offset, size });
        }

        // Payloads sit between the header and the directory, in stream
        // order. Each payload's start position must match a directory
        // entry's declared offset.
        reader.seek(SeekFrom::Start(8))?;
        let mut blobs: Vec<(u32, Vec<u8>)> = Vec::new();
        let mut names_by_crc: Vec<(u32, String)> = Vec::new();
        for i in 0..file_count {
            let pos = reader.stream_position()?;
            let entry = dir
                .iter()
                .find(|e| u64::from(e.offset) == pos)
                .ok_or_else(|| {
                    Error::Directory(format!("data chunk {i} has malformed offset 0x{pos:x}"))
                })?;

            let data = inflate(reader, entry.size as usize)?;

            if let Some(names) = parse_name_directory(&data, file_count)? {
                names_by_crc = names;
            } else {
                blobs.push((entry.crc, data));
            }
        }

        let mut files = Vec::with_capacity(blobs.len());
        for (crc, data) in blobs {
            match names_by_crc.iter().find(|(c, _)| *c == crc) {
                Some((_, name)) => files.push(Entry::new(name.clone(), data)),
                None => log::warn!("no filename for crc {crc}, dropping entry"),
            }
        }

        // Optional "STEVE" + date footer after the directory.
        reader.seek(SeekFrom::Start(
            u64::from(dir_offset) + 4 + 12 * u64::from(file_count),
        ))?;
        let mut footer = [0u8; 5];
        match reader.read_exact(&mut footer) {
            Ok(()) => {
                if footer != FOOTER_MAGIC {
                    return Err(Error::invalid_format(format!(
                        "bad footer {footer:02X?}, expected \"STEVE\""
                    )));
                }
                let _date = reader.read_u32_le()?;
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {}
            Err(e) => return Err(e.into()),
        }

        Ok(Self { files })
    }

    /// Returns the file entries in directory order
    pub fn files(&self) -> &[Entry] {
        &self.files
    }

    /// Number of files in the archive
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Returns a file's contents by name (case-insensitive)
    pub fn file(&self, name: &str) -> Result<&[u8]> {
        self.files
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.data.as_slice())
            .ok_or_else(|| Error::FileNotFound(name.to_string()))
    }

    /// Adds a file, replacing any existing entry with the same name
    pub fn add<S: Into<String>>(&mut self, name: S, data: Vec<u8>) {
        let name = name.into();
        if let Some(existing) = self
            .files
            .iter_mut()
            .find(|f| f.name.eq_ignore_ascii_case(&name))
        {
            existing.data = data;
        } else {
            self.files.push(Entry::new(name, data));
        }
    }

    /// Removes a file by name, returning whether an entry was removed
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| !f.name.eq_ignore_ascii_case(name));
        self.files.len() != before
    }

    /// Writes the archive to disk
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Serializes the archive to a seekable writer.
    ///
    /// Entries are sorted by name hash, payloads re-deflated, and the
    /// filename directory regenerated under [`NAME_DIRECTORY_CRC`].
    pub fn write<W: Write + Seek>(&mut self, writer: &mut W) -> Result<()> {
        self.files
            .sort_by_key(|f| filename_crc(&f.name));

        writer.write_u32_le(0)?; // directory offset, patched at the end
        writer.write_all(&PFS_MAGIC)?;
        writer.write_u32_le(PFS_VERSION)?;

        let mut name_buf = Vec::new();
        name_buf.write_u32_le(self.files.len() as u32)?;

        let mut dir = Vec::with_capacity(self.files.len() + 1);
        for file in &self.files {
            let pos = writer.stream_position()?;
            dir.push(DirEntry {
                crc: filename_crc(&file.name),
                offset: pos as u32,
                size: file.data.len() as u32,
            });
            let packed = deflate(&file.data)?;
            writer.write_all(&packed)?;

            name_buf.write_u32_le(file.name.len() as u32 + 1)?;
            name_buf.extend_from_slice(file.name.as_bytes());
            name_buf.push(0);
        }

        let name_offset = writer.stream_position()?;
        let packed_names = deflate(&name_buf)?;
        writer.write_all(&packed_names)?;

        let dir_offset = writer.stream_position()?;
        writer.write_u32_le(dir.len() as u32 + 1)?;
        for entry in &dir {
            writer.write_u32_le(entry.crc)?;
            writer.write_u32_le(entry.offset)?;
            writer.write_u32_le(entry.size)?;
        }
        writer.write_u32_le(NAME_DIRECTORY_CRC)?;
        writer.write_u32_le(name_offset as u32)?;
        writer.write_u32_le(name_buf.len() as u32)?;

        writer.write_all(&FOOTER_MAGIC)?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        writer.write_u32_le(now)?;

        writer.seek(SeekFrom::Start(0))?;
        writer.write_u32_le(dir_offset as u32)?;
        Ok(())
    }
}

/// Decodes the filename directory if `data` is one.
///
/// The directory is recognized by its leading count matching
/// `file_count - 1` (every entry except the directory itself).
fn parse_name_directory(data: &[u8], file_count: u32) -> Result<Option<Vec<(u32, String)>>> {
    if data.len() < 4 {
        return Ok(None);
    }
    let mut cur = data;
    let name_count = cur.read_u32_le()?;
    if name_count != file_count.wrapping_sub(1) {
        return Ok(None);
    }

    let mut names = Vec::with_capacity(name_count as usize);
    for i in 0..name_count {
        let len = cur
            .read_u32_le()
            .map_err(|e| Error::Directory(format!("read name {i} length: {e}")))?;
        if len == 0 {
            return Err(Error::Directory(format!("name {i} has zero length")));
        }
        let raw = cur
            .read_bytes(len as usize)
            .map_err(|e| Error::Directory(format!("read name {i}: {e}")))?;
        let name = String::from_utf8(raw[..raw.len() - 1].to_vec())
            .map_err(|e| Error::Directory(format!("name {i} is not utf-8: {e}")))?;
        names.push((filename_crc(&name), name));
    }
    Ok(Some(names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn sample() -> Archive {
        let mut archive = Archive::new();
        archive.add("hill.ter", b"terrain bytes".to_vec());
        archive.add("hill.zon", vec![7u8; 10000]);
        archive.add("stone.dds", b"not really a texture".to_vec());
        archive
    }

    #[test]
    fn round_trip_preserves_names_and_bytes() {
        let mut archive = sample();
        let mut buf = Cursor::new(Vec::new());
        archive.write(&mut buf).unwrap();

        buf.set_position(0);
        let read_back = Archive::read(&mut buf).unwrap();
        assert_eq!(read_back.len(), 3);
        assert_eq!(read_back.file("hill.ter").unwrap(), b"terrain bytes");
        assert_eq!(read_back.file("hill.zon").unwrap(), vec![7u8; 10000]);
        assert_eq!(
            read_back.file("stone.dds").unwrap(),
            b"not really a texture"
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let archive = sample();
        assert!(archive.file("HILL.TER").is_ok());
        assert!(matches!(
            archive.file("missing.mod"),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn add_replaces_existing_entry() {
        let mut archive = sample();
        archive.add("HILL.TER", b"new".to_vec());
        assert_eq!(archive.len(), 3);
        assert_eq!(archive.file("hill.ter").unwrap(), b"new");
    }

    #[test]
    fn remove_drops_entry() {
        let mut archive = sample();
        assert!(archive.remove("hill.zon"));
        assert!(!archive.remove("hill.zon"));
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn bad_magic_rejected() {
        let mut buf = Cursor::new(b"\x00\x00\x00\x00XXXX\x00\x00\x02\x00".to_vec());
        assert!(matches!(
            Archive::read(&mut buf),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn missing_footer_tolerated() {
        let mut archive = sample();
        let mut buf = Cursor::new(Vec::new());
        archive.write(&mut buf).unwrap();

        // chop the 9-byte footer off
        let mut bytes = buf.into_inner();
        bytes.truncate(bytes.len() - 9);
        let read_back = Archive::read(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(read_back.len(), 3);
    }
}
