//! Chunked zlib payload coding.
//!
//! PFS stores each file as a run of independently deflated chunks of at
//! most [`CHUNK_SIZE`] input bytes, each prefixed with its deflated and
//! inflated sizes. Chunks for one file are concatenated back to back; the
//! reader stops once the directory-declared inflated size is reached.

use std::io::{Read, Write};

use eq_data::{ReadExt, WriteExt};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{Error, Result};

/// Maximum number of input bytes per deflated chunk
pub const CHUNK_SIZE: usize = 8192;

/// Deflates `data` into the PFS chunk framing.
///
/// Empty input produces an empty chunk stream.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for chunk in data.chunks(CHUNK_SIZE) {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(chunk)
            .map_err(|e| Error::compression(format!("deflate chunk: {e}")))?;
        let compressed = encoder
            .finish()
            .map_err(|e| Error::compression(format!("finish chunk: {e}")))?;

        out.write_u32_le(compressed.len() as u32)?;
        out.write_u32_le(chunk.len() as u32)?;
        out.extend_from_slice(&compressed);
    }
    Ok(out)
}

/// Inflates a PFS chunk stream, stopping after `inflated_len` output bytes.
pub fn inflate<R: Read>(reader: &mut R, inflated_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(inflated_len);
    while out.len() < inflated_len {
        let deflate_size = reader.read_u32_le()?;
        let inflate_size = reader.read_u32_le()?;
        let compressed = reader.read_bytes(deflate_size as usize)?;

        let mut decoder = ZlibDecoder::new(compressed.as_slice());
        let mut chunk = Vec::with_capacity(inflate_size as usize);
        decoder
            .read_to_end(&mut chunk)
            .map_err(|e| Error::compression(format!("inflate chunk: {e}")))?;
        if chunk.len() != inflate_size as usize {
            return Err(Error::compression(format!(
                "chunk inflated to {} bytes, header declared {}",
                chunk.len(),
                inflate_size
            )));
        }
        out.extend_from_slice(&chunk);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn round_trip(len: usize) {
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let packed = deflate(&data).unwrap();
        let unpacked = inflate(&mut packed.as_slice(), data.len()).unwrap();
        assert_eq!(unpacked, data);
    }

    #[test]
    fn round_trips_across_chunk_boundary() {
        for len in [0, 1, 8192, 8193, 20000] {
            round_trip(len);
        }
    }

    #[test]
    fn multi_chunk_framing() {
        let data = vec![0xAB; CHUNK_SIZE + 1];
        let packed = deflate(&data).unwrap();
        // two chunks, each with its own 8-byte size prefix
        let first_deflated = u32::from_le_bytes([packed[0], packed[1], packed[2], packed[3]]);
        let first_inflated = u32::from_le_bytes([packed[4], packed[5], packed[6], packed[7]]);
        assert_eq!(first_inflated as usize, CHUNK_SIZE);
        let second = 8 + first_deflated as usize;
        let second_inflated = u32::from_le_bytes([
            packed[second + 4],
            packed[second + 5],
            packed[second + 6],
            packed[second + 7],
        ]);
        assert_eq!(second_inflated, 1);
    }

    #[test]
    fn truncated_stream_errors() {
        let packed = deflate(b"hello").unwrap();
        let err = inflate(&mut packed[..4].as_ref(), 5);
        assert!(err.is_err());
    }
}
