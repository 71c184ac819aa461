//! Shared low-level I/O primitives for the EverQuest file format crates.
//!
//! Every on-disk format in this workspace is little-endian; the extension
//! traits here keep the individual codecs free of byte-shuffling noise.

mod io_ext;

pub use io_ext::{ReadExt, WriteExt};
