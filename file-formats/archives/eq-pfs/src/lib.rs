//! Parser and writer for EverQuest PFS/EQG archives.
//!
//! PFS is EverQuest's generic container: `.eqg`, `.s3d`, `.pak`, and
//! `.pfs` files all share the layout. Payloads are zlib-deflated in
//! 8 KiB chunks, the trailing directory keys entries by a CRC-32 of the
//! lowercased filename, and one hidden directory entry stores the
//! filename list itself.
//!
//! # Example
//!
//! ```no_run
//! use eq_pfs::Archive;
//!
//! # fn main() -> eq_pfs::Result<()> {
//! let archive = Archive::open("gequip.s3d")?;
//! for entry in archive.files() {
//!     println!("{}: {} bytes", entry.name(), entry.data().len());
//! }
//! # Ok(())
//! # }
//! ```

mod archive;
mod compression;
mod crc;
mod error;

pub use archive::{Archive, Entry, NAME_DIRECTORY_CRC, PFS_MAGIC, PFS_VERSION};
pub use compression::{CHUNK_SIZE, deflate, inflate};
pub use crc::filename_crc;
pub use error::{Error, Result};
