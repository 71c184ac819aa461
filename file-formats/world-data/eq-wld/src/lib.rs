//! Parser and writer for EverQuest WLD world files.
//!
//! A WLD stream is a flat list of typed fragments that reference each
//! other by 1-based stream index, plus a XOR-obfuscated name table. Two
//! layers are exposed:
//!
//! - [`raw`] — the wire layer: [`raw::Wld`] decodes and encodes the
//!   fragment list byte-for-byte, keeping index references intact and
//!   preserving unknown fragment kinds verbatim.
//! - [`vwld`] — the graph layer: [`vwld::VWld`] replaces index
//!   references with tags so entities can be edited freely, and lays the
//!   graph back out with fresh indices and a rebuilt name table.
//!
//! ```no_run
//! use eq_wld::{raw::Wld, vwld::VWld};
//!
//! # fn main() -> eq_wld::Result<()> {
//! let data = std::fs::read("crushbone.wld")?;
//! let wld = Wld::read(&mut &data[..])?;
//! let graph = VWld::decode(&wld)?;
//! for mesh in &graph.meshes {
//!     println!("{} ({} vertices)", mesh.tag, mesh.vertices.len());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
pub mod names;
pub mod raw;
pub mod vwld;

pub use error::{Error, Result};
