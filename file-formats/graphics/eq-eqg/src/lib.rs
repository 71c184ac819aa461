//! Parsers and writers for EverQuest's EQG-era model formats.
//!
//! Every format shares the same bones: a 4-byte magic, a version, an
//! offset-keyed [`NameTable`], and fixed-layout records. The formats:
//!
//! - [`Ani`] — bone animations (`"EQGA"`)
//! - [`Lay`] — material layer variants (`"EQGL"`)
//! - [`Prt`] / [`Pts`] — particle renders and attachment points
//! - [`Mod`] / [`Mds`] / [`Ter`] — static, skinned, and terrain geometry
//! - [`Zon`] — zone manifests, binary (`"EQGZ"`) and v4 text (`"EQTZ"`)
//!
//! Decoders read the whole input through [`std::io::Read`]; encoders are
//! the structural inverse, rebuilding the name table by first-occurrence
//! deduplication. Byte-identical round trips are not a goal; semantic
//! round trips are.

mod ani;
mod error;
mod lay;
mod mesh;
pub mod model;
mod name;
mod prt;
mod pts;
mod zon;

pub use ani::{Ani, AniBone};
pub use error::{Error, Result};
pub use lay::{Lay, LayEntry};
pub use mesh::{Mds, MdsModel, Mod, Ter};
pub use name::NameTable;
pub use prt::{Prt, PrtEntry};
pub use pts::{Pts, PtsEntry};
pub use zon::{V4Info, Zon, ZonLight, ZonObject, ZonRegion};
