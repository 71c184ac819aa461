//! Command implementations for the everquest-rs CLI

pub mod convert;
pub mod eqg;
pub mod pfs;
pub mod wld;
