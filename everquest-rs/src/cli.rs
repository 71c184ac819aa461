//! Root CLI structure for everquest-rs

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "everquest-rs")]
#[command(about = "Command-line tools for EverQuest file formats", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// PFS archive operations (.eqg, .s3d, .pfs, .pak)
    Pfs {
        #[command(subcommand)]
        command: crate::commands::pfs::PfsCommands,
    },

    /// EQG model and zone file operations
    Eqg {
        #[command(subcommand)]
        command: crate::commands::eqg::EqgCommands,
    },

    /// WLD fragment file operations
    Wld {
        #[command(subcommand)]
        command: crate::commands::wld::WldCommands,
    },

    /// Convert models to OBJ or glTF
    Convert {
        /// Archive or model file to convert
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "obj")]
        format: ExportFormat,

        /// Directory to write the exported files into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Wavefront OBJ with an MTL companion
    Obj,
    /// glTF 2.0 with an external buffer and PNG images
    Gltf,
}
