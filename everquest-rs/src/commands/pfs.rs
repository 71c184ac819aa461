//! PFS archive command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use humansize::{BINARY, format_size};
use std::fs;
use std::path::{Path, PathBuf};

use eq_pfs::Archive;

#[derive(Subcommand)]
pub enum PfsCommands {
    /// List the files inside an archive
    List {
        /// Path to the archive
        archive: PathBuf,
    },

    /// Extract files from an archive
    Extract {
        /// Path to the archive
        archive: PathBuf,

        /// Directory to extract into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Extract only this file instead of the whole archive
        #[arg(long)]
        file: Option<String>,
    },

    /// Create an archive from files and directories
    Create {
        /// Path of the archive to create
        archive: PathBuf,

        /// Files or directories to add
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Display information about an archive
    Info {
        /// Path to the archive
        archive: PathBuf,
    },
}

pub fn execute(command: PfsCommands) -> Result<()> {
    match command {
        PfsCommands::List { archive } => execute_list(&archive),
        PfsCommands::Extract {
            archive,
            output,
            file,
        } => execute_extract(&archive, &output, file.as_deref()),
        PfsCommands::Create { archive, inputs } => execute_create(&archive, &inputs),
        PfsCommands::Info { archive } => execute_info(&archive),
    }
}

fn execute_list(path: &Path) -> Result<()> {
    use crate::utils::table::create_table;
    use prettytable::row;

    let archive = Archive::open(path)
        .with_context(|| format!("Failed to open archive: {}", path.display()))?;

    let mut table = create_table(vec!["Name", "Size"]);
    for entry in archive.files() {
        table.add_row(row![entry.name(), format_size(entry.data().len(), BINARY)]);
    }
    table.printstd();
    println!("{} files", archive.len());
    Ok(())
}

fn execute_extract(path: &Path, output: &Path, file: Option<&str>) -> Result<()> {
    let archive = Archive::open(path)
        .with_context(|| format!("Failed to open archive: {}", path.display()))?;

    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))?;

    if let Some(name) = file {
        let data = archive
            .file(name)
            .with_context(|| format!("File not in archive: {name}"))?;
        let target = output.join(name);
        fs::write(&target, data)
            .with_context(|| format!("Failed to write: {}", target.display()))?;
        println!("Extracted {name}");
        return Ok(());
    }

    let mut extracted = 0usize;
    for entry in archive.files() {
        let target = output.join(entry.name());
        match fs::write(&target, entry.data()) {
            Ok(()) => extracted += 1,
            Err(err) => log::warn!("skipping {}: {err}", entry.name()),
        }
    }
    println!("Extracted {extracted}/{} files to {}", archive.len(), output.display());
    Ok(())
}

fn execute_create(path: &Path, inputs: &[PathBuf]) -> Result<()> {
    let mut archive = Archive::new();
    for input in inputs {
        add_path(&mut archive, input)?;
    }

    archive
        .save(path)
        .with_context(|| format!("Failed to write archive: {}", path.display()))?;
    println!("Created {} with {} files", path.display(), archive.len());
    Ok(())
}

/// Adds one file, or every readable file in a directory tree. Unreadable
/// entries inside a directory are logged and skipped; a missing top-level
/// input is an error.
fn add_path(archive: &mut Archive, input: &Path) -> Result<()> {
    let metadata = fs::metadata(input)
        .with_context(|| format!("Failed to read input: {}", input.display()))?;

    if metadata.is_file() {
        let data = fs::read(input)
            .with_context(|| format!("Failed to read file: {}", input.display()))?;
        archive.add(archive_name(input), data);
        return Ok(());
    }

    for entry in fs::read_dir(input)
        .with_context(|| format!("Failed to read directory: {}", input.display()))?
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("skipping entry in {}: {err}", input.display());
                continue;
            }
        };
        let child = entry.path();
        if child.is_dir() {
            add_path(archive, &child)?;
        } else {
            match fs::read(&child) {
                Ok(data) => archive.add(archive_name(&child), data),
                Err(err) => log::warn!("skipping {}: {err}", child.display()),
            }
        }
    }
    Ok(())
}

/// Archive entries are flat lowercase base names.
fn archive_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn execute_info(path: &Path) -> Result<()> {
    use console::style;

    let archive = Archive::open(path)
        .with_context(|| format!("Failed to open archive: {}", path.display()))?;

    let total: usize = archive.files().iter().map(|e| e.data().len()).sum();
    let largest = archive.files().iter().max_by_key(|e| e.data().len());

    println!("\n{}", style("PFS Archive Information").bold().underlined());
    println!("File: {}", style(path.display()).cyan());
    println!("Files: {}", style(archive.len()).green());
    println!("Total Size: {}", style(format_size(total, BINARY)).green());
    if let Some(entry) = largest {
        println!(
            "Largest File: {} ({})",
            style(entry.name()).cyan(),
            style(format_size(entry.data().len(), BINARY)).dim()
        );
    }
    Ok(())
}
