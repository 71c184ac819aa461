//! EQG flat-format command implementations

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use console::style;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use eq_eqg::{Ani, Lay, Mds, Mod, Prt, Pts, Ter, Zon};

#[derive(Subcommand)]
pub enum EqgCommands {
    /// Display information about an EQG model or zone file
    Info {
        /// Path to the file (.ani, .lay, .prt, .pts, .mod, .mds, .ter, .zon)
        file: PathBuf,
    },
}

pub fn execute(command: EqgCommands) -> Result<()> {
    match command {
        EqgCommands::Info { file } => execute_info(&file),
    }
}

fn execute_info(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut reader = BufReader::new(file);

    println!("\n{}", style("EQG File Information").bold().underlined());
    println!("File: {}", style(path.display()).cyan());

    match extension.as_str() {
        "ani" => {
            let ani = Ani::read(&mut reader)
                .with_context(|| format!("Failed to parse ANI file: {}", path.display()))?;
            println!("Format: {} v{}", style("ANI").yellow(), ani.version);
            println!("Strict Order: {}", style(ani.is_strict).green());
            println!("Bones: {}", style(ani.bones.len()).green());
            let frames: u32 = ani.bones.iter().map(|b| b.frame_count).sum();
            println!("Total Frames: {}", style(frames).green());
        }
        "lay" => {
            let lay = Lay::read(&mut reader)
                .with_context(|| format!("Failed to parse LAY file: {}", path.display()))?;
            println!("Format: {} v{}", style("LAY").yellow(), lay.version);
            println!("Layers: {}", style(lay.entries.len()).green());
            for entry in &lay.entries {
                println!("  {} -> {}", entry.material, entry.diffuse);
            }
        }
        "prt" => {
            let prt = Prt::read(&mut reader)
                .with_context(|| format!("Failed to parse PRT file: {}", path.display()))?;
            println!("Format: {} v{}", style("PRT").yellow(), prt.version);
            println!("Render Entries: {}", style(prt.entries.len()).green());
        }
        "pts" => {
            let pts = Pts::read(&mut reader)
                .with_context(|| format!("Failed to parse PTS file: {}", path.display()))?;
            println!("Format: {} v{}", style("PTS").yellow(), pts.version);
            println!("Attachment Points: {}", style(pts.entries.len()).green());
            for entry in &pts.entries {
                println!("  {} on bone {}", entry.name, entry.bone_name);
            }
        }
        "mod" => {
            let model = Mod::read(&mut reader)
                .with_context(|| format!("Failed to parse MOD file: {}", path.display()))?;
            println!("Format: {} v{}", style("MOD").yellow(), model.version);
            println!("Materials: {}", style(model.materials.len()).green());
            println!("Vertices: {}", style(model.vertices.len()).green());
            println!("Triangles: {}", style(model.triangles.len()).green());
            println!("Bones: {}", style(model.bones.len()).green());
        }
        "mds" => {
            let mds = Mds::read(&mut reader)
                .with_context(|| format!("Failed to parse MDS file: {}", path.display()))?;
            println!("Format: {} v{}", style("MDS").yellow(), mds.version);
            println!("Materials: {}", style(mds.materials.len()).green());
            println!("Bones: {}", style(mds.bones.len()).green());
            println!("Sub-models: {}", style(mds.models.len()).green());
            for model in &mds.models {
                println!(
                    "  {} ({} vertices, {} faces)",
                    model.name,
                    model.vertices.len(),
                    model.faces.len()
                );
            }
        }
        "ter" => {
            let ter = Ter::read(&mut reader)
                .with_context(|| format!("Failed to parse TER file: {}", path.display()))?;
            println!("Format: {} v{}", style("TER").yellow(), ter.version);
            println!("Materials: {}", style(ter.materials.len()).green());
            println!("Vertices: {}", style(ter.vertices.len()).green());
            println!("Triangles: {}", style(ter.triangles.len()).green());
        }
        "zon" => {
            let zon = Zon::read(&mut reader)
                .with_context(|| format!("Failed to parse ZON file: {}", path.display()))?;
            println!("Format: {} v{}", style("ZON").yellow(), zon.version);
            println!("Models: {}", style(zon.models.len()).green());
            println!("Placed Objects: {}", style(zon.objects.len()).green());
            println!("Regions: {}", style(zon.regions.len()).green());
            println!("Lights: {}", style(zon.lights.len()).green());
            if let Some(info) = &zon.v4_info {
                println!("Terrain: {}", style(&info.name).cyan());
            }
        }
        _ => bail!("Unrecognized EQG extension: {}", path.display()),
    }

    Ok(())
}
