//! WLD fragment file command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use console::style;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use eq_wld::raw::Wld;
use eq_wld::vwld::VWld;

#[derive(Subcommand)]
pub enum WldCommands {
    /// Display information about a WLD file
    Info {
        /// Path to the WLD file
        file: PathBuf,
    },
}

pub fn execute(command: WldCommands) -> Result<()> {
    match command {
        WldCommands::Info { file } => execute_info(&file),
    }
}

fn execute_info(path: &Path) -> Result<()> {
    use crate::utils::table::create_table;
    use prettytable::row;

    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let wld = Wld::read(&mut reader)
        .with_context(|| format!("Failed to parse WLD file: {}", path.display()))?;
    let graph =
        VWld::decode(&wld).with_context(|| format!("Failed to decode: {}", path.display()))?;

    println!("\n{}", style("WLD File Information").bold().underlined());
    println!("File: {}", style(path.display()).cyan());
    println!(
        "Version: {}",
        style(if wld.is_new_world {
            "new world"
        } else {
            "old world"
        })
        .yellow()
    );
    println!("Fragments: {}", style(wld.fragments.len()).green());
    println!("Names: {}", style(wld.string_count).green());

    let counts = [
        ("Bitmaps", graph.bitmaps.len()),
        ("Sprites", graph.sprites.len()),
        ("Particles", graph.particles.len()),
        ("Materials", graph.materials.len()),
        ("Material Palettes", graph.material_instances.len()),
        ("Meshes", graph.meshes.len()),
        ("Animations", graph.animations.len()),
        ("Skeletons", graph.skeletons.len()),
        ("Actors", graph.actors.len()),
        ("Placed Actors", graph.actor_instances.len()),
        ("Lights", graph.lights.len()),
        ("Point Lights", graph.point_light_instances.len()),
        ("Cameras", graph.cameras.len()),
        ("BSP Trees", graph.bsp_trees.len()),
        ("Regions", graph.regions.len()),
        ("Zones", graph.region_instances.len()),
    ];

    let mut table = create_table(vec!["Entity", "Count"]);
    for (label, count) in counts {
        if count > 0 {
            table.add_row(row![label, style(count).green()]);
        }
    }
    table.printstd();

    Ok(())
}
