//! Writes envcal man pages (one per subcommand) into a directory.
//!
//! Usage: generate-man [OUT_DIR]   (default: ./man)

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_mangen::Man;
use envcal::cli::Cli;

fn write_page(command: clap::Command, path: &Path) -> Result<()> {
    let mut buffer: Vec<u8> = Vec::new();
    Man::new(command)
        .render(&mut buffer)
        .with_context(|| format!("Failed to render man page {}", path.display()))?;
    fs::write(path, buffer).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&out_dir).with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let command = Cli::command();
    write_page(command.clone(), &out_dir.join("envcal.1"))?;
    for subcommand in command.get_subcommands() {
        let path = out_dir.join(format!("envcal-{}.1", subcommand.get_name()));
        write_page(subcommand.clone(), &path)?;
    }
    Ok(())
}
