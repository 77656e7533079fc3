//! zipprobe CLI - inspects a ZIP archive's structure and extracts each
//! entry's raw compressed payload.
//!
//! This is the console collaborator around the resolver: it lists every
//! central directory entry and writes each non-directory entry's payload,
//! still in its stored encoding, to `<name>.df` in the current directory.

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use zipprobe_archive::ZipArchive;

/// Inspect ZIP archive structure and extract raw entry payloads
#[derive(Parser)]
#[command(name = "zipprobe")]
#[command(about, long_about = None)]
struct Cli {
    /// Path to the archive
    #[arg(value_name = "FILE")]
    archive: PathBuf,
}

fn main() {
    // Anything other than exactly one path argument prints usage and
    // exits with status 1.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            println!("{}", err.render());
            process::exit(1);
        }
    };

    if let Err(err) = run(&cli) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let archive = ZipArchive::open(&cli.archive)
        .with_context(|| format!("cannot open file {}", cli.archive.display()))?;

    let eocd = archive
        .locate_eocd()
        .context("locating end of central directory record")?;

    println!(
        "Archive: {} ({} bytes, {} entries)",
        archive.name(),
        archive.len(),
        eocd.total_entries()
    );

    let mut walked = 0u64;
    for (index, entry) in archive.entries(eocd.central_dir_offset()).enumerate() {
        let entry =
            entry.with_context(|| format!("decoding central directory entry {index}"))?;
        walked += 1;

        println!(
            "{} {} {:>10} {:>10}  {:<9} {}",
            entry.mod_date(),
            entry.mod_time(),
            entry.compressed_size(),
            entry.uncompressed_size(),
            entry.method(),
            entry.name()
        );

        if entry.is_dir() {
            continue;
        }

        let data = archive
            .read_raw(&entry)
            .with_context(|| format!("extracting payload of {}", entry.name()))?;

        let output_path = entry.output_path();
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating directory {}", parent.display()))?;
            }
        }
        fs::write(&output_path, &data)
            .with_context(|| format!("writing {}", output_path.display()))?;
    }

    if walked != eocd.total_entries() {
        eprintln!(
            "warning: end of central directory lists {} entries but {} were found",
            eocd.total_entries(),
            walked
        );
    }

    Ok(())
}
