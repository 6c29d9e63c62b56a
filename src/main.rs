mod logger;

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use fat12::error::StageExt;
use fat12::{render, short_name, BiosParameterBlock, Fat12Volume, FatError, Stage, StageError};

/// Print one file from the root directory of a FAT12 disk image.
#[derive(Parser)]
#[command(name = "fat", version)]
struct Cli {
    /// Disk image to read
    image: PathBuf,

    /// File to print: `NAME.EXT` or the raw 11-byte form (`"NAME    EXT"`), case sensitive
    #[arg(required_unless_present = "list")]
    name: Option<String>,

    /// List the root directory instead of printing a file
    #[arg(long)]
    list: bool,

    /// Print the decoded boot sector to stderr first
    #[arg(long)]
    info: bool,

    /// Write the file bytes as-is instead of escaping non-printable bytes
    #[arg(long)]
    raw: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all log output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Off;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Usage errors share the open-failure code; --help and --version succeed
            let code = if e.use_stderr() { Stage::OpenImage.exit_code() } else { 0 };
            let _ = e.print();
            process::exit(code);
        }
    };
    logger::init(cli.log_level());

    if let Err(e) = run(&cli) {
        eprintln!("{:#}", e);
        let code = e
            .chain()
            .find_map(|c| c.downcast_ref::<StageError>())
            .map(|s| s.stage.exit_code())
            .unwrap_or(1);
        process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let file = File::open(&cli.image)
        .map_err(FatError::from)
        .at(Stage::OpenImage)
        .with_context(|| format!("{}", cli.image.display()))?;

    let mut volume = Fat12Volume::open(file)?;

    if cli.info {
        print_info(&volume.boot_sector, volume.root_dir_end());
    }

    if cli.list {
        return list(&volume);
    }

    // clap guarantees a name unless --list was given
    let name = cli.name.as_deref().unwrap_or_default();
    let pattern = short_name(name)
        .ok_or_else(|| FatError::NotFound(name.to_string()))
        .at(Stage::Lookup)?;

    let data = volume.read_file(&pattern)?;
    log::info!("read {} bytes from {}", data.len(), name);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.raw {
        out.write_all(&data)?;
    } else {
        render::write_escaped(&mut out, &data)?;
    }
    out.flush().context("failed to write output")?;
    Ok(())
}

fn list(volume: &Fat12Volume<File>) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for entry in volume.root_dir().files() {
        let kind = if entry.is_directory() { "<DIR>" } else { "" };
        writeln!(
            out,
            "{:<12} {:>5} {:>10} {:>5}  {:?}",
            entry.display_name(),
            kind,
            entry.size,
            entry.first_cluster,
            entry.attributes
        )?;
    }
    Ok(())
}

fn print_info(bpb: &BiosParameterBlock, root_dir_end: u32) {
    eprintln!("--- Boot sector ---");
    eprintln!("OEM id              : {}", bpb.oem_id());
    eprintln!("Bytes per sector    : {}", bpb.bytes_per_sector);
    eprintln!("Sectors per cluster : {}", bpb.sectors_per_cluster);
    eprintln!("Reserved sectors    : {}", bpb.reserved_sectors);
    eprintln!("FAT count           : {}", bpb.fat_count);
    eprintln!("Sectors per FAT     : {}", bpb.sectors_per_fat);
    eprintln!("Root entries        : {}", bpb.root_entry_count);
    eprintln!("Total sectors       : {}", bpb.total_sectors());
    eprintln!("Media descriptor    : {:#04x}", bpb.media_descriptor);
    eprintln!("Volume id           : {:08X}", bpb.volume_id);
    eprintln!("Volume label        : {}", bpb.volume_label());
    eprintln!("System id           : {}", bpb.system_id());
    eprintln!("Data region (lba)   : {}", root_dir_end);
}
