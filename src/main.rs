mod applier;
mod commands;
mod config;
mod error;
mod git;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use commands::{modules, ncs, zephyr};

#[derive(Parser, Debug)]
#[command(
    name = "west-patcher",
    version,
    about = "Apply patch directories to Zephyr, NCS, and module source trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Patch sources of the Zephyr tree
    Zephyr(PatchArgs),
    /// Patch sources of NCS (nRF Connect SDK); aborts on the first failed patch
    Ncs(PatchArgs),
    /// Patch sources of one module checkout
    Modules(ModuleArgs),
}

#[derive(Args, Debug)]
pub struct PatchArgs {
    /// Folder containing patches
    #[arg(short = 'p', long)]
    pub patch_path: Option<PathBuf>,

    /// Apply with `git apply` (the only supported mode; kept for compatibility)
    #[arg(short = 'a', long)]
    pub apply: bool,

    /// Zephyr tree path (defaults to $ZEPHYR_BASE)
    #[arg(short = 'z', long)]
    pub zephyr_path: Option<PathBuf>,

    /// Validate with `git apply --check` without touching the tree
    #[arg(long)]
    pub dry_run: bool,

    /// Emit a machine-readable JSON summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ModuleArgs {
    #[command(flatten)]
    pub common: PatchArgs,

    /// Module to patch (directory name under ../modules)
    #[arg(short = 'm', long)]
    pub module_name: String,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Zephyr(args) => zephyr::run(&args),
        Command::Ncs(args) => ncs::run(&args),
        Command::Modules(args) => modules::run(&args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
