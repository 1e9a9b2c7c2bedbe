use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::applier::{self, PatchOutcome, PatchStatus};
use crate::config::RunConfig;
use crate::PatchArgs;

pub mod modules;
pub mod ncs;
pub mod zephyr;

#[derive(Debug, Serialize)]
struct RunSummary {
    target_dir: String,
    patch_dir: String,
    dry_run: bool,
    applied: usize,
    skipped: usize,
    failed: usize,
    outcomes: Vec<PatchOutcome>,
}

impl RunSummary {
    fn new(cfg: &RunConfig, outcomes: Vec<PatchOutcome>) -> Self {
        let count =
            |status: PatchStatus| outcomes.iter().filter(|o| o.status == status).count();
        let applied = count(PatchStatus::Applied);
        let skipped = count(PatchStatus::Skipped);
        let failed = count(PatchStatus::Failed);
        Self {
            target_dir: cfg.target_dir.display().to_string(),
            patch_dir: cfg.patch_dir.display().to_string(),
            dry_run: cfg.dry_run,
            applied,
            skipped,
            failed,
            outcomes,
        }
    }
}

fn execute(variant: &str, cfg: &RunConfig, args: &PatchArgs) -> Result<()> {
    if args.apply {
        debug!("--apply is the default; 'git am' mode is not supported");
    }

    println!("west-patcher {variant}");
    println!("  target dir: {}", cfg.target_dir.display());
    println!("  patch dir : {}", cfg.patch_dir.display());
    println!("  dry-run   : {}", cfg.dry_run);

    let outcomes = applier::apply_patches(cfg)?;
    let summary = RunSummary::new(cfg, outcomes);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!("  applied : {}", summary.applied);
    println!("  skipped : {}", summary.skipped);
    println!("  failed  : {}", summary.failed);
    if !summary.outcomes.is_empty() {
        println!("  patches:");
        for outcome in &summary.outcomes {
            match &outcome.detail {
                Some(detail) => {
                    println!("    - {:<32} {:?} ({detail})", outcome.file, outcome.status)
                }
                None => println!("    - {:<32} {:?}", outcome.file, outcome.status),
            }
        }
    }
}
