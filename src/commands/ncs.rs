use anyhow::Result;

use crate::config::RunConfig;
use crate::PatchArgs;

/// Patch the NCS checkout next to Zephyr. The first failed apply aborts the
/// whole run; the NCS tree carries vendor forks where a half-applied series
/// is worse than no series.
pub fn run(args: &PatchArgs) -> Result<()> {
    let cfg = RunConfig::ncs(
        args.zephyr_path.clone(),
        args.patch_path.clone(),
        args.dry_run,
    )?;
    super::execute("ncs", &cfg, args)
}
