use anyhow::Result;

use crate::config::RunConfig;
use crate::PatchArgs;

/// Patch the Zephyr tree itself; failed patches are logged and skipped.
pub fn run(args: &PatchArgs) -> Result<()> {
    let cfg = RunConfig::zephyr(
        args.zephyr_path.clone(),
        args.patch_path.clone(),
        args.dry_run,
    )?;
    super::execute("zephyr", &cfg, args)
}
