use anyhow::Result;

use crate::config::RunConfig;
use crate::ModuleArgs;

/// Patch one module checkout under `../modules/<name>`.
pub fn run(args: &ModuleArgs) -> Result<()> {
    let cfg = RunConfig::modules(
        args.common.zephyr_path.clone(),
        args.common.patch_path.clone(),
        &args.module_name,
        args.common.dry_run,
    )?;
    super::execute("modules", &cfg, &args.common)
}
