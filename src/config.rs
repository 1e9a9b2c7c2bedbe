use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::PatchError;

/// What to do when `git apply` fails for one patch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log the failure and move on to the next patch file.
    ContinueOnError,
    /// Abort the whole run on the first failed apply.
    FailFast,
}

/// Fully resolved parameters for one patching run. Each subcommand variant
/// has a constructor encoding its env/flag defaulting and failure policy.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target_dir: PathBuf,
    pub patch_dir: PathBuf,
    pub policy: FailurePolicy,
    pub dry_run: bool,
}

impl RunConfig {
    /// `west-patcher zephyr`: patch the Zephyr tree itself.
    pub fn zephyr(
        zephyr_path: Option<PathBuf>,
        patch_path: Option<PathBuf>,
        dry_run: bool,
    ) -> Result<Self, PatchError> {
        let target_dir = resolve_zephyr_base(zephyr_path, env::var_os("ZEPHYR_BASE"))?;
        let patch_dir = match patch_path {
            Some(dir) => dir,
            None => install_relative("patches/zephyr")?,
        };
        Ok(Self {
            target_dir,
            patch_dir,
            policy: FailurePolicy::ContinueOnError,
            dry_run,
        })
    }

    /// `west-patcher ncs`: patch the nRF Connect SDK checkout next to Zephyr.
    pub fn ncs(
        zephyr_path: Option<PathBuf>,
        patch_path: Option<PathBuf>,
        dry_run: bool,
    ) -> Result<Self, PatchError> {
        let base = resolve_zephyr_base(zephyr_path, env::var_os("ZEPHYR_BASE"))?;
        Ok(Self {
            target_dir: base.join("..").join("nrf"),
            patch_dir: patch_path.unwrap_or_else(|| PathBuf::from("patches/ncs")),
            policy: FailurePolicy::FailFast,
            dry_run,
        })
    }

    /// `west-patcher modules`: patch one module checkout under `../modules`.
    pub fn modules(
        zephyr_path: Option<PathBuf>,
        patch_path: Option<PathBuf>,
        module_name: &str,
        dry_run: bool,
    ) -> Result<Self, PatchError> {
        let base = resolve_zephyr_base(zephyr_path, env::var_os("ZEPHYR_BASE"))?;
        Ok(Self {
            target_dir: base.join("..").join("modules").join(module_name),
            patch_dir: patch_path.unwrap_or_else(|| PathBuf::from("patches/modules")),
            policy: FailurePolicy::ContinueOnError,
            dry_run,
        })
    }
}

/// The `-z` flag wins over `$ZEPHYR_BASE`; having neither is fatal.
fn resolve_zephyr_base(
    flag: Option<PathBuf>,
    env_value: Option<OsString>,
) -> Result<PathBuf, PatchError> {
    flag.or_else(|| env_value.map(PathBuf::from))
        .ok_or_else(|| {
            PatchError::Configuration(
                "ZEPHYR_BASE is not set and --zephyr-path was not given".to_string(),
            )
        })
}

/// Default patch dirs for the zephyr variant live next to the installed
/// binary, one level up (`<install>/patches/zephyr`).
fn install_relative(rel: &str) -> Result<PathBuf, PatchError> {
    let exe = env::current_exe()?;
    let exe_dir = exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(exe_dir.join("..").join(rel))
}
