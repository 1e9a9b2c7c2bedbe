use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use crate::error::PatchError;

pub fn ensure_repo(repo: &Path) -> Result<(), PatchError> {
    if !repo.is_dir() {
        return Err(PatchError::Configuration(format!(
            "target directory {} does not exist",
            repo.display()
        )));
    }
    if !repo.join(".git").exists() {
        return Err(PatchError::Configuration(format!(
            "{} is not a git repository",
            repo.display()
        )));
    }
    Ok(())
}

/// Pure parse check: `git apply --numstat` reads the patch without touching
/// any tree. Empty files are treated as "not a patch".
pub fn parses_as_patch(patch: &Path) -> Result<bool, PatchError> {
    if fs::metadata(patch)?.len() == 0 {
        return Ok(false);
    }
    let output = Command::new("git")
        .arg("apply")
        .arg("--numstat")
        .arg(patch)
        .output()?;
    Ok(output.status.success())
}

/// Run `git apply` against `repo`, whitespace-relaxed so line-ending or
/// indentation drift between the patch and the tree does not cause spurious
/// failures. `check_only` maps to `--check` (validate, do not modify).
pub fn apply_patch(repo: &Path, patch: &Path, check_only: bool) -> Result<Output, PatchError> {
    let mut cmd = Command::new("git");
    cmd.arg("apply")
        .arg("--ignore-space-change")
        .arg("--ignore-whitespace");
    if check_only {
        cmd.arg("--check");
    }
    cmd.arg(patch).current_dir(repo);
    Ok(cmd.output()?)
}
