use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::{FailurePolicy, RunConfig};
use crate::error::PatchError;
use crate::git;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchStatus {
    Applied,
    Skipped,
    Failed,
}

/// Result of attempting one file from the patch directory.
#[derive(Debug, Clone, Serialize)]
pub struct PatchOutcome {
    pub file: String,
    pub status: PatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Apply every patch file in `cfg.patch_dir` to `cfg.target_dir`, in
/// lexicographic filename order.
///
/// Files that do not parse as a patch (stray READMEs and the like) are
/// skipped silently. A failed `git apply` is logged and recorded under
/// `ContinueOnError`, or aborts the run under `FailFast`. Patches applied
/// before a mid-run failure stay applied; nothing is retried or rolled back.
pub fn apply_patches(cfg: &RunConfig) -> Result<Vec<PatchOutcome>, PatchError> {
    which::which("git")
        .map_err(|_| PatchError::Configuration("git executable not found in PATH".to_string()))?;
    git::ensure_repo(&cfg.target_dir)?;

    // Canonicalize so patch paths stay valid when the subprocess runs with
    // its working directory set to the target tree.
    let patch_dir = fs::canonicalize(&cfg.patch_dir).map_err(|_| {
        PatchError::Configuration(format!(
            "patch directory {} does not exist",
            cfg.patch_dir.display()
        ))
    })?;
    if !patch_dir.is_dir() {
        return Err(PatchError::Configuration(format!(
            "{} is not a directory",
            patch_dir.display()
        )));
    }

    let files = list_patch_files(&patch_dir)?;
    let mut outcomes = Vec::with_capacity(files.len());

    for name in files {
        let patch_path = patch_dir.join(&name);
        if !git::parses_as_patch(&patch_path)? {
            debug!("{name} does not parse as a patch, skipping");
            outcomes.push(PatchOutcome {
                file: name,
                status: PatchStatus::Skipped,
                detail: None,
            });
            continue;
        }

        let output = git::apply_patch(&cfg.target_dir, &patch_path, cfg.dry_run)?;
        if output.status.success() {
            if cfg.dry_run {
                info!("patch applies cleanly: {name}");
            } else {
                info!("patch applied correctly: {name}");
            }
            outcomes.push(PatchOutcome {
                file: name,
                status: PatchStatus::Applied,
                detail: None,
            });
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            match cfg.policy {
                FailurePolicy::FailFast => {
                    return Err(PatchError::Apply { file: name, stderr });
                }
                FailurePolicy::ContinueOnError => {
                    error!("unable to apply patch: {name}: {stderr}");
                    outcomes.push(PatchOutcome {
                        file: name,
                        status: PatchStatus::Failed,
                        detail: Some(stderr),
                    });
                }
            }
        }
    }

    Ok(outcomes)
}

/// List regular files in `dir`, sorted by name. Patch application is
/// order-sensitive (numbered prefixes encode the intended sequence), so the
/// listing is always sorted rather than left in filesystem order.
fn list_patch_files(dir: &Path) -> Result<Vec<String>, PatchError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                files.push(name.to_string());
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::process::Command;
    use tempfile::{tempdir, TempDir};

    const HELLO_PATCH: &str = "--- a/hello.txt\n+++ b/hello.txt\n@@ -1 +1 @@\n-hello\n+goodbye\n";
    const WORLD_PATCH: &str = "--- a/world.txt\n+++ b/world.txt\n@@ -1 +1 @@\n-world\n+planet\n";
    const MISMATCH_PATCH: &str =
        "--- a/hello.txt\n+++ b/hello.txt\n@@ -1 +1 @@\n-something else\n+whatever\n";

    fn init_repo() -> TempDir {
        let dir = tempdir().unwrap();
        let status = Command::new("git")
            .args(["init", "-q"])
            .current_dir(dir.path())
            .status()
            .unwrap();
        assert!(status.success());
        fs::write(dir.path().join("hello.txt"), "hello\n").unwrap();
        fs::write(dir.path().join("world.txt"), "world\n").unwrap();
        dir
    }

    fn config(repo: &TempDir, patches: &TempDir, policy: FailurePolicy) -> RunConfig {
        RunConfig {
            target_dir: repo.path().to_path_buf(),
            patch_dir: patches.path().to_path_buf(),
            policy,
            dry_run: false,
        }
    }

    fn statuses(outcomes: &[PatchOutcome]) -> Vec<PatchStatus> {
        outcomes.iter().map(|o| o.status).collect()
    }

    #[test]
    fn missing_target_is_configuration_error() {
        let patches = tempdir().unwrap();
        let cfg = RunConfig {
            target_dir: PathBuf::from("/nonexistent/tree"),
            patch_dir: patches.path().to_path_buf(),
            policy: FailurePolicy::ContinueOnError,
            dry_run: false,
        };
        let err = apply_patches(&cfg).unwrap_err();
        assert!(matches!(err, PatchError::Configuration(_)));
    }

    #[test]
    fn missing_patch_dir_is_configuration_error() {
        let repo = init_repo();
        let cfg = RunConfig {
            target_dir: repo.path().to_path_buf(),
            patch_dir: PathBuf::from("/nonexistent/patches"),
            policy: FailurePolicy::ContinueOnError,
            dry_run: false,
        };
        let err = apply_patches(&cfg).unwrap_err();
        assert!(matches!(err, PatchError::Configuration(_)));
    }

    #[test]
    fn non_patch_files_are_all_skipped() {
        let repo = init_repo();
        let patches = tempdir().unwrap();
        fs::write(patches.path().join("README.txt"), "notes, not a diff\n").unwrap();
        fs::write(patches.path().join("empty.patch"), "").unwrap();

        let cfg = config(&repo, &patches, FailurePolicy::ContinueOnError);
        let outcomes = apply_patches(&cfg).unwrap();

        assert_eq!(
            statuses(&outcomes),
            vec![PatchStatus::Skipped, PatchStatus::Skipped]
        );
        assert_eq!(
            fs::read_to_string(repo.path().join("hello.txt")).unwrap(),
            "hello\n"
        );
    }

    #[test]
    fn patches_apply_in_sorted_order() {
        let repo = init_repo();
        let patches = tempdir().unwrap();
        // Written out of order on purpose; processing must still be sorted.
        fs::write(patches.path().join("003-world.patch"), WORLD_PATCH).unwrap();
        fs::write(patches.path().join("001-hello.patch"), HELLO_PATCH).unwrap();
        fs::write(patches.path().join("002-notes.txt"), "not a patch\n").unwrap();

        let cfg = config(&repo, &patches, FailurePolicy::ContinueOnError);
        let outcomes = apply_patches(&cfg).unwrap();

        assert_eq!(
            outcomes.iter().map(|o| o.file.as_str()).collect::<Vec<_>>(),
            vec!["001-hello.patch", "002-notes.txt", "003-world.patch"]
        );
        assert_eq!(
            statuses(&outcomes),
            vec![
                PatchStatus::Applied,
                PatchStatus::Skipped,
                PatchStatus::Applied
            ]
        );
        assert_eq!(
            fs::read_to_string(repo.path().join("hello.txt")).unwrap(),
            "goodbye\n"
        );
        assert_eq!(
            fs::read_to_string(repo.path().join("world.txt")).unwrap(),
            "planet\n"
        );
    }

    #[test]
    fn continue_policy_attempts_every_patch() {
        let repo = init_repo();
        let patches = tempdir().unwrap();
        fs::write(patches.path().join("001-bad.patch"), MISMATCH_PATCH).unwrap();
        fs::write(patches.path().join("002-world.patch"), WORLD_PATCH).unwrap();

        let cfg = config(&repo, &patches, FailurePolicy::ContinueOnError);
        let outcomes = apply_patches(&cfg).unwrap();

        assert_eq!(
            statuses(&outcomes),
            vec![PatchStatus::Failed, PatchStatus::Applied]
        );
        assert!(outcomes[0].detail.is_some());
        assert_eq!(
            fs::read_to_string(repo.path().join("world.txt")).unwrap(),
            "planet\n"
        );
    }

    #[test]
    fn fail_fast_stops_at_first_failure() {
        let repo = init_repo();
        let patches = tempdir().unwrap();
        fs::write(patches.path().join("001-bad.patch"), MISMATCH_PATCH).unwrap();
        fs::write(patches.path().join("002-world.patch"), WORLD_PATCH).unwrap();

        let cfg = config(&repo, &patches, FailurePolicy::FailFast);
        let err = apply_patches(&cfg).unwrap_err();

        assert!(
            matches!(err, PatchError::Apply { ref file, .. } if file.as_str() == "001-bad.patch")
        );
        // The later patch must not have been attempted.
        assert_eq!(
            fs::read_to_string(repo.path().join("world.txt")).unwrap(),
            "world\n"
        );
    }

    #[test]
    fn reapplying_a_patch_reports_failure() {
        let repo = init_repo();
        let patches = tempdir().unwrap();
        fs::write(patches.path().join("001-hello.patch"), HELLO_PATCH).unwrap();

        let cfg = config(&repo, &patches, FailurePolicy::ContinueOnError);
        let first = apply_patches(&cfg).unwrap();
        assert_eq!(statuses(&first), vec![PatchStatus::Applied]);

        let second = apply_patches(&cfg).unwrap();
        assert_eq!(statuses(&second), vec![PatchStatus::Failed]);
        assert_eq!(
            fs::read_to_string(repo.path().join("hello.txt")).unwrap(),
            "goodbye\n"
        );
    }

    #[test]
    fn dry_run_does_not_modify_the_tree() {
        let repo = init_repo();
        let patches = tempdir().unwrap();
        fs::write(patches.path().join("001-hello.patch"), HELLO_PATCH).unwrap();

        let mut cfg = config(&repo, &patches, FailurePolicy::ContinueOnError);
        cfg.dry_run = true;
        let outcomes = apply_patches(&cfg).unwrap();

        assert_eq!(statuses(&outcomes), vec![PatchStatus::Applied]);
        assert_eq!(
            fs::read_to_string(repo.path().join("hello.txt")).unwrap(),
            "hello\n"
        );
    }

    #[test]
    fn empty_patch_dir_yields_no_outcomes() {
        let repo = init_repo();
        let patches = tempdir().unwrap();

        let cfg = config(&repo, &patches, FailurePolicy::ContinueOnError);
        let outcomes = apply_patches(&cfg).unwrap();

        assert!(outcomes.is_empty());
    }
}
