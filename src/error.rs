use std::io;

use thiserror::Error;

/// Failures surfaced by the patch applier.
///
/// Unparsable patch files are deliberately not represented here: a file that
/// does not parse as a patch is skipped, not failed.
#[derive(Debug, Error)]
pub enum PatchError {
    /// A required path or argument is missing or unusable. Always fatal;
    /// reported before any patch file is touched.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// `git apply` exited non-zero for a single patch file. Recoverable or
    /// fatal depending on the run's failure policy.
    #[error("unable to apply patch {file}: {stderr}")]
    Apply { file: String, stderr: String },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}
