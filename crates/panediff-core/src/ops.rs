//! Per-file-pair diff orchestration: run the external diff tool and
//! turn its output into the code sequence for one pair.

use crate::dirdiff::run_git;
use crate::error::DiffError;
use crate::hash::HashCache;
use crate::pair::FilePair;
use panediff_codes::{diff_to_codes, Code};
use std::fs;
use std::path::{Path, PathBuf};

/// Line count the way the diff tool counts: every newline terminates a
/// line, and a non-empty file without a trailing newline still ends in
/// one last line (`grep -c ''` semantics). The trailing-skip
/// computation depends on agreeing with git here.
pub fn count_lines(path: &Path) -> Result<usize, DiffError> {
    let bytes = fs::read(path).map_err(|source| DiffError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    match bytes.last() {
        None => Ok(0),
        Some(b'\n') => Ok(newlines),
        Some(_) => Ok(newlines + 1),
    }
}

/// Compute the aligned code sequence for one file pair.
///
/// With both sides present this runs `git diff --no-index` (plus
/// `git_diff_args`, e.g. `["-w"]` or `["--diff-algorithm=patience"]`)
/// on the resolved paths and feeds the output through the alignment
/// engine; binary content collapses to a single one-line `replace`
/// placeholder, which is how the renderer shows "binary files differ".
///
/// A one-sided pair needs no external tool: the whole file becomes one
/// `delete` or `insert` code. The insert convention covers one line
/// more than the file has — `(0, line_count + 1)` against the delete's
/// `(0, line_count)` — matching the renderer's long-standing
/// expectation for brand-new files; see DESIGN.md before "fixing" it.
pub fn diff_ops(pair: &FilePair, git_diff_args: &[String]) -> Result<Vec<Code>, DiffError> {
    match (&pair.left_path, &pair.right_path) {
        (Some(left), Some(right)) => {
            // --no-index refuses to follow symlinks, so resolve first.
            let left = realpath(left)?;
            let right = realpath(right)?;
            let num_lines = count_lines(&right)?;

            let mut args: Vec<String> = ["diff", "--no-index"]
                .iter()
                .map(|s| s.to_string())
                .collect();
            args.extend_from_slice(git_diff_args);
            args.push(left.to_string_lossy().into_owned());
            args.push(right.to_string_lossy().into_owned());

            let stdout = run_git(&args)?;
            Ok(match diff_to_codes(&stdout, Some(num_lines))? {
                Some(codes) if !codes.is_empty() => codes,
                // Binary (or degenerate empty-file) pair: one-line
                // placeholder on each side.
                _ => vec![Code::replace((0, 1), (0, 1))],
            })
        }
        (Some(left), None) => {
            let num_lines = count_lines(left)?;
            Ok(vec![Code::delete((0, num_lines), 0)])
        }
        (None, Some(right)) => {
            let num_lines = count_lines(right)?;
            Ok(vec![Code::insert(0, (0, num_lines + 1))])
        }
        (None, None) => Err(DiffError::MissingSide { side: "either" }),
    }
}

/// Whether a change-kind pair actually has identical bytes on both
/// sides (the file list shows these as "no changes").
pub fn no_changes(pair: &FilePair, cache: &HashCache) -> Result<bool, DiffError> {
    match (&pair.left_path, &pair.right_path) {
        (Some(left), Some(right)) => Ok(cache.digest(left)? == cache.digest(right)?),
        _ => Ok(false),
    }
}

fn realpath(path: &Path) -> Result<PathBuf, DiffError> {
    fs::canonicalize(path).map_err(|source| DiffError::Read {
        path: path.to_path_buf(),
        source,
    })
}
