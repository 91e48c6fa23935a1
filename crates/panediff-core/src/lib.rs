//! # panediff-core
//!
//! File-level layer of the panediff core: pairs the files of two
//! directory trees (adds, deletes, moves, changes) and orchestrates the
//! per-pair line diff that the two-pane renderer displays.
//!
//! The two entry points mirror what the (external) server layer calls:
//!
//! - [`compute_file_pairs`] — classify the file pairs of two trees,
//!   preferring `git diff --raw --no-index` (git's similarity scoring
//!   catches moved-and-edited files) and falling back to a scan +
//!   content-hash comparison when git is not available;
//! - [`compute_line_codes`] — produce the aligned line-range codes for
//!   one pair via `git diff --no-index` and the alignment engine in
//!   `panediff-codes`.
//!
//! Everything is synchronous and request-scoped; the only shared state
//! is the explicitly constructed [`HashCache`]. Subprocess invocations
//! block, so a concurrent server should place each call on its own
//! worker.

mod dirdiff;
mod error;
mod hash;
mod ops;
mod pair;
mod source;

pub use dirdiff::{detect_moves, dir_diff, dir_diff_via_scan, list_dir_files, pair_files};
pub use error::DiffError;
pub use hash::HashCache;
pub use ops::{count_lines, diff_ops, no_changes};
pub use pair::{find_pair_index, summarize, DiffSide, FilePair, PairKind, PairSummary};
pub use source::{DiffSource, FetchedPairSource, LocalPairSource, SideFetcher};

// Re-exported so consumers don't need a direct panediff-codes
// dependency to look at the result.
pub use panediff_codes::{Code, CodeKind};

use std::path::Path;

/// Classify the file pairs between two directory trees.
///
/// `extra_args` goes to `git diff --raw --no-index` verbatim. When git
/// cannot be spawned at all the scan fallback takes over (exact-name
/// pairing plus digest-based pure-move detection through `cache`);
/// a git run that fails for a real reason is surfaced, not retried.
pub fn compute_file_pairs(
    a_dir: &Path,
    b_dir: &Path,
    extra_args: &[String],
    cache: &HashCache,
) -> Result<Vec<FilePair>, DiffError> {
    match dir_diff(a_dir, b_dir, extra_args) {
        Ok(pairs) => Ok(pairs),
        Err(DiffError::ToolUnavailable { tool, source }) => {
            log::warn!("{tool} unavailable ({source}), falling back to directory scan");
            dir_diff_via_scan(a_dir, b_dir, cache)
        }
        Err(other) => Err(other),
    }
}

/// Compute the aligned line-range codes for one file pair.
///
/// `extra_args` goes to `git diff --no-index` verbatim (whitespace
/// handling, diff algorithm selection).
pub fn compute_line_codes(pair: &FilePair, extra_args: &[String]) -> Result<Vec<Code>, DiffError> {
    diff_ops(pair, extra_args)
}
