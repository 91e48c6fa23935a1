//! Compute the file-pair list for two directory trees.
//!
//! Two paths produce the list:
//!
//! - [`dir_diff`] — the preferred one: `git diff --raw --no-index`
//!   does the pairing and scores renames by content similarity, so a
//!   moved-and-edited file still comes back as one move record.
//! - [`dir_diff_via_scan`] — the fallback when git is unavailable:
//!   scan both trees, pair by exact name, then re-classify
//!   content-identical add/delete pairs as moves by digest. A file
//!   whose content changed during a move is beyond this path.

use crate::error::DiffError;
use crate::hash::HashCache;
use crate::pair::{FilePair, PairKind};
use panediff_codes::parse_raw_diff;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Sorted relative paths of all regular files under `root`.
pub fn list_dir_files(root: &Path) -> Result<Vec<String>, DiffError> {
    let mut names = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| DiffError::Io(e.into()))?;
        if entry.file_type().is_file() {
            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .into_owned();
            names.push(rel);
        }
    }
    names.sort();
    Ok(names)
}

/// Pair two relative-path listings by exact name.
///
/// Every input path appears in exactly one output pair: names present
/// on both sides pair up (in left input order), remaining left names
/// become one-sided deletes, remaining right names one-sided adds.
/// Identical names always pair even when the bytes are identical;
/// "no changes" is resolved later. Ordering is a stable function of
/// the input ordering.
pub fn pair_files<'a>(
    left: &'a [String],
    right: &'a [String],
) -> Vec<(Option<&'a str>, Option<&'a str>)> {
    let right_set: HashSet<&str> = right.iter().map(String::as_str).collect();
    let left_set: HashSet<&str> = left.iter().map(String::as_str).collect();

    let mut out: Vec<(Option<&str>, Option<&str>)> = Vec::new();
    for name in left {
        if right_set.contains(name.as_str()) {
            out.push((Some(name), Some(name)));
        } else {
            out.push((Some(name), None));
        }
    }
    for name in right {
        if !left_set.contains(name.as_str()) {
            out.push((None, Some(name)));
        }
    }
    out
}

/// Re-classify content-identical add/delete pairs as moves.
///
/// One-sided deletes are bucketed by left-content digest and one-sided
/// adds by right-content digest, both in input order. A digest present
/// in both buckets pops one delete and one add (front of each bucket,
/// so multiple files with identical content pair first-to-first — a
/// deterministic resolution of an ambiguity content alone cannot
/// decide) and becomes a single move record at the delete's position.
/// Everything else passes through unchanged. Built as fresh lists; no
/// removal-while-iterating.
pub fn detect_moves(pairs: Vec<FilePair>, cache: &HashCache) -> Result<Vec<FilePair>, DiffError> {
    let mut adds_by_digest: HashMap<String, VecDeque<usize>> = HashMap::new();
    for (idx, pair) in pairs.iter().enumerate() {
        if pair.kind == PairKind::Add {
            if let Some(path) = &pair.right_path {
                adds_by_digest
                    .entry(cache.digest(path)?)
                    .or_default()
                    .push_back(idx);
            }
        }
    }

    // Delete indices in input order keep the pairing deterministic.
    let mut move_target: HashMap<usize, usize> = HashMap::new();
    let mut consumed_adds: HashSet<usize> = HashSet::new();
    for (idx, pair) in pairs.iter().enumerate() {
        if pair.kind != PairKind::Delete {
            continue;
        }
        let Some(path) = &pair.left_path else { continue };
        if let Some(bucket) = adds_by_digest.get_mut(&cache.digest(path)?) {
            if let Some(add_idx) = bucket.pop_front() {
                move_target.insert(idx, add_idx);
                consumed_adds.insert(add_idx);
            }
        }
    }

    let mut out = Vec::with_capacity(pairs.len());
    for (idx, pair) in pairs.iter().enumerate() {
        if consumed_adds.contains(&idx) {
            continue;
        }
        match move_target.get(&idx) {
            Some(&add_idx) => {
                let add = &pairs[add_idx];
                let (Some(left), Some(right)) = (&pair.left_path, &add.right_path) else {
                    continue;
                };
                out.push(FilePair::both(
                    &pair.left_root,
                    left,
                    &add.right_root,
                    right,
                    true,
                ));
            }
            None => out.push(pair.clone()),
        }
    }
    Ok(out)
}

/// Fallback directory comparison without git: scan, pair by name,
/// detect pure moves by content digest.
pub fn dir_diff_via_scan(
    a_dir: &Path,
    b_dir: &Path,
    cache: &HashCache,
) -> Result<Vec<FilePair>, DiffError> {
    let left = list_dir_files(a_dir)?;
    let right = list_dir_files(b_dir)?;

    let pairs = pair_files(&left, &right)
        .into_iter()
        .map(|sides| match sides {
            (Some(l), Some(r)) => FilePair::both(a_dir, a_dir.join(l), b_dir, b_dir.join(r), false),
            (Some(l), None) => FilePair::deleted(a_dir, a_dir.join(l), b_dir),
            (None, Some(r)) => FilePair::added(a_dir, b_dir, b_dir.join(r)),
            (None, None) => unreachable!("pair_files never emits an empty pair"),
        })
        .collect();

    detect_moves(pairs, cache)
}

/// Compare two directories through `git diff --raw --no-index`.
///
/// `extra_args` is passed to git verbatim (e.g. `["-M50%"]`). Trees
/// containing symlinked files are materialized into a resolved temp
/// copy first — `--no-index` would otherwise diff the link targets'
/// names instead of their contents — and the temp prefix is rewritten
/// back so the records refer to the real roots.
pub fn dir_diff(
    a_dir: &Path,
    b_dir: &Path,
    extra_args: &[String],
) -> Result<Vec<FilePair>, DiffError> {
    let (a_nosym, _a_tmp) = resolved_root(a_dir)?;
    let (b_nosym, _b_tmp) = resolved_root(b_dir)?;

    let mut args: Vec<String> = ["diff", "--raw", "--no-index"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.extend_from_slice(extra_args);
    args.push(a_nosym.to_string_lossy().into_owned());
    args.push(b_nosym.to_string_lossy().into_owned());

    let mut stdout = run_git(&args)?;

    // Make the output look like the diff ran on the original roots.
    if a_nosym != a_dir {
        stdout = stdout.replace(
            &a_nosym.to_string_lossy().into_owned(),
            &a_dir.to_string_lossy(),
        );
    }
    if b_nosym != b_dir {
        stdout = stdout.replace(
            &b_nosym.to_string_lossy().into_owned(),
            &b_dir.to_string_lossy(),
        );
    }

    let lines = parse_raw_diff(&stdout)?;
    Ok(lines
        .iter()
        .map(|line| FilePair::from_raw_line(line, a_dir, b_dir))
        .collect())
}

/// Run git with the given arguments, accepting exit code 1 as
/// "differences found".
pub(crate) fn run_git(args: &[String]) -> Result<String, DiffError> {
    log::debug!("running git {args:?}");
    let output = Command::new("git")
        .args(args)
        .output()
        .map_err(|source| DiffError::ToolUnavailable {
            tool: "git".to_string(),
            source,
        })?;

    // git diff exits 1 both for "differences found" and for some real
    // failures, so the output has to be inspected, not just the code.
    let genuine_failure = match output.status.code() {
        Some(0) => false,
        Some(1) => output.stdout.is_empty() && !output.stderr.is_empty(),
        _ => true,
    };
    if genuine_failure {
        return Err(DiffError::Tool {
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(String::from_utf8(output.stdout)?)
}

/// Whether any file under `dir` is a symlink. Directory symlinks are
/// not expected from difftool-style invocations.
fn contains_symlinks(dir: &Path) -> bool {
    WalkDir::new(dir)
        .into_iter()
        .flatten()
        .any(|entry| entry.path_is_symlink() && !entry.file_type().is_dir())
}

/// The root to hand to git: the directory itself, or a temp copy with
/// symlink targets inlined. The `TempDir` guard must outlive the git
/// run.
fn resolved_root(dir: &Path) -> Result<(PathBuf, Option<TempDir>), DiffError> {
    if !contains_symlinks(dir) {
        return Ok((dir.to_path_buf(), None));
    }
    let tmp = tempfile::Builder::new().prefix("panediff").tempdir()?;
    copy_resolved(dir, tmp.path())?;
    log::debug!(
        "inlined symlinks: {} -> {}",
        dir.display(),
        tmp.path().display()
    );
    Ok((tmp.path().to_path_buf(), Some(tmp)))
}

fn copy_resolved(src_root: &Path, dst_root: &Path) -> Result<(), DiffError> {
    for entry in WalkDir::new(src_root).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| DiffError::Io(e.into()))?;
        let rel = entry
            .path()
            .strip_prefix(src_root)
            .unwrap_or(entry.path())
            .to_path_buf();
        let dst = dst_root.join(&rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dst)?;
        } else {
            // fs::copy follows the symlink and copies the target bytes.
            fs::copy(entry.path(), &dst)?;
        }
    }
    Ok(())
}
