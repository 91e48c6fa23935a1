//! File-pair records: one file-level diff unit between two trees.

use crate::error::DiffError;
use panediff_codes::{RawDiffLine, RawStatus};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Classification of a file pair. Derived once at construction from
/// side presence and rename information, never recomputed from
/// scattered presence checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PairKind {
    /// Only the right side exists.
    Add,
    /// Only the left side exists.
    Delete,
    /// Both sides exist under different names; a pure rename or a
    /// rename the external tool scored as similar.
    Move,
    /// Both sides exist; content (or mode) differs, or nothing does —
    /// "no changes" is resolved later, not collapsed here.
    Change,
}

/// A before/after file pair rooted in two directory trees.
///
/// Side paths are the on-disk locations handed to the diff tool;
/// display names are computed relative to the roots. At least one side
/// is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub left_root: PathBuf,
    pub left_path: Option<PathBuf>,
    pub right_root: PathBuf,
    pub right_path: Option<PathBuf>,
    pub kind: PairKind,
}

impl FilePair {
    pub fn added(
        left_root: impl Into<PathBuf>,
        right_root: impl Into<PathBuf>,
        right_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            left_root: left_root.into(),
            left_path: None,
            right_root: right_root.into(),
            right_path: Some(right_path.into()),
            kind: PairKind::Add,
        }
    }

    pub fn deleted(
        left_root: impl Into<PathBuf>,
        left_path: impl Into<PathBuf>,
        right_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            left_root: left_root.into(),
            left_path: Some(left_path.into()),
            right_root: right_root.into(),
            right_path: None,
            kind: PairKind::Delete,
        }
    }

    pub fn both(
        left_root: impl Into<PathBuf>,
        left_path: impl Into<PathBuf>,
        right_root: impl Into<PathBuf>,
        right_path: impl Into<PathBuf>,
        is_move: bool,
    ) -> Self {
        Self {
            left_root: left_root.into(),
            left_path: Some(left_path.into()),
            right_root: right_root.into(),
            right_path: Some(right_path.into()),
            kind: if is_move {
                PairKind::Move
            } else {
                PairKind::Change
            },
        }
    }

    /// Map one raw diff-summary record onto a pair.
    ///
    /// `A` is an add, `D` a delete, anything carrying a destination
    /// path (renames, copies) a move; every other status — modified,
    /// type-changed, unmerged, unknown — is a change of the same path
    /// re-rooted on the right side.
    pub fn from_raw_line(line: &RawDiffLine, left_root: &Path, right_root: &Path) -> Self {
        match line.status {
            RawStatus::Added => Self::added(left_root, right_root, &line.path),
            RawStatus::Deleted => Self::deleted(left_root, &line.path, right_root),
            _ => {
                if let Some(dst) = &line.dst_path {
                    Self::both(left_root, &line.path, right_root, dst, true)
                } else {
                    let rel = Path::new(&line.path)
                        .strip_prefix(left_root)
                        .unwrap_or(Path::new(&line.path));
                    Self::both(left_root, &line.path, right_root, right_root.join(rel), false)
                }
            }
        }
    }

    /// Relative display name on the left side; `None` for adds.
    pub fn left_name(&self) -> Option<String> {
        self.left_path.as_deref().map(|p| relative_name(p, &self.left_root))
    }

    /// Relative display name on the right side; `None` for deletes.
    pub fn right_name(&self) -> Option<String> {
        self.right_path
            .as_deref()
            .map(|p| relative_name(p, &self.right_root))
    }

    /// Resolve a side's bytes from disk; `Ok(None)` for an absent side.
    pub fn read_side(&self, side: DiffSide) -> Result<Option<Vec<u8>>, DiffError> {
        let path = match side {
            DiffSide::Left => &self.left_path,
            DiffSide::Right => &self.right_path,
        };
        match path {
            None => Ok(None),
            Some(p) => std::fs::read(p)
                .map(Some)
                .map_err(|source| DiffError::Read {
                    path: p.clone(),
                    source,
                }),
        }
    }
}

fn relative_name(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Which side of a pair a query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffSide {
    Left,
    Right,
}

/// The minimal per-pair data the file list renders: names, kind, and
/// the pair's index in the comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairSummary {
    /// Left-side name, empty when added.
    pub a: String,
    /// Right-side name, empty when deleted.
    pub b: String,
    #[serde(rename = "type")]
    pub kind: PairKind,
    pub idx: usize,
}

/// Summarize a comparison's pairs for the file list.
pub fn summarize(pairs: &[FilePair]) -> Vec<PairSummary> {
    pairs
        .iter()
        .enumerate()
        .map(|(idx, pair)| PairSummary {
            a: pair.left_name().unwrap_or_default(),
            b: pair.right_name().unwrap_or_default(),
            kind: pair.kind,
            idx,
        })
        .collect()
}

/// Find the pair whose name on `side` matches `name` (after path
/// normalization); `None` when no pair has it.
pub fn find_pair_index(pairs: &[FilePair], side: DiffSide, name: &str) -> Option<usize> {
    let wanted = normalize(name);
    pairs.iter().position(|pair| {
        let candidate = match side {
            DiffSide::Left => pair.left_name(),
            DiffSide::Right => pair.right_name(),
        };
        candidate.map(|n| normalize(&n)) == Some(wanted.clone())
    })
}

fn normalize(name: &str) -> PathBuf {
    Path::new(name).components().collect()
}
