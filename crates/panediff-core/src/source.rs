//! Diff-source capability trait: where a pair's bytes come from.
//!
//! The orchestration layer doesn't care whether a pair is backed by
//! local files or by content fetched from a remote (a pull request's
//! before/after blobs). Implementations expose the same small surface:
//! names, kind, and lazily resolved bytes per side.

use crate::error::DiffError;
use crate::pair::{DiffSide, FilePair, PairKind};
use bytes::Bytes;
use std::sync::OnceLock;

/// A pair of file versions that can produce its content on demand.
///
/// `resolve_*` returns `Ok(None)` for a side the pair does not have
/// (the right side of a delete, the left side of an add). Resolution
/// may be expensive (disk read, network fetch) and is expected to be
/// cached by the implementation, not the caller.
pub trait DiffSource: Send + Sync {
    /// Relative name on the left side, `None` when added.
    fn left_name(&self) -> Option<String>;
    /// Relative name on the right side, `None` when deleted.
    fn right_name(&self) -> Option<String>;
    fn kind(&self) -> PairKind;
    fn resolve_left(&self) -> Result<Option<Bytes>, DiffError>;
    fn resolve_right(&self) -> Result<Option<Bytes>, DiffError>;
}

/// A pair backed by files on local disk.
pub struct LocalPairSource {
    pair: FilePair,
}

impl LocalPairSource {
    pub fn new(pair: FilePair) -> Self {
        Self { pair }
    }

    pub fn pair(&self) -> &FilePair {
        &self.pair
    }
}

impl DiffSource for LocalPairSource {
    fn left_name(&self) -> Option<String> {
        self.pair.left_name()
    }

    fn right_name(&self) -> Option<String> {
        self.pair.right_name()
    }

    fn kind(&self) -> PairKind {
        self.pair.kind
    }

    fn resolve_left(&self) -> Result<Option<Bytes>, DiffError> {
        Ok(self.pair.read_side(DiffSide::Left)?.map(Bytes::from))
    }

    fn resolve_right(&self) -> Result<Option<Bytes>, DiffError> {
        Ok(self.pair.read_side(DiffSide::Right)?.map(Bytes::from))
    }
}

/// Fetches one side's bytes from wherever the pair lives (a GitHub
/// blob, an object store). Implemented by the remote layer.
pub type SideFetcher = Box<dyn Fn(DiffSide) -> Result<Bytes, DiffError> + Send + Sync>;

/// A pair whose content is produced by a caller-supplied fetcher and
/// cached so the fetch runs at most once per side.
pub struct FetchedPairSource {
    left_name: Option<String>,
    right_name: Option<String>,
    kind: PairKind,
    fetch: SideFetcher,
    left: OnceLock<Bytes>,
    right: OnceLock<Bytes>,
}

impl FetchedPairSource {
    pub fn new(
        left_name: Option<String>,
        right_name: Option<String>,
        kind: PairKind,
        fetch: SideFetcher,
    ) -> Self {
        Self {
            left_name,
            right_name,
            kind,
            fetch,
            left: OnceLock::new(),
            right: OnceLock::new(),
        }
    }

    fn resolve(
        &self,
        present: bool,
        cell: &OnceLock<Bytes>,
        side: DiffSide,
    ) -> Result<Option<Bytes>, DiffError> {
        if !present {
            return Ok(None);
        }
        if let Some(bytes) = cell.get() {
            return Ok(Some(bytes.clone()));
        }
        let bytes = (self.fetch)(side)?;
        // A concurrent resolver may have won the race; either value is
        // the same fetch result.
        let stored = cell.get_or_init(|| bytes);
        Ok(Some(stored.clone()))
    }
}

impl DiffSource for FetchedPairSource {
    fn left_name(&self) -> Option<String> {
        self.left_name.clone()
    }

    fn right_name(&self) -> Option<String> {
        self.right_name.clone()
    }

    fn kind(&self) -> PairKind {
        self.kind
    }

    fn resolve_left(&self) -> Result<Option<Bytes>, DiffError> {
        self.resolve(self.left_name.is_some(), &self.left, DiffSide::Left)
    }

    fn resolve_right(&self) -> Result<Option<Bytes>, DiffError> {
        self.resolve(self.right_name.is_some(), &self.right, DiffSide::Right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn local_source_reads_sides_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let left = dir.path().join("old.txt");
        std::fs::write(&left, "old bytes").unwrap();

        let source = LocalPairSource::new(FilePair::deleted(dir.path(), &left, dir.path()));
        assert_eq!(source.kind(), PairKind::Delete);
        assert_eq!(
            source.resolve_left().unwrap(),
            Some(Bytes::from_static(b"old bytes"))
        );
        assert_eq!(source.resolve_right().unwrap(), None);
    }

    #[test]
    fn fetched_source_fetches_each_side_at_most_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let source = FetchedPairSource::new(
            Some("a.rs".to_string()),
            Some("a.rs".to_string()),
            PairKind::Change,
            Box::new(move |side| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(match side {
                    DiffSide::Left => Bytes::from_static(b"left"),
                    DiffSide::Right => Bytes::from_static(b"right"),
                })
            }),
        );

        assert_eq!(source.resolve_left().unwrap(), Some(Bytes::from_static(b"left")));
        assert_eq!(source.resolve_left().unwrap(), Some(Bytes::from_static(b"left")));
        assert_eq!(
            source.resolve_right().unwrap(),
            Some(Bytes::from_static(b"right"))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fetched_source_reports_absent_sides_without_fetching() {
        let source = FetchedPairSource::new(
            None,
            Some("new.txt".to_string()),
            PairKind::Add,
            Box::new(|_| panic!("must not fetch an absent side")),
        );
        assert_eq!(source.resolve_left().unwrap(), None);
    }
}
