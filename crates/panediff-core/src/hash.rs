//! Content hashing with a per-path memo cache.
//!
//! Digests assert file identity for move detection, so the hash is
//! SHA-512: collisions must be cryptographically negligible, not merely
//! rare enough for bucketing.

use crate::error::DiffError;
use sha2::{Digest, Sha512};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Memoizing content hasher.
///
/// Explicitly constructed and passed to whatever needs it; callers
/// scope it to one comparison run (paths are not expected to change
/// mid-run) or to the server process if they accept staleness across
/// runs. Safe for concurrent use; a poisoned lock is unrecoverable
/// corruption and treated as such.
#[derive(Debug, Default)]
pub struct HashCache {
    digests: Mutex<HashMap<PathBuf, String>>,
}

impl HashCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hex SHA-512 digest of the file's bytes, memoized per path.
    ///
    /// An unreadable file is an error, never "doesn't match anything".
    pub fn digest(&self, path: &Path) -> Result<String, DiffError> {
        if let Some(hit) = self.lock().get(path) {
            log::debug!("hash cache hit for {}", path.display());
            return Ok(hit.clone());
        }

        let bytes = fs::read(path).map_err(|source| DiffError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let digest = hex::encode(Sha512::digest(&bytes));

        self.lock().insert(path.to_path_buf(), digest.clone());
        Ok(digest)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, String>> {
        match self.digests.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
