//! Math-render cache passthrough.
//!
//! An external math renderer keeps a serialized cache next to the input
//! document. Its format is opaque here: the pipeline only loads the file
//! before a build and persists it afterwards, so the collaborator sees a
//! stable sibling file across rebuilds. A document that never uses math
//! simply has no cache file and this is a no-op.

use crate::debug;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// File name of the cache, sibling to the input document.
pub const CACHE_FILE: &str = "math.cache";

/// Opaque cache snapshot for one build.
#[derive(Debug)]
pub struct MathCache {
    path: PathBuf,
    data: Option<Vec<u8>>,
}

impl MathCache {
    /// Load the cache from the input document's directory, if present.
    pub fn load(input_dir: &Path) -> Self {
        let path = input_dir.join(CACHE_FILE);
        let data = fs::read(&path).ok();
        if data.is_some() {
            debug!("cache"; "loaded {}", path.display());
        }
        Self { path, data }
    }

    /// Persist the snapshot back to disk. No-op when nothing was loaded.
    pub fn persist(&self) -> io::Result<()> {
        if let Some(data) = &self.data {
            debug!("cache"; "persisting {}", self.path.display());
            fs::write(&self.path, data)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_cache_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = MathCache::load(tmp.path());
        cache.persist().unwrap();
        assert!(!tmp.path().join(CACHE_FILE).exists());
    }

    #[test]
    fn test_cache_round_trips_opaque_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CACHE_FILE);
        fs::write(&path, b"\x80\x04opaque").unwrap();

        let cache = MathCache::load(tmp.path());
        fs::remove_file(&path).unwrap();
        cache.persist().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"\x80\x04opaque");
    }
}
