use crate::error::Result;
use crate::io::contact_matrix::{read_matrix, Metadata};
use crate::matrix::SquareMatrix;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A parsed contact matrix file
#[derive(Debug)]
pub struct LoadedMatrix {
    pub scores: SquareMatrix,
    pub metadata: Metadata,
}

/// LRU cache of parsed contact matrices, keyed by file path
pub struct MatrixCache {
    cache: LruCache<PathBuf, Arc<LoadedMatrix>>,
    hits: u64,
    misses: u64,
}

impl MatrixCache {
    /// Create a cache holding at most `capacity` matrices (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(cap),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the parsed matrix for `path`, reading it from disk on a miss
    pub fn load(&mut self, path: &Path) -> Result<Arc<LoadedMatrix>> {
        if let Some(found) = self.cache.get(path) {
            self.hits += 1;
            return Ok(Arc::clone(found));
        }

        self.misses += 1;
        let (scores, metadata) = read_matrix(path)?;
        let loaded = Arc::new(LoadedMatrix { scores, metadata });
        self.cache.put(path.to_path_buf(), Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Get the current number of cached entries
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// (hits, misses) since creation or the last clear
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Clear all entries from the cache
    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_matrix(dir: &Path, name: &str, value: f64) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("0 {v}\n{v} 0\n", v = value)).unwrap();
        path
    }

    #[test]
    fn test_cache_hit_after_miss() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_matrix(temp_dir.path(), "a.mat", 0.5);
        let mut cache = MatrixCache::new(4);

        let first = cache.load(&path).unwrap();
        let second = cache.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(first.scores.get(0, 1), 0.5);
    }

    #[test]
    fn test_cache_eviction() {
        let temp_dir = TempDir::new().unwrap();
        let a = write_matrix(temp_dir.path(), "a.mat", 1.0);
        let b = write_matrix(temp_dir.path(), "b.mat", 2.0);
        let c = write_matrix(temp_dir.path(), "c.mat", 3.0);
        let mut cache = MatrixCache::new(2);

        cache.load(&a).unwrap();
        cache.load(&b).unwrap();
        cache.load(&c).unwrap();
        assert_eq!(cache.len(), 2);

        // a was evicted and must be read again
        cache.load(&a).unwrap();
        assert_eq!(cache.stats(), (0, 4));
    }

    #[test]
    fn test_cache_capacity_zero_is_one() {
        let temp_dir = TempDir::new().unwrap();
        let a = write_matrix(temp_dir.path(), "a.mat", 1.0);
        let mut cache = MatrixCache::new(0);
        cache.load(&a).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_clear() {
        let temp_dir = TempDir::new().unwrap();
        let a = write_matrix(temp_dir.path(), "a.mat", 1.0);
        let mut cache = MatrixCache::new(2);
        cache.load(&a).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), (0, 0));
    }

    #[test]
    fn test_cache_missing_file_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = MatrixCache::new(2);
        assert!(cache.load(&temp_dir.path().join("missing.mat")).is_err());
        assert!(cache.is_empty());
    }
}
