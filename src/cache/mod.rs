//! Incremental cache of per-file structural facts.
//!
//! Entries are keyed by canonical path and validated against a SHA-256 of
//! the file's current content. Only entries touched during the run are
//! written back, so facts for deleted or excluded files age out on their own.

use crate::ast::FileReference;
use crate::fs::{FileSystem, RealFs};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_CACHE_FILE: &str = ".layerguard.cache";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to hash {path}: {source}")]
    Hash {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write cache file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode cache: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub hash: String,
    pub reference: FileReference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub touched: usize,
}

#[derive(Serialize)]
struct CacheFileOut<'a> {
    version: &'a str,
    payload: BTreeMap<String, StoredEntryOut<'a>>,
}

#[derive(Serialize)]
struct StoredEntryOut<'a> {
    hash: &'a str,
    reference: &'a FileReference,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StoredEntry {
    hash: String,
    reference: FileReference,
}

pub struct AstFileCache {
    cache_file: PathBuf,
    version: String,
    fs: Arc<dyn FileSystem>,
    entries: HashMap<PathBuf, CacheEntry>,
    touched: HashSet<PathBuf>,
    loaded: bool,
}

impl AstFileCache {
    pub fn new(cache_file: impl Into<PathBuf>) -> Self {
        Self::with_fs(cache_file, Arc::new(RealFs::new()))
    }

    pub fn with_fs(cache_file: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            cache_file: cache_file.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            fs,
            entries: HashMap::new(),
            touched: HashSet::new(),
            loaded: false,
        }
    }

    /// Override the version tag written to and expected from the cache file.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Facts for `path` if its content is unchanged since they were stored.
    /// A stale entry is evicted.
    pub fn get(&mut self, path: &Path) -> Result<Option<&FileReference>, CacheError> {
        self.load();

        let path = self.normalize(path)?;

        if !self.is_fresh(&path)? {
            return Ok(None);
        }

        self.touched.insert(path.clone());
        Ok(self.entries.get(&path).map(|entry| &entry.reference))
    }

    pub fn set(&mut self, path: &Path, reference: FileReference) -> Result<(), CacheError> {
        self.load();

        let path = self.normalize(path)?;
        let hash = self.hash(&path)?;

        self.touched.insert(path.clone());
        self.entries.insert(path, CacheEntry { hash, reference });
        Ok(())
    }

    /// Read the cache file once. A missing or unreadable file leaves the
    /// cache empty and allows a later retry; a version mismatch or a payload
    /// that fails to decode counts as loaded but empty.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }

        if !self.fs.exists(&self.cache_file) {
            return;
        }

        let contents = match self.fs.read_to_string(&self.cache_file) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!("Cache file {} unreadable: {}", self.cache_file.display(), e);
                return;
            }
        };

        self.loaded = true;

        let Some(payload) = self.decode(&contents) else {
            return;
        };

        tracing::debug!(
            "Loaded {} cached file references from {}",
            payload.len(),
            self.cache_file.display()
        );

        for (path, stored) in payload {
            self.entries
                .entry(PathBuf::from(path))
                .or_insert(CacheEntry {
                    hash: stored.hash,
                    reference: stored.reference,
                });
        }
    }

    fn decode(&self, contents: &str) -> Option<BTreeMap<String, StoredEntry>> {
        let mut document: serde_json::Value = match serde_json::from_str(contents) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!("Discarding corrupt cache file: {}", e);
                return None;
            }
        };

        let version = document.get("version").and_then(|v| v.as_str());
        if version != Some(self.version.as_str()) {
            tracing::debug!(
                "Discarding cache written by version {:?}, running {}",
                version,
                self.version
            );
            return None;
        }

        let payload = document.get_mut("payload")?.take();
        match serde_json::from_value(payload) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::debug!("Discarding cache with undecodable payload: {}", e);
                None
            }
        }
    }

    /// Write every touched entry, dropping the rest. Returns `Ok(false)`
    /// without writing when the cache directory is not writable, including
    /// when that only shows once the write is refused.
    pub fn persist(&self) -> Result<bool, CacheError> {
        let dir = self.cache_file.parent().unwrap_or_else(|| Path::new("."));
        if !self.fs.is_dir_writable(dir) {
            tracing::debug!("Cache directory {} not writable, skipping", dir.display());
            return Ok(false);
        }

        let payload: BTreeMap<String, StoredEntryOut<'_>> = self
            .entries
            .iter()
            .filter(|(path, _)| self.touched.contains(*path))
            .map(|(path, entry)| {
                (
                    path.to_string_lossy().to_string(),
                    StoredEntryOut {
                        hash: &entry.hash,
                        reference: &entry.reference,
                    },
                )
            })
            .collect();

        let count = payload.len();
        let json = serde_json::to_string(&CacheFileOut {
            version: &self.version,
            payload,
        })?;

        match self.fs.write(&self.cache_file, &json) {
            Ok(()) => {}
            Err(e) if is_permission_error(&e) => {
                tracing::debug!(
                    "Cache file {} not writable, skipping: {}",
                    self.cache_file.display(),
                    e
                );
                return Ok(false);
            }
            Err(source) => {
                return Err(CacheError::Write {
                    path: self.cache_file.clone(),
                    source,
                });
            }
        }

        tracing::debug!("Persisted {} cache entries to {}", count, self.cache_file.display());
        Ok(true)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            touched: self.touched.len(),
        }
    }

    fn is_fresh(&mut self, path: &Path) -> Result<bool, CacheError> {
        let Some(entry) = self.entries.get(path) else {
            return Ok(false);
        };
        let stored = entry.hash.clone();

        if self.hash(path)? != stored {
            tracing::debug!("Cache entry for {} is stale", path.display());
            self.entries.remove(path);
            return Ok(false);
        }

        Ok(true)
    }

    fn hash(&self, path: &Path) -> Result<String, CacheError> {
        let bytes = self.fs.read(path).map_err(|source| CacheError::Hash {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(content_hash(&bytes))
    }

    fn normalize(&self, path: &Path) -> Result<PathBuf, CacheError> {
        self.fs
            .canonicalize(path)
            .map_err(|_| CacheError::FileNotFound(path.to_path_buf()))
    }
}

pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn is_permission_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassLikeType, FileReferenceBuilder};
    use crate::fs::mock::MockFs;
    use std::fs;
    use tempfile::TempDir;

    fn reference_for(path: &Path) -> FileReference {
        FileReferenceBuilder::new(path)
            .class_like("App\\Foo", ClassLikeType::Class, 3)
            .extends("App\\Base", 3)
            .build()
    }

    fn project() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.php");
        let b = dir.path().join("b.php");
        fs::write(&a, "<?php class Foo extends Base {}").unwrap();
        fs::write(&b, "<?php class Bar {}").unwrap();
        (dir, a, b)
    }

    #[test]
    fn test_set_then_get_returns_reference() {
        let (dir, a, _) = project();
        let mut cache = AstFileCache::new(dir.path().join("cache.json"));
        let reference = reference_for(&a);

        cache.set(&a, reference.clone()).unwrap();
        assert_eq!(cache.get(&a).unwrap(), Some(&reference));
    }

    #[test]
    fn test_modified_file_is_evicted() {
        let (dir, a, _) = project();
        let mut cache = AstFileCache::new(dir.path().join("cache.json"));

        cache.set(&a, reference_for(&a)).unwrap();
        fs::write(&a, "<?php class Foo {}").unwrap();

        assert_eq!(cache.get(&a).unwrap(), None);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_get_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let mut cache = AstFileCache::new(dir.path().join("cache.json"));

        let err = cache.get(&dir.path().join("nope.php")).unwrap_err();
        assert!(matches!(err, CacheError::FileNotFound(_)));
    }

    #[test]
    fn test_persist_round_trip_keeps_only_touched_entries() {
        let (dir, a, b) = project();
        let cache_file = dir.path().join("cache.json");

        let mut first = AstFileCache::new(&cache_file);
        first.set(&a, reference_for(&a)).unwrap();
        first.set(&b, reference_for(&b)).unwrap();
        assert!(first.persist().unwrap());

        // Second run only looks at `a`.
        let mut second = AstFileCache::new(&cache_file);
        assert_eq!(second.get(&a).unwrap(), Some(&reference_for(&a)));
        second.persist().unwrap();

        let mut third = AstFileCache::new(&cache_file);
        assert!(third.get(&a).unwrap().is_some());
        assert!(third.get(&b).unwrap().is_none());
    }

    #[test]
    fn test_version_mismatch_discards_cache() {
        let (dir, a, _) = project();
        let cache_file = dir.path().join("cache.json");

        let mut old = AstFileCache::new(&cache_file).with_version("0.0.1");
        old.set(&a, reference_for(&a)).unwrap();
        old.persist().unwrap();

        let mut current = AstFileCache::new(&cache_file).with_version("0.0.2");
        assert!(current.get(&a).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_cache_file_is_a_full_miss() {
        let (dir, a, _) = project();
        let cache_file = dir.path().join("cache.json");
        fs::write(&cache_file, "{ not json").unwrap();

        let mut cache = AstFileCache::new(&cache_file);
        assert!(cache.get(&a).unwrap().is_none());
    }

    #[test]
    fn test_unknown_record_kind_is_rejected() {
        let (dir, a, _) = project();
        let cache_file = dir.path().join("cache.json");
        let canonical = fs::canonicalize(&a).unwrap();
        let hash = content_hash(&fs::read(&a).unwrap());

        let entry = serde_json::json!({
            "hash": hash,
            "reference": {
                "filepath": canonical,
                "class_likes": [],
                "functions": [],
                "variables": [],
                "dependencies": [{
                    "token": {"kind": "closure", "name": "x"},
                    "occurrence": {"filepath": "a.php", "line": 1},
                    "kind": "new"
                }]
            }
        });
        let mut payload = serde_json::Map::new();
        payload.insert(canonical.to_string_lossy().to_string(), entry);
        let document = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "payload": payload,
        });
        fs::write(&cache_file, document.to_string()).unwrap();

        let mut cache = AstFileCache::new(&cache_file);
        assert!(cache.get(&a).unwrap().is_none());
    }

    #[test]
    fn test_missing_cache_file_does_not_mark_loaded() {
        let fs = Arc::new(MockFs::with_files([(Path::new("/src/a.php"), "<?php")]));
        let mut cache = AstFileCache::with_fs("/cache/layerguard.json", fs.clone());
        cache.load();
        assert!(!cache.loaded);

        let mut writer = AstFileCache::with_fs("/cache/layerguard.json", fs.clone());
        writer
            .set(Path::new("/src/a.php"), reference_for(Path::new("/src/a.php")))
            .unwrap();
        writer.persist().unwrap();

        cache.load();
        assert!(cache.loaded);
        assert!(cache.get(Path::new("/src/a.php")).unwrap().is_some());
    }

    #[test]
    fn test_persist_skips_unwritable_directory() {
        let fs = Arc::new(MockFs::with_files([(Path::new("/src/a.php"), "<?php")]));
        fs.set_read_only(Path::new("/cache"));

        let mut cache = AstFileCache::with_fs("/cache/layerguard.json", fs.clone());
        cache
            .set(Path::new("/src/a.php"), reference_for(Path::new("/src/a.php")))
            .unwrap();

        assert!(!cache.persist().unwrap());
        assert!(fs.contents(Path::new("/cache/layerguard.json")).is_none());
    }

    #[test]
    fn test_persist_skips_refused_write() {
        let fs = Arc::new(MockFs::with_files([(Path::new("/src/a.php"), "<?php")]));
        fs.deny_writes(Path::new("/cache"));

        let mut cache = AstFileCache::with_fs("/cache/layerguard.json", fs.clone());
        cache
            .set(Path::new("/src/a.php"), reference_for(Path::new("/src/a.php")))
            .unwrap();

        assert!(!cache.persist().unwrap());
        assert!(fs.contents(Path::new("/cache/layerguard.json")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_skips_directory_without_write_permission() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, a, _) = project();
        let cache_dir = dir.path().join("cache");
        fs::create_dir(&cache_dir).unwrap();
        fs::set_permissions(&cache_dir, fs::Permissions::from_mode(0o555)).unwrap();
        // Privileged users write regardless of mode bits.
        let writable = tempfile::tempfile_in(&cache_dir).is_ok();

        let mut cache = AstFileCache::new(cache_dir.join("layerguard.json"));
        cache.set(&a, reference_for(&a)).unwrap();
        let persisted = cache.persist().unwrap();

        assert_eq!(persisted, writable);
        assert_eq!(cache_dir.join("layerguard.json").exists(), writable);
        fs::set_permissions(&cache_dir, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_vanished_source_fails_lookup() {
        let fs = Arc::new(MockFs::with_files([(Path::new("/src/a.php"), "<?php")]));
        let mut cache = AstFileCache::with_fs("/cache/layerguard.json", fs.clone());
        cache
            .set(Path::new("/src/a.php"), reference_for(Path::new("/src/a.php")))
            .unwrap();

        fs.remove(Path::new("/src/a.php"));
        let err = cache.get(Path::new("/src/a.php")).unwrap_err();
        assert!(matches!(err, CacheError::FileNotFound(_)));

        // Vanishing after canonicalization surfaces from the hash step.
        let err = cache.hash(Path::new("/src/a.php")).unwrap_err();
        assert!(matches!(err, CacheError::Hash { .. }));
    }

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
