//! Filesystem seam for the structural fact cache.
//!
//! The cache canonicalizes, hashes, reads and writes through `FileSystem`
//! so tests can simulate vanished sources and read-only cache directories.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub trait FileSystem: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the file's content, creating it if it doesn't exist.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    /// Resolve to an absolute path of an existing file.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    fn is_dir_writable(&self, dir: &Path) -> bool;
}

/// Directory holding `path`; `.` for a bare file name.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    /// Writes a temporary file next to `path` and renames it into place, so
    /// readers never see a partial file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        let mut file = tempfile::NamedTempFile::new_in(parent_dir(path))?;
        file.write_all(content.as_bytes())?;
        file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    /// Permission bits alone ignore ownership, so this creates a scratch
    /// file in `dir` and reports whether that worked.
    fn is_dir_writable(&self, dir: &Path) -> bool {
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        dir.is_dir() && tempfile::tempfile_in(dir).is_ok()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_real_fs_write_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        let fs = RealFs::new();

        fs.write(&path, "first").unwrap();
        fs.write(&path, "second").unwrap();

        assert_eq!(fs.read_to_string(&path).unwrap(), "second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_real_fs_writable_dir() {
        let dir = TempDir::new().unwrap();
        let fs = RealFs::new();

        assert!(fs.is_dir_writable(dir.path()));
        assert!(!fs.is_dir_writable(&dir.path().join("missing")));
    }
}
