//! Turning input files into an [`AstMap`], reusing cached facts where the
//! file content has not changed.

mod input;

pub use input::{InputError, collect_files};

use crate::ast::{AstMap, FileReference, ParseError, ParserRegistry};
use crate::cache::{AstFileCache, CacheError};
use rayon::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Counts from one [`build_ast_map`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub cached: usize,
    pub parsed: usize,
    pub skipped: usize,
}

/// Cached facts for unchanged files, fresh parses for the rest.
///
/// Cache access stays on the calling thread; only parsing fans out. Files
/// with syntax errors are skipped with a warning, any other parse failure
/// aborts the build.
pub fn build_ast_map(
    files: &[PathBuf],
    parsers: &ParserRegistry,
    cache: &mut AstFileCache,
) -> Result<(AstMap, BuildStats), AnalysisError> {
    let mut slots: Vec<Option<FileReference>> = vec![None; files.len()];
    let mut misses = Vec::new();

    for (idx, path) in files.iter().enumerate() {
        match cache.get(path)? {
            Some(reference) => slots[idx] = Some(reference.clone()),
            None => misses.push(idx),
        }
    }

    let parsed: Vec<(usize, Result<FileReference, ParseError>)> = misses
        .par_iter()
        .map(|&idx| (idx, parsers.parse(&files[idx])))
        .collect();

    let mut stats = BuildStats {
        cached: files.len() - misses.len(),
        ..BuildStats::default()
    };

    for (idx, result) in parsed {
        match result {
            Ok(reference) => {
                cache.set(&files[idx], reference.clone())?;
                slots[idx] = Some(reference);
                stats.parsed += 1;
            }
            Err(e) if e.is_recoverable() => {
                tracing::warn!("Skipping {}: {}", files[idx].display(), e);
                stats.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::debug!(
        cached = stats.cached,
        parsed = stats.parsed,
        skipped = stats.skipped,
        "built ast map"
    );
    Ok((AstMap::new(slots.into_iter().flatten().collect()), stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ClassLikeToken, ClassLikeType, FileParser, FileReferenceBuilder};
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// One class per file, named by the first line; `!` marks broken syntax.
    #[derive(Default)]
    struct LineParser {
        calls: Arc<AtomicUsize>,
    }

    impl FileParser for LineParser {
        fn extensions(&self) -> &[&str] {
            &["php"]
        }

        fn parse(&self, path: &Path) -> Result<FileReference, ParseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let source = fs::read_to_string(path).map_err(|source| ParseError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let name = source.lines().next().unwrap_or_default().trim();
            if name == "!" {
                return Err(ParseError::Syntax {
                    path: path.to_path_buf(),
                    message: "unexpected '!'".into(),
                });
            }
            Ok(FileReferenceBuilder::new(path)
                .class_like(name, ClassLikeType::Class, 1)
                .build())
        }
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_second_build_reuses_cache() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write(dir.path(), "a.php", "App\\A"),
            write(dir.path(), "b.php", "App\\B"),
        ];
        let calls = Arc::new(AtomicUsize::new(0));
        let parsers = ParserRegistry::new().with_parser(LineParser {
            calls: Arc::clone(&calls),
        });
        let cache_file = dir.path().join(".layerguard.cache");

        let mut cache = AstFileCache::new(&cache_file);
        let (map, stats) = build_ast_map(&files, &parsers, &mut cache).unwrap();
        assert_eq!(stats.parsed, 2);
        assert!(map.class_like(&ClassLikeToken::new("App\\A")).is_some());
        cache.persist().unwrap();

        fs::write(&files[1], "App\\B2").unwrap();

        let mut cache = AstFileCache::new(&cache_file);
        let (map, stats) = build_ast_map(&files, &parsers, &mut cache).unwrap();
        assert_eq!(stats, BuildStats { cached: 1, parsed: 1, skipped: 0 });
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let names: Vec<_> = map.class_likes().map(|c| c.token.as_str().to_string()).collect();
        assert_eq!(names, vec!["App\\A", "App\\B2"]);
    }

    #[test]
    fn test_syntax_errors_are_skipped() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write(dir.path(), "a.php", "App\\A"),
            write(dir.path(), "broken.php", "!"),
        ];
        let parsers = ParserRegistry::new().with_parser(LineParser::default());
        let mut cache = AstFileCache::new(dir.path().join(".layerguard.cache"));

        let (map, stats) = build_ast_map(&files, &parsers, &mut cache).unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(cache.stats().entries, 1);
    }

    #[test]
    fn test_missing_parser_aborts() {
        let dir = TempDir::new().unwrap();
        let files = vec![write(dir.path(), "a.txt", "App\\A")];
        let parsers = ParserRegistry::new().with_parser(LineParser::default());
        let mut cache = AstFileCache::new(dir.path().join(".layerguard.cache"));

        let err = build_ast_map(&files, &parsers, &mut cache).unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(ParseError::UnsupportedLanguage(_))));
    }
}
