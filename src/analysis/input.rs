use crate::ast::ParserRegistry;
use ignore::WalkBuilder;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input path does not exist: {0}")]
    PathNotFound(PathBuf),
}

/// Source files under `paths` that some parser accepts.
///
/// Hidden and git-ignored entries are skipped, as is every file whose path
/// matches one of `exclude`. The result is sorted and free of duplicates.
pub fn collect_files(
    paths: &[PathBuf],
    exclude: &[Regex],
    parsers: &ParserRegistry,
) -> Result<Vec<PathBuf>, InputError> {
    let mut files = Vec::new();

    for path in paths {
        if !path.exists() {
            return Err(InputError::PathNotFound(path.clone()));
        }

        let walker = WalkBuilder::new(path).hidden(true).git_ignore(true).build();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry under {}: {}", path.display(), e);
                    continue;
                }
            };

            let file_path = entry.path();
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            if parsers.find_parser(file_path).is_none() || is_excluded(file_path, exclude) {
                continue;
            }
            files.push(file_path.to_path_buf());
        }
    }

    files.sort();
    files.dedup();
    tracing::debug!("Collected {} input files", files.len());
    Ok(files)
}

fn is_excluded(path: &Path, exclude: &[Regex]) -> bool {
    if exclude.is_empty() {
        return false;
    }
    let path = path.to_string_lossy().replace('\\', "/");
    exclude.iter().any(|pattern| pattern.is_match(&path))
}
