use super::reference::FileReference;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Syntax error in {path}: {message}")]
    Syntax { path: PathBuf, message: String },
    #[error("No parser registered for file: {0}")]
    UnsupportedLanguage(PathBuf),
}

impl ParseError {
    /// Syntax errors only cost the one file; everything else ends the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ParseError::Syntax { .. })
    }
}

/// Turns one source file into its structural facts.
///
/// Implementations live outside this crate; the analysis pipeline calls
/// them only on cache misses, possibly from several threads at once.
pub trait FileParser: Send + Sync {
    fn extensions(&self) -> &[&str];
    fn parse(&self, path: &Path) -> Result<FileReference, ParseError>;
}

pub struct ParserRegistry {
    parsers: Vec<Box<dyn FileParser>>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    pub fn with_parser(mut self, parser: impl FileParser + 'static) -> Self {
        self.register(Box::new(parser));
        self
    }

    pub fn register(&mut self, parser: Box<dyn FileParser>) {
        self.parsers.push(parser);
    }

    pub fn find_parser(&self, path: &Path) -> Option<&dyn FileParser> {
        let ext = path.extension()?.to_str()?;
        self.parsers
            .iter()
            .find(|p| p.extensions().contains(&ext))
            .map(|p| p.as_ref())
    }

    pub fn supported_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|p| p.extensions().iter().copied())
            .collect()
    }

    pub fn parse(&self, path: &Path) -> Result<FileReference, ParseError> {
        self.find_parser(path)
            .ok_or_else(|| ParseError::UnsupportedLanguage(path.to_path_buf()))?
            .parse(path)
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
