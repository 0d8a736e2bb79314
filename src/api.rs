//! Library entry point.
//!
//! [`analyse`] runs the whole engine for one project: configuration, input
//! collection, cached fact extraction, dependency resolution and layer
//! assignment. Parsing is supplied by the caller through a
//! [`ParserRegistry`].
//!
//! # Example
//!
//! ```no_run
//! use layerguard::ast::{FileParser, FileReference, ParseError, ParserRegistry};
//! use layerguard::{AnalysisOptions, analyse};
//! use std::path::Path;
//!
//! struct PhpParser;
//!
//! impl FileParser for PhpParser {
//!     fn extensions(&self) -> &[&str] {
//!         &["php"]
//!     }
//!
//!     fn parse(&self, path: &Path) -> Result<FileReference, ParseError> {
//!         // Walk the syntax tree and feed a FileReferenceBuilder here.
//!         Ok(FileReference::empty(path))
//!     }
//! }
//!
//! let parsers = ParserRegistry::new().with_parser(PhpParser);
//! let result = analyse(Path::new("."), &parsers, AnalysisOptions::default())?;
//! println!("{} dependencies", result.dependencies.len());
//! # Ok::<(), layerguard::LayerguardError>(())
//! ```

use crate::analysis::{self, AnalysisError, BuildStats, InputError};
use crate::ast::{AstMap, ParserRegistry};
use crate::cache::AstFileCache;
use crate::config::{Config, ConfigError};
use crate::dependency::{
    DependencyList, DependencyResolver, DependencyResolverError, InheritanceFlattener,
    TracingListener,
};
use crate::layer::LayerResolver;
use crate::layer::collector::{CollectorError, CollectorResolver};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during an analysis run.
#[derive(Debug, Error)]
pub enum LayerguardError {
    /// The project root could not be found or resolved.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid collector: {0}")]
    Collector(#[from] CollectorError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Dependency resolution failed: {0}")]
    Dependency(#[from] DependencyResolverError),
}

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Use this configuration instead of reading `.layerguard.toml`.
    pub config: Option<Config>,

    /// Overrides the configured cache file.
    pub cache_file: Option<PathBuf>,

    /// Write the cache back after the run.
    pub persist_cache: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            config: None,
            cache_file: None,
            persist_cache: true,
        }
    }
}

pub struct AnalysisResult {
    pub ast_map: AstMap,
    pub dependencies: DependencyList,
    pub layers: LayerResolver,
    pub stats: BuildStats,
}

/// Analyse the project rooted at `project_root`.
///
/// Configured paths, the cache file and glob collectors are all taken
/// relative to the root. Failing to write the cache is logged, not returned.
pub fn analyse(
    project_root: &Path,
    parsers: &ParserRegistry,
    options: AnalysisOptions,
) -> Result<AnalysisResult, LayerguardError> {
    let root = project_root
        .canonicalize()
        .map_err(|_| LayerguardError::PathNotFound(project_root.to_path_buf()))?;

    let config = match options.config {
        Some(config) => config,
        None => Config::load(&root)?,
    };

    let layers =
        LayerResolver::new(&config.layers, CollectorResolver::default())?.with_base_path(&root);

    let paths: Vec<PathBuf> = config.paths.iter().map(|p| root.join(p)).collect();
    let files = analysis::collect_files(&paths, &config.exclude_files, parsers)?;

    let cache_file = root.join(options.cache_file.unwrap_or(config.cache_file));
    let mut cache = AstFileCache::new(cache_file);
    let (ast_map, stats) = analysis::build_ast_map(&files, parsers, &mut cache)?;

    if options.persist_cache {
        match cache.persist() {
            Ok(true) => {}
            Ok(false) => tracing::debug!("Cache not persisted: directory not writable"),
            Err(e) => tracing::warn!("Failed to persist cache: {}", e),
        }
    }

    let flattener =
        InheritanceFlattener::new().with_inherit_types(config.analyser.inherit_types.clone());
    let mut resolver =
        DependencyResolver::new(config.analyser.type_names()).with_flattener(flattener);
    resolver.subscribe(TracingListener);
    let dependencies = resolver.resolve(&ast_map)?;

    tracing::info!(
        files = files.len(),
        cached = stats.cached,
        parsed = stats.parsed,
        dependencies = dependencies.len(),
        layers = layers.layers().len(),
        "analysis finished"
    );

    Ok(AnalysisResult {
        ast_map,
        dependencies,
        layers,
        stats,
    })
}
