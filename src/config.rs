use crate::ast::InheritType;
use crate::cache::DEFAULT_CACHE_FILE;
use crate::dependency::EmitterType;
use crate::layer::LayerDefinition;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE: &str = ".layerguard.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Unknown dependency emitter type '{0}'")]
    UnknownEmitterType(String),
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Layer '{0}' is defined more than once")]
    DuplicateLayer(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Analysed paths, relative to the project root.
    pub paths: Vec<PathBuf>,
    pub exclude_files: Vec<Regex>,
    pub cache_file: PathBuf,
    pub analyser: AnalyserConfig,
    pub layers: Vec<LayerDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalyserConfig {
    /// Emitters to run, in order.
    pub types: Vec<EmitterType>,
    /// Inherit kinds that count as ancestry when flattening.
    pub inherit_types: Vec<InheritType>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    paths: Option<Vec<PathBuf>>,
    exclude_files: Option<Vec<String>>,
    cache_file: Option<PathBuf>,
    analyser: Option<RawAnalyser>,
    #[serde(default)]
    layers: Vec<LayerDefinition>,
}

#[derive(Debug, Deserialize)]
struct RawAnalyser {
    types: Option<Vec<String>>,
    inherit_types: Option<Vec<InheritType>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from(".")],
            exclude_files: Vec::new(),
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            analyser: AnalyserConfig::default(),
            layers: Vec::new(),
        }
    }
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            types: EmitterType::defaults(),
            inherit_types: vec![InheritType::Extends],
        }
    }
}

impl AnalyserConfig {
    pub fn type_names(&self) -> Vec<&'static str> {
        self.types.iter().map(|t| t.name()).collect()
    }
}

impl Config {
    pub fn load(project_path: &Path) -> Result<Self, ConfigError> {
        let config_path = project_path.join(CONFIG_FILE);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&config_path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let defaults = Self::default();

        let exclude_files = raw
            .exclude_files
            .unwrap_or_default()
            .into_iter()
            .map(|pattern| {
                Regex::new(&pattern)
                    .map_err(|source| ConfigError::InvalidExcludePattern { pattern, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let analyser = match raw.analyser {
            Some(a) => AnalyserConfig {
                types: match a.types {
                    Some(names) => names
                        .iter()
                        .map(|name| {
                            EmitterType::from_name(name)
                                .ok_or_else(|| ConfigError::UnknownEmitterType(name.clone()))
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    None => defaults.analyser.types.clone(),
                },
                inherit_types: a
                    .inherit_types
                    .unwrap_or_else(|| defaults.analyser.inherit_types.clone()),
            },
            None => defaults.analyser.clone(),
        };

        let mut seen = HashSet::new();
        for layer in &raw.layers {
            if !seen.insert(layer.name.as_str()) {
                return Err(ConfigError::DuplicateLayer(layer.name.clone()));
            }
        }

        Ok(Self {
            paths: raw.paths.unwrap_or(defaults.paths),
            exclude_files,
            cache_file: raw.cache_file.unwrap_or(defaults.cache_file),
            analyser,
            layers: raw.layers,
        })
    }
}
