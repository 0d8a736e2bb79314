//! Collectors decide whether a code unit belongs to a layer.
//!
//! A collector is stateless; the options it evaluates live in a
//! [`CollectorConfig`] taken verbatim from the layer definition. Binding the
//! two together gives a [`Collectable`], which compiles the options into a
//! [`Predicate`] once and reuses it for every reference.

mod boolean;
mod class_like;
mod directory;
mod function_name;
mod inheritance;
mod registry;
mod resolver;
mod superglobal;

pub use boolean::BoolCollector;
pub use class_like::{ClassLikeCollector, ClassNameRegexCollector};
pub use directory::{DirectoryCollector, GlobCollector, glob_match};
pub use function_name::FunctionNameCollector;
pub use inheritance::InheritanceCollector;
pub use registry::CollectorRegistry;
pub use resolver::CollectorResolver;
pub use superglobal::SuperGlobalCollector;

use crate::ast::{AstMap, TokenReference};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("collector definition has no 'type'")]
    MissingType,

    #[error("unsupported collector type '{kind}' (known types: {})", .known.join(", "))]
    UnsupportedType { kind: String, known: Vec<String> },

    #[error("collector type '{0}' is not registered")]
    NotFound(String),

    #[error("collector '{kind}' requires option '{key}'")]
    MissingOption { kind: String, key: String },

    #[error("collector '{kind}' option '{key}' must be {expected}")]
    InvalidOption {
        kind: String,
        key: String,
        expected: &'static str,
    },

    #[error("collector '{kind}' has an invalid pattern '{pattern}': {source}")]
    InvalidRegex {
        kind: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Options of one collector entry, e.g. `{ type = "classLike", value = "App\\.*" }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectorConfig(toml::Table);

impl CollectorConfig {
    pub fn new(table: toml::Table) -> Self {
        Self(table)
    }

    /// Shorthand for the common `{ type, value }` shape.
    pub fn with_value(kind: &str, value: impl Into<toml::Value>) -> Self {
        let mut table = toml::Table::new();
        table.insert("type".into(), toml::Value::String(kind.into()));
        table.insert("value".into(), value.into());
        Self(table)
    }

    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(toml::Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.0.get(key)
    }

    pub fn table(&self) -> &toml::Table {
        &self.0
    }

    fn kind_name(&self) -> String {
        self.kind().unwrap_or("<untyped>").to_string()
    }

    pub fn require_str(&self, key: &str) -> Result<&str, CollectorError> {
        match self.0.get(key) {
            Some(toml::Value::String(s)) => Ok(s.as_str()),
            Some(_) => Err(CollectorError::InvalidOption {
                kind: self.kind_name(),
                key: key.to_string(),
                expected: "a string",
            }),
            None => Err(CollectorError::MissingOption {
                kind: self.kind_name(),
                key: key.to_string(),
            }),
        }
    }

    /// Compile option `key` as an unanchored regex.
    pub fn regex(&self, key: &str, case_insensitive: bool) -> Result<Regex, CollectorError> {
        let pattern = self.require_str(key)?;
        RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|source| CollectorError::InvalidRegex {
                kind: self.kind_name(),
                pattern: pattern.to_string(),
                source,
            })
    }

    /// A string or an array of strings.
    pub fn str_list(&self, key: &str) -> Result<Vec<String>, CollectorError> {
        let invalid = || CollectorError::InvalidOption {
            kind: self.kind_name(),
            key: key.to_string(),
            expected: "a string or a list of strings",
        };

        match self.0.get(key) {
            Some(toml::Value::String(s)) => Ok(vec![s.clone()]),
            Some(toml::Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                .collect(),
            Some(_) => Err(invalid()),
            None => Err(CollectorError::MissingOption {
                kind: self.kind_name(),
                key: key.to_string(),
            }),
        }
    }

    /// Nested collector definitions; absent means none.
    pub fn list(&self, key: &str) -> Result<Vec<CollectorConfig>, CollectorError> {
        let invalid = || CollectorError::InvalidOption {
            kind: self.kind_name(),
            key: key.to_string(),
            expected: "a list of collector tables",
        };

        match self.0.get(key) {
            None => Ok(Vec::new()),
            Some(toml::Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_table()
                        .map(|t| CollectorConfig(t.clone()))
                        .ok_or_else(invalid)
                })
                .collect(),
            Some(_) => Err(invalid()),
        }
    }
}

/// What collectors may consult besides the reference under test.
#[derive(Clone, Copy)]
pub struct CollectorContext<'a> {
    pub ast_map: &'a AstMap,
    /// For collectors that nest other definitions.
    pub resolver: &'a CollectorResolver,
    /// Paths are matched relative to this when set.
    pub base_path: Option<&'a Path>,
}

/// A collector's options compiled into something evaluated per reference.
pub trait Predicate: Send + Sync {
    fn satisfy(
        &self,
        reference: &TokenReference<'_>,
        ctx: &CollectorContext<'_>,
    ) -> Result<bool, CollectorError>;
}

pub trait Collector: Send + Sync {
    /// Check and compile the options, before any reference is evaluated.
    fn prepare(
        &self,
        config: &CollectorConfig,
        resolver: &CollectorResolver,
    ) -> Result<Arc<dyn Predicate>, CollectorError>;
}

/// A collector bound to its configuration.
///
/// The options are compiled on first use and the result is shared by every
/// later evaluation, clones included.
#[derive(Clone)]
pub struct Collectable {
    collector: Arc<dyn Collector>,
    config: CollectorConfig,
    prepared: Arc<OnceLock<Arc<dyn Predicate>>>,
}

impl Collectable {
    pub fn new(collector: Arc<dyn Collector>, config: CollectorConfig) -> Self {
        Self {
            collector,
            config,
            prepared: Arc::new(OnceLock::new()),
        }
    }

    pub fn collector(&self) -> &dyn Collector {
        self.collector.as_ref()
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    fn predicate(&self, resolver: &CollectorResolver) -> Result<&dyn Predicate, CollectorError> {
        if let Some(predicate) = self.prepared.get() {
            return Ok(predicate.as_ref());
        }
        let predicate = self.collector.prepare(&self.config, resolver)?;
        Ok(self.prepared.get_or_init(|| predicate).as_ref())
    }

    pub fn satisfy(
        &self,
        reference: &TokenReference<'_>,
        ctx: &CollectorContext<'_>,
    ) -> Result<bool, CollectorError> {
        self.predicate(ctx.resolver)?.satisfy(reference, ctx)
    }

    /// Compiles the options, reporting what is wrong with them.
    pub fn validate(&self, resolver: &CollectorResolver) -> Result<(), CollectorError> {
        self.predicate(resolver).map(|_| ())
    }
}

impl fmt::Debug for Collectable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collectable")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
