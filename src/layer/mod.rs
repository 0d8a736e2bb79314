//! Layer membership: which named layers a code unit belongs to.

pub mod collector;

use crate::ast::{AstMap, Token, TokenReference};
use collector::{Collectable, CollectorConfig, CollectorContext, CollectorError, CollectorResolver};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// A layer as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerDefinition {
    pub name: String,
    #[serde(default)]
    pub collectors: Vec<CollectorConfig>,
}

#[derive(Debug, Clone)]
pub struct Layer {
    name: String,
    collectables: Vec<Collectable>,
}

impl Layer {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collectables(&self) -> &[Collectable] {
        &self.collectables
    }

    /// Any collectable matching is enough.
    fn contains(
        &self,
        reference: &TokenReference<'_>,
        ctx: &CollectorContext<'_>,
    ) -> Result<bool, CollectorError> {
        for collectable in &self.collectables {
            if collectable.satisfy(reference, ctx)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

pub struct LayerResolver {
    layers: Vec<Layer>,
    resolver: CollectorResolver,
    base_path: Option<PathBuf>,
}

impl LayerResolver {
    /// Resolves and validates every collector definition.
    pub fn new(
        definitions: &[LayerDefinition],
        resolver: CollectorResolver,
    ) -> Result<Self, CollectorError> {
        let mut layers = Vec::with_capacity(definitions.len());

        for definition in definitions {
            let mut collectables = Vec::with_capacity(definition.collectors.len());
            for config in &definition.collectors {
                let collectable = resolver.resolve(config)?;
                collectable.validate(&resolver)?;
                collectables.push(collectable);
            }
            layers.push(Layer {
                name: definition.name.clone(),
                collectables,
            });
        }

        Ok(Self {
            layers,
            resolver,
            base_path: None,
        })
    }

    /// Match file paths relative to `base_path`.
    pub fn with_base_path(mut self, base_path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_for(
        &self,
        reference: &TokenReference<'_>,
        ast_map: &AstMap,
    ) -> Result<BTreeSet<String>, CollectorError> {
        let ctx = CollectorContext {
            ast_map,
            resolver: &self.resolver,
            base_path: self.base_path.as_deref(),
        };

        let mut names = BTreeSet::new();
        for layer in &self.layers {
            if layer.contains(reference, &ctx)? {
                names.insert(layer.name.clone());
            }
        }
        Ok(names)
    }

    pub fn layers_for_token(
        &self,
        token: &Token,
        ast_map: &AstMap,
    ) -> Result<BTreeSet<String>, CollectorError> {
        self.layers_for(&ast_map.reference(token), ast_map)
    }

    /// False for unknown layer names.
    pub fn is_in_layer(
        &self,
        token: &Token,
        layer: &str,
        ast_map: &AstMap,
    ) -> Result<bool, CollectorError> {
        let Some(layer) = self.layers.iter().find(|l| l.name == layer) else {
            return Ok(false);
        };
        let ctx = CollectorContext {
            ast_map,
            resolver: &self.resolver,
            base_path: self.base_path.as_deref(),
        };
        layer.contains(&ast_map.reference(token), &ctx)
    }
}
