use super::{Collectable, CollectorConfig, CollectorError, CollectorRegistry};

/// Turns a collector definition into a [`Collectable`].
#[derive(Clone)]
pub struct CollectorResolver {
    registry: CollectorRegistry,
}

impl CollectorResolver {
    pub fn new(registry: CollectorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CollectorRegistry {
        &self.registry
    }

    /// The definition is kept as given; kind-specific options are only
    /// read when the collectable is validated or evaluated.
    pub fn resolve(&self, config: &CollectorConfig) -> Result<Collectable, CollectorError> {
        let kind = config.kind().ok_or(CollectorError::MissingType)?;

        let collector = self
            .registry
            .get(kind)
            .map_err(|_| CollectorError::UnsupportedType {
                kind: kind.to_string(),
                known: self.registry.known_kinds(),
            })?;

        Ok(Collectable::new(collector, config.clone()))
    }
}

impl Default for CollectorResolver {
    fn default() -> Self {
        Self::new(CollectorRegistry::with_defaults())
    }
}
