use super::{
    BoolCollector, ClassLikeCollector, ClassNameRegexCollector, Collector, CollectorError,
    DirectoryCollector, FunctionNameCollector, GlobCollector, InheritanceCollector,
    SuperGlobalCollector,
};
use crate::ast::{ClassLikeType, InheritType};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Collectors by the `type` name used in layer definitions.
#[derive(Clone, Default)]
pub struct CollectorRegistry {
    collectors: BTreeMap<String, Arc<dyn Collector>>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("bool", BoolCollector);
        registry.register("classLike", ClassLikeCollector::any());
        registry.register("class", ClassLikeCollector::of(ClassLikeType::Class));
        registry.register("interface", ClassLikeCollector::of(ClassLikeType::Interface));
        registry.register("trait", ClassLikeCollector::of(ClassLikeType::Trait));
        registry.register("classNameRegex", ClassNameRegexCollector);
        registry.register("directory", DirectoryCollector);
        registry.register("glob", GlobCollector);
        registry.register("extends", InheritanceCollector::of(InheritType::Extends));
        registry.register("implements", InheritanceCollector::of(InheritType::Implements));
        registry.register("uses", InheritanceCollector::of(InheritType::Uses));
        registry.register("inherits", InheritanceCollector::any());
        registry.register("functionName", FunctionNameCollector);
        registry.register("superglobal", SuperGlobalCollector);
        registry
    }

    /// Replaces any collector already registered under `kind`.
    pub fn register(&mut self, kind: impl Into<String>, collector: impl Collector + 'static) {
        self.collectors.insert(kind.into(), Arc::new(collector));
    }

    pub fn get(&self, kind: &str) -> Result<Arc<dyn Collector>, CollectorError> {
        self.collectors
            .get(kind)
            .cloned()
            .ok_or_else(|| CollectorError::NotFound(kind.to_string()))
    }

    pub fn has(&self, kind: &str) -> bool {
        self.collectors.contains_key(kind)
    }

    /// Sorted.
    pub fn known_kinds(&self) -> Vec<String> {
        self.collectors.keys().cloned().collect()
    }
}
