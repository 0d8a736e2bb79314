//! Dependency resolution: run the configured emitters over an [`AstMap`],
//! then flatten the result along inheritance.

pub mod emitter;
mod event;
mod flatten;
mod list;

pub use emitter::{DependencyEmitter, EmitterRegistry, EmitterType};
pub use event::{DependencyEvent, DependencyEventListener, EventDispatcher, TracingListener};
pub use flatten::InheritanceFlattener;
pub use list::{Dependency, DependencyList, DependencyOrigin};

use crate::ast::AstMap;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DependencyResolverError {
    /// Configured types are checked when the configuration loads, so this
    /// points at a registry that was changed afterwards.
    #[error("no dependency emitter registered for type '{0}'")]
    EmitterNotFound(String),
}

pub struct DependencyResolver {
    types: Vec<String>,
    emitters: EmitterRegistry,
    flattener: InheritanceFlattener,
    dispatcher: EventDispatcher,
}

impl DependencyResolver {
    /// Built-in emitters, run in the given order.
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            emitters: EmitterRegistry::with_defaults(),
            flattener: InheritanceFlattener::new(),
            dispatcher: EventDispatcher::new(),
        }
    }

    pub fn with_emitters(mut self, emitters: EmitterRegistry) -> Self {
        self.emitters = emitters;
        self
    }

    pub fn with_flattener(mut self, flattener: InheritanceFlattener) -> Self {
        self.flattener = flattener;
        self
    }

    pub fn subscribe(&mut self, listener: impl DependencyEventListener + 'static) {
        self.dispatcher.subscribe(listener);
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn resolve(&self, ast_map: &AstMap) -> Result<DependencyList, DependencyResolverError> {
        let mut dependencies = DependencyList::new();

        for name in &self.types {
            let emitter = self
                .emitters
                .get(name)
                .ok_or_else(|| DependencyResolverError::EmitterNotFound(name.clone()))?;

            self.dispatcher.dispatch(DependencyEvent::PreEmit {
                emitter: name.clone(),
            });
            let before = dependencies.len();
            emitter.apply_dependencies(ast_map, &mut dependencies);
            self.dispatcher.dispatch(DependencyEvent::PostEmit {
                emitter: name.clone(),
                emitted: dependencies.len() - before,
            });
        }

        self.dispatcher.dispatch(DependencyEvent::PreFlatten);
        let inherited = self.flattener.flatten_dependencies(ast_map, &mut dependencies);
        self.dispatcher
            .dispatch(DependencyEvent::PostFlatten { inherited });

        info!(
            total = dependencies.len(),
            inherited, "resolved dependencies"
        );
        Ok(dependencies)
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new(EmitterType::defaults().into_iter().map(EmitterType::name))
    }
}
