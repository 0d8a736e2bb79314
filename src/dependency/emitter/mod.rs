//! Turn structural facts into dependency edges, one dependency kind per emitter.

mod class;
mod file;
mod function;
mod uses;

pub use class::{ClassDependencyEmitter, ClassSuperGlobalDependencyEmitter};
pub use file::FileDependencyEmitter;
pub use function::{
    FunctionCallDependencyEmitter, FunctionDependencyEmitter, FunctionSuperGlobalDependencyEmitter,
};
pub use uses::UsesDependencyEmitter;

use super::DependencyList;
use crate::ast::AstMap;
use std::collections::HashMap;
use std::fmt;

/// Reads the AstMap and appends edges of one kind.
///
/// Emitters never remove or rewrite edges already in the list.
pub trait DependencyEmitter: Send + Sync {
    fn name(&self) -> &str;
    fn apply_dependencies(&self, ast_map: &AstMap, dependencies: &mut DependencyList);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmitterType {
    Class,
    ClassSuperGlobal,
    File,
    Function,
    FunctionCall,
    FunctionSuperGlobal,
    Use,
}

impl EmitterType {
    pub const ALL: [EmitterType; 7] = [
        EmitterType::Class,
        EmitterType::ClassSuperGlobal,
        EmitterType::File,
        EmitterType::Function,
        EmitterType::FunctionCall,
        EmitterType::FunctionSuperGlobal,
        EmitterType::Use,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EmitterType::Class => "class",
            EmitterType::ClassSuperGlobal => "class_superglobal",
            EmitterType::File => "file",
            EmitterType::Function => "function",
            EmitterType::FunctionCall => "function_call",
            EmitterType::FunctionSuperGlobal => "function_superglobal",
            EmitterType::Use => "use",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    /// Kinds run when the configuration names none.
    pub fn defaults() -> Vec<EmitterType> {
        vec![EmitterType::Class, EmitterType::Use]
    }

    fn emitter(self) -> Box<dyn DependencyEmitter> {
        match self {
            EmitterType::Class => Box::new(ClassDependencyEmitter),
            EmitterType::ClassSuperGlobal => Box::new(ClassSuperGlobalDependencyEmitter),
            EmitterType::File => Box::new(FileDependencyEmitter),
            EmitterType::Function => Box::new(FunctionDependencyEmitter),
            EmitterType::FunctionCall => Box::new(FunctionCallDependencyEmitter),
            EmitterType::FunctionSuperGlobal => Box::new(FunctionSuperGlobalDependencyEmitter),
            EmitterType::Use => Box::new(UsesDependencyEmitter),
        }
    }
}

impl fmt::Display for EmitterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Emitters by configured name.
pub struct EmitterRegistry {
    emitters: HashMap<String, Box<dyn DependencyEmitter>>,
}

impl EmitterRegistry {
    pub fn new() -> Self {
        Self {
            emitters: HashMap::new(),
        }
    }

    /// Every built-in kind under its [`EmitterType::name`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for kind in EmitterType::ALL {
            registry.register(kind.name(), kind.emitter());
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, emitter: Box<dyn DependencyEmitter>) {
        self.emitters.insert(name.into(), emitter);
    }

    pub fn get(&self, name: &str) -> Option<&dyn DependencyEmitter> {
        self.emitters.get(name).map(|e| e.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.emitters.contains_key(name)
    }

    pub fn known_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.emitters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for EmitterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
