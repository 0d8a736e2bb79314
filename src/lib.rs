pub mod analysis;
pub mod api;
pub mod ast;
pub mod cache;
pub mod config;
pub mod dependency;
pub mod fs;
pub mod layer;

pub use api::{AnalysisOptions, AnalysisResult, LayerguardError, analyse};
pub use cache::AstFileCache;
pub use config::Config;
pub use dependency::{Dependency, DependencyList, DependencyResolver};
pub use layer::LayerResolver;
