use super::DependencyEmitter;
use crate::ast::{AstMap, DependencyType, Token};
use crate::dependency::{Dependency, DependencyList};

/// File to the usages found outside any class-like or function.
pub struct FileDependencyEmitter;

impl DependencyEmitter for FileDependencyEmitter {
    fn name(&self) -> &str {
        "file"
    }

    fn apply_dependencies(&self, ast_map: &AstMap, dependencies: &mut DependencyList) {
        for file in ast_map.files() {
            let depender = Token::file(file.filepath.clone());

            for dependency in file
                .dependencies
                .iter()
                .filter(|d| d.is_plain() && d.kind != DependencyType::Use)
            {
                dependencies.add(Dependency::new(
                    depender.clone(),
                    dependency.token.clone(),
                    dependency.occurrence.clone(),
                    dependency.kind,
                ));
            }
        }
    }
}
