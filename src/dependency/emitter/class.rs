use super::DependencyEmitter;
use crate::ast::{AstMap, DependencyType, Token};
use crate::dependency::{Dependency, DependencyList};

/// Class-like to everything its body refers to, plus its direct parents.
pub struct ClassDependencyEmitter;

impl DependencyEmitter for ClassDependencyEmitter {
    fn name(&self) -> &str {
        "class"
    }

    fn apply_dependencies(&self, ast_map: &AstMap, dependencies: &mut DependencyList) {
        for class in ast_map.class_likes() {
            let depender = Token::ClassLike(class.token.clone());

            for dependency in class.dependencies.iter().filter(|d| d.is_plain()) {
                dependencies.add(Dependency::new(
                    depender.clone(),
                    dependency.token.clone(),
                    dependency.occurrence.clone(),
                    dependency.kind,
                ));
            }

            for inherit in &class.inherits {
                dependencies.add(Dependency::new(
                    depender.clone(),
                    Token::ClassLike(inherit.class_like.clone()),
                    inherit.occurrence.clone(),
                    DependencyType::Inherit,
                ));
            }
        }
    }
}

pub struct ClassSuperGlobalDependencyEmitter;

impl DependencyEmitter for ClassSuperGlobalDependencyEmitter {
    fn name(&self) -> &str {
        "class_superglobal"
    }

    fn apply_dependencies(&self, ast_map: &AstMap, dependencies: &mut DependencyList) {
        for class in ast_map.class_likes() {
            for dependency in class
                .dependencies
                .iter()
                .filter(|d| d.kind == DependencyType::SuperGlobalVariable)
            {
                dependencies.add(Dependency::new(
                    Token::ClassLike(class.token.clone()),
                    dependency.token.clone(),
                    dependency.occurrence.clone(),
                    dependency.kind,
                ));
            }
        }
    }
}
