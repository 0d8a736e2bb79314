use super::DependencyEmitter;
use crate::ast::{AstMap, Token};
use crate::dependency::{Dependency, DependencyList};

/// Every class-like in a file depends on each of the file's imports.
pub struct UsesDependencyEmitter;

impl DependencyEmitter for UsesDependencyEmitter {
    fn name(&self) -> &str {
        "use"
    }

    fn apply_dependencies(&self, ast_map: &AstMap, dependencies: &mut DependencyList) {
        for file in ast_map.files() {
            for import in file.use_statements() {
                for class in &file.class_likes {
                    dependencies.add(Dependency::new(
                        Token::ClassLike(class.token.clone()),
                        import.token.clone(),
                        import.occurrence.clone(),
                        import.kind,
                    ));
                }
            }
        }
    }
}
