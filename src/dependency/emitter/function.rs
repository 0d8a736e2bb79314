use super::DependencyEmitter;
use crate::ast::{AstMap, DependencyToken, DependencyType, Token};
use crate::dependency::{Dependency, DependencyList};

pub struct FunctionDependencyEmitter;

impl DependencyEmitter for FunctionDependencyEmitter {
    fn name(&self) -> &str {
        "function"
    }

    fn apply_dependencies(&self, ast_map: &AstMap, dependencies: &mut DependencyList) {
        for function in ast_map.functions() {
            let depender = Token::FunctionLike(function.token.clone());

            for dependency in function.dependencies.iter().filter(|d| d.is_plain()) {
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

pub struct FunctionSuperGlobalDependencyEmitter;

impl DependencyEmitter for FunctionSuperGlobalDependencyEmitter {
    fn name(&self) -> &str {
        "function_superglobal"
    }

    fn apply_dependencies(&self, ast_map: &AstMap, dependencies: &mut DependencyList) {
        for function in ast_map.functions() {
            for dependency in function
                .dependencies
                .iter()
                .filter(|d| d.kind == DependencyType::SuperGlobalVariable)
            {
                dependencies.add(Dependency::new(
                    Token::FunctionLike(function.token.clone()),
                    dependency.token.clone(),
                    dependency.occurrence.clone(),
                    dependency.kind,
                ));
            }
        }
    }
}

/// Calls into functions declared in the analysed code, from any unit.
/// Calls to functions defined elsewhere (runtime builtins, vendors) are dropped.
pub struct FunctionCallDependencyEmitter;

impl FunctionCallDependencyEmitter {
    fn emit<'a>(
        ast_map: &AstMap,
        depender: &Token,
        tokens: impl Iterator<Item = &'a DependencyToken>,
        dependencies: &mut DependencyList,
    ) {
        for dependency in tokens.filter(|d| d.kind == DependencyType::UnresolvedFunctionCall) {
            let Token::FunctionLike(function) = &dependency.token else {
                continue;
            };
            if !ast_map.has_function(function) {
                continue;
            }
            dependencies.add(Dependency::new(
                depender.clone(),
                dependency.token.clone(),
                dependency.occurrence.clone(),
                dependency.kind,
            ));
        }
    }
}

impl DependencyEmitter for FunctionCallDependencyEmitter {
    fn name(&self) -> &str {
        "function_call"
    }

    fn apply_dependencies(&self, ast_map: &AstMap, dependencies: &mut DependencyList) {
        for file in ast_map.files() {
            for class in &file.class_likes {
                let depender = Token::ClassLike(class.token.clone());
                Self::emit(ast_map, &depender, class.dependencies.iter(), dependencies);
            }

            for function in &file.functions {
                let depender = Token::FunctionLike(function.token.clone());
                Self::emit(ast_map, &depender, function.dependencies.iter(), dependencies);
            }

            let depender = Token::file(file.filepath.clone());
            Self::emit(ast_map, &depender, file.dependencies.iter(), dependencies);
        }
    }
}
