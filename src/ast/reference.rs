use super::token::{
    ClassLikeToken, DependencyToken, DependencyType, FileOccurrence, FunctionLikeToken,
    SuperGlobalToken, Token,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassLikeType {
    Class,
    Interface,
    Trait,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InheritType {
    Extends,
    Implements,
    /// Trait inclusion.
    Uses,
}

/// A subtype-to-supertype relation declared on a class-like.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AstInherit {
    pub class_like: ClassLikeToken,
    pub occurrence: FileOccurrence,
    pub kind: InheritType,
    /// Intermediate inherits walked to reach this one; empty when direct.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<AstInherit>,
}

impl AstInherit {
    pub fn new(class_like: ClassLikeToken, occurrence: FileOccurrence, kind: InheritType) -> Self {
        Self {
            class_like,
            occurrence,
            kind,
            path: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: Vec<AstInherit>) -> Self {
        self.path = path;
        self
    }

    pub fn is_direct(&self) -> bool {
        self.path.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassLikeReference {
    pub token: ClassLikeToken,
    pub kind: ClassLikeType,
    pub filepath: PathBuf,
    pub line: usize,
    pub inherits: Vec<AstInherit>,
    pub dependencies: Vec<DependencyToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionLikeReference {
    pub token: FunctionLikeToken,
    pub filepath: PathBuf,
    pub line: usize,
    pub dependencies: Vec<DependencyToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableReference {
    pub token: SuperGlobalToken,
    pub occurrence: FileOccurrence,
}

/// Every structural fact parsed out of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileReference {
    pub filepath: PathBuf,
    pub class_likes: Vec<ClassLikeReference>,
    pub functions: Vec<FunctionLikeReference>,
    pub variables: Vec<VariableReference>,
    /// File-level usages: import statements and code outside any unit.
    pub dependencies: Vec<DependencyToken>,
}

impl FileReference {
    pub fn empty(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
            class_likes: Vec::new(),
            functions: Vec::new(),
            variables: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn use_statements(&self) -> impl Iterator<Item = &DependencyToken> {
        self.dependencies
            .iter()
            .filter(|d| d.kind == DependencyType::Use)
    }
}

/// Anything a collector can be asked about.
#[derive(Debug, Clone, Copy)]
pub enum TokenReference<'a> {
    ClassLike(&'a ClassLikeReference),
    FunctionLike(&'a FunctionLikeReference),
    File(&'a FileReference),
    Variable(&'a VariableReference),
    /// A token used by the analysed code but not declared in it.
    Unresolved(&'a Token),
}

impl TokenReference<'_> {
    pub fn token(&self) -> Token {
        match self {
            TokenReference::ClassLike(r) => Token::ClassLike(r.token.clone()),
            TokenReference::FunctionLike(r) => Token::FunctionLike(r.token.clone()),
            TokenReference::File(r) => Token::file(r.filepath.clone()),
            TokenReference::Variable(r) => Token::SuperGlobal(r.token.clone()),
            TokenReference::Unresolved(token) => (*token).clone(),
        }
    }

    pub fn filepath(&self) -> Option<&Path> {
        match self {
            TokenReference::ClassLike(r) => Some(&r.filepath),
            TokenReference::FunctionLike(r) => Some(&r.filepath),
            TokenReference::File(r) => Some(&r.filepath),
            TokenReference::Variable(r) => Some(&r.occurrence.filepath),
            TokenReference::Unresolved(Token::File(file)) => Some(file.path()),
            TokenReference::Unresolved(_) => None,
        }
    }

    /// The class-like name, whether or not it is declared in the analysed code.
    pub fn class_like_token(&self) -> Option<&ClassLikeToken> {
        match self {
            TokenReference::ClassLike(r) => Some(&r.token),
            TokenReference::Unresolved(Token::ClassLike(token)) => Some(token),
            _ => None,
        }
    }

    pub fn function_like_token(&self) -> Option<&FunctionLikeToken> {
        match self {
            TokenReference::FunctionLike(r) => Some(&r.token),
            TokenReference::Unresolved(Token::FunctionLike(token)) => Some(token),
            _ => None,
        }
    }
}

/// Assembles a [`FileReference`] one declaration at a time.
///
/// External parsers drive this while walking their syntax tree: open a
/// class-like or function, record its relations and usages, and the builder
/// attaches them to whichever unit was opened last.
///
/// ```
/// use layerguard::ast::{ClassLikeType, DependencyType, FileReferenceBuilder, Token};
///
/// let reference = FileReferenceBuilder::new("src/Controller.php")
///     .use_statement("App\\Service", 3)
///     .class_like("App\\Controller", ClassLikeType::Class, 5)
///     .extends("App\\BaseController", 5)
///     .dependency(Token::class_like("App\\Service"), 9, DependencyType::New)
///     .build();
///
/// assert_eq!(reference.class_likes.len(), 1);
/// assert_eq!(reference.class_likes[0].inherits.len(), 1);
/// ```
#[derive(Debug)]
pub struct FileReferenceBuilder {
    reference: FileReference,
    current: Option<Scope>,
}

#[derive(Debug, Clone, Copy)]
enum Scope {
    ClassLike(usize),
    Function(usize),
}

impl FileReferenceBuilder {
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            reference: FileReference::empty(filepath),
            current: None,
        }
    }

    fn occurrence(&self, line: usize) -> FileOccurrence {
        FileOccurrence::new(self.reference.filepath.clone(), line)
    }

    /// Record an import at file level.
    pub fn use_statement(mut self, class_like: impl Into<String>, line: usize) -> Self {
        let occurrence = self.occurrence(line);
        self.reference.dependencies.push(DependencyToken::new(
            Token::class_like(class_like),
            occurrence,
            DependencyType::Use,
        ));
        self
    }

    pub fn class_like(mut self, name: impl Into<String>, kind: ClassLikeType, line: usize) -> Self {
        self.reference.class_likes.push(ClassLikeReference {
            token: ClassLikeToken::new(name),
            kind,
            filepath: self.reference.filepath.clone(),
            line,
            inherits: Vec::new(),
            dependencies: Vec::new(),
        });
        self.current = Some(Scope::ClassLike(self.reference.class_likes.len() - 1));
        self
    }

    pub fn function(mut self, name: impl Into<String>, line: usize) -> Self {
        self.reference.functions.push(FunctionLikeReference {
            token: FunctionLikeToken::new(name),
            filepath: self.reference.filepath.clone(),
            line,
            dependencies: Vec::new(),
        });
        self.current = Some(Scope::Function(self.reference.functions.len() - 1));
        self
    }

    /// Close the open unit; later usages are recorded at file level.
    pub fn end(mut self) -> Self {
        self.current = None;
        self
    }

    pub fn extends(self, parent: impl Into<String>, line: usize) -> Self {
        self.inherit(parent, line, InheritType::Extends)
    }

    pub fn implements(self, interface: impl Into<String>, line: usize) -> Self {
        self.inherit(interface, line, InheritType::Implements)
    }

    pub fn uses_trait(self, name: impl Into<String>, line: usize) -> Self {
        self.inherit(name, line, InheritType::Uses)
    }

    /// Ignored unless a class-like is open.
    pub fn inherit(mut self, parent: impl Into<String>, line: usize, kind: InheritType) -> Self {
        let occurrence = self.occurrence(line);
        if let Some(Scope::ClassLike(idx)) = self.current {
            self.reference.class_likes[idx]
                .inherits
                .push(AstInherit::new(ClassLikeToken::new(parent), occurrence, kind));
        }
        self
    }

    pub fn dependency(mut self, token: Token, line: usize, kind: DependencyType) -> Self {
        let dependency = DependencyToken::new(token, self.occurrence(line), kind);
        match self.current {
            Some(Scope::ClassLike(idx)) => {
                self.reference.class_likes[idx].dependencies.push(dependency)
            }
            Some(Scope::Function(idx)) => {
                self.reference.functions[idx].dependencies.push(dependency)
            }
            None => self.reference.dependencies.push(dependency),
        }
        self
    }

    pub fn super_global(mut self, name: impl Into<String>, line: usize) -> Self {
        let token = SuperGlobalToken::new(name);
        let occurrence = self.occurrence(line);
        self.reference.variables.push(VariableReference {
            token: token.clone(),
            occurrence,
        });
        self.dependency(Token::SuperGlobal(token), line, DependencyType::SuperGlobalVariable)
    }

    pub fn function_call(self, name: impl Into<String>, line: usize) -> Self {
        self.dependency(
            Token::function_like(name),
            line,
            DependencyType::UnresolvedFunctionCall,
        )
    }

    pub fn build(self) -> FileReference {
        self.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_attaches_to_open_scope() {
        let reference = FileReferenceBuilder::new("src/a.php")
            .use_statement("Vendor\\Logger", 1)
            .class_like("App\\A", ClassLikeType::Class, 3)
            .implements("App\\Contract", 3)
            .dependency(Token::class_like("App\\B"), 5, DependencyType::New)
            .function("app_helper", 10)
            .dependency(Token::class_like("App\\C"), 11, DependencyType::Parameter)
            .end()
            .dependency(Token::class_like("App\\D"), 20, DependencyType::StaticMethod)
            .build();

        assert_eq!(reference.dependencies.len(), 2);
        assert_eq!(reference.use_statements().count(), 1);

        let class = &reference.class_likes[0];
        assert_eq!(class.inherits[0].kind, InheritType::Implements);
        assert_eq!(class.dependencies.len(), 1);
        assert_eq!(class.filepath, PathBuf::from("src/a.php"));

        let function = &reference.functions[0];
        assert_eq!(function.dependencies[0].token, Token::class_like("App\\C"));
    }

    #[test]
    fn test_super_global_records_variable_and_dependency() {
        let reference = FileReferenceBuilder::new("index.php")
            .function("main", 1)
            .super_global("_SERVER", 2)
            .build();

        assert_eq!(reference.variables.len(), 1);
        assert_eq!(
            reference.functions[0].dependencies[0].kind,
            DependencyType::SuperGlobalVariable
        );
    }

    #[test]
    fn test_inherit_outside_class_is_ignored() {
        let reference = FileReferenceBuilder::new("x.php")
            .function("f", 1)
            .extends("Base", 1)
            .build();

        assert!(reference.class_likes.is_empty());
    }

    #[test]
    fn test_token_reference_filepath() {
        let reference = FileReferenceBuilder::new("src/a.php")
            .class_like("A", ClassLikeType::Class, 1)
            .build();
        let class = TokenReference::ClassLike(&reference.class_likes[0]);
        assert_eq!(class.filepath(), Some(Path::new("src/a.php")));

        let external = Token::class_like("Vendor\\X");
        let unresolved = TokenReference::Unresolved(&external);
        assert_eq!(unresolved.filepath(), None);
        assert_eq!(unresolved.class_like_token().map(|t| t.as_str()), Some("Vendor\\X"));
    }
}
