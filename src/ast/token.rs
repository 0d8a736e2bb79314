use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of a class-like unit (class, interface, trait).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLikeToken(String);

impl ClassLikeToken {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Name of a free function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionLikeToken(String);

impl FunctionLikeToken {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileToken(PathBuf);

impl FileToken {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// A process-wide variable such as `_SERVER` or `_ENV`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuperGlobalToken(String);

impl SuperGlobalToken {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Token {
    ClassLike(ClassLikeToken),
    FunctionLike(FunctionLikeToken),
    File(FileToken),
    SuperGlobal(SuperGlobalToken),
}

impl Token {
    pub fn class_like(name: impl Into<String>) -> Self {
        Token::ClassLike(ClassLikeToken::new(name))
    }

    pub fn function_like(name: impl Into<String>) -> Self {
        Token::FunctionLike(FunctionLikeToken::new(name))
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Token::File(FileToken::new(path))
    }

    pub fn super_global(name: impl Into<String>) -> Self {
        Token::SuperGlobal(SuperGlobalToken::new(name))
    }

    pub fn as_class_like(&self) -> Option<&ClassLikeToken> {
        match self {
            Token::ClassLike(token) => Some(token),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::ClassLike(t) => write!(f, "{}", t.as_str()),
            Token::FunctionLike(t) => write!(f, "{}()", t.as_str()),
            Token::File(t) => write!(f, "{}", t.path().display()),
            Token::SuperGlobal(t) => write!(f, "${}", t.as_str()),
        }
    }
}

impl From<ClassLikeToken> for Token {
    fn from(token: ClassLikeToken) -> Self {
        Token::ClassLike(token)
    }
}

impl From<FunctionLikeToken> for Token {
    fn from(token: FunctionLikeToken) -> Self {
        Token::FunctionLike(token)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileOccurrence {
    pub filepath: PathBuf,
    pub line: usize,
}

impl FileOccurrence {
    pub fn new(filepath: impl Into<PathBuf>, line: usize) -> Self {
        Self {
            filepath: filepath.into(),
            line,
        }
    }
}

impl fmt::Display for FileOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filepath.display(), self.line)
    }
}

/// The syntactic context a dependency was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyType {
    Use,
    Inherit,
    Returntype,
    Parameter,
    New,
    StaticProperty,
    StaticMethod,
    Instanceof,
    Catch,
    Variable,
    Throw,
    Const,
    AnonymousClassExtends,
    AnonymousClassImplements,
    AnonymousClassTrait,
    Attribute,
    SuperGlobalVariable,
    UnresolvedFunctionCall,
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DependencyType::Use => "use",
            DependencyType::Inherit => "inherit",
            DependencyType::Returntype => "returntype",
            DependencyType::Parameter => "parameter",
            DependencyType::New => "new",
            DependencyType::StaticProperty => "static_property",
            DependencyType::StaticMethod => "static_method",
            DependencyType::Instanceof => "instanceof",
            DependencyType::Catch => "catch",
            DependencyType::Variable => "variable",
            DependencyType::Throw => "throw",
            DependencyType::Const => "const",
            DependencyType::AnonymousClassExtends => "anonymous_class_extends",
            DependencyType::AnonymousClassImplements => "anonymous_class_implements",
            DependencyType::AnonymousClassTrait => "anonymous_class_trait",
            DependencyType::Attribute => "attribute",
            DependencyType::SuperGlobalVariable => "superglobal_variable",
            DependencyType::UnresolvedFunctionCall => "unresolved_function_call",
        };
        f.write_str(name)
    }
}

/// A usage of another code unit, recorded where it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyToken {
    pub token: Token,
    pub occurrence: FileOccurrence,
    pub kind: DependencyType,
}

impl DependencyToken {
    pub fn new(token: Token, occurrence: FileOccurrence, kind: DependencyType) -> Self {
        Self {
            token,
            occurrence,
            kind,
        }
    }

    /// Superglobal reads and unresolved calls have dedicated emitters.
    pub fn is_plain(&self) -> bool {
        !matches!(
            self.kind,
            DependencyType::SuperGlobalVariable | DependencyType::UnresolvedFunctionCall
        )
    }
}
