//! Structural facts: what an external parser reports about each file, and
//! the aggregate map the rest of the engine reads.

mod map;
mod parser;
mod reference;
mod token;

pub use map::AstMap;
pub use parser::{FileParser, ParseError, ParserRegistry};
pub use reference::{
    AstInherit, ClassLikeReference, ClassLikeType, FileReference, FileReferenceBuilder,
    FunctionLikeReference, InheritType, TokenReference, VariableReference,
};
pub use token::{
    ClassLikeToken, DependencyToken, DependencyType, FileOccurrence, FileToken, FunctionLikeToken,
    SuperGlobalToken, Token,
};
