use super::reference::{
    AstInherit, ClassLikeReference, FileReference, FunctionLikeReference, TokenReference,
};
use super::token::{ClassLikeToken, FunctionLikeToken, SuperGlobalToken, Token};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Location of a declaration inside the file list.
#[derive(Debug, Clone, Copy)]
struct Slot {
    file: usize,
    item: usize,
}

/// The last occurrence of a name wins.
fn duplicate(kind: &str, name: &str, kept: &Path) {
    tracing::debug!(
        "{} {} seen more than once, keeping {}",
        kind,
        name,
        kept.display()
    );
}

/// Union of all file references for one run. Read-only once built.
#[derive(Debug, Default)]
pub struct AstMap {
    files: Vec<FileReference>,
    file_index: HashMap<PathBuf, usize>,
    class_likes: HashMap<ClassLikeToken, Slot>,
    functions: HashMap<FunctionLikeToken, Slot>,
    variables: HashMap<SuperGlobalToken, Slot>,
}

impl AstMap {
    pub fn new(files: Vec<FileReference>) -> Self {
        let mut map = Self {
            files,
            ..Default::default()
        };

        for (file_idx, file) in map.files.iter().enumerate() {
            map.file_index.insert(file.filepath.clone(), file_idx);

            for (item, class) in file.class_likes.iter().enumerate() {
                let slot = Slot { file: file_idx, item };
                if map.class_likes.insert(class.token.clone(), slot).is_some() {
                    duplicate("class-like", class.token.as_str(), &file.filepath);
                }
            }

            for (item, function) in file.functions.iter().enumerate() {
                let slot = Slot { file: file_idx, item };
                if map.functions.insert(function.token.clone(), slot).is_some() {
                    duplicate("function", function.token.as_str(), &file.filepath);
                }
            }

            for (item, variable) in file.variables.iter().enumerate() {
                let slot = Slot { file: file_idx, item };
                if map.variables.insert(variable.token.clone(), slot).is_some() {
                    duplicate("superglobal", variable.token.as_str(), &file.filepath);
                }
            }
        }

        map
    }

    pub fn files(&self) -> impl Iterator<Item = &FileReference> {
        self.files.iter()
    }

    /// Class-likes in file order, then declaration order.
    pub fn class_likes(&self) -> impl Iterator<Item = &ClassLikeReference> {
        self.files.iter().flat_map(|f| f.class_likes.iter())
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionLikeReference> {
        self.files.iter().flat_map(|f| f.functions.iter())
    }

    pub fn file(&self, path: &Path) -> Option<&FileReference> {
        self.file_index.get(path).map(|&idx| &self.files[idx])
    }

    pub fn class_like(&self, token: &ClassLikeToken) -> Option<&ClassLikeReference> {
        self.class_likes
            .get(token)
            .map(|slot| &self.files[slot.file].class_likes[slot.item])
    }

    pub fn function_like(&self, token: &FunctionLikeToken) -> Option<&FunctionLikeReference> {
        self.functions
            .get(token)
            .map(|slot| &self.files[slot.file].functions[slot.item])
    }

    pub fn has_function(&self, token: &FunctionLikeToken) -> bool {
        self.functions.contains_key(token)
    }

    pub fn reference<'a>(&'a self, token: &'a Token) -> TokenReference<'a> {
        let resolved = match token {
            Token::ClassLike(t) => self.class_like(t).map(TokenReference::ClassLike),
            Token::FunctionLike(t) => self.function_like(t).map(TokenReference::FunctionLike),
            Token::File(t) => self.file(t.path()).map(TokenReference::File),
            Token::SuperGlobal(t) => self
                .variables
                .get(t)
                .map(|slot| TokenReference::Variable(&self.files[slot.file].variables[slot.item])),
        };
        resolved.unwrap_or(TokenReference::Unresolved(token))
    }

    /// All inherits of `token`, direct ones first, transitive ones with the
    /// chain that led to them. Each class-like is expanded at most once, so
    /// cyclic hierarchies terminate.
    pub fn class_inherits(&self, token: &ClassLikeToken) -> Vec<AstInherit> {
        let mut result = Vec::new();
        let mut expanded: HashSet<&ClassLikeToken> = HashSet::new();
        expanded.insert(token);

        let Some(root) = self.class_like(token) else {
            return result;
        };

        // (inherit, path leading to it)
        let mut queue: std::collections::VecDeque<(&AstInherit, Vec<AstInherit>)> =
            root.inherits.iter().map(|i| (i, Vec::new())).collect();

        while let Some((inherit, path)) = queue.pop_front() {
            result.push(inherit.clone().with_path(path.clone()));

            if !expanded.insert(&inherit.class_like) {
                continue;
            }

            if let Some(parent) = self.class_like(&inherit.class_like) {
                let mut next_path = path;
                next_path.push(inherit.clone());
                for grand in &parent.inherits {
                    queue.push_back((grand, next_path.clone()));
                }
            }
        }

        result
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
