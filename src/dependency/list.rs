use crate::ast::{DependencyType, FileOccurrence, Token};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyOrigin {
    /// Emitted straight from the structural facts.
    Direct,
    /// Added by flattening, expanded from the edge `depender -> dependent`.
    Inherited { depender: Token, dependent: Token },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub depender: Token,
    pub dependent: Token,
    pub occurrence: FileOccurrence,
    pub kind: DependencyType,
    pub origin: DependencyOrigin,
}

impl Dependency {
    pub fn new(
        depender: Token,
        dependent: Token,
        occurrence: FileOccurrence,
        kind: DependencyType,
    ) -> Self {
        Self {
            depender,
            dependent,
            occurrence,
            kind,
            origin: DependencyOrigin::Direct,
        }
    }

    pub fn is_inherited(&self) -> bool {
        matches!(self.origin, DependencyOrigin::Inherited { .. })
    }

    pub fn pair(&self) -> (&Token, &Token) {
        (&self.depender, &self.dependent)
    }
}

/// Ordered, append-only edge collection.
///
/// Emitted edges are kept as-is, repeats included, since each carries its
/// own occurrence. Inherited edges are only added for pairs not yet present.
#[derive(Debug, Default, Clone)]
pub struct DependencyList {
    dependencies: Vec<Dependency>,
    pairs: HashSet<(Token, Token)>,
}

impl DependencyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, dependency: Dependency) {
        self.pairs
            .insert((dependency.depender.clone(), dependency.dependent.clone()));
        self.dependencies.push(dependency);
    }

    /// Returns false when the pair is already known.
    pub fn add_inherited(&mut self, dependency: Dependency) -> bool {
        let pair = (dependency.depender.clone(), dependency.dependent.clone());
        if !self.pairs.insert(pair) {
            return false;
        }
        self.dependencies.push(dependency);
        true
    }

    pub fn contains(&self, depender: &Token, dependent: &Token) -> bool {
        // HashSet<(Token, Token)> can't be probed with borrowed halves.
        self.pairs.contains(&(depender.clone(), dependent.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter()
    }

    pub fn direct(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| !d.is_inherited())
    }

    pub fn inherited(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.iter().filter(|d| d.is_inherited())
    }

    pub fn dependencies_of<'a>(
        &'a self,
        depender: &'a Token,
    ) -> impl Iterator<Item = &'a Dependency> {
        self.dependencies
            .iter()
            .filter(move |d| &d.depender == depender)
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn into_vec(self) -> Vec<Dependency> {
        self.dependencies
    }
}

impl<'a> IntoIterator for &'a DependencyList {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.dependencies.iter()
    }
}
