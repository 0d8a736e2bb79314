use super::{Dependency, DependencyList, DependencyOrigin};
use crate::ast::{AstMap, ClassLikeToken, InheritType, Token};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use std::collections::HashMap;
use tracing::debug;

/// Subtype to supertype edges of the analysed class-likes.
struct InheritanceGraph {
    graph: DiGraph<ClassLikeToken, InheritType>,
    node_indices: HashMap<ClassLikeToken, NodeIndex>,
}

impl InheritanceGraph {
    fn build(ast_map: &AstMap, kinds: &[InheritType]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices: HashMap<ClassLikeToken, NodeIndex> = HashMap::new();

        let mut node = |graph: &mut DiGraph<ClassLikeToken, InheritType>, token: &ClassLikeToken| {
            *node_indices
                .entry(token.clone())
                .or_insert_with(|| graph.add_node(token.clone()))
        };

        for class in ast_map.class_likes() {
            let from = node(&mut graph, &class.token);
            for inherit in class.inherits.iter().filter(|i| kinds.contains(&i.kind)) {
                let to = node(&mut graph, &inherit.class_like);
                graph.add_edge(from, to, inherit.kind);
            }
        }

        Self {
            graph,
            node_indices,
        }
    }

    /// Transitive supertypes, nearest first. Each node is visited once, so
    /// cycles terminate and never yield the start node.
    fn ancestors(&self, token: &ClassLikeToken) -> Vec<ClassLikeToken> {
        let Some(&start) = self.node_indices.get(token) else {
            return Vec::new();
        };

        let mut bfs = Bfs::new(&self.graph, start);
        let mut ancestors = Vec::new();
        while let Some(idx) = bfs.next(&self.graph) {
            if idx != start {
                ancestors.push(self.graph[idx].clone());
            }
        }
        ancestors
    }
}

/// Expands emitted edges along inheritance.
///
/// For a raw edge `D -> T`, every pair drawn from `D` and its ancestors on
/// one side and `T` and its ancestors on the other is recorded, except the
/// raw pair and self pairs. Pairs already in the list are skipped, so a
/// second pass adds nothing.
#[derive(Debug, Clone)]
pub struct InheritanceFlattener {
    inherit_types: Vec<InheritType>,
}

impl InheritanceFlattener {
    pub fn new() -> Self {
        Self {
            inherit_types: vec![InheritType::Extends],
        }
    }

    /// Choose which inherit kinds count as ancestry.
    pub fn with_inherit_types(mut self, inherit_types: Vec<InheritType>) -> Self {
        self.inherit_types = inherit_types;
        self
    }

    pub fn inherit_types(&self) -> &[InheritType] {
        &self.inherit_types
    }

    /// Returns the number of inherited edges added.
    pub fn flatten_dependencies(
        &self,
        ast_map: &AstMap,
        dependencies: &mut DependencyList,
    ) -> usize {
        let graph = InheritanceGraph::build(ast_map, &self.inherit_types);
        let mut ancestors: HashMap<ClassLikeToken, Vec<Token>> = HashMap::new();
        let mut lineage = |token: &Token| -> Vec<Token> {
            let mut tokens = vec![token.clone()];
            if let Token::ClassLike(class) = token {
                let found = ancestors.entry(class.clone()).or_insert_with(|| {
                    graph
                        .ancestors(class)
                        .into_iter()
                        .map(Token::ClassLike)
                        .collect()
                });
                tokens.extend(found.iter().cloned());
            }
            tokens
        };

        let raw: Vec<Dependency> = dependencies.direct().cloned().collect();
        let mut added = 0;

        for edge in &raw {
            let dependers = lineage(&edge.depender);
            let dependents = lineage(&edge.dependent);
            if dependers.len() == 1 && dependents.len() == 1 {
                continue;
            }

            for depender in &dependers {
                for dependent in &dependents {
                    if depender == dependent
                        || (depender == &edge.depender && dependent == &edge.dependent)
                    {
                        continue;
                    }
                    let inherited = Dependency {
                        depender: depender.clone(),
                        dependent: dependent.clone(),
                        occurrence: edge.occurrence.clone(),
                        kind: edge.kind,
                        origin: DependencyOrigin::Inherited {
                            depender: edge.depender.clone(),
                            dependent: edge.dependent.clone(),
                        },
                    };
                    if dependencies.add_inherited(inherited) {
                        added += 1;
                    }
                }
            }
        }

        debug!(raw = raw.len(), added, "flattened dependencies");
        added
    }
}

impl Default for InheritanceFlattener {
    fn default() -> Self {
        Self::new()
    }
}
