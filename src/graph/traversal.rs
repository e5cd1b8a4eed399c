use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::linking::*;

/// Any node of the reference model, by handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ModelNode {
    Repository,
    Solution(SolutionId),
    Project(ProjectId),
    File(FileId),
    Namespace(NamespaceId),
    Type(TypeId),
    Method(MethodId),
    Field(FieldId),
    Property(PropertyId),
    Parameter(ParameterId),
    LocalVariable(LocalVariableId),
}

/// Performs traversal operations on a linked reference model.
pub struct ModelTraverser<'a> {
    model: &'a ReferenceModel,
    /// Incoming call edges: callee to callers, in caller order.
    callers: HashMap<MethodId, Vec<MethodId>>,
}

impl<'a> ModelTraverser<'a> {
    /// Creates a new `ModelTraverser`, indexing incoming call edges.
    pub fn new(model: &'a ReferenceModel) -> Self {
        let mut callers: HashMap<MethodId, Vec<MethodId>> = HashMap::new();
        for method in model.methods() {
            for call in &method.calls {
                if let Some(target) = call.target {
                    let entry = callers.entry(target).or_default();
                    if !entry.contains(&method.id) {
                        entry.push(method.id);
                    }
                }
            }
        }
        Self { model, callers }
    }

    /// Returns the upward containment chain of a node, starting with the
    /// node itself and ending with the repository.
    ///
    /// Members go through their method, property or type; types through
    /// their enclosing types and namespaces; namespaces and files through
    /// their project. A project listed by several solutions is reached
    /// through the first one.
    pub fn path_to_root(&self, node: ModelNode) -> Vec<ModelNode> {
        let mut path = vec![node];
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Direct container of a node, `None` for the repository.
    pub fn parent(&self, node: ModelNode) -> Option<ModelNode> {
        let model = self.model;
        match node {
            ModelNode::Repository => None,
            ModelNode::Solution(_) => Some(ModelNode::Repository),
            ModelNode::Project(id) => Some(
                model
                    .project(id)
                    .solutions
                    .first()
                    .map_or(ModelNode::Repository, |&s| ModelNode::Solution(s)),
            ),
            ModelNode::File(id) => Some(ModelNode::Project(model.file(id).project)),
            ModelNode::Namespace(id) => {
                let namespace = model.namespace(id);
                Some(match namespace.parent {
                    Some(parent) => ModelNode::Namespace(parent),
                    None => ModelNode::Project(namespace.project),
                })
            }
            ModelNode::Type(id) => {
                let node = model.type_node(id);
                if let Some(outer) = node.containing_type {
                    return Some(ModelNode::Type(outer));
                }
                if let Some(namespace) = node.namespace {
                    return Some(ModelNode::Namespace(namespace));
                }
                // Synthetic types hang directly off the repository.
                Some(node.project.map_or(ModelNode::Repository, ModelNode::Project))
            }
            ModelNode::Method(id) => {
                let method = model.method(id);
                Some(if let Some(outer) = method.containing_method {
                    ModelNode::Method(outer)
                } else if let Some(property) = method.containing_property {
                    ModelNode::Property(property)
                } else {
                    ModelNode::Type(method.containing_type)
                })
            }
            ModelNode::Field(id) => Some(ModelNode::Type(model.field(id).containing_type)),
            ModelNode::Property(id) => Some(ModelNode::Type(model.property(id).containing_type)),
            ModelNode::Parameter(id) => Some(ModelNode::Method(model.parameter(id).containing_method)),
            ModelNode::LocalVariable(id) => {
                Some(ModelNode::Method(model.local_variable(id).containing_method))
            }
        }
    }

    /// Gets all methods the given method calls, up to `max_depth` levels,
    /// each paired with the depth it was first reached at.
    ///
    /// Follows resolved call edges breadth first; unresolved calls are skipped.
    pub fn callees(&self, method: MethodId, max_depth: usize) -> Vec<(MethodId, usize)> {
        self.bfs(method, max_depth, |m| {
            self.model
                .method(m)
                .calls
                .iter()
                .filter_map(|c| c.target)
                .collect()
        })
    }

    /// Gets all methods that call the given method, up to `max_depth` levels.
    pub fn callers(&self, method: MethodId, max_depth: usize) -> Vec<(MethodId, usize)> {
        self.bfs(method, max_depth, |m| {
            self.callers.get(&m).cloned().unwrap_or_default()
        })
    }

    /// Finds the shortest chain of calls leading from `from` to `to`.
    ///
    /// Returns `None` if `to` is not reachable. The path includes both ends.
    pub fn call_path(&self, from: MethodId, to: MethodId) -> Option<Vec<MethodId>> {
        if from == to {
            return Some(vec![from]);
        }

        let mut parent_map: HashMap<MethodId, MethodId> = HashMap::new();
        let mut visited: HashSet<MethodId> = HashSet::from([from]);
        let mut queue: VecDeque<MethodId> = VecDeque::from([from]);

        'search: while let Some(current) = queue.pop_front() {
            for callee in self.model.method(current).calls.iter().filter_map(|c| c.target) {
                if !visited.insert(callee) {
                    continue;
                }
                parent_map.insert(callee, current);
                if callee == to {
                    break 'search;
                }
                queue.push_back(callee);
            }
        }

        let mut path = vec![to];
        let mut current = to;
        while current != from {
            current = *parent_map.get(&current)?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// Base-type ancestry of a type, breadth first, nearest first.
    /// Generic parameter bases and cycles are ignored.
    pub fn ancestors(&self, type_id: TypeId) -> Vec<TypeId> {
        self.bfs(type_id, usize::MAX, |t| {
            self.model
                .type_node(t)
                .base_types
                .iter()
                .filter_map(|b| b.target)
                .collect()
        })
        .into_iter()
        .map(|(t, _)| t)
        .collect()
    }

    /// Types whose declared base types include `type_id`.
    pub fn derived_types(&self, type_id: TypeId) -> Vec<TypeId> {
        self.model
            .types()
            .iter()
            .filter(|t| t.base_types.iter().any(|b| b.target == Some(type_id)))
            .map(|t| t.id)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Breadth-first walk from `start`, excluding it from the result.
    fn bfs<T, F>(&self, start: T, max_depth: usize, neighbors: F) -> Vec<(T, usize)>
    where
        T: Copy + Eq + std::hash::Hash,
        F: Fn(T) -> Vec<T>,
    {
        let mut results = Vec::new();
        let mut visited: HashSet<T> = HashSet::from([start]);
        let mut queue: VecDeque<(T, usize)> = VecDeque::from([(start, 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for next in neighbors(current) {
                if visited.insert(next) {
                    results.push((next, depth + 1));
                    queue.push_back((next, depth + 1));
                }
            }
        }
        results
    }
}
