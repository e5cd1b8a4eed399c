//! Reference linking: turns a name-resolved fact model into an arena of
//! nodes connected by handles.
mod linker;
mod model;
mod registry;

pub use linker::ReferenceLinker;
pub use model::{
    AttributeLink, CallEdge, FieldId, FieldNode, FileId, FileNode, LocalVariableId, LocalVariableNode,
    MethodId, MethodKind, MethodNode, NamespaceId, NamespaceNode, ParameterId, ParameterNode, ProjectId,
    ProjectNode, PropertyId, PropertyNode, ReferenceModel, RelationEdge, RepositoryNode, SolutionId,
    SolutionNode, TypeId, TypeLink, TypeNode,
};
