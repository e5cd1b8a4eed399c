//! The reference model: an arena of linked nodes.
//!
//! Nodes refer to each other only through the `u32` handles defined here.
//! Upward links (member to type, type to file, file to project) and downward
//! lists (project to files, type to members) are plain handle fields.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{RelationKind, TypeKind};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

handle!(SolutionId);
handle!(ProjectId);
handle!(FileId);
handle!(NamespaceId);
handle!(
    /// Handle of a declared, merged or synthetic type.
    TypeId
);
handle!(
    /// Handle of a method, constructor, destructor, accessor or local function.
    MethodId
);
handle!(FieldId);
handle!(PropertyId);
handle!(ParameterId);
handle!(LocalVariableId);

/// Kinds of method nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    Method,
    Constructor,
    Destructor,
    Accessor,
    LocalFunction,
}

/// A linked type reference.
///
/// `name` is the resolved full name as written (with generic arguments and
/// suffixes); `target` is the node of its base type. `target` is `None` for
/// generic parameters in scope, and for parameters of synthesized methods
/// whose type is referenced nowhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeLink {
    pub name: String,
    pub target: Option<TypeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_arguments: Vec<TypeLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeLink {
    pub type_link: TypeLink,
    pub target: Option<String>,
}

/// One call site. `target` is `None` when no overload matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    pub target: Option<MethodId>,
}

/// Counted dependency of one type on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEdge {
    pub relation: RelationKind,
    pub target: TypeId,
    pub count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryNode {
    pub path: String,
    pub solutions: Vec<SolutionId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionNode {
    pub id: SolutionId,
    pub path: String,
    pub projects: Vec<ProjectId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectNode {
    pub id: ProjectId,
    pub path: String,
    pub name: String,
    /// Solutions listing this project.
    pub solutions: Vec<SolutionId>,
    pub references: Vec<ProjectId>,
    pub files: Vec<FileId>,
    /// Outermost namespaces declared in this project.
    pub namespaces: Vec<NamespaceId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    pub id: FileId,
    pub path: String,
    pub project: ProjectId,
    /// `types[i]` is the merged type of the i-th named declaration in this file.
    pub types: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceNode {
    pub id: NamespaceId,
    pub name: String,
    pub full_name: String,
    pub project: ProjectId,
    pub parent: Option<NamespaceId>,
    pub children: Vec<NamespaceId>,
    /// Outermost types only; nested types hang off their enclosing type.
    pub types: Vec<TypeId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeNode {
    pub id: TypeId,
    pub name: String,
    pub full_name: String,
    pub kind: TypeKind,
    /// `None` for synthetic external types.
    pub project: Option<ProjectId>,
    pub namespace: Option<NamespaceId>,
    /// Files declaring a fragment of this type, in discovery order.
    pub files: Vec<FileId>,
    pub is_partial: bool,
    pub is_external: bool,
    pub access_modifier: String,
    pub modifier: String,
    pub containing_type: Option<TypeId>,
    pub nested_types: Vec<TypeId>,
    pub generic_parameters: Vec<String>,
    pub base_types: Vec<TypeLink>,
    pub fields: Vec<FieldId>,
    pub properties: Vec<PropertyId>,
    pub methods: Vec<MethodId>,
    pub constructors: Vec<MethodId>,
    pub destructor: Option<MethodId>,
    pub attributes: Vec<AttributeLink>,
    pub relations: Vec<RelationEdge>,
}

impl TypeNode {
    pub(crate) fn new(id: TypeId, name: &str, full_name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            full_name: full_name.to_string(),
            kind: TypeKind::Class,
            project: None,
            namespace: None,
            files: Vec::new(),
            is_partial: false,
            is_external: false,
            access_modifier: String::new(),
            modifier: String::new(),
            containing_type: None,
            nested_types: Vec::new(),
            generic_parameters: Vec::new(),
            base_types: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            destructor: None,
            attributes: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Methods, constructors and the destructor, in that order.
    pub fn all_methods(&self) -> impl Iterator<Item = MethodId> + '_ {
        self.methods
            .iter()
            .chain(self.constructors.iter())
            .chain(self.destructor.iter())
            .copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodNode {
    pub id: MethodId,
    pub name: String,
    pub kind: MethodKind,
    pub containing_type: TypeId,
    /// Set for local functions.
    pub containing_method: Option<MethodId>,
    /// Set for property accessors.
    pub containing_property: Option<PropertyId>,
    pub access_modifier: String,
    pub modifier: String,
    pub generic_parameters: Vec<String>,
    pub return_type: Option<TypeLink>,
    pub parameters: Vec<ParameterId>,
    pub local_variables: Vec<LocalVariableId>,
    pub local_functions: Vec<MethodId>,
    pub calls: Vec<CallEdge>,
    pub attributes: Vec<AttributeLink>,
    pub cyclomatic_complexity: u32,
    /// Created for a call into an external type.
    pub is_synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    pub id: FieldId,
    pub name: String,
    pub type_link: TypeLink,
    pub containing_type: TypeId,
    pub access_modifier: String,
    pub modifier: String,
    pub is_event: bool,
    pub attributes: Vec<AttributeLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyNode {
    pub id: PropertyId,
    pub name: String,
    pub type_link: TypeLink,
    pub containing_type: TypeId,
    pub access_modifier: String,
    pub modifier: String,
    pub accessors: Vec<MethodId>,
    pub attributes: Vec<AttributeLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterNode {
    pub id: ParameterId,
    pub name: String,
    pub type_link: TypeLink,
    pub containing_method: MethodId,
    pub modifier: String,
    pub default_value: Option<String>,
    pub attributes: Vec<AttributeLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVariableNode {
    pub id: LocalVariableId,
    pub name: String,
    pub type_link: TypeLink,
    pub containing_method: MethodId,
}

/// The fully linked program graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceModel {
    pub(crate) repository: RepositoryNode,
    pub(crate) solutions: Vec<SolutionNode>,
    pub(crate) projects: Vec<ProjectNode>,
    pub(crate) files: Vec<FileNode>,
    pub(crate) namespaces: Vec<NamespaceNode>,
    pub(crate) types: Vec<TypeNode>,
    pub(crate) methods: Vec<MethodNode>,
    pub(crate) fields: Vec<FieldNode>,
    pub(crate) properties: Vec<PropertyNode>,
    pub(crate) parameters: Vec<ParameterNode>,
    pub(crate) local_variables: Vec<LocalVariableNode>,
    pub(crate) created_classes: Vec<TypeId>,
}

impl ReferenceModel {
    pub fn repository(&self) -> &RepositoryNode {
        &self.repository
    }

    pub fn solution(&self, id: SolutionId) -> &SolutionNode {
        &self.solutions[id.index()]
    }

    pub fn project(&self, id: ProjectId) -> &ProjectNode {
        &self.projects[id.index()]
    }

    pub fn file(&self, id: FileId) -> &FileNode {
        &self.files[id.index()]
    }

    pub fn namespace(&self, id: NamespaceId) -> &NamespaceNode {
        &self.namespaces[id.index()]
    }

    pub fn type_node(&self, id: TypeId) -> &TypeNode {
        &self.types[id.index()]
    }

    pub fn method(&self, id: MethodId) -> &MethodNode {
        &self.methods[id.index()]
    }

    pub fn field(&self, id: FieldId) -> &FieldNode {
        &self.fields[id.index()]
    }

    pub fn property(&self, id: PropertyId) -> &PropertyNode {
        &self.properties[id.index()]
    }

    pub fn parameter(&self, id: ParameterId) -> &ParameterNode {
        &self.parameters[id.index()]
    }

    pub fn local_variable(&self, id: LocalVariableId) -> &LocalVariableNode {
        &self.local_variables[id.index()]
    }

    pub fn solutions(&self) -> &[SolutionNode] {
        &self.solutions
    }

    pub fn projects(&self) -> &[ProjectNode] {
        &self.projects
    }

    pub fn files(&self) -> &[FileNode] {
        &self.files
    }

    pub fn namespaces(&self) -> &[NamespaceNode] {
        &self.namespaces
    }

    pub fn types(&self) -> &[TypeNode] {
        &self.types
    }

    pub fn methods(&self) -> &[MethodNode] {
        &self.methods
    }

    /// Synthetic types created for names never declared in the repository,
    /// in creation order.
    pub fn created_classes(&self) -> &[TypeId] {
        &self.created_classes
    }

    /// Returns `true` if the model holds no files at all.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// First type with the given full name, declared types before synthetic ones.
    pub fn find_type(&self, full_name: &str) -> Option<TypeId> {
        let mut matches = self.types.iter().filter(|t| t.full_name == full_name);
        let first = matches.next()?;
        if !first.is_external {
            return Some(first.id);
        }
        Some(matches.find(|t| !t.is_external).map_or(first.id, |t| t.id))
    }

    /// Methods of a type (including constructors and destructor) with the given name.
    pub fn methods_named(&self, type_id: TypeId, name: &str) -> Vec<MethodId> {
        self.type_node(type_id)
            .all_methods()
            .filter(|&m| self.method(m).name == name)
            .collect()
    }

    /// Parameter type names of a method, in order.
    pub fn parameter_types(&self, method: MethodId) -> Vec<&str> {
        self.method(method)
            .parameters
            .iter()
            .map(|&p| self.parameter(p).type_link.name.as_str())
            .collect()
    }

    /// SHA-256 over the JSON serialization of the whole model.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        hex::encode(hasher.finalize())
    }
}
