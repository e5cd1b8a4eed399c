//! The fact model: the name-based input produced by a syntax front-end.
//!
//! Every cross-entity reference in here is a plain string. Nothing points at
//! anything else; the [`crate::linking`] pass is what turns these names into
//! handles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kinds of type declarations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
    Record,
}

#[allow(clippy::should_implement_trait)]
impl TypeKind {
    /// Returns the string representation of this type kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
            TypeKind::Delegate => "delegate",
            TypeKind::Record => "record",
        }
    }

    /// Parses a string into a `TypeKind`, returning `None` for unrecognized values.
    pub fn from_str(s: &str) -> Option<TypeKind> {
        match s {
            "class" => Some(TypeKind::Class),
            "interface" => Some(TypeKind::Interface),
            "struct" => Some(TypeKind::Struct),
            "enum" => Some(TypeKind::Enum),
            "delegate" => Some(TypeKind::Delegate),
            "record" => Some(TypeKind::Record),
            _ => None,
        }
    }
}

/// Kinds of import directives in a compilation unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// Brings every type of a namespace into scope.
    #[default]
    Plain,
    /// `Alias = Some.Namespace`
    NamespaceAlias,
    /// `Alias = Some.Namespace.Type<Args>`
    TypeAlias,
    /// Brings the static members of a type into scope.
    StaticMember,
}

/// Kinds of type-to-type relations counted by dependency metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Declarations,
    Parameters,
    ReturnValues,
    LocalVariables,
    Calls,
    Attributes,
    Inheritance,
    Other,
}

#[allow(clippy::should_implement_trait)]
impl RelationKind {
    /// Returns the string representation of this relation kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Declarations => "declarations",
            RelationKind::Parameters => "parameters",
            RelationKind::ReturnValues => "return_values",
            RelationKind::LocalVariables => "local_variables",
            RelationKind::Calls => "calls",
            RelationKind::Attributes => "attributes",
            RelationKind::Inheritance => "inheritance",
            RelationKind::Other => "other",
        }
    }

    /// Parses a string into a `RelationKind`, returning `None` for unrecognized values.
    pub fn from_str(s: &str) -> Option<RelationKind> {
        match s {
            "declarations" => Some(RelationKind::Declarations),
            "parameters" => Some(RelationKind::Parameters),
            "return_values" => Some(RelationKind::ReturnValues),
            "local_variables" => Some(RelationKind::LocalVariables),
            "calls" => Some(RelationKind::Calls),
            "attributes" => Some(RelationKind::Attributes),
            "inheritance" => Some(RelationKind::Inheritance),
            "other" => Some(RelationKind::Other),
            _ => None,
        }
    }
}

/// A reference to a type by name.
///
/// `name` may already carry generic arguments (`Map<K, V>`), array ranks
/// (`T[]`) or a nullable marker (`T?`); `generic_arguments` is the
/// structured alternative a front-end may fill instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generic_arguments: Vec<TypeRef>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generic_arguments: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            generic_arguments: args,
        }
    }

    /// Renders the reference as a single name string, appending the
    /// structured generic arguments when present.
    pub fn full_name(&self) -> String {
        if self.generic_arguments.is_empty() {
            return self.name.clone();
        }
        let args: Vec<String> = self.generic_arguments.iter().map(|a| a.full_name()).collect();
        format!("{}<{}>", self.name, args.join(", "))
    }
}

/// One import directive of a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFact {
    #[serde(default)]
    pub kind: ImportKind,
    pub source_name: String,
    #[serde(default)]
    pub alias_name: Option<String>,
}

impl ImportFact {
    pub fn plain(namespace: impl Into<String>) -> Self {
        Self {
            kind: ImportKind::Plain,
            source_name: namespace.into(),
            alias_name: None,
        }
    }

    pub fn namespace_alias(alias: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            kind: ImportKind::NamespaceAlias,
            source_name: namespace.into(),
            alias_name: Some(alias.into()),
        }
    }

    pub fn type_alias(alias: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            kind: ImportKind::TypeAlias,
            source_name: target.into(),
            alias_name: Some(alias.into()),
        }
    }

    pub fn static_member(type_name: impl Into<String>) -> Self {
        Self {
            kind: ImportKind::StaticMember,
            source_name: type_name.into(),
            alias_name: None,
        }
    }
}

/// An attribute (annotation) applied to a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFact {
    pub type_ref: TypeRef,
    #[serde(default)]
    pub target: Option<String>,
}

/// A call site recorded by the front-end: owner type name, method name and
/// the ordered parameter types of the invoked overload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFact {
    #[serde(default)]
    pub containing_type: String,
    pub name: String,
    #[serde(default)]
    pub parameter_types: Vec<TypeRef>,
}

impl CallFact {
    pub fn new(containing_type: impl Into<String>, name: impl Into<String>, params: &[&str]) -> Self {
        Self {
            containing_type: containing_type.into(),
            name: name.into(),
            parameter_types: params.iter().map(|p| TypeRef::named(*p)).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterFact {
    #[serde(default)]
    pub name: String,
    pub type_ref: TypeRef,
    #[serde(default)]
    pub modifier: String,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeFact>,
}

impl ParameterFact {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: TypeRef::named(type_name),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalVariableFact {
    #[serde(default)]
    pub name: String,
    pub type_ref: TypeRef,
}

/// A method, constructor, destructor, accessor or local function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodFact {
    pub name: String,
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    #[serde(default)]
    pub access_modifier: String,
    #[serde(default)]
    pub modifier: String,
    #[serde(default)]
    pub generic_parameters: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterFact>,
    #[serde(default)]
    pub local_variables: Vec<LocalVariableFact>,
    #[serde(default)]
    pub local_functions: Vec<MethodFact>,
    #[serde(default)]
    pub called_methods: Vec<CallFact>,
    #[serde(default)]
    pub attributes: Vec<AttributeFact>,
    #[serde(default)]
    pub cyclomatic_complexity: u32,
}

impl MethodFact {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_parameters(mut self, params: &[&str]) -> Self {
        self.parameters = params
            .iter()
            .enumerate()
            .map(|(i, p)| ParameterFact::new(format!("arg{i}"), *p))
            .collect();
        self
    }

    pub fn with_return_type(mut self, type_name: impl Into<String>) -> Self {
        self.return_type = Some(TypeRef::named(type_name));
        self
    }

    pub fn with_call(mut self, call: CallFact) -> Self {
        self.called_methods.push(call);
        self
    }

    pub fn with_complexity(mut self, complexity: u32) -> Self {
        self.cyclomatic_complexity = complexity;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFact {
    pub name: String,
    pub type_ref: TypeRef,
    #[serde(default)]
    pub access_modifier: String,
    #[serde(default)]
    pub modifier: String,
    #[serde(default)]
    pub is_event: bool,
    #[serde(default)]
    pub attributes: Vec<AttributeFact>,
}

impl FieldFact {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: TypeRef::named(type_name),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFact {
    pub name: String,
    pub type_ref: TypeRef,
    #[serde(default)]
    pub access_modifier: String,
    #[serde(default)]
    pub modifier: String,
    #[serde(default)]
    pub accessors: Vec<MethodFact>,
    #[serde(default)]
    pub attributes: Vec<AttributeFact>,
}

/// Counted references from one type to other types, keyed by type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyMetric {
    pub relation: RelationKind,
    #[serde(default)]
    pub counts: BTreeMap<String, u32>,
}

/// A type declaration. Several declarations with the same full name and
/// `is_partial` set are fragments of one logical type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeFact {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub namespace: String,
    /// Dotted path of the enclosing types within the namespace, for nested types.
    #[serde(default)]
    pub containing_type: Option<String>,
    #[serde(default)]
    pub is_partial: bool,
    #[serde(default)]
    pub access_modifier: String,
    #[serde(default)]
    pub modifier: String,
    #[serde(default)]
    pub generic_parameters: Vec<String>,
    #[serde(default)]
    pub base_types: Vec<TypeRef>,
    #[serde(default)]
    pub fields: Vec<FieldFact>,
    #[serde(default)]
    pub properties: Vec<PropertyFact>,
    #[serde(default)]
    pub methods: Vec<MethodFact>,
    #[serde(default)]
    pub constructors: Vec<MethodFact>,
    #[serde(default)]
    pub destructor: Option<MethodFact>,
    #[serde(default)]
    pub attributes: Vec<AttributeFact>,
    #[serde(default)]
    pub metrics: Vec<DependencyMetric>,
}

impl TypeFact {
    pub fn class(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn partial(mut self) -> Self {
        self.is_partial = true;
        self
    }

    pub fn nested_in(mut self, containing_type: impl Into<String>) -> Self {
        self.containing_type = Some(containing_type.into());
        self
    }

    pub fn with_base(mut self, type_name: impl Into<String>) -> Self {
        self.base_types.push(TypeRef::named(type_name));
        self
    }

    pub fn with_field(mut self, field: FieldFact) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: MethodFact) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_metric(mut self, relation: RelationKind, counts: &[(&str, u32)]) -> Self {
        self.metrics.push(DependencyMetric {
            relation,
            counts: counts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        });
        self
    }

    /// Name of the type relative to its namespace (`Outer.Inner` for nested types).
    pub fn relative_name(&self, separator: &str) -> String {
        // Generic parameters are carried separately; `Box<T>` declares `Box`.
        let name = self.name.split('<').next().unwrap_or_default().trim();
        match self.containing_type.as_deref() {
            Some(outer) if !outer.is_empty() => format!("{outer}{separator}{name}"),
            _ => name.to_string(),
        }
    }

    /// Fully-qualified name: namespace, enclosing types, then the type name.
    pub fn full_name(&self, separator: &str) -> String {
        join_name(self.namespace.trim(), &self.relative_name(separator), separator)
    }
}

/// A source file with its import directives and type declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationUnitFact {
    pub path: String,
    #[serde(default)]
    pub imports: Vec<ImportFact>,
    #[serde(default)]
    pub types: Vec<TypeFact>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFact {
    pub path: String,
    #[serde(default)]
    pub name: String,
    /// Paths of the projects this project references.
    #[serde(default)]
    pub project_references: Vec<String>,
    #[serde(default)]
    pub compilation_units: Vec<CompilationUnitFact>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionFact {
    pub path: String,
    #[serde(default)]
    pub projects: Vec<ProjectFact>,
}

/// Root of the fact model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryFact {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub solutions: Vec<SolutionFact>,
}

impl RepositoryFact {
    /// Iterates over every project of every solution, in declaration order.
    pub fn projects(&self) -> impl Iterator<Item = &ProjectFact> {
        self.solutions.iter().flat_map(|s| s.projects.iter())
    }

    /// Returns `true` if the model declares no compilation units at all.
    pub fn is_empty(&self) -> bool {
        self.projects().all(|p| p.compilation_units.is_empty())
    }
}

/// Joins a prefix and a name with the separator, skipping an empty prefix.
pub fn join_name(prefix: &str, name: &str, separator: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix}{separator}{name}")
    }
}
