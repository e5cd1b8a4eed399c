use codelink::types::*;

#[test]
fn type_kind_as_str_roundtrip() {
    let kinds = vec![
        TypeKind::Class,
        TypeKind::Interface,
        TypeKind::Struct,
        TypeKind::Enum,
        TypeKind::Delegate,
        TypeKind::Record,
    ];

    for kind in kinds {
        let s = kind.as_str();
        let parsed =
            TypeKind::from_str(s).unwrap_or_else(|| panic!("failed to parse TypeKind from '{}'", s));
        assert_eq!(kind, parsed, "roundtrip failed for TypeKind::{}", s);
    }
}

#[test]
fn relation_kind_as_str_roundtrip() {
    let kinds = vec![
        RelationKind::Declarations,
        RelationKind::Parameters,
        RelationKind::ReturnValues,
        RelationKind::LocalVariables,
        RelationKind::Calls,
        RelationKind::Attributes,
        RelationKind::Inheritance,
        RelationKind::Other,
    ];

    for kind in kinds {
        let s = kind.as_str();
        let parsed = RelationKind::from_str(s)
            .unwrap_or_else(|| panic!("failed to parse RelationKind from '{}'", s));
        assert_eq!(kind, parsed, "roundtrip failed for RelationKind::{}", s);
    }
}

#[test]
fn kind_from_str_unknown_returns_none() {
    assert!(TypeKind::from_str("module").is_none());
    assert!(RelationKind::from_str("").is_none());
}

#[test]
fn type_full_name_includes_namespace_and_outer_types() {
    let plain = TypeFact::class("App.Models", "User");
    assert_eq!(plain.full_name("."), "App.Models.User");

    let nested = TypeFact::class("App.Models", "Address").nested_in("User");
    assert_eq!(nested.relative_name("."), "User.Address");
    assert_eq!(nested.full_name("."), "App.Models.User.Address");

    let global = TypeFact::class("", "Program");
    assert_eq!(global.full_name("."), "Program");
}

#[test]
fn type_full_name_trims_namespace_padding() {
    let padded = TypeFact::class("  App.Models ", "User");
    assert_eq!(padded.full_name("."), "App.Models.User");
}

#[test]
fn generic_declaration_name_drops_parameters() {
    let mut fact = TypeFact::class("Collections", "Box<T>");
    fact.generic_parameters = vec!["T".to_string()];
    assert_eq!(fact.full_name("."), "Collections.Box");
}

#[test]
fn type_ref_full_name_renders_structured_arguments() {
    let type_ref = TypeRef::generic(
        "Dictionary",
        vec![TypeRef::named("string"), TypeRef::generic("List", vec![TypeRef::named("User")])],
    );
    assert_eq!(type_ref.full_name(), "Dictionary<string, List<User>>");
    assert_eq!(TypeRef::named("int").full_name(), "int");
}

#[test]
fn join_name_skips_empty_parts() {
    assert_eq!(join_name("", "Foo", "."), "Foo");
    assert_eq!(join_name("A.B", "", "."), "A.B");
    assert_eq!(join_name("A", "Foo", "::"), "A::Foo");
}

#[test]
fn fact_model_deserializes_with_defaults() {
    let json = r#"{
        "path": "repo",
        "solutions": [{
            "path": "App.sln",
            "projects": [{
                "path": "App/App.csproj",
                "compilation_units": [{
                    "path": "App/Program.cs",
                    "imports": [{ "source_name": "System" }],
                    "types": [{ "name": "Program", "namespace": "App", "kind": "struct" }]
                }]
            }]
        }]
    }"#;

    let repo: RepositoryFact = serde_json::from_str(json).unwrap();
    assert!(!repo.is_empty());
    let project = repo.projects().next().unwrap();
    assert!(project.project_references.is_empty());
    let unit = &project.compilation_units[0];
    assert_eq!(unit.imports[0].kind, ImportKind::Plain);
    assert_eq!(unit.types[0].kind, TypeKind::Struct);
    assert!(!unit.types[0].is_partial);
}

#[test]
fn repository_without_units_is_empty() {
    let repo = RepositoryFact {
        path: "repo".to_string(),
        solutions: vec![SolutionFact {
            path: "App.sln".to_string(),
            projects: vec![ProjectFact {
                path: "App/App.csproj".to_string(),
                ..Default::default()
            }],
        }],
    };
    assert!(repo.is_empty());
    assert!(RepositoryFact::default().is_empty());
}
