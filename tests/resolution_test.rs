use codelink::config::FallbackPolicy;
use codelink::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use codelink::resolution::*;
use codelink::scope::ScopeIndex;
use codelink::types::*;

fn unit(path: &str, imports: Vec<ImportFact>, types: Vec<TypeFact>) -> CompilationUnitFact {
    CompilationUnitFact {
        path: path.to_string(),
        imports,
        types,
    }
}

fn project(path: &str, references: &[&str], units: Vec<CompilationUnitFact>) -> ProjectFact {
    ProjectFact {
        path: path.to_string(),
        name: path.to_string(),
        project_references: references.iter().map(|r| r.to_string()).collect(),
        compilation_units: units,
    }
}

fn repository(projects: Vec<ProjectFact>) -> RepositoryFact {
    RepositoryFact {
        path: "repo".to_string(),
        solutions: vec![SolutionFact {
            path: "All.sln".to_string(),
            projects,
        }],
    }
}

fn resolve_with(repo: &RepositoryFact, policy: FallbackPolicy, parallel: bool) -> (RepositoryFact, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let index = ScopeIndex::build(repo, ".", &mut diagnostics);
    let resolver = NameResolver::new(&index, policy);
    let resolved = resolver.resolve_repository(repo, parallel, &mut diagnostics);
    (resolved, diagnostics)
}

fn resolve(repo: &RepositoryFact) -> (RepositoryFact, Diagnostics) {
    resolve_with(repo, FallbackPolicy::default(), false)
}

/// Finds the first declaration named `name` anywhere in the repository.
fn find_type<'a>(repo: &'a RepositoryFact, name: &str) -> &'a TypeFact {
    repo.projects()
        .flat_map(|p| p.compilation_units.iter())
        .flat_map(|u| u.types.iter())
        .find(|t| t.name == name)
        .unwrap_or_else(|| panic!("type '{}' not found", name))
}

fn field_type<'a>(type_fact: &'a TypeFact, field: &str) -> &'a str {
    type_fact
        .fields
        .iter()
        .find(|f| f.name == field)
        .map(|f| f.type_ref.name.as_str())
        .unwrap_or_else(|| panic!("field '{}' not found", field))
}

/// Two `Widget` types in `Alpha` and `Beta`, plus a `Gamma.User` in its own file.
fn widgets(user_imports: Vec<ImportFact>, user: TypeFact) -> RepositoryFact {
    repository(vec![project(
        "App",
        &[],
        vec![
            unit("App/Alpha.cs", vec![], vec![TypeFact::class("Alpha", "Widget")]),
            unit("App/Beta.cs", vec![], vec![TypeFact::class("Beta", "Widget")]),
            unit("App/User.cs", user_imports, vec![user]),
        ],
    )])
}

#[test]
fn test_metric_keys_are_qualified() {
    let repo = repository(vec![project(
        "App",
        &[],
        vec![unit(
            "App/Models.cs",
            vec![],
            vec![
                TypeFact::class("Models", "Class1"),
                TypeFact::class("Models", "Class2").with_metric(RelationKind::Declarations, &[("Class1", 2)]),
            ],
        )],
    )]);

    let (resolved, diagnostics) = resolve(&repo);
    let class2 = find_type(&resolved, "Class2");
    let counts = &class2.metrics[0].counts;
    assert_eq!(counts.len(), 1);
    assert_eq!(counts.get("Models.Class1"), Some(&2));
    assert!(diagnostics.is_empty());
}

#[test]
fn test_metric_keys_merge_after_resolution() {
    let repo = repository(vec![project(
        "App",
        &[],
        vec![unit(
            "App/Models.cs",
            vec![],
            vec![
                TypeFact::class("Models", "Class1"),
                TypeFact::class("Models", "Class2")
                    .with_metric(RelationKind::Calls, &[("Class1", 2), ("Models.Class1", 3)]),
            ],
        )],
    )]);

    let (resolved, _) = resolve(&repo);
    let counts = &find_type(&resolved, "Class2").metrics[0].counts;
    assert_eq!(counts.len(), 1);
    assert_eq!(counts.get("Models.Class1"), Some(&5));
}

#[test]
fn test_ambiguous_import_warns_once_and_uses_first_import() {
    let user = TypeFact::class("Gamma", "User")
        .with_field(FieldFact::new("primary", "Widget"))
        .with_field(FieldFact::new("secondary", "Widget"));
    let repo = widgets(vec![ImportFact::plain("Alpha"), ImportFact::plain("Beta")], user);

    let (resolved, diagnostics) = resolve(&repo);
    let user = find_type(&resolved, "User");
    assert_eq!(field_type(user, "primary"), "Alpha.Widget");
    assert_eq!(field_type(user, "secondary"), "Alpha.Widget");

    let warnings = diagnostics.of_kind(DiagnosticKind::AmbiguousName);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity, Severity::Warning);
    assert_eq!(warnings[0].context.candidates, vec!["Alpha.Widget", "Beta.Widget"]);
    assert_eq!(warnings[0].context.file_path.as_deref(), Some("App/User.cs"));
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn test_fallback_ambiguity_is_informational() {
    let user = TypeFact::class("Gamma", "User").with_field(FieldFact::new("widget", "Widget"));
    let repo = widgets(vec![], user);

    let (resolved, diagnostics) = resolve(&repo);
    assert_eq!(field_type(find_type(&resolved, "User"), "widget"), "Alpha.Widget");

    let infos = diagnostics.of_kind(DiagnosticKind::FallbackAmbiguity);
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].severity, Severity::Info);
    assert_eq!(diagnostics.count(Severity::Warning), 0);
}

#[test]
fn test_type_alias_shadows_plain_import() {
    let user = TypeFact::class("Gamma", "User").with_field(FieldFact::new("widget", "Widget"));
    let repo = widgets(
        vec![ImportFact::plain("Alpha"), ImportFact::type_alias("Widget", "Beta.Widget")],
        user,
    );

    let (resolved, diagnostics) = resolve(&repo);
    assert_eq!(field_type(find_type(&resolved, "User"), "widget"), "Beta.Widget");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_type_alias_with_generic_target() {
    let user = TypeFact::class("Gamma", "User").with_field(FieldFact::new("cache", "Cache"));
    let repo = widgets(
        vec![
            ImportFact::plain("Alpha"),
            ImportFact::type_alias("Cache", "Dictionary<string, Widget>"),
        ],
        user,
    );

    let (resolved, _) = resolve(&repo);
    assert_eq!(
        field_type(find_type(&resolved, "User"), "cache"),
        "Dictionary<string, Alpha.Widget>"
    );
}

#[test]
fn test_namespace_alias_substitutes_prefix() {
    let user = TypeFact::class("Gamma", "User").with_field(FieldFact::new("widget", "B.Widget"));
    let repo = widgets(vec![ImportFact::namespace_alias("B", "Beta")], user);

    let (resolved, _) = resolve(&repo);
    assert_eq!(field_type(find_type(&resolved, "User"), "widget"), "Beta.Widget");
}

#[test]
fn test_generic_names_resolve_argument_wise() {
    let user = TypeFact::class("Gamma", "User")
        .with_field(FieldFact::new("list", "List<Widget>"))
        .with_field(FieldFact::new("map", "Dictionary<string,Widget[]>?"));
    let repo = widgets(vec![ImportFact::plain("Alpha")], user);

    let (resolved, _) = resolve(&repo);
    let user = find_type(&resolved, "User");
    assert_eq!(field_type(user, "list"), "List<Alpha.Widget>");
    assert_eq!(field_type(user, "map"), "Dictionary<string, Alpha.Widget[]>?");
}

#[test]
fn test_structured_generic_arguments_resolve() {
    let mut user = TypeFact::class("Gamma", "User");
    user.fields.push(FieldFact {
        name: "items".to_string(),
        type_ref: TypeRef::generic("List", vec![TypeRef::named("Widget")]),
        ..Default::default()
    });
    let repo = widgets(vec![ImportFact::plain("Beta")], user);

    let (resolved, _) = resolve(&repo);
    let field = &find_type(&resolved, "User").fields[0];
    assert_eq!(field.type_ref.generic_arguments[0].name, "Beta.Widget");
}

#[test]
fn test_nested_types_resolve_from_inside() {
    let repo = repository(vec![project(
        "App",
        &[],
        vec![unit(
            "App/Outer.cs",
            vec![],
            vec![
                TypeFact::class("Shapes", "Outer").with_field(FieldFact::new("inner", "Inner")),
                TypeFact::class("Shapes", "Inner")
                    .nested_in("Outer")
                    .with_field(FieldFact::new("owner", "Outer")),
            ],
        )],
    )]);

    let (resolved, _) = resolve(&repo);
    assert_eq!(field_type(find_type(&resolved, "Outer"), "inner"), "Shapes.Outer.Inner");
    assert_eq!(field_type(find_type(&resolved, "Inner"), "owner"), "Shapes.Outer");
}

#[test]
fn test_type_parameters_are_left_alone() {
    let mut boxed = TypeFact::class("Collections", "Box<T>")
        .with_field(FieldFact::new("value", "T"))
        .with_field(FieldFact::new("values", "List<T>"));
    boxed.generic_parameters = vec!["T".to_string()];
    let mut map = MethodFact::new("Map").with_return_type("U");
    map.generic_parameters = vec!["U".to_string()];
    boxed = boxed.with_method(map);

    let repo = repository(vec![project(
        "App",
        &[],
        vec![unit(
            "App/Box.cs",
            vec![],
            vec![boxed, TypeFact::class("Other", "T"), TypeFact::class("Other", "U")],
        )],
    )]);

    let (resolved, _) = resolve(&repo);
    let boxed = find_type(&resolved, "Box<T>");
    assert_eq!(field_type(boxed, "value"), "T");
    assert_eq!(field_type(boxed, "values"), "List<T>");
    assert_eq!(boxed.methods[0].return_type.as_ref().unwrap().name, "U");
}

#[test]
fn test_referenced_project_is_searched() {
    let repo = repository(vec![
        project(
            "App",
            &["Lib"],
            vec![unit(
                "App/Page.cs",
                vec![],
                vec![TypeFact::class("App", "Page").with_field(FieldFact::new("thing", "Thing"))],
            )],
        ),
        project("Lib", &[], vec![unit("Lib/Thing.cs", vec![], vec![TypeFact::class("Lib.Models", "Thing")])]),
    ]);

    let (resolved, diagnostics) = resolve(&repo);
    assert_eq!(field_type(find_type(&resolved, "Page"), "thing"), "Lib.Models.Thing");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_unreferenced_project_is_hidden_when_references_exist() {
    let repo = repository(vec![
        project(
            "App",
            &["Lib", "Gone"],
            vec![unit(
                "App/Page.cs",
                vec![ImportFact::plain("Other")],
                vec![TypeFact::class("App", "Page").with_field(FieldFact::new("thing", "Thing"))],
            )],
        ),
        project("Lib", &[], vec![]),
        project("Other", &[], vec![unit("Other/Thing.cs", vec![], vec![TypeFact::class("Other", "Thing")])]),
    ]);

    let (resolved, diagnostics) = resolve(&repo);
    assert_eq!(field_type(find_type(&resolved, "Page"), "thing"), "Thing");
    assert_eq!(diagnostics.of_kind(DiagnosticKind::MissingProjectReference).len(), 1);

    let (global, _) = resolve_with(&repo, FallbackPolicy::AlwaysGlobal, false);
    assert_eq!(field_type(find_type(&global, "Page"), "thing"), "Other.Thing");
}

#[test]
fn test_dotted_name_from_hidden_project_does_not_shadow_enclosing_namespace() {
    let repo = repository(vec![
        project(
            "App",
            &["Lib"],
            vec![unit(
                "App/Page.cs",
                vec![],
                vec![
                    TypeFact::class("App.Models", "Widget"),
                    TypeFact::class("App", "Page").with_field(FieldFact::new("widget", "Models.Widget")),
                ],
            )],
        ),
        project("Lib", &[], vec![]),
        project("Other", &[], vec![unit("Other/Widget.cs", vec![], vec![TypeFact::class("Models", "Widget")])]),
    ]);

    let (resolved, diagnostics) = resolve(&repo);
    assert_eq!(field_type(find_type(&resolved, "Page"), "widget"), "App.Models.Widget");
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
}

#[test]
fn test_shared_project_is_resolved_once() {
    let user = TypeFact::class("Gamma", "User").with_field(FieldFact::new("widget", "Widget"));
    let core = project(
        "Core",
        &[],
        vec![
            unit("Core/Alpha.cs", vec![], vec![TypeFact::class("Alpha", "Widget")]),
            unit("Core/Beta.cs", vec![], vec![TypeFact::class("Beta", "Widget")]),
            unit(
                "Core/User.cs",
                vec![ImportFact::plain("Alpha"), ImportFact::plain("Beta")],
                vec![user],
            ),
        ],
    );
    let repo = RepositoryFact {
        path: "repo".to_string(),
        solutions: vec![
            SolutionFact {
                path: "A.sln".to_string(),
                projects: vec![core.clone()],
            },
            SolutionFact {
                path: "B.sln".to_string(),
                projects: vec![core],
            },
        ],
    };

    for parallel in [false, true] {
        let (resolved, diagnostics) = resolve_with(&repo, FallbackPolicy::default(), parallel);
        assert_eq!(diagnostics.of_kind(DiagnosticKind::AmbiguousName).len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(resolved.solutions[0].projects, resolved.solutions[1].projects);
        let second_user = &resolved.solutions[1].projects[0].compilation_units[2].types[0];
        assert_eq!(field_type(second_user, "widget"), "Alpha.Widget");
    }
}

#[test]
fn test_unknown_names_are_unchanged() {
    let user = TypeFact::class("Gamma", "User")
        .with_field(FieldFact::new("count", "int"))
        .with_field(FieldFact::new("clock", "System.DateTime"));
    let repo = widgets(vec![ImportFact::plain("System")], user);

    let (resolved, diagnostics) = resolve(&repo);
    let user = find_type(&resolved, "User");
    assert_eq!(field_type(user, "count"), "int");
    assert_eq!(field_type(user, "clock"), "System.DateTime");
    assert!(diagnostics.is_empty());
}

#[test]
fn test_call_owner_from_enclosing_type_and_static_import() {
    let repo = repository(vec![project(
        "App",
        &[],
        vec![
            unit(
                "App/MathUtil.cs",
                vec![],
                vec![TypeFact::class("Alpha", "MathUtil").with_method(MethodFact::new("Sqrt").with_parameters(&["double"]))],
            ),
            unit(
                "App/Calc.cs",
                vec![ImportFact::static_member("Alpha.MathUtil")],
                vec![TypeFact::class("Gamma", "Calc")
                    .with_method(MethodFact::new("Helper"))
                    .with_method(
                        MethodFact::new("Run")
                            .with_call(CallFact::new("", "Helper", &[]))
                            .with_call(CallFact::new("", "Sqrt", &["double"])),
                    )],
            ),
        ],
    )]);

    let (resolved, _) = resolve(&repo);
    let run = &find_type(&resolved, "Calc").methods[1];
    assert_eq!(run.called_methods[0].containing_type, "Gamma.Calc");
    assert_eq!(run.called_methods[1].containing_type, "Alpha.MathUtil");
}

#[test]
fn test_resolve_one_reports_tier() {
    let repo = widgets(
        vec![ImportFact::plain("Alpha")],
        TypeFact::class("Gamma", "User"),
    );
    let mut diagnostics = Diagnostics::new();
    let index = ScopeIndex::build(&repo, ".", &mut diagnostics);
    let resolver = NameResolver::new(&index, FallbackPolicy::default());
    let scope = resolver
        .scope_for("App", "App/User.cs", "Gamma", Some("Gamma.User"))
        .unwrap();

    assert_eq!(
        resolver.resolve_one("Widget", &scope),
        Resolution::Found {
            full_name: "Alpha.Widget".to_string(),
            tier: ResolutionTier::Import,
        }
    );
    assert_eq!(
        resolver.resolve_one("Beta.Widget", &scope),
        Resolution::Found {
            full_name: "Beta.Widget".to_string(),
            tier: ResolutionTier::Qualified,
        }
    );
    assert_eq!(
        resolver.resolve_one("User", &scope),
        Resolution::Found {
            full_name: "Gamma.User".to_string(),
            tier: ResolutionTier::EnclosingScope,
        }
    );
    assert_eq!(resolver.resolve_one("Missing", &scope), Resolution::NotFound);
    assert_eq!(resolver.resolve_type_name("List<Widget>[]", &scope), "List<Alpha.Widget>[]");
    assert!(resolver.scope_for("Nope", "x.cs", "", None).is_none());
}

#[test]
fn test_parallel_matches_sequential() {
    let mut projects = Vec::new();
    for i in 0..6 {
        let name = format!("P{i}");
        let references: Vec<String> = if i > 0 { vec![format!("P{}", i - 1)] } else { vec![] };
        projects.push(ProjectFact {
            path: name.clone(),
            name: name.clone(),
            project_references: references,
            compilation_units: vec![unit(
                &format!("{name}/Types.cs"),
                vec![ImportFact::plain("Alpha"), ImportFact::plain("Beta")],
                vec![
                    TypeFact::class("Alpha", "Widget"),
                    TypeFact::class("Beta", "Widget"),
                    TypeFact::class(name.as_str(), "User")
                        .with_field(FieldFact::new("widget", "Widget"))
                        .with_field(FieldFact::new("list", "List<Widget>")),
                ],
            )],
        });
    }
    let repo = repository(projects);

    let (sequential, seq_diagnostics) = resolve_with(&repo, FallbackPolicy::default(), false);
    let (parallel, par_diagnostics) = resolve_with(&repo, FallbackPolicy::default(), true);
    assert_eq!(sequential, parallel);
    assert_eq!(seq_diagnostics, par_diagnostics);
    assert_eq!(seq_diagnostics.of_kind(DiagnosticKind::AmbiguousName).len(), 6);
}
