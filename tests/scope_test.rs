use codelink::config::FallbackPolicy;
use codelink::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use codelink::scope::*;
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

#[test]
fn test_namespace_tree_inserts_ancestors() {
    let mut tree = NamespaceTree::new(".");
    let (key, well_formed) = tree.insert("App.Models.Orders");
    assert!(well_formed);
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.entry(key).name, "Orders");

    let parent = tree.entry(key).parent.unwrap();
    assert_eq!(tree.entry(parent).full_name, "App.Models");
    assert_eq!(
        tree.chain("App.Models.Orders"),
        vec!["App.Models.Orders", "App.Models", "App", ""]
    );

    // Re-inserting reuses the existing entries.
    tree.insert("App.Models");
    assert_eq!(tree.len(), 4);
}

#[test]
fn test_namespace_chain_of_unknown_name() {
    let tree = NamespaceTree::new(".");
    assert!(tree.is_empty());
    assert_eq!(tree.chain("X.Y"), vec!["X.Y", "X", ""]);
    assert_eq!(tree.chain(""), vec![""]);
}

#[test]
fn test_malformed_namespace_is_one_segment() {
    let mut tree = NamespaceTree::new(".");
    let (key, well_formed) = tree.insert("App..Models");
    assert!(!well_formed);
    assert_eq!(tree.entry(key).name, "App..Models");
    assert_eq!(tree.entry(key).parent, Some(tree.root()));
}

#[test]
fn test_import_table_keeps_order_and_rejects_incomplete() {
    let facts = vec![
        ImportFact::plain("System"),
        ImportFact {
            kind: ImportKind::TypeAlias,
            source_name: "App.Models.User".to_string(),
            alias_name: None,
        },
        ImportFact::type_alias("Person", "App.Models.User"),
        ImportFact::namespace_alias("M", "App.Models"),
        ImportFact::plain(""),
        ImportFact::type_alias("Person", "App.Legacy.Person"),
    ];

    let (table, rejected) = ImportTable::from_facts(&facts);
    assert_eq!(rejected.len(), 2);
    assert_eq!(table.entries().len(), 4);
    assert_eq!(table.plain_imports().count(), 1);
    assert_eq!(table.namespace_aliases().count(), 1);
    assert_eq!(
        table.type_alias("Person").map(|e| e.source_name.as_str()),
        Some("App.Legacy.Person")
    );
}

#[test]
fn test_build_reports_malformed_facts_once() {
    let repo = repository(vec![project(
        "App",
        &[],
        vec![
            unit(
                "App/A.cs",
                vec![ImportFact::namespace_alias("", "System")],
                vec![TypeFact::class("App..Core", "A"), TypeFact::class("App..Core", "B")],
            ),
            unit("App/B.cs", vec![], vec![TypeFact::class("App..Core", "C")]),
        ],
    )]);

    let mut diagnostics = Diagnostics::new();
    let index = ScopeIndex::build(&repo, ".", &mut diagnostics);

    assert_eq!(diagnostics.of_kind(DiagnosticKind::MalformedNamespace).len(), 1);
    assert_eq!(diagnostics.of_kind(DiagnosticKind::MalformedFact).len(), 1);
    assert_eq!(diagnostics.count(Severity::Warning), 1);
    assert!(index.is_declared("App..Core.C"));
}

#[test]
fn test_declarations_are_indexed_per_project() {
    let repo = repository(vec![
        project(
            "Core",
            &[],
            vec![unit(
                "Core/User.cs",
                vec![],
                vec![TypeFact::class("Core.Models", "User").with_method(MethodFact::new("Save"))],
            )],
        ),
        project("Web", &["Core"], vec![unit("Web/Page.cs", vec![], vec![TypeFact::class("Web", "Page")])]),
    ]);

    let mut diagnostics = Diagnostics::new();
    let index = ScopeIndex::build(&repo, ".", &mut diagnostics);
    assert!(diagnostics.is_empty());

    let core = index.project_index("Core").unwrap();
    let web = index.project_index("Web").unwrap();
    assert!(index.is_declared_in("Core.Models.User", core));
    assert!(!index.is_declared_in("Core.Models.User", web));
    assert!(index.is_visible_from("Core.Models.User", web, FallbackPolicy::ReferencesOnly));
    assert!(!index.is_visible_from("Web.Page", core, FallbackPolicy::ReferencesOnly));
    assert!(index.declares_method("Core.Models.User", "Save"));
    assert!(!index.declares_method("Core.Models.User", "Load"));
}

#[test]
fn test_declarations_ending_with_matches_whole_segments() {
    let repo = repository(vec![project(
        "App",
        &[],
        vec![unit(
            "App/Types.cs",
            vec![],
            vec![
                TypeFact::class("App", "UserService"),
                TypeFact::class("App", "Service"),
                TypeFact::class("App.Legacy", "Service"),
            ],
        )],
    )]);

    let mut diagnostics = Diagnostics::new();
    let index = ScopeIndex::build(&repo, ".", &mut diagnostics);
    let names: Vec<&str> = index
        .declarations_ending_with("Service", 0)
        .iter()
        .map(|d| d.full_name.as_str())
        .collect();
    assert_eq!(names, vec!["App.Service", "App.Legacy.Service"]);

    let dotted: Vec<&str> = index
        .declarations_ending_with("Legacy.Service", 0)
        .iter()
        .map(|d| d.full_name.as_str())
        .collect();
    assert_eq!(dotted, vec!["App.Legacy.Service"]);
}

#[test]
fn test_reachable_projects_are_transitive_breadth_first() {
    let repo = repository(vec![
        project("A", &["B", "C"], vec![]),
        project("B", &["D"], vec![]),
        project("C", &["A"], vec![]),
        project("D", &[], vec![]),
    ]);

    let mut diagnostics = Diagnostics::new();
    let index = ScopeIndex::build(&repo, ".", &mut diagnostics);
    assert!(index.has_reference_graph());

    let reachable: Vec<&str> = index
        .reachable_projects(0)
        .into_iter()
        .map(|p| index.project(p).path.as_str())
        .collect();
    assert_eq!(reachable, vec!["B", "C", "D"]);
    assert!(index.reachable_projects(3).is_empty());
}

#[test]
fn test_missing_project_reference_is_reported() {
    let repo = repository(vec![
        project("App", &["Missing", "App"], vec![]),
        project("Other", &[], vec![]),
    ]);

    let mut diagnostics = Diagnostics::new();
    let index = ScopeIndex::build(&repo, ".", &mut diagnostics);

    let missing = diagnostics.of_kind(DiagnosticKind::MissingProjectReference);
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].severity, Severity::Warning);
    assert_eq!(missing[0].context.name.as_deref(), Some("Missing"));
    // Neither the dangling edge nor the self edge counts as a reference graph.
    assert!(!index.has_reference_graph());
    assert!(index.allows_global(FallbackPolicy::ReferencesThenGlobal));
    assert!(!index.allows_global(FallbackPolicy::ReferencesOnly));
}

#[test]
fn test_project_shared_by_solutions_is_indexed_once() {
    let core = project(
        "Core",
        &["Missing"],
        vec![unit("Core/User.cs", vec![ImportFact::plain(" ")], vec![TypeFact::class("Core", "User")])],
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

    let mut diagnostics = Diagnostics::new();
    let index = ScopeIndex::build(&repo, ".", &mut diagnostics);
    assert_eq!(index.project_count(), 1);
    assert_eq!(index.declarations_of("Core.User").count(), 1);
    assert_eq!(diagnostics.of_kind(DiagnosticKind::MalformedFact).len(), 1);
    assert_eq!(diagnostics.of_kind(DiagnosticKind::MissingProjectReference).len(), 1);
}

#[test]
fn test_last_segment() {
    assert_eq!(last_segment("App.Models.User", "."), "User");
    assert_eq!(last_segment("User", "."), "User");
    assert_eq!(last_segment("a::b", "::"), "b");
}
