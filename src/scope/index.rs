use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::config::FallbackPolicy;
use crate::diagnostics::{DiagnosticContext, DiagnosticKind, Diagnostics};
use crate::scope::imports::ImportTable;
use crate::scope::namespace_tree::NamespaceTree;
use crate::types::RepositoryFact;

/// A project known to the index, with its validated reference edges.
#[derive(Debug, Clone)]
pub struct ProjectEntry {
    pub path: String,
    /// Indices of directly referenced projects, in declaration order.
    pub references: Vec<usize>,
}

/// One type declaration seen in the fact model.
#[derive(Debug, Clone)]
pub struct DeclaredType {
    pub full_name: String,
    /// Name relative to the namespace (`Outer.Inner` for nested types).
    pub relative_name: String,
    pub namespace: String,
    pub project: usize,
    pub file_path: String,
    pub is_partial: bool,
    pub generic_parameters: Vec<String>,
    pub method_names: Vec<String>,
}

/// Read-only lookup structures shared by the resolver and the linker.
#[derive(Debug, Clone)]
pub struct ScopeIndex {
    separator: String,
    namespaces: NamespaceTree,
    imports: HashMap<String, ImportTable>,
    projects: Vec<ProjectEntry>,
    project_by_path: HashMap<String, usize>,
    declarations: Vec<DeclaredType>,
    by_full_name: HashMap<String, Vec<usize>>,
    by_simple_name: HashMap<String, Vec<usize>>,
    has_reference_graph: bool,
}

impl ScopeIndex {
    /// Builds the namespace tree, import tables, declaration index and
    /// project graph for a fact model. Never fails; problems are reported to
    /// `diagnostics`.
    pub fn build(repo: &RepositoryFact, separator: &str, diagnostics: &mut Diagnostics) -> Self {
        let mut index = Self {
            separator: separator.to_string(),
            namespaces: NamespaceTree::new(separator),
            imports: HashMap::new(),
            projects: Vec::new(),
            project_by_path: HashMap::new(),
            declarations: Vec::new(),
            by_full_name: HashMap::new(),
            by_simple_name: HashMap::new(),
            has_reference_graph: false,
        };
        let mut reported_namespaces: HashSet<String> = HashSet::new();

        for project in repo.projects() {
            // A project shared by several solutions is indexed once.
            if index.project_by_path.contains_key(&project.path) {
                continue;
            }
            let project_idx = index.register_project(&project.path);

            for unit in &project.compilation_units {
                let (table, rejected) = ImportTable::from_facts(&unit.imports);
                for fact in rejected {
                    diagnostics.warning(
                        DiagnosticKind::MalformedFact,
                        format!("skipping incomplete import '{}'", fact.source_name),
                        DiagnosticContext::file(&project.path, &unit.path)
                            .with_name(fact.source_name.clone()),
                    );
                }
                index.imports.insert(unit.path.clone(), table);

                for type_fact in &unit.types {
                    if type_fact.name.trim().is_empty() {
                        continue;
                    }

                    let (_, well_formed) = index.namespaces.insert(&type_fact.namespace);
                    if !well_formed && reported_namespaces.insert(type_fact.namespace.clone()) {
                        diagnostics.info(
                            DiagnosticKind::MalformedNamespace,
                            format!(
                                "namespace '{}' is malformed and is kept as one segment",
                                type_fact.namespace
                            ),
                            DiagnosticContext::file(&project.path, &unit.path)
                                .with_name(type_fact.namespace.clone()),
                        );
                    }

                    let relative_name = type_fact.relative_name(separator);
                    let full_name = type_fact.full_name(separator);
                    let simple_name = last_segment(&relative_name, separator).to_string();

                    let decl_idx = index.declarations.len();
                    index.declarations.push(DeclaredType {
                        full_name: full_name.clone(),
                        relative_name,
                        namespace: type_fact.namespace.trim().to_string(),
                        project: project_idx,
                        file_path: unit.path.clone(),
                        is_partial: type_fact.is_partial,
                        generic_parameters: type_fact.generic_parameters.clone(),
                        method_names: type_fact.methods.iter().map(|m| m.name.clone()).collect(),
                    });
                    index.by_full_name.entry(full_name).or_default().push(decl_idx);
                    index.by_simple_name.entry(simple_name).or_default().push(decl_idx);
                }
            }
        }

        index.link_project_references(repo, diagnostics);

        debug!(
            projects = index.projects.len(),
            namespaces = index.namespaces.len(),
            declarations = index.declarations.len(),
            "scope index built"
        );
        index
    }

    fn register_project(&mut self, path: &str) -> usize {
        if let Some(&idx) = self.project_by_path.get(path) {
            return idx;
        }
        let idx = self.projects.len();
        self.projects.push(ProjectEntry {
            path: path.to_string(),
            references: Vec::new(),
        });
        self.project_by_path.insert(path.to_string(), idx);
        idx
    }

    fn link_project_references(&mut self, repo: &RepositoryFact, diagnostics: &mut Diagnostics) {
        let mut linked = HashSet::new();
        for project in repo.projects() {
            let Some(&from) = self.project_by_path.get(&project.path) else {
                continue;
            };
            if !linked.insert(from) {
                continue;
            }
            for reference in &project.project_references {
                match self.project_by_path.get(reference) {
                    Some(&to) if to == from => {}
                    Some(&to) => {
                        self.has_reference_graph = true;
                        if !self.projects[from].references.contains(&to) {
                            self.projects[from].references.push(to);
                        }
                    }
                    None => diagnostics.warning(
                        DiagnosticKind::MissingProjectReference,
                        format!(
                            "project '{}' references '{}', which is not part of the repository",
                            project.path, reference
                        ),
                        DiagnosticContext::project(&project.path).with_name(reference.clone()),
                    ),
                }
            }
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn namespaces(&self) -> &NamespaceTree {
        &self.namespaces
    }

    /// Import table of a compilation unit.
    pub fn imports(&self, file_path: &str) -> Option<&ImportTable> {
        self.imports.get(file_path)
    }

    pub fn project_index(&self, path: &str) -> Option<usize> {
        self.project_by_path.get(path).copied()
    }

    pub fn project(&self, idx: usize) -> &ProjectEntry {
        &self.projects[idx]
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Returns `true` if any project declares a reference to another
    /// project of the repository.
    pub fn has_reference_graph(&self) -> bool {
        self.has_reference_graph
    }

    /// Whether the fallback scan may go past the reference graph.
    pub fn allows_global(&self, policy: FallbackPolicy) -> bool {
        match policy {
            FallbackPolicy::AlwaysGlobal => true,
            FallbackPolicy::ReferencesOnly => false,
            FallbackPolicy::ReferencesThenGlobal => !self.has_reference_graph,
        }
    }

    /// Projects reachable through reference edges, breadth first in
    /// declaration order, excluding `project` itself.
    pub fn reachable_projects(&self, project: usize) -> Vec<usize> {
        let mut seen: HashSet<usize> = HashSet::new();
        seen.insert(project);
        let mut order = Vec::new();
        let mut queue: VecDeque<usize> = VecDeque::new();
        queue.push_back(project);

        while let Some(current) = queue.pop_front() {
            for &next in &self.projects[current].references {
                if seen.insert(next) {
                    order.push(next);
                    queue.push_back(next);
                }
            }
        }
        order
    }

    /// Returns `true` if `full_name` is declared in any project.
    pub fn is_declared(&self, full_name: &str) -> bool {
        self.by_full_name.contains_key(full_name)
    }

    /// Returns `true` if `full_name` is declared in `project`.
    pub fn is_declared_in(&self, full_name: &str, project: usize) -> bool {
        self.declarations_of(full_name).any(|d| d.project == project)
    }

    /// Returns `true` if `full_name` is declared in `project` or in a project
    /// it can see under `policy`.
    pub fn is_visible_from(&self, full_name: &str, project: usize, policy: FallbackPolicy) -> bool {
        let Some(decls) = self.by_full_name.get(full_name) else {
            return false;
        };
        if self.allows_global(policy) {
            return true;
        }
        let reachable = self.reachable_projects(project);
        decls.iter().any(|&i| {
            let p = self.declarations[i].project;
            p == project || reachable.contains(&p)
        })
    }

    /// All declarations (fragments) of a full name, in discovery order.
    pub fn declarations_of<'a>(&'a self, full_name: &str) -> impl Iterator<Item = &'a DeclaredType> {
        self.by_full_name
            .get(full_name)
            .into_iter()
            .flatten()
            .map(move |&i| &self.declarations[i])
    }

    /// Declarations in `project` whose full name ends with `name`, matched on
    /// whole segments, in discovery order.
    pub fn declarations_ending_with(&self, name: &str, project: usize) -> Vec<&DeclaredType> {
        let simple = last_segment(name, &self.separator);
        let suffix = format!("{}{}", self.separator, name);
        self.by_simple_name
            .get(simple)
            .into_iter()
            .flatten()
            .map(|&i| &self.declarations[i])
            .filter(|d| d.project == project && (d.full_name == name || d.full_name.ends_with(&suffix)))
            .collect()
    }

    /// Returns `true` if any declaration of `full_name` has a method `method`.
    pub fn declares_method(&self, full_name: &str, method: &str) -> bool {
        self.declarations_of(full_name)
            .any(|d| d.method_names.iter().any(|m| m == method))
    }

    /// Generic parameters of the first declaration of `full_name`.
    pub fn generic_parameters(&self, full_name: &str) -> &[String] {
        self.declarations_of(full_name)
            .next()
            .map(|d| d.generic_parameters.as_slice())
            .unwrap_or(&[])
    }

    pub fn declarations(&self) -> &[DeclaredType] {
        &self.declarations
    }
}

/// The part of a dotted name after the last separator.
pub fn last_segment<'a>(name: &'a str, separator: &str) -> &'a str {
    match name.rfind(separator) {
        Some(pos) => &name[pos + separator.len()..],
        None => name,
    }
}
