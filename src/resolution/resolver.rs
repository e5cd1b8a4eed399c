use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use tracing::debug;

use crate::config::FallbackPolicy;
use crate::diagnostics::{DiagnosticContext, DiagnosticKind, Diagnostics};
use crate::resolution::generic::TypeName;
use crate::scope::ScopeIndex;
use crate::types::*;

/// Which step of the lookup produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// The name was already fully qualified.
    Qualified,
    /// Enclosing types or namespaces of the occurrence.
    EnclosingScope,
    /// Type aliases, namespace aliases or plain imports of the file.
    Import,
    /// Current project, referenced projects, then the global scan.
    Fallback,
}

/// Outcome of looking up one (non-generic) name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found {
        full_name: String,
        tier: ResolutionTier,
    },
    /// Several candidates at the same tier; the first one is used.
    Ambiguous {
        chosen: String,
        candidates: Vec<String>,
        tier: ResolutionTier,
    },
    NotFound,
}

impl Resolution {
    /// The full name to use, if any.
    pub fn full_name(&self) -> Option<&str> {
        match self {
            Resolution::Found { full_name, .. } => Some(full_name),
            Resolution::Ambiguous { chosen, .. } => Some(chosen),
            Resolution::NotFound => None,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Resolution::Ambiguous { .. })
    }

    fn from_candidates(candidates: Vec<String>, tier: ResolutionTier) -> Self {
        match candidates.len() {
            0 => Resolution::NotFound,
            1 => Resolution::Found {
                full_name: candidates.into_iter().next().unwrap_or_default(),
                tier,
            },
            _ => Resolution::Ambiguous {
                chosen: candidates[0].clone(),
                candidates,
                tier,
            },
        }
    }
}

/// Where a name occurs: project, file, namespace, enclosing types and the
/// generic parameters in scope.
#[derive(Debug, Clone)]
pub struct ResolutionScope {
    pub project: usize,
    pub project_path: String,
    pub file_path: String,
    pub namespace: String,
    /// Full names of the enclosing types, innermost first.
    pub enclosing_types: Vec<String>,
    pub type_parameters: Vec<String>,
}

impl ResolutionScope {
    /// The innermost enclosing type, if any.
    pub fn current_type(&self) -> Option<&str> {
        self.enclosing_types.first().map(String::as_str)
    }
}

/// Rewrites short type names in a fact model to fully-qualified names.
///
/// Lookup order for one name, first tier with a match wins:
/// 1. **Qualified** -- a dotted name that is declared somewhere is kept.
/// 2. **Enclosing scope** -- nested types of the enclosing types, then each
///    namespace from the innermost outwards, in the same project.
/// 3. **Imports** -- type aliases, namespace aliases, then plain imports in
///    declaration order.
/// 4. **Fallback** -- current project, referenced projects, then every
///    project, as allowed by the [`FallbackPolicy`].
///
/// Names that match nothing are returned unchanged.
pub struct NameResolver<'a> {
    index: &'a ScopeIndex,
    fallback: FallbackPolicy,
}

impl<'a> NameResolver<'a> {
    pub fn new(index: &'a ScopeIndex, fallback: FallbackPolicy) -> Self {
        Self { index, fallback }
    }

    /// Resolves every name occurrence of the repository, returning the
    /// rewritten copy. Projects are resolved concurrently when `parallel` is
    /// set; diagnostics are merged back in project order either way.
    pub fn resolve_repository(
        &self,
        repo: &RepositoryFact,
        parallel: bool,
        diagnostics: &mut Diagnostics,
    ) -> RepositoryFact {
        let mut resolved = repo.clone();
        let mut seen = HashSet::new();
        let mut projects: Vec<&mut ProjectFact> = resolved
            .solutions
            .iter_mut()
            .flat_map(|s| s.projects.iter_mut())
            .filter(|p| seen.insert(p.path.clone()))
            .collect();

        let per_project: Vec<Diagnostics> = if parallel {
            projects
                .par_iter_mut()
                .map(|project| self.resolve_project(project))
                .collect()
        } else {
            projects
                .iter_mut()
                .map(|project| self.resolve_project(project))
                .collect()
        };

        for project_diagnostics in per_project {
            diagnostics.extend(project_diagnostics);
        }

        // Later listings of a shared project take the first listing's result.
        let mut first: HashMap<String, ProjectFact> = HashMap::new();
        for project in resolved.solutions.iter_mut().flat_map(|s| s.projects.iter_mut()) {
            match first.get(&project.path) {
                Some(done) => *project = done.clone(),
                None => {
                    first.insert(project.path.clone(), project.clone());
                }
            }
        }
        resolved
    }

    /// Resolves every name occurrence of one project in place.
    pub fn resolve_project(&self, project: &mut ProjectFact) -> Diagnostics {
        let mut state = ProjectState::default();
        let Some(project_idx) = self.index.project_index(&project.path) else {
            return state.diagnostics;
        };
        let separator = self.index.separator().to_string();

        for unit in &mut project.compilation_units {
            for type_fact in &mut unit.types {
                if type_fact.name.trim().is_empty() {
                    continue;
                }
                let full_name = type_fact.full_name(&separator);
                let enclosing_types = self.enclosing_chain(type_fact, &full_name);
                let type_parameters = enclosing_types
                    .iter()
                    .flat_map(|t| self.index.generic_parameters(t).iter().cloned())
                    .chain(type_fact.generic_parameters.iter().cloned())
                    .collect();

                let scope = ResolutionScope {
                    project: project_idx,
                    project_path: project.path.clone(),
                    file_path: unit.path.clone(),
                    namespace: type_fact.namespace.trim().to_string(),
                    enclosing_types,
                    type_parameters,
                };
                let mut cx = ResolveContext {
                    resolver: self,
                    state: &mut state,
                    scope,
                };
                type_fact.resolve_names(&mut cx);
            }
        }

        debug!(
            project = project.path.as_str(),
            cached = state.cache.len(),
            "names resolved"
        );
        state.diagnostics
    }

    /// Builds the scope of code declared inside the type `type_full_name`
    /// of a compilation unit.
    pub fn scope_for(
        &self,
        project_path: &str,
        file_path: &str,
        namespace: &str,
        type_full_name: Option<&str>,
    ) -> Option<ResolutionScope> {
        let project = self.index.project_index(project_path)?;
        let enclosing_types = match type_full_name {
            Some(full) => {
                let mut chain = vec![full.to_string()];
                let mut current = full.to_string();
                while let Some(pos) = current.rfind(self.index.separator()) {
                    current.truncate(pos);
                    if current.len() <= namespace.len() {
                        break;
                    }
                    chain.push(current.clone());
                }
                chain
            }
            None => Vec::new(),
        };
        Some(ResolutionScope {
            project,
            project_path: project_path.to_string(),
            file_path: file_path.to_string(),
            namespace: namespace.to_string(),
            enclosing_types,
            type_parameters: Vec::new(),
        })
    }

    /// Resolves a full type name occurrence, including generic arguments,
    /// array ranks and nullable markers. Ambiguities are not reported.
    pub fn resolve_type_name(&self, name: &str, scope: &ResolutionScope) -> String {
        let mut state = ProjectState::default();
        let mut cx = ResolveContext {
            resolver: self,
            state: &mut state,
            scope: scope.clone(),
        };
        cx.resolve_name(name)
    }

    /// Looks up a single non-generic name (which may be dotted).
    pub fn resolve_one(&self, name: &str, scope: &ResolutionScope) -> Resolution {
        self.lookup(name, scope, true)
    }

    // ------------------------------------------------------------------
    // Private helpers
    // ------------------------------------------------------------------

    /// Runs the lookup strategies in order. Alias targets are resolved with
    /// `use_aliases` off so an alias can never expand into itself.
    fn lookup(&self, name: &str, scope: &ResolutionScope, use_aliases: bool) -> Resolution {
        let name = name.trim();
        if name.is_empty() {
            return Resolution::NotFound;
        }

        // Strategy 1: already qualified
        if name.contains(self.index.separator())
            && self.index.is_visible_from(name, scope.project, self.fallback)
        {
            return Resolution::Found {
                full_name: name.to_string(),
                tier: ResolutionTier::Qualified,
            };
        }

        // Strategy 2: enclosing types and namespaces
        if let Some(full_name) = self.try_enclosing_scope(name, scope) {
            return Resolution::Found {
                full_name,
                tier: ResolutionTier::EnclosingScope,
            };
        }

        // Strategy 3: imports
        let imported = self.try_imports(name, scope, use_aliases);
        if imported != Resolution::NotFound {
            return imported;
        }

        // Strategy 4: other projects
        self.try_fallback(name, scope)
    }

    /// Full names of the type and its enclosing types, innermost first.
    fn enclosing_chain(&self, type_fact: &TypeFact, full_name: &str) -> Vec<String> {
        let separator = self.index.separator();
        let mut chain = vec![full_name.to_string()];
        if let Some(outer) = type_fact.containing_type.as_deref().filter(|o| !o.is_empty()) {
            let mut current = join_name(type_fact.namespace.trim(), outer, separator);
            let namespace_len = type_fact.namespace.trim().len();
            loop {
                chain.push(current.clone());
                match current.rfind(separator) {
                    Some(pos) if pos > namespace_len => current.truncate(pos),
                    _ => break,
                }
            }
        }
        chain
    }

    fn try_enclosing_scope(&self, name: &str, scope: &ResolutionScope) -> Option<String> {
        let namespace_chain = self.index.namespaces().chain(&scope.namespace);
        scope
            .enclosing_types
            .iter()
            .chain(namespace_chain.iter())
            .map(|prefix| join_name(prefix, name, self.index.separator()))
            .find(|candidate| self.index.is_declared_in(candidate, scope.project))
    }

    fn try_imports(&self, name: &str, scope: &ResolutionScope, use_aliases: bool) -> Resolution {
        let Some(table) = self.index.imports(&scope.file_path) else {
            return Resolution::NotFound;
        };
        let separator = self.index.separator();

        // Type aliases shadow plain imports of the same short name.
        let (head, rest) = match name.find(separator) {
            Some(pos) => (&name[..pos], Some(&name[pos + separator.len()..])),
            None => (name, None),
        };
        if let Some(alias) = table.type_alias(head).filter(|_| use_aliases) {
            let target = self.resolve_alias_target(&alias.source_name, scope);
            let full_name = match rest {
                Some(rest) => join_name(&target, rest, separator),
                None => target,
            };
            return Resolution::Found {
                full_name,
                tier: ResolutionTier::Import,
            };
        }

        if let Some(rest) = rest.filter(|_| use_aliases) {
            for alias in table.namespace_aliases() {
                if alias.alias_name.as_deref() == Some(head) {
                    return Resolution::Found {
                        full_name: join_name(&alias.source_name, rest, separator),
                        tier: ResolutionTier::Import,
                    };
                }
            }
        }

        let mut candidates: Vec<String> = Vec::new();
        for import in table.plain_imports() {
            let candidate = join_name(&import.source_name, name, separator);
            if self
                .index
                .is_visible_from(&candidate, scope.project, self.fallback)
                && !candidates.contains(&candidate)
            {
                candidates.push(candidate);
            }
        }
        Resolution::from_candidates(candidates, ResolutionTier::Import)
    }

    /// Resolves the target of a type alias, pre-resolving its generic
    /// arguments. Aliases are not consulted again.
    fn resolve_alias_target(&self, target: &str, scope: &ResolutionScope) -> String {
        self.resolve_without_aliases(&TypeName::parse(target), scope)
            .render()
    }

    fn resolve_without_aliases(&self, parsed: &TypeName, scope: &ResolutionScope) -> TypeName {
        let base = match self.lookup(&parsed.base, scope, false).full_name() {
            Some(full_name) => full_name.to_string(),
            None => parsed.base.clone(),
        };
        TypeName {
            base,
            args: parsed
                .args
                .iter()
                .map(|a| self.resolve_without_aliases(a, scope))
                .collect(),
            suffix: parsed.suffix.clone(),
        }
    }

    fn try_fallback(&self, name: &str, scope: &ResolutionScope) -> Resolution {
        let mut projects = vec![scope.project];
        projects.extend(self.index.reachable_projects(scope.project));
        if self.index.allows_global(self.fallback) {
            for p in 0..self.index.project_count() {
                if !projects.contains(&p) {
                    projects.push(p);
                }
            }
        }

        for project in projects {
            let mut candidates: Vec<String> = Vec::new();
            for decl in self.index.declarations_ending_with(name, project) {
                if !candidates.contains(&decl.full_name) {
                    candidates.push(decl.full_name.clone());
                }
            }
            if !candidates.is_empty() {
                return Resolution::from_candidates(candidates, ResolutionTier::Fallback);
            }
        }
        Resolution::NotFound
    }
}

/// Per-project resolution state: the lookup cache, the ambiguities already
/// reported and the project's diagnostics.
#[derive(Default)]
struct ProjectState {
    cache: HashMap<(String, String, String), Option<String>>,
    reported: HashSet<(String, String)>,
    diagnostics: Diagnostics,
}

/// Resolution context handed to [`ResolveNames`] implementations.
pub(crate) struct ResolveContext<'r, 'a> {
    resolver: &'r NameResolver<'a>,
    state: &'r mut ProjectState,
    scope: ResolutionScope,
}

impl ResolveContext<'_, '_> {
    /// Resolves a full name occurrence: each part of a generic name is looked
    /// up separately and the result is re-composed in canonical form.
    fn resolve_name(&mut self, name: &str) -> String {
        if name.trim().is_empty() {
            return name.to_string();
        }
        let parsed = TypeName::parse(name);
        self.resolve_parsed(&parsed).render()
    }

    fn resolve_parsed(&mut self, parsed: &TypeName) -> TypeName {
        let args: Vec<TypeName> = parsed.args.iter().map(|a| self.resolve_parsed(a)).collect();

        if !parsed.is_generic() && self.scope.type_parameters.contains(&parsed.base) {
            return parsed.clone();
        }

        let Some(full_name) = self.lookup(&parsed.base) else {
            return TypeName {
                base: parsed.base.clone(),
                args,
                suffix: parsed.suffix.clone(),
            };
        };

        // An alias target may carry its own arguments; arguments written at
        // the occurrence take precedence.
        let mut resolved = TypeName::parse(&full_name);
        if !args.is_empty() {
            resolved.args = args;
        }
        resolved.suffix.push_str(&parsed.suffix);
        resolved
    }

    /// Cached lookup of one base name, reporting ambiguities once per file
    /// and short name.
    fn lookup(&mut self, base: &str) -> Option<String> {
        let key = (
            self.scope.file_path.clone(),
            self.scope
                .current_type()
                .unwrap_or(self.scope.namespace.as_str())
                .to_string(),
            base.to_string(),
        );
        if let Some(cached) = self.state.cache.get(&key) {
            return cached.clone();
        }

        let resolution = self.resolver.lookup(base, &self.scope, true);
        if let Resolution::Ambiguous {
            chosen,
            candidates,
            tier,
        } = &resolution
        {
            self.report_ambiguity(base, chosen, candidates, *tier);
        }

        let full_name = resolution.full_name().map(str::to_string);
        self.state.cache.insert(key, full_name.clone());
        full_name
    }

    fn report_ambiguity(&mut self, name: &str, chosen: &str, candidates: &[String], tier: ResolutionTier) {
        let report_key = (self.scope.file_path.clone(), name.to_string());
        if !self.state.reported.insert(report_key) {
            return;
        }
        let context = DiagnosticContext::file(&self.scope.project_path, &self.scope.file_path)
            .with_name(name)
            .with_candidates(candidates.to_vec());
        let message = format!(
            "'{}' is ambiguous between {}; using '{}'",
            name,
            candidates.join(", "),
            chosen
        );
        match tier {
            ResolutionTier::Fallback => {
                self.state
                    .diagnostics
                    .info(DiagnosticKind::FallbackAmbiguity, message, context)
            }
            _ => self
                .state
                .diagnostics
                .warning(DiagnosticKind::AmbiguousName, message, context),
        }
    }

    /// Resolves the owner of a call written without one: the enclosing type
    /// when it declares the method, else the first statically imported type
    /// that does, else the enclosing type.
    fn resolve_call_owner(&mut self, method: &str) -> String {
        let current = self.scope.current_type().unwrap_or_default().to_string();
        if self.resolver.index.declares_method(&current, method) {
            return current;
        }

        let static_types: Vec<String> = self
            .resolver
            .index
            .imports(&self.scope.file_path)
            .map(|t| t.static_imports().map(|e| e.source_name.clone()).collect())
            .unwrap_or_default();
        for type_name in static_types {
            let resolved = self.resolve_name(&type_name);
            if self.resolver.index.declares_method(&resolved, method) {
                return resolved;
            }
        }
        current
    }

    fn with_type_parameters<F>(&mut self, parameters: &[String], f: F)
    where
        F: FnOnce(&mut Self),
    {
        let len = self.scope.type_parameters.len();
        self.scope.type_parameters.extend(parameters.iter().cloned());
        f(self);
        self.scope.type_parameters.truncate(len);
    }
}

/// Implemented by every fact kind that carries type-name occurrences.
pub(crate) trait ResolveNames {
    fn resolve_names(&mut self, cx: &mut ResolveContext<'_, '_>);
}

impl ResolveNames for TypeRef {
    fn resolve_names(&mut self, cx: &mut ResolveContext<'_, '_>) {
        self.name = cx.resolve_name(&self.name);
        for arg in &mut self.generic_arguments {
            arg.resolve_names(cx);
        }
    }
}

impl ResolveNames for AttributeFact {
    fn resolve_names(&mut self, cx: &mut ResolveContext<'_, '_>) {
        self.type_ref.resolve_names(cx);
    }
}

impl ResolveNames for ParameterFact {
    fn resolve_names(&mut self, cx: &mut ResolveContext<'_, '_>) {
        self.type_ref.resolve_names(cx);
        for attribute in &mut self.attributes {
            attribute.resolve_names(cx);
        }
    }
}

impl ResolveNames for LocalVariableFact {
    fn resolve_names(&mut self, cx: &mut ResolveContext<'_, '_>) {
        self.type_ref.resolve_names(cx);
    }
}

impl ResolveNames for CallFact {
    fn resolve_names(&mut self, cx: &mut ResolveContext<'_, '_>) {
        self.containing_type = if self.containing_type.trim().is_empty() {
            cx.resolve_call_owner(&self.name)
        } else {
            cx.resolve_name(&self.containing_type)
        };
        for param in &mut self.parameter_types {
            param.resolve_names(cx);
        }
    }
}

impl ResolveNames for MethodFact {
    fn resolve_names(&mut self, cx: &mut ResolveContext<'_, '_>) {
        let generic_parameters = self.generic_parameters.clone();
        cx.with_type_parameters(&generic_parameters, |cx| {
            if let Some(return_type) = &mut self.return_type {
                return_type.resolve_names(cx);
            }
            for param in &mut self.parameters {
                param.resolve_names(cx);
            }
            for local in &mut self.local_variables {
                local.resolve_names(cx);
            }
            for call in &mut self.called_methods {
                call.resolve_names(cx);
            }
            for attribute in &mut self.attributes {
                attribute.resolve_names(cx);
            }
            for local_function in &mut self.local_functions {
                local_function.resolve_names(cx);
            }
        });
    }
}

impl ResolveNames for FieldFact {
    fn resolve_names(&mut self, cx: &mut ResolveContext<'_, '_>) {
        self.type_ref.resolve_names(cx);
        for attribute in &mut self.attributes {
            attribute.resolve_names(cx);
        }
    }
}

impl ResolveNames for PropertyFact {
    fn resolve_names(&mut self, cx: &mut ResolveContext<'_, '_>) {
        self.type_ref.resolve_names(cx);
        for accessor in &mut self.accessors {
            accessor.resolve_names(cx);
        }
        for attribute in &mut self.attributes {
            attribute.resolve_names(cx);
        }
    }
}

impl ResolveNames for DependencyMetric {
    fn resolve_names(&mut self, cx: &mut ResolveContext<'_, '_>) {
        let counts = std::mem::take(&mut self.counts);
        for (name, count) in counts {
            *self.counts.entry(cx.resolve_name(&name)).or_insert(0) += count;
        }
    }
}

impl ResolveNames for TypeFact {
    fn resolve_names(&mut self, cx: &mut ResolveContext<'_, '_>) {
        // Base types are looked up from outside the type's own body.
        let own = cx.scope.enclosing_types.remove(0);
        for base in &mut self.base_types {
            base.resolve_names(cx);
        }
        cx.scope.enclosing_types.insert(0, own);

        for attribute in &mut self.attributes {
            attribute.resolve_names(cx);
        }
        for field in &mut self.fields {
            field.resolve_names(cx);
        }
        for property in &mut self.properties {
            property.resolve_names(cx);
        }
        for method in self
            .methods
            .iter_mut()
            .chain(self.constructors.iter_mut())
            .chain(self.destructor.iter_mut())
        {
            method.resolve_names(cx);
        }
        for metric in &mut self.metrics {
            metric.resolve_names(cx);
        }
    }
}
