use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, info};

use crate::config::FallbackPolicy;
use crate::diagnostics::{DiagnosticContext, DiagnosticKind, Diagnostics};
use crate::linking::model::*;
use crate::linking::registry::ExternalRegistry;
use crate::resolution::TypeName;
use crate::scope::{last_segment, ScopeIndex};
use crate::types::*;

/// One raw type declaration and the merged node it belongs to.
struct Fragment<'f> {
    type_id: TypeId,
    project: ProjectId,
    file: FileId,
    fact: &'f TypeFact,
}

/// A call site waiting for every method node to exist.
struct PendingCall<'f> {
    caller: MethodId,
    project: ProjectId,
    call: &'f CallFact,
}

/// Where a method node hangs.
#[derive(Clone, Copy)]
struct MethodOwner {
    type_id: TypeId,
    kind: MethodKind,
    containing_method: Option<MethodId>,
    containing_property: Option<PropertyId>,
}

/// Turns a name-resolved fact model into a [`ReferenceModel`].
///
/// Linking happens in five steps:
/// 1. **Fragment merge** -- declarations sharing project, full name and
///    partial flag collapse into one type node.
/// 2. **Member materialization** -- one node per field, property, accessor,
///    method, constructor, destructor, parameter, local variable and local
///    function, each pointing at its container.
/// 3. **Type links** -- names become handles of declared types, or of
///    synthetic external types created once per full name.
/// 4. **Call resolution** -- owner type, then name plus positional parameter
///    types; calls into external types get a synthesized method.
/// 5. **Containment wiring** -- downward lists from repository to types.
///
/// The linker owns the external registry and is its only writer.
pub struct ReferenceLinker<'a> {
    index: &'a ScopeIndex,
    fallback: FallbackPolicy,
    separator: String,
    model: ReferenceModel,
    registry: ExternalRegistry,
    /// Declared types by full name, in creation order.
    declared: HashMap<String, Vec<(ProjectId, TypeId)>>,
    merged: HashMap<(ProjectId, String, bool), TypeId>,
    project_ids: HashMap<String, ProjectId>,
    solution_members: Vec<Vec<ProjectId>>,
    /// Transitively referenced projects, indexed by `ProjectId`.
    reachable: Vec<Vec<ProjectId>>,
    namespace_ids: HashMap<(ProjectId, String), NamespaceId>,
}

impl<'a> ReferenceLinker<'a> {
    pub fn new(index: &'a ScopeIndex, fallback: FallbackPolicy) -> Self {
        Self {
            index,
            fallback,
            separator: index.separator().to_string(),
            model: ReferenceModel::default(),
            registry: ExternalRegistry::default(),
            declared: HashMap::new(),
            merged: HashMap::new(),
            project_ids: HashMap::new(),
            solution_members: Vec::new(),
            reachable: Vec::new(),
            namespace_ids: HashMap::new(),
        }
    }

    /// Links a name-resolved repository. Never fails: malformed facts are
    /// skipped and reported to `diagnostics`.
    pub fn link(mut self, repo: &RepositoryFact, diagnostics: &mut Diagnostics) -> ReferenceModel {
        self.model.repository.path = repo.path.clone();

        let units = self.build_skeleton(repo);
        let fragments = self.merge_fragments(&units, diagnostics);
        self.link_nested_types(&fragments);

        let mut pending = Vec::new();
        for fragment in &fragments {
            self.materialize_members(fragment, &mut pending, diagnostics);
        }
        debug!(
            types = self.model.types.len(),
            methods = self.model.methods.len(),
            calls = pending.len(),
            "members materialized"
        );

        for call in &pending {
            self.resolve_call(call, diagnostics);
        }

        self.wire_containment();

        info!(
            projects = self.model.projects.len(),
            files = self.model.files.len(),
            types = self.model.types.len(),
            created_classes = self.registry.len(),
            "reference model linked"
        );
        self.model
    }

    // ------------------------------------------------------------------
    // Skeleton and fragment merge
    // ------------------------------------------------------------------

    fn build_skeleton<'f>(&mut self, repo: &'f RepositoryFact) -> Vec<(ProjectId, FileId, &'f CompilationUnitFact)> {
        let mut units = Vec::new();

        for solution in &repo.solutions {
            let sid = SolutionId(self.model.solutions.len() as u32);
            self.model.solutions.push(SolutionNode {
                id: sid,
                path: solution.path.clone(),
                projects: Vec::new(),
            });
            let mut members = Vec::new();

            for project in &solution.projects {
                let (pid, is_new) = match self.project_ids.get(&project.path) {
                    Some(&pid) => (pid, false),
                    None => {
                        let pid = ProjectId(self.model.projects.len() as u32);
                        self.model.projects.push(ProjectNode {
                            id: pid,
                            path: project.path.clone(),
                            name: project.name.clone(),
                            solutions: Vec::new(),
                            references: Vec::new(),
                            files: Vec::new(),
                            namespaces: Vec::new(),
                        });
                        self.project_ids.insert(project.path.clone(), pid);
                        (pid, true)
                    }
                };
                if !members.contains(&pid) {
                    members.push(pid);
                }
                let node = &mut self.model.projects[pid.index()];
                if !node.solutions.contains(&sid) {
                    node.solutions.push(sid);
                }
                if !is_new {
                    continue;
                }

                for unit in &project.compilation_units {
                    let fid = FileId(self.model.files.len() as u32);
                    self.model.files.push(FileNode {
                        id: fid,
                        path: unit.path.clone(),
                        project: pid,
                        types: Vec::new(),
                    });
                    units.push((pid, fid, unit));
                }
            }
            self.solution_members.push(members);
        }

        let to_ids = |indices: Vec<usize>| -> Vec<ProjectId> {
            indices
                .into_iter()
                .filter_map(|i| self.project_ids.get(&self.index.project(i).path).copied())
                .collect()
        };
        let mut direct = Vec::new();
        let mut reachable = Vec::new();
        for project in &self.model.projects {
            match self.index.project_index(&project.path) {
                Some(idx) => {
                    direct.push(to_ids(self.index.project(idx).references.clone()));
                    reachable.push(to_ids(self.index.reachable_projects(idx)));
                }
                None => {
                    direct.push(Vec::new());
                    reachable.push(Vec::new());
                }
            }
        }
        for (project, references) in self.model.projects.iter_mut().zip(direct) {
            project.references = references;
        }
        self.reachable = reachable;

        units
    }

    fn merge_fragments<'f>(
        &mut self,
        units: &[(ProjectId, FileId, &'f CompilationUnitFact)],
        diagnostics: &mut Diagnostics,
    ) -> Vec<Fragment<'f>> {
        let mut fragments = Vec::new();

        for &(pid, fid, unit) in units {
            for fact in &unit.types {
                if fact.name.trim().is_empty() {
                    diagnostics.warning(
                        DiagnosticKind::MalformedFact,
                        "skipping type declaration without a name",
                        self.context(pid, fid).with_name(fact.namespace.clone()),
                    );
                    continue;
                }

                let full_name = fact.full_name(&self.separator);
                let key = (pid, full_name.clone(), fact.is_partial);
                let type_id = match self.merged.get(&key) {
                    Some(&id) => id,
                    None => {
                        let id = self.declare_type(pid, fact, &full_name);
                        self.merged.insert(key, id);
                        id
                    }
                };

                let node = &mut self.model.types[type_id.index()];
                if !node.files.contains(&fid) {
                    node.files.push(fid);
                }
                self.model.files[fid.index()].types.push(type_id);
                fragments.push(Fragment {
                    type_id,
                    project: pid,
                    file: fid,
                    fact,
                });
            }
        }

        debug!(
            fragments = fragments.len(),
            types = self.model.types.len(),
            "fragments merged"
        );
        fragments
    }

    fn declare_type(&mut self, pid: ProjectId, fact: &TypeFact, full_name: &str) -> TypeId {
        let id = TypeId(self.model.types.len() as u32);
        let relative_name = fact.relative_name(&self.separator);
        let mut node = TypeNode::new(id, last_segment(&relative_name, &self.separator), full_name);
        node.kind = fact.kind;
        node.project = Some(pid);
        node.namespace = self.namespace_node(pid, &fact.namespace);
        node.is_partial = fact.is_partial;
        node.access_modifier = fact.access_modifier.clone();
        node.modifier = fact.modifier.clone();
        node.generic_parameters = fact.generic_parameters.clone();
        self.model.types.push(node);
        self.declared
            .entry(full_name.to_string())
            .or_default()
            .push((pid, id));
        id
    }

    /// Returns the namespace node of `namespace` in project `pid`, creating it
    /// and its ancestors on first use. The global namespace has no node.
    fn namespace_node(&mut self, pid: ProjectId, namespace: &str) -> Option<NamespaceId> {
        let namespace = namespace.trim();
        if namespace.is_empty() {
            return None;
        }

        let chain = self.index.namespaces().chain(namespace);
        let mut parent = None;
        for full_name in chain.iter().rev().filter(|n| !n.is_empty()) {
            let key = (pid, full_name.clone());
            let id = match self.namespace_ids.get(&key) {
                Some(&id) => id,
                None => {
                    let id = NamespaceId(self.model.namespaces.len() as u32);
                    let name = match self.index.namespaces().get(full_name) {
                        Some(k) => self.index.namespaces().entry(k).name.clone(),
                        None => last_segment(full_name, &self.separator).to_string(),
                    };
                    self.model.namespaces.push(NamespaceNode {
                        id,
                        name,
                        full_name: full_name.clone(),
                        project: pid,
                        parent,
                        children: Vec::new(),
                        types: Vec::new(),
                    });
                    self.namespace_ids.insert(key, id);
                    id
                }
            };
            parent = Some(id);
        }
        parent
    }

    fn link_nested_types(&mut self, fragments: &[Fragment<'_>]) {
        for fragment in fragments {
            let Some(outer) = fragment
                .fact
                .containing_type
                .as_deref()
                .filter(|o| !o.trim().is_empty())
            else {
                continue;
            };
            let outer_full = join_name(fragment.fact.namespace.trim(), outer, &self.separator);
            let outer_id = self.declared.get(&outer_full).and_then(|candidates| {
                candidates
                    .iter()
                    .find(|(p, _)| *p == fragment.project)
                    .map(|&(_, id)| id)
            });
            let node = &mut self.model.types[fragment.type_id.index()];
            if node.containing_type.is_none() {
                node.containing_type = outer_id;
            }
        }
    }

    // ------------------------------------------------------------------
    // Member materialization
    // ------------------------------------------------------------------

    fn materialize_members<'f>(
        &mut self,
        fragment: &Fragment<'f>,
        pending: &mut Vec<PendingCall<'f>>,
        diagnostics: &mut Diagnostics,
    ) {
        let fact = fragment.fact;
        let tid = fragment.type_id;
        let pid = fragment.project;
        let context = self.context(pid, fragment.file);
        let type_parameters = self.type_parameters_in_scope(tid, fact);

        for base in &fact.base_types {
            if base.name.trim().is_empty() {
                report_malformed(diagnostics, &context, "base type without a name", &fact.name);
                continue;
            }
            let link = self.link_type_ref(base, pid, &type_parameters);
            let node = &mut self.model.types[tid.index()];
            if !node.base_types.iter().any(|b| b.name == link.name) {
                node.base_types.push(link);
            }
        }

        let attributes = self.link_attributes(&fact.attributes, pid, &type_parameters);
        self.model.types[tid.index()].attributes.extend(attributes);

        for field in &fact.fields {
            if field.name.trim().is_empty() || field.type_ref.name.trim().is_empty() {
                report_malformed(diagnostics, &context, "incomplete field", &field.name);
                continue;
            }
            let id = FieldId(self.model.fields.len() as u32);
            let type_link = self.link_type_ref(&field.type_ref, pid, &type_parameters);
            let attributes = self.link_attributes(&field.attributes, pid, &type_parameters);
            self.model.fields.push(FieldNode {
                id,
                name: field.name.clone(),
                type_link,
                containing_type: tid,
                access_modifier: field.access_modifier.clone(),
                modifier: field.modifier.clone(),
                is_event: field.is_event,
                attributes,
            });
            self.model.types[tid.index()].fields.push(id);
        }

        for property in &fact.properties {
            if property.name.trim().is_empty() || property.type_ref.name.trim().is_empty() {
                report_malformed(diagnostics, &context, "incomplete property", &property.name);
                continue;
            }
            let id = PropertyId(self.model.properties.len() as u32);
            let type_link = self.link_type_ref(&property.type_ref, pid, &type_parameters);
            let attributes = self.link_attributes(&property.attributes, pid, &type_parameters);
            self.model.properties.push(PropertyNode {
                id,
                name: property.name.clone(),
                type_link,
                containing_type: tid,
                access_modifier: property.access_modifier.clone(),
                modifier: property.modifier.clone(),
                accessors: Vec::new(),
                attributes,
            });
            self.model.types[tid.index()].properties.push(id);

            let owner = MethodOwner {
                type_id: tid,
                kind: MethodKind::Accessor,
                containing_method: None,
                containing_property: Some(id),
            };
            for accessor in &property.accessors {
                if let Some(m) = self.materialize_method(
                    accessor,
                    owner,
                    pid,
                    &type_parameters,
                    &context,
                    pending,
                    diagnostics,
                ) {
                    self.model.properties[id.index()].accessors.push(m);
                }
            }
        }

        let groups = [
            (MethodKind::Method, fact.methods.as_slice()),
            (MethodKind::Constructor, fact.constructors.as_slice()),
            (MethodKind::Destructor, fact.destructor.as_slice()),
        ];
        for (kind, methods) in groups {
            let owner = MethodOwner {
                type_id: tid,
                kind,
                containing_method: None,
                containing_property: None,
            };
            for method in methods {
                // Only the first destructor across fragments is kept.
                if kind == MethodKind::Destructor && self.model.types[tid.index()].destructor.is_some() {
                    report_malformed(diagnostics, &context, "second destructor", &method.name);
                    continue;
                }
                let Some(m) = self.materialize_method(
                    method,
                    owner,
                    pid,
                    &type_parameters,
                    &context,
                    pending,
                    diagnostics,
                ) else {
                    continue;
                };
                let node = &mut self.model.types[tid.index()];
                match kind {
                    MethodKind::Constructor => node.constructors.push(m),
                    MethodKind::Destructor => node.destructor = Some(m),
                    _ => node.methods.push(m),
                }
            }
        }

        for metric in &fact.metrics {
            for (name, &count) in &metric.counts {
                if name.trim().is_empty() {
                    continue;
                }
                let link = self.link_parsed(&TypeName::parse(name), pid, &type_parameters);
                if let Some(target) = link.target {
                    self.add_relation(tid, metric.relation, target, count);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn materialize_method<'f>(
        &mut self,
        fact: &'f MethodFact,
        owner: MethodOwner,
        pid: ProjectId,
        type_parameters: &[String],
        context: &DiagnosticContext,
        pending: &mut Vec<PendingCall<'f>>,
        diagnostics: &mut Diagnostics,
    ) -> Option<MethodId> {
        if fact.name.trim().is_empty() {
            report_malformed(diagnostics, context, "method without a name", "");
            return None;
        }

        let mut type_parameters = type_parameters.to_vec();
        type_parameters.extend(fact.generic_parameters.iter().cloned());

        let id = MethodId(self.model.methods.len() as u32);
        let return_type = fact
            .return_type
            .as_ref()
            .filter(|r| !r.name.trim().is_empty())
            .map(|r| self.link_type_ref(r, pid, &type_parameters));
        let attributes = self.link_attributes(&fact.attributes, pid, &type_parameters);
        self.model.methods.push(MethodNode {
            id,
            name: fact.name.clone(),
            kind: owner.kind,
            containing_type: owner.type_id,
            containing_method: owner.containing_method,
            containing_property: owner.containing_property,
            access_modifier: fact.access_modifier.clone(),
            modifier: fact.modifier.clone(),
            generic_parameters: fact.generic_parameters.clone(),
            return_type,
            parameters: Vec::new(),
            local_variables: Vec::new(),
            local_functions: Vec::new(),
            calls: Vec::new(),
            attributes,
            cyclomatic_complexity: fact.cyclomatic_complexity,
            is_synthetic: false,
        });

        for param in &fact.parameters {
            if param.type_ref.name.trim().is_empty() {
                report_malformed(diagnostics, context, "parameter without a type", &param.name);
                continue;
            }
            let param_id = ParameterId(self.model.parameters.len() as u32);
            let type_link = self.link_type_ref(&param.type_ref, pid, &type_parameters);
            let attributes = self.link_attributes(&param.attributes, pid, &type_parameters);
            self.model.parameters.push(ParameterNode {
                id: param_id,
                name: param.name.clone(),
                type_link,
                containing_method: id,
                modifier: param.modifier.clone(),
                default_value: param.default_value.clone(),
                attributes,
            });
            self.model.methods[id.index()].parameters.push(param_id);
        }

        for local in &fact.local_variables {
            if local.type_ref.name.trim().is_empty() {
                report_malformed(diagnostics, context, "local variable without a type", &local.name);
                continue;
            }
            let local_id = LocalVariableId(self.model.local_variables.len() as u32);
            let type_link = self.link_type_ref(&local.type_ref, pid, &type_parameters);
            self.model.local_variables.push(LocalVariableNode {
                id: local_id,
                name: local.name.clone(),
                type_link,
                containing_method: id,
            });
            self.model.methods[id.index()].local_variables.push(local_id);
        }

        for call in &fact.called_methods {
            if call.name.trim().is_empty() {
                report_malformed(diagnostics, context, "call without a method name", &fact.name);
                continue;
            }
            pending.push(PendingCall {
                caller: id,
                project: pid,
                call,
            });
        }

        let local_owner = MethodOwner {
            type_id: owner.type_id,
            kind: MethodKind::LocalFunction,
            containing_method: Some(id),
            containing_property: None,
        };
        for local_function in &fact.local_functions {
            if let Some(f) = self.materialize_method(
                local_function,
                local_owner,
                pid,
                &type_parameters,
                context,
                pending,
                diagnostics,
            ) {
                self.model.methods[id.index()].local_functions.push(f);
            }
        }

        Some(id)
    }

    /// Generic parameters of the type and of every type enclosing it.
    fn type_parameters_in_scope(&self, tid: TypeId, fact: &TypeFact) -> Vec<String> {
        let mut parameters = fact.generic_parameters.clone();
        let mut current = self.model.types[tid.index()].containing_type;
        while let Some(outer) = current {
            let node = &self.model.types[outer.index()];
            parameters.extend(node.generic_parameters.iter().cloned());
            current = node.containing_type;
        }
        parameters
    }

    fn add_relation(&mut self, tid: TypeId, relation: RelationKind, target: TypeId, count: u32) {
        let relations = &mut self.model.types[tid.index()].relations;
        match relations
            .iter_mut()
            .find(|r| r.relation == relation && r.target == target)
        {
            Some(edge) => edge.count += count,
            None => relations.push(RelationEdge {
                relation,
                target,
                count,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Type links
    // ------------------------------------------------------------------

    fn link_attributes(
        &mut self,
        attributes: &[AttributeFact],
        pid: ProjectId,
        type_parameters: &[String],
    ) -> Vec<AttributeLink> {
        attributes
            .iter()
            .filter(|a| !a.type_ref.name.trim().is_empty())
            .map(|a| AttributeLink {
                type_link: self.link_type_ref(&a.type_ref, pid, type_parameters),
                target: a.target.clone(),
            })
            .collect()
    }

    fn link_type_ref(&mut self, type_ref: &TypeRef, pid: ProjectId, type_parameters: &[String]) -> TypeLink {
        let parsed = TypeName::parse(&type_ref.full_name());
        self.link_parsed(&parsed, pid, type_parameters)
    }

    fn link_parsed(&mut self, parsed: &TypeName, pid: ProjectId, type_parameters: &[String]) -> TypeLink {
        let generic_arguments = parsed
            .args
            .iter()
            .map(|a| self.link_parsed(a, pid, type_parameters))
            .collect();
        let is_type_parameter = !parsed.is_generic() && type_parameters.contains(&parsed.base);
        let target = if parsed.base.is_empty() || is_type_parameter {
            None
        } else {
            Some(self.type_for(&parsed.base, pid))
        };
        TypeLink {
            name: parsed.render(),
            target,
            generic_arguments,
        }
    }

    /// Links without creating anything: declared types and already
    /// registered external types only.
    fn existing_link(&self, parsed: &TypeName, pid: ProjectId) -> TypeLink {
        TypeLink {
            name: parsed.render(),
            target: self
                .lookup_declared(&parsed.base, pid)
                .or_else(|| self.registry.get(&parsed.base)),
            generic_arguments: parsed
                .args
                .iter()
                .map(|a| self.existing_link(a, pid))
                .collect(),
        }
    }

    /// The declared type named `full_name` as seen from project `pid`, or
    /// the synthetic external type of that name.
    fn type_for(&mut self, full_name: &str, pid: ProjectId) -> TypeId {
        match self.lookup_declared(full_name, pid) {
            Some(id) => id,
            None => self
                .registry
                .get_or_create(&mut self.model, full_name, &self.separator),
        }
    }

    /// Own project first, then referenced projects breadth first, then any
    /// project if the fallback policy allows it.
    fn lookup_declared(&self, full_name: &str, pid: ProjectId) -> Option<TypeId> {
        let candidates = self.declared.get(full_name)?;
        if let Some(&(_, id)) = candidates.iter().find(|(p, _)| *p == pid) {
            return Some(id);
        }
        for reachable in &self.reachable[pid.index()] {
            if let Some(&(_, id)) = candidates.iter().find(|(p, _)| p == reachable) {
                return Some(id);
            }
        }
        if self.index.allows_global(self.fallback) {
            return candidates.first().map(|&(_, id)| id);
        }
        None
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    fn resolve_call(&mut self, pending: &PendingCall<'_>, diagnostics: &mut Diagnostics) {
        let call = pending.call;
        let caller_type = self.model.methods[pending.caller.index()].containing_type;
        let owner_name = TypeName::parse(&call.containing_type);
        let owner = if owner_name.base.is_empty() {
            caller_type
        } else {
            self.type_for(&owner_name.base, pending.project)
        };
        let params: Vec<String> = call
            .parameter_types
            .iter()
            .map(|p| TypeName::parse(&p.full_name()).render())
            .collect();

        let target = if self.model.types[owner.index()].is_external {
            Some(self.synthetic_method(owner, &call.name, &params, pending.project))
        } else {
            self.find_method(owner, &call.name, &params)
        };

        if target.is_none() {
            let owner_full = self.model.types[owner.index()].full_name.clone();
            let caller = &self.model.types[caller_type.index()];
            let mut context = DiagnosticContext::project(&self.model.projects[pending.project.index()].path)
                .with_name(format!("{}{}{}", owner_full, self.separator, call.name));
            context.file_path = caller
                .files
                .first()
                .map(|f| self.model.files[f.index()].path.clone());
            diagnostics.info(
                DiagnosticKind::UnresolvedCall,
                format!(
                    "no overload of '{}{}{}({})' matches the call",
                    owner_full,
                    self.separator,
                    call.name,
                    params.join(", ")
                ),
                context,
            );
        }

        self.model.methods[pending.caller.index()]
            .calls
            .push(CallEdge { target });
    }

    /// Searches the owner and then its declared base types, breadth first,
    /// for a method or constructor with this exact signature.
    fn find_method(&self, owner: TypeId, name: &str, params: &[String]) -> Option<MethodId> {
        let mut queue = VecDeque::from([owner]);
        let mut seen: HashSet<TypeId> = HashSet::new();

        while let Some(tid) = queue.pop_front() {
            if !seen.insert(tid) {
                continue;
            }
            let node = &self.model.types[tid.index()];
            if node.is_external {
                continue;
            }
            if let Some(&m) = node
                .methods
                .iter()
                .chain(node.constructors.iter())
                .find(|&&m| self.signature_matches(m, name, params))
            {
                return Some(m);
            }
            queue.extend(node.base_types.iter().filter_map(|b| b.target));
        }
        None
    }

    fn signature_matches(&self, method: MethodId, name: &str, params: &[String]) -> bool {
        let node = &self.model.methods[method.index()];
        node.name == name
            && node.parameters.len() == params.len()
            && node
                .parameters
                .iter()
                .zip(params)
                .all(|(p, expected)| self.model.parameters[p.index()].type_link.name == *expected)
    }

    /// Returns the method of an external type matching the signature,
    /// synthesizing it on first reference.
    fn synthetic_method(&mut self, owner: TypeId, name: &str, params: &[String], pid: ProjectId) -> MethodId {
        if let Some(&m) = self.model.types[owner.index()]
            .methods
            .iter()
            .find(|&&m| self.signature_matches(m, name, params))
        {
            return m;
        }

        let id = MethodId(self.model.methods.len() as u32);
        self.model.methods.push(MethodNode {
            id,
            name: name.to_string(),
            kind: MethodKind::Method,
            containing_type: owner,
            containing_method: None,
            containing_property: None,
            access_modifier: String::new(),
            modifier: String::new(),
            generic_parameters: Vec::new(),
            return_type: None,
            parameters: Vec::new(),
            local_variables: Vec::new(),
            local_functions: Vec::new(),
            calls: Vec::new(),
            attributes: Vec::new(),
            cyclomatic_complexity: 0,
            is_synthetic: true,
        });

        for param in params {
            let param_id = ParameterId(self.model.parameters.len() as u32);
            let type_link = self.existing_link(&TypeName::parse(param), pid);
            self.model.parameters.push(ParameterNode {
                id: param_id,
                name: String::new(),
                type_link,
                containing_method: id,
                modifier: String::new(),
                default_value: None,
                attributes: Vec::new(),
            });
            self.model.methods[id.index()].parameters.push(param_id);
        }

        self.model.types[owner.index()].methods.push(id);
        debug!(
            owner = self.model.types[owner.index()].full_name.as_str(),
            method = name,
            "synthesized external method"
        );
        id
    }

    // ------------------------------------------------------------------
    // Containment
    // ------------------------------------------------------------------

    fn wire_containment(&mut self) {
        let model = &mut self.model;
        model.repository.solutions = model.solutions.iter().map(|s| s.id).collect();

        for (solution, members) in model.solutions.iter_mut().zip(self.solution_members.drain(..)) {
            solution.projects = members;
        }

        for i in 0..model.files.len() {
            let file = &model.files[i];
            let (project, id) = (file.project, file.id);
            model.projects[project.index()].files.push(id);
        }

        for i in 0..model.namespaces.len() {
            let namespace = &model.namespaces[i];
            let (id, parent, project) = (namespace.id, namespace.parent, namespace.project);
            match parent {
                Some(parent) => model.namespaces[parent.index()].children.push(id),
                None => model.projects[project.index()].namespaces.push(id),
            }
        }

        for i in 0..model.types.len() {
            let node = &model.types[i];
            let (id, namespace, outer) = (node.id, node.namespace, node.containing_type);
            match (outer, namespace) {
                (Some(outer), _) => model.types[outer.index()].nested_types.push(id),
                (None, Some(namespace)) => model.namespaces[namespace.index()].types.push(id),
                (None, None) => {}
            }
        }
    }

    fn context(&self, pid: ProjectId, fid: FileId) -> DiagnosticContext {
        DiagnosticContext::file(
            &self.model.projects[pid.index()].path,
            &self.model.files[fid.index()].path,
        )
    }
}

fn report_malformed(diagnostics: &mut Diagnostics, context: &DiagnosticContext, what: &str, name: &str) {
    diagnostics.warning(
        DiagnosticKind::MalformedFact,
        format!("skipping {what} '{name}'"),
        context.clone().with_name(name),
    );
}
