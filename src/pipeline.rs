use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{should_include_unit, LinkConfig};
use crate::diagnostics::Diagnostics;
use crate::errors::{CodeLinkError, Result};
use crate::linking::{ReferenceLinker, ReferenceModel};
use crate::resolution::NameResolver;
use crate::scope::ScopeIndex;
use crate::types::RepositoryFact;

/// Central orchestrator: scope index, name resolution, then linking.
pub struct CodeLink {
    config: LinkConfig,
}

/// Result of one linking run.
#[derive(Debug, Serialize)]
pub struct LinkOutput {
    pub model: ReferenceModel,
    pub diagnostics: Diagnostics,
}

impl CodeLink {
    pub fn new(config: LinkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Links a fact model into a reference model.
    ///
    /// Compilation units rejected by the include/exclude globs are dropped
    /// first. Nothing here fails: every problem found in the input ends up
    /// in the returned diagnostics.
    pub fn run(&self, repo: &RepositoryFact) -> LinkOutput {
        let start = Instant::now();
        let mut diagnostics = Diagnostics::new();

        let filtered = self.filter_units(repo);
        if filtered.is_empty() {
            info!("fact model is empty, nothing to link");
            return LinkOutput {
                model: ReferenceModel::default(),
                diagnostics,
            };
        }

        let separator = self.config.separator.as_str();
        let index = ScopeIndex::build(&filtered, separator, &mut diagnostics);
        debug!(
            projects = index.project_count(),
            declarations = index.declarations().len(),
            namespaces = index.namespaces().len(),
            "scope index built"
        );

        let resolver = NameResolver::new(&index, self.config.fallback);
        let resolved = resolver.resolve_repository(&filtered, self.config.parallel, &mut diagnostics);

        let model = ReferenceLinker::new(&index, self.config.fallback).link(&resolved, &mut diagnostics);

        diagnostics.log();
        info!(
            types = model.types().len(),
            methods = model.methods().len(),
            diagnostics = diagnostics.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "link complete"
        );
        LinkOutput { model, diagnostics }
    }

    fn filter_units(&self, repo: &RepositoryFact) -> RepositoryFact {
        let mut filtered = repo.clone();
        let mut dropped = 0usize;
        for project in filtered.solutions.iter_mut().flat_map(|s| s.projects.iter_mut()) {
            let before = project.compilation_units.len();
            project
                .compilation_units
                .retain(|unit| should_include_unit(&unit.path, &self.config));
            dropped += before - project.compilation_units.len();
        }
        if dropped > 0 {
            debug!(dropped, "compilation units excluded by config");
        }
        filtered
    }
}

/// Reads a fact model from a JSON file.
pub fn load_fact_model(path: &Path) -> Result<RepositoryFact> {
    let content = std::fs::read_to_string(path).map_err(|e| CodeLinkError::File {
        message: format!("failed to read fact model: {e}"),
        path: path.display().to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| CodeLinkError::Parse {
        message: format!("invalid fact model: {e}"),
        path: path.display().to_string(),
    })
}
