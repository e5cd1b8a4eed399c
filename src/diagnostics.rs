//! Diagnostics collected while indexing, resolving and linking.
//!
//! The collector is a plain value threaded through the passes and handed
//! back to the caller. It never influences control flow.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Several candidates at the same scope or import tier.
    AmbiguousName,
    /// Several candidates found by the cross-project fallback scan.
    FallbackAmbiguity,
    /// A namespace string that could not be split into segments.
    MalformedNamespace,
    /// A partially filled declaration that was skipped.
    MalformedFact,
    /// A project reference naming a path that is not in the repository.
    MissingProjectReference,
    /// A call whose owner is known but has no matching overload.
    UnresolvedCall,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::AmbiguousName => "ambiguous_name",
            DiagnosticKind::FallbackAmbiguity => "fallback_ambiguity",
            DiagnosticKind::MalformedNamespace => "malformed_namespace",
            DiagnosticKind::MalformedFact => "malformed_fact",
            DiagnosticKind::MissingProjectReference => "missing_project_reference",
            DiagnosticKind::UnresolvedCall => "unresolved_call",
        }
    }
}

/// Where a diagnostic came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// The name (short name, member name or namespace) the diagnostic is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Candidate full names, in discovery order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
}

impl DiagnosticContext {
    pub fn project(path: &str) -> Self {
        Self {
            project_path: Some(path.to_string()),
            ..Default::default()
        }
    }

    pub fn file(project_path: &str, file_path: &str) -> Self {
        Self {
            project_path: Some(project_path.to_string()),
            file_path: Some(file_path.to_string()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.candidates = candidates;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub context: DiagnosticContext,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        kind: DiagnosticKind,
        message: impl Into<String>,
        context: DiagnosticContext,
    ) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
            context,
        }
    }
}

/// Accumulates diagnostics in the order they were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn info(&mut self, kind: DiagnosticKind, message: impl Into<String>, context: DiagnosticContext) {
        self.push(Diagnostic::new(Severity::Info, kind, message, context));
    }

    pub fn warning(
        &mut self,
        kind: DiagnosticKind,
        message: impl Into<String>,
        context: DiagnosticContext,
    ) {
        self.push(Diagnostic::new(Severity::Warning, kind, message, context));
    }

    /// Appends every diagnostic of `other`, preserving its order.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of diagnostics with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> Vec<&Diagnostic> {
        self.entries.iter().filter(|d| d.kind == kind).collect()
    }

    /// Emits every diagnostic through `tracing` at the matching level.
    pub fn log(&self) {
        for d in &self.entries {
            let file = d.context.file_path.as_deref().unwrap_or("-");
            match d.severity {
                Severity::Info => tracing::debug!(kind = d.kind.as_str(), file, "{}", d.message),
                Severity::Warning => tracing::warn!(kind = d.kind.as_str(), file, "{}", d.message),
                Severity::Error => tracing::error!(kind = d.kind.as_str(), file, "{}", d.message),
            }
        }
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
