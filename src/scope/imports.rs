use crate::types::{ImportFact, ImportKind};

/// One visible import of a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    pub kind: ImportKind,
    pub source_name: String,
    pub alias_name: Option<String>,
}

/// The ordered import directives of one compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportTable {
    entries: Vec<ImportEntry>,
}

impl ImportTable {
    /// Builds the table from the unit's import facts, keeping declaration
    /// order. Returns the table and the facts that were dropped because they
    /// lack a source name or a required alias.
    pub fn from_facts(facts: &[ImportFact]) -> (Self, Vec<&ImportFact>) {
        let mut entries = Vec::with_capacity(facts.len());
        let mut rejected = Vec::new();

        for fact in facts {
            let source_name = fact.source_name.trim();
            let alias_name = fact
                .alias_name
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty());
            let needs_alias = matches!(fact.kind, ImportKind::NamespaceAlias | ImportKind::TypeAlias);

            if source_name.is_empty() || (needs_alias && alias_name.is_none()) {
                rejected.push(fact);
                continue;
            }

            entries.push(ImportEntry {
                kind: fact.kind,
                source_name: source_name.to_string(),
                alias_name: alias_name.map(str::to_string),
            });
        }

        (Self { entries }, rejected)
    }

    pub fn entries(&self) -> &[ImportEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The type alias named `alias`. The last declaration wins.
    pub fn type_alias(&self, alias: &str) -> Option<&ImportEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.kind == ImportKind::TypeAlias && e.alias_name.as_deref() == Some(alias))
    }

    pub fn type_aliases(&self) -> impl Iterator<Item = &ImportEntry> {
        self.of_kind(ImportKind::TypeAlias)
    }

    pub fn namespace_aliases(&self) -> impl Iterator<Item = &ImportEntry> {
        self.of_kind(ImportKind::NamespaceAlias)
    }

    pub fn plain_imports(&self) -> impl Iterator<Item = &ImportEntry> {
        self.of_kind(ImportKind::Plain)
    }

    pub fn static_imports(&self) -> impl Iterator<Item = &ImportEntry> {
        self.of_kind(ImportKind::StaticMember)
    }

    fn of_kind(&self, kind: ImportKind) -> impl Iterator<Item = &ImportEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }
}
