use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Handle of a namespace in a [`NamespaceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamespaceKey(usize);

impl NamespaceKey {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One namespace: its last segment, its full dotted name and its links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceEntry {
    pub name: String,
    pub full_name: String,
    pub parent: Option<NamespaceKey>,
    pub children: Vec<NamespaceKey>,
}

/// Repository-wide namespace containment tree.
///
/// The root is the global namespace (empty name). Inserting `A.B.C` creates
/// and links `A`, `A.B` and `A.B.C` as needed.
#[derive(Debug, Clone)]
pub struct NamespaceTree {
    separator: String,
    entries: Vec<NamespaceEntry>,
    by_name: HashMap<String, NamespaceKey>,
}

impl NamespaceTree {
    pub fn new(separator: &str) -> Self {
        let root = NamespaceEntry {
            name: String::new(),
            full_name: String::new(),
            parent: None,
            children: Vec::new(),
        };
        let mut by_name = HashMap::new();
        by_name.insert(String::new(), NamespaceKey(0));
        Self {
            separator: separator.to_string(),
            entries: vec![root],
            by_name,
        }
    }

    pub fn root(&self) -> NamespaceKey {
        NamespaceKey(0)
    }

    /// Returns `true` if every segment of `full_name` is non-empty.
    pub fn is_well_formed(&self, full_name: &str) -> bool {
        full_name.is_empty()
            || full_name
                .split(self.separator.as_str())
                .all(|segment| !segment.trim().is_empty())
    }

    /// Inserts a namespace and all of its ancestors, returning its key.
    ///
    /// A malformed name is stored as one opaque segment below the root. The
    /// second element of the result is `false` in that case.
    pub fn insert(&mut self, full_name: &str) -> (NamespaceKey, bool) {
        let full_name = full_name.trim();
        if let Some(&key) = self.by_name.get(full_name) {
            return (key, self.is_well_formed(full_name));
        }

        if !self.is_well_formed(full_name) {
            let key = self.attach(self.root(), full_name, full_name);
            return (key, false);
        }

        let mut current = self.root();
        let mut prefix = String::new();
        let separator = self.separator.clone();
        for segment in full_name.split(separator.as_str()) {
            if !prefix.is_empty() {
                prefix.push_str(&separator);
            }
            prefix.push_str(segment);
            current = match self.by_name.get(&prefix) {
                Some(&key) => key,
                None => self.attach(current, segment, &prefix),
            };
        }
        (current, true)
    }

    fn attach(&mut self, parent: NamespaceKey, name: &str, full_name: &str) -> NamespaceKey {
        let key = NamespaceKey(self.entries.len());
        self.entries.push(NamespaceEntry {
            name: name.to_string(),
            full_name: full_name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.entries[parent.0].children.push(key);
        self.by_name.insert(full_name.to_string(), key);
        key
    }

    pub fn get(&self, full_name: &str) -> Option<NamespaceKey> {
        self.by_name.get(full_name.trim()).copied()
    }

    pub fn entry(&self, key: NamespaceKey) -> &NamespaceEntry {
        &self.entries[key.0]
    }

    /// Full names from `full_name` up to the global namespace, innermost first.
    ///
    /// Namespaces that were never inserted are walked by splitting on the
    /// separator.
    pub fn chain(&self, full_name: &str) -> Vec<String> {
        if let Some(key) = self.get(full_name) {
            let mut chain = Vec::new();
            let mut current = Some(key);
            while let Some(k) = current {
                let entry = self.entry(k);
                chain.push(entry.full_name.clone());
                current = entry.parent;
            }
            return chain;
        }

        let mut chain = Vec::new();
        let mut name = full_name.trim().to_string();
        while !name.is_empty() {
            chain.push(name.clone());
            name = match name.rfind(self.separator.as_str()) {
                Some(pos) => name[..pos].to_string(),
                None => String::new(),
            };
        }
        chain.push(String::new());
        chain
    }

    /// Number of namespaces, including the global one.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Iterates over all namespaces in insertion order, root first.
    pub fn iter(&self) -> impl Iterator<Item = (NamespaceKey, &NamespaceEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (NamespaceKey(i), e))
    }
}
