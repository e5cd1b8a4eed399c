//! Scope index construction.
//!
//! Builds the repository namespace tree, the per-file import tables, the
//! declared-type index and the project reference graph the resolver and
//! linker look names up in.
mod imports;
mod index;
mod namespace_tree;

pub use imports::{ImportEntry, ImportTable};
pub use index::{last_segment, DeclaredType, ProjectEntry, ScopeIndex};
pub use namespace_tree::{NamespaceEntry, NamespaceKey, NamespaceTree};
