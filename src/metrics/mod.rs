//! Aggregates computed over a linked [`crate::linking::ReferenceModel`].
pub mod complexity;
pub mod relations;

pub use complexity::{file_complexity, project_complexity, type_complexity, CyclomaticSummary};
pub use relations::derive_relations;
