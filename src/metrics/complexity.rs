use serde::{Deserialize, Serialize};

use crate::linking::{FileId, ProjectId, ReferenceModel, TypeId};

/// Cyclomatic complexity statistics over a set of methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CyclomaticSummary {
    pub max: u32,
    pub min: u32,
    pub sum: u32,
    /// Integer average, truncated.
    pub avg: u32,
}

impl CyclomaticSummary {
    /// Returns `None` for an empty slice.
    pub fn from_values(values: &[u32]) -> Option<Self> {
        let max = *values.iter().max()?;
        let min = *values.iter().min()?;
        let total: u64 = values.iter().map(|&v| u64::from(v)).sum();
        let avg = total / values.len() as u64;
        Some(Self {
            max,
            min,
            sum: u32::try_from(total).unwrap_or(u32::MAX),
            avg: avg as u32,
        })
    }
}

/// Complexity of every method declared by a type: methods, constructors,
/// the destructor, property accessors and local functions. Synthesized
/// methods of external types carry no complexity and are ignored.
pub fn type_complexity(model: &ReferenceModel, type_id: TypeId) -> Option<CyclomaticSummary> {
    CyclomaticSummary::from_values(&complexities(model, &[type_id]))
}

/// Complexity of the methods of every type declared in a file. A partial
/// type contributes all of its methods to each file holding a fragment.
pub fn file_complexity(model: &ReferenceModel, file_id: FileId) -> Option<CyclomaticSummary> {
    let mut types: Vec<TypeId> = Vec::new();
    for &t in &model.file(file_id).types {
        if !types.contains(&t) {
            types.push(t);
        }
    }
    CyclomaticSummary::from_values(&complexities(model, &types))
}

pub fn project_complexity(model: &ReferenceModel, project_id: ProjectId) -> Option<CyclomaticSummary> {
    let types: Vec<TypeId> = model
        .types()
        .iter()
        .filter(|t| t.project == Some(project_id))
        .map(|t| t.id)
        .collect();
    CyclomaticSummary::from_values(&complexities(model, &types))
}

fn complexities(model: &ReferenceModel, types: &[TypeId]) -> Vec<u32> {
    model
        .methods()
        .iter()
        .filter(|m| !m.is_synthetic && types.contains(&m.containing_type))
        .map(|m| m.cyclomatic_complexity)
        .collect()
}
