use std::collections::HashMap;

use tracing::debug;

use crate::linking::model::{ReferenceModel, TypeId, TypeNode};
use crate::scope::last_segment;

/// Repository-wide registry of synthetic types, keyed by full name.
///
/// The linker is the only writer: every insertion goes through
/// [`ExternalRegistry::get_or_create`], so a name is never registered twice.
#[derive(Debug, Default)]
pub(crate) struct ExternalRegistry {
    by_name: HashMap<String, TypeId>,
}

impl ExternalRegistry {
    pub fn get(&self, full_name: &str) -> Option<TypeId> {
        self.by_name.get(full_name).copied()
    }

    /// Returns the synthetic type for `full_name`, creating and registering
    /// it in `model.created_classes` on first use.
    pub fn get_or_create(&mut self, model: &mut ReferenceModel, full_name: &str, separator: &str) -> TypeId {
        if let Some(id) = self.get(full_name) {
            return id;
        }

        let id = TypeId(model.types.len() as u32);
        let mut node = TypeNode::new(id, last_segment(full_name, separator), full_name);
        node.is_external = true;
        model.types.push(node);
        model.created_classes.push(id);
        self.by_name.insert(full_name.to_string(), id);

        debug!(name = full_name, "created external type");
        id
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }
}
