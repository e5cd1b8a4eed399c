/// Graph traversal over the linked reference model.
pub mod traversal;

pub use traversal::{ModelNode, ModelTraverser};
