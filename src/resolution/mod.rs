//! Name resolution module.
//!
//! Rewrites every short type name occurring in a fact model into a
//! fully-qualified name, using the scope index built from the same model.
mod generic;
mod resolver;

pub use generic::TypeName;
pub use resolver::{NameResolver, Resolution, ResolutionScope, ResolutionTier};
