//! Module-level metadata for one compiled binary unit.

use std::sync::Arc;

use crate::metadata::types::{TypeList, TypeRc};

/// Reference-counted handle to a [`Module`].
pub type ModuleRc = Arc<Module>;

/// One compiled binary module in the tracked set.
///
/// A module exposes an identity (its name) and the tree of top-level type
/// declarations the loader collected from it. Nested types hang off their
/// declaring [`crate::metadata::TypeDef`], not off the module.
pub struct Module {
    /// Module identity, unique within the tracked set.
    pub name: String,
    /// Top-level types declared in this module, in metadata order.
    pub types: TypeList,
}

impl Module {
    /// Create an empty module with the given identity.
    ///
    /// The loader appends top-level types through the shared [`TypeList`]
    /// after creation.
    #[must_use]
    pub fn new(name: &str) -> ModuleRc {
        Arc::new(Module {
            name: name.to_string(),
            types: Arc::new(boxcar::Vec::new()),
        })
    }

    /// Append a top-level type to this module.
    pub fn push_type(&self, ty: TypeRc) {
        self.types.push(ty);
    }
}
