use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Only three conditions abort an indexing run; everything else the extraction
/// algorithm encounters (unrecognized call shapes, untracked members, delegate
/// mutation idioms that match no known pattern) is a deliberate "do not record"
/// outcome and never surfaces as an error.
///
/// # Error Categories
///
/// ## Classification Errors
/// - [`Error::UnknownTypeCategory`] - A type fits none of the known structural categories
/// - [`Error::UnknownMethodSemantics`] - A method carries an unrecognized accessor-semantics value
///
/// ## Integration Errors
/// - [`Error::ModuleNotFound`] - A changed-flag update referenced a module the index never saw
#[derive(Error, Debug)]
pub enum Error {
    /// A type declaration could not be classified as struct, delegate, class, enum or interface.
    ///
    /// The classifier is exhaustive over the categories the weaving engine understands;
    /// reaching this variant means the module metadata describes a shape the engine
    /// cannot represent, and the whole indexing pass is aborted.
    ///
    /// # Fields
    ///
    /// * `type_name` - Fully qualified name of the offending type
    #[error("Cannot determine the structural category of type '{type_name}'")]
    UnknownTypeCategory {
        /// Fully qualified name of the type that failed classification
        type_name: String,
    },

    /// A method's declared accessor-semantics value is not getter, setter, add, remove or none.
    ///
    /// Raised while classifying method roles in phase 1 and while resolving call
    /// targets in phase 2. The raw semantics word is preserved for diagnostics.
    ///
    /// # Fields
    ///
    /// * `method_name` - Fully qualified name of the offending method
    /// * `raw` - The raw semantics flag word that failed classification
    #[error("Method '{method_name}' has unrecognized accessor semantics (0x{raw:04X})")]
    UnknownMethodSemantics {
        /// Fully qualified name of the method that failed classification
        method_name: String,
        /// The unrecognized raw semantics value
        raw: u16,
    },

    /// No indexed module matches the identity of the joinpoint passed to
    /// [`crate::joinpoint::JoinpointContainer::mark_module_changed`].
    ///
    /// This signals a caller bug in the weaving engine, not a data problem:
    /// every joinpoint handed out by the container belongs to a module the
    /// container indexed in phase 1.
    #[error("No indexed module with identity '{module}'")]
    ModuleNotFound {
        /// Identity of the module that was not found
        module: String,
    },
}

/// Specialized `Result` type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
