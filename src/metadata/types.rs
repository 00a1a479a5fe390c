//! Type declarations, structural classification, and weak type references.
//!
//! [`TypeDef`] is the loader-materialized form of one type declaration. The
//! structural classifier ([`TypeDef::kind`]) buckets a declaration into exactly
//! one of the categories the weaving engine understands, driven by the
//! interface attribute and the *immediate* base type only; deeper ancestor
//! chains are never walked.

use std::sync::{Arc, Weak};

use bitflags::bitflags;
use strum::Display;

use crate::{
    metadata::member::{EventRc, FieldRc, MethodRc, PropertyRc},
    Error, Result,
};

/// Reference-counted handle to a [`TypeDef`].
pub type TypeRc = Arc<TypeDef>;

/// Append-only list of strong type references.
pub type TypeList = Arc<boxcar::Vec<TypeRc>>;

/// Well-known base type name marking enum declarations.
pub const BASE_ENUM: &str = "System.Enum";
/// Well-known base type name marking value type (struct) declarations.
pub const BASE_VALUE_TYPE: &str = "System.ValueType";
/// Well-known base type name marking delegate declarations.
pub const BASE_MULTICAST_DELEGATE: &str = "System.MulticastDelegate";
/// Well-known base type name of the abstract delegate root.
pub const BASE_DELEGATE: &str = "System.Delegate";
/// Name of the per-module pseudo-type holding global fields and methods.
pub const MODULE_PSEUDO_TYPE: &str = "<Module>";

bitflags! {
    /// Raw attribute bits the loader preserves from the type declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TypeAttributes: u32 {
        /// The declaration is an interface.
        const INTERFACE = 0x0020;
        /// The declaration is abstract.
        const ABSTRACT = 0x0080;
        /// The declaration is sealed.
        const SEALED = 0x0100;
        /// The name has special meaning to the runtime.
        const SPECIAL_NAME = 0x0400;
    }
}

/// Structural category of a type declaration.
///
/// Every indexed type falls into exactly one category; see [`TypeDef::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TypeKind {
    /// Plain reference type.
    Class,
    /// Interface declaration.
    Interface,
    /// Enumeration (immediate base `System.Enum`).
    Enum,
    /// Value type (immediate base `System.ValueType`).
    Struct,
    /// Delegate type (immediate base `System.MulticastDelegate` or `System.Delegate`).
    Delegate,
}

/// A smart reference to a [`TypeDef`] that holds the target weakly, breaking
/// reference cycles through base types, declaring types and member signatures.
///
/// Accessors return `None` once the target has been dropped; the loader keeps
/// every declaration of the tracked set (and the well-known external bases)
/// alive for the duration of an indexing run.
#[derive(Clone)]
pub struct TypeRef {
    weak_ref: Weak<TypeDef>,
}

impl TypeRef {
    /// Create a new `TypeRef` from a strong reference.
    #[must_use]
    pub fn new(strong_ref: &TypeRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the type, returning `None` if it has been dropped.
    #[must_use]
    pub fn upgrade(&self) -> Option<TypeRc> {
        self.weak_ref.upgrade()
    }

    /// Check if the referenced type is still alive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Get the simple name of the referenced type (if still alive).
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.upgrade().map(|t| t.name.clone())
    }

    /// Get the full name of the referenced type (if still alive).
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        self.upgrade().map(|t| t.full_name())
    }
}

/// One type declaration as materialized by the loader.
pub struct TypeDef {
    /// Simple type name without namespace.
    pub name: String,
    /// Declaring namespace; empty for the global namespace and nested types.
    pub namespace: String,
    /// Raw declaration attributes.
    pub attributes: TypeAttributes,
    /// Immediate base type, if any.
    pub base: Option<TypeRef>,
    /// Declaring type for nested declarations.
    pub declaring: Option<TypeRef>,
    /// Nested type declarations.
    pub nested_types: TypeList,
    /// Field declarations, in metadata order.
    pub fields: Arc<boxcar::Vec<FieldRc>>,
    /// Method declarations, in metadata order.
    pub methods: Arc<boxcar::Vec<MethodRc>>,
    /// Property declarations, in metadata order.
    pub properties: Arc<boxcar::Vec<PropertyRc>>,
    /// Event declarations, in metadata order.
    pub events: Arc<boxcar::Vec<EventRc>>,
    /// Whether the declaration was synthesized by a compiler.
    pub compiler_generated: bool,
}

impl TypeDef {
    /// Create a new type declaration with empty member lists.
    ///
    /// The loader appends members through the shared lists after creation so
    /// member back-references to the declaring type stay valid.
    #[must_use]
    pub fn new(
        namespace: &str,
        name: &str,
        attributes: TypeAttributes,
        base: Option<TypeRef>,
        declaring: Option<TypeRef>,
        compiler_generated: bool,
    ) -> TypeRc {
        Arc::new(TypeDef {
            name: name.to_string(),
            namespace: namespace.to_string(),
            attributes,
            base,
            declaring,
            nested_types: Arc::new(boxcar::Vec::new()),
            fields: Arc::new(boxcar::Vec::new()),
            methods: Arc::new(boxcar::Vec::new()),
            properties: Arc::new(boxcar::Vec::new()),
            events: Arc::new(boxcar::Vec::new()),
            compiler_generated,
        })
    }

    /// Fully qualified name: `Namespace.Name`, or `Declaring/Name` for nested types.
    #[must_use]
    pub fn full_name(&self) -> String {
        if let Some(declaring) = &self.declaring {
            if let Some(outer) = declaring.full_name() {
                return format!("{}/{}", outer, self.name);
            }
        }
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Classify this declaration into exactly one structural category.
    ///
    /// Interfaces are recognized from the attribute bits; the remaining
    /// categories from the immediate base type name. A non-interface
    /// declaration without a base (other than the object root itself) fits no
    /// known category.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTypeCategory`] when the declaration matches
    /// none of the known structural categories.
    pub fn kind(&self) -> Result<TypeKind> {
        if self.attributes.contains(TypeAttributes::INTERFACE) {
            return Ok(TypeKind::Interface);
        }
        match &self.base {
            Some(base) => Ok(match base.full_name().as_deref() {
                Some(BASE_ENUM) => TypeKind::Enum,
                Some(BASE_VALUE_TYPE) => TypeKind::Struct,
                Some(BASE_MULTICAST_DELEGATE | BASE_DELEGATE) => TypeKind::Delegate,
                _ => TypeKind::Class,
            }),
            None if self.full_name() == "System.Object" => Ok(TypeKind::Class),
            None => Err(Error::UnknownTypeCategory {
                type_name: self.full_name(),
            }),
        }
    }

    /// Whether this declaration is a delegate type.
    ///
    /// Unlike [`TypeDef::kind`] this never fails; unresolvable bases simply
    /// read as "not a delegate".
    #[must_use]
    pub fn is_delegate(&self) -> bool {
        self.base
            .as_ref()
            .and_then(TypeRef::full_name)
            .is_some_and(|n| n == BASE_MULTICAST_DELEGATE || n == BASE_DELEGATE)
    }

    /// Whether this is the `<Module>` pseudo-type carrying global members.
    #[must_use]
    pub fn is_module_type(&self) -> bool {
        self.name == MODULE_PSEUDO_TYPE
    }

    /// Look up an event declared on this type by name.
    #[must_use]
    pub fn event_named(&self, name: &str) -> Option<EventRc> {
        self.events
            .iter()
            .map(|(_, e)| e)
            .find(|e| e.name == name)
            .cloned()
    }
}
