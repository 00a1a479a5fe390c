//! Member declarations: fields, properties, events, and methods.
//!
//! Methods carry their raw accessor-semantics word plus the association the
//! loader resolved for it; [`Method::accessor_semantics`] is the capability the
//! extraction algorithm consumes to decide whether a method is a property
//! accessor, an event accessor, or neither.

use std::sync::{Arc, OnceLock, Weak};

use bitflags::bitflags;
use strum::Display;

use crate::{
    metadata::{
        body::MethodBody,
        types::{TypeRef, BASE_DELEGATE, BASE_MULTICAST_DELEGATE},
    },
    Error, Result,
};

/// Reference-counted handle to a [`Field`].
pub type FieldRc = Arc<Field>;
/// Reference-counted handle to a [`Property`].
pub type PropertyRc = Arc<Property>;
/// Reference-counted handle to an [`Event`].
pub type EventRc = Arc<Event>;
/// Reference-counted handle to a [`Method`].
pub type MethodRc = Arc<Method>;

bitflags! {
    /// Raw method attribute bits the loader preserves.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodModifiers: u32 {
        /// Method is static.
        const STATIC = 0x0010;
        /// Method is virtual.
        const VIRTUAL = 0x0040;
        /// Method is abstract (no body).
        const ABSTRACT = 0x0400;
        /// The name has special meaning to tools.
        const SPECIAL_NAME = 0x0800;
        /// The name has special meaning to the runtime (`.ctor`, `.cctor`).
        const RT_SPECIAL_NAME = 0x1000;
    }
}

bitflags! {
    /// Raw accessor-semantics word attached to a method declaration.
    ///
    /// Exactly one bit is set for an accessor; an empty word marks a plain
    /// method. Values outside the recognized getter/setter/add/remove set fail
    /// classification, see [`Method::accessor_semantics`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MethodSemanticsFlags: u16 {
        /// Property setter.
        const SETTER = 0x0001;
        /// Property getter.
        const GETTER = 0x0002;
        /// Other association (not recognized by this engine).
        const OTHER = 0x0004;
        /// Event subscribe accessor.
        const ADD_ON = 0x0008;
        /// Event unsubscribe accessor.
        const REMOVE_ON = 0x0010;
        /// Event raise accessor (not recognized by this engine).
        const FIRE = 0x0020;
    }
}

/// The property or event a method's accessor semantics bind it to.
#[derive(Clone)]
pub enum AccessorAssociation {
    /// Accessor of a property.
    Property(PropertyRc),
    /// Accessor of an event.
    Event(EventRc),
}

/// Classified accessor semantics of a method, with the owning member resolved.
#[derive(Clone, Display)]
pub enum AccessorSemantics {
    /// Plain method without accessor semantics.
    None,
    /// Getter of the given property.
    Getter(PropertyRc),
    /// Setter of the given property.
    Setter(PropertyRc),
    /// Subscribe accessor of the given event.
    Adder(EventRc),
    /// Unsubscribe accessor of the given event.
    Remover(EventRc),
}

/// A smart reference to a [`Method`] that holds the target weakly.
///
/// Instruction operands point at methods through this wrapper so a method body
/// referencing its own declaration cannot form a strong cycle.
#[derive(Clone)]
pub struct MethodRef {
    weak_ref: Weak<Method>,
}

impl MethodRef {
    /// Create a new `MethodRef` from a strong reference.
    #[must_use]
    pub fn new(strong_ref: &MethodRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the method, returning `None` if it has been dropped.
    #[must_use]
    pub fn upgrade(&self) -> Option<MethodRc> {
        self.weak_ref.upgrade()
    }
}

/// A smart reference to a [`Field`] that holds the target weakly.
#[derive(Clone)]
pub struct FieldRef {
    weak_ref: Weak<Field>,
}

impl FieldRef {
    /// Create a new `FieldRef` from a strong reference.
    #[must_use]
    pub fn new(strong_ref: &FieldRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the field, returning `None` if it has been dropped.
    #[must_use]
    pub fn upgrade(&self) -> Option<FieldRc> {
        self.weak_ref.upgrade()
    }
}

/// One field declaration.
pub struct Field {
    /// Field name.
    pub name: String,
    /// Declaring type.
    pub declaring: TypeRef,
    /// Declared field type, if the loader could resolve it.
    pub field_type: Option<TypeRef>,
    /// Whether the declaration was synthesized by a compiler.
    pub compiler_generated: bool,
}

impl Field {
    /// Fully qualified name, `DeclaringType::Name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        member_full_name(&self.declaring, &self.name)
    }

    /// Whether the declared field type is a delegate type.
    #[must_use]
    pub fn is_delegate_typed(&self) -> bool {
        self.field_type
            .as_ref()
            .and_then(TypeRef::upgrade)
            .is_some_and(|t| t.is_delegate())
    }

    /// Whether this field backs an event of the same name on the declaring type.
    #[must_use]
    pub fn is_event_backing(&self) -> bool {
        self.backing_event().is_some()
    }

    /// The event of the same name on the declaring type, if any.
    #[must_use]
    pub fn backing_event(&self) -> Option<EventRc> {
        self.declaring.upgrade()?.event_named(&self.name)
    }
}

/// One property declaration.
pub struct Property {
    /// Property name.
    pub name: String,
    /// Declaring type.
    pub declaring: TypeRef,
}

impl Property {
    /// Fully qualified name, `DeclaringType::Name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        member_full_name(&self.declaring, &self.name)
    }
}

/// One event declaration.
pub struct Event {
    /// Event name.
    pub name: String,
    /// Declaring type.
    pub declaring: TypeRef,
}

impl Event {
    /// Fully qualified name, `DeclaringType::Name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        member_full_name(&self.declaring, &self.name)
    }
}

/// One method declaration, optionally carrying a body.
pub struct Method {
    /// Method name (`.ctor` / `.cctor` for constructors).
    pub name: String,
    /// Declaring type.
    pub declaring: TypeRef,
    /// Raw attribute bits.
    pub modifiers: MethodModifiers,
    /// Raw accessor-semantics word; empty for plain methods.
    pub semantics: MethodSemanticsFlags,
    /// The property or event the semantics word binds this method to.
    pub association: Option<AccessorAssociation>,
    /// Method body, set once by the loader for methods that have one.
    pub body: OnceLock<MethodBody>,
    /// Whether the declaration was synthesized by a compiler.
    pub compiler_generated: bool,
}

impl Method {
    /// Create a new bodyless method declaration.
    ///
    /// The loader attaches a body afterwards through the `body` cell, once the
    /// operands of its instructions are resolvable.
    #[must_use]
    pub fn new(
        declaring: TypeRef,
        name: &str,
        modifiers: MethodModifiers,
        semantics: MethodSemanticsFlags,
        association: Option<AccessorAssociation>,
        compiler_generated: bool,
    ) -> MethodRc {
        Arc::new(Method {
            name: name.to_string(),
            declaring,
            modifiers,
            semantics,
            association,
            body: OnceLock::new(),
            compiler_generated,
        })
    }

    /// Fully qualified name, `DeclaringType::Name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        member_full_name(&self.declaring, &self.name)
    }

    /// Whether this is an instance or static constructor.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.modifiers.contains(MethodModifiers::RT_SPECIAL_NAME)
            && (self.name == ".ctor" || self.name == ".cctor")
    }

    /// Whether this method is a delegate `Invoke`.
    #[must_use]
    pub fn is_delegate_invoke(&self) -> bool {
        self.name == "Invoke"
            && self
                .declaring
                .upgrade()
                .is_some_and(|t| t.is_delegate())
    }

    /// Whether this is the static delegate combine helper.
    #[must_use]
    pub fn is_combine_helper(&self) -> bool {
        self.is_delegate_helper("Combine")
    }

    /// Whether this is the static delegate remove helper.
    #[must_use]
    pub fn is_remove_helper(&self) -> bool {
        self.is_delegate_helper("Remove")
    }

    fn is_delegate_helper(&self, name: &str) -> bool {
        self.name == name
            && self
                .declaring
                .full_name()
                .is_some_and(|n| n == BASE_DELEGATE || n == BASE_MULTICAST_DELEGATE)
    }

    /// Classify the accessor semantics of this method.
    ///
    /// An empty semantics word is a plain method. A recognized accessor bit
    /// must come with the matching association; everything else (the `FIRE`
    /// and `OTHER` associations, unknown bits, combined bits, or a missing
    /// association) fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMethodSemantics`] when the raw word is not one
    /// of the recognized getter/setter/add/remove/none shapes.
    pub fn accessor_semantics(&self) -> Result<AccessorSemantics> {
        if self.semantics.is_empty() {
            return Ok(AccessorSemantics::None);
        }
        match (self.semantics, &self.association) {
            (MethodSemanticsFlags::GETTER, Some(AccessorAssociation::Property(p))) => {
                Ok(AccessorSemantics::Getter(p.clone()))
            }
            (MethodSemanticsFlags::SETTER, Some(AccessorAssociation::Property(p))) => {
                Ok(AccessorSemantics::Setter(p.clone()))
            }
            (MethodSemanticsFlags::ADD_ON, Some(AccessorAssociation::Event(e))) => {
                Ok(AccessorSemantics::Adder(e.clone()))
            }
            (MethodSemanticsFlags::REMOVE_ON, Some(AccessorAssociation::Event(e))) => {
                Ok(AccessorSemantics::Remover(e.clone()))
            }
            _ => Err(Error::UnknownMethodSemantics {
                method_name: self.full_name(),
                raw: self.semantics.bits(),
            }),
        }
    }
}

fn member_full_name(declaring: &TypeRef, name: &str) -> String {
    match declaring.full_name() {
        Some(ty) => format!("{ty}::{name}"),
        None => name.to_string(),
    }
}
