//! In-memory declaration model for the tracked module set.
//!
//! The module-loading collaborator (out of scope for this crate) parses binary
//! modules and materializes them into this model: modules own types, types own
//! members, and cross-references between declarations are expressed as weak
//! smart references so the declaration graph cannot leak through cycles.
//! Everything here is plain recorded metadata; semantic classification on top
//! of it lives with the callers ([`crate::joinpoint::JoinpointVisitor`]).
//!
//! # Key Types
//! - [`Module`] - One compiled binary unit and its top-level types
//! - [`TypeDef`] / [`TypeRef`] - Type declarations and weak references to them
//! - [`Method`], [`Field`], [`Property`], [`Event`] - Member declarations
//! - [`MethodBody`] - Stack-machine instruction stream plus exception handlers
//! - [`AccessorSemantics`] - Getter/setter/add/remove capability resolution

mod body;
mod member;
mod module;
mod types;

pub use body::{ExceptionHandler, ExceptionHandlerFlags, MethodBody};
pub use member::{
    AccessorAssociation, AccessorSemantics, Event, EventRc, Field, FieldRc, FieldRef, Method,
    MethodModifiers, MethodRc, MethodRef, MethodSemanticsFlags, Property, PropertyRc,
};
pub use module::{Module, ModuleRc};
pub use types::{TypeAttributes, TypeDef, TypeKind, TypeList, TypeRc, TypeRef};
