//! Convenient re-exports of the most commonly used types and traits.
//!
//! # Example
//!
//! ```rust
//! use weavescope::prelude::*;
//!
//! let modules: Vec<ModuleRc> = Vec::new();
//! let index = build_index(&modules)?;
//! assert_eq!(index.stats().total, 0);
//! # Ok::<(), weavescope::Error>(())
//! ```

pub use crate::{
    joinpoint::{
        build_index, Joinpoint, JoinpointContainer, JoinpointKind, JoinpointRc, JoinpointStats,
        JoinpointVisitor, MemberTarget,
    },
    metadata::{
        AccessorAssociation, AccessorSemantics, Event, EventRc, ExceptionHandler,
        ExceptionHandlerFlags, Field, FieldRc, FieldRef, Method, MethodBody, MethodModifiers,
        MethodRc, MethodRef, MethodSemanticsFlags, Module, ModuleRc, Property, PropertyRc,
        TypeAttributes, TypeDef, TypeKind, TypeRc, TypeRef,
    },
    tree::{CodeKind, CodeNode, CodeTree, CodeTreeBuilder, Operand},
    Error, Result,
};
