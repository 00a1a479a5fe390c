//! Joinpoint model, extraction algorithm, and queryable index.
//!
//! A joinpoint is a classified, addressable program location an aspect weaver
//! can observe or modify: a module, a type or member declaration, a method
//! body, or one bytecode-level occurrence of a call, field access, object
//! construction or throw.
//!
//! # Key Types
//! - [`JoinpointKind`] - Bit-flag classification (one category, one aspect)
//! - [`Joinpoint`] - The recordable entity, identified by (full name, kind)
//! - [`JoinpointVisitor`] / [`build_index`] - Two-phase extraction
//! - [`JoinpointContainer`] - Insertion-ordered index with category queries
//!
//! # Example
//! ```rust
//! use weavescope::prelude::*;
//!
//! let modules: Vec<ModuleRc> = Vec::new();
//! let index = build_index(&modules)?;
//! let methods = index.methods(
//!     JoinpointKind::METHOD | JoinpointKind::DECLARATION,
//!     |_, _| true,
//! );
//! assert!(methods.is_empty());
//! # Ok::<(), weavescope::Error>(())
//! ```

mod container;
mod entity;
mod kind;
mod visitor;

pub use container::{JoinpointContainer, JoinpointStats};
pub use entity::{
    InstructionJoinpoint, Joinpoint, JoinpointKey, JoinpointRc, JoinpointVariant, MemberJoinpoint,
    MemberTarget, ModuleJoinpoint, TypeJoinpoint,
};
pub use kind::JoinpointKind;
pub use visitor::{build_index, JoinpointVisitor};
