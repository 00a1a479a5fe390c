//! Instruction-Tree Abstraction over stack-machine method bodies.
//!
//! One [`CodeTree`] per method body: a finite, restartable sequence of logical
//! instruction nodes. Each [`CodeNode`] carries an opcode classification, the
//! raw operand, links to its immediate control-flow predecessors, and the
//! sub-range of nodes that evaluated its arguments. The tree classifies raw
//! opcodes only; semantic interpretation (is this call a property access, is
//! this store an event subscription) is the extraction algorithm's job.
//!
//! # Key Types
//! - [`CodeTree`] - The per-body node sequence with lookup operations
//! - [`CodeNode`] - One logical instruction
//! - [`CodeKind`] - Opcode classification tag
//! - [`Operand`] - Raw member/type operand of a node
//! - [`CodeTreeBuilder`] - Construction interface used by the loader

mod node;

pub use node::{CodeKind, CodeNode, CodeTree, CodeTreeBuilder, Operand};
