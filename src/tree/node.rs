//! Logical instruction nodes and the per-body tree they form.

use std::ops::Range;

use strum::Display;

use crate::metadata::{FieldRef, MethodRef, TypeRef};

/// Opcode classification of a logical instruction node.
///
/// Only the shapes the extraction algorithm dispatches on are distinguished;
/// everything else is [`CodeKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CodeKind {
    /// Direct or virtual method invocation.
    Call,
    /// Object construction.
    NewObject,
    /// Array allocation.
    NewArray,
    /// Direct throw of the value on the stack.
    Throw,
    /// Rethrow of the in-flight exception inside a handler.
    Rethrow,
    /// Field read.
    FieldLoad,
    /// Field write.
    FieldStore,
    /// Null literal push.
    LoadNull,
    /// Reference cast.
    Cast,
    /// Any other opcode.
    Other,
}

/// Raw operand of a logical instruction node.
#[derive(Clone)]
pub enum Operand {
    /// A method or constructor reference.
    Method(MethodRef),
    /// A field reference.
    Field(FieldRef),
    /// A type reference.
    Type(TypeRef),
    /// No operand, or one this engine never inspects.
    None,
}

/// One logical instruction within a [`CodeTree`].
///
/// Predecessor links and the argument block are index-based within the owning
/// tree; nodes are never shared across trees.
pub struct CodeNode {
    /// Position of this node in the body's encoding, strictly increasing
    /// along the sequence. Exception handler regions address this space.
    pub offset: u32,
    /// Opcode classification.
    pub kind: CodeKind,
    /// Raw operand.
    pub operand: Operand,
    /// Indices of the immediate control-flow predecessors.
    pub predecessors: Vec<usize>,
    /// Sub-range of nodes that evaluated the arguments of this node.
    /// Empty when the node takes no arguments or the loader did not
    /// reconstruct the evaluation range.
    pub args: Range<usize>,
}

/// Finite, restartable sequence of logical instruction nodes for one body.
pub struct CodeTree {
    nodes: Vec<CodeNode>,
}

impl CodeTree {
    /// All nodes, in body order.
    #[must_use]
    pub fn nodes(&self) -> &[CodeNode] {
        &self.nodes
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Immediate control-flow predecessors of the node at `index`.
    pub fn predecessors(&self, index: usize) -> impl Iterator<Item = &CodeNode> {
        self.nodes[index]
            .predecessors
            .iter()
            .map(move |&p| &self.nodes[p])
    }

    /// The nodes that evaluated the arguments of the node at `index`.
    #[must_use]
    pub fn argument_block(&self, index: usize) -> &[CodeNode] {
        let range = self.nodes[index].args.clone();
        &self.nodes[range]
    }

    /// Last node of the given kind within the argument block of `index`.
    ///
    /// "Last" is closest to the consuming instruction, which is the occurrence
    /// the backward pattern checks care about.
    #[must_use]
    pub fn find_in_arguments(&self, index: usize, kind: CodeKind) -> Option<&CodeNode> {
        self.argument_block(index).iter().rev().find(|n| n.kind == kind)
    }
}

/// Builder for [`CodeTree`], used by the loader and by test fixtures.
///
/// Nodes default to a linear predecessor chain and an empty argument block;
/// both can be overridden after pushing.
#[derive(Default)]
pub struct CodeTreeBuilder {
    nodes: Vec<CodeNode>,
}

impl CodeTreeBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, returning its index.
    ///
    /// The offset is the node's position in the sequence; the predecessor of a
    /// non-first node defaults to the node before it.
    pub fn push(&mut self, kind: CodeKind, operand: Operand) -> usize {
        let index = self.nodes.len();
        let predecessors = if index == 0 { vec![] } else { vec![index - 1] };
        self.nodes.push(CodeNode {
            offset: u32::try_from(index).unwrap_or(u32::MAX),
            kind,
            operand,
            predecessors,
            args: index..index,
        });
        index
    }

    /// Replace the predecessor links of the node at `index`.
    pub fn set_predecessors(&mut self, index: usize, predecessors: Vec<usize>) {
        self.nodes[index].predecessors = predecessors;
    }

    /// Set the argument-evaluation range of the node at `index`.
    pub fn set_arguments(&mut self, index: usize, args: Range<usize>) {
        self.nodes[index].args = args;
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> CodeTree {
        CodeTree { nodes: self.nodes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_predecessors_and_argument_search() {
        let mut builder = CodeTreeBuilder::new();
        let load = builder.push(CodeKind::FieldLoad, Operand::None);
        let other = builder.push(CodeKind::Other, Operand::None);
        let call = builder.push(CodeKind::Call, Operand::None);
        builder.set_arguments(call, load..call);
        let tree = builder.build();

        assert_eq!(tree.len(), 3);
        assert!(tree.predecessors(load).next().is_none());
        assert_eq!(tree.predecessors(call).next().unwrap().offset, other as u32);
        assert_eq!(tree.argument_block(call).len(), 2);
        assert!(tree.find_in_arguments(call, CodeKind::FieldLoad).is_some());
        assert!(tree.find_in_arguments(call, CodeKind::LoadNull).is_none());
    }
}
