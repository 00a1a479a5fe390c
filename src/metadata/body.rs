//! Method bodies: instruction stream plus exception handler regions.

use bitflags::bitflags;

use crate::{metadata::types::TypeRef, tree::CodeTree};

bitflags! {
    /// Exception handler flags defining the type of exception handling clause.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExceptionHandlerFlags: u16 {
        /// A typed exception (catch) clause.
        const EXCEPTION = 0x0000;
        /// An exception filter and handler clause.
        const FILTER = 0x0001;
        /// A finally clause.
        const FINALLY = 0x0002;
        /// A fault clause (finally that executes only on exception).
        const FAULT = 0x0004;
    }
}

/// Exception handler defining try/catch/finally regions within a method body.
///
/// Offsets and lengths address the same space as
/// [`crate::tree::CodeNode::offset`].
pub struct ExceptionHandler {
    /// Flags describing the clause type (catch, filter, finally, fault).
    pub flags: ExceptionHandlerFlags,
    /// Offset of the protected (try) region.
    pub try_offset: u32,
    /// Length of the protected region.
    pub try_length: u32,
    /// Offset of the handler region.
    pub handler_offset: u32,
    /// Length of the handler region.
    pub handler_length: u32,
    /// Caught exception type; set for catch clauses only.
    pub catch_type: Option<TypeRef>,
}

impl ExceptionHandler {
    /// Whether this is a typed catch clause.
    #[must_use]
    pub fn is_catch(&self) -> bool {
        self.flags == ExceptionHandlerFlags::EXCEPTION
    }

    /// Whether the handler region covers the given offset.
    #[must_use]
    pub fn handler_covers(&self, offset: u32) -> bool {
        offset >= self.handler_offset && offset < self.handler_offset + self.handler_length
    }
}

/// One method body: the logical instruction tree and its handler table.
pub struct MethodBody {
    /// Logical instruction stream of the body.
    pub code: CodeTree,
    /// Exception handler regions, innermost-first as emitted by compilers.
    pub exception_handlers: Vec<ExceptionHandler>,
}

impl MethodBody {
    /// Create a body over the given instruction tree with no handlers.
    #[must_use]
    pub fn new(code: CodeTree) -> Self {
        MethodBody {
            code,
            exception_handlers: Vec::new(),
        }
    }

    /// The innermost catch clause whose handler region covers `offset`.
    ///
    /// Used to resolve the exception type of a rethrow, which names no type
    /// itself; "innermost" is the covering catch clause with the smallest
    /// handler region.
    #[must_use]
    pub fn catch_covering(&self, offset: u32) -> Option<&ExceptionHandler> {
        self.exception_handlers
            .iter()
            .filter(|h| h.is_catch() && h.handler_covers(offset))
            .min_by_key(|h| h.handler_length)
    }
}
