//! Joinpoint entities: the recordable facts of the index.
//!
//! One sum type, [`Joinpoint`], discriminated by variant payloads that carry
//! only the fields relevant to that shape. Identity is (full name, kind); the
//! full name is computed once at construction. The module-level joinpoint is
//! the only entity mutable after creation: its changed flag is flipped by the
//! weaving engine once something inside the module has been rewritten.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, OnceLock,
};

use crate::{
    joinpoint::JoinpointKind,
    metadata::{EventRc, FieldRc, MethodRc, ModuleRc, PropertyRc, TypeRc},
};

/// Reference-counted handle to a [`Joinpoint`].
pub type JoinpointRc = Arc<Joinpoint>;

/// A resolved declaration a joinpoint points at: the declared member itself
/// for declaration-level entities, the accessed/invoked/constructed/thrown
/// member for instruction-level occurrences.
#[derive(Clone)]
pub enum MemberTarget {
    /// A type declaration.
    Type(TypeRc),
    /// A field declaration.
    Field(FieldRc),
    /// A method or constructor declaration.
    Method(MethodRc),
    /// A property declaration.
    Property(PropertyRc),
    /// An event declaration.
    Event(EventRc),
}

impl MemberTarget {
    /// Fully qualified name of the targeted declaration.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            MemberTarget::Type(t) => t.full_name(),
            MemberTarget::Field(f) => f.full_name(),
            MemberTarget::Method(m) => m.full_name(),
            MemberTarget::Property(p) => p.full_name(),
            MemberTarget::Event(e) => e.full_name(),
        }
    }
}

/// Identity of a joinpoint: full qualified name plus kind.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct JoinpointKey {
    /// Full qualified name of the entity.
    pub full_name: String,
    /// Kind bits of the entity.
    pub kind: JoinpointKind,
}

/// The module-level joinpoint; one per indexed module.
pub struct ModuleJoinpoint {
    /// The module itself.
    pub module: ModuleRc,
    changed: AtomicBool,
}

impl ModuleJoinpoint {
    /// Whether the weaving engine has rewritten anything inside this module.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.changed.load(Ordering::Acquire)
    }

    /// Record that the weaving engine rewrote something inside this module.
    pub fn mark_changed(&self) {
        self.changed.store(true, Ordering::Release);
    }
}

/// A type declaration joinpoint.
pub struct TypeJoinpoint {
    /// The declared type.
    pub ty: TypeRc,
}

/// A member declaration joinpoint (method, constructor, accessor, property,
/// event, or field).
pub struct MemberJoinpoint {
    /// The declared member.
    pub target: MemberTarget,
    /// The member this one belongs to, e.g. the property owning a getter.
    pub parent: Option<MemberTarget>,
    /// The body joinpoint paired with a method declaration joinpoint.
    body: OnceLock<JoinpointRc>,
}

impl MemberJoinpoint {
    /// The body joinpoint paired with this declaration, if any.
    #[must_use]
    pub fn body_joinpoint(&self) -> Option<&JoinpointRc> {
        self.body.get()
    }
}

/// An instruction-level occurrence joinpoint.
pub struct InstructionJoinpoint {
    /// The method whose body contains the instruction.
    pub caller: MethodRc,
    /// Offset of the instruction within the caller's body.
    pub offset: u32,
    /// The member the instruction invokes, accesses, constructs or throws.
    pub target: MemberTarget,
}

/// A classified, addressable program location eligible for aspect weaving.
pub struct Joinpoint {
    kind: JoinpointKind,
    module: ModuleRc,
    full_name: String,
    variant: JoinpointVariant,
}

/// Variant payload of a [`Joinpoint`].
pub enum JoinpointVariant {
    /// Module-level entity.
    Module(ModuleJoinpoint),
    /// Type declaration.
    Type(TypeJoinpoint),
    /// Member declaration.
    Member(MemberJoinpoint),
    /// Instruction-level occurrence.
    Instruction(InstructionJoinpoint),
}

impl Joinpoint {
    /// Create the module-level joinpoint for `module`.
    #[must_use]
    pub fn module(module: &ModuleRc) -> JoinpointRc {
        Arc::new(Joinpoint {
            kind: JoinpointKind::ASSEMBLY | JoinpointKind::DECLARATION,
            module: module.clone(),
            full_name: module.name.clone(),
            variant: JoinpointVariant::Module(ModuleJoinpoint {
                module: module.clone(),
                changed: AtomicBool::new(false),
            }),
        })
    }

    /// Create a type declaration joinpoint.
    #[must_use]
    pub fn for_type(module: &ModuleRc, ty: &TypeRc, kind: JoinpointKind) -> JoinpointRc {
        Arc::new(Joinpoint {
            kind,
            module: module.clone(),
            full_name: ty.full_name(),
            variant: JoinpointVariant::Type(TypeJoinpoint { ty: ty.clone() }),
        })
    }

    /// Create a member declaration joinpoint.
    #[must_use]
    pub fn for_member(
        module: &ModuleRc,
        kind: JoinpointKind,
        target: MemberTarget,
        parent: Option<MemberTarget>,
    ) -> JoinpointRc {
        Arc::new(Joinpoint {
            kind,
            module: module.clone(),
            full_name: target.full_name(),
            variant: JoinpointVariant::Member(MemberJoinpoint {
                target,
                parent,
                body: OnceLock::new(),
            }),
        })
    }

    /// Create an instruction-level occurrence joinpoint.
    ///
    /// The full name embeds caller identity and instruction offset, so two
    /// distinct occurrences targeting the same member remain distinct entries.
    #[must_use]
    pub fn for_instruction(
        module: &ModuleRc,
        kind: JoinpointKind,
        caller: &MethodRc,
        offset: u32,
        target: MemberTarget,
    ) -> JoinpointRc {
        let full_name = format!(
            "{}@{:04x}->{}",
            caller.full_name(),
            offset,
            target.full_name()
        );
        Arc::new(Joinpoint {
            kind,
            module: module.clone(),
            full_name,
            variant: JoinpointVariant::Instruction(InstructionJoinpoint {
                caller: caller.clone(),
                offset,
                target,
            }),
        })
    }

    /// Kind bits of this joinpoint.
    #[must_use]
    pub fn kind(&self) -> JoinpointKind {
        self.kind
    }

    /// Full qualified name; together with the kind this is the identity.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The module owning this joinpoint.
    #[must_use]
    pub fn owning_module(&self) -> &ModuleRc {
        &self.module
    }

    /// Identity key of this joinpoint.
    #[must_use]
    pub fn key(&self) -> JoinpointKey {
        JoinpointKey {
            full_name: self.full_name.clone(),
            kind: self.kind,
        }
    }

    /// Variant payload.
    #[must_use]
    pub fn variant(&self) -> &JoinpointVariant {
        &self.variant
    }

    /// The module payload, for module-level joinpoints.
    #[must_use]
    pub fn as_module(&self) -> Option<&ModuleJoinpoint> {
        match &self.variant {
            JoinpointVariant::Module(m) => Some(m),
            _ => None,
        }
    }

    /// The declared type, for type declaration joinpoints.
    #[must_use]
    pub fn as_type(&self) -> Option<&TypeRc> {
        match &self.variant {
            JoinpointVariant::Type(t) => Some(&t.ty),
            _ => None,
        }
    }

    /// The resolved member this joinpoint points at, if any.
    #[must_use]
    pub fn target(&self) -> Option<MemberTarget> {
        match &self.variant {
            JoinpointVariant::Module(_) => None,
            JoinpointVariant::Type(t) => Some(MemberTarget::Type(t.ty.clone())),
            JoinpointVariant::Member(m) => Some(m.target.clone()),
            JoinpointVariant::Instruction(i) => Some(i.target.clone()),
        }
    }

    /// The member this joinpoint belongs to, e.g. the property owning an accessor.
    #[must_use]
    pub fn parent(&self) -> Option<&MemberTarget> {
        match &self.variant {
            JoinpointVariant::Member(m) => m.parent.as_ref(),
            _ => None,
        }
    }

    /// The method whose body contains this occurrence, for instruction-level
    /// joinpoints.
    #[must_use]
    pub fn enclosing_method(&self) -> Option<&MethodRc> {
        match &self.variant {
            JoinpointVariant::Instruction(i) => Some(&i.caller),
            _ => None,
        }
    }

    /// Pair a declaration joinpoint with its body joinpoint.
    ///
    /// Only meaningful for member declaration joinpoints; at most one body can
    /// be attached, later attempts are ignored.
    pub fn link_body(&self, body: JoinpointRc) {
        if let JoinpointVariant::Member(m) = &self.variant {
            let _ = m.body.set(body);
        }
    }

    /// The body joinpoint paired with this declaration, if any.
    #[must_use]
    pub fn body_joinpoint(&self) -> Option<&JoinpointRc> {
        match &self.variant {
            JoinpointVariant::Member(m) => m.body_joinpoint(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Module;

    #[test]
    fn test_module_joinpoint_changed_flag() {
        let module = Module::new("Lib.dll");
        let jp = Joinpoint::module(&module);
        let mjp = jp.as_module().unwrap();
        assert!(!mjp.is_changed());
        mjp.mark_changed();
        assert!(mjp.is_changed());
        assert_eq!(jp.full_name(), "Lib.dll");
        assert_eq!(
            jp.kind(),
            JoinpointKind::ASSEMBLY | JoinpointKind::DECLARATION
        );
    }
}
