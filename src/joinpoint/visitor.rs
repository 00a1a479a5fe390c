//! Two-phase extraction of joinpoints from a module set.
//!
//! Phase 1 walks declarations of every module and records module, type and
//! member joinpoints. Phase 2 walks the instruction tree of every method body
//! registered in phase 1 and records instruction-level occurrences. The
//! phases never interleave across modules: a call in one module may target a
//! declaration in another, and the closed-world policy only records an
//! occurrence when the referenced declaration is already indexed.
//!
//! Classification failures (unknown type category, unrecognized accessor
//! semantics) abort the whole pass. Unrecognized instruction shapes and
//! references to untracked members are silent non-records.

use crate::{
    joinpoint::{
        container::JoinpointContainer,
        entity::{Joinpoint, MemberTarget},
        JoinpointKind,
    },
    metadata::{
        AccessorSemantics, EventRc, FieldRc, MethodBody, MethodRc, ModuleRc, PropertyRc, TypeKind,
        TypeRc, TypeRef,
    },
    tree::{CodeKind, CodeNode, CodeTree, Operand},
    Result,
};

/// How a store mutates a delegate-typed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DelegateMutation {
    /// A handler is combined into the field.
    Add,
    /// A handler is separated from the field (or the field is cleared).
    Remove,
}

/// Build a complete joinpoint index over the given module set.
///
/// Convenience wrapper around [`JoinpointVisitor`].
///
/// # Errors
///
/// Propagates the fatal classification errors of
/// [`JoinpointVisitor::visit`].
pub fn build_index(modules: &[ModuleRc]) -> Result<JoinpointContainer> {
    let mut container = JoinpointContainer::new();
    JoinpointVisitor::new(&mut container).visit(modules)?;
    Ok(container)
}

/// The extraction algorithm populating a [`JoinpointContainer`].
pub struct JoinpointVisitor<'a> {
    container: &'a mut JoinpointContainer,
    /// Methods whose bodies phase 2 walks, collected in phase 1.
    bodies: Vec<(ModuleRc, MethodRc)>,
}

impl<'a> JoinpointVisitor<'a> {
    /// Create a visitor populating the given container.
    pub fn new(container: &'a mut JoinpointContainer) -> Self {
        JoinpointVisitor {
            container,
            bodies: Vec::new(),
        }
    }

    /// Run both extraction phases over the whole module set.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownTypeCategory`] or
    /// [`crate::Error::UnknownMethodSemantics`] when a declaration defeats the
    /// classifiers; the index must be considered unusable then.
    pub fn visit(&mut self, modules: &[ModuleRc]) -> Result<()> {
        for module in modules {
            self.visit_declarations(module)?;
        }
        let bodies = std::mem::take(&mut self.bodies);
        for (module, method) in &bodies {
            self.visit_body(module, method)?;
        }
        Ok(())
    }

    // ----- phase 1: declarations -----

    fn visit_declarations(&mut self, module: &ModuleRc) -> Result<()> {
        self.container.add(Joinpoint::module(module));
        for (_, ty) in module.types.iter() {
            if ty.compiler_generated || ty.is_module_type() {
                continue;
            }
            self.visit_type(module, ty)?;
        }
        Ok(())
    }

    fn visit_type(&mut self, module: &ModuleRc, ty: &TypeRc) -> Result<()> {
        let kind = ty.kind()?;
        let category = match kind {
            TypeKind::Class => JoinpointKind::CLASS,
            TypeKind::Interface => JoinpointKind::INTERFACE,
            TypeKind::Enum => JoinpointKind::ENUM,
            TypeKind::Struct => JoinpointKind::STRUCT,
            TypeKind::Delegate => JoinpointKind::TYPE_DELEGATE,
        };
        self.container.add(Joinpoint::for_type(
            module,
            ty,
            category | JoinpointKind::DECLARATION,
        ));
        if kind == TypeKind::Delegate {
            // Delegate members (Invoke and friends) are runtime plumbing,
            // never woven individually.
            return Ok(());
        }

        for (_, nested) in ty.nested_types.iter() {
            if nested.compiler_generated {
                continue;
            }
            self.visit_type(module, nested)?;
        }
        for (_, event) in ty.events.iter() {
            self.container.add(Joinpoint::for_member(
                module,
                JoinpointKind::EVENT | JoinpointKind::DECLARATION,
                MemberTarget::Event(event.clone()),
                None,
            ));
        }
        for (_, field) in ty.fields.iter() {
            if field.compiler_generated {
                continue;
            }
            let category = if field.is_delegate_typed() {
                JoinpointKind::FIELD_DELEGATE
            } else {
                JoinpointKind::FIELD
            };
            self.container.add(Joinpoint::for_member(
                module,
                category | JoinpointKind::DECLARATION,
                MemberTarget::Field(field.clone()),
                None,
            ));
        }
        for (_, property) in ty.properties.iter() {
            self.container.add(Joinpoint::for_member(
                module,
                JoinpointKind::PROPERTY | JoinpointKind::DECLARATION,
                MemberTarget::Property(property.clone()),
                None,
            ));
        }
        for (_, method) in ty.methods.iter() {
            self.visit_method(module, method)?;
        }
        Ok(())
    }

    fn visit_method(&mut self, module: &ModuleRc, method: &MethodRc) -> Result<()> {
        if method.is_constructor() {
            self.declare_with_body(module, method, JoinpointKind::CONSTRUCTOR);
            return Ok(());
        }
        match method.accessor_semantics()? {
            AccessorSemantics::None => {
                self.declare_with_body(module, method, JoinpointKind::METHOD);
            }
            AccessorSemantics::Getter(property) => self.declare_accessor(
                module,
                method,
                JoinpointKind::PROPERTY | JoinpointKind::GET | JoinpointKind::BODY,
                MemberTarget::Property(property),
            ),
            AccessorSemantics::Setter(property) => self.declare_accessor(
                module,
                method,
                JoinpointKind::PROPERTY | JoinpointKind::SET | JoinpointKind::BODY,
                MemberTarget::Property(property),
            ),
            AccessorSemantics::Adder(event) => self.declare_accessor(
                module,
                method,
                JoinpointKind::EVENT | JoinpointKind::ADD | JoinpointKind::BODY,
                MemberTarget::Event(event),
            ),
            AccessorSemantics::Remover(event) => self.declare_accessor(
                module,
                method,
                JoinpointKind::EVENT | JoinpointKind::REMOVE | JoinpointKind::BODY,
                MemberTarget::Event(event),
            ),
        }
        Ok(())
    }

    /// Emit a declaration joinpoint and, when the method has a body, the
    /// paired body joinpoint.
    fn declare_with_body(&mut self, module: &ModuleRc, method: &MethodRc, category: JoinpointKind) {
        let declaration = Joinpoint::for_member(
            module,
            category | JoinpointKind::DECLARATION,
            MemberTarget::Method(method.clone()),
            None,
        );
        if method.body.get().is_some() {
            let body = Joinpoint::for_member(
                module,
                category | JoinpointKind::BODY,
                MemberTarget::Method(method.clone()),
                None,
            );
            declaration.link_body(body.clone());
            self.container.add(declaration);
            self.container.add(body);
            self.bodies.push((module.clone(), method.clone()));
        } else {
            self.container.add(declaration);
        }
    }

    /// Emit the single joinpoint of a property or event accessor, linked to
    /// its owning member. Compiler-generated accessors are included: auto
    /// properties still need tracking.
    fn declare_accessor(
        &mut self,
        module: &ModuleRc,
        method: &MethodRc,
        kind: JoinpointKind,
        parent: MemberTarget,
    ) {
        self.container.add(Joinpoint::for_member(
            module,
            kind,
            MemberTarget::Method(method.clone()),
            Some(parent),
        ));
        if method.body.get().is_some() {
            self.bodies.push((module.clone(), method.clone()));
        }
    }

    // ----- phase 2: instruction occurrences -----

    fn visit_body(&mut self, module: &ModuleRc, method: &MethodRc) -> Result<()> {
        let Some(body) = method.body.get() else {
            return Ok(());
        };
        for (index, node) in body.code.nodes().iter().enumerate() {
            match node.kind {
                CodeKind::Call => self.visit_call(module, method, body, index, node)?,
                CodeKind::Throw => self.visit_throw(module, method, body, index, node),
                CodeKind::Rethrow => self.visit_rethrow(module, method, body, node),
                CodeKind::NewObject => self.visit_new(module, method, node),
                CodeKind::FieldLoad => self.visit_field_load(module, method, node),
                CodeKind::FieldStore => self.visit_field_store(module, method, body, index, node),
                CodeKind::NewArray
                | CodeKind::LoadNull
                | CodeKind::Cast
                | CodeKind::Other => {}
            }
        }
        Ok(())
    }

    fn visit_call(
        &mut self,
        module: &ModuleRc,
        method: &MethodRc,
        body: &MethodBody,
        index: usize,
        node: &CodeNode,
    ) -> Result<()> {
        let Operand::Method(target) = &node.operand else {
            return Ok(());
        };
        let Some(target) = target.upgrade() else {
            return Ok(());
        };
        // Accessor semantics on the resolved method win over every other
        // classification of the call; the referenced property or event must
        // still be indexed, like every other instruction target.
        match target.accessor_semantics()? {
            AccessorSemantics::Getter(property) => {
                self.record_property_access(module, method, node.offset, JoinpointKind::GET, property);
            }
            AccessorSemantics::Setter(property) => {
                self.record_property_access(module, method, node.offset, JoinpointKind::SET, property);
            }
            AccessorSemantics::Adder(event) => {
                self.record_event_access(module, method, node.offset, JoinpointKind::ADD, event);
            }
            AccessorSemantics::Remover(event) => {
                self.record_event_access(module, method, node.offset, JoinpointKind::REMOVE, event);
            }
            AccessorSemantics::None => {
                if target.is_constructor() {
                    if self.container.contains(
                        &target.full_name(),
                        JoinpointKind::CONSTRUCTOR | JoinpointKind::DECLARATION,
                    ) {
                        self.record(
                            module,
                            JoinpointKind::CONSTRUCTOR | JoinpointKind::CALL,
                            method,
                            node.offset,
                            MemberTarget::Method(target),
                        );
                    }
                } else if self.container.contains(
                    &target.full_name(),
                    JoinpointKind::METHOD | JoinpointKind::DECLARATION,
                ) {
                    self.record(
                        module,
                        JoinpointKind::METHOD | JoinpointKind::CALL,
                        method,
                        node.offset,
                        MemberTarget::Method(target),
                    );
                } else if target.is_delegate_invoke() {
                    self.visit_delegate_invoke(module, method, body, index, node);
                }
            }
        }
        Ok(())
    }

    /// An untracked call resolving through a delegate `Invoke`: the receiver
    /// is interesting when it was loaded from a delegate- or event-backing
    /// field within the call's argument evaluation.
    fn visit_delegate_invoke(
        &mut self,
        module: &ModuleRc,
        method: &MethodRc,
        body: &MethodBody,
        index: usize,
        node: &CodeNode,
    ) {
        let Some(load) = body.code.find_in_arguments(index, CodeKind::FieldLoad) else {
            return;
        };
        let Operand::Field(field) = &load.operand else {
            return;
        };
        let Some(field) = field.upgrade() else {
            return;
        };
        if let Some(event) = field.backing_event() {
            self.record_event_access(module, method, node.offset, JoinpointKind::CALL, event);
        } else if field.is_delegate_typed() {
            self.record_delegate_field_access(module, method, node.offset, JoinpointKind::CALL, field);
        }
    }

    fn visit_throw(
        &mut self,
        module: &ModuleRc,
        method: &MethodRc,
        body: &MethodBody,
        index: usize,
        node: &CodeNode,
    ) {
        let Some(thrown) = Self::thrown_type(body, index) else {
            return;
        };
        self.record_throw(module, method, node.offset, thrown);
    }

    fn visit_rethrow(
        &mut self,
        module: &ModuleRc,
        method: &MethodRc,
        body: &MethodBody,
        node: &CodeNode,
    ) {
        let Some(handler) = body.catch_covering(node.offset) else {
            return;
        };
        let Some(caught) = handler.catch_type.as_ref().and_then(TypeRef::upgrade) else {
            return;
        };
        self.record_throw(module, method, node.offset, caught);
    }

    fn record_throw(&mut self, module: &ModuleRc, method: &MethodRc, offset: u32, ty: TypeRc) {
        if self.container.is_tracked_type(&ty.full_name()) {
            self.record(
                module,
                JoinpointKind::EXCEPTION | JoinpointKind::THROW,
                method,
                offset,
                MemberTarget::Type(ty),
            );
        }
    }

    /// The type of the value a direct throw raises: the nearest construction
    /// in the throw's evaluation, falling back to the immediate predecessor.
    fn thrown_type(body: &MethodBody, index: usize) -> Option<TypeRc> {
        let source = body
            .code
            .find_in_arguments(index, CodeKind::NewObject)
            .or_else(|| {
                body.code
                    .predecessors(index)
                    .find(|n| n.kind == CodeKind::NewObject)
            })?;
        match &source.operand {
            Operand::Method(ctor) => ctor.upgrade()?.declaring.upgrade(),
            Operand::Type(ty) => ty.upgrade(),
            _ => None,
        }
    }

    fn visit_new(&mut self, module: &ModuleRc, method: &MethodRc, node: &CodeNode) {
        let Operand::Method(ctor) = &node.operand else {
            return;
        };
        let Some(ctor) = ctor.upgrade() else {
            return;
        };
        // Delegate construction is classified through the invoke/store paths.
        if ctor.declaring.upgrade().is_some_and(|t| t.is_delegate()) {
            return;
        }
        if self.container.contains(
            &ctor.full_name(),
            JoinpointKind::CONSTRUCTOR | JoinpointKind::DECLARATION,
        ) {
            self.record(
                module,
                JoinpointKind::CONSTRUCTOR | JoinpointKind::CALL,
                method,
                node.offset,
                MemberTarget::Method(ctor),
            );
        }
    }

    fn visit_field_load(&mut self, module: &ModuleRc, method: &MethodRc, node: &CodeNode) {
        let Operand::Field(field) = &node.operand else {
            return;
        };
        let Some(field) = field.upgrade() else {
            return;
        };
        // Event-backing and delegate fields are classified separately.
        if field.is_event_backing() || field.is_delegate_typed() {
            return;
        }
        if self.container.contains(
            &field.full_name(),
            JoinpointKind::FIELD | JoinpointKind::DECLARATION,
        ) {
            self.record(
                module,
                JoinpointKind::FIELD | JoinpointKind::GET,
                method,
                node.offset,
                MemberTarget::Field(field),
            );
        }
    }

    fn visit_field_store(
        &mut self,
        module: &ModuleRc,
        method: &MethodRc,
        body: &MethodBody,
        index: usize,
        node: &CodeNode,
    ) {
        let Operand::Field(field) = &node.operand else {
            return;
        };
        let Some(field) = field.upgrade() else {
            return;
        };
        if field.is_delegate_typed() {
            let Some(mutation) = Self::classify_delegate_store(&body.code, index) else {
                return;
            };
            let aspect = match mutation {
                DelegateMutation::Add => JoinpointKind::ADD,
                DelegateMutation::Remove => JoinpointKind::REMOVE,
            };
            if let Some(event) = field.backing_event() {
                self.record_event_access(module, method, node.offset, aspect, event);
            } else {
                self.record_delegate_field_access(module, method, node.offset, aspect, field);
            }
            return;
        }
        if field.is_event_backing() {
            return;
        }
        if self.container.contains(
            &field.full_name(),
            JoinpointKind::FIELD | JoinpointKind::DECLARATION,
        ) {
            self.record(
                module,
                JoinpointKind::FIELD | JoinpointKind::SET,
                method,
                node.offset,
                MemberTarget::Field(field),
            );
        }
    }

    /// Backward pattern check over the store's evaluation chain.
    ///
    /// Recognized shapes, each checked against the single immediate
    /// predecessor:
    /// - a freshly constructed delegate object: add
    /// - a null literal: remove
    /// - a cast preceded by a call to the delegate combine helper: add
    /// - a cast preceded by a call to the delegate remove helper: remove
    ///
    /// Anything else, including stores with multiple control-flow
    /// predecessors, is not classified.
    fn classify_delegate_store(code: &CodeTree, index: usize) -> Option<DelegateMutation> {
        let pred = Self::sole_predecessor(code, index)?;
        match code.nodes()[pred].kind {
            CodeKind::NewObject => Some(DelegateMutation::Add),
            CodeKind::LoadNull => Some(DelegateMutation::Remove),
            CodeKind::Cast => {
                let before = Self::sole_predecessor(code, pred)?;
                let call = &code.nodes()[before];
                if call.kind != CodeKind::Call {
                    return None;
                }
                let Operand::Method(helper) = &call.operand else {
                    return None;
                };
                let helper = helper.upgrade()?;
                if helper.is_combine_helper() {
                    Some(DelegateMutation::Add)
                } else if helper.is_remove_helper() {
                    Some(DelegateMutation::Remove)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn sole_predecessor(code: &CodeTree, index: usize) -> Option<usize> {
        match code.nodes()[index].predecessors.as_slice() {
            [single] => Some(*single),
            _ => None,
        }
    }

    /// Record a property occurrence, gated on its indexed declaration.
    fn record_property_access(
        &mut self,
        module: &ModuleRc,
        caller: &MethodRc,
        offset: u32,
        aspect: JoinpointKind,
        property: PropertyRc,
    ) {
        if self.container.contains(
            &property.full_name(),
            JoinpointKind::PROPERTY | JoinpointKind::DECLARATION,
        ) {
            self.record(
                module,
                JoinpointKind::PROPERTY | aspect,
                caller,
                offset,
                MemberTarget::Property(property),
            );
        }
    }

    /// Record an event occurrence, gated on its indexed declaration.
    fn record_event_access(
        &mut self,
        module: &ModuleRc,
        caller: &MethodRc,
        offset: u32,
        aspect: JoinpointKind,
        event: EventRc,
    ) {
        if self.container.contains(
            &event.full_name(),
            JoinpointKind::EVENT | JoinpointKind::DECLARATION,
        ) {
            self.record(
                module,
                JoinpointKind::EVENT | aspect,
                caller,
                offset,
                MemberTarget::Event(event),
            );
        }
    }

    /// Record a delegate-field occurrence, gated on its indexed declaration.
    fn record_delegate_field_access(
        &mut self,
        module: &ModuleRc,
        caller: &MethodRc,
        offset: u32,
        aspect: JoinpointKind,
        field: FieldRc,
    ) {
        if self.container.contains(
            &field.full_name(),
            JoinpointKind::FIELD_DELEGATE | JoinpointKind::DECLARATION,
        ) {
            self.record(
                module,
                JoinpointKind::FIELD_DELEGATE | aspect,
                caller,
                offset,
                MemberTarget::Field(field),
            );
        }
    }

    fn record(
        &mut self,
        module: &ModuleRc,
        kind: JoinpointKind,
        caller: &MethodRc,
        offset: u32,
        target: MemberTarget,
    ) {
        self.container
            .add(Joinpoint::for_instruction(module, kind, caller, offset, target));
    }
}
