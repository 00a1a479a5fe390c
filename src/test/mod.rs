//! Shared fixture factories for unit tests.

#![allow(dead_code)]

use std::sync::Arc;

use crate::metadata::{
    AccessorAssociation, Event, EventRc, Field, FieldRc, Method, MethodBody, MethodModifiers,
    MethodRc, MethodSemanticsFlags, Module, ModuleRc, Property, PropertyRc, TypeAttributes,
    TypeDef, TypeRc, TypeRef,
};
use crate::tree::CodeTree;

/// Well-known external base types plus the delegate helper methods, kept
/// alive for the duration of a test so weak references resolve.
pub struct TestHost {
    pub object: TypeRc,
    pub value_type: TypeRc,
    pub enum_base: TypeRc,
    pub delegate_root: TypeRc,
    pub multicast: TypeRc,
    pub combine: MethodRc,
    pub remove: MethodRc,
}

impl TestHost {
    pub fn new() -> Self {
        let object = TypeDef::new("System", "Object", TypeAttributes::empty(), None, None, false);
        let value_type = TypeDef::new(
            "System",
            "ValueType",
            TypeAttributes::empty(),
            Some(TypeRef::new(&object)),
            None,
            false,
        );
        let enum_base = TypeDef::new(
            "System",
            "Enum",
            TypeAttributes::empty(),
            Some(TypeRef::new(&value_type)),
            None,
            false,
        );
        let delegate_root = TypeDef::new(
            "System",
            "Delegate",
            TypeAttributes::empty(),
            Some(TypeRef::new(&object)),
            None,
            false,
        );
        let multicast = TypeDef::new(
            "System",
            "MulticastDelegate",
            TypeAttributes::empty(),
            Some(TypeRef::new(&delegate_root)),
            None,
            false,
        );
        let combine = Method::new(
            TypeRef::new(&delegate_root),
            "Combine",
            MethodModifiers::STATIC,
            MethodSemanticsFlags::empty(),
            None,
            false,
        );
        let remove = Method::new(
            TypeRef::new(&delegate_root),
            "Remove",
            MethodModifiers::STATIC,
            MethodSemanticsFlags::empty(),
            None,
            false,
        );
        delegate_root.methods.push(combine.clone());
        delegate_root.methods.push(remove.clone());
        TestHost {
            object,
            value_type,
            enum_base,
            delegate_root,
            multicast,
            combine,
            remove,
        }
    }

    /// Create a plain class in `module`.
    pub fn class(&self, module: &ModuleRc, namespace: &str, name: &str) -> TypeRc {
        let ty = TypeDef::new(
            namespace,
            name,
            TypeAttributes::empty(),
            Some(TypeRef::new(&self.object)),
            None,
            false,
        );
        module.push_type(ty.clone());
        ty
    }

    /// Create a delegate type in `module`, with its `Invoke` method.
    pub fn delegate(&self, module: &ModuleRc, namespace: &str, name: &str) -> TypeRc {
        let ty = TypeDef::new(
            namespace,
            name,
            TypeAttributes::SEALED,
            Some(TypeRef::new(&self.multicast)),
            None,
            false,
        );
        let invoke = Method::new(
            TypeRef::new(&ty),
            "Invoke",
            MethodModifiers::VIRTUAL,
            MethodSemanticsFlags::empty(),
            None,
            false,
        );
        ty.methods.push(invoke);
        module.push_type(ty.clone());
        ty
    }
}

// Helper function to create a module
pub fn create_module(name: &str) -> ModuleRc {
    Module::new(name)
}

// Helper function to create a field on a type
pub fn create_field(ty: &TypeRc, name: &str, field_type: Option<&TypeRc>) -> FieldRc {
    let field = Arc::new(Field {
        name: name.to_string(),
        declaring: TypeRef::new(ty),
        field_type: field_type.map(TypeRef::new),
        compiler_generated: false,
    });
    ty.fields.push(field.clone());
    field
}

// Helper function to create a plain method on a type
pub fn create_method(ty: &TypeRc, name: &str) -> MethodRc {
    let method = Method::new(
        TypeRef::new(ty),
        name,
        MethodModifiers::empty(),
        MethodSemanticsFlags::empty(),
        None,
        false,
    );
    ty.methods.push(method.clone());
    method
}

// Helper function to create a constructor on a type
pub fn create_ctor(ty: &TypeRc) -> MethodRc {
    let method = Method::new(
        TypeRef::new(ty),
        ".ctor",
        MethodModifiers::SPECIAL_NAME | MethodModifiers::RT_SPECIAL_NAME,
        MethodSemanticsFlags::empty(),
        None,
        false,
    );
    ty.methods.push(method.clone());
    method
}

// Helper function to create a property with both accessors
pub fn create_property(ty: &TypeRc, name: &str) -> (PropertyRc, MethodRc, MethodRc) {
    let property = Arc::new(Property {
        name: name.to_string(),
        declaring: TypeRef::new(ty),
    });
    ty.properties.push(property.clone());
    let getter = Method::new(
        TypeRef::new(ty),
        &format!("get_{name}"),
        MethodModifiers::SPECIAL_NAME,
        MethodSemanticsFlags::GETTER,
        Some(AccessorAssociation::Property(property.clone())),
        false,
    );
    let setter = Method::new(
        TypeRef::new(ty),
        &format!("set_{name}"),
        MethodModifiers::SPECIAL_NAME,
        MethodSemanticsFlags::SETTER,
        Some(AccessorAssociation::Property(property.clone())),
        false,
    );
    ty.methods.push(getter.clone());
    ty.methods.push(setter.clone());
    (property, getter, setter)
}

// Helper function to create an event with a backing field and both accessors
pub fn create_event(
    ty: &TypeRc,
    name: &str,
    delegate_type: &TypeRc,
) -> (EventRc, FieldRc, MethodRc, MethodRc) {
    let event = Arc::new(Event {
        name: name.to_string(),
        declaring: TypeRef::new(ty),
    });
    ty.events.push(event.clone());
    let backing = Arc::new(Field {
        name: name.to_string(),
        declaring: TypeRef::new(ty),
        field_type: Some(TypeRef::new(delegate_type)),
        compiler_generated: true,
    });
    ty.fields.push(backing.clone());
    let adder = Method::new(
        TypeRef::new(ty),
        &format!("add_{name}"),
        MethodModifiers::SPECIAL_NAME,
        MethodSemanticsFlags::ADD_ON,
        Some(AccessorAssociation::Event(event.clone())),
        false,
    );
    let remover = Method::new(
        TypeRef::new(ty),
        &format!("remove_{name}"),
        MethodModifiers::SPECIAL_NAME,
        MethodSemanticsFlags::REMOVE_ON,
        Some(AccessorAssociation::Event(event.clone())),
        false,
    );
    ty.methods.push(adder.clone());
    ty.methods.push(remover.clone());
    (event, backing, adder, remover)
}

// Helper function to attach a bodiless instruction tree to a method
pub fn attach_body(method: &MethodRc, code: CodeTree) {
    let _ = method.body.set(MethodBody::new(code));
}
