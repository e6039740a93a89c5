#![allow(dead_code)]

use weave_model::{
    Accessibility, Accessor, AccessorKind, Body, Member, MemberKind, Modifier, Param, TypeDeclaration, TypeKind,
    TypeRef,
};

pub const NS: &str = "Sample";

pub fn mixin(name: &str) -> TypeDeclaration {
    let mut d = TypeDeclaration::new(NS, name);
    d.modifiers = vec![Modifier::Abstract];
    d.markers.define_mixin = true;
    d
}

pub fn consumer(name: &str, uses: &[TypeRef]) -> TypeDeclaration {
    let mut d = TypeDeclaration::new(NS, name);
    d.modifiers = vec![Modifier::Partial];
    d.markers.use_mixin = uses.to_vec();
    d
}

pub fn interface(namespace: &str, name: &str, members: Vec<Member>) -> TypeDeclaration {
    let mut d = TypeDeclaration::new(namespace, name);
    d.kind = TypeKind::Interface;
    d.members = members;
    d
}

pub fn uses(name: &str) -> TypeRef {
    TypeRef::named(format!("{NS}.{name}"))
}

pub fn method(access: Accessibility, ret: &str, name: &str, body: &str) -> Member {
    let mut m = Member::new(MemberKind::Method, name);
    m.accessibility = access;
    m.ty = Some(ret.to_string());
    if !body.is_empty() {
        m.body = Body::Block(body.to_string());
    }
    m
}

pub fn abstract_method(ret: &str, name: &str) -> Member {
    let mut m = method(Accessibility::Public, ret, name, "");
    m.modifiers = vec![Modifier::Abstract];
    m
}

pub fn auto_property(ty: &str, name: &str, initializer: Option<&str>) -> Member {
    let mut m = Member::new(MemberKind::Property, name);
    m.accessibility = Accessibility::Public;
    m.ty = Some(ty.to_string());
    m.accessors = Some(vec![Accessor::auto(AccessorKind::Get), Accessor::auto(AccessorKind::Set)]);
    m.initializer = initializer.map(str::to_string);
    m
}

pub fn param(ty: &str, name: &str) -> Param {
    Param::new(ty, name)
}

/// `System.IDisposable` with its single member.
pub fn disposable() -> TypeDeclaration {
    interface("System", "IDisposable", vec![method(Accessibility::Public, "void", "Dispose", "")])
}
