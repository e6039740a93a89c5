#![forbid(unsafe_code)]

//! Read-only view of the host's declared types.
//!
//! Everything here is plain data produced by the host's symbol layer. The
//! resolver never sees raw source text: member bodies, initializers and type
//! names arrive as already-extracted fragments.

mod snapshot;
mod subst;

use std::fmt;

use miette::SourceSpan;
use serde::{Deserialize, Serialize};

pub use snapshot::{Snapshot, SnapshotError, TypeModel};
pub use subst::{substitute_idents, Substitution};

pub type Span = SourceSpan;

pub fn span(start: usize, len: usize) -> Span {
    SourceSpan::new(start.into(), len)
}

/// Source location of a declaration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub file: String,
    /// Line number (1-based)
    #[serde(default)]
    pub line: u32,
    /// Column number (1-based)
    #[serde(default)]
    pub col: u32,
    /// Byte offset into `file`, used for labeled spans.
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub len: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, col: u32) -> Self {
        Location {
            file: file.into(),
            line,
            col,
            offset: 0,
            len: 0,
        }
    }

    pub fn span(&self) -> Span {
        span(self.offset, self.len)
    }

    pub fn display(&self) -> String {
        format!("{}:{}:{}", self.file, self.line, self.col)
    }
}

/// Identity of a declared type: qualified name plus generic arity.
///
/// Two handles for the same logical type compare equal even when they come
/// from different declarations or use sites.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeKey {
    pub qualified: String,
    pub arity: usize,
}

impl TypeKey {
    pub fn new(qualified: impl Into<String>, arity: usize) -> Self {
        TypeKey {
            qualified: qualified.into(),
            arity,
        }
    }

    /// Unqualified name (last path segment).
    pub fn name(&self) -> &str {
        self.qualified
            .rsplit_once('.')
            .map(|(_, n)| n)
            .unwrap_or(&self.qualified)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arity == 0 {
            f.write_str(&self.qualified)
        } else {
            write!(f, "{}`{}", self.qualified, self.arity)
        }
    }
}

/// A reference to a type as written at a use site.
///
/// `args` is empty for a non-generic type and for an open generic reference
/// (`Foo<>`); the latter sets `arity` explicitly.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arity: Option<usize>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            args: Vec::new(),
            arity: None,
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<String>) -> Self {
        TypeRef {
            name: name.into(),
            args,
            arity: None,
        }
    }

    pub fn open(name: impl Into<String>, arity: usize) -> Self {
        TypeRef {
            name: name.into(),
            args: Vec::new(),
            arity: Some(arity),
        }
    }

    pub fn arity(&self) -> usize {
        self.arity.unwrap_or(self.args.len())
    }

    pub fn is_open(&self) -> bool {
        self.args.is_empty() && self.arity() > 0
    }

    pub fn key(&self) -> TypeKey {
        TypeKey::new(self.name.clone(), self.arity())
    }

    /// Rendered form, e.g. `System.IComparable<T>`.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            if self.arity() > 0 {
                let commas = ",".repeat(self.arity() - 1);
                return format!("{}<{commas}>", self.name);
            }
            return self.name.clone();
        }
        format!("{}<{}>", self.name, self.args.join(", "))
    }

    /// Replaces type parameters in the arguments.
    pub fn substitute(&self, subst: &Substitution) -> TypeRef {
        if subst.is_empty() {
            return self.clone();
        }
        TypeRef {
            name: self.name.clone(),
            args: self.args.iter().map(|a| subst.apply(a)).collect(),
            arity: self.arity,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Struct,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    Public,
    Internal,
    Protected,
    #[default]
    Private,
    ProtectedInternal,
    PrivateProtected,
}

impl Accessibility {
    pub fn keyword(&self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::Private => "private",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::PrivateProtected => "private protected",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Static,
    Abstract,
    Virtual,
    Override,
    Sealed,
    Partial,
    Readonly,
    Const,
    Volatile,
    Async,
    New,
    Extern,
    Unsafe,
    Required,
}

impl Modifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Virtual => "virtual",
            Modifier::Override => "override",
            Modifier::Sealed => "sealed",
            Modifier::Partial => "partial",
            Modifier::Readonly => "readonly",
            Modifier::Const => "const",
            Modifier::Volatile => "volatile",
            Modifier::Async => "async",
            Modifier::New => "new",
            Modifier::Extern => "extern",
            Modifier::Unsafe => "unsafe",
            Modifier::Required => "required",
        }
    }

    /// Whether the modifier may appear on an interface member declaration.
    pub fn allowed_on_interface(&self) -> bool {
        !matches!(
            self,
            Modifier::Abstract
                | Modifier::Virtual
                | Modifier::Override
                | Modifier::Sealed
                | Modifier::Partial
                | Modifier::Readonly
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Method,
    Property,
    Event,
    Field,
    Constructor,
}

impl MemberKind {
    /// Methods, properties and events: the members an interface can declare.
    pub fn is_contract_kind(&self) -> bool {
        matches!(self, MemberKind::Method | MemberKind::Property | MemberKind::Event)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub ty: String,
    pub name: String,
    /// `ref`, `out`, `in`, `params` or `this`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Param {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Param {
            ty: ty.into(),
            name: name.into(),
            modifier: None,
            default: None,
        }
    }
}

/// Implementation part of a member or accessor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    /// Declaration only (`;`).
    #[default]
    None,
    /// Statements between the braces, verbatim.
    Block(String),
    /// Expression after `=>`.
    Expr(String),
}

impl Body {
    pub fn is_none(&self) -> bool {
        matches!(self, Body::None)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessorKind {
    Get,
    Set,
    Init,
    Add,
    Remove,
}

impl AccessorKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            AccessorKind::Get => "get",
            AccessorKind::Set => "set",
            AccessorKind::Init => "init",
            AccessorKind::Add => "add",
            AccessorKind::Remove => "remove",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessor {
    pub kind: AccessorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessibility: Option<Accessibility>,
    #[serde(default, skip_serializing_if = "Body::is_none")]
    pub body: Body,
}

impl Accessor {
    pub fn auto(kind: AccessorKind) -> Self {
        Accessor {
            kind,
            accessibility: None,
            body: Body::None,
        }
    }
}

/// One declared member together with its source form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub kind: MemberKind,
    pub name: String,
    #[serde(default)]
    pub accessibility: Accessibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    /// Return type for methods; declared type for properties, fields and events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Param>,
    /// `where` clauses, without the keyword.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    /// Set for explicit interface implementations (`void IDisposable.Dispose()`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explicit_interface: Option<TypeRef>,
    /// Accessor list for properties and accessor-form events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessors: Option<Vec<Accessor>>,
    #[serde(default, skip_serializing_if = "Body::is_none")]
    pub body: Body,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<String>,
    /// Documentation comment lines, with or without the `///` prefix.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub docs: Vec<String>,
    /// Attribute lists as written, e.g. `[Obsolete]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub mixin_constructor: bool,
    #[serde(default)]
    pub location: Location,
}

impl Member {
    pub fn new(kind: MemberKind, name: impl Into<String>) -> Self {
        Member {
            kind,
            name: name.into(),
            accessibility: Accessibility::default(),
            modifiers: Vec::new(),
            ty: None,
            type_params: Vec::new(),
            params: Vec::new(),
            constraints: Vec::new(),
            explicit_interface: None,
            accessors: None,
            body: Body::None,
            initializer: None,
            docs: Vec::new(),
            attributes: Vec::new(),
            mixin_constructor: false,
            location: Location::default(),
        }
    }

    pub fn has_modifier(&self, m: Modifier) -> bool {
        self.modifiers.contains(&m)
    }

    pub fn is_static(&self) -> bool {
        self.has_modifier(Modifier::Static) || self.has_modifier(Modifier::Const)
    }

    pub fn is_abstract(&self) -> bool {
        self.has_modifier(Modifier::Abstract)
    }

    pub fn is_public(&self) -> bool {
        self.accessibility == Accessibility::Public
    }

    /// Parameter types in declaration order, used for signature matching.
    pub fn param_types(&self) -> Vec<String> {
        self.params
            .iter()
            .map(|p| match &p.modifier {
                Some(m) if m != "params" && m != "this" => format!("{m} {}", p.ty),
                _ => p.ty.clone(),
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    #[serde(default)]
    pub define_mixin: bool,
    /// Referenced mixin types, in attribute-declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub use_mixin: Vec<TypeRef>,
}

fn default_type_accessibility() -> Accessibility {
    Accessibility::Internal
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default = "default_type_accessibility")]
    pub accessibility: Accessibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<TypeRef>,
    /// Directly implemented interfaces, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<TypeRef>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub markers: Markers,
    #[serde(default)]
    pub location: Location,
}

impl TypeDeclaration {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        TypeDeclaration {
            namespace: namespace.into(),
            name: name.into(),
            kind: TypeKind::Class,
            accessibility: Accessibility::Public,
            modifiers: Vec::new(),
            type_params: Vec::new(),
            constraints: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            markers: Markers::default(),
            location: Location::default(),
        }
    }

    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn key(&self) -> TypeKey {
        TypeKey::new(self.qualified_name(), self.type_params.len())
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(&Modifier::Abstract)
    }

    pub fn is_partial(&self) -> bool {
        self.modifiers.contains(&Modifier::Partial)
    }

    /// Folds another part of the same partial type into this one.
    ///
    /// Members, interfaces and mixin references append in part order. The
    /// merged type stays partial only when every part is.
    pub fn merge_part(&mut self, part: &TypeDeclaration) {
        if !part.is_partial() {
            self.modifiers.retain(|m| *m != Modifier::Partial);
        }
        for modifier in &part.modifiers {
            if *modifier != Modifier::Partial && !self.modifiers.contains(modifier) {
                self.modifiers.push(*modifier);
            }
        }
        if self.base.is_none() {
            self.base = part.base.clone();
        }
        for iface in &part.interfaces {
            if !self.interfaces.contains(iface) {
                self.interfaces.push(iface.clone());
            }
        }
        self.members.extend(part.members.iter().cloned());
        self.markers.define_mixin |= part.markers.define_mixin;
        self.markers.use_mixin.extend(part.markers.use_mixin.iter().cloned());
    }

    /// Unqualified name with the generic parameter list, e.g. `Box<T>`.
    pub fn generic_name(&self) -> String {
        if self.type_params.is_empty() {
            self.name.clone()
        } else {
            format!("{}<{}>", self.name, self.type_params.join(", "))
        }
    }
}
