#![forbid(unsafe_code)]

//! Rendering of capability interfaces and consumer augmentations into
//! generated source artifacts.

use serde::Serialize;
use weave_model::{Accessibility, TypeKey, TypeKind, TypeRef};

use crate::compose::ComposedMember;
use crate::consumer::ResolvedConsumer;
use crate::options::ResolverOptions;
use crate::render::{indent_line, render_declaration, render_full};
use crate::synth::CapabilityInterface;

const HEADER: &str = "// <auto-generated/>";

/// The generated partial part of one consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Augmentation {
    pub consumer: TypeKey,
    pub namespace: String,
    pub accessibility: Accessibility,
    pub kind: TypeKind,
    pub name: String,
    pub type_params: Vec<String>,
    pub usings: Vec<String>,
    pub interfaces: Vec<TypeRef>,
    pub members: Vec<ComposedMember>,
}

impl Augmentation {
    pub fn new(resolved: &ResolvedConsumer<'_>, members: Vec<ComposedMember>, options: &ResolverOptions) -> Self {
        let consumer = resolved.consumer;
        Augmentation {
            consumer: consumer.key(),
            namespace: consumer.namespace.clone(),
            accessibility: consumer.accessibility,
            kind: consumer.kind,
            name: consumer.name.clone(),
            type_params: consumer.type_params.clone(),
            usings: options.usings.clone(),
            interfaces: resolved.interfaces.clone(),
            members,
        }
    }

    pub fn generic_name(&self) -> String {
        if self.type_params.is_empty() {
            self.name.clone()
        } else {
            format!("{}<{}>", self.name, self.type_params.join(", "))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Interface,
    Augmentation,
}

/// One generated file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    /// The mixin or consumer the file was generated from.
    pub source: TypeKey,
    pub file_name: String,
    pub contents: String,
}

fn file_stem(qualified: &str, arity: usize) -> String {
    if arity == 0 {
        qualified.to_string()
    } else {
        format!("{qualified}`{arity}")
    }
}

impl Artifact {
    pub fn interface(iface: &CapabilityInterface) -> Self {
        Artifact {
            kind: ArtifactKind::Interface,
            source: iface.mixin.clone(),
            file_name: format!(
                "{}.g.cs",
                file_stem(&iface.qualified_name(), iface.type_params.len())
            ),
            contents: render_interface(iface),
        }
    }

    pub fn augmentation(aug: &Augmentation) -> Self {
        Artifact {
            kind: ArtifactKind::Augmentation,
            source: aug.consumer.clone(),
            file_name: format!(
                "{}.UseMixins.g.cs",
                file_stem(&aug.consumer.qualified, aug.consumer.arity)
            ),
            contents: render_augmentation(aug),
        }
    }
}

fn base_list(bases: &[TypeRef]) -> String {
    if bases.is_empty() {
        return String::new();
    }
    let names: Vec<String> = bases.iter().map(TypeRef::display).collect();
    format!(" : {}", names.join(", "))
}

fn push_namespace(out: &mut String, namespace: &str) {
    if !namespace.is_empty() {
        out.push_str(&format!("namespace {namespace};\n\n"));
    }
}

/// Emits members separated by blank lines, inside braces.
fn push_body<T>(out: &mut String, items: &[T], mut render: impl FnMut(&mut String, &T)) {
    out.push_str("{\n");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render(out, item);
    }
    out.push_str("}\n");
}

pub fn render_interface(iface: &CapabilityInterface) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\n\n");
    push_namespace(&mut out, &iface.namespace);

    let generics = if iface.type_params.is_empty() {
        String::new()
    } else {
        format!("<{}>", iface.type_params.join(", "))
    };
    out.push_str(&format!(
        "public interface {}{generics}{}\n",
        iface.name,
        base_list(&iface.bases)
    ));
    for clause in &iface.constraints {
        indent_line(&mut out, 1);
        out.push_str(&format!("where {clause}\n"));
    }
    push_body(&mut out, &iface.members, |out, m| render_declaration(out, 1, m));
    out
}

fn kind_keyword(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Class => "class",
        TypeKind::Interface => "interface",
        TypeKind::Struct => "struct",
    }
}

pub fn render_augmentation(aug: &Augmentation) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    for using in &aug.usings {
        out.push_str(&format!("using {using};\n"));
    }
    out.push('\n');
    push_namespace(&mut out, &aug.namespace);

    out.push_str(&format!(
        "{} partial {} {}{}\n",
        aug.accessibility.keyword(),
        kind_keyword(aug.kind),
        aug.generic_name(),
        base_list(&aug.interfaces)
    ));
    push_body(&mut out, &aug.members, |out, c| render_full(out, 1, &c.member));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_model::{Accessor, AccessorKind, Body, Member, MemberKind};

    fn iface() -> CapabilityInterface {
        let mut prop = Member::new(MemberKind::Property, "Count");
        prop.ty = Some("int".to_string());
        prop.accessors = Some(vec![Accessor::auto(AccessorKind::Get)]);
        let mut go = Member::new(MemberKind::Method, "Go");
        go.docs = vec!["<summary>Runs.</summary>".to_string()];
        CapabilityInterface {
            mixin: TypeKey::new("S.Runner", 1),
            namespace: "S".to_string(),
            name: "I_MxRunner".to_string(),
            type_params: vec!["T".to_string()],
            constraints: vec!["T : class".to_string()],
            bases: vec![TypeRef::named("System.IDisposable")],
            members: vec![prop, go],
        }
    }

    #[test]
    fn interface_layout() {
        let artifact = Artifact::interface(&iface());
        assert_eq!(artifact.file_name, "S.I_MxRunner`1.g.cs");
        assert_eq!(
            artifact.contents,
            "// <auto-generated/>\n\nnamespace S;\n\npublic interface I_MxRunner<T> : System.IDisposable\n    where T : class\n{\n    int Count { get; }\n\n    /// <summary>Runs.</summary>\n    void Go();\n}\n"
        );
    }

    #[test]
    fn augmentation_layout() {
        let mut m = Member::new(MemberKind::Method, "Go");
        m.accessibility = Accessibility::Public;
        m.body = Body::Expr("Run()".to_string());
        let aug = Augmentation {
            consumer: TypeKey::new("S.Host", 0),
            namespace: "S".to_string(),
            accessibility: Accessibility::Internal,
            kind: TypeKind::Class,
            name: "Host".to_string(),
            type_params: Vec::new(),
            usings: vec!["System".to_string()],
            interfaces: vec![TypeRef::named("S.I_MxRunner")],
            members: vec![ComposedMember {
                member: m,
                mixin: TypeKey::new("S.Runner", 0),
            }],
        };
        let artifact = Artifact::augmentation(&aug);
        assert_eq!(artifact.file_name, "S.Host.UseMixins.g.cs");
        assert_eq!(
            artifact.contents,
            "// <auto-generated/>\nusing System;\n\nnamespace S;\n\ninternal partial class Host : S.I_MxRunner\n{\n    public void Go() => Run();\n}\n"
        );
    }

    #[test]
    fn empty_interface_still_has_braces() {
        let mut i = iface();
        i.members.clear();
        i.bases.clear();
        i.constraints.clear();
        i.type_params.clear();
        i.namespace.clear();
        assert_eq!(
            render_interface(&i),
            "// <auto-generated/>\n\npublic interface I_MxRunner\n{\n}\n"
        );
    }
}
