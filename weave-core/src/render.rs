#![forbid(unsafe_code)]

//! Printing members back to source, as full declarations or as
//! declaration-only contract entries.

use weave_model::{Accessor, Body, Member, MemberKind};

pub(crate) const INDENT: &str = "    ";

pub(crate) fn indent_line(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str(INDENT);
    }
}

fn push_line(out: &mut String, indent: usize, text: &str) {
    indent_line(out, indent);
    out.push_str(text);
    out.push('\n');
}

fn push_docs(out: &mut String, indent: usize, docs: &[String]) {
    for line in docs {
        let trimmed = line.trim_start();
        if trimmed.starts_with("///") {
            push_line(out, indent, trimmed.trim_end());
        } else if trimmed.is_empty() {
            push_line(out, indent, "///");
        } else {
            push_line(out, indent, &format!("/// {}", line.trim_end()));
        }
    }
}

fn push_attributes(out: &mut String, indent: usize, attributes: &[String]) {
    for attr in attributes {
        push_line(out, indent, attr.trim());
    }
}

/// Strips common leading whitespace and surrounding blank lines.
fn dedent(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().map(|l| l.trim_end()).collect();
    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return Vec::new();
    };
    let body = &lines[first..=last];
    let margin = body
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);
    body.iter()
        .map(|l| l.chars().skip(margin).collect())
        .collect()
}

fn push_block(out: &mut String, indent: usize, text: &str) {
    push_line(out, indent, "{");
    for line in dedent(text) {
        if line.is_empty() {
            out.push('\n');
        } else {
            push_line(out, indent + 1, &line);
        }
    }
    push_line(out, indent, "}");
}

fn params(member: &Member) -> String {
    member
        .params
        .iter()
        .map(|p| {
            let mut s = String::new();
            if let Some(m) = &p.modifier {
                s.push_str(m);
                s.push(' ');
            }
            s.push_str(&p.ty);
            s.push(' ');
            s.push_str(&p.name);
            if let Some(d) = &p.default {
                s.push_str(" = ");
                s.push_str(d);
            }
            s
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Member header up to (not including) its body or accessor list.
fn header(member: &Member, with_accessibility: bool) -> String {
    let mut parts: Vec<String> = Vec::new();
    if with_accessibility && member.explicit_interface.is_none() {
        parts.push(member.accessibility.keyword().to_string());
    }
    parts.extend(member.modifiers.iter().map(|m| m.keyword().to_string()));

    let qualified_name = match &member.explicit_interface {
        Some(iface) => format!("{}.{}", iface.display(), member.name),
        None => member.name.clone(),
    };
    let ty = member.ty.clone();

    match member.kind {
        MemberKind::Method => {
            parts.push(ty.unwrap_or_else(|| "void".to_string()));
            let tps = if member.type_params.is_empty() {
                String::new()
            } else {
                format!("<{}>", member.type_params.join(", "))
            };
            let mut sig = format!("{qualified_name}{tps}({})", params(member));
            for c in &member.constraints {
                sig.push_str(" where ");
                sig.push_str(c);
            }
            parts.push(sig);
        }
        MemberKind::Constructor => parts.push(format!("{}({})", member.name, params(member))),
        MemberKind::Property | MemberKind::Field => {
            parts.push(ty.unwrap_or_else(|| "object".to_string()));
            parts.push(qualified_name);
        }
        MemberKind::Event => {
            parts.push("event".to_string());
            parts.push(ty.unwrap_or_else(|| "EventHandler".to_string()));
            parts.push(qualified_name);
        }
    }
    parts.join(" ")
}

fn accessor_head(a: &Accessor) -> String {
    match a.accessibility {
        Some(acc) => format!("{} {}", acc.keyword(), a.kind.keyword()),
        None => a.kind.keyword().to_string(),
    }
}

fn inline_accessor(a: &Accessor) -> String {
    match &a.body {
        Body::Expr(e) => format!("{} => {e};", accessor_head(a)),
        _ => format!("{};", accessor_head(a)),
    }
}

fn initializer_suffix(member: &Member) -> String {
    member
        .initializer
        .as_ref()
        .map(|i| format!(" = {i}"))
        .unwrap_or_default()
}

fn push_with_body(out: &mut String, indent: usize, head: &str, body: &Body) {
    match body {
        Body::None => push_line(out, indent, &format!("{head};")),
        Body::Expr(e) => push_line(out, indent, &format!("{head} => {e};")),
        Body::Block(text) => {
            push_line(out, indent, head);
            push_block(out, indent, text);
        }
    }
}

fn auto_initializer(member: &Member) -> String {
    match &member.initializer {
        Some(_) => format!("{};", initializer_suffix(member)),
        None => String::new(),
    }
}

fn push_accessors(out: &mut String, indent: usize, head: &str, member: &Member, accessors: &[Accessor]) {
    let multiline = accessors.iter().any(|a| matches!(a.body, Body::Block(_)));
    if !multiline {
        let list = accessors.iter().map(inline_accessor).collect::<Vec<_>>().join(" ");
        push_line(
            out,
            indent,
            &format!("{head} {{ {list} }}{}", auto_initializer(member)),
        );
        return;
    }

    push_line(out, indent, head);
    push_line(out, indent, "{");
    for a in accessors {
        match &a.body {
            Body::Block(text) => {
                push_line(out, indent + 1, &accessor_head(a));
                push_block(out, indent + 1, text);
            }
            _ => push_line(out, indent + 1, &inline_accessor(a)),
        }
    }
    push_line(out, indent, &format!("}}{}", auto_initializer(member)));
}

/// Full declaration, bodies and initializers included.
pub fn render_full(out: &mut String, indent: usize, member: &Member) {
    push_docs(out, indent, &member.docs);
    push_attributes(out, indent, &member.attributes);
    let head = header(member, true);

    match member.kind {
        MemberKind::Method | MemberKind::Constructor => push_with_body(out, indent, &head, &member.body),
        MemberKind::Field => push_line(out, indent, &format!("{head}{};", initializer_suffix(member))),
        MemberKind::Property => match &member.accessors {
            Some(accessors) => push_accessors(out, indent, &head, member, accessors),
            None => push_with_body(out, indent, &head, &member.body),
        },
        MemberKind::Event => match &member.accessors {
            Some(accessors) => push_accessors(out, indent, &head, member, accessors),
            None => push_line(out, indent, &format!("{head}{};", initializer_suffix(member))),
        },
    }
}

/// Contract form of `member`: no body, no initializer, auto accessors, and
/// only the modifiers an interface member may carry.
///
/// Expression-bodied properties become `{ get; }`. Events always take the
/// field-like form, as an interface cannot declare accessor bodies.
pub fn declaration_only(member: &Member) -> Member {
    let mut out = member.clone();
    out.body = Body::None;
    out.initializer = None;
    out.modifiers.retain(|m| m.allowed_on_interface());
    out.accessors = match member.kind {
        MemberKind::Property => Some(match &member.accessors {
            Some(list) => list.iter().map(|a| Accessor::auto(a.kind)).collect(),
            None => vec![Accessor::auto(weave_model::AccessorKind::Get)],
        }),
        _ => None,
    };
    out
}

/// Interface entry for a member already passed through [`declaration_only`].
pub fn render_declaration(out: &mut String, indent: usize, member: &Member) {
    push_docs(out, indent, &member.docs);
    push_attributes(out, indent, &member.attributes);
    let head = header(member, false);
    match (&member.kind, &member.accessors) {
        (MemberKind::Property, Some(accessors)) => {
            let list = accessors
                .iter()
                .map(|a| format!("{};", a.kind.keyword()))
                .collect::<Vec<_>>()
                .join(" ");
            push_line(out, indent, &format!("{head} {{ {list} }}"));
        }
        _ => push_line(out, indent, &format!("{head};")),
    }
}
