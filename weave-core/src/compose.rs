#![forbid(unsafe_code)]

//! Member copy from mixins into a consumer's augmentation.
//!
//! A copy conflicts only with the consumer's members as originally declared.
//! Two mixins supplying the same name are handled by
//! [`CrossMixinPolicy`](crate::options::CrossMixinPolicy).

use std::collections::{BTreeMap, BTreeSet};

use weave_model::{Accessor, Body, Member, MemberKind, Param, Substitution, TypeKey};

use crate::consumer::{AppliedMixin, ResolvedConsumer};
use crate::diagnostics::{DiagnosticFactory, DiagnosticSink, Severity};
use crate::options::{CrossMixinPolicy, ResolverOptions};

/// A member copied into an augmentation, tagged with the mixin it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposedMember {
    pub member: Member,
    pub mixin: TypeKey,
}

/// Name a member occupies in its type. Explicit interface implementations
/// live under their interface-qualified name.
fn slot_name(member: &Member) -> String {
    match &member.explicit_interface {
        Some(iface) => format!("{}.{}", iface.display(), member.name),
        None => member.name.clone(),
    }
}

fn is_copyable(member: &Member) -> bool {
    member.kind != MemberKind::Constructor && !member.is_static() && !member.is_abstract()
}

fn substitute_body(body: &Body, subst: &Substitution) -> Body {
    match body {
        Body::None => Body::None,
        Body::Block(text) => Body::Block(subst.apply(text)),
        Body::Expr(text) => Body::Expr(subst.apply(text)),
    }
}

/// Rewrites a member for a closed generic use of its mixin.
pub fn substitute_member(member: &Member, subst: &Substitution) -> Member {
    if subst.is_empty() {
        return member.clone();
    }
    let mut out = member.clone();
    out.ty = member.ty.as_deref().map(|t| subst.apply(t));
    out.params = member
        .params
        .iter()
        .map(|p| Param {
            ty: subst.apply(&p.ty),
            default: p.default.as_deref().map(|d| subst.apply(d)),
            ..p.clone()
        })
        .collect();
    out.constraints = subst.apply_all(&member.constraints);
    out.explicit_interface = member.explicit_interface.as_ref().map(|i| i.substitute(subst));
    out.body = substitute_body(&member.body, subst);
    out.initializer = member.initializer.as_deref().map(|i| subst.apply(i));
    out.accessors = member.accessors.as_ref().map(|list| {
        list.iter()
            .map(|a| Accessor {
                body: substitute_body(&a.body, subst),
                ..a.clone()
            })
            .collect()
    });
    out
}

/// Produces the ordered member sequence for one resolved consumer: mixins in
/// attribute order, members in each mixin's declaration order.
pub fn compose_members(
    resolved: &ResolvedConsumer<'_>,
    options: &ResolverOptions,
    sink: &mut dyn DiagnosticSink,
) -> Vec<ComposedMember> {
    let consumer = resolved.consumer;
    let original: BTreeSet<String> = consumer.members.iter().map(slot_name).collect();
    // slot -> position in `resolved.mixins` of the first supplier
    let mut suppliers: BTreeMap<String, usize> = BTreeMap::new();
    let mut out = Vec::new();

    for (position, applied) in resolved.mixins.iter().enumerate() {
        for member in applied.definition.decl.members.iter().filter(|m| is_copyable(m)) {
            let slot = slot_name(member);
            if original.contains(&slot) {
                sink.emit(DiagnosticFactory::member_conflict(
                    consumer,
                    member,
                    &applied.display_name(),
                ));
                continue;
            }

            if let Some(&first) = suppliers.get(&slot) {
                if first != position && !admit_duplicate(resolved, first, applied, member, options, sink) {
                    continue;
                }
            } else {
                suppliers.insert(slot, position);
            }

            out.push(ComposedMember {
                member: substitute_member(member, &applied.substitution),
                mixin: applied.definition.key(),
            });
        }
    }
    out
}

/// Applies the cross-mixin policy to a later duplicate. Returns whether the
/// member is still copied.
fn admit_duplicate(
    resolved: &ResolvedConsumer<'_>,
    first: usize,
    later: &AppliedMixin<'_>,
    member: &Member,
    options: &ResolverOptions,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    let policy = options.cross_mixin_conflicts;
    if policy == CrossMixinPolicy::Allow {
        return true;
    }
    let first_name = resolved.mixins[first].display_name();
    let diagnostic = DiagnosticFactory::duplicate_mixin_member(
        resolved.consumer,
        member,
        &first_name,
        &later.display_name(),
    );
    match policy {
        CrossMixinPolicy::Reject => {
            sink.emit(diagnostic.with_severity(Severity::Error));
            false
        }
        _ => {
            sink.emit(diagnostic);
            true
        }
    }
}
