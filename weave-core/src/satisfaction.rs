#![forbid(unsafe_code)]

//! Interface-member satisfaction as an explicit set difference.
//!
//! `required` is every member declared by an interface in the mixin's
//! transitive closure; `candidates` is the mixin's own public instance
//! contract. The capability interface keeps `candidates - satisfied`, where
//! `satisfied = candidates ∩ required`.

use std::collections::BTreeSet;

use weave_model::{Member, MemberKind, Substitution, TypeDeclaration, TypeModel};

/// Signature identity used for satisfaction: kind, name and parameter types.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberKey {
    pub kind: MemberKind,
    pub name: String,
    pub params: Vec<String>,
}

impl MemberKey {
    pub fn of(member: &Member) -> Self {
        Self::with_substitution(member, &Substitution::default())
    }

    pub fn with_substitution(member: &Member, subst: &Substitution) -> Self {
        let params = match member.kind {
            MemberKind::Method => subst.apply_all(&member.param_types()),
            _ => Vec::new(),
        };
        MemberKey {
            kind: member.kind,
            name: member.name.clone(),
            params,
        }
    }
}

fn is_candidate(member: &Member) -> bool {
    member.kind.is_contract_kind()
        && member.is_public()
        && !member.is_static()
        && member.explicit_interface.is_none()
}

/// Keys of the mixin's own public, non-static contract members.
pub fn candidate_members(mixin: &TypeDeclaration) -> BTreeSet<MemberKey> {
    mixin
        .members
        .iter()
        .filter(|m| is_candidate(m))
        .map(MemberKey::of)
        .collect()
}

/// Keys of every member required by the mixin's interface closure, with each
/// interface's type arguments substituted in.
pub fn required_members<M: TypeModel + ?Sized>(model: &M, mixin: &TypeDeclaration) -> BTreeSet<MemberKey> {
    let mut required = BTreeSet::new();
    for iface in model.interface_closure(mixin) {
        let Some(decl) = model.lookup(&iface.key()) else {
            continue;
        };
        let subst = Substitution::new(&decl.type_params, &iface.args);
        for m in decl.members.iter().filter(|m| m.kind.is_contract_kind() && !m.is_static()) {
            required.insert(MemberKey::with_substitution(m, &subst));
        }
    }
    required
}

/// Members of the mixin that are the concrete implementation of an
/// inherited interface member.
pub fn satisfied_members<M: TypeModel + ?Sized>(model: &M, mixin: &TypeDeclaration) -> BTreeSet<MemberKey> {
    let required = required_members(model, mixin);
    candidate_members(mixin)
        .intersection(&required)
        .cloned()
        .collect()
}

/// Public, non-static members not already satisfied, in declaration order.
pub fn contract_members<'a>(mixin: &'a TypeDeclaration, satisfied: &BTreeSet<MemberKey>) -> Vec<&'a Member> {
    let retained: BTreeSet<MemberKey> = candidate_members(mixin)
        .difference(satisfied)
        .cloned()
        .collect();
    mixin
        .members
        .iter()
        .filter(|m| is_candidate(m) && retained.contains(&MemberKey::of(m)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_model::{Accessibility, Modifier, Param, Snapshot, TypeKind, TypeRef};

    fn public(kind: MemberKind, name: &str) -> Member {
        let mut m = Member::new(kind, name);
        m.accessibility = Accessibility::Public;
        m
    }

    fn comparer() -> TypeDeclaration {
        let mut d = TypeDeclaration::new("N", "IComparer");
        d.kind = TypeKind::Interface;
        d.type_params = vec!["T".to_string()];
        let mut cmp = Member::new(MemberKind::Method, "Compare");
        cmp.params = vec![Param::new("T", "a"), Param::new("T", "b")];
        d.members.push(cmp);
        d
    }

    #[test]
    fn generic_interface_member_is_satisfied_after_substitution() {
        let mut mixin = TypeDeclaration::new("N", "Sorter");
        mixin.modifiers = vec![Modifier::Abstract];
        mixin.interfaces = vec![TypeRef::generic("N.IComparer", vec!["int".to_string()])];
        let mut cmp = public(MemberKind::Method, "Compare");
        cmp.params = vec![Param::new("int", "a"), Param::new("int", "b")];
        mixin.members.push(cmp);
        mixin.members.push(public(MemberKind::Method, "Sort"));

        let snapshot = Snapshot::new(vec![comparer(), mixin.clone()]);
        let satisfied = satisfied_members(&snapshot, &mixin);
        assert_eq!(satisfied.len(), 1);

        let names: Vec<&str> = contract_members(&mixin, &satisfied)
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["Sort"]);
    }

    #[test]
    fn overload_with_other_params_is_not_satisfied() {
        let mut mixin = TypeDeclaration::new("N", "Sorter");
        mixin.interfaces = vec![TypeRef::generic("N.IComparer", vec!["int".to_string()])];
        let mut cmp = public(MemberKind::Method, "Compare");
        cmp.params = vec![Param::new("string", "a"), Param::new("string", "b")];
        mixin.members.push(cmp);

        let snapshot = Snapshot::new(vec![comparer(), mixin.clone()]);
        assert!(satisfied_members(&snapshot, &mixin).is_empty());
        assert_eq!(contract_members(&mixin, &BTreeSet::new()).len(), 1);
    }

    #[test]
    fn statics_private_and_fields_never_enter_the_contract() {
        let mut mixin = TypeDeclaration::new("N", "M");
        let mut s = public(MemberKind::Method, "Create");
        s.modifiers = vec![Modifier::Static];
        mixin.members.push(s);
        mixin.members.push(Member::new(MemberKind::Method, "Hidden"));
        mixin.members.push(public(MemberKind::Field, "count"));
        mixin.members.push(public(MemberKind::Constructor, "M"));
        mixin.members.push(public(MemberKind::Event, "Changed"));

        let names: Vec<&str> = contract_members(&mixin, &BTreeSet::new())
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["Changed"]);
    }
}
