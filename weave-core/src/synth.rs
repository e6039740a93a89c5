#![forbid(unsafe_code)]

use weave_model::{Member, TypeDeclaration, TypeKey, TypeModel, TypeRef};

use crate::options::ResolverOptions;
use crate::render::declaration_only;
use crate::satisfaction::{contract_members, satisfied_members};

/// The synthesized minimal public contract of one mixin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityInterface {
    pub mixin: TypeKey,
    pub namespace: String,
    pub name: String,
    pub type_params: Vec<String>,
    pub constraints: Vec<String>,
    /// The mixin's own direct interfaces.
    pub bases: Vec<TypeRef>,
    /// Declaration-only forms, in the mixin's declaration order.
    pub members: Vec<Member>,
}

impl CapabilityInterface {
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Reference used in a consumer's base list. `args` are the type
    /// arguments of the use site; an open use keeps the mixin's own
    /// parameter names.
    pub fn reference(&self, args: &[String]) -> TypeRef {
        if self.type_params.is_empty() {
            return TypeRef::named(self.qualified_name());
        }
        let args = if args.is_empty() {
            self.type_params.clone()
        } else {
            args.to_vec()
        };
        TypeRef::generic(self.qualified_name(), args)
    }

    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Derives the capability interface of a validated mixin. Emits nothing.
pub fn synthesize_interface<M: TypeModel + ?Sized>(
    model: &M,
    mixin: &TypeDeclaration,
    options: &ResolverOptions,
) -> CapabilityInterface {
    let satisfied = satisfied_members(model, mixin);
    let members = contract_members(mixin, &satisfied)
        .into_iter()
        .map(declaration_only)
        .collect();

    CapabilityInterface {
        mixin: mixin.key(),
        namespace: mixin.namespace.clone(),
        name: options.interface_name(&mixin.name),
        type_params: mixin.type_params.clone(),
        constraints: mixin.constraints.clone(),
        bases: mixin.interfaces.clone(),
        members,
    }
}
