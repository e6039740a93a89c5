#![forbid(unsafe_code)]

//! Consumer resolution: eligibility, reference dedup and the merged
//! base-interface list.

use std::collections::BTreeSet;

use tracing::debug;
use weave_model::{Substitution, TypeDeclaration, TypeKey, TypeModel, TypeRef};

use crate::diagnostics::{DiagnosticFactory, DiagnosticSink};
use crate::table::{MixinDefinition, MixinTable};

/// A consumer and its distinct mixin references, in attribute order.
#[derive(Clone, Debug)]
pub struct ConsumerUsage<'a> {
    pub consumer: &'a TypeDeclaration,
    pub mixins: Vec<&'a TypeRef>,
}

impl<'a> ConsumerUsage<'a> {
    /// Collapses repeated references. Two references are the same when both
    /// the identity and the type arguments match, however the handle was
    /// written.
    pub fn new(consumer: &'a TypeDeclaration) -> Self {
        let mut seen: BTreeSet<(TypeKey, Vec<String>)> = BTreeSet::new();
        let mixins = consumer
            .markers
            .use_mixin
            .iter()
            .filter(|r| seen.insert((r.key(), r.args.clone())))
            .collect();
        ConsumerUsage { consumer, mixins }
    }
}

/// One valid reference bound to its definition.
#[derive(Clone, Debug)]
pub struct AppliedMixin<'a> {
    pub definition: &'a MixinDefinition<'a>,
    pub reference: TypeRef,
    /// Effective type arguments; the mixin's own parameters for an open use.
    pub args: Vec<String>,
    pub substitution: Substitution,
}

impl<'a> AppliedMixin<'a> {
    fn bind(definition: &'a MixinDefinition<'a>, reference: &TypeRef) -> Self {
        let params = &definition.decl.type_params;
        let args = if reference.args.is_empty() {
            params.clone()
        } else {
            reference.args.clone()
        };
        AppliedMixin {
            definition,
            reference: reference.clone(),
            substitution: Substitution::new(params, &args),
            args,
        }
    }

    /// Short name used in messages, e.g. `Pool<Person>`.
    pub fn display_name(&self) -> String {
        let name = self.definition.decl.name.clone();
        if self.args.is_empty() {
            name
        } else {
            TypeRef::generic(name, self.args.clone()).display()
        }
    }

    /// Capability-interface reference for this use.
    pub fn capability(&self) -> TypeRef {
        self.definition.interface.reference(&self.args)
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedConsumer<'a> {
    pub consumer: &'a TypeDeclaration,
    pub mixins: Vec<AppliedMixin<'a>>,
    /// Interfaces the augmentation adds, in emission order.
    pub interfaces: Vec<TypeRef>,
}

/// Resolves one consumer against the pass's mixin table.
///
/// Returns `None` when the consumer is not partial. Invalid references are
/// reported and skipped; the rest still apply.
pub fn resolve_consumer<'a, M: TypeModel + ?Sized>(
    model: &M,
    usage: &ConsumerUsage<'a>,
    table: &'a MixinTable<'a>,
    sink: &mut dyn DiagnosticSink,
) -> Option<ResolvedConsumer<'a>> {
    let consumer = usage.consumer;
    if !consumer.is_partial() {
        sink.emit(DiagnosticFactory::consumer_not_partial(consumer));
        return None;
    }

    // An open `Pool<>` and a self-named `Pool<T>` bind to the same arguments.
    let mut bound: BTreeSet<(TypeKey, Vec<String>)> = BTreeSet::new();
    let mut mixins = Vec::with_capacity(usage.mixins.len());
    for reference in &usage.mixins {
        match table.get(&reference.key()) {
            Some(definition) => {
                let applied = AppliedMixin::bind(definition, reference);
                if bound.insert((definition.key(), applied.args.clone())) {
                    mixins.push(applied);
                }
            }
            None => sink.emit(DiagnosticFactory::invalid_mixin_reference(consumer, reference)),
        }
    }

    let mut present: BTreeSet<String> = model
        .interface_closure(consumer)
        .iter()
        .map(TypeRef::display)
        .collect();
    let mut interfaces = Vec::new();
    for applied in &mixins {
        let own = applied
            .definition
            .interface
            .bases
            .iter()
            .map(|b| b.substitute(&applied.substitution));
        for iface in own.chain(std::iter::once(applied.capability())) {
            if present.insert(iface.display()) {
                interfaces.push(iface);
            }
        }
    }

    debug!(
        consumer = %consumer.key(),
        mixins = mixins.len(),
        interfaces = interfaces.len(),
        "resolved consumer"
    );

    Some(ResolvedConsumer {
        consumer,
        mixins,
        interfaces,
    })
}
