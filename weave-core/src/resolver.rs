#![forbid(unsafe_code)]

//! One resolution pass over a frozen snapshot.
//!
//! Phase one validates every mixin and synthesizes its interface; phase two
//! resolves every consumer against the resulting table. Units of both phases
//! are independent and may run on the rayon pool. Each unit carries its
//! declaration index and results are sorted by it before anything is emitted.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use tracing::{debug, info};
use weave_model::{TypeDeclaration, TypeKey, TypeModel};

use crate::compose::compose_members;
use crate::consumer::{resolve_consumer, ConsumerUsage};
use crate::diagnostics::{DiagnosticSink, ResolverDiagnostic, Severity};
use crate::emit::{Artifact, Augmentation};
use crate::options::ResolverOptions;
use crate::synth::{synthesize_interface, CapabilityInterface};
use crate::table::{MixinDefinition, MixinTable};
use crate::validator::validate_mixin;

/// Everything one pass produced.
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    /// In mixin declaration order.
    pub interfaces: Vec<CapabilityInterface>,
    /// In consumer declaration order.
    pub augmentations: Vec<Augmentation>,
    /// Interface files first, then augmentation files.
    pub artifacts: Vec<Artifact>,
    pub diagnostics: Vec<ResolverDiagnostic>,
}

impl Resolution {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    pub fn errors(&self) -> Vec<&ResolverDiagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error()).collect()
    }

    pub fn warnings(&self) -> Vec<&ResolverDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect()
    }

    pub fn artifact(&self, file_name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.file_name == file_name)
    }

    /// Forwards every diagnostic, in order, to an external sink.
    pub fn report_to(&self, sink: &mut dyn DiagnosticSink) {
        for diagnostic in &self.diagnostics {
            sink.emit(diagnostic.clone());
        }
    }
}

/// Output of one independent unit of work.
struct Unit<T> {
    index: usize,
    diagnostics: Vec<ResolverDiagnostic>,
    output: Option<T>,
}

fn run_units<I, T, F>(parallel: bool, items: &[I], f: F) -> Vec<Unit<T>>
where
    I: Sync,
    T: Send,
    F: Fn(&I) -> Unit<T> + Sync + Send,
{
    let mut units: Vec<Unit<T>> = if parallel {
        items.par_iter().map(f).collect()
    } else {
        items.iter().map(f).collect()
    };
    units.sort_by_key(|u| u.index);
    units
}

/// Every declared part of one consumer, in declaration order.
struct ConsumerParts<'a> {
    index: usize,
    first: &'a TypeDeclaration,
    rest: Vec<&'a TypeDeclaration>,
}

impl<'a> ConsumerParts<'a> {
    fn merged(&self) -> Cow<'a, TypeDeclaration> {
        if self.rest.is_empty() {
            return Cow::Borrowed(self.first);
        }
        let mut merged = self.first.clone();
        for part in &self.rest {
            merged.merge_part(part);
        }
        Cow::Owned(merged)
    }
}

/// Groups declarations by identity for every type that uses a mixin in any
/// of its parts. Parts without mixin references still contribute members.
fn consumer_parts(declarations: &[TypeDeclaration]) -> Vec<ConsumerParts<'_>> {
    let keys: BTreeSet<TypeKey> = declarations
        .iter()
        .filter(|d| !d.markers.use_mixin.is_empty())
        .map(TypeDeclaration::key)
        .collect();

    let mut positions: BTreeMap<TypeKey, usize> = BTreeMap::new();
    let mut groups: Vec<ConsumerParts<'_>> = Vec::new();
    for (index, decl) in declarations.iter().enumerate() {
        let key = decl.key();
        if !keys.contains(&key) {
            continue;
        }
        match positions.get(&key) {
            Some(&at) => groups[at].rest.push(decl),
            None => {
                positions.insert(key, groups.len());
                groups.push(ConsumerParts {
                    index,
                    first: decl,
                    rest: Vec::new(),
                });
            }
        }
    }
    groups
}

#[derive(Clone, Debug, Default)]
pub struct Resolver {
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(options: ResolverOptions) -> Self {
        Resolver { options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Runs one full pass. Never fails: every expected problem is a
    /// diagnostic in the returned [`Resolution`].
    pub fn resolve<M: TypeModel + ?Sized>(&self, model: &M) -> Resolution {
        let mut diagnostics = Vec::new();

        let mixin_units = self.resolve_mixins(model);
        let mut table = MixinTable::new();
        for unit in mixin_units {
            diagnostics.extend(unit.diagnostics);
            if let Some(def) = unit.output {
                table.insert(def);
            }
        }

        let consumer_units = self.resolve_consumers(model, &table);
        let mut augmentations = Vec::new();
        for unit in consumer_units {
            diagnostics.extend(unit.diagnostics);
            augmentations.extend(unit.output);
        }

        let interfaces: Vec<CapabilityInterface> = table
            .in_declaration_order()
            .into_iter()
            .map(|d| d.interface.clone())
            .collect();
        let artifacts: Vec<Artifact> = interfaces
            .iter()
            .map(Artifact::interface)
            .chain(augmentations.iter().map(Artifact::augmentation))
            .collect();

        let resolution = Resolution {
            interfaces,
            augmentations,
            artifacts,
            diagnostics,
        };
        info!(
            mixins = resolution.interfaces.len(),
            consumers = resolution.augmentations.len(),
            artifacts = resolution.artifacts.len(),
            errors = resolution.errors().len(),
            warnings = resolution.warnings().len(),
            "resolution pass complete"
        );
        resolution
    }

    fn resolve_mixins<'a, M: TypeModel + ?Sized>(&self, model: &'a M) -> Vec<Unit<MixinDefinition<'a>>> {
        // One candidate per identity; the first declaration defines the mixin.
        let mut seen = BTreeSet::new();
        let candidates: Vec<(usize, &'a TypeDeclaration)> = model
            .declarations()
            .iter()
            .enumerate()
            .filter(|(_, d)| d.markers.define_mixin && seen.insert(d.key()))
            .collect();

        let options = &self.options;
        run_units(options.parallel, &candidates, |&(index, decl)| {
            let mut diagnostics: Vec<ResolverDiagnostic> = Vec::new();
            let output = validate_mixin(decl, options, &mut diagnostics).then(|| {
                let interface = synthesize_interface(model, decl, options);
                debug!(
                    mixin = %decl.key(),
                    members = interface.members.len(),
                    "synthesized capability interface"
                );
                MixinDefinition { index, decl, interface }
            });
            Unit {
                index,
                diagnostics,
                output,
            }
        })
    }

    fn resolve_consumers<M: TypeModel + ?Sized>(&self, model: &M, table: &MixinTable<'_>) -> Vec<Unit<Augmentation>> {
        let consumers = consumer_parts(model.declarations());

        let options = &self.options;
        run_units(options.parallel, &consumers, |parts| {
            let index = parts.index;
            let mut diagnostics: Vec<ResolverDiagnostic> = Vec::new();
            let consumer = parts.merged();
            let usage = ConsumerUsage::new(&consumer);
            let output = resolve_consumer(model, &usage, table, &mut diagnostics)
                .filter(|resolved| !resolved.mixins.is_empty())
                .map(|resolved| {
                    let members = compose_members(&resolved, options, &mut diagnostics);
                    Augmentation::new(&resolved, members, options)
                });
            Unit {
                index,
                diagnostics,
                output,
            }
        })
    }
}
