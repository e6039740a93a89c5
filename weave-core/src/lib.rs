#![forbid(unsafe_code)]

//! Compile-time mixin composition.
//!
//! Given a [`TypeModel`](weave_model::TypeModel) snapshot, a [`Resolver`]
//! validates every type marked as a mixin, synthesizes its capability
//! interface, and produces one partial-type augmentation per consumer that
//! adopts the interfaces and receives copies of the mixins' members.

pub mod compose;
pub mod consumer;
pub mod diagnostics;
pub mod emit;
pub mod options;
mod render;
pub mod resolver;
pub mod satisfaction;
pub mod synth;
pub mod table;
pub mod validator;

pub use compose::{compose_members, substitute_member, ComposedMember};
pub use consumer::{resolve_consumer, AppliedMixin, ConsumerUsage, ResolvedConsumer};
pub use diagnostics::{
    DiagnosticCode, DiagnosticFactory, DiagnosticReporter, DiagnosticSink, ResolverDiagnostic, Severity,
};
pub use emit::{render_augmentation, render_interface, Artifact, ArtifactKind, Augmentation};
pub use options::{CrossMixinPolicy, ResolverOptions};
pub use render::{declaration_only, render_declaration, render_full};
pub use resolver::{Resolution, Resolver};
pub use satisfaction::{contract_members, satisfied_members, MemberKey};
pub use synth::{synthesize_interface, CapabilityInterface};
pub use table::{MixinDefinition, MixinTable};
pub use validator::validate_mixin;
