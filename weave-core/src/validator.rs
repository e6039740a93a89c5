#![forbid(unsafe_code)]

use weave_model::TypeDeclaration;

use crate::diagnostics::{DiagnosticFactory, DiagnosticSink};
use crate::options::ResolverOptions;

/// Checks structural eligibility of a mixin candidate.
///
/// Returns `false` (after reporting why) when the type must not be
/// synthesized. The mixin-constructor count only ever warns.
pub fn validate_mixin(decl: &TypeDeclaration, options: &ResolverOptions, sink: &mut dyn DiagnosticSink) -> bool {
    if !decl.is_abstract() {
        sink.emit(DiagnosticFactory::mixin_not_abstract(decl));
        return false;
    }

    if let Some(base) = &decl.base {
        if !options.is_root_type(base) {
            sink.emit(DiagnosticFactory::mixin_inherits_class(decl, base));
            return false;
        }
    }

    if options.check_mixin_constructors {
        let count = decl.members.iter().filter(|m| m.mixin_constructor).count();
        if count > 1 {
            sink.emit(DiagnosticFactory::multiple_mixin_constructors(decl, count));
        }
    }

    true
}
