#![forbid(unsafe_code)]

//! Structured resolver diagnostics.
//!
//! Every expected validation failure becomes a [`ResolverDiagnostic`] handed
//! to a [`DiagnosticSink`]; nothing here is ever returned as an `Err`.

use std::fmt;

use miette::{Diagnostic, LabeledSpan};
use thiserror::Error;
use weave_model::{Location, Member, TypeDeclaration, TypeRef};

/// Diagnostic severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Error that must be fixed
    Error,
    /// Warning that should be addressed
    Warning,
    /// Informational hint
    Info,
}

impl Severity {
    pub fn display(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    fn to_miette(self) -> miette::Severity {
        match self {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
            Severity::Info => miette::Severity::Advice,
        }
    }
}

/// Stable diagnostic codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticCode {
    MixinNotAbstract,
    MixinInheritsClass,
    ConsumerNotPartial,
    InvalidMixinReference,
    MemberConflict,
    DuplicateMixinMember,
    MultipleMixinConstructors,
}

impl DiagnosticCode {
    pub fn id(&self) -> &'static str {
        match self {
            DiagnosticCode::MixinNotAbstract => "MXN001",
            DiagnosticCode::MixinInheritsClass => "MXN002",
            DiagnosticCode::ConsumerNotPartial => "MXN003",
            DiagnosticCode::InvalidMixinReference => "MXN004",
            DiagnosticCode::MemberConflict => "MXN005",
            DiagnosticCode::DuplicateMixinMember => "MXN006",
            DiagnosticCode::MultipleMixinConstructors => "MXN007",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DiagnosticCode::MixinNotAbstract => "mixin class must be abstract",
            DiagnosticCode::MixinInheritsClass => "mixin class must not inherit a class",
            DiagnosticCode::ConsumerNotPartial => "class using a mixin must be partial",
            DiagnosticCode::InvalidMixinReference => "use-mixin type must be a valid mixin",
            DiagnosticCode::MemberConflict => "member conflict when applying mixin",
            DiagnosticCode::DuplicateMixinMember => "member supplied by more than one mixin",
            DiagnosticCode::MultipleMixinConstructors => "more than one mixin constructor",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::DuplicateMixinMember | DiagnosticCode::MultipleMixinConstructors => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One diagnostic record: code, severity, message and where it points.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ResolverDiagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    /// Qualified name of the type the diagnostic is about.
    pub subject: String,
}

impl ResolverDiagnostic {
    pub fn new(code: DiagnosticCode, subject: impl Into<String>, location: Location, message: String) -> Self {
        ResolverDiagnostic {
            code,
            severity: code.default_severity(),
            message,
            location,
            subject: subject.into(),
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Format the diagnostic as a single line.
    pub fn display(&self) -> String {
        format!(
            "{}[{}]: {}: {}",
            self.severity.display(),
            self.code.id(),
            self.location.display(),
            self.message
        )
    }
}

impl Diagnostic for ResolverDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code.id()))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity.to_miette())
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        if self.location.file.is_empty() {
            return Some(Box::new(self.code.title()));
        }
        Some(Box::new(format!("{} (at {})", self.code.title(), self.location.display())))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.location.len == 0 {
            return None;
        }
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.code.title().to_string()),
            self.location.span(),
        ))))
    }
}

/// Factory for the resolver's diagnostics
pub struct DiagnosticFactory;

impl DiagnosticFactory {
    pub fn mixin_not_abstract(decl: &TypeDeclaration) -> ResolverDiagnostic {
        ResolverDiagnostic::new(
            DiagnosticCode::MixinNotAbstract,
            decl.qualified_name(),
            decl.location.clone(),
            format!("class '{}' is marked as a mixin but is not abstract", decl.name),
        )
    }

    pub fn mixin_inherits_class(decl: &TypeDeclaration, base: &TypeRef) -> ResolverDiagnostic {
        ResolverDiagnostic::new(
            DiagnosticCode::MixinInheritsClass,
            decl.qualified_name(),
            decl.location.clone(),
            format!(
                "mixin '{}' must not inherit from another class (only the root type is allowed, found '{}')",
                decl.name,
                base.display()
            ),
        )
    }

    pub fn multiple_mixin_constructors(decl: &TypeDeclaration, count: usize) -> ResolverDiagnostic {
        ResolverDiagnostic::new(
            DiagnosticCode::MultipleMixinConstructors,
            decl.qualified_name(),
            decl.location.clone(),
            format!(
                "mixin '{}' declares {} mixin constructors; at most one is allowed",
                decl.name, count
            ),
        )
    }

    pub fn consumer_not_partial(consumer: &TypeDeclaration) -> ResolverDiagnostic {
        ResolverDiagnostic::new(
            DiagnosticCode::ConsumerNotPartial,
            consumer.qualified_name(),
            consumer.location.clone(),
            format!("class '{}' uses a mixin but is not declared partial", consumer.name),
        )
    }

    pub fn invalid_mixin_reference(consumer: &TypeDeclaration, reference: &TypeRef) -> ResolverDiagnostic {
        ResolverDiagnostic::new(
            DiagnosticCode::InvalidMixinReference,
            consumer.qualified_name(),
            consumer.location.clone(),
            format!(
                "type '{}' supplied to use-mixin is not a valid mixin",
                reference.display()
            ),
        )
    }

    pub fn member_conflict(consumer: &TypeDeclaration, member: &Member, mixin: &str) -> ResolverDiagnostic {
        ResolverDiagnostic::new(
            DiagnosticCode::MemberConflict,
            consumer.qualified_name(),
            consumer.location.clone(),
            format!(
                "class '{}' already contains a member named '{}' required by mixin '{}'",
                consumer.name, member.name, mixin
            ),
        )
    }

    pub fn duplicate_mixin_member(
        consumer: &TypeDeclaration,
        member: &Member,
        first: &str,
        second: &str,
    ) -> ResolverDiagnostic {
        ResolverDiagnostic::new(
            DiagnosticCode::DuplicateMixinMember,
            consumer.qualified_name(),
            consumer.location.clone(),
            format!(
                "member '{}' of class '{}' is supplied by both mixin '{}' and mixin '{}'",
                member.name, consumer.name, first, second
            ),
        )
    }
}

/// Channel accepting diagnostic records.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: ResolverDiagnostic);
}

impl DiagnosticSink for Vec<ResolverDiagnostic> {
    fn emit(&mut self, diagnostic: ResolverDiagnostic) {
        self.push(diagnostic);
    }
}

/// Diagnostic collector/reporter
#[derive(Debug, Default)]
pub struct DiagnosticReporter {
    diagnostics: Vec<ResolverDiagnostic>,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        DiagnosticReporter {
            diagnostics: Vec::new(),
        }
    }

    /// Add a diagnostic
    pub fn add(&mut self, diagnostic: ResolverDiagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Get all diagnostics
    pub fn diagnostics(&self) -> &[ResolverDiagnostic] {
        &self.diagnostics
    }

    /// Get only error diagnostics
    pub fn errors(&self) -> Vec<&ResolverDiagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error()).collect()
    }

    pub fn warnings(&self) -> Vec<&ResolverDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .collect()
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    /// Report all diagnostics as formatted lines
    pub fn report(&self) -> String {
        let mut output = String::new();
        for diag in &self.diagnostics {
            output.push_str(&diag.display());
            output.push('\n');
        }
        output
    }
}

impl DiagnosticSink for DiagnosticReporter {
    fn emit(&mut self, diagnostic: ResolverDiagnostic) {
        self.add(diagnostic);
    }
}
