#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use miette::IntoDiagnostic;
use serde::Serialize;
use weave_core::{ArtifactKind, Resolution, ResolverDiagnostic};

use crate::output::WriteOutcome;

pub const SCHEMA: &str = "weave.resolution.v1";

#[derive(Debug, Clone, Serialize)]
pub struct ResolutionReport {
    pub schema: &'static str,
    pub input: String,
    pub ok: bool,
    pub summary: Summary,
    pub artifacts: Vec<ArtifactEntry>,
    /// Generated files from earlier passes deleted by this one.
    pub removed: Vec<String>,
    pub diagnostics: Vec<DiagnosticEntry>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub interfaces: usize,
    pub augmentations: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtifactEntry {
    pub file: String,
    pub path: String,
    pub kind: ArtifactKind,
    pub source: String,
    pub sha256: String,
    pub written: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticEntry {
    pub code: &'static str,
    pub severity: &'static str,
    pub subject: String,
    pub message: String,
    pub location: LocationEntry,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationEntry {
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl From<&ResolverDiagnostic> for DiagnosticEntry {
    fn from(d: &ResolverDiagnostic) -> Self {
        Self {
            code: d.code.id(),
            severity: d.severity.display(),
            subject: d.subject.clone(),
            message: d.message.clone(),
            location: LocationEntry {
                file: d.location.file.clone(),
                line: d.location.line,
                col: d.location.col,
            },
        }
    }
}

pub fn build_report(
    input: &Path,
    ok: bool,
    resolution: &Resolution,
    outcomes: &[WriteOutcome],
    removed: &[PathBuf],
) -> ResolutionReport {
    let artifacts = resolution
        .artifacts
        .iter()
        .zip(outcomes)
        .map(|(a, o)| ArtifactEntry {
            file: a.file_name.clone(),
            path: display_path(&o.path),
            kind: a.kind,
            source: a.source.to_string(),
            sha256: o.sha256.clone(),
            written: o.written,
        })
        .collect();

    ResolutionReport {
        schema: SCHEMA,
        input: display_path(input),
        ok,
        summary: Summary {
            interfaces: resolution.interfaces.len(),
            augmentations: resolution.augmentations.len(),
            errors: resolution.errors().len(),
            warnings: resolution.warnings().len(),
        },
        artifacts,
        removed: removed.iter().map(|p| display_path(p)).collect(),
        diagnostics: resolution.diagnostics.iter().map(DiagnosticEntry::from).collect(),
    }
}

pub fn write_report(report: &ResolutionReport, out_path: &Path) -> miette::Result<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    let json = serde_json::to_string_pretty(report).into_diagnostic()?;
    std::fs::write(out_path, json).into_diagnostic()?;
    Ok(())
}

fn display_path(path: &Path) -> String {
    // Relative to the working directory when possible, `/`-separated.
    let p = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

    let mut s = p.to_string_lossy().to_string();
    if let Some(rest) = s.strip_prefix("\\\\?\\") {
        s = rest.to_string();
    }
    s = s.replace('\\', "/");

    if let Ok(cwd) = std::env::current_dir() {
        let mut cwd_s = cwd.to_string_lossy().to_string();
        if let Some(rest) = cwd_s.strip_prefix("\\\\?\\") {
            cwd_s = rest.to_string();
        }
        cwd_s = cwd_s.replace('\\', "/");

        let prefix = format!("{cwd_s}/");
        if let Some(rel) = s.strip_prefix(&prefix) {
            return rel.to_string();
        }
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_core::Resolver;
    use weave_model::{Modifier, Snapshot, TypeDeclaration, TypeRef};

    #[test]
    fn report_lists_artifacts_and_diagnostics() {
        let mut mixin = TypeDeclaration::new("S", "A");
        mixin.modifiers = vec![Modifier::Abstract];
        mixin.markers.define_mixin = true;
        let mut host = TypeDeclaration::new("S", "Host");
        host.markers.use_mixin = vec![TypeRef::named("S.A")];

        let resolution = Resolver::default().resolve(&Snapshot::new(vec![mixin, host]));
        let outcomes = crate::output::dry_run(&resolution.artifacts);
        let report = build_report(Path::new("snapshot.json"), false, &resolution, &outcomes, &[]);

        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["schema"], "weave.resolution.v1");
        assert_eq!(json["artifacts"][0]["file"], "S.I_MxA.g.cs");
        assert_eq!(json["artifacts"][0]["kind"], "interface");
        assert_eq!(json["diagnostics"][0]["code"], "MXN003");
        assert_eq!(json["diagnostics"][0]["severity"], "error");
        assert_eq!(json["summary"]["errors"], 1);
        assert_eq!(json["removed"].as_array().map(Vec::len), Some(0));
    }
}
