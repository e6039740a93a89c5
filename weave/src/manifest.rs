#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;
use weave_core::ResolverOptions;

pub const MANIFEST_NAME: &str = "weave.toml";

#[derive(Debug, Error, Diagnostic)]
#[error("manifest error: {message}")]
#[diagnostic(code(weave::manifest))]
pub struct ManifestError {
    pub message: String,
}

#[derive(Clone, Debug)]
pub struct ResolvedManifest {
    pub manifest_path: Option<PathBuf>,
    pub project_root: PathBuf,

    pub resolver: ResolverOptions,

    /// Directory generated files are written to.
    pub out_dir: PathBuf,

    /// JSON report path, when one was requested.
    pub report: Option<PathBuf>,
}

impl ResolvedManifest {
    pub fn empty(project_root: PathBuf) -> Self {
        Self {
            manifest_path: None,
            out_dir: project_root.join(DEFAULT_OUT_DIR),
            project_root,
            resolver: ResolverOptions::default(),
            report: None,
        }
    }
}

const DEFAULT_OUT_DIR: &str = "generated";

#[derive(Clone, Debug, Default, serde::Deserialize)]
struct Manifest {
    #[serde(default)]
    resolver: Option<ResolverOptions>,

    #[serde(default)]
    output: Option<Output>,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
struct Output {
    #[serde(default)]
    dir: Option<String>,

    #[serde(default)]
    report: Option<String>,
}

pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    let mut cur = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start.to_path_buf()
    };

    loop {
        let candidate = cur.join(MANIFEST_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        let parent = cur.parent().map(|p| p.to_path_buf());
        match parent {
            Some(p) => cur = p,
            None => return None,
        }
    }
}

/// Finds `weave.toml` above `start` and resolves it. No manifest means
/// defaults rooted at the input's directory.
pub fn load_resolved_manifest(start: &Path) -> Result<ResolvedManifest, ManifestError> {
    let project_root = if start.is_file() {
        start.parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    } else {
        start.to_path_buf()
    };

    let Some(manifest_path) = find_manifest(&project_root) else {
        return Ok(ResolvedManifest::empty(project_root));
    };

    let manifest_dir = manifest_path
        .parent()
        .ok_or_else(|| ManifestError {
            message: "manifest has no parent directory".to_string(),
        })?
        .to_path_buf();

    let raw = fs::read_to_string(&manifest_path).map_err(|e| ManifestError {
        message: format!("failed to read {}: {e}", manifest_path.display()),
    })?;

    parse_manifest(&raw, &manifest_path, &manifest_dir)
}

fn parse_manifest(raw: &str, manifest_path: &Path, manifest_dir: &Path) -> Result<ResolvedManifest, ManifestError> {
    let parsed: Manifest = toml::from_str(raw).map_err(|e| ManifestError {
        message: format!("failed to parse {}: {e}", manifest_path.display()),
    })?;

    let mut out = ResolvedManifest::empty(manifest_dir.to_path_buf());
    out.manifest_path = Some(manifest_path.to_path_buf());

    if let Some(resolver) = parsed.resolver {
        out.resolver = resolver;
        out.resolver.usings = dedup_strings(std::mem::take(&mut out.resolver.usings));
    }

    if let Some(output) = parsed.output {
        if let Some(dir) = output.dir {
            out.out_dir = resolve_path(manifest_dir, &dir);
        }
        out.report = output.report.map(|r| resolve_path(manifest_dir, &r));
    }

    if out.resolver.interface_prefix.trim().is_empty() {
        return Err(ManifestError {
            message: format!("{}: [resolver] interface_prefix must not be empty", manifest_path.display()),
        });
    }

    Ok(out)
}

fn resolve_path(base: &Path, p: &str) -> PathBuf {
    let pb = PathBuf::from(p);
    if pb.is_absolute() {
        pb
    } else {
        base.join(pb)
    }
}

// Exact duplicates only: namespaces are case-sensitive.
fn dedup_strings(v: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(v.len());
    let mut seen = std::collections::HashSet::new();
    for s in v {
        if seen.insert(s.clone()) {
            out.push(s);
        }
    }
    out
}
