#![forbid(unsafe_code)]

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use miette::IntoDiagnostic;
use sha2::{Digest, Sha256};
use tracing::debug;
use weave_core::Artifact;

const GENERATED_SUFFIX: &str = ".g.cs";

/// What happened to one artifact on disk.
#[derive(Clone, Debug)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub sha256: String,
    /// `false` when the file already held identical content.
    pub written: bool,
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn file_hash(path: &Path) -> Option<String> {
    fs::read(path).ok().map(|bytes| sha256_hex(&bytes))
}

/// Writes every artifact under `out_dir`, leaving files whose content is
/// already identical untouched.
pub fn write_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> miette::Result<Vec<WriteOutcome>> {
    fs::create_dir_all(out_dir).into_diagnostic()?;

    let mut outcomes = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = out_dir.join(&artifact.file_name);
        let sha256 = sha256_hex(artifact.contents.as_bytes());
        let written = file_hash(&path).as_deref() != Some(sha256.as_str());
        if written {
            fs::write(&path, &artifact.contents).into_diagnostic()?;
        }
        debug!(file = %artifact.file_name, written, "artifact");
        outcomes.push(WriteOutcome { path, sha256, written });
    }
    Ok(outcomes)
}

/// Deletes `*.g.cs` files in `out_dir` that this pass did not produce, so a
/// consumer or mixin that stopped resolving leaves nothing behind.
pub fn remove_stale(out_dir: &Path, artifacts: &[Artifact]) -> miette::Result<Vec<PathBuf>> {
    let current: BTreeSet<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
    let mut removed = Vec::new();
    for entry in fs::read_dir(out_dir).into_diagnostic()? {
        let path = entry.into_diagnostic()?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_file() || !name.ends_with(GENERATED_SUFFIX) || current.contains(name) {
            continue;
        }
        fs::remove_file(&path).into_diagnostic()?;
        debug!(file = %name, "removed stale artifact");
        removed.push(path);
    }
    removed.sort();
    Ok(removed)
}

/// Hashes artifacts without touching the filesystem.
pub fn dry_run(artifacts: &[Artifact]) -> Vec<WriteOutcome> {
    artifacts
        .iter()
        .map(|a| WriteOutcome {
            path: PathBuf::from(&a.file_name),
            sha256: sha256_hex(a.contents.as_bytes()),
            written: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use weave_core::ArtifactKind;
    use weave_model::TypeKey;

    fn artifact(file_name: &str, contents: &str) -> Artifact {
        Artifact {
            kind: ArtifactKind::Interface,
            source: TypeKey::new("S.A", 0),
            file_name: file_name.to_string(),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn hash_is_lowercase_hex() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn unchanged_content_is_not_rewritten() {
        let dir = TempDir::new().expect("temp dir");
        let first = write_artifacts(dir.path(), &[artifact("S.I_MxA.g.cs", "one")]).expect("write");
        assert!(first[0].written);
        let second = write_artifacts(dir.path(), &[artifact("S.I_MxA.g.cs", "one")]).expect("write");
        assert!(!second[0].written);
        let third = write_artifacts(dir.path(), &[artifact("S.I_MxA.g.cs", "two")]).expect("write");
        assert!(third[0].written);
        assert_eq!(fs::read_to_string(&third[0].path).expect("read"), "two");
    }

    #[test]
    fn only_unproduced_generated_files_are_removed() {
        let dir = TempDir::new().expect("temp dir");
        let kept = artifact("S.I_MxA.g.cs", "one");
        write_artifacts(dir.path(), &[kept.clone(), artifact("S.Host.UseMixins.g.cs", "two")]).expect("write");
        fs::write(dir.path().join("notes.txt"), "keep").expect("write notes");

        let removed = remove_stale(dir.path(), &[kept]).expect("remove");
        assert_eq!(removed, vec![dir.path().join("S.Host.UseMixins.g.cs")]);
        assert!(dir.path().join("S.I_MxA.g.cs").exists());
        assert!(dir.path().join("notes.txt").exists());
    }
}
