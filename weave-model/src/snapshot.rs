#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::{Substitution, TypeDeclaration, TypeKey, TypeRef};

#[derive(Debug, Error, Diagnostic)]
#[error("snapshot error: {message}")]
#[diagnostic(code(weave::snapshot))]
pub struct SnapshotError {
    pub message: String,
}

/// Read-only access to the host's resolved types.
pub trait TypeModel: Sync {
    /// All declarations, in the host's declaration order.
    fn declarations(&self) -> &[TypeDeclaration];

    fn lookup(&self, key: &TypeKey) -> Option<&TypeDeclaration>;

    /// Transitive interface closure of `decl`, including interfaces reached
    /// through base classes. Each interface appears once, first-seen order.
    ///
    /// Interfaces unknown to the model contribute only themselves.
    fn interface_closure(&self, decl: &TypeDeclaration) -> Vec<TypeRef> {
        let mut out = Vec::new();
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut queue: VecDeque<TypeRef> = decl.interfaces.iter().cloned().collect();

        let mut visited_bases: BTreeSet<TypeKey> = BTreeSet::new();
        visited_bases.insert(decl.key());
        let mut base = decl.base.clone();
        while let Some(b) = base.take() {
            if !visited_bases.insert(b.key()) {
                break;
            }
            let Some(base_decl) = self.lookup(&b.key()) else {
                break;
            };
            let subst = Substitution::new(&base_decl.type_params, &b.args);
            queue.extend(base_decl.interfaces.iter().map(|i| i.substitute(&subst)));
            base = base_decl.base.as_ref().map(|next| next.substitute(&subst));
        }

        while let Some(iface) = queue.pop_front() {
            if !seen.insert(iface.display()) {
                continue;
            }
            if let Some(iface_decl) = self.lookup(&iface.key()) {
                let subst = Substitution::new(&iface_decl.type_params, &iface.args);
                queue.extend(iface_decl.interfaces.iter().map(|i| i.substitute(&subst)));
            }
            out.push(iface);
        }
        out
    }
}

/// Frozen in-memory view of one compilation pass.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
    #[serde(skip)]
    index: BTreeMap<TypeKey, usize>,
}

impl Snapshot {
    pub fn new(types: Vec<TypeDeclaration>) -> Self {
        let mut snapshot = Snapshot {
            types,
            index: BTreeMap::new(),
        };
        snapshot.reindex();
        snapshot
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, t) in self.types.iter().enumerate() {
            // Lookups answer with the first part of a type.
            self.index.entry(t.key()).or_insert(i);
        }
    }

    pub fn from_json(src: &str) -> Result<Self, SnapshotError> {
        let mut snapshot: Snapshot = serde_json::from_str(src).map_err(|e| SnapshotError {
            message: format!("invalid snapshot json: {e}"),
        })?;
        snapshot.reindex();
        Ok(snapshot)
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let raw = std::fs::read_to_string(path).map_err(|e| SnapshotError {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::from_json(&raw).map_err(|e| SnapshotError {
            message: format!("{}: {}", path.display(), e.message),
        })
    }
}

impl TypeModel for Snapshot {
    fn declarations(&self) -> &[TypeDeclaration] {
        &self.types
    }

    fn lookup(&self, key: &TypeKey) -> Option<&TypeDeclaration> {
        self.index.get(key).map(|&i| &self.types[i])
    }
}
