#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use weave_model::{TypeDeclaration, TypeKey};

use crate::synth::CapabilityInterface;

/// A mixin that passed validation, paired with its capability interface.
#[derive(Clone, Debug)]
pub struct MixinDefinition<'a> {
    /// Position of the declaration in the snapshot.
    pub index: usize,
    pub decl: &'a TypeDeclaration,
    pub interface: CapabilityInterface,
}

impl<'a> MixinDefinition<'a> {
    pub fn key(&self) -> TypeKey {
        self.decl.key()
    }
}

/// Mixin identity to definition, built fresh for every pass and dropped with it.
#[derive(Debug, Default)]
pub struct MixinTable<'a> {
    definitions: BTreeMap<TypeKey, MixinDefinition<'a>>,
}

impl<'a> MixinTable<'a> {
    pub fn new() -> Self {
        MixinTable {
            definitions: BTreeMap::new(),
        }
    }

    /// Inserts `definition`; the first definition of an identity wins.
    pub fn insert(&mut self, definition: MixinDefinition<'a>) {
        self.definitions.entry(definition.key()).or_insert(definition);
    }

    pub fn get(&self, key: &TypeKey) -> Option<&MixinDefinition<'a>> {
        self.definitions.get(key)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.definitions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Definitions in snapshot declaration order.
    pub fn in_declaration_order(&self) -> Vec<&MixinDefinition<'a>> {
        let mut defs: Vec<_> = self.definitions.values().collect();
        defs.sort_by_key(|d| d.index);
        defs
    }
}

impl<'a> FromIterator<MixinDefinition<'a>> for MixinTable<'a> {
    fn from_iter<I: IntoIterator<Item = MixinDefinition<'a>>>(iter: I) -> Self {
        let mut table = MixinTable::new();
        for def in iter {
            table.insert(def);
        }
        table
    }
}
