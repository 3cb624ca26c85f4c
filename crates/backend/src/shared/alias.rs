//! Multi-key lookup table that refuses to guess.
//!
//! Directories (reps, customers) are addressed by several spellings of the same identity.
//! A key claimed by two different records is reported and removed instead of being silently
//! overwritten.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrength {
    /// Identifying key (id, username, full name)
    Strong,
    /// Convenience key (first name, display name); never displaces an existing key
    Weak,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousAlias {
    pub key: String,
    pub claimants: Vec<String>,
}

#[derive(Debug)]
struct Slot {
    target: String,
    strength: KeyStrength,
}

/// Alias table mapping keys to record ids, with records stored by id
#[derive(Debug)]
pub struct AliasTable<V> {
    records: HashMap<String, V>,
    keys: HashMap<String, Slot>,
    ambiguous: HashMap<String, Vec<String>>,
    blocked: HashSet<String>,
}

impl<V> Default for AliasTable<V> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            keys: HashMap::new(),
            ambiguous: HashMap::new(),
            blocked: HashSet::new(),
        }
    }
}

impl<V> AliasTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_record(&mut self, id: impl Into<String>, record: V) {
        self.records.insert(id.into(), record);
    }

    /// Register `key` for record `id`. Empty keys are ignored.
    pub fn add_key(&mut self, key: &str, id: &str, strength: KeyStrength) {
        let key = key.trim();
        if key.is_empty() {
            return;
        }
        if self.blocked.contains(key) {
            self.note_claimant(key, id);
            return;
        }

        let existing = match self.keys.get(key) {
            None => {
                self.keys.insert(
                    key.to_string(),
                    Slot {
                        target: id.to_string(),
                        strength,
                    },
                );
                return;
            }
            Some(slot) => (slot.target.clone(), slot.strength),
        };

        let (target, existing_strength) = existing;
        if target == id {
            if strength == KeyStrength::Strong {
                if let Some(slot) = self.keys.get_mut(key) {
                    slot.strength = KeyStrength::Strong;
                }
            }
            return;
        }

        match (existing_strength, strength) {
            (KeyStrength::Strong, KeyStrength::Weak) => {}
            (KeyStrength::Weak, KeyStrength::Strong) => {
                self.keys.insert(
                    key.to_string(),
                    Slot {
                        target: id.to_string(),
                        strength,
                    },
                );
            }
            _ => {
                self.keys.remove(key);
                self.blocked.insert(key.to_string());
                self.note_claimant(key, &target);
                self.note_claimant(key, id);
            }
        }
    }

    fn note_claimant(&mut self, key: &str, id: &str) {
        let claimants = self.ambiguous.entry(key.to_string()).or_default();
        if !claimants.iter().any(|c| c == id) {
            claimants.push(id.to_string());
        }
    }

    pub fn resolve(&self, key: &str) -> Option<&V> {
        let slot = self.keys.get(key.trim())?;
        self.records.get(&slot.target)
    }

    /// First key in `keys` that resolves
    pub fn resolve_any<'a, I>(&self, keys: I) -> Option<&V>
    where
        I: IntoIterator<Item = &'a str>,
    {
        keys.into_iter().find_map(|k| self.resolve(k))
    }

    pub fn get(&self, id: &str) -> Option<&V> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn ambiguities(&self) -> Vec<AmbiguousAlias> {
        let mut list: Vec<AmbiguousAlias> = self
            .ambiguous
            .iter()
            .map(|(key, claimants)| AmbiguousAlias {
                key: key.clone(),
                claimants: claimants.clone(),
            })
            .collect();
        list.sort_by(|a, b| a.key.cmp(&b.key));
        list
    }
}
