//! Content Registry
//!
//! Generic store of named, owner-tagged entries. Every content kind the host
//! exposes (commands, ports, daemons, executables, extensions, conditions) is an
//! instance of [`ContentRegistry`] parameterised by its value type.

use crate::content::kinds::ContentKind;
use crate::module::error::{ModuleError, ModuleResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Separator between the owner id and the local name of a qualified key
pub const KEY_SEPARATOR: char = '.';

/// How registry keys are derived from `(owner, local_name)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScheme {
    /// `owner.local_name`
    Qualified,
    /// The bare local name; still owner-tagged but shared across owners
    Global,
}

/// A stored value and the id of the module (or `host`) that registered it
#[derive(Debug, Clone)]
pub struct RegistryEntry<T> {
    pub owner: String,
    pub value: T,
}

/// Owner-tagged key/value store for one content kind
///
/// Values are cloned out on lookup so no borrow of the registry outlives a call;
/// content handlers may therefore register or unregister content themselves.
pub struct ContentRegistry<T> {
    kind: ContentKind,
    scheme: KeyScheme,
    entries: RefCell<BTreeMap<String, RegistryEntry<T>>>,
}

impl<T> std::fmt::Debug for ContentRegistry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentRegistry")
            .field("kind", &self.kind)
            .field("scheme", &self.scheme)
            .field("keys", &self.keys())
            .finish()
    }
}

impl<T: Clone> ContentRegistry<T> {
    /// Create an empty registry
    pub fn new(kind: ContentKind, scheme: KeyScheme) -> Self {
        Self {
            kind,
            scheme,
            entries: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn scheme(&self) -> KeyScheme {
        self.scheme
    }

    /// Compute the key `local_name` would be stored under for `owner`
    pub fn key_for(&self, owner: &str, local_name: &str) -> String {
        match self.scheme {
            KeyScheme::Qualified => format!("{}{}{}", owner, KEY_SEPARATOR, local_name),
            KeyScheme::Global => local_name.to_string(),
        }
    }

    /// Register `value` under `owner`, returning the key it is stored under
    pub fn register(&self, owner: &str, local_name: &str, value: T) -> ModuleResult<String> {
        validate_local_name(local_name)?;

        let key = self.key_for(owner, local_name);
        let mut entries = self.entries.borrow_mut();
        if let Some(existing) = entries.get(&key) {
            return Err(ModuleError::DuplicateKey {
                registry: self.kind.to_string(),
                key,
                owner: existing.owner.clone(),
            });
        }

        log::trace!("Registered {} '{}' for '{}'", self.kind, key, owner);
        entries.insert(
            key.clone(),
            RegistryEntry {
                owner: owner.to_string(),
                value,
            },
        );
        Ok(key)
    }

    /// Remove a single entry; false if the key was absent
    pub fn unregister(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key).is_some()
    }

    /// Remove every entry owned by `owner` and return the removed keys
    ///
    /// Safe to call for an owner with no entries.
    pub fn unregister_all_for_owner(&self, owner: &str) -> Vec<String> {
        let mut entries = self.entries.borrow_mut();
        let removed: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.owner == owner)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &removed {
            entries.remove(key);
            log::debug!("Unregistered {} '{}' owned by '{}'", self.kind, key, owner);
        }
        removed
    }

    /// Look up a value by its key
    pub fn lookup(&self, key: &str) -> Option<T> {
        self.entries.borrow().get(key).map(|entry| entry.value.clone())
    }

    /// Look up the full entry, including its owner
    pub fn entry(&self, key: &str) -> Option<RegistryEntry<T>> {
        self.entries.borrow().get(key).cloned()
    }

    /// Owner of a key, if registered
    pub fn owner_of(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).map(|entry| entry.owner.clone())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Keys and values registered by `owner`, in key order
    pub fn list_by_owner(&self, owner: &str) -> Vec<(String, T)> {
        self.entries
            .borrow()
            .iter()
            .filter(|(_, entry)| entry.owner == owner)
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    /// Every entry in key order
    pub fn entries(&self) -> Vec<(String, RegistryEntry<T>)> {
        self.entries
            .borrow()
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }
}

impl<T> ContentRegistry<T> {
    /// All keys in sorted order
    pub fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Number of entries owned by `owner`
    pub fn count_for_owner(&self, owner: &str) -> usize {
        self.entries
            .borrow()
            .values()
            .filter(|entry| entry.owner == owner)
            .count()
    }
}

fn validate_local_name(local_name: &str) -> ModuleResult<()> {
    if local_name.trim().is_empty() {
        return Err(ModuleError::invalid_identifier(
            local_name,
            "content name must not be empty",
        ));
    }
    if local_name.contains(KEY_SEPARATOR) {
        return Err(ModuleError::invalid_identifier(
            local_name,
            format!("content name must not contain '{}'", KEY_SEPARATOR),
        ));
    }
    Ok(())
}
