//! Author identity resolution.
//!
//! Keys are normalized once: anything containing `@` is treated as an email
//! and lowercased, everything else is a display name matched as written.

use crate::error::{ContribError, Result};
use crate::model::RawIdentity;
use std::collections::{BTreeMap, BTreeSet};

/// Canonical name for identities with neither a name nor an email.
pub const UNKNOWN_AUTHOR: &str = "(unknown)";

pub fn normalize_key(key: &str) -> String {
    let key = key.trim();
    if key.contains('@') {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    entries: BTreeMap<String, String>,
}

impl AliasTable {
    pub fn new<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = BTreeMap::new();
        for (key, canonical) in entries {
            let (key, canonical) = (key.as_ref(), canonical.as_ref().trim());
            let normalized = normalize_key(key);
            if normalized.is_empty() {
                return Err(ContribError::Config(format!(
                    "Alias key is empty (canonical name {canonical:?})"
                )));
            }
            if canonical.is_empty() {
                return Err(ContribError::Config(format!(
                    "Alias {key:?} maps to an empty canonical name"
                )));
            }
            match map.get(&normalized) {
                Some(existing) if existing != canonical => {
                    return Err(ContribError::Config(format!(
                        "Alias key {normalized:?} maps to both {existing:?} and {canonical:?}"
                    )));
                }
                _ => {
                    map.insert(normalized, canonical.to_string());
                }
            }
        }
        Ok(Self { entries: map })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    keys: BTreeSet<String>,
}

impl ExclusionSet {
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(|k| normalize_key(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Maps raw identities to canonical author names: email alias first, then
/// name alias, then the raw name itself.
#[derive(Debug, Clone, Default)]
pub struct AuthorResolver {
    aliases: AliasTable,
    excluded: ExclusionSet,
}

impl AuthorResolver {
    pub fn new(aliases: AliasTable, excluded: ExclusionSet) -> Self {
        Self { aliases, excluded }
    }

    pub fn resolve(&self, identity: &RawIdentity) -> String {
        if let Some(name) = self.aliases.get(&email_key(&identity.email)) {
            return name.to_string();
        }
        if let Some(name) = self.aliases.get(&normalize_key(&identity.name)) {
            return name.to_string();
        }
        if !identity.name.trim().is_empty() {
            return identity.name.clone();
        }
        let email = identity.email.trim();
        if !email.is_empty() {
            return email.to_string();
        }
        UNKNOWN_AUTHOR.to_string()
    }

    pub fn is_excluded(&self, identity: &RawIdentity) -> bool {
        self.excluded.contains(&email_key(&identity.email))
            || self.excluded.contains(&normalize_key(&identity.name))
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn excluded(&self) -> &ExclusionSet {
        &self.excluded
    }
}
