//! Requesting identities and the directory that resolves them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A resolved requester exposing group membership tests.
pub trait Identity {
    fn name(&self) -> &str;

    fn is_member_of(&self, group: &str) -> bool;
}

/// Resolved principal: a name plus its group memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub name: String,
    #[serde(default)]
    pub groups: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, S>(name: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// Principal with no group memberships.
    pub fn anonymous(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: BTreeSet::new(),
        }
    }
}

impl Identity for Principal {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_member_of(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}

/// Names that bypass the query restriction entirely.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivilegedIdentities(BTreeSet<String>);

pub const SYSTEM_USERNAME: &str = "system";
pub const ADMINISTRATOR_USERNAME: &str = "Administrator";

impl PrivilegedIdentities {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// No privileged names at all.
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for PrivilegedIdentities {
    fn default() -> Self {
        Self::new([SYSTEM_USERNAME, ADMINISTRATOR_USERNAME])
    }
}

/// Host user directory. Turns a bare principal name into a [`Principal`]
/// whose group memberships can be tested.
pub trait Directory: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Principal>;
}

/// In-memory directory keyed by principal name.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    principals: HashMap<String, Principal>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.insert(principal);
        self
    }

    pub fn insert(&mut self, principal: Principal) {
        self.principals.insert(principal.name.clone(), principal);
    }

    pub fn len(&self) -> usize {
        self.principals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}

impl Directory for StaticDirectory {
    fn resolve(&self, name: &str) -> Option<Principal> {
        self.principals.get(name).cloned()
    }
}
