//! Role-derived permissions carried by tokens and checked by the decision points.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// An authority string granted to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    Admin,
    User,
}

impl Permission {
    /// Returns the permission as it appears in the token's `permissions` claim.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Admin => "ADMIN",
            Permission::User => "USER",
        }
    }

    /// Parses a claim entry. Unknown entries yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(Permission::Admin),
            "USER" => Some(Permission::User),
            _ => None,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of permissions attached to an authenticated identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeSet<Permission>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from the raw strings of a `permissions` claim, dropping unknown entries.
    pub fn from_claim<S: AsRef<str>>(entries: &[S]) -> Self {
        entries
            .iter()
            .filter_map(|entry| {
                let parsed = Permission::parse(entry.as_ref());
                if parsed.is_none() {
                    log::debug!("Ignoring unknown permission '{}' in token", entry.as_ref());
                }
                parsed
            })
            .collect()
    }

    /// Renders the set as `permissions` claim entries, in a stable order.
    pub fn to_claim(&self) -> Vec<String> {
        self.permissions.iter().map(|p| p.as_str().to_string()).collect()
    }

    pub fn insert(&mut self, permission: Permission) {
        self.permissions.insert(permission);
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Returns `true` if the set contains any of the given permissions.
    pub fn contains_any(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.permissions.contains(p))
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}
