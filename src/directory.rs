//! Sources of switchable identities.
//!
//! The switcher only needs to list candidates and look one up by id. Hosts
//! usually back [`IdentityDirectory`] with their user table; [`InMemoryDirectory`]
//! covers fixed lists and tests.

use crate::identity::{Identity, UserId};
use std::collections::HashMap;

/// Read-only source of identities.
pub trait IdentityDirectory: Send + Sync {
    /// All identities, in listing order.
    fn list(&self) -> Vec<Identity>;

    /// Look up an identity by its exact identifier.
    ///
    /// Returns `None` rather than an identity with a different id.
    fn find_by_id(&self, id: &UserId) -> Option<Identity>;

    /// Look up an identity by the canonical string form of its identifier.
    ///
    /// Query parameters arrive as text, so `"2"` has to find an identity
    /// keyed by the integer `2`.
    fn find_by_key(&self, key: &str) -> Option<Identity> {
        self.list()
            .into_iter()
            .find(|identity| identity.id().canonical() == key)
    }
}

/// Directory held in memory.
///
/// Registering an identifier twice keeps the later identity in the slot of
/// the first registration, so listing order follows first occurrence.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    identities: Vec<Identity>,
    index: HashMap<UserId, usize>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identity, replacing any earlier one with the same id in place.
    pub fn insert(&mut self, identity: Identity) {
        match self.index.get(identity.id()) {
            Some(&slot) => self.identities[slot] = identity,
            None => {
                self.index.insert(identity.id().clone(), self.identities.len());
                self.identities.push(identity);
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl FromIterator<Identity> for InMemoryDirectory {
    fn from_iter<I: IntoIterator<Item = Identity>>(iter: I) -> Self {
        let mut directory = Self::new();
        for identity in iter {
            directory.insert(identity);
        }
        directory
    }
}

impl From<Vec<Identity>> for InMemoryDirectory {
    fn from(identities: Vec<Identity>) -> Self {
        identities.into_iter().collect()
    }
}

impl IdentityDirectory for InMemoryDirectory {
    fn list(&self) -> Vec<Identity> {
        self.identities.clone()
    }

    fn find_by_id(&self, id: &UserId) -> Option<Identity> {
        self.index
            .get(id)
            .map(|&slot| self.identities[slot].clone())
    }

    fn find_by_key(&self, key: &str) -> Option<Identity> {
        self.identities
            .iter()
            .find(|identity| identity.id().canonical() == key)
            .cloned()
    }
}
