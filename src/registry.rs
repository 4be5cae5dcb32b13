//! Ordered, deduplicated account registry
//!
//! Updates never mutate in place: `add`, `delete` and `clear` return a new
//! registry and callers replace their reference. A snapshot handed to a reader
//! therefore stays consistent while the wallet moves on.

use crate::account::{Account, Address};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountRegistry {
    elements: Vec<Account>,
    /// normalized address -> position in `elements`
    index: HashMap<String, usize>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert by normalized address. A replaced entry keeps its position.
    #[must_use]
    pub fn add(&self, account: Account) -> Self {
        let mut next = self.clone();
        let key = account.address.normalized();
        match next.index.get(&key) {
            Some(&position) => next.elements[position] = account,
            None => {
                next.index.insert(key, next.elements.len());
                next.elements.push(account);
            }
        }
        next
    }

    /// Remove by address; absent keys leave the registry unchanged
    #[must_use]
    pub fn delete(&self, address: &Address) -> Self {
        if !self.contains(address) {
            return self.clone();
        }
        let key = address.normalized();
        let elements: Vec<Account> = self
            .elements
            .iter()
            .filter(|a| a.address.normalized() != key)
            .cloned()
            .collect();
        Self::from_accounts(elements)
    }

    #[must_use]
    pub fn clear(&self) -> Self {
        Self::default()
    }

    pub fn find(&self, address: &Address) -> Option<&Account> {
        self.index
            .get(&address.normalized())
            .map(|&position| &self.elements[position])
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(&address.normalized())
    }

    /// Accounts in insertion order
    pub fn elements(&self) -> &[Account] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Build from an ordered list; later duplicates replace earlier ones in place
    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        accounts
            .into_iter()
            .fold(Self::default(), |registry, account| registry.add(account))
    }
}
