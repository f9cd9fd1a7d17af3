//! Shared author registry
//!
//! The registry is the only mutable state shared between crawl tasks.
//! Each author entry has its own lock, so all operations on one author are
//! linearized while different authors are updated independently. The index
//! lock is held only long enough to find or insert an entry.

use crate::model::{AuthorMap, AuthorRecord, Biography, Quote};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle to one live author entry
#[derive(Debug, Clone)]
pub struct AuthorHandle {
    entry: Arc<Mutex<AuthorRecord>>,
}

impl AuthorHandle {
    fn new(name: &str) -> Self {
        Self {
            entry: Arc::new(Mutex::new(AuthorRecord::new(name))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AuthorRecord> {
        self.entry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copies the current state of the entry
    pub fn record(&self) -> AuthorRecord {
        self.lock().clone()
    }

    /// Returns true if both handles point at the same entry
    pub fn same_entry(&self, other: &AuthorHandle) -> bool {
        Arc::ptr_eq(&self.entry, &other.entry)
    }
}

#[derive(Debug, Default)]
struct RegistryIndex {
    /// Entries in first-encounter order
    order: Vec<AuthorHandle>,
    by_name: HashMap<String, usize>,
}

/// Keyed store of authors shared by every crawl task
///
/// Clones share the same underlying entries.
#[derive(Debug, Clone, Default)]
pub struct AuthorRegistry {
    index: Arc<Mutex<RegistryIndex>>,
}

impl AuthorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_index(&self) -> MutexGuard<'_, RegistryIndex> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the entry for `name`, creating an empty one on first use
    pub fn get_or_create(&self, name: &str) -> AuthorHandle {
        let mut index = self.lock_index();

        if let Some(&position) = index.by_name.get(name) {
            return index.order[position].clone();
        }

        let handle = AuthorHandle::new(name);
        let position = index.order.len();
        index.order.push(handle.clone());
        index.by_name.insert(name.to_string(), position);
        tracing::debug!("Registered new author: {}", name);
        handle
    }

    fn find(&self, name: &str) -> Option<AuthorHandle> {
        let index = self.lock_index();
        index
            .by_name
            .get(name)
            .map(|&position| index.order[position].clone())
    }

    /// Appends a quote to the author's list, creating the author if needed
    ///
    /// Returns the number of quotes the author has after the append.
    pub fn append_quote(&self, name: &str, quote: Quote) -> usize {
        let handle = self.get_or_create(name);
        let mut author = handle.lock();
        author.quotes.push(quote);
        author.quotes.len()
    }

    /// Replaces the author's biography fields as one unit
    ///
    /// The last call to complete wins. Returns false (and changes nothing)
    /// if the author was never registered.
    pub fn update_biography(&self, name: &str, biography: Biography) -> bool {
        match self.find(name) {
            Some(handle) => {
                handle.lock().biography = biography;
                true
            }
            None => false,
        }
    }

    /// Copies a single author, if registered
    pub fn get(&self, name: &str) -> Option<AuthorRecord> {
        self.find(name).map(|handle| handle.record())
    }

    pub fn len(&self) -> usize {
        self.lock_index().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies every author, in first-encounter order, into plain data
    pub fn snapshot(&self) -> AuthorMap {
        let handles = self.lock_index().order.clone();
        handles
            .iter()
            .map(AuthorHandle::record)
            .collect::<Vec<_>>()
            .into()
    }
}
