//! Author records and the ordered author map
//!
//! `AuthorRecord` is the plain-data form of an author as it leaves the
//! registry. `AuthorMap` keeps first-encounter order and serializes as a
//! JSON object keyed by author name.

use crate::model::Quote;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Biography fields filled in by enrichment
///
/// These four fields are always replaced together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Biography {
    pub born_date: String,
    pub born_location: String,
    pub description: String,
    pub url: String,
}

/// An author with biography and collected quotes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorRecord {
    /// Registry key; emitted as the map key rather than a field
    #[serde(skip)]
    pub name: String,

    #[serde(flatten)]
    pub biography: Biography,

    pub quotes: Vec<Quote>,
}

impl AuthorRecord {
    /// Creates an author with an empty biography and no quotes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            biography: Biography::default(),
            quotes: Vec::new(),
        }
    }
}

/// Authors in the order they were first encountered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorMap {
    entries: Vec<AuthorRecord>,
}

impl AuthorMap {
    /// Looks up an author by name
    pub fn get(&self, name: &str) -> Option<&AuthorRecord> {
        self.entries.iter().find(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuthorRecord> {
        self.entries.iter()
    }

    /// Author names in first-encounter order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|a| a.name.as_str()).collect()
    }

    /// Number of quotes across all authors
    pub fn total_quotes(&self) -> usize {
        self.entries.iter().map(|a| a.quotes.len()).sum()
    }
}

impl From<Vec<AuthorRecord>> for AuthorMap {
    fn from(entries: Vec<AuthorRecord>) -> Self {
        Self { entries }
    }
}

impl Serialize for AuthorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for author in &self.entries {
            map.serialize_entry(&author.name, author)?;
        }
        map.end()
    }
}
