//! XSD-derived element vocabulary
//!
//! A `SchemaMap` lists, per element name, the attributes it declares and
//! the element names allowed beneath it. The hierarchy resolver consults it
//! for the generic XML formats.

mod error;
mod loader;

pub use error::SchemaError;
pub use loader::SchemaLoader;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared attribute of a schema element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: Option<String>,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub attributes: Vec<AttributeInfo>,
    pub children: Vec<String>,
}

/// Element name → entry, iterated in declaration order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaMap {
    entries: Vec<(String, SchemaEntry)>,
    index: HashMap<String, usize>,
}

impl SchemaMap {
    pub fn get(&self, name: &str) -> Option<&SchemaEntry> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn children_of(&self, name: &str) -> Option<&[String]> {
        self.get(name).map(|entry| entry.children.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace an entry; replacing keeps the original position
    pub fn insert(&mut self, name: impl Into<String>, entry: SchemaEntry) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = entry,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, entry));
            }
        }
    }
}
