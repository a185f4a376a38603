//! Ordered record sequences keyed by the records' own ids.

use std::collections::HashSet;
use std::hash::Hash;

use crate::models::{Document, DocumentId, Relationship, RelationshipId};

/// A server record with a unique id.
pub trait Record: Clone {
    type Id: Clone + Eq + Hash + std::fmt::Debug;

    fn id(&self) -> &Self::Id;
}

impl Record for Document {
    type Id = DocumentId;

    fn id(&self) -> &DocumentId {
        &self.id
    }
}

impl Record for Relationship {
    type Id = RelationshipId;

    fn id(&self) -> &RelationshipId {
        &self.id
    }
}

/// Records in display order. Ids are unique within the list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordList<R> {
    items: Vec<R>,
}

impl<R> Default for RecordList<R> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<R: Record> RecordList<R> {
    pub fn as_slice(&self) -> &[R] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &R::Id) -> Option<&R> {
        self.items.iter().find(|r| r.id() == id)
    }

    fn position(&self, id: &R::Id) -> Option<usize> {
        self.items.iter().position(|r| r.id() == id)
    }

    /// Replace everything, keeping the given order. A repeated id keeps its
    /// first occurrence.
    pub fn replace(&mut self, items: Vec<R>) {
        let mut seen = HashSet::new();
        self.items = items
            .into_iter()
            .filter(|r| seen.insert(r.id().clone()))
            .collect();
    }

    /// Add at the end, or overwrite in place if the id is already present.
    pub fn append(&mut self, record: R) {
        match self.position(record.id()) {
            Some(i) => self.items[i] = record,
            None => self.items.push(record),
        }
    }

    /// Add at the front. An existing record with the same id is moved.
    pub fn prepend(&mut self, record: R) {
        if let Some(i) = self.position(record.id()) {
            self.items.remove(i);
        }
        self.items.insert(0, record);
    }

    /// Overwrite the record with the same id. Returns false if there is none.
    pub fn patch(&mut self, record: R) -> bool {
        match self.position(record.id()) {
            Some(i) => {
                self.items[i] = record;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &R::Id) -> Option<R> {
        self.position(id).map(|i| self.items.remove(i))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
