//! Embedded target store
//!
//! The in-memory, named-collection document store that workloads exercise.
//! It stands in for the external deployment a workload harness would
//! normally drive: a handful of atomic operations over JSON documents,
//! shared between worker threads. It is test scaffolding, not a database -
//! there is no query language, no persistence and no indexing.

pub mod collection;

pub use collection::{Collection, Document};

use crate::errors::StoreError;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// A set of named collections shared by all workers in a run.
///
/// Collections are created on first use and live until dropped. The
/// catalog lock is only held while resolving names; document operations
/// take the per-collection lock.
#[derive(Debug, Default)]
pub struct Store {
    collections: RwLock<BTreeMap<String, Arc<Collection>>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a collection handle, creating the collection if needed.
    pub fn collection(&self, name: &str) -> Result<Arc<Collection>, StoreError> {
        let mut catalog = self
            .collections
            .write()
            .map_err(|_| StoreError::Poisoned("store catalog".to_string()))?;
        let entry = catalog
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Collection::new(name)));
        Ok(Arc::clone(entry))
    }

    /// Get a handle to an existing collection without creating it.
    pub fn existing_collection(&self, name: &str) -> Result<Arc<Collection>, StoreError> {
        let catalog = self
            .collections
            .read()
            .map_err(|_| StoreError::Poisoned("store catalog".to_string()))?;
        catalog
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    /// Drop a collection and all of its documents.
    pub fn drop_collection(&self, name: &str) -> Result<(), StoreError> {
        let mut catalog = self
            .collections
            .write()
            .map_err(|_| StoreError::Poisoned("store catalog".to_string()))?;
        catalog
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    /// Names of all live collections, in lexical order.
    pub fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        let catalog = self
            .collections
            .read()
            .map_err(|_| StoreError::Poisoned("store catalog".to_string()))?;
        Ok(catalog.keys().cloned().collect())
    }
}
