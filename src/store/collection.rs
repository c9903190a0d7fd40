//! A single keyed document collection.

use crate::errors::StoreError;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Documents are loosely-typed JSON values, keyed by string.
pub type Document = serde_json::Value;

/// An ordered map of key -> document behind a reader/writer lock.
///
/// Every operation is atomic with respect to every other; `scan` takes a
/// point-in-time snapshot and never observes a torn view. Poisoned locks
/// surface as [`StoreError::Poisoned`] rather than panicking the caller.
#[derive(Debug)]
pub struct Collection {
    name: String,
    documents: RwLock<BTreeMap<String, Document>>,
}

impl Collection {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            documents: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn read_guard(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, Document>>, StoreError> {
        self.documents
            .read()
            .map_err(|_| StoreError::Poisoned(self.name.clone()))
    }

    fn write_guard(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, Document>>, StoreError> {
        self.documents
            .write()
            .map_err(|_| StoreError::Poisoned(self.name.clone()))
    }

    /// Insert a new document. Fails if the key already exists.
    pub fn insert(&self, key: &str, document: Document) -> Result<(), StoreError> {
        let mut documents = self.write_guard()?;
        if documents.contains_key(key) {
            return Err(StoreError::DuplicateKey {
                collection: self.name.clone(),
                key: key.to_string(),
            });
        }
        documents.insert(key.to_string(), document);
        Ok(())
    }

    /// Insert or replace a document. Returns true if a document was replaced.
    pub fn upsert(&self, key: &str, document: Document) -> Result<bool, StoreError> {
        let mut documents = self.write_guard()?;
        Ok(documents.insert(key.to_string(), document).is_some())
    }

    /// Fetch a copy of a document.
    pub fn get(&self, key: &str) -> Result<Document, StoreError> {
        let documents = self.read_guard()?;
        documents
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::KeyNotFound {
                collection: self.name.clone(),
                key: key.to_string(),
            })
    }

    /// Mutate an existing document in place under the write lock.
    pub fn update<F>(&self, key: &str, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Document),
    {
        let mut documents = self.write_guard()?;
        match documents.get_mut(key) {
            Some(document) => {
                mutate(document);
                Ok(())
            }
            None => Err(StoreError::KeyNotFound {
                collection: self.name.clone(),
                key: key.to_string(),
            }),
        }
    }

    /// Remove a document. Fails if the key does not exist.
    pub fn remove(&self, key: &str) -> Result<Document, StoreError> {
        let mut documents = self.write_guard()?;
        documents
            .remove(key)
            .ok_or_else(|| StoreError::KeyNotFound {
                collection: self.name.clone(),
                key: key.to_string(),
            })
    }

    pub fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.read_guard()?.contains_key(key))
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read_guard()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read_guard()?.is_empty())
    }

    /// All keys, in lexical order.
    pub fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.read_guard()?.keys().cloned().collect())
    }

    /// Keys beginning with the given prefix, in lexical order.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read_guard()?
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    /// Point-in-time snapshot of every key/document pair.
    pub fn scan(&self) -> Result<Vec<(String, Document)>, StoreError> {
        Ok(self
            .read_guard()?
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    /// Remove every document, keeping the collection itself.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.write_guard()?.clear();
        Ok(())
    }
}
