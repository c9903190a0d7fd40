//! Name -> workload registry.

use crate::errors::RegistryError;
use crate::workload::DynWorkload;
use std::collections::BTreeMap;

/// Holds workloads by name. The built-in corpus lives in a global
/// registry; tests and embedders build their own instances.
#[derive(Default)]
pub struct Registry {
    workloads: BTreeMap<String, DynWorkload>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workload under its descriptor name.
    pub fn register(&mut self, workload: DynWorkload) -> Result<(), RegistryError> {
        let name = workload.descriptor().name.clone();
        if self.workloads.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.workloads.insert(name, workload);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<DynWorkload, RegistryError> {
        self.workloads
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))
    }

    /// Registered names in lexical order.
    pub fn names(&self) -> Vec<String> {
        self.workloads.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DynWorkload> {
        self.workloads.values()
    }

    pub fn len(&self) -> usize {
        self.workloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workloads.is_empty()
    }
}
