use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::diagnostics::Diagnostic;
use super::model::StructInfo;
use crate::config::ConflictPolicy;

/// All struct types of one package, merged across its files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRegistry {
    pub package_path: String,
    types: BTreeMap<String, StructInfo>,
}

impl TypeRegistry {
    pub fn new(package_path: impl Into<String>) -> Self {
        Self {
            package_path: package_path.into(),
            types: BTreeMap::new(),
        }
    }

    /// Merge the per-file struct lists of one package, in processing order.
    pub fn build<'a, I>(
        package_path: impl Into<String>,
        files: I,
        policy: ConflictPolicy,
    ) -> (Self, Vec<Diagnostic>)
    where
        I: IntoIterator<Item = &'a [StructInfo]>,
    {
        let mut registry = Self::new(package_path);
        let mut diagnostics = Vec::new();
        for structs in files {
            for info in structs {
                diagnostics.extend(registry.add(info.clone(), policy));
            }
        }
        (registry, diagnostics)
    }

    /// Insert a struct, or merge it into the existing entry of the same name.
    pub fn add(&mut self, info: StructInfo, policy: ConflictPolicy) -> Vec<Diagnostic> {
        match self.types.get_mut(&info.name) {
            None => {
                self.types.insert(info.name.clone(), info);
                Vec::new()
            }
            Some(existing) => existing
                .merge(info, policy)
                .into_iter()
                .map(|conflict| Diagnostic::from_conflict(&self.package_path, conflict))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&StructInfo> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Structs in name order.
    pub fn iter(&self) -> impl Iterator<Item = &StructInfo> {
        self.types.values()
    }
}
