use std::collections::BTreeMap;

use super::diagnostics::{Diagnostic, UnresolvedReason};
use super::model::{is_exported, FileInfo, ImportedTypeRef, StructInfo};
use super::registry::TypeRegistry;

/// Attaches full struct definitions to the imported type references a file
/// recorded during extraction.
///
/// `registries` must hold an entry for every internal package, including
/// packages that declare no structs; a path without an entry is external.
pub struct UsageResolver<'a> {
    registries: &'a BTreeMap<String, TypeRegistry>,
}

impl<'a> UsageResolver<'a> {
    pub fn new(registries: &'a BTreeMap<String, TypeRegistry>) -> Self {
        Self { registries }
    }

    pub fn lookup(&self, reference: &ImportedTypeRef) -> Result<&'a StructInfo, UnresolvedReason> {
        let registry = self
            .registries
            .get(&reference.package_path)
            .ok_or(UnresolvedReason::ExternalPackage)?;
        if !is_exported(&reference.type_name) {
            return Err(UnresolvedReason::UnknownType);
        }
        registry
            .get(&reference.type_name)
            .ok_or(UnresolvedReason::UnknownType)
    }

    /// Fill `used_imported_structs` from `imported_type_refs`.
    ///
    /// References that cannot be resolved are left out and reported back; the
    /// caller decides what to do with them.
    pub fn resolve_file(&self, file_id: &str, info: &mut FileInfo) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut used = Vec::with_capacity(info.imported_type_refs.len());

        for reference in &info.imported_type_refs {
            match self.lookup(reference) {
                Ok(found) => used.push(found.clone()),
                Err(reason) => diagnostics.push(Diagnostic::UnresolvedReference {
                    file: file_id.to_string(),
                    package_path: reference.package_path.clone(),
                    type_name: reference.type_name.clone(),
                    reason,
                }),
            }
        }

        info.used_imported_structs = used;
        diagnostics
    }
}
