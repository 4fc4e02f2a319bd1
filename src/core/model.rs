use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::config::ConflictPolicy;

/// Structural summary of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub package_name: String,
    /// Import paths in declaration order, duplicates collapsed.
    pub imports: Vec<String>,
    /// Receiver-less functions declared in this file.
    pub functions: Vec<String>,
    pub structs: Vec<StructInfo>,
    /// Qualified type references to imported packages, recorded by the
    /// extractor and resolved later into `used_imported_structs`.
    pub imported_type_refs: Vec<ImportedTypeRef>,
    pub used_imported_structs: Vec<StructInfo>,
}

impl FileInfo {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            ..Self::default()
        }
    }

    /// Function names visible outside the package.
    pub fn exported_functions(&self) -> impl Iterator<Item = &str> {
        self.functions
            .iter()
            .map(String::as_str)
            .filter(|name| is_exported(name))
    }

    pub fn struct_named(&self, name: &str) -> Option<&StructInfo> {
        self.structs.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImportedTypeRef {
    pub package_path: String,
    pub type_name: String,
}

impl ImportedTypeRef {
    pub fn new(package_path: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            package_path: package_path.into(),
            type_name: type_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl StructField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructMethod {
    pub name: String,
    pub comment: String,
    pub parameters: Vec<String>,
    pub return_types: Vec<String>,
}

impl StructMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_return_types<I, S>(mut self, return_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.return_types = return_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Go-style signature, e.g. `Bar(int, string) (bool, error)`.
    pub fn signature(&self) -> String {
        let params = self.parameters.join(", ");
        match self.return_types.len() {
            0 => format!("{}({})", self.name, params),
            1 => format!("{}({}) {}", self.name, params, self.return_types[0]),
            _ => format!(
                "{}({}) ({})",
                self.name,
                params,
                self.return_types.join(", ")
            ),
        }
    }

    fn same_signature(&self, other: &StructMethod) -> bool {
        self.parameters == other.parameters && self.return_types == other.return_types
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructInfo {
    pub name: String,
    pub comment: String,
    pub fields: Vec<StructField>,
    pub methods: BTreeMap<String, StructMethod>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Method,
}

/// Two declarations of the same member disagreed during a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberConflict {
    pub kind: MemberKind,
    pub type_name: String,
    pub member: String,
    pub kept: String,
    pub discarded: String,
}

impl StructInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_field(mut self, field: StructField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_method(mut self, method: StructMethod) -> Self {
        self.methods.insert(method.name.clone(), method);
        self
    }

    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&StructMethod> {
        self.methods.get(name)
    }

    /// A type only known through its methods: no declaration with fields or a
    /// doc comment has been merged into it.
    pub fn is_methods_only(&self) -> bool {
        self.fields.is_empty() && self.comment.is_empty() && !self.methods.is_empty()
    }

    /// Fold another partial view of the same type into this one.
    ///
    /// Fields and methods are unioned by name. The comment keeps the first
    /// non-empty value. A member redeclared with a different type or
    /// signature is settled by `policy` and reported back.
    pub fn merge(&mut self, other: StructInfo, policy: ConflictPolicy) -> Vec<MemberConflict> {
        let mut conflicts = Vec::new();

        if self.comment.is_empty() {
            self.comment = other.comment;
        }

        for field in other.fields {
            match self.fields.iter_mut().find(|f| f.name == field.name) {
                None => self.fields.push(field),
                Some(existing) if existing.type_name == field.type_name => {}
                Some(existing) => {
                    let (kept, discarded) = match policy {
                        ConflictPolicy::LastWins => {
                            let previous =
                                std::mem::replace(&mut existing.type_name, field.type_name);
                            (existing.type_name.clone(), previous)
                        }
                        ConflictPolicy::FirstWins => (existing.type_name.clone(), field.type_name),
                    };
                    conflicts.push(MemberConflict {
                        kind: MemberKind::Field,
                        type_name: self.name.clone(),
                        member: field.name,
                        kept,
                        discarded,
                    });
                }
            }
        }

        for (name, method) in other.methods {
            match self.methods.entry(name) {
                Entry::Vacant(slot) => {
                    slot.insert(method);
                }
                Entry::Occupied(mut slot) => {
                    let existing = slot.get_mut();
                    if existing.same_signature(&method) {
                        if existing.comment.is_empty() {
                            existing.comment = method.comment;
                        }
                        continue;
                    }
                    let conflict = match policy {
                        ConflictPolicy::LastWins => {
                            let replaced = std::mem::replace(existing, method);
                            MemberConflict {
                                kind: MemberKind::Method,
                                type_name: self.name.clone(),
                                member: replaced.name.clone(),
                                kept: existing.signature(),
                                discarded: replaced.signature(),
                            }
                        }
                        ConflictPolicy::FirstWins => MemberConflict {
                            kind: MemberKind::Method,
                            type_name: self.name.clone(),
                            member: method.name.clone(),
                            kept: existing.signature(),
                            discarded: method.signature(),
                        },
                    };
                    conflicts.push(conflict);
                }
            }
        }

        conflicts
    }
}

/// Go visibility: an identifier is exported when it starts with an upper-case
/// letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
