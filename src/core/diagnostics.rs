use serde::{Deserialize, Serialize};
use std::fmt;

use super::model::{MemberConflict, MemberKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// The package is not part of the analyzed project.
    ExternalPackage,
    /// The package is internal but declares no exported struct of that name.
    UnknownType,
}

/// Non-fatal findings collected during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    ConflictingField {
        package_path: String,
        type_name: String,
        field: String,
        kept: String,
        discarded: String,
    },
    ConflictingMethod {
        package_path: String,
        type_name: String,
        method: String,
        kept: String,
        discarded: String,
    },
    UnresolvedReference {
        file: String,
        package_path: String,
        type_name: String,
        reason: UnresolvedReason,
    },
    SkippedFile {
        file: String,
        reason: String,
    },
    MixedPackageNames {
        package_path: String,
        file: String,
        declared: String,
        recorded: String,
    },
}

impl Diagnostic {
    pub fn from_conflict(package_path: &str, conflict: MemberConflict) -> Self {
        let MemberConflict {
            kind,
            type_name,
            member,
            kept,
            discarded,
        } = conflict;
        match kind {
            MemberKind::Field => Diagnostic::ConflictingField {
                package_path: package_path.to_string(),
                type_name,
                field: member,
                kept,
                discarded,
            },
            MemberKind::Method => Diagnostic::ConflictingMethod {
                package_path: package_path.to_string(),
                type_name,
                method: member,
                kept,
                discarded,
            },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Diagnostic::ConflictingField { .. } | Diagnostic::ConflictingMethod { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ConflictingField {
                package_path,
                type_name,
                field,
                kept,
                discarded,
            } => write!(
                f,
                "{package_path}: field {type_name}.{field} redeclared, kept `{kept}` over `{discarded}`"
            ),
            Diagnostic::ConflictingMethod {
                package_path,
                type_name,
                method,
                kept,
                discarded,
            } => write!(
                f,
                "{package_path}: method {type_name}.{method} redeclared, kept `{kept}` over `{discarded}`"
            ),
            Diagnostic::UnresolvedReference {
                file,
                package_path,
                type_name,
                reason,
            } => {
                let why = match reason {
                    UnresolvedReason::ExternalPackage => "external package",
                    UnresolvedReason::UnknownType => "no such exported struct",
                };
                write!(f, "{file}: unresolved {package_path}.{type_name} ({why})")
            }
            Diagnostic::SkippedFile { file, reason } => write!(f, "{file}: skipped, {reason}"),
            Diagnostic::MixedPackageNames {
                package_path,
                file,
                declared,
                recorded,
            } => write!(
                f,
                "{file}: declares package {declared} but {package_path} already has {recorded}"
            ),
        }
    }
}
