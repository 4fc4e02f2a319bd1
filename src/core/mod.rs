pub mod analyzer;
pub mod diagnostics;
pub mod extractor;
pub mod graph;
pub mod layout;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod scanner;

pub use analyzer::{Analysis, CodebaseAnalyzer};
pub use diagnostics::{Diagnostic, UnresolvedReason};
pub use extractor::FileExtractor;
pub use graph::{Dependency, DependencyGraph, DependencyKind, GraphBuilder, Node};
pub use layout::{GoModuleLayout, PackageLayout};
pub use model::{FileInfo, ImportedTypeRef, StructField, StructInfo, StructMethod};
pub use registry::TypeRegistry;
pub use resolver::UsageResolver;
pub use scanner::FileScanner;
