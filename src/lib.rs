//! # PKGRAPH
//!
//! Package structure and dependency graph extraction for Go codebases.
//!
//! PKGRAPH summarizes every Go source file of a project (package, imports,
//! functions, struct types with their fields and methods, and the imported
//! structs each file uses) and links packages into a dependency graph keyed
//! by package path.
//!
//! ## Pipeline
//!
//! - **Extraction**: one [`ast::SourceFile`] becomes one [`core::FileInfo`]
//! - **Type registry**: struct declarations and methods merged per package
//! - **Graph building**: one [`core::Node`] per package path
//! - **Usage resolution**: imported type references replaced by full structs
//!
//! ## Output Formats
//!
//! - **Markdown**: readable per-package report
//! - **JSON**: the full analysis for programmatic consumption

pub mod ast;
pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod parsers;
