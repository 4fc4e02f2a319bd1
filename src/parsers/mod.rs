pub mod common;
pub mod go;

use anyhow::Result;
use std::path::Path;

use crate::ast::SourceFile;

/// A source front-end producing the declaration-level tree the extractor
/// consumes.
pub trait LanguageParser: Send + Sync {
    fn parse_source(&self, source: &str) -> Result<SourceFile>;

    fn parse_file(&self, file_path: &Path) -> Result<SourceFile>;

    fn language_name(&self) -> &str;
}
