use anyhow::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::AnalyzerConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub is_test: bool,
}

pub struct FileScanner {
    include_tests: bool,
    exclude_dirs: Vec<String>,
}

impl FileScanner {
    pub fn new() -> Self {
        Self::from_config(&AnalyzerConfig::default())
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            include_tests: config.include_tests,
            exclude_dirs: config.exclude_dirs.clone(),
        }
    }

    /// Every Go source file below `root_path`, sorted by path.
    pub fn scan_directory(&self, root_path: &Path) -> Result<Vec<SourceEntry>> {
        if !root_path.is_dir() {
            anyhow::bail!("not a directory: {}", root_path.display());
        }

        // Collect all entries first for parallel processing
        let entries: Vec<DirEntry> = WalkDir::new(root_path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded_dir(entry))
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .collect();

        let mut files: Vec<SourceEntry> = entries
            .par_iter()
            .filter_map(|entry| {
                let name = entry.file_name().to_str()?;
                if !name.ends_with(".go") {
                    return None;
                }
                let is_test = name.ends_with("_test.go");
                if is_test && !self.include_tests {
                    return None;
                }
                Some(SourceEntry {
                    path: entry.path().to_path_buf(),
                    is_test,
                })
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        tracing::debug!(root = %root_path.display(), files = files.len(), "scan complete");
        Ok(files)
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        // the go tool ignores directories starting with `.` or `_`
        name.starts_with('.')
            || name.starts_with('_')
            || self.exclude_dirs.iter().any(|dir| dir.as_str() == name)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
