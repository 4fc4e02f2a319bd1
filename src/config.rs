use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which declaration survives when a field or method is declared twice for
/// the same type within one package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    #[default]
    LastWins,
    FirstWins,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Analyze `_test.go` files too.
    pub include_tests: bool,
    /// Directory names skipped wherever they appear below the root.
    pub exclude_dirs: Vec<String>,
    pub conflict_policy: ConflictPolicy,
    /// Abort the run on the first malformed file instead of skipping it.
    pub fail_on_malformed: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            include_tests: false,
            exclude_dirs: ["vendor", "testdata", ".git", "node_modules"]
                .into_iter()
                .map(String::from)
                .collect(),
            conflict_policy: ConflictPolicy::default(),
            fail_on_malformed: false,
        }
    }
}

impl AnalyzerConfig {
    /// Load a JSON config file. Keys that are absent keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn with_tests(mut self, include: bool) -> Self {
        self.include_tests = include;
        self
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn with_fail_on_malformed(mut self, fail: bool) -> Self {
        self.fail_on_malformed = fail;
        self
    }

    pub fn with_excluded_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dir in dirs {
            let dir = dir.into();
            if !self.exclude_dirs.contains(&dir) {
                self.exclude_dirs.push(dir);
            }
        }
        self
    }
}
