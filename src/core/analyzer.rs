use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::diagnostics::Diagnostic;
use super::extractor::FileExtractor;
use super::graph::{DependencyGraph, GraphBuilder};
use super::layout::{file_id, GoModuleLayout, PackageLayout};
use super::model::FileInfo;
use super::registry::TypeRegistry;
use super::resolver::UsageResolver;
use super::scanner::FileScanner;
use crate::ast::SourceFile;
use crate::config::AnalyzerConfig;
use crate::parsers::{go::GoParser, LanguageParser};

/// Everything one run produces.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    pub graph: DependencyGraph,
    /// Per-file summaries keyed by file identifier, with imported structs
    /// resolved.
    pub files: BTreeMap<String, FileInfo>,
    /// Package path of every analyzed file.
    pub package_of: BTreeMap<String, String>,
    #[serde(skip)]
    pub registries: BTreeMap<String, TypeRegistry>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn file(&self, file_id: &str) -> Option<&FileInfo> {
        self.files.get(file_id)
    }

    pub fn registry(&self, pkg_path: &str) -> Option<&TypeRegistry> {
        self.registries.get(pkg_path)
    }

    pub fn conflicts(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_conflict())
    }
}

/// Outcome of parsing and extracting one file, before any reduction.
struct ExtractedFile {
    file_id: String,
    pkg_path: String,
    outcome: Result<FileInfo>,
}

pub struct CodebaseAnalyzer {
    config: AnalyzerConfig,
    file_scanner: FileScanner,
    parser: GoParser,
    extractor: FileExtractor,
}

impl CodebaseAnalyzer {
    pub fn new() -> Result<Self> {
        Self::with_config(AnalyzerConfig::default())
    }

    pub fn with_config(config: AnalyzerConfig) -> Result<Self> {
        Ok(Self {
            file_scanner: FileScanner::from_config(&config),
            parser: GoParser::new()?,
            extractor: FileExtractor::with_policy(config.conflict_policy),
            config,
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Scan `root_path`, parse every Go file and build the analysis.
    pub fn analyze(&self, root_path: &Path) -> Result<Analysis> {
        tracing::info!(root = %root_path.display(), "scanning files");
        let files = self.file_scanner.scan_directory(root_path)?;
        tracing::info!(count = files.len(), "found files to analyze");

        let layout = GoModuleLayout::detect(root_path)?;
        if let Some(module) = layout.module_path() {
            tracing::debug!(module, "using go.mod module path");
        }

        let extracted: Vec<ExtractedFile> = files
            .par_iter()
            .map(|entry| {
                let outcome = self
                    .parser
                    .parse_file(&entry.path)
                    .and_then(|source| self.extractor.extract(&source).map_err(Into::into));
                ExtractedFile {
                    file_id: file_id(root_path, &entry.path),
                    pkg_path: layout.package_path(&entry.path),
                    outcome,
                }
            })
            .collect();

        self.reduce(extracted)
    }

    /// Build the analysis from already-parsed files.
    ///
    /// Each source is paired with its file identifier; `layout` maps that
    /// identifier (as a path) to the owning package path.
    pub fn analyze_sources(
        &self,
        sources: Vec<(String, SourceFile)>,
        layout: &dyn PackageLayout,
    ) -> Result<Analysis> {
        let extracted: Vec<ExtractedFile> = sources
            .par_iter()
            .map(|(id, source)| ExtractedFile {
                file_id: id.clone(),
                pkg_path: layout.package_path(Path::new(id)),
                outcome: self.extractor.extract(source).map_err(Into::into),
            })
            .collect();

        self.reduce(extracted)
    }

    /// The sequential part: registries per package, the graph, then usage
    /// resolution. Files are visited in identifier order.
    fn reduce(&self, mut extracted: Vec<ExtractedFile>) -> Result<Analysis> {
        extracted.sort_by(|a, b| a.file_id.cmp(&b.file_id));

        let mut analysis = Analysis::default();
        for item in extracted {
            match item.outcome {
                Ok(info) => {
                    analysis.package_of.insert(item.file_id.clone(), item.pkg_path);
                    analysis.files.insert(item.file_id, info);
                }
                Err(err) if self.config.fail_on_malformed => {
                    return Err(err).with_context(|| format!("failed to analyze {}", item.file_id));
                }
                Err(err) => {
                    tracing::warn!(file = %item.file_id, error = %err, "skipping file");
                    analysis.diagnostics.push(Diagnostic::SkippedFile {
                        file: item.file_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(files = analysis.files.len(), "merging types per package");
        let mut by_package: BTreeMap<&str, Vec<&FileInfo>> = BTreeMap::new();
        for (id, info) in &analysis.files {
            by_package
                .entry(analysis.package_of[id].as_str())
                .or_default()
                .push(info);
        }
        for (pkg_path, members) in by_package {
            let (registry, conflicts) = TypeRegistry::build(
                pkg_path,
                members.iter().map(|info| info.structs.as_slice()),
                self.config.conflict_policy,
            );
            for conflict in &conflicts {
                tracing::warn!("{conflict}");
            }
            analysis.diagnostics.extend(conflicts);
            analysis.registries.insert(pkg_path.to_string(), registry);
        }

        tracing::info!("building dependency graph");
        let mut graph_builder = GraphBuilder::new();
        for (id, info) in &analysis.files {
            if let Some(mixed) = graph_builder.add_file(id, &analysis.package_of[id], info) {
                tracing::warn!("{mixed}");
                analysis.diagnostics.push(mixed);
            }
        }
        analysis.graph = graph_builder.build();

        tracing::info!("resolving imported types");
        let resolver = UsageResolver::new(&analysis.registries);
        for (id, info) in analysis.files.iter_mut() {
            let unresolved = resolver.resolve_file(id, info);
            for diagnostic in &unresolved {
                tracing::debug!("{diagnostic}");
            }
            analysis.diagnostics.extend(unresolved);
        }

        let cycles = analysis.graph.import_cycles();
        if !cycles.is_empty() {
            tracing::warn!(count = cycles.len(), "import cycles detected");
        }
        tracing::info!(
            packages = analysis.graph.len(),
            diagnostics = analysis.diagnostics.len(),
            "analysis complete"
        );
        Ok(analysis)
    }
}
