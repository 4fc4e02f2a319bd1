//! Markdown report.
//!
//! One section per package, in package path order:
//!
//! - header with the declared package name and member files
//! - exported functions
//! - dependencies, external ones marked `(ext)`
//! - struct types merged across the package, with fields and methods
//!
//! followed by the imported structs each file uses, import cycles and
//! diagnostics.

use anyhow::Result;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::core::{Analysis, DependencyKind, Node, StructInfo};

pub struct MarkdownFormatter {
    /// Render struct fields and methods, not just type names
    include_members: bool,
    include_diagnostics: bool,
}

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self {
            include_members: true,
            include_diagnostics: true,
        }
    }

    pub fn with_members(mut self, include: bool) -> Self {
        self.include_members = include;
        self
    }

    pub fn with_diagnostics(mut self, include: bool) -> Self {
        self.include_diagnostics = include;
        self
    }

    pub fn format_to_file(&self, analysis: &Analysis, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.format_analysis(analysis)?)?;
        Ok(())
    }

    pub fn format_analysis(&self, analysis: &Analysis) -> Result<String> {
        let mut output = String::with_capacity(4096);
        let graph = &analysis.graph;

        writeln!(output, "# PACKAGE_GRAPH\n")?;
        writeln!(
            output,
            "{} packages, {} files, {} external dependencies\n",
            graph.len(),
            analysis.files.len(),
            graph.external_dependencies().len()
        )?;

        for node in graph.nodes() {
            self.write_package(&mut output, analysis, node)?;
        }

        self.write_usage(&mut output, analysis)?;

        let cycles = graph.import_cycles();
        if !cycles.is_empty() {
            writeln!(output, "## IMPORT_CYCLES\n")?;
            for cycle in cycles {
                writeln!(output, "- {}", cycle.join(" <-> "))?;
            }
            writeln!(output)?;
        }

        if self.include_diagnostics && !analysis.diagnostics.is_empty() {
            writeln!(output, "## DIAGNOSTICS\n")?;
            for diagnostic in &analysis.diagnostics {
                writeln!(output, "- {diagnostic}")?;
            }
            writeln!(output)?;
        }

        Ok(output)
    }

    fn write_package(&self, output: &mut String, analysis: &Analysis, node: &Node) -> Result<()> {
        writeln!(output, "## {} (`{}`)\n", node.pkg_path, node.package_name)?;

        let files: Vec<&str> = node.files.iter().map(String::as_str).collect();
        writeln!(output, "Files: {}\n", files.join(", "))?;

        if !node.functions.is_empty() {
            let functions: Vec<String> = node.functions.iter().map(|f| format!("{f}()")).collect();
            writeln!(output, "Functions: {}\n", functions.join(", "))?;
        }

        let dependencies = analysis.graph.dependencies(&node.pkg_path);
        if !dependencies.is_empty() {
            writeln!(output, "Depends on:")?;
            for dep in dependencies {
                match dep.kind {
                    DependencyKind::Internal => writeln!(output, "- {}", dep.target)?,
                    DependencyKind::External => writeln!(output, "- {} (ext)", dep.target)?,
                }
            }
            writeln!(output)?;
        }

        if let Some(registry) = analysis.registry(&node.pkg_path) {
            for info in registry.iter() {
                self.write_struct(output, info, "###")?;
            }
        }
        Ok(())
    }

    fn write_struct(&self, output: &mut String, info: &StructInfo, heading: &str) -> Result<()> {
        writeln!(output, "{heading} type {}\n", info.name)?;
        if !info.comment.is_empty() {
            for line in info.comment.lines() {
                writeln!(output, "> {line}")?;
            }
            writeln!(output)?;
        }
        if !self.include_members {
            return Ok(());
        }

        for field in &info.fields {
            writeln!(output, "- `{} {}`", field.name, field.type_name)?;
        }
        for method in info.methods.values() {
            writeln!(output, "- `func {}`", method.signature())?;
        }
        if !info.fields.is_empty() || !info.methods.is_empty() {
            writeln!(output)?;
        }
        Ok(())
    }

    fn write_usage(&self, output: &mut String, analysis: &Analysis) -> Result<()> {
        let users: Vec<_> = analysis
            .files
            .iter()
            .filter(|(_, info)| !info.used_imported_structs.is_empty())
            .collect();
        if users.is_empty() {
            return Ok(());
        }

        writeln!(output, "## IMPORTED_STRUCT_USAGE\n")?;
        for (file_id, info) in users {
            let names: Vec<&str> = info
                .used_imported_structs
                .iter()
                .map(|s| s.name.as_str())
                .collect();
            writeln!(output, "- {}: {}", file_id, names.join(", "))?;
        }
        writeln!(output)?;
        Ok(())
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}
