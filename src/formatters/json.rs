use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use crate::core::{Analysis, DependencyKind};

/// JSON output of an analysis.
pub struct JsonFormatter {
    /// Graph-only summary instead of the full analysis
    compact: bool,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self {
            compact: false,
            pretty: true,
        }
    }

    pub fn compact() -> Self {
        Self {
            compact: true,
            pretty: false,
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn format_to_file(&self, analysis: &Analysis, output_path: &Path) -> Result<()> {
        let json_content = self.format_analysis(analysis)?;
        fs::write(output_path, json_content)?;
        Ok(())
    }

    pub fn format_analysis(&self, analysis: &Analysis) -> Result<String> {
        let value = if self.compact {
            self.compact_value(analysis)
        } else {
            serde_json::to_value(analysis)?
        };

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(rendered)
    }

    fn compact_value(&self, analysis: &Analysis) -> Value {
        let graph = &analysis.graph;
        let packages: Vec<Value> = graph
            .nodes()
            .map(|node| {
                let deps: Vec<Value> = graph
                    .dependencies(&node.pkg_path)
                    .into_iter()
                    .map(|dep| json!([dep.target, self.kind_code(dep.kind)]))
                    .collect();
                json!({
                    "p": node.pkg_path,
                    "n": node.package_name,
                    "fn": node.functions,
                    "d": deps,
                    "f": node.files,
                })
            })
            .collect();

        json!({
            "meta": {
                "packages": graph.len(),
                "files": analysis.files.len(),
                "external": graph.external_dependencies().len(),
                "format": "compact"
            },
            "packages": packages,
            "cycles": graph.import_cycles(),
        })
    }

    fn kind_code(&self, kind: DependencyKind) -> u8 {
        match kind {
            DependencyKind::Internal => 0,
            DependencyKind::External => 1,
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
