use petgraph::algo::tarjan_scc;
use petgraph::{graph::NodeIndex, Directed, Graph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::diagnostics::Diagnostic;
use super::model::FileInfo;

/// One package of the analyzed project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub pkg_path: String,
    /// Declared package name; the lexically smallest one if files disagree.
    pub package_name: String,
    /// Exported functions.
    pub functions: BTreeSet<String>,
    /// Imported package paths, never including `pkg_path` itself.
    pub depends_on: BTreeSet<String>,
    pub files: BTreeSet<String>,
}

impl Node {
    pub fn new(pkg_path: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            pkg_path: pkg_path.into(),
            package_name: package_name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// Target is a package of the analyzed project.
    Internal,
    /// Target has no node in the graph (standard library, third party).
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency<'a> {
    pub target: &'a str,
    pub kind: DependencyKind,
}

/// Packages keyed by path. Import cycles are legal and kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, Node>,
}

impl DependencyGraph {
    pub fn node(&self, pkg_path: &str) -> Option<&Node> {
        self.nodes.get(pkg_path)
    }

    pub fn contains(&self, pkg_path: &str) -> bool {
        self.nodes.contains_key(pkg_path)
    }

    /// Nodes in package path order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind_of(&self, target: &str) -> DependencyKind {
        if self.contains(target) {
            DependencyKind::Internal
        } else {
            DependencyKind::External
        }
    }

    /// Outgoing edges of a package, each classified against the graph.
    pub fn dependencies(&self, pkg_path: &str) -> Vec<Dependency<'_>> {
        self.node(pkg_path)
            .map(|node| {
                node.depends_on
                    .iter()
                    .map(|target| Dependency {
                        target,
                        kind: self.kind_of(target),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Internal packages importing `pkg_path`.
    pub fn dependents(&self, pkg_path: &str) -> Vec<&str> {
        self.nodes
            .values()
            .filter(|node| node.depends_on.contains(pkg_path))
            .map(|node| node.pkg_path.as_str())
            .collect()
    }

    /// Every imported path that has no node of its own.
    pub fn external_dependencies(&self) -> BTreeSet<&str> {
        self.nodes
            .values()
            .flat_map(|node| node.depends_on.iter())
            .filter(|target| !self.contains(target))
            .map(String::as_str)
            .collect()
    }

    /// Directed petgraph view: one vertex per package path (external targets
    /// included), one edge per import.
    pub fn to_petgraph(&self) -> Graph<String, DependencyKind, Directed> {
        let mut graph = Graph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();

        for path in self.nodes.keys() {
            index.insert(path, graph.add_node(path.clone()));
        }
        for node in self.nodes.values() {
            let source = index[node.pkg_path.as_str()];
            for target in &node.depends_on {
                let target_idx = *index
                    .entry(target.as_str())
                    .or_insert_with(|| graph.add_node(target.clone()));
                graph.add_edge(source, target_idx, self.kind_of(target));
            }
        }
        graph
    }

    /// Groups of internal packages that import each other, each sorted, in
    /// sorted order.
    pub fn import_cycles(&self) -> Vec<Vec<String>> {
        let graph = self.to_petgraph();
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| component.len() > 1)
            .map(|component| {
                let mut members: Vec<String> =
                    component.into_iter().map(|idx| graph[idx].clone()).collect();
                members.sort();
                members
            })
            .collect();
        cycles.sort();
        cycles
    }
}

/// Folds per-file results into one node per package path.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: BTreeMap<String, Node>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one file as a member of `pkg_path`.
    ///
    /// Returns a diagnostic when the file's package name disagrees with the
    /// name already recorded for that path.
    pub fn add_file(
        &mut self,
        file_id: &str,
        pkg_path: &str,
        info: &FileInfo,
    ) -> Option<Diagnostic> {
        let node = self
            .nodes
            .entry(pkg_path.to_string())
            .or_insert_with(|| Node::new(pkg_path, &info.package_name));

        node.files.insert(file_id.to_string());
        node.functions
            .extend(info.exported_functions().map(String::from));
        node.depends_on.extend(
            info.imports
                .iter()
                .filter(|import| import.as_str() != pkg_path)
                .cloned(),
        );

        if node.package_name != info.package_name {
            let diagnostic = Diagnostic::MixedPackageNames {
                package_path: pkg_path.to_string(),
                file: file_id.to_string(),
                declared: info.package_name.clone(),
                recorded: node.package_name.clone(),
            };
            // the lexically smallest name wins so file order does not matter
            if info.package_name < node.package_name {
                node.package_name = info.package_name.clone();
            }
            return Some(diagnostic);
        }
        None
    }

    pub fn build(self) -> DependencyGraph {
        DependencyGraph { nodes: self.nodes }
    }
}
