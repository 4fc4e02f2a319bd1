use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

/// Maps a source file to the path of the package it belongs to.
///
/// Package paths are the graph's keys, so two directories with the same
/// package name still get distinct nodes.
pub trait PackageLayout: Sync {
    fn package_path(&self, file: &Path) -> String;
}

impl<F> PackageLayout for F
where
    F: Fn(&Path) -> String + Sync,
{
    fn package_path(&self, file: &Path) -> String {
        self(file)
    }
}

/// Go module convention: `<module path>/<directory relative to go.mod>`.
#[derive(Debug, Clone)]
pub struct GoModuleLayout {
    root: PathBuf,
    module_path: Option<String>,
}

impl GoModuleLayout {
    pub fn new(root: impl Into<PathBuf>, module_path: Option<String>) -> Self {
        Self {
            root: root.into(),
            module_path,
        }
    }

    /// Read the `module` directive of `root/go.mod`, if there is one.
    pub fn detect(root: &Path) -> Result<Self> {
        let go_mod = root.join("go.mod");
        let module_path = if go_mod.is_file() {
            let content = fs::read_to_string(&go_mod)
                .with_context(|| format!("failed to read {}", go_mod.display()))?;
            parse_module_path(&content)
        } else {
            None
        };
        Ok(Self::new(root, module_path))
    }

    pub fn module_path(&self) -> Option<&str> {
        self.module_path.as_deref()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl PackageLayout for GoModuleLayout {
    fn package_path(&self, file: &Path) -> String {
        let relative = file.strip_prefix(&self.root).unwrap_or(file);
        let dir = relative.parent().map(slash_path).unwrap_or_default();

        match (&self.module_path, dir.is_empty()) {
            (Some(module), true) => module.clone(),
            (Some(module), false) => format!("{module}/{dir}"),
            (None, true) => ".".to_string(),
            (None, false) => dir,
        }
    }
}

/// Extract the module path from go.mod content.
pub fn parse_module_path(go_mod: &str) -> Option<String> {
    static MODULE_RE: OnceLock<Regex> = OnceLock::new();
    let re = MODULE_RE.get_or_init(|| {
        Regex::new(r#"(?m)^\s*module\s+"?([^\s"/][^\s"]*)"?\s*(?://.*)?$"#)
            .expect("module directive pattern is valid")
    });
    re.captures(go_mod)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Render a relative path with `/` separators, dropping `.` components.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Identifier of a file within the project: its root-relative slash path.
pub fn file_id(root: &Path, file: &Path) -> String {
    slash_path(file.strip_prefix(root).unwrap_or(file))
}
