use pkgraph::config::{AnalyzerConfig, ConflictPolicy};
use pkgraph::core::layout::{file_id, parse_module_path};
use pkgraph::core::{GoModuleLayout, PackageLayout};
use std::fs;
use std::path::Path;

#[test]
fn parses_module_directive() {
    let go_mod = "// comment\nmodule example.com/app\n\ngo 1.22\n\nrequire github.com/pkg/errors v0.9.1\n";
    assert_eq!(parse_module_path(go_mod).as_deref(), Some("example.com/app"));

    assert_eq!(
        parse_module_path("module \"example.com/quoted\" // trailing\n").as_deref(),
        Some("example.com/quoted")
    );
    assert_eq!(parse_module_path("go 1.21\n"), None);
}

#[test]
fn module_layout_prefixes_relative_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(dir.path().join("go.mod"), "module example.com/app\n\ngo 1.22\n").unwrap();

    let layout = GoModuleLayout::detect(dir.path()).unwrap();
    assert_eq!(layout.module_path(), Some("example.com/app"));
    assert_eq!(layout.root(), dir.path());

    let root = dir.path();
    assert_eq!(layout.package_path(&root.join("main.go")), "example.com/app");
    assert_eq!(
        layout.package_path(&root.join("internal/store/db.go")),
        "example.com/app/internal/store"
    );
}

#[test]
fn without_go_mod_paths_are_relative_directories() {
    let dir = tempfile::TempDir::new().unwrap();
    let layout = GoModuleLayout::detect(dir.path()).unwrap();

    assert_eq!(layout.module_path(), None);
    assert_eq!(layout.package_path(&dir.path().join("main.go")), ".");
    assert_eq!(layout.package_path(&dir.path().join("pkg/a/a.go")), "pkg/a");
}

#[test]
fn closures_act_as_layouts() {
    let layout = |file: &Path| format!("custom/{}", file.parent().unwrap().display());
    assert_eq!(layout.package_path(Path::new("x/y.go")), "custom/x");
}

#[test]
fn file_ids_are_root_relative() {
    let root = Path::new("/work/project");
    assert_eq!(file_id(root, &root.join("pkg/a/a.go")), "pkg/a/a.go");
    assert_eq!(file_id(root, Path::new("other/b.go")), "other/b.go");
}

#[test]
fn config_file_overrides_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("pkgraph.json");
    let raw = serde_json::json!({
        "include_tests": true,
        "conflict_policy": "first-wins"
    });
    fs::write(&path, raw.to_string()).unwrap();

    let config = AnalyzerConfig::from_file(&path).unwrap();
    assert!(config.include_tests);
    assert_eq!(config.conflict_policy, ConflictPolicy::FirstWins);
    assert!(!config.fail_on_malformed);
    assert!(config.exclude_dirs.iter().any(|d| d == "vendor"));

    fs::write(&path, "{ not json").unwrap();
    assert!(AnalyzerConfig::from_file(&path).is_err());
    assert!(AnalyzerConfig::from_file(&dir.path().join("missing.json")).is_err());
}
