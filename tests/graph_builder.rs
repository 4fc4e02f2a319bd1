use pkgraph::core::{Dependency, DependencyKind, Diagnostic, FileInfo, GraphBuilder};

fn file(package: &str, functions: &[&str], imports: &[&str]) -> FileInfo {
    let mut info = FileInfo::new(package);
    info.functions = functions.iter().map(|f| f.to_string()).collect();
    info.imports = imports.iter().map(|i| i.to_string()).collect();
    info
}

fn sample_files() -> Vec<(&'static str, &'static str, FileInfo)> {
    vec![
        (
            "pkg/a/a.go",
            "pkg/a",
            file("a", &["Run", "helper"], &["fmt", "pkg/b"]),
        ),
        (
            "pkg/a/extra.go",
            "pkg/a",
            file("a", &["Stop", "Run"], &["pkg/b", "pkg/a", "strings"]),
        ),
        ("pkg/b/b.go", "pkg/b", file("b", &["New"], &["fmt"])),
    ]
}

#[test]
fn nodes_union_their_files() {
    let mut builder = GraphBuilder::new();
    for (id, path, info) in sample_files() {
        assert!(builder.add_file(id, path, &info).is_none());
    }
    let graph = builder.build();

    assert_eq!(graph.len(), 2);
    let a = graph.node("pkg/a").unwrap();
    assert_eq!(a.package_name, "a");
    assert_eq!(
        a.functions.iter().collect::<Vec<_>>(),
        vec!["Run", "Stop"],
        "only exported functions, once each"
    );
    assert_eq!(
        a.depends_on.iter().collect::<Vec<_>>(),
        vec!["fmt", "pkg/b", "strings"]
    );
    assert_eq!(
        a.files.iter().collect::<Vec<_>>(),
        vec!["pkg/a/a.go", "pkg/a/extra.go"]
    );
}

#[test]
fn package_never_depends_on_itself() {
    let mut builder = GraphBuilder::new();
    for (id, path, info) in sample_files() {
        builder.add_file(id, path, &info);
    }
    let graph = builder.build();

    for node in graph.nodes() {
        assert!(!node.depends_on.contains(&node.pkg_path));
    }
}

#[test]
fn graph_is_independent_of_file_order() {
    let mut forward = GraphBuilder::new();
    for (id, path, info) in sample_files() {
        forward.add_file(id, path, &info);
    }

    let mut backward = GraphBuilder::new();
    for (id, path, info) in sample_files().into_iter().rev() {
        backward.add_file(id, path, &info);
    }

    assert_eq!(forward.build(), backward.build());
}

#[test]
fn dependencies_are_classified() {
    let mut builder = GraphBuilder::new();
    for (id, path, info) in sample_files() {
        builder.add_file(id, path, &info);
    }
    let graph = builder.build();

    assert_eq!(
        graph.dependencies("pkg/a"),
        vec![
            Dependency {
                target: "fmt",
                kind: DependencyKind::External
            },
            Dependency {
                target: "pkg/b",
                kind: DependencyKind::Internal
            },
            Dependency {
                target: "strings",
                kind: DependencyKind::External
            },
        ]
    );
    assert_eq!(graph.dependents("pkg/b"), vec!["pkg/a"]);
    assert_eq!(
        graph.external_dependencies().into_iter().collect::<Vec<_>>(),
        vec!["fmt", "strings"]
    );
    assert!(graph.dependencies("pkg/missing").is_empty());
}

#[test]
fn mutual_imports_form_a_cycle() {
    let mut builder = GraphBuilder::new();
    builder.add_file("pkg/a/a.go", "pkg/a", &file("a", &[], &["pkg/b"]));
    builder.add_file("pkg/b/b.go", "pkg/b", &file("b", &[], &["pkg/a"]));
    builder.add_file("pkg/c/c.go", "pkg/c", &file("c", &[], &["pkg/a"]));
    let graph = builder.build();

    assert!(graph.node("pkg/a").unwrap().depends_on.contains("pkg/b"));
    assert!(graph.node("pkg/b").unwrap().depends_on.contains("pkg/a"));
    assert_eq!(
        graph.import_cycles(),
        vec![vec!["pkg/a".to_string(), "pkg/b".to_string()]]
    );
}

#[test]
fn petgraph_view_includes_external_targets() {
    let mut builder = GraphBuilder::new();
    for (id, path, info) in sample_files() {
        builder.add_file(id, path, &info);
    }
    let graph = builder.build().to_petgraph();

    // pkg/a, pkg/b, fmt, strings
    assert_eq!(graph.node_count(), 4);
    // a -> fmt, a -> pkg/b, a -> strings, b -> fmt
    assert_eq!(graph.edge_count(), 4);
}

#[test]
fn same_name_in_different_directories_stays_apart() {
    let mut builder = GraphBuilder::new();
    builder.add_file("api/v1/util.go", "api/v1/util", &file("util", &["A"], &[]));
    builder.add_file("internal/util/util.go", "internal/util", &file("util", &["B"], &[]));
    let graph = builder.build();

    assert_eq!(graph.len(), 2);
    assert!(graph.node("api/v1/util").unwrap().functions.contains("A"));
    assert!(graph.node("internal/util").unwrap().functions.contains("B"));
}

#[test]
fn mixed_package_names_are_reported() {
    let mut builder = GraphBuilder::new();
    assert!(builder
        .add_file("pkg/a/a.go", "pkg/a", &file("zeta", &[], &[]))
        .is_none());
    let diagnostic = builder
        .add_file("pkg/a/b.go", "pkg/a", &file("alpha", &[], &[]))
        .expect("mismatch reported");

    assert_eq!(
        diagnostic,
        Diagnostic::MixedPackageNames {
            package_path: "pkg/a".to_string(),
            file: "pkg/a/b.go".to_string(),
            declared: "alpha".to_string(),
            recorded: "zeta".to_string(),
        }
    );
    assert_eq!(builder.build().node("pkg/a").unwrap().package_name, "alpha");
}
