use pkgraph::config::ConflictPolicy;
use pkgraph::core::{Diagnostic, StructField, StructInfo, StructMethod, TypeRegistry};

fn a_go() -> Vec<StructInfo> {
    vec![StructInfo::new("Foo")
        .with_comment("Foo is the main type.")
        .with_field(StructField::new("X", "int"))
        .with_method(StructMethod::new("Bar").with_return_types(["string"]))]
}

fn b_go() -> Vec<StructInfo> {
    vec![StructInfo::new("Foo").with_method(StructMethod::new("Baz").with_return_types(["int"]))]
}

fn method_names(info: &StructInfo) -> Vec<&str> {
    info.methods.keys().map(String::as_str).collect()
}

#[test]
fn methods_from_two_files_merge_into_one_struct() {
    let a = a_go();
    let b = b_go();
    let (registry, diagnostics) =
        TypeRegistry::build("pkg/a", [a.as_slice(), b.as_slice()], ConflictPolicy::LastWins);

    assert!(diagnostics.is_empty());
    assert_eq!(registry.package_path, "pkg/a");
    assert_eq!(registry.len(), 1);

    let foo = registry.get("Foo").unwrap();
    assert_eq!(foo.fields, vec![StructField::new("X", "int")]);
    assert_eq!(method_names(foo), vec!["Bar", "Baz"]);
    assert_eq!(foo.comment, "Foo is the main type.");
}

#[test]
fn merge_result_is_independent_of_file_order() {
    let a = a_go();
    let b = b_go();
    let (forward, _) =
        TypeRegistry::build("pkg/a", [a.as_slice(), b.as_slice()], ConflictPolicy::LastWins);
    let (backward, _) =
        TypeRegistry::build("pkg/a", [b.as_slice(), a.as_slice()], ConflictPolicy::LastWins);

    assert_eq!(forward, backward);
}

#[test]
fn methods_only_type_is_kept() {
    let b = b_go();
    let (registry, diagnostics) =
        TypeRegistry::build("pkg/a", [b.as_slice()], ConflictPolicy::LastWins);

    assert!(diagnostics.is_empty());
    assert!(registry.get("Foo").unwrap().is_methods_only());
}

#[test]
fn first_non_empty_comment_wins() {
    let undocumented = vec![StructInfo::new("Foo").with_field(StructField::new("X", "int"))];
    let documented = vec![StructInfo::new("Foo").with_comment("Later doc.")];
    let other = vec![StructInfo::new("Foo").with_comment("Ignored doc.")];

    let (registry, _) = TypeRegistry::build(
        "pkg/a",
        [undocumented.as_slice(), documented.as_slice(), other.as_slice()],
        ConflictPolicy::LastWins,
    );
    assert_eq!(registry.get("Foo").unwrap().comment, "Later doc.");
}

#[test]
fn conflicting_field_follows_policy() {
    let first = vec![StructInfo::new("Foo").with_field(StructField::new("X", "int"))];
    let second = vec![StructInfo::new("Foo").with_field(StructField::new("X", "int64"))];
    let files = [first.as_slice(), second.as_slice()];

    let (last, diagnostics) = TypeRegistry::build("pkg/a", files, ConflictPolicy::LastWins);
    assert_eq!(last.get("Foo").unwrap().field("X").unwrap().type_name, "int64");
    assert_eq!(
        diagnostics,
        vec![Diagnostic::ConflictingField {
            package_path: "pkg/a".to_string(),
            type_name: "Foo".to_string(),
            field: "X".to_string(),
            kept: "int64".to_string(),
            discarded: "int".to_string(),
        }]
    );

    let (first_wins, diagnostics) = TypeRegistry::build("pkg/a", files, ConflictPolicy::FirstWins);
    assert_eq!(first_wins.get("Foo").unwrap().field("X").unwrap().type_name, "int");
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].is_conflict());
}

#[test]
fn conflicting_method_follows_policy() {
    let first = vec![StructInfo::new("Foo").with_method(StructMethod::new("Bar").with_return_types(["string"]))];
    let second = vec![StructInfo::new("Foo").with_method(
        StructMethod::new("Bar")
            .with_parameters(["int"])
            .with_return_types(["string", "error"]),
    )];
    let files = [first.as_slice(), second.as_slice()];

    let (last, diagnostics) = TypeRegistry::build("pkg/a", files, ConflictPolicy::LastWins);
    assert_eq!(
        last.get("Foo").unwrap().method("Bar").unwrap().signature(),
        "Bar(int) (string, error)"
    );
    match &diagnostics[..] {
        [Diagnostic::ConflictingMethod {
            method,
            kept,
            discarded,
            ..
        }] => {
            assert_eq!(method, "Bar");
            assert_eq!(kept, "Bar(int) (string, error)");
            assert_eq!(discarded, "Bar() string");
        }
        other => panic!("expected one method conflict, got {other:?}"),
    }

    let (first_wins, _) = TypeRegistry::build("pkg/a", files, ConflictPolicy::FirstWins);
    assert_eq!(
        first_wins.get("Foo").unwrap().method("Bar").unwrap().signature(),
        "Bar() string"
    );
}

#[test]
fn identical_redeclaration_is_not_a_conflict() {
    let first = vec![StructInfo::new("Foo")
        .with_field(StructField::new("X", "int"))
        .with_method(StructMethod::new("Bar"))];
    let second = vec![StructInfo::new("Foo")
        .with_field(StructField::new("X", "int"))
        .with_method(StructMethod::new("Bar").with_comment("Bar does nothing."))];

    let (registry, diagnostics) = TypeRegistry::build(
        "pkg/a",
        [first.as_slice(), second.as_slice()],
        ConflictPolicy::LastWins,
    );

    assert!(diagnostics.is_empty());
    let foo = registry.get("Foo").unwrap();
    assert_eq!(foo.fields.len(), 1);
    assert_eq!(foo.method("Bar").unwrap().comment, "Bar does nothing.");
}

#[test]
fn iterates_in_name_order() {
    let structs = vec![
        StructInfo::new("Zeta"),
        StructInfo::new("Alpha"),
        StructInfo::new("Mid"),
    ];
    let (registry, _) = TypeRegistry::build("pkg/a", [structs.as_slice()], ConflictPolicy::LastWins);

    let names: Vec<&str> = registry.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Mid", "Zeta"]);
    assert!(registry.contains("Mid"));
    assert!(!registry.contains("Other"));
}
