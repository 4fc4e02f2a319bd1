use pkgraph::ast::{Decl, ImportName, TypeExpr};
use pkgraph::core::{FileExtractor, ImportedTypeRef};
use pkgraph::parsers::go::GoParser;
use pkgraph::parsers::LanguageParser;
use std::fs;

const SHAPES: &str = r#"package shapes

import (
	"fmt"
	w "example.com/app/widgets"
	_ "example.com/app/driver"
	"example.com/app/store"
)

// Point is a location.
// It has two coordinates.
type Point struct {
	X, Y int
	Label string
}

type (
	ID    string
	Alias = Point
)

// Move shifts the point.
func (p *Point) Move(dx, dy int) Point {
	return Point{X: p.X + dx, Y: p.Y + dy}
}

func (p Point) String() string {
	return fmt.Sprintf("(%d, %d)", p.X, p.Y)
}

func NewPoint(x int, y int) *Point {
	return &Point{X: x, Y: y}
}

func render(items []*w.Widget) (store.Handle, error) {
	var h store.Handle
	_ = w.Widget{}
	return h, nil
}

var Default = store.Entry{}
"#;

#[test]
fn parses_package_and_imports() {
    let parser = GoParser::new().unwrap();
    let file = parser.parse_source(SHAPES).unwrap();

    assert_eq!(file.package.as_deref(), Some("shapes"));
    let paths: Vec<&str> = file.imports.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "fmt",
            "example.com/app/widgets",
            "example.com/app/driver",
            "example.com/app/store"
        ]
    );
    assert_eq!(file.imports[1].name, ImportName::Alias("w".to_string()));
    assert_eq!(file.imports[2].name, ImportName::Blank);
    assert_eq!(file.imports[3].name, ImportName::Default);
}

#[test]
fn lowers_struct_with_doc_comment() {
    let parser = GoParser::new().unwrap();
    let file = parser.parse_source(SHAPES).unwrap();

    let point = file
        .decls
        .iter()
        .find_map(|decl| match decl {
            Decl::Type(spec) if spec.name == "Point" => Some(spec),
            _ => None,
        })
        .expect("Point type spec");

    assert_eq!(
        point.doc.as_deref(),
        Some("Point is a location.\nIt has two coordinates.")
    );
    let TypeExpr::Struct(fields) = &point.ty else {
        panic!("Point should lower to a struct, got {:?}", point.ty);
    };
    assert_eq!(fields[0].names, vec!["X", "Y"]);
    assert_eq!(fields[0].ty, TypeExpr::named("int"));
    assert_eq!(fields[1].names, vec!["Label"]);
}

#[test]
fn grouped_type_declaration_keeps_aliases_apart() {
    let parser = GoParser::new().unwrap();
    let file = parser.parse_source(SHAPES).unwrap();

    let specs: Vec<_> = file
        .decls
        .iter()
        .filter_map(|decl| match decl {
            Decl::Type(spec) => Some((spec.name.as_str(), spec.alias)),
            _ => None,
        })
        .collect();
    assert!(specs.contains(&("ID", false)));
    assert!(specs.contains(&("Alias", true)));
}

#[test]
fn lowers_methods_with_receivers() {
    let parser = GoParser::new().unwrap();
    let file = parser.parse_source(SHAPES).unwrap();

    let moved = file
        .decls
        .iter()
        .find_map(|decl| match decl {
            Decl::Func(func) if func.name == "Move" => Some(func),
            _ => None,
        })
        .expect("Move method");

    let receiver = moved.receiver.as_ref().expect("receiver");
    assert_eq!(receiver.name.as_deref(), Some("p"));
    assert_eq!(receiver.ty.base_name(), Some("Point"));
    assert_eq!(receiver.ty.to_string(), "*Point");
    assert_eq!(moved.params.len(), 2);
    assert_eq!(moved.doc.as_deref(), Some("Move shifts the point."));
}

#[test]
fn parse_and_extract_round_out_file_info() {
    let parser = GoParser::new().unwrap();
    let file = parser.parse_source(SHAPES).unwrap();
    let info = FileExtractor::new().extract(&file).unwrap();

    assert_eq!(info.package_name, "shapes");
    assert_eq!(info.functions, vec!["NewPoint", "render"]);

    let point = info.struct_named("Point").unwrap();
    let names: Vec<&str> = point.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["X", "Y", "Label"]);
    assert_eq!(
        point.method("Move").unwrap().signature(),
        "Move(int, int) Point"
    );
    assert_eq!(point.method("String").unwrap().return_types, vec!["string"]);

    assert!(info
        .imported_type_refs
        .contains(&ImportedTypeRef::new("example.com/app/widgets", "Widget")));
    assert!(info
        .imported_type_refs
        .contains(&ImportedTypeRef::new("example.com/app/store", "Handle")));
    assert!(info
        .imported_type_refs
        .contains(&ImportedTypeRef::new("example.com/app/store", "Entry")));
    assert!(!info
        .imported_type_refs
        .iter()
        .any(|r| r.package_path == "example.com/app/driver"));
}

#[test]
fn missing_package_clause_is_reported_by_extractor() {
    let parser = GoParser::new().unwrap();
    let file = parser.parse_source("func main() {}\n").unwrap();

    assert!(file.package.is_none());
    assert!(FileExtractor::new().extract(&file).is_err());
}

#[test]
fn parse_file_reads_from_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("main.go");
    fs::write(&path, "package main\n\nfunc main() {}\n").unwrap();

    let parser = GoParser::new().unwrap();
    let file = parser.parse_file(&path).unwrap();
    assert_eq!(file.package.as_deref(), Some("main"));
    assert_eq!(parser.language_name(), "go");

    assert!(parser.parse_file(&dir.path().join("missing.go")).is_err());
}
