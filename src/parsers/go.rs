use anyhow::Result;
use std::path::Path;
use tree_sitter::{Language, Node as TSNode};

use super::common::{extract_text, find_child_by_kind, leading_comment, read_source, TreeSitterParser};
use super::LanguageParser;
use crate::ast::{
    ChanDir, Decl, FieldDecl, FuncDecl, ImportSpec, InterfaceElem, Param, SourceFile, TypeExpr,
    TypeSpec, VarSpec,
};

/// Lowers Go source into [`SourceFile`] using tree-sitter-go.
pub struct GoParser {
    language: Language,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let language = tree_sitter_go::language();
        // fail early if the grammar and runtime versions disagree
        TreeSitterParser::new(language)?;
        Ok(Self { language })
    }

    fn extract_package(&self, root: &TSNode, source: &[u8]) -> Option<String> {
        let clause = find_child_by_kind(root, "package_clause")?;
        let identifier = find_child_by_kind(&clause, "package_identifier")?;
        Some(extract_text(&identifier, source).to_string())
    }

    fn extract_imports(&self, root: &TSNode, source: &[u8], imports: &mut Vec<ImportSpec>) {
        let mut cursor = root.walk();

        for child in root.children(&mut cursor) {
            if child.kind() == "import_declaration" {
                self.process_import(&child, source, imports);
            }
        }
    }

    fn process_import(&self, import_node: &TSNode, source: &[u8], imports: &mut Vec<ImportSpec>) {
        // Handle single import or import group
        if let Some(import_spec_list) = find_child_by_kind(import_node, "import_spec_list") {
            let mut cursor = import_spec_list.walk();
            for import_spec in import_spec_list.named_children(&mut cursor) {
                if import_spec.kind() == "import_spec" {
                    self.process_single_import(&import_spec, source, imports);
                }
            }
        } else if let Some(import_spec) = find_child_by_kind(import_node, "import_spec") {
            self.process_single_import(&import_spec, source, imports);
        }
    }

    fn process_single_import(
        &self,
        import_spec: &TSNode,
        source: &[u8],
        imports: &mut Vec<ImportSpec>,
    ) {
        let Some(path_node) = import_spec.child_by_field_name("path") else {
            return;
        };
        let path = extract_text(&path_node, source)
            .trim_matches(|c| c == '"' || c == '`')
            .to_string();

        let spec = match import_spec.child_by_field_name("name") {
            Some(name) => ImportSpec::aliased(extract_text(&name, source), path),
            None => ImportSpec::new(path),
        };
        imports.push(spec);
    }

    fn extract_declarations(&self, root: &TSNode, source: &[u8], decls: &mut Vec<Decl>) {
        let mut cursor = root.walk();

        for child in root.children(&mut cursor) {
            match child.kind() {
                "function_declaration" => decls.push(self.process_function(&child, source)),
                "method_declaration" => decls.push(self.process_method(&child, source)),
                "type_declaration" => self.process_type_declaration(&child, source, decls),
                "var_declaration" | "const_declaration" => {
                    self.process_value_declaration(&child, source, decls)
                }
                "ERROR" => decls.push(Decl::Unparsed {
                    line: child.start_position().row + 1,
                }),
                _ => {}
            }
        }
    }

    fn process_function(&self, func_node: &TSNode, source: &[u8]) -> Decl {
        let Some(name_node) = func_node.child_by_field_name("name") else {
            return Decl::Unparsed {
                line: func_node.start_position().row + 1,
            };
        };

        let mut func = FuncDecl::new(extract_text(&name_node, source));
        func.line = func_node.start_position().row + 1;
        func.doc = leading_comment(func_node, source);
        self.fill_signature(func_node, source, &mut func);
        Decl::Func(func)
    }

    fn process_method(&self, method_node: &TSNode, source: &[u8]) -> Decl {
        let Some(name_node) = method_node.child_by_field_name("name") else {
            return Decl::Unparsed {
                line: method_node.start_position().row + 1,
            };
        };

        let mut method = FuncDecl::new(extract_text(&name_node, source));
        method.line = method_node.start_position().row + 1;
        method.doc = leading_comment(method_node, source);

        // The receiver is a parameter list holding exactly one parameter
        let receiver = method_node
            .child_by_field_name("receiver")
            .map(|list| self.lower_parameter_list(&list, source))
            .and_then(|params| params.into_iter().next())
            .unwrap_or_else(|| Param::unnamed(TypeExpr::Other(String::new())));
        method.receiver = Some(receiver);

        self.fill_signature(method_node, source, &mut method);
        Decl::Func(method)
    }

    fn fill_signature(&self, node: &TSNode, source: &[u8], func: &mut FuncDecl) {
        if let Some(params) = node.child_by_field_name("parameters") {
            func.params = self.lower_parameter_list(&params, source);
        }
        if let Some(result) = node.child_by_field_name("result") {
            func.results = self.lower_result(&result, source);
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.collect_qualified_types(&body, source, &mut func.body_types);
        }
    }

    fn process_type_declaration(&self, type_decl: &TSNode, source: &[u8], decls: &mut Vec<Decl>) {
        let outer_doc = leading_comment(type_decl, source);
        let mut cursor = type_decl.walk();
        let specs: Vec<TSNode> = type_decl
            .named_children(&mut cursor)
            .filter(|child| matches!(child.kind(), "type_spec" | "type_alias"))
            .collect();

        // A lone spec takes the comment written above the `type` keyword
        let single = specs.len() == 1;
        for spec in specs {
            let doc = leading_comment(&spec, source).or_else(|| {
                if single {
                    outer_doc.clone()
                } else {
                    None
                }
            });
            decls.push(self.process_type_spec(&spec, source, doc));
        }
    }

    fn process_type_spec(&self, type_spec: &TSNode, source: &[u8], doc: Option<String>) -> Decl {
        let line = type_spec.start_position().row + 1;
        let (Some(name_node), Some(type_node)) = (
            type_spec.child_by_field_name("name"),
            type_spec.child_by_field_name("type"),
        ) else {
            return Decl::Unparsed { line };
        };

        let mut spec = TypeSpec::new(
            extract_text(&name_node, source),
            self.lower_type(&type_node, source),
        );
        spec.alias = type_spec.kind() == "type_alias";
        spec.doc = doc;
        spec.line = line;
        Decl::Type(spec)
    }

    fn process_value_declaration(&self, declaration: &TSNode, source: &[u8], decls: &mut Vec<Decl>) {
        let mut cursor = declaration.walk();

        for child in declaration.named_children(&mut cursor) {
            match child.kind() {
                "var_spec" | "const_spec" => decls.push(self.process_value_spec(&child, source)),
                // grouped specs, depending on grammar version
                "var_spec_list" | "const_spec_list" => {
                    self.process_value_declaration(&child, source, decls)
                }
                _ => {}
            }
        }
    }

    fn process_value_spec(&self, value_spec: &TSNode, source: &[u8]) -> Decl {
        let mut cursor = value_spec.walk();
        let names: Vec<String> = value_spec
            .children_by_field_name("name", &mut cursor)
            .map(|name| extract_text(&name, source).to_string())
            .collect();

        let mut value_types = Vec::new();
        if let Some(value) = value_spec.child_by_field_name("value") {
            self.collect_qualified_types(&value, source, &mut value_types);
        }

        Decl::Var(VarSpec {
            names,
            ty: value_spec
                .child_by_field_name("type")
                .map(|ty| self.lower_type(&ty, source)),
            value_types,
            line: value_spec.start_position().row + 1,
        })
    }

    fn lower_result(&self, result: &TSNode, source: &[u8]) -> Vec<Param> {
        if result.kind() == "parameter_list" {
            self.lower_parameter_list(result, source)
        } else {
            vec![Param::unnamed(self.lower_type(result, source))]
        }
    }

    /// One [`Param`] per declared name (`a, b int` yields two).
    fn lower_parameter_list(&self, list: &TSNode, source: &[u8]) -> Vec<Param> {
        let mut params = Vec::new();
        let mut cursor = list.walk();

        for declaration in list.named_children(&mut cursor) {
            let variadic = match declaration.kind() {
                "parameter_declaration" => false,
                "variadic_parameter_declaration" => true,
                _ => continue,
            };
            let mut ty = self.lower_field(&declaration, "type", source);
            if variadic {
                ty = TypeExpr::Variadic(Box::new(ty));
            }

            let mut name_cursor = declaration.walk();
            let names: Vec<String> = declaration
                .children_by_field_name("name", &mut name_cursor)
                .map(|name| extract_text(&name, source).to_string())
                .collect();

            if names.is_empty() {
                params.push(Param::unnamed(ty));
            } else {
                params.extend(names.into_iter().map(|name| Param::new(name, ty.clone())));
            }
        }
        params
    }

    fn lower_field(&self, node: &TSNode, field: &str, source: &[u8]) -> TypeExpr {
        node.child_by_field_name(field)
            .map(|child| self.lower_type(&child, source))
            .unwrap_or_else(|| TypeExpr::Other(String::new()))
    }

    fn lower_type(&self, node: &TSNode, source: &[u8]) -> TypeExpr {
        match node.kind() {
            "type_identifier" | "identifier" => TypeExpr::Named(extract_text(node, source).to_string()),
            "qualified_type" => {
                let package = node
                    .child_by_field_name("package")
                    .map(|n| extract_text(&n, source))
                    .unwrap_or_default();
                let name = node
                    .child_by_field_name("name")
                    .map(|n| extract_text(&n, source))
                    .unwrap_or_default();
                TypeExpr::qualified(package, name)
            }
            "pointer_type" => match node.named_child(0) {
                Some(inner) => TypeExpr::pointer(self.lower_type(&inner, source)),
                None => TypeExpr::Other(extract_text(node, source).to_string()),
            },
            "slice_type" => TypeExpr::slice(self.lower_field(node, "element", source)),
            "array_type" => TypeExpr::Array {
                len: node
                    .child_by_field_name("length")
                    .map(|n| extract_text(&n, source).to_string())
                    .unwrap_or_default(),
                elem: Box::new(self.lower_field(node, "element", source)),
            },
            "implicit_length_array_type" => TypeExpr::Array {
                len: "...".to_string(),
                elem: Box::new(self.lower_field(node, "element", source)),
            },
            "map_type" => TypeExpr::Map {
                key: Box::new(self.lower_field(node, "key", source)),
                value: Box::new(self.lower_field(node, "value", source)),
            },
            "channel_type" => {
                let text = extract_text(node, source);
                let dir = if text.starts_with("<-") {
                    ChanDir::Recv
                } else if text.starts_with("chan") && text[4..].trim_start().starts_with("<-") {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                TypeExpr::Chan {
                    dir,
                    elem: Box::new(self.lower_field(node, "value", source)),
                }
            }
            "function_type" => TypeExpr::Func {
                params: node
                    .child_by_field_name("parameters")
                    .map(|list| self.lower_parameter_list(&list, source))
                    .unwrap_or_default(),
                results: node
                    .child_by_field_name("result")
                    .map(|result| self.lower_result(&result, source))
                    .unwrap_or_default(),
            },
            "struct_type" => TypeExpr::Struct(self.lower_struct_fields(node, source)),
            "interface_type" => TypeExpr::Interface(self.lower_interface(node, source)),
            "generic_type" => {
                let args = match node.child_by_field_name("type_arguments") {
                    Some(arguments) => {
                        let mut cursor = arguments.walk();
                        let lowered: Vec<TypeExpr> = arguments
                            .named_children(&mut cursor)
                            .map(|arg| self.lower_type(&arg, source))
                            .collect();
                        lowered
                    }
                    None => Vec::new(),
                };
                TypeExpr::Generic {
                    base: Box::new(self.lower_field(node, "type", source)),
                    args,
                }
            }
            "negated_type" | "union_type" => TypeExpr::Other(extract_text(node, source).to_string()),
            // parenthesized types and wrapper nodes such as type_elem
            _ if node.named_child_count() == 1 => match node.named_child(0) {
                Some(inner) => self.lower_type(&inner, source),
                None => TypeExpr::Other(extract_text(node, source).to_string()),
            },
            _ => TypeExpr::Other(extract_text(node, source).to_string()),
        }
    }

    fn lower_struct_fields(&self, struct_node: &TSNode, source: &[u8]) -> Vec<FieldDecl> {
        let Some(field_list) = find_child_by_kind(struct_node, "field_declaration_list") else {
            return Vec::new();
        };

        let mut fields = Vec::new();
        let mut cursor = field_list.walk();
        for field_decl in field_list.named_children(&mut cursor) {
            if field_decl.kind() != "field_declaration" {
                continue;
            }

            let mut ty = self.lower_field(&field_decl, "type", source);
            let mut name_cursor = field_decl.walk();
            let names: Vec<String> = field_decl
                .children_by_field_name("name", &mut name_cursor)
                .map(|name| extract_text(&name, source).to_string())
                .collect();

            if names.is_empty() {
                // Embedded `*T` keeps the star as an anonymous token
                if find_child_by_kind(&field_decl, "*").is_some() {
                    ty = TypeExpr::pointer(ty);
                }
                fields.push(FieldDecl::embedded(ty));
            } else {
                fields.push(FieldDecl { names, ty });
            }
        }
        fields
    }

    fn lower_interface(&self, interface_node: &TSNode, source: &[u8]) -> Vec<InterfaceElem> {
        let mut elems = Vec::new();
        let mut cursor = interface_node.walk();

        for child in interface_node.named_children(&mut cursor) {
            match child.kind() {
                "method_spec" | "method_elem" => {
                    let Some(name) = child.child_by_field_name("name") else {
                        continue;
                    };
                    elems.push(InterfaceElem {
                        name: Some(extract_text(&name, source).to_string()),
                        ty: TypeExpr::Func {
                            params: child
                                .child_by_field_name("parameters")
                                .map(|list| self.lower_parameter_list(&list, source))
                                .unwrap_or_default(),
                            results: child
                                .child_by_field_name("result")
                                .map(|result| self.lower_result(&result, source))
                                .unwrap_or_default(),
                        },
                    });
                }
                "comment" => {}
                _ => elems.push(InterfaceElem {
                    name: None,
                    ty: self.lower_type(&child, source),
                }),
            }
        }
        elems
    }

    /// Every `pkg.Type` below `node`, in source order.
    fn collect_qualified_types(&self, node: &TSNode, source: &[u8], out: &mut Vec<TypeExpr>) {
        if node.kind() == "qualified_type" {
            out.push(self.lower_type(node, source));
            return;
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.collect_qualified_types(&child, source, out);
        }
    }
}

impl LanguageParser for GoParser {
    fn parse_source(&self, source: &str) -> Result<SourceFile> {
        let mut parser = TreeSitterParser::new(self.language)?;
        let tree = parser.parse_source(source)?;
        let source_bytes = source.as_bytes();
        let root_node = tree.root_node();

        let mut file = SourceFile {
            package: self.extract_package(&root_node, source_bytes),
            ..SourceFile::default()
        };
        self.extract_imports(&root_node, source_bytes, &mut file.imports);
        self.extract_declarations(&root_node, source_bytes, &mut file.decls);
        Ok(file)
    }

    fn parse_file(&self, file_path: &Path) -> Result<SourceFile> {
        let source = read_source(file_path)?;
        self.parse_source(&source)
    }

    fn language_name(&self) -> &str {
        "go"
    }
}
