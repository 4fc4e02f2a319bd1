//! Declaration-level syntax tree for a single Go source file.
//!
//! This is the boundary between a source front-end (see [`crate::parsers`]) and
//! the extraction engine in [`crate::core`]. It keeps only what the extractor
//! needs: the package clause, imports, and top-level declarations with their
//! type expressions. Function bodies are reduced to the qualified type
//! references they contain.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    /// Name from the `package` clause, `None` when the clause is missing.
    pub package: Option<String>,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

impl SourceFile {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: Some(package.into()),
            ..Self::default()
        }
    }

    pub fn with_import(mut self, import: ImportSpec) -> Self {
        self.imports.push(import);
        self
    }

    pub fn with_decl(mut self, decl: impl Into<Decl>) -> Self {
        self.decls.push(decl.into());
        self
    }
}

/// How an import binds its package inside the importing file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportName {
    /// `import "fmt"`: bound under the package's default name.
    Default,
    /// `import f "fmt"`
    Alias(String),
    /// `import . "fmt"`
    Dot,
    /// `import _ "fmt"`
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub name: ImportName,
    /// Unquoted import path.
    pub path: String,
}

impl ImportSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            name: ImportName::Default,
            path: path.into(),
        }
    }

    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        let alias = alias.into();
        let name = match alias.as_str() {
            "." => ImportName::Dot,
            "_" => ImportName::Blank,
            _ => ImportName::Alias(alias),
        };
        Self {
            name,
            path: path.into(),
        }
    }

    /// The identifier this import is referenced by in qualified types.
    pub fn qualifier(&self) -> Option<String> {
        match &self.name {
            ImportName::Default => Some(default_import_name(&self.path)),
            ImportName::Alias(alias) => Some(alias.clone()),
            ImportName::Dot | ImportName::Blank => None,
        }
    }
}

/// Best guess at the package name an import path binds when no alias is given.
///
/// Uses the last path element, skipping a major-version element (`v2`) or
/// suffix (`yaml.v3`) and dropping a `go-` prefix.
pub fn default_import_name(path: &str) -> String {
    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    let mut last = segments.next().unwrap_or(path);

    if is_major_version(last) {
        if let Some(previous) = segments.next() {
            last = previous;
        }
    }

    if let Some((base, suffix)) = last.rsplit_once('.') {
        if is_major_version(suffix) {
            last = base;
        }
    }

    let last = last.strip_prefix("go-").unwrap_or(last);
    last.replace(['-', '.'], "_")
}

fn is_major_version(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].chars().all(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Func(FuncDecl),
    Type(TypeSpec),
    Var(VarSpec),
    /// A top-level declaration the front-end could not make sense of.
    Unparsed { line: usize },
}

impl From<FuncDecl> for Decl {
    fn from(decl: FuncDecl) -> Self {
        Decl::Func(decl)
    }
}

impl From<TypeSpec> for Decl {
    fn from(spec: TypeSpec) -> Self {
        Decl::Type(spec)
    }
}

impl From<VarSpec> for Decl {
    fn from(spec: VarSpec) -> Self {
        Decl::Var(spec)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: Some(name.into()),
            ty,
        }
    }

    pub fn unnamed(ty: TypeExpr) -> Self {
        Self { name: None, ty }
    }
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    pub doc: Option<String>,
    pub receiver: Option<Param>,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    /// Qualified types referenced inside the body (composite literals, local
    /// variables, conversions to named types, type assertions).
    pub body_types: Vec<TypeExpr>,
    pub line: usize,
}

impl FuncDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            receiver: None,
            params: Vec::new(),
            results: Vec::new(),
            body_types: Vec::new(),
            line: 0,
        }
    }

    pub fn with_receiver(mut self, receiver: Param) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_result(mut self, result: Param) -> Self {
        self.results.push(result);
        self
    }

    pub fn with_body_type(mut self, ty: TypeExpr) -> Self {
        self.body_types.push(ty);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub doc: Option<String>,
    /// `type A = B` rather than `type A B`.
    pub alias: bool,
    pub ty: TypeExpr,
    pub line: usize,
}

impl TypeSpec {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            doc: None,
            alias: false,
            ty,
            line: 0,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// A `var` or `const` spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSpec {
    pub names: Vec<String>,
    pub ty: Option<TypeExpr>,
    /// Qualified types referenced by the initializer expressions.
    pub value_types: Vec<TypeExpr>,
    pub line: usize,
}

impl VarSpec {
    pub fn new(name: impl Into<String>, ty: Option<TypeExpr>) -> Self {
        Self {
            names: vec![name.into()],
            ty,
            value_types: Vec::new(),
            line: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Empty for an embedded field.
    pub names: Vec<String>,
    pub ty: TypeExpr,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            names: vec![name.into()],
            ty,
        }
    }

    pub fn embedded(ty: TypeExpr) -> Self {
        Self {
            names: Vec::new(),
            ty,
        }
    }
}

/// A method (`name` set, `ty` a func type) or an embedded type of an
/// interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceElem {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named(String),
    Qualified { package: String, name: String },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array { len: String, elem: Box<TypeExpr> },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    Func { params: Vec<Param>, results: Vec<Param> },
    Struct(Vec<FieldDecl>),
    Interface(Vec<InterfaceElem>),
    Generic { base: Box<TypeExpr>, args: Vec<TypeExpr> },
    Variadic(Box<TypeExpr>),
    /// Anything else, kept as its source text.
    Other(String),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Qualified {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Slice(Box::new(elem))
    }

    /// Name of the declared type behind pointer and instantiation wrappers,
    /// as used for method receivers.
    pub fn base_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named(name) => Some(name),
            TypeExpr::Qualified { name, .. } => Some(name),
            TypeExpr::Pointer(inner) => inner.base_name(),
            TypeExpr::Generic { base, .. } => base.base_name(),
            _ => None,
        }
    }

    /// Visit every qualified type nested in this expression, including inside
    /// anonymous struct and func types.
    pub fn visit_qualified<'a>(&'a self, visit: &mut impl FnMut(&'a str, &'a str)) {
        match self {
            TypeExpr::Qualified { package, name } => visit(package, name),
            TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) | TypeExpr::Variadic(inner) => {
                inner.visit_qualified(visit)
            }
            TypeExpr::Array { elem, .. } | TypeExpr::Chan { elem, .. } => {
                elem.visit_qualified(visit)
            }
            TypeExpr::Map { key, value } => {
                key.visit_qualified(visit);
                value.visit_qualified(visit);
            }
            TypeExpr::Func { params, results } => {
                for param in params.iter().chain(results) {
                    param.ty.visit_qualified(visit);
                }
            }
            TypeExpr::Struct(fields) => {
                for field in fields {
                    field.ty.visit_qualified(visit);
                }
            }
            TypeExpr::Interface(elems) => {
                for elem in elems {
                    elem.ty.visit_qualified(visit);
                }
            }
            TypeExpr::Generic { base, args } => {
                base.visit_qualified(visit);
                for arg in args {
                    arg.visit_qualified(visit);
                }
            }
            TypeExpr::Named(_) | TypeExpr::Other(_) => {}
        }
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, params: &[Param]) -> fmt::Result {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", param.ty)?;
    }
    Ok(())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::Qualified { package, name } => write!(f, "{package}.{name}"),
            TypeExpr::Pointer(inner) => write!(f, "*{inner}"),
            TypeExpr::Slice(elem) => write!(f, "[]{elem}"),
            TypeExpr::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeExpr::Map { key, value } => write!(f, "map[{key}]{value}"),
            TypeExpr::Chan { dir, elem } => match dir {
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
            },
            TypeExpr::Func { params, results } => {
                f.write_str("func(")?;
                write_params(f, params)?;
                f.write_str(")")?;
                match results.len() {
                    0 => Ok(()),
                    1 => write!(f, " {}", results[0].ty),
                    _ => {
                        f.write_str(" (")?;
                        write_params(f, results)?;
                        f.write_str(")")
                    }
                }
            }
            TypeExpr::Struct(fields) => {
                if fields.is_empty() {
                    return f.write_str("struct{}");
                }
                f.write_str("struct{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    if field.names.is_empty() {
                        write!(f, "{}", field.ty)?;
                    } else {
                        write!(f, "{} {}", field.names.join(", "), field.ty)?;
                    }
                }
                f.write_str(" }")
            }
            TypeExpr::Interface(elems) => {
                if elems.is_empty() {
                    return f.write_str("interface{}");
                }
                f.write_str("interface{ ")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    match &elem.name {
                        // method types render as `func(...)`; drop the keyword
                        Some(name) => {
                            let signature = elem.ty.to_string();
                            let signature = signature.strip_prefix("func").unwrap_or(&signature);
                            write!(f, "{name}{signature}")?;
                        }
                        None => write!(f, "{}", elem.ty)?,
                    }
                }
                f.write_str(" }")
            }
            TypeExpr::Generic { base, args } => {
                write!(f, "{base}[")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str("]")
            }
            TypeExpr::Variadic(elem) => write!(f, "...{elem}"),
            TypeExpr::Other(text) => f.write_str(text),
        }
    }
}
