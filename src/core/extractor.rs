use std::collections::{HashMap, HashSet};

use super::model::{FileInfo, ImportedTypeRef, StructField, StructInfo, StructMethod};
use crate::ast::{Decl, FieldDecl, FuncDecl, SourceFile, TypeExpr, TypeSpec};
use crate::config::ConflictPolicy;
use crate::error::ExtractError;

/// Turns one parsed source file into its [`FileInfo`].
///
/// Extraction is a pure function of the file, so one extractor can be shared
/// across worker threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileExtractor {
    policy: ConflictPolicy,
}

impl FileExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ConflictPolicy) -> Self {
        Self { policy }
    }

    pub fn extract(&self, source: &SourceFile) -> Result<FileInfo, ExtractError> {
        let package_name = source
            .package
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ExtractError::malformed("missing package clause"))?;

        let mut info = FileInfo::new(package_name);
        let mut structs = LocalStructs::new(self.policy);
        let mut refs = RefCollector::new(source);

        for import in &source.imports {
            if !info.imports.contains(&import.path) {
                info.imports.push(import.path.clone());
            }
        }

        for decl in &source.decls {
            match decl {
                Decl::Func(func) => {
                    refs.visit_func(func);
                    match &func.receiver {
                        None => {
                            if !info.functions.contains(&func.name) {
                                info.functions.push(func.name.clone());
                            }
                        }
                        Some(receiver) => {
                            let base = receiver.ty.base_name().ok_or_else(|| {
                                ExtractError::malformed(format!(
                                    "method {} has no receiver base type (`{}`)",
                                    func.name, receiver.ty
                                ))
                            })?;
                            structs.attach_method(base, method_from(func));
                        }
                    }
                }
                Decl::Type(spec) => {
                    refs.visit(&spec.ty);
                    if let Some(declared) = struct_from(spec) {
                        structs.declare(declared);
                    }
                }
                Decl::Var(spec) => {
                    if let Some(ty) = &spec.ty {
                        refs.visit(ty);
                    }
                    for ty in &spec.value_types {
                        refs.visit(ty);
                    }
                }
                Decl::Unparsed { line } => {
                    return Err(ExtractError::malformed(format!(
                        "unparsable declaration at line {line}"
                    )));
                }
            }
        }

        info.structs = structs.into_vec();
        info.imported_type_refs = refs.finish();
        Ok(info)
    }
}

fn struct_from(spec: &TypeSpec) -> Option<StructInfo> {
    if spec.alias {
        return None;
    }
    let TypeExpr::Struct(fields) = &spec.ty else {
        return None;
    };

    let mut info = StructInfo::new(&spec.name);
    info.comment = spec.doc.clone().unwrap_or_default();
    for decl in fields {
        for field in fields_of(decl) {
            match info.fields.iter_mut().find(|f| f.name == field.name) {
                Some(existing) => *existing = field,
                None => info.fields.push(field),
            }
        }
    }
    Some(info)
}

fn fields_of(decl: &FieldDecl) -> Vec<StructField> {
    let type_name = decl.ty.to_string();
    if decl.names.is_empty() {
        let name = decl.ty.base_name().unwrap_or(&type_name).to_string();
        return vec![StructField::new(name, type_name)];
    }
    decl.names
        .iter()
        .map(|name| StructField::new(name, type_name.clone()))
        .collect()
}

fn method_from(func: &FuncDecl) -> StructMethod {
    StructMethod {
        name: func.name.clone(),
        comment: func.doc.clone().unwrap_or_default(),
        parameters: func.params.iter().map(|p| p.ty.to_string()).collect(),
        return_types: func.results.iter().map(|p| p.ty.to_string()).collect(),
    }
}

/// Types declared in one file, in first-sighting order.
struct LocalStructs {
    policy: ConflictPolicy,
    order: Vec<StructInfo>,
    index: HashMap<String, usize>,
}

impl LocalStructs {
    fn new(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn slot(&mut self, name: &str) -> &mut StructInfo {
        let next = self.order.len();
        let idx = *self.index.entry(name.to_string()).or_insert(next);
        if idx == next {
            // placeholder until the declaration (if any) is seen
            self.order.push(StructInfo::new(name));
        }
        &mut self.order[idx]
    }

    fn declare(&mut self, declared: StructInfo) {
        let policy = self.policy;
        let name = declared.name.clone();
        // A file that declares the same member twice does not compile, so the
        // conflicts reported here carry no information worth keeping.
        let _ = self.slot(&name).merge(declared, policy);
    }

    fn attach_method(&mut self, receiver: &str, method: StructMethod) {
        let policy = self.policy;
        let _ = self
            .slot(receiver)
            .merge(StructInfo::new(receiver).with_method(method), policy);
    }

    fn into_vec(self) -> Vec<StructInfo> {
        self.order
    }
}

/// Collects `pkg.Type` references and maps their qualifier to an import path.
struct RefCollector {
    qualifiers: HashMap<String, String>,
    seen: HashSet<ImportedTypeRef>,
    refs: Vec<ImportedTypeRef>,
}

impl RefCollector {
    fn new(source: &SourceFile) -> Self {
        let mut qualifiers = HashMap::new();
        for import in &source.imports {
            if let Some(qualifier) = import.qualifier() {
                qualifiers
                    .entry(qualifier)
                    .or_insert_with(|| import.path.clone());
            }
        }
        Self {
            qualifiers,
            seen: HashSet::new(),
            refs: Vec::new(),
        }
    }

    fn visit_func(&mut self, func: &FuncDecl) {
        let signature = func.receiver.iter().chain(&func.params).chain(&func.results);
        for param in signature {
            self.visit(&param.ty);
        }
        for ty in &func.body_types {
            self.visit(ty);
        }
    }

    fn visit(&mut self, ty: &TypeExpr) {
        let qualifiers = &self.qualifiers;
        let seen = &mut self.seen;
        let refs = &mut self.refs;
        ty.visit_qualified(&mut |package, name| {
            // an unknown qualifier cannot name an imported package
            let Some(path) = qualifiers.get(package) else {
                return;
            };
            let reference = ImportedTypeRef::new(path, name);
            if seen.insert(reference.clone()) {
                refs.push(reference);
            }
        });
    }

    fn finish(self) -> Vec<ImportedTypeRef> {
        self.refs
    }
}
