//! Top-level declarations of every file, by name.
//!
//! Files without imports or exports are scripts that share one global
//! scope, which is what Apps Script projects rely on. Lookups therefore try
//! the requesting file first and then every file in program order, and an
//! interface declared in several scripts is one merged interface.

use std::collections::HashMap;

use swc_core::ecma::ast::{
    Class, Decl, DefaultDecl, Function, ImportSpecifier, ModuleDecl, ModuleExportName, ModuleItem,
    Pat, Stmt, TsEnumDecl, TsInterfaceDecl, TsTypeAliasDecl, VarDeclarator,
};

use super::parse::SourceUnit;

/// Index of a file in program order.
pub(crate) type FileIndex = usize;

/// A declaration in the type namespace.
#[derive(Clone)]
pub(crate) enum TypeDecl<'a> {
    /// All declarations of a merged interface with their files, in program
    /// order.
    Interface(Vec<(FileIndex, &'a TsInterfaceDecl)>),
    Class(&'a Class),
    Alias(&'a TsTypeAliasDecl),
    Enum,
}

/// A declaration in the value namespace.
#[derive(Clone)]
pub(crate) enum ValueDecl<'a> {
    /// Every declaration of the name: overload signatures and implementation.
    Function(Vec<&'a Function>),
    Variable(&'a VarDeclarator),
    Class,
    Enum(&'a TsEnumDecl),
}

struct FileScope<'a> {
    index: FileIndex,
    /// No imports or exports: declarations are global.
    script: bool,
    types: HashMap<String, TypeDecl<'a>>,
    values: HashMap<String, ValueDecl<'a>>,
    /// `import { imported as local }`: local -> imported
    imports: HashMap<String, String>,
}

/// A declaration found by name, with the file it lives in.
pub(crate) struct Found<D> {
    pub(crate) file: FileIndex,
    pub(crate) name: String,
    pub(crate) decl: D,
}

pub(crate) struct ProgramScope<'a> {
    files: Vec<FileScope<'a>>,
    /// Interfaces declared in scripts, merged across files.
    global_interfaces: HashMap<String, Vec<(FileIndex, &'a TsInterfaceDecl)>>,
}

impl<'a> ProgramScope<'a> {
    pub(crate) fn new(units: &'a [SourceUnit]) -> Self {
        let files: Vec<FileScope<'a>> = units
            .iter()
            .enumerate()
            .map(|(index, unit)| {
                let mut scope = FileScope::new(index, is_script(&unit.module.body));
                for item in &unit.module.body {
                    scope.add_item(item);
                }
                scope
            })
            .collect();

        let mut global_interfaces: HashMap<String, Vec<(FileIndex, &'a TsInterfaceDecl)>> =
            HashMap::new();
        for scope in files.iter().filter(|scope| scope.script) {
            for (name, decl) in &scope.types {
                if let TypeDecl::Interface(decls) = decl {
                    global_interfaces
                        .entry(name.clone())
                        .or_default()
                        .extend(decls.iter().copied());
                }
            }
        }

        Self {
            files,
            global_interfaces,
        }
    }

    pub(crate) fn lookup_type(&self, file: FileIndex, name: &str) -> Option<Found<TypeDecl<'a>>> {
        let found = self.lookup(file, name, |scope, name| scope.types.get(name).cloned())?;
        if !matches!(found.decl, TypeDecl::Interface(_)) || !self.files[found.file].script {
            return Some(found);
        }
        // One merged type for every script, keyed by the first declaring file.
        match self.global_interfaces.get(&found.name) {
            Some(decls) if !decls.is_empty() => Some(Found {
                file: decls[0].0,
                name: found.name,
                decl: TypeDecl::Interface(decls.clone()),
            }),
            _ => Some(found),
        }
    }

    pub(crate) fn lookup_value(&self, file: FileIndex, name: &str) -> Option<Found<ValueDecl<'a>>> {
        self.lookup(file, name, |scope, name| scope.values.get(name).cloned())
    }

    fn lookup<D>(
        &self,
        file: FileIndex,
        name: &str,
        get: impl Fn(&FileScope<'a>, &str) -> Option<D>,
    ) -> Option<Found<D>> {
        let found = |index: FileIndex, name: &str| {
            get(&self.files[index], name).map(|decl| Found {
                file: index,
                name: name.to_string(),
                decl,
            })
        };

        let scope = self.files.get(file)?;
        if let Some(hit) = found(file, name) {
            return Some(hit);
        }
        let name = scope.imports.get(name).map_or(name, String::as_str);
        (0..self.files.len())
            .filter(|index| *index != file)
            .find_map(|index| found(index, name))
    }
}

/// A file is a module as soon as it imports or exports anything.
fn is_script(items: &[ModuleItem]) -> bool {
    items.iter().all(|item| matches!(item, ModuleItem::Stmt(_)))
}

impl<'a> FileScope<'a> {
    fn new(index: FileIndex, script: bool) -> Self {
        Self {
            index,
            script,
            types: HashMap::new(),
            values: HashMap::new(),
            imports: HashMap::new(),
        }
    }

    fn add_item(&mut self, item: &'a ModuleItem) {
        match item {
            ModuleItem::Stmt(Stmt::Decl(decl)) => self.add_decl(decl),
            ModuleItem::Stmt(_) => {}
            ModuleItem::ModuleDecl(module_decl) => match module_decl {
                ModuleDecl::ExportDecl(export) => self.add_decl(&export.decl),
                ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
                    DefaultDecl::Fn(f) => {
                        if let Some(ident) = &f.ident {
                            self.add_function(&ident.sym, &f.function);
                        }
                    }
                    DefaultDecl::Class(c) => {
                        if let Some(ident) = &c.ident {
                            self.add_class(&ident.sym, &c.class);
                        }
                    }
                    DefaultDecl::TsInterfaceDecl(decl) => self.add_interface(decl),
                },
                ModuleDecl::Import(import) => {
                    for specifier in &import.specifiers {
                        if let ImportSpecifier::Named(named) = specifier {
                            let imported = match &named.imported {
                                Some(ModuleExportName::Ident(ident)) => ident.sym.to_string(),
                                Some(ModuleExportName::Str(_)) | None => named.local.sym.to_string(),
                            };
                            self.imports.insert(named.local.sym.to_string(), imported);
                        }
                    }
                }
                _ => {}
            },
        }
    }

    fn add_decl(&mut self, decl: &'a Decl) {
        match decl {
            Decl::Fn(f) => self.add_function(&f.ident.sym, &f.function),
            Decl::Class(c) => self.add_class(&c.ident.sym, &c.class),
            Decl::Var(var) => {
                for declarator in &var.decls {
                    if let Pat::Ident(binding) = &declarator.name {
                        self.values
                            .insert(binding.id.sym.to_string(), ValueDecl::Variable(declarator));
                    }
                }
            }
            Decl::TsInterface(decl) => self.add_interface(decl),
            Decl::TsTypeAlias(decl) => {
                self.types
                    .insert(decl.id.sym.to_string(), TypeDecl::Alias(decl));
            }
            Decl::TsEnum(decl) => {
                let name = decl.id.sym.to_string();
                self.types.insert(name.clone(), TypeDecl::Enum);
                self.values.insert(name, ValueDecl::Enum(decl));
            }
            _ => {}
        }
    }

    fn add_class(&mut self, name: &str, class: &'a Class) {
        self.types.insert(name.to_string(), TypeDecl::Class(class));
        self.values.insert(name.to_string(), ValueDecl::Class);
    }

    fn add_function(&mut self, name: &str, function: &'a Function) {
        match self.values.get_mut(name) {
            Some(ValueDecl::Function(functions)) => functions.push(function),
            _ => {
                self.values
                    .insert(name.to_string(), ValueDecl::Function(vec![function]));
            }
        }
    }

    fn add_interface(&mut self, decl: &'a TsInterfaceDecl) {
        let name = decl.id.sym.to_string();
        match self.types.get_mut(&name) {
            Some(TypeDecl::Interface(decls)) => decls.push((self.index, decl)),
            Some(_) => {}
            None => {
                self.types
                    .insert(name, TypeDecl::Interface(vec![(self.index, decl)]));
            }
        }
    }
}
