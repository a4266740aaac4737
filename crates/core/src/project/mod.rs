//! The bundled [`SemanticModel`]: swc parsing plus a declared-type checker.
//!
//! A [`Project`] is built once per run. Loading parses every file, indexes
//! top-level declarations across the program, then lowers each file into a
//! statement tree whose value nodes already carry their types. After that
//! the project is immutable and every model query is a table lookup.

mod checker;
mod lower;
mod parse;
mod scope;
mod table;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use swc_core::common::SourceMap;
use swc_core::common::sync::Lrc;
use tracing::debug;

use crate::config::CompilerConfig;
use crate::error::{Error, Result};
use crate::model::{LiteralValue, ObjectFlags, SemanticModel, Syntax, TypeFlags};

use self::checker::Checker;
use self::lower::{Lowering, NodeData};
use self::parse::SourceUnit;
use self::table::{TypeKind, TypeTable, intrinsic};

pub use self::lower::NodeId;
pub use self::table::{SignatureId, SymbolId, TypeId};

/// A parsed and type-checked set of TypeScript files.
pub struct Project {
    units: Vec<SourceUnit>,
    files: HashMap<PathBuf, Vec<NodeId>>,
    nodes: Vec<NodeData>,
    table: TypeTable,
}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("files", &self.units.iter().map(|u| &u.path).collect::<Vec<_>>())
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl Project {
    /// Read and check `files`.
    pub fn load(files: &[PathBuf], config: &CompilerConfig) -> Result<Self> {
        let sources = files
            .iter()
            .map(|path| {
                std::fs::read_to_string(path)
                    .map(|text| (path.clone(), text))
                    .map_err(|source| Error::Io {
                        path: path.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_sources(sources, config)
    }

    /// Check in-memory sources; paths only identify the files.
    pub fn from_sources(sources: Vec<(PathBuf, String)>, config: &CompilerConfig) -> Result<Self> {
        let cm: Lrc<SourceMap> = Lrc::default();
        let units = sources
            .into_iter()
            .map(|(path, text)| parse::parse(&cm, &path, text))
            .collect::<Result<Vec<_>>>()?;

        let strict_null_checks = config.strict_null_checks();
        let (files, nodes, table) = {
            let mut checker = Checker::new(&units, strict_null_checks);
            let mut lowering = Lowering::new(&mut checker);
            let files: HashMap<PathBuf, Vec<NodeId>> = units
                .iter()
                .enumerate()
                .map(|(index, unit)| (unit.path.clone(), lowering.lower_module(index, &unit.module)))
                .collect();
            let nodes = lowering.into_nodes();
            (files, nodes, checker.into_table())
        };

        debug!(
            files = units.len(),
            nodes = nodes.len(),
            strict_null_checks,
            "Program checked."
        );

        Ok(Self {
            units,
            files,
            nodes,
            table,
        })
    }

    fn node(&self, node: NodeId) -> &NodeData {
        &self.nodes[node.0 as usize]
    }
}

impl SemanticModel for Project {
    type Node = NodeId;
    type Type = TypeId;
    type Symbol = SymbolId;
    type Signature = SignatureId;

    fn source_statements(&self, file: &Path) -> Option<Vec<NodeId>> {
        self.files.get(file).cloned()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).children.clone()
    }

    fn syntax(&self, node: NodeId) -> Syntax<NodeId> {
        self.node(node).syntax.clone()
    }

    fn node_text(&self, node: NodeId) -> String {
        let data = self.node(node);
        self.units[data.file].text.snippet(data.span).to_string()
    }

    fn type_at(&self, node: NodeId) -> TypeId {
        self.node(node).ty
    }

    fn type_flags(&self, ty: TypeId) -> TypeFlags {
        self.table.flags(ty)
    }

    fn object_flags(&self, ty: TypeId) -> ObjectFlags {
        self.table
            .object(ty)
            .map_or(ObjectFlags::empty(), |object| object.flags)
    }

    fn type_name(&self, ty: TypeId) -> Option<&str> {
        match self.table.kind(ty) {
            TypeKind::Object(object) => object.name.as_deref(),
            TypeKind::TypeParameter(name) | TypeKind::Enum(name) => Some(name),
            _ => None,
        }
    }

    fn constituents(&self, ty: TypeId) -> Vec<TypeId> {
        match self.table.kind(ty) {
            TypeKind::Union(members) | TypeKind::Intersection(members) => members.clone(),
            TypeKind::Boolean => vec![intrinsic::FALSE, intrinsic::TRUE],
            _ => Vec::new(),
        }
    }

    fn literal_value(&self, ty: TypeId) -> Option<LiteralValue> {
        match self.table.kind(ty) {
            TypeKind::StringLiteral(value) => Some(LiteralValue::String(value.clone())),
            TypeKind::NumberLiteral(value) => Some(LiteralValue::Number(*value)),
            _ => None,
        }
    }

    fn call_signatures(&self, ty: TypeId) -> Vec<SignatureId> {
        self.table
            .object(ty)
            .map(|object| object.call_signatures.clone())
            .unwrap_or_default()
    }

    fn base_types(&self, ty: TypeId) -> Vec<TypeId> {
        self.table
            .object(ty)
            .map(|object| object.bases.clone())
            .unwrap_or_default()
    }

    fn members(&self, ty: TypeId) -> Vec<SymbolId> {
        self.table
            .object(ty)
            .map(|object| object.members.clone())
            .unwrap_or_default()
    }

    fn symbol_name(&self, symbol: SymbolId) -> &str {
        &self.table.symbol(symbol).name
    }

    fn type_of_symbol(&self, symbol: SymbolId) -> Option<TypeId> {
        self.table.symbol(symbol).ty
    }

    fn signature_parameters(&self, signature: SignatureId) -> Vec<SymbolId> {
        self.table.signature(signature).parameters.clone()
    }

    fn signature_return_type(&self, signature: SignatureId) -> TypeId {
        self.table.signature(signature).return_type
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn project(source: &str) -> Project {
        project_with(source, &CompilerConfig::strict())
    }

    fn project_with(source: &str, config: &CompilerConfig) -> Project {
        Project::from_sources(vec![(PathBuf::from("main.ts"), source.to_string())], config).unwrap()
    }

    fn statements(project: &Project) -> Vec<NodeId> {
        project.source_statements(Path::new("main.ts")).unwrap()
    }

    /// Type of the first declarator of the `index`-th statement.
    fn declared_type(project: &Project, index: usize) -> TypeId {
        match project.syntax(statements(project)[index]) {
            Syntax::VariableStatement { declarations, .. } => {
                project.type_at(declarations[0].initializer.unwrap())
            }
            other => panic!("expected a variable statement, got {other:?}"),
        }
    }

    fn member_types(project: &Project, ty: TypeId) -> Vec<(String, TypeFlags)> {
        project
            .members(ty)
            .into_iter()
            .map(|s| {
                let flags = project.type_flags(project.type_of_symbol(s).unwrap());
                (project.symbol_name(s).to_string(), flags)
            })
            .collect()
    }

    #[test]
    fn test_function_signature_from_annotations() {
        let project = project("export function f(a: string, b?: number, ...rest: string[]): boolean { return true; }");
        let node = statements(&project)[0];
        let signature = project.call_signatures(project.type_at(node))[0];

        let names: Vec<&str> = project
            .signature_parameters(signature)
            .into_iter()
            .map(|p| project.symbol_name(p))
            .collect();
        assert_eq!(names, ["a", "b", "rest"]);

        let params = project.signature_parameters(signature);
        let b = project.type_of_symbol(params[1]).unwrap();
        assert!(project.type_flags(b).contains(TypeFlags::UNION));
        let rest = project.type_of_symbol(params[2]).unwrap();
        assert!(project.object_flags(rest).contains(ObjectFlags::REFERENCE));

        let ret = project.signature_return_type(signature);
        assert!(project.type_flags(ret).contains(TypeFlags::BOOLEAN));
    }

    #[test]
    fn test_return_type_inference() {
        let project = project(
            "function none() { }\n\
             function lit() { return 'a'; }\n\
             function mixed(x: boolean) { if (x) { return 1; } return 'b'; }\n\
             async function later() { return 1; }",
        );
        let ret = |index: usize| {
            let ty = project.type_at(statements(&project)[index]);
            project.signature_return_type(project.call_signatures(ty)[0])
        };

        assert_eq!(project.type_flags(ret(0)), TypeFlags::VOID);
        assert_eq!(project.type_flags(ret(1)), TypeFlags::STRING);
        let mixed = ret(2);
        let flags: Vec<TypeFlags> = project
            .constituents(mixed)
            .into_iter()
            .map(|t| project.type_flags(t))
            .collect();
        assert_eq!(flags, [TypeFlags::NUMBER, TypeFlags::STRING]);
        assert_eq!(project.type_name(ret(3)), Some("Promise"));
    }

    #[test]
    fn test_object_literal_widening() {
        let project = project("const o = { a: 1, b: 'x', c: null, f() { return 1; } };");
        let ty = declared_type(&project, 0);
        assert!(project.object_flags(ty).contains(ObjectFlags::ANONYMOUS));

        let members = member_types(&project, ty);
        assert_eq!(members[0], ("a".to_string(), TypeFlags::NUMBER));
        assert_eq!(members[1], ("b".to_string(), TypeFlags::STRING));
        assert_eq!(members[2], ("c".to_string(), TypeFlags::NULL));
        assert_eq!(members[3].0, "f");
        assert_eq!(members[3].1, TypeFlags::OBJECT);
    }

    #[test]
    fn test_null_widens_to_any_without_strict_null_checks() {
        let project = project_with("const o = { c: null };", &CompilerConfig::default());
        let ty = declared_type(&project, 0);
        assert_eq!(member_types(&project, ty)[0].1, TypeFlags::ANY);
    }

    #[test]
    fn test_interface_merging_and_bases() {
        let project = project(
            "interface A { a: string }\n\
             interface B extends A { b: number }\n\
             interface B { c?: boolean }\n\
             let v: B;\n\
             const w: B = null as any;",
        );
        let ty = declared_type(&project, 4);
        assert!(project.is_class_or_interface(ty));
        assert_eq!(project.type_name(ty), Some("B"));

        let names: Vec<String> = member_types(&project, ty).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["b", "c"]);

        let bases = project.base_types(ty);
        assert_eq!(bases.len(), 1);
        assert_eq!(project.type_name(bases[0]), Some("A"));
    }

    #[test]
    fn test_class_instance_members() {
        let project = project(
            "class Point { x = 0; constructor(public label: string) {} get size() { return 1; } static s = 1; }\n\
             const p = new Point('a');",
        );
        let ty = declared_type(&project, 1);
        assert!(project.object_flags(ty).contains(ObjectFlags::CLASS));
        let names: Vec<String> = member_types(&project, ty).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["x", "label", "size"]);
    }

    #[test]
    fn test_index_signature_has_no_declaration() {
        let project = project("interface Bag { [key: string]: number; n: number }\nconst b: Bag = null as any;");
        let ty = declared_type(&project, 1);
        let members = project.members(ty);
        assert_eq!(project.symbol_name(members[0]), "__index");
        assert!(project.type_of_symbol(members[0]).is_none());
    }

    #[test]
    fn test_union_without_strict_null_checks_drops_null() {
        let loose = project_with("const v: string | null = 'a';", &CompilerConfig::default());
        assert_eq!(loose.type_flags(declared_type(&loose, 0)), TypeFlags::STRING);

        let strict = project("const v: string | null = 'a';");
        assert!(strict.type_flags(declared_type(&strict, 0)).contains(TypeFlags::UNION));
    }

    #[test]
    fn test_property_assignment_syntax() {
        let project = project("global.foo = (a: number) => a;");
        match project.syntax(statements(&project)[0]) {
            Syntax::PropertyAssignment {
                object,
                property,
                value,
            } => {
                assert_eq!(object, "global");
                assert_eq!(property, "foo");
                assert_eq!(project.call_signatures(project.type_at(value)).len(), 1);
                assert_eq!(project.node_text(value), "(a: number) => a");
            }
            other => panic!("expected a property assignment, got {other:?}"),
        }
    }

    #[test]
    fn test_named_exports_resolve_locals() {
        let project = project("function f(x: string) {}\nexport { f as g };");
        match project.syntax(statements(&project)[1]) {
            Syntax::NamedExports { specifiers } => {
                assert_eq!(specifiers[0].name, "g");
                assert_eq!(project.call_signatures(project.type_at(specifiers[0].local)).len(), 1);
            }
            other => panic!("expected named exports, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_statements_are_children() {
        let project = project("function outer() { global.inner = function () {}; }");
        let outer = statements(&project)[0];
        let children = project.children(outer);
        assert_eq!(children.len(), 1);
        assert!(matches!(
            project.syntax(children[0]),
            Syntax::PropertyAssignment { ref property, .. } if property == "inner"
        ));
    }

    #[test]
    fn test_cross_file_lookup() {
        let project = Project::from_sources(
            vec![
                (PathBuf::from("a.ts"), "interface Shared { s: string }".to_string()),
                (PathBuf::from("b.ts"), "const v: Shared = null as any;".to_string()),
            ],
            &CompilerConfig::strict(),
        )
        .unwrap();
        let node = project.source_statements(Path::new("b.ts")).unwrap()[0];
        let Syntax::VariableStatement { declarations, .. } = project.syntax(node) else {
            panic!("expected a variable statement");
        };
        let ty = project.type_at(declarations[0].initializer.unwrap());
        assert_eq!(project.type_name(ty), Some("Shared"));
    }

    #[test]
    fn test_script_interfaces_merge_across_files() {
        let project = Project::from_sources(
            vec![
                (PathBuf::from("a.ts"), "interface S { a: string }\nconst x: S = null as any;".to_string()),
                (PathBuf::from("b.ts"), "interface S { b: number }".to_string()),
                (
                    PathBuf::from("c.ts"),
                    "interface S { c: boolean }\nconst y: S = null as any;\nexport {};".to_string(),
                ),
            ],
            &CompilerConfig::strict(),
        )
        .unwrap();
        let member_names = |file: &str| {
            let node = project.source_statements(Path::new(file)).unwrap()[1];
            let Syntax::VariableStatement { declarations, .. } = project.syntax(node) else {
                panic!("expected a variable statement");
            };
            let ty = project.type_at(declarations[0].initializer.unwrap());
            project
                .members(ty)
                .into_iter()
                .map(|s| project.symbol_name(s).to_string())
                .collect::<Vec<_>>()
        };

        assert_eq!(member_names("a.ts"), ["a", "b"]);
        // A module keeps its own declaration.
        assert_eq!(member_names("c.ts"), ["c"]);
    }

    #[test]
    fn test_overload_declarations_share_the_overload_set() {
        let project = project(
            "function f(a: string): void;\nfunction f(a: number): void;\nfunction f(a: any) {}",
        );
        for statement in statements(&project) {
            let signatures = project.call_signatures(project.type_at(statement));
            assert_eq!(signatures.len(), 2);
            let first = project.signature_parameters(signatures[0])[0];
            assert_eq!(
                project.type_flags(project.type_of_symbol(first).unwrap()),
                TypeFlags::STRING
            );
        }
    }

    #[test]
    fn test_implementation_is_the_only_signature_without_overloads() {
        let project = project("function g(a: number) {}\nfunction h() { function g(b: string) {} }");
        let signatures = project.call_signatures(project.type_at(statements(&project)[0]));
        assert_eq!(signatures.len(), 1);

        // The nested declaration is a separate name.
        let inner = project.children(statements(&project)[1])[0];
        let signatures = project.call_signatures(project.type_at(inner));
        assert_eq!(signatures.len(), 1);
        let param = project.signature_parameters(signatures[0])[0];
        assert_eq!(project.symbol_name(param), "b");
    }

    #[test]
    fn test_unknown_file_has_no_statements() {
        let project = project("const a = 1;");
        assert!(project.source_statements(Path::new("other.ts")).is_none());
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = Project::load(&[PathBuf::from("/nonexistent/x.ts")], &CompilerConfig::strict()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
