//! Hand-built [`SemanticModel`] for unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::model::{LiteralValue, ObjectFlags, SemanticModel, Syntax, TypeFlags};

#[derive(Debug, Clone)]
enum Kind {
    Flags(TypeFlags),
    Literal(TypeFlags, LiteralValue),
    Composite(TypeFlags, Vec<usize>),
    Object {
        flags: ObjectFlags,
        name: Option<String>,
        members: Vec<usize>,
        bases: Vec<usize>,
        signatures: Vec<usize>,
    },
}

#[derive(Debug)]
struct Node {
    syntax: Syntax<usize>,
    children: Vec<usize>,
    ty: usize,
    text: String,
}

#[derive(Debug, Default)]
pub(crate) struct FakeModel {
    types: Vec<Kind>,
    symbols: Vec<(String, Option<usize>)>,
    signatures: Vec<(Vec<usize>, usize)>,
    nodes: Vec<Node>,
    files: HashMap<PathBuf, Vec<usize>>,
}

impl FakeModel {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: Kind) -> usize {
        self.types.push(kind);
        self.types.len() - 1
    }

    pub(crate) fn flags(&mut self, flags: TypeFlags) -> usize {
        self.push(Kind::Flags(flags))
    }

    pub(crate) fn string_literal(&mut self, value: &str) -> usize {
        self.push(Kind::Literal(
            TypeFlags::STRING_LITERAL,
            LiteralValue::String(value.to_string()),
        ))
    }

    pub(crate) fn number_literal(&mut self, value: f64) -> usize {
        self.push(Kind::Literal(TypeFlags::NUMBER_LITERAL, LiteralValue::Number(value)))
    }

    pub(crate) fn union(&mut self, members: &[usize]) -> usize {
        self.push(Kind::Composite(TypeFlags::UNION, members.to_vec()))
    }

    pub(crate) fn intersection(&mut self, members: &[usize]) -> usize {
        self.push(Kind::Composite(TypeFlags::INTERSECTION, members.to_vec()))
    }

    /// Object type with `members`; a `None` member type has no declaration.
    pub(crate) fn object(
        &mut self,
        flags: ObjectFlags,
        name: Option<&str>,
        members: &[(&str, Option<usize>)],
    ) -> usize {
        let members = members
            .iter()
            .map(|(n, t)| self.symbol(n, *t))
            .collect();
        self.push(Kind::Object {
            flags,
            name: name.map(str::to_string),
            members,
            bases: vec![],
            signatures: vec![],
        })
    }

    pub(crate) fn interface(&mut self, name: &str, members: &[(&str, Option<usize>)]) -> usize {
        self.object(ObjectFlags::INTERFACE, Some(name), members)
    }

    /// Replace the members of an existing object type, for cycles.
    pub(crate) fn set_members(&mut self, ty: usize, new_members: &[(&str, Option<usize>)]) {
        let symbols: Vec<usize> = new_members.iter().map(|(n, t)| self.symbol(n, *t)).collect();
        if let Kind::Object { members, .. } = &mut self.types[ty] {
            *members = symbols;
        }
    }

    pub(crate) fn add_base(&mut self, ty: usize, base: usize) {
        if let Kind::Object { bases, .. } = &mut self.types[ty] {
            bases.push(base);
        }
    }

    /// Anonymous object with one call signature per entry of `signatures`.
    pub(crate) fn function(&mut self, signatures: &[(&[(&str, Option<usize>)], usize)]) -> usize {
        let mut ids = Vec::new();
        for (params, ret) in signatures {
            let params = params.iter().map(|(n, t)| self.symbol(n, *t)).collect();
            self.signatures.push((params, *ret));
            ids.push(self.signatures.len() - 1);
        }
        self.push(Kind::Object {
            flags: ObjectFlags::ANONYMOUS,
            name: None,
            members: vec![],
            bases: vec![],
            signatures: ids,
        })
    }

    fn symbol(&mut self, name: &str, ty: Option<usize>) -> usize {
        self.symbols.push((name.to_string(), ty));
        self.symbols.len() - 1
    }

    pub(crate) fn node(&mut self, syntax: Syntax<usize>, ty: usize, children: &[usize], text: &str) -> usize {
        self.nodes.push(Node {
            syntax,
            children: children.to_vec(),
            ty,
            text: text.to_string(),
        });
        self.nodes.len() - 1
    }

    /// Plain value node of type `ty`.
    pub(crate) fn value(&mut self, ty: usize) -> usize {
        self.node(Syntax::Other, ty, &[], "")
    }

    pub(crate) fn file(&mut self, path: &str, statements: &[usize]) {
        self.files.insert(PathBuf::from(path), statements.to_vec());
    }
}

impl SemanticModel for FakeModel {
    type Node = usize;
    type Type = usize;
    type Symbol = usize;
    type Signature = usize;

    fn source_statements(&self, file: &Path) -> Option<Vec<usize>> {
        self.files.get(file).cloned()
    }

    fn children(&self, node: usize) -> Vec<usize> {
        self.nodes[node].children.clone()
    }

    fn syntax(&self, node: usize) -> Syntax<usize> {
        self.nodes[node].syntax.clone()
    }

    fn node_text(&self, node: usize) -> String {
        self.nodes[node].text.clone()
    }

    fn type_at(&self, node: usize) -> usize {
        self.nodes[node].ty
    }

    fn type_flags(&self, ty: usize) -> TypeFlags {
        match &self.types[ty] {
            Kind::Flags(flags) | Kind::Literal(flags, _) | Kind::Composite(flags, _) => *flags,
            Kind::Object { .. } => TypeFlags::OBJECT,
        }
    }

    fn object_flags(&self, ty: usize) -> ObjectFlags {
        match &self.types[ty] {
            Kind::Object { flags, .. } => *flags,
            _ => ObjectFlags::empty(),
        }
    }

    fn type_name(&self, ty: usize) -> Option<&str> {
        match &self.types[ty] {
            Kind::Object { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    fn constituents(&self, ty: usize) -> Vec<usize> {
        match &self.types[ty] {
            Kind::Composite(_, members) => members.clone(),
            _ => vec![],
        }
    }

    fn literal_value(&self, ty: usize) -> Option<LiteralValue> {
        match &self.types[ty] {
            Kind::Literal(_, value) => Some(value.clone()),
            _ => None,
        }
    }

    fn call_signatures(&self, ty: usize) -> Vec<usize> {
        match &self.types[ty] {
            Kind::Object { signatures, .. } => signatures.clone(),
            _ => vec![],
        }
    }

    fn base_types(&self, ty: usize) -> Vec<usize> {
        match &self.types[ty] {
            Kind::Object { bases, .. } => bases.clone(),
            _ => vec![],
        }
    }

    fn members(&self, ty: usize) -> Vec<usize> {
        match &self.types[ty] {
            Kind::Object { members, .. } => members.clone(),
            _ => vec![],
        }
    }

    fn symbol_name(&self, symbol: usize) -> &str {
        &self.symbols[symbol].0
    }

    fn type_of_symbol(&self, symbol: usize) -> Option<usize> {
        self.symbols[symbol].1
    }

    fn signature_parameters(&self, signature: usize) -> Vec<usize> {
        self.signatures[signature].0.clone()
    }

    fn signature_return_type(&self, signature: usize) -> usize {
        self.signatures[signature].1
    }
}
