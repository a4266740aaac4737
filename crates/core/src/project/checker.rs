//! Declared-type checker over swc syntax trees.
//!
//! Types come from annotations wherever they exist. Unannotated variables,
//! properties and return types are inferred from their expressions the way
//! `tsc` does for simple code: literals widen, object literals become
//! anonymous object types, returns of a function body are unioned.
//! Generic instantiations, arrays and library containers are reported as
//! reference types, which the translator renders as `any`.

use std::collections::{HashMap, HashSet};

use swc_core::common::Span;
use swc_core::ecma::ast::{
    ArrowExpr, AssignPat, BinaryOp, BlockStmt, BlockStmtOrExpr, Callee, Class, ClassMember, Decl, Expr,
    Function, Lit, MethodKind, Pat, Prop, PropName, PropOrSpread, Stmt, TsEntityName,
    TsExprWithTypeArgs, TsFnOrConstructorType, TsFnParam, TsKeywordTypeKind, TsLit,
    TsParamPropParam, TsType, TsTypeElement, TsTypeOperatorOp, TsTypeParamDecl, TsTypeQueryExpr,
    TsUnionOrIntersectionType, UnaryOp, ParamOrTsParamProp, TsTypeAnn,
};
use tracing::debug;

use super::parse::SourceUnit;
use super::scope::{FileIndex, Found, ProgramScope, TypeDecl, ValueDecl};
use super::table::{ObjectType, SignatureId, SymbolId, TypeId, TypeKind, TypeTable, intrinsic};
use crate::model::{ObjectFlags, TypeFlags};

/// Library names that resolve to opaque reference types.
const LIBRARY_TYPES: &[&str] = &[
    "Array",
    "ReadonlyArray",
    "Promise",
    "Map",
    "Set",
    "WeakMap",
    "WeakSet",
    "Record",
    "Partial",
    "Required",
    "Readonly",
    "Pick",
    "Omit",
    "Date",
    "RegExp",
    "Error",
    "Function",
    "Object",
    "Uint8Array",
];

/// Name given to index signature symbols.
const INDEX_SYMBOL: &str = "__index";

/// Lexically scoped local bindings inside function bodies.
#[derive(Debug, Default)]
pub(crate) struct Locals {
    frames: Vec<HashMap<String, TypeId>>,
}

impl Locals {
    pub(crate) fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    pub(crate) fn insert(&mut self, name: &str, ty: TypeId) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), ty);
        }
    }

    fn get(&self, name: &str) -> Option<TypeId> {
        self.frames.iter().rev().find_map(|f| f.get(name).copied())
    }
}

pub(crate) struct Checker<'a> {
    units: &'a [SourceUnit],
    scope: ProgramScope<'a>,
    pub(crate) table: TypeTable,
    strict_null_checks: bool,
    named_types: HashMap<(FileIndex, String), TypeId>,
    value_types: HashMap<(FileIndex, String), TypeId>,
    resolving_values: HashSet<(FileIndex, String)>,
    type_params: Vec<String>,
}

impl<'a> Checker<'a> {
    pub(crate) fn new(units: &'a [SourceUnit], strict_null_checks: bool) -> Self {
        Self {
            units,
            scope: ProgramScope::new(units),
            table: TypeTable::new(),
            strict_null_checks,
            named_types: HashMap::new(),
            value_types: HashMap::new(),
            resolving_values: HashSet::new(),
            type_params: Vec::new(),
        }
    }

    pub(crate) fn into_table(self) -> TypeTable {
        self.table
    }

    fn snippet(&self, file: FileIndex, span: Span) -> &'a str {
        self.units[file].text.snippet(span)
    }

    fn widen(&mut self, ty: TypeId) -> TypeId {
        self.table.widen(ty, self.strict_null_checks)
    }

    /// `ty | undefined` under strict null checks, `ty` otherwise.
    fn optional(&mut self, ty: TypeId, optional: bool) -> TypeId {
        if optional && self.strict_null_checks {
            self.table.union([ty, intrinsic::UNDEFINED])
        } else {
            ty
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// Type of the top-level value `name` as seen from `file`.
    pub(crate) fn value_named(&mut self, file: FileIndex, name: &str) -> TypeId {
        match self.scope.lookup_value(file, name) {
            Some(found) => self.value_type(found),
            None => {
                debug!(name, "Unresolved value.");
                intrinsic::ERROR
            }
        }
    }

    fn value_type(&mut self, found: Found<ValueDecl<'a>>) -> TypeId {
        let key = (found.file, found.name);
        if let Some(ty) = self.value_types.get(&key) {
            return *ty;
        }
        if !self.resolving_values.insert(key.clone()) {
            return intrinsic::ANY;
        }

        let file = key.0;
        let mut locals = Locals::default();
        let ty = match found.decl {
            ValueDecl::Function(functions) => self.overloaded_type(file, &functions),
            ValueDecl::Variable(declarator) => {
                self.variable_type(file, &declarator.name, declarator.init.as_deref(), &mut locals)
            }
            ValueDecl::Class => self.table.alloc(TypeKind::Object(ObjectType {
                flags: ObjectFlags::ANONYMOUS,
                ..ObjectType::default()
            })),
            ValueDecl::Enum(decl) => self.table.alloc(TypeKind::Enum(decl.id.sym.to_string())),
        };

        self.resolving_values.remove(&key);
        self.value_types.insert(key, ty);
        ty
    }

    /// Declared type of a variable: its annotation, else its widened initializer.
    pub(crate) fn variable_type(
        &mut self,
        file: FileIndex,
        name: &'a Pat,
        init: Option<&'a Expr>,
        locals: &mut Locals,
    ) -> TypeId {
        if let Pat::Ident(binding) = name
            && let Some(ann) = &binding.type_ann
        {
            return self.resolve(file, &ann.type_ann);
        }
        match init {
            Some(expr) => {
                let ty = self.expr_type(file, expr, locals);
                self.widen(ty)
            }
            None => intrinsic::ANY,
        }
    }

    fn type_named(&mut self, file: FileIndex, name: &str, has_args: bool) -> TypeId {
        if self.type_params.iter().any(|p| p == name) {
            return self.table.alloc(TypeKind::TypeParameter(name.to_string()));
        }
        match self.scope.lookup_type(file, name) {
            Some(found) if has_args => {
                let name = found.name;
                self.table.reference(&name)
            }
            Some(found) => self.named_type(found),
            None if LIBRARY_TYPES.contains(&name) => self.table.reference(name),
            None => {
                debug!(name, "Unresolved type.");
                intrinsic::ERROR
            }
        }
    }

    /// Interface, class, alias or enum type; memoized so that cycles close.
    fn named_type(&mut self, found: Found<TypeDecl<'a>>) -> TypeId {
        let key = (found.file, found.name.clone());
        if let Some(ty) = self.named_types.get(&key) {
            return *ty;
        }
        let file = found.file;
        let name = found.name;

        match found.decl {
            TypeDecl::Interface(decls) => {
                let id = self.table.alloc(TypeKind::Object(ObjectType {
                    flags: ObjectFlags::INTERFACE,
                    name: Some(name),
                    ..ObjectType::default()
                }));
                self.named_types.insert(key, id);

                let mut shape = Shape::default();
                let mut bases = Vec::new();
                for (decl_file, decl) in decls {
                    let pushed = self.push_type_params(decl.type_params.as_deref());
                    for heritage in &decl.extends {
                        bases.push(self.heritage_type(decl_file, heritage));
                    }
                    for element in &decl.body.body {
                        self.type_element(decl_file, element, &mut shape);
                    }
                    self.pop_type_params(pushed);
                }
                self.fill_object(id, shape, bases);
                id
            }
            TypeDecl::Class(class) => {
                let id = self.table.alloc(TypeKind::Object(ObjectType {
                    flags: ObjectFlags::CLASS,
                    name: Some(name),
                    ..ObjectType::default()
                }));
                self.named_types.insert(key, id);

                let pushed = self.push_type_params(class.type_params.as_deref());
                let shape = self.class_members(file, class);
                let bases = self.super_class_type(file, class).into_iter().collect();
                self.pop_type_params(pushed);

                self.fill_object(id, shape, bases);
                id
            }
            TypeDecl::Alias(alias) => {
                let id = self.table.alloc(TypeKind::Intrinsic(TypeFlags::ANY));
                self.named_types.insert(key, id);

                let pushed = self.push_type_params(alias.type_params.as_deref());
                let body = self.resolve(file, &alias.type_ann);
                self.pop_type_params(pushed);

                let kind = self.table.kind(body).clone();
                self.table.set(id, kind);
                id
            }
            TypeDecl::Enum => {
                let id = self.table.alloc(TypeKind::Enum(name));
                self.named_types.insert(key, id);
                id
            }
        }
    }

    fn fill_object(&mut self, id: TypeId, shape: Shape, bases: Vec<TypeId>) {
        if let Some(object) = self.table.object_mut(id) {
            object.members = shape.members.into_iter().map(|(_, symbol)| symbol).collect();
            object.call_signatures = shape.call_signatures;
            object.bases = bases;
        }
    }

    fn heritage_type(&mut self, file: FileIndex, heritage: &'a TsExprWithTypeArgs) -> TypeId {
        match &*heritage.expr {
            Expr::Ident(ident) => self.type_named(file, &ident.sym, heritage.type_args.is_some()),
            _ => intrinsic::ERROR,
        }
    }

    fn super_class_type(&mut self, file: FileIndex, class: &'a Class) -> Option<TypeId> {
        match class.super_class.as_deref()? {
            Expr::Ident(ident) => Some(self.type_named(
                file,
                &ident.sym,
                class.super_type_params.is_some(),
            )),
            _ => Some(intrinsic::ERROR),
        }
    }

    fn push_type_params(&mut self, params: Option<&'a TsTypeParamDecl>) -> usize {
        let Some(params) = params else {
            return 0;
        };
        for param in &params.params {
            self.type_params.push(param.name.sym.to_string());
        }
        params.params.len()
    }

    fn pop_type_params(&mut self, count: usize) {
        let keep = self.type_params.len().saturating_sub(count);
        self.type_params.truncate(keep);
    }

    // =========================================================================
    // Type annotations
    // =========================================================================

    /// Resolve a type annotation.
    pub(crate) fn resolve(&mut self, file: FileIndex, ty: &'a TsType) -> TypeId {
        match ty {
            TsType::TsKeywordType(keyword) => match keyword.kind {
                TsKeywordTypeKind::TsAnyKeyword | TsKeywordTypeKind::TsIntrinsicKeyword => intrinsic::ANY,
                TsKeywordTypeKind::TsUnknownKeyword => intrinsic::UNKNOWN,
                TsKeywordTypeKind::TsNumberKeyword => intrinsic::NUMBER,
                TsKeywordTypeKind::TsObjectKeyword => intrinsic::OBJECT,
                TsKeywordTypeKind::TsBooleanKeyword => intrinsic::BOOLEAN,
                TsKeywordTypeKind::TsBigIntKeyword => intrinsic::BIG_INT,
                TsKeywordTypeKind::TsStringKeyword => intrinsic::STRING,
                TsKeywordTypeKind::TsSymbolKeyword => intrinsic::SYMBOL,
                TsKeywordTypeKind::TsVoidKeyword => intrinsic::VOID,
                TsKeywordTypeKind::TsUndefinedKeyword => intrinsic::UNDEFINED,
                TsKeywordTypeKind::TsNullKeyword => intrinsic::NULL,
                TsKeywordTypeKind::TsNeverKeyword => intrinsic::NEVER,
            },
            TsType::TsThisType(_) => intrinsic::ANY,
            TsType::TsFnOrConstructorType(TsFnOrConstructorType::TsFnType(fn_type)) => {
                let pushed = self.push_type_params(fn_type.type_params.as_deref());
                let params = self.ts_fn_params(file, &fn_type.params);
                let ret = self.resolve(file, &fn_type.type_ann.type_ann);
                self.pop_type_params(pushed);
                self.table.function_type(params, ret)
            }
            TsType::TsFnOrConstructorType(TsFnOrConstructorType::TsConstructorType(_)) => {
                self.table.reference("constructor")
            }
            TsType::TsTypeRef(type_ref) => match &type_ref.type_name {
                TsEntityName::Ident(ident) => {
                    self.type_named(file, &ident.sym, type_ref.type_params.is_some())
                }
                _ => {
                    debug!(name = self.snippet(file, type_ref.span), "Unresolved qualified type.");
                    intrinsic::ERROR
                }
            },
            TsType::TsTypeQuery(query) => match &query.expr_name {
                TsTypeQueryExpr::TsEntityName(TsEntityName::Ident(ident)) => {
                    self.value_named(file, &ident.sym)
                }
                _ => intrinsic::ERROR,
            },
            TsType::TsTypeLit(lit) => {
                let mut shape = Shape::default();
                for element in &lit.members {
                    self.type_element(file, element, &mut shape);
                }
                let id = self.table.alloc(TypeKind::Object(ObjectType {
                    flags: ObjectFlags::ANONYMOUS,
                    ..ObjectType::default()
                }));
                self.fill_object(id, shape, vec![]);
                id
            }
            TsType::TsArrayType(_) => self.table.reference("Array"),
            TsType::TsTupleType(_) => self.table.alloc(TypeKind::Object(ObjectType {
                flags: ObjectFlags::REFERENCE | ObjectFlags::TUPLE,
                ..ObjectType::default()
            })),
            TsType::TsOptionalType(inner) => self.resolve(file, &inner.type_ann),
            TsType::TsRestType(inner) => self.resolve(file, &inner.type_ann),
            TsType::TsParenthesizedType(inner) => self.resolve(file, &inner.type_ann),
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(union)) => {
                let members: Vec<TypeId> = union.types.iter().map(|t| self.resolve(file, t)).collect();
                let ty = self.table.union(members);
                if self.strict_null_checks {
                    ty
                } else {
                    self.table.non_nullable(ty)
                }
            }
            TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(inter)) => {
                let members: Vec<TypeId> = inter.types.iter().map(|t| self.resolve(file, t)).collect();
                if members.len() == 1 {
                    members[0]
                } else {
                    self.table.alloc(TypeKind::Intersection(members))
                }
            }
            TsType::TsTypeOperator(op) => match op.op {
                TsTypeOperatorOp::ReadOnly => self.resolve(file, &op.type_ann),
                TsTypeOperatorOp::KeyOf => intrinsic::STRING,
                TsTypeOperatorOp::Unique => intrinsic::SYMBOL,
            },
            TsType::TsLitType(lit) => match &lit.lit {
                TsLit::Number(n) => self.table.alloc(TypeKind::NumberLiteral(n.value)),
                TsLit::Str(s) => {
                    let value = unquote(self.snippet(file, s.span));
                    self.table.alloc(TypeKind::StringLiteral(value))
                }
                TsLit::Bool(b) => {
                    if b.value {
                        intrinsic::TRUE
                    } else {
                        intrinsic::FALSE
                    }
                }
                TsLit::BigInt(_) => intrinsic::BIG_INT,
                TsLit::Tpl(_) => intrinsic::STRING,
            },
            TsType::TsTypePredicate(_) => intrinsic::BOOLEAN,
            TsType::TsMappedType(_) => self.table.alloc(TypeKind::Object(ObjectType {
                flags: ObjectFlags::MAPPED,
                ..ObjectType::default()
            })),
            _ => intrinsic::ERROR,
        }
    }

    fn type_element(&mut self, file: FileIndex, element: &'a TsTypeElement, shape: &mut Shape) {
        match element {
            TsTypeElement::TsPropertySignature(prop) => {
                if prop.computed {
                    return;
                }
                let Some(name) = self.key_name(file, &prop.key) else {
                    return;
                };
                let ty = match &prop.type_ann {
                    Some(ann) => self.resolve(file, &ann.type_ann),
                    None => intrinsic::ANY,
                };
                let ty = self.optional(ty, prop.optional);
                shape.insert(&mut self.table, name, Some(ty));
            }
            TsTypeElement::TsMethodSignature(method) => {
                if method.computed {
                    return;
                }
                let Some(name) = self.key_name(file, &method.key) else {
                    return;
                };
                let params = self.ts_fn_params(file, &method.params);
                let ret = match &method.type_ann {
                    Some(ann) => self.resolve(file, &ann.type_ann),
                    None => intrinsic::ANY,
                };
                let ty = self.table.function_type(params, ret);
                let ty = self.optional(ty, method.optional);
                shape.insert(&mut self.table, name, Some(ty));
            }
            TsTypeElement::TsGetterSignature(getter) => {
                if getter.computed {
                    return;
                }
                let Some(name) = self.key_name(file, &getter.key) else {
                    return;
                };
                let ty = match &getter.type_ann {
                    Some(ann) => self.resolve(file, &ann.type_ann),
                    None => intrinsic::ANY,
                };
                shape.insert(&mut self.table, name, Some(ty));
            }
            TsTypeElement::TsSetterSignature(setter) => {
                if setter.computed {
                    return;
                }
                let Some(name) = self.key_name(file, &setter.key) else {
                    return;
                };
                if !shape.contains(&name) {
                    let params = self.ts_fn_params(file, std::slice::from_ref(&setter.param));
                    let ty = params
                        .first()
                        .and_then(|p| self.table.symbol(*p).ty)
                        .unwrap_or(intrinsic::ANY);
                    shape.insert(&mut self.table, name, Some(ty));
                }
            }
            TsTypeElement::TsIndexSignature(_) => {
                shape.insert(&mut self.table, INDEX_SYMBOL.to_string(), None);
            }
            TsTypeElement::TsCallSignatureDecl(call) => {
                let params = self.ts_fn_params(file, &call.params);
                let ret = match &call.type_ann {
                    Some(ann) => self.resolve(file, &ann.type_ann),
                    None => intrinsic::ANY,
                };
                let signature = self.table.add_signature(params, ret);
                shape.call_signatures.push(signature);
            }
            _ => {}
        }
    }

    /// Parameters of a function type or signature declaration.
    fn ts_fn_params(&mut self, file: FileIndex, params: &'a [TsFnParam]) -> Vec<SymbolId> {
        let mut symbols = Vec::new();
        for (index, param) in params.iter().enumerate() {
            let (name, ty) = match param {
                TsFnParam::Ident(binding) => {
                    if &*binding.id.sym == "this" {
                        continue;
                    }
                    let ty = self.annotation_or_any(file, binding.type_ann.as_deref());
                    let ty = self.optional(ty, binding.id.optional);
                    (binding.id.sym.to_string(), ty)
                }
                TsFnParam::Rest(rest) => {
                    let ty = match rest.type_ann.as_deref() {
                        Some(ann) => self.resolve(file, &ann.type_ann),
                        None => self.table.reference("Array"),
                    };
                    (pattern_name(&rest.arg, index), ty)
                }
                TsFnParam::Object(object) => {
                    let ty = self.annotation_or_any(file, object.type_ann.as_deref());
                    (positional_name(index), ty)
                }
                TsFnParam::Array(array) => {
                    let ty = self.annotation_or_any(file, array.type_ann.as_deref());
                    (positional_name(index), ty)
                }
            };
            symbols.push(self.table.add_symbol(name, Some(ty)));
        }
        symbols
    }

    fn annotation_or_any(
        &mut self,
        file: FileIndex,
        ann: Option<&'a TsTypeAnn>,
    ) -> TypeId {
        match ann {
            Some(ann) => self.resolve(file, &ann.type_ann),
            None => intrinsic::ANY,
        }
    }

    /// Name of a property key written as an expression (type members).
    fn key_name(&self, file: FileIndex, key: &'a Expr) -> Option<String> {
        match key {
            Expr::Ident(ident) => Some(ident.sym.to_string()),
            Expr::Lit(Lit::Str(s)) => Some(unquote(self.snippet(file, s.span))),
            Expr::Lit(Lit::Num(n)) => Some(n.value.to_string()),
            _ => None,
        }
    }

    fn prop_name(&self, file: FileIndex, key: &'a PropName) -> Option<String> {
        match key {
            PropName::Ident(ident) => Some(ident.sym.to_string()),
            PropName::Str(s) => Some(unquote(self.snippet(file, s.span))),
            PropName::Num(n) => Some(n.value.to_string()),
            _ => None,
        }
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// Instance side of a class: properties, methods, accessors and
    /// constructor parameter properties, in declaration order.
    fn class_members(&mut self, file: FileIndex, class: &'a Class) -> Shape {
        let mut shape = Shape::default();

        for member in &class.body {
            match member {
                ClassMember::ClassProp(prop) if !prop.is_static => {
                    let Some(name) = self.prop_name(file, &prop.key) else {
                        continue;
                    };
                    let ty = match (&prop.type_ann, &prop.value) {
                        (Some(ann), _) => self.resolve(file, &ann.type_ann),
                        (None, Some(value)) => {
                            let ty = self.expr_type(file, value, &mut Locals::default());
                            self.widen(ty)
                        }
                        (None, None) => intrinsic::ANY,
                    };
                    let ty = self.optional(ty, prop.is_optional);
                    shape.insert(&mut self.table, name, Some(ty));
                }
                ClassMember::Method(method) if !method.is_static => {
                    let Some(name) = self.prop_name(file, &method.key) else {
                        continue;
                    };
                    match method.kind {
                        MethodKind::Method => {
                            let ty = self.function_type(file, &method.function, &mut Locals::default());
                            let ty = self.optional(ty, method.is_optional);
                            shape.insert(&mut self.table, name, Some(ty));
                        }
                        MethodKind::Getter => {
                            let ty = self.function_type(file, &method.function, &mut Locals::default());
                            let ret = self.return_type_of(ty);
                            shape.insert(&mut self.table, name, Some(ret));
                        }
                        MethodKind::Setter => {
                            if !shape.contains(&name) {
                                let ty = match method.function.params.first() {
                                    Some(param) => self.param_type(file, &param.pat),
                                    None => intrinsic::ANY,
                                };
                                shape.insert(&mut self.table, name, Some(ty));
                            }
                        }
                    }
                }
                ClassMember::Constructor(ctor) => {
                    for param in &ctor.params {
                        let ParamOrTsParamProp::TsParamProp(prop) = param else {
                            continue;
                        };
                        let (name, ty) = match &prop.param {
                            TsParamPropParam::Ident(binding) => {
                                let ty = self.annotation_or_any(file, binding.type_ann.as_deref());
                                let ty = self.optional(ty, binding.id.optional);
                                (binding.id.sym.to_string(), ty)
                            }
                            TsParamPropParam::Assign(assign) => {
                                let ty = self.assign_type(file, assign, &mut Locals::default());
                                (pattern_name(&assign.left, 0), ty)
                            }
                        };
                        shape.insert(&mut self.table, name, Some(ty));
                    }
                }
                ClassMember::TsIndexSignature(index) if !index.is_static => {
                    shape.insert(&mut self.table, INDEX_SYMBOL.to_string(), None);
                }
                _ => {}
            }
        }

        shape
    }

    fn return_type_of(&self, function_type: TypeId) -> TypeId {
        self.table
            .object(function_type)
            .and_then(|o| o.call_signatures.first())
            .map_or(intrinsic::ANY, |s| self.table.signature(*s).return_type)
    }

    // =========================================================================
    // Functions
    // =========================================================================

    /// Declared type of a lone parameter, such as a setter's.
    fn param_type(&mut self, file: FileIndex, pat: &'a Pat) -> TypeId {
        let mut locals = Locals::default();
        locals.push();
        self.param_symbol(file, pat, 0, &mut locals)
            .and_then(|symbol| self.table.symbol(symbol).ty)
            .unwrap_or(intrinsic::ANY)
    }

    /// `name: T = value` is `T`; `name = value` is the widened value type.
    fn assign_type(&mut self, file: FileIndex, assign: &'a AssignPat, locals: &mut Locals) -> TypeId {
        match &*assign.left {
            Pat::Ident(binding) if binding.type_ann.is_some() => {
                self.annotation_or_any(file, binding.type_ann.as_deref())
            }
            _ => {
                let ty = self.expr_type(file, &assign.right, locals);
                self.widen(ty)
            }
        }
    }

    /// Symbol for one parameter, also bound in `locals`.
    fn param_symbol(
        &mut self,
        file: FileIndex,
        pat: &'a Pat,
        index: usize,
        locals: &mut Locals,
    ) -> Option<SymbolId> {
        let (name, ty) = match pat {
            Pat::Ident(binding) => {
                if &*binding.id.sym == "this" {
                    return None;
                }
                let ty = self.annotation_or_any(file, binding.type_ann.as_deref());
                let ty = self.optional(ty, binding.id.optional);
                (binding.id.sym.to_string(), ty)
            }
            Pat::Assign(assign) => (
                pattern_name(&assign.left, index),
                self.assign_type(file, assign, locals),
            ),
            Pat::Rest(rest) => {
                let ty = match rest.type_ann.as_deref() {
                    Some(ann) => self.resolve(file, &ann.type_ann),
                    None => self.table.reference("Array"),
                };
                (pattern_name(&rest.arg, index), ty)
            }
            Pat::Object(object) => (
                positional_name(index),
                self.annotation_or_any(file, object.type_ann.as_deref()),
            ),
            Pat::Array(array) => (
                positional_name(index),
                self.annotation_or_any(file, array.type_ann.as_deref()),
            ),
            _ => return None,
        };
        locals.insert(&name, ty);
        Some(self.table.add_symbol(name, Some(ty)))
    }

    /// Anonymous function type of a function declaration or expression.
    pub(crate) fn function_type(
        &mut self,
        file: FileIndex,
        function: &'a Function,
        locals: &mut Locals,
    ) -> TypeId {
        let pushed = self.push_type_params(function.type_params.as_deref());
        locals.push();

        let params = function
            .params
            .iter()
            .enumerate()
            .filter_map(|(index, param)| self.param_symbol(file, &param.pat, index, locals))
            .collect();
        let ret = match &function.return_type {
            Some(ann) => self.resolve(file, &ann.type_ann),
            None if function.is_async => self.table.reference("Promise"),
            None if function.is_generator => self.table.reference("Generator"),
            None => match &function.body {
                Some(body) => self.infer_return(file, body, locals),
                None => intrinsic::ANY,
            },
        };

        locals.pop();
        self.pop_type_params(pushed);
        self.table.function_type(params, ret)
    }

    /// Type of a function name declared by `functions`. Overload signatures
    /// hide the implementation; without them the implementation is the only
    /// signature.
    pub(crate) fn overloaded_type(&mut self, file: FileIndex, functions: &[&'a Function]) -> TypeId {
        let overloads: Vec<&'a Function> = functions
            .iter()
            .copied()
            .filter(|function| function.body.is_none())
            .collect();
        let declared = if overloads.is_empty() {
            functions
        } else {
            overloads.as_slice()
        };

        if let [single] = declared {
            return self.function_type(file, *single, &mut Locals::default());
        }
        let mut call_signatures = Vec::new();
        for function in declared {
            let ty = self.function_type(file, *function, &mut Locals::default());
            if let Some(object) = self.table.object(ty) {
                call_signatures.extend(object.call_signatures.iter().copied());
            }
        }
        self.table.alloc(TypeKind::Object(ObjectType {
            flags: ObjectFlags::ANONYMOUS,
            call_signatures,
            ..ObjectType::default()
        }))
    }

    pub(crate) fn arrow_type(&mut self, file: FileIndex, arrow: &'a ArrowExpr, locals: &mut Locals) -> TypeId {
        let pushed = self.push_type_params(arrow.type_params.as_deref());
        locals.push();

        let params = arrow
            .params
            .iter()
            .enumerate()
            .filter_map(|(index, pat)| self.param_symbol(file, pat, index, locals))
            .collect();
        let ret = match (&arrow.return_type, &*arrow.body) {
            (Some(ann), _) => self.resolve(file, &ann.type_ann),
            (None, _) if arrow.is_async => self.table.reference("Promise"),
            (None, BlockStmtOrExpr::BlockStmt(body)) => self.infer_return(file, body, locals),
            (None, BlockStmtOrExpr::Expr(expr)) => {
                let ty = self.expr_type(file, expr, locals);
                self.widen(ty)
            }
        };

        locals.pop();
        self.pop_type_params(pushed);
        self.table.function_type(params, ret)
    }

    /// Union of the widened types of the body's own `return` statements.
    fn infer_return(&mut self, file: FileIndex, body: &'a BlockStmt, locals: &mut Locals) -> TypeId {
        let mut returns = Vec::new();
        self.scan_body(file, &body.stmts, locals, &mut returns);

        if returns.iter().all(Option::is_none) {
            return intrinsic::VOID;
        }
        let mut types = Vec::new();
        for arg in returns {
            let ty = match arg {
                Some(expr) => self.expr_type(file, expr, locals),
                None => intrinsic::UNDEFINED,
            };
            types.push(self.widen(ty));
        }
        self.table.union(types)
    }

    /// Bind local declarations and collect `return` arguments, without
    /// entering nested functions.
    fn scan_body(
        &mut self,
        file: FileIndex,
        stmts: &'a [Stmt],
        locals: &mut Locals,
        returns: &mut Vec<Option<&'a Expr>>,
    ) {
        for stmt in stmts {
            self.scan_stmt(file, stmt, locals, returns);
        }
    }

    fn scan_stmt(
        &mut self,
        file: FileIndex,
        stmt: &'a Stmt,
        locals: &mut Locals,
        returns: &mut Vec<Option<&'a Expr>>,
    ) {
        match stmt {
            Stmt::Return(ret) => returns.push(ret.arg.as_deref()),
            Stmt::Decl(Decl::Fn(f)) => {
                let ty = self.function_type(file, &f.function, locals);
                locals.insert(&f.ident.sym, ty);
            }
            Stmt::Decl(Decl::Var(var)) => {
                for declarator in &var.decls {
                    if let Pat::Ident(binding) = &declarator.name {
                        let ty = self.variable_type(
                            file,
                            &declarator.name,
                            declarator.init.as_deref(),
                            locals,
                        );
                        locals.insert(&binding.id.sym, ty);
                    }
                }
            }
            Stmt::Block(block) => self.scan_body(file, &block.stmts, locals, returns),
            Stmt::If(if_stmt) => {
                self.scan_stmt(file, &if_stmt.cons, locals, returns);
                if let Some(alt) = &if_stmt.alt {
                    self.scan_stmt(file, alt, locals, returns);
                }
            }
            Stmt::For(s) => self.scan_stmt(file, &s.body, locals, returns),
            Stmt::ForIn(s) => self.scan_stmt(file, &s.body, locals, returns),
            Stmt::ForOf(s) => self.scan_stmt(file, &s.body, locals, returns),
            Stmt::While(s) => self.scan_stmt(file, &s.body, locals, returns),
            Stmt::DoWhile(s) => self.scan_stmt(file, &s.body, locals, returns),
            Stmt::Labeled(s) => self.scan_stmt(file, &s.body, locals, returns),
            Stmt::With(s) => self.scan_stmt(file, &s.body, locals, returns),
            Stmt::Switch(s) => {
                for case in &s.cases {
                    self.scan_body(file, &case.cons, locals, returns);
                }
            }
            Stmt::Try(s) => {
                self.scan_body(file, &s.block.stmts, locals, returns);
                if let Some(handler) = &s.handler {
                    self.scan_body(file, &handler.body.stmts, locals, returns);
                }
                if let Some(finalizer) = &s.finalizer {
                    self.scan_body(file, &finalizer.stmts, locals, returns);
                }
            }
            _ => {}
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Type of an expression. Literal types are not widened here.
    pub(crate) fn expr_type(&mut self, file: FileIndex, expr: &'a Expr, locals: &mut Locals) -> TypeId {
        match expr {
            Expr::Lit(lit) => self.lit_type(file, lit),
            Expr::Tpl(_) => intrinsic::STRING,
            Expr::Ident(ident) => match &*ident.sym {
                "undefined" => intrinsic::UNDEFINED,
                "NaN" | "Infinity" => intrinsic::NUMBER,
                name => match locals.get(name) {
                    Some(ty) => ty,
                    None => self.value_named(file, name),
                },
            },
            Expr::Fn(f) => self.function_type(file, &f.function, locals),
            Expr::Arrow(arrow) => self.arrow_type(file, arrow, locals),
            Expr::Class(_) => self.table.alloc(TypeKind::Object(ObjectType {
                flags: ObjectFlags::ANONYMOUS,
                ..ObjectType::default()
            })),
            Expr::Object(object) => {
                let mut shape = Shape::default();
                for prop in &object.props {
                    match prop {
                        PropOrSpread::Prop(prop) => self.object_prop(file, prop, locals, &mut shape),
                        PropOrSpread::Spread(spread) => {
                            let ty = self.expr_type(file, &spread.expr, locals);
                            let spread_members = self
                                .table
                                .object(ty)
                                .map(|o| o.members.clone())
                                .unwrap_or_default();
                            for symbol in spread_members {
                                let data = self.table.symbol(symbol).clone();
                                shape.insert(&mut self.table, data.name, data.ty);
                            }
                        }
                    }
                }
                let id = self.table.alloc(TypeKind::Object(ObjectType {
                    flags: ObjectFlags::ANONYMOUS | ObjectFlags::OBJECT_LITERAL,
                    ..ObjectType::default()
                }));
                self.fill_object(id, shape, vec![]);
                id
            }
            Expr::Array(_) => self.table.reference("Array"),
            Expr::Paren(paren) => self.expr_type(file, &paren.expr, locals),
            Expr::TsAs(cast) => self.resolve(file, &cast.type_ann),
            Expr::TsTypeAssertion(cast) => self.resolve(file, &cast.type_ann),
            Expr::TsSatisfies(s) => self.expr_type(file, &s.expr, locals),
            Expr::TsConstAssertion(c) => self.expr_type(file, &c.expr, locals),
            Expr::TsNonNull(n) => {
                let ty = self.expr_type(file, &n.expr, locals);
                self.table.non_nullable(ty)
            }
            Expr::Await(await_expr) => self.expr_type(file, &await_expr.arg, locals),
            Expr::Seq(seq) => match seq.exprs.last() {
                Some(last) => self.expr_type(file, last, locals),
                None => intrinsic::ANY,
            },
            Expr::Assign(assign) => self.expr_type(file, &assign.right, locals),
            Expr::Cond(cond) => {
                let cons = self.expr_type(file, &cond.cons, locals);
                let alt = self.expr_type(file, &cond.alt, locals);
                self.table.union([cons, alt])
            }
            Expr::Unary(unary) => match unary.op {
                UnaryOp::Bang | UnaryOp::Delete => intrinsic::BOOLEAN,
                UnaryOp::TypeOf => intrinsic::STRING,
                UnaryOp::Void => intrinsic::UNDEFINED,
                UnaryOp::Minus | UnaryOp::Plus | UnaryOp::Tilde => intrinsic::NUMBER,
            },
            Expr::Update(_) => intrinsic::NUMBER,
            Expr::Bin(bin) => self.binary_type(file, bin.op, &bin.left, &bin.right, locals),
            Expr::Call(call) => match &call.callee {
                Callee::Expr(callee) => {
                    let ty = self.expr_type(file, callee, locals);
                    self.return_type_of(ty)
                }
                _ => intrinsic::ANY,
            },
            Expr::New(new) => match &*new.callee {
                Expr::Ident(ident) => self.type_named(file, &ident.sym, new.type_args.is_some()),
                _ => intrinsic::ERROR,
            },
            Expr::Member(member) => {
                let object = self.expr_type(file, &member.obj, locals);
                match member.prop.as_ident() {
                    Some(prop) => self
                        .find_member(object, &prop.sym, &mut Vec::new())
                        .unwrap_or(intrinsic::ERROR),
                    None => intrinsic::ERROR,
                }
            }
            _ => intrinsic::ANY,
        }
    }

    fn lit_type(&mut self, file: FileIndex, lit: &Lit) -> TypeId {
        match lit {
            Lit::Str(s) => {
                let value = unquote(self.snippet(file, s.span));
                self.table.alloc(TypeKind::StringLiteral(value))
            }
            Lit::Num(n) => self.table.alloc(TypeKind::NumberLiteral(n.value)),
            Lit::Bool(b) => {
                if b.value {
                    intrinsic::TRUE
                } else {
                    intrinsic::FALSE
                }
            }
            Lit::Null(_) => intrinsic::NULL,
            Lit::BigInt(_) => intrinsic::BIG_INT,
            Lit::Regex(_) => self.table.reference("RegExp"),
            _ => intrinsic::STRING,
        }
    }

    fn object_prop(&mut self, file: FileIndex, prop: &'a Prop, locals: &mut Locals, shape: &mut Shape) {
        match prop {
            Prop::KeyValue(kv) => {
                if let Some(name) = self.prop_name(file, &kv.key) {
                    let ty = self.expr_type(file, &kv.value, locals);
                    let ty = self.widen(ty);
                    shape.insert(&mut self.table, name, Some(ty));
                }
            }
            Prop::Shorthand(ident) => {
                let ty = match locals.get(&ident.sym) {
                    Some(ty) => ty,
                    None => self.value_named(file, &ident.sym),
                };
                let ty = self.widen(ty);
                shape.insert(&mut self.table, ident.sym.to_string(), Some(ty));
            }
            Prop::Method(method) => {
                if let Some(name) = self.prop_name(file, &method.key) {
                    let ty = self.function_type(file, &method.function, locals);
                    shape.insert(&mut self.table, name, Some(ty));
                }
            }
            Prop::Getter(getter) => {
                if let Some(name) = self.prop_name(file, &getter.key) {
                    let ty = match (&getter.type_ann, &getter.body) {
                        (Some(ann), _) => self.resolve(file, &ann.type_ann),
                        (None, Some(body)) => {
                            locals.push();
                            let ty = self.infer_return(file, body, locals);
                            locals.pop();
                            ty
                        }
                        (None, None) => intrinsic::ANY,
                    };
                    shape.insert(&mut self.table, name, Some(ty));
                }
            }
            Prop::Setter(_) | Prop::Assign(_) => {}
        }
    }

    fn binary_type(
        &mut self,
        file: FileIndex,
        op: BinaryOp,
        left: &'a Expr,
        right: &'a Expr,
        locals: &mut Locals,
    ) -> TypeId {
        match op {
            BinaryOp::EqEq
            | BinaryOp::NotEq
            | BinaryOp::EqEqEq
            | BinaryOp::NotEqEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq
            | BinaryOp::In
            | BinaryOp::InstanceOf => intrinsic::BOOLEAN,
            BinaryOp::Add => {
                let l = self.expr_type(file, left, locals);
                let r = self.expr_type(file, right, locals);
                let (l, r) = (self.widen(l), self.widen(r));
                if l == intrinsic::STRING || r == intrinsic::STRING {
                    intrinsic::STRING
                } else if l == intrinsic::NUMBER && r == intrinsic::NUMBER {
                    intrinsic::NUMBER
                } else {
                    intrinsic::ANY
                }
            }
            BinaryOp::LogicalAnd => self.expr_type(file, right, locals),
            BinaryOp::LogicalOr => {
                let l = self.expr_type(file, left, locals);
                let r = self.expr_type(file, right, locals);
                self.table.union([l, r])
            }
            BinaryOp::NullishCoalescing => {
                let l = self.expr_type(file, left, locals);
                let l = self.table.non_nullable(l);
                let r = self.expr_type(file, right, locals);
                self.table.union([l, r])
            }
            _ => intrinsic::NUMBER,
        }
    }

    /// Type of member `name` of `object`, searching base types too.
    fn find_member(&self, object: TypeId, name: &str, seen: &mut Vec<TypeId>) -> Option<TypeId> {
        if seen.contains(&object) {
            return None;
        }
        seen.push(object);
        let data = self.table.object(object)?;
        data.members
            .iter()
            .map(|s| self.table.symbol(*s))
            .find(|s| s.name == name)
            .and_then(|s| s.ty)
            .or_else(|| {
                data.bases
                    .iter()
                    .find_map(|base| self.find_member(*base, name, seen))
            })
    }
}

/// Members collected for an object type, last declaration of a name wins.
#[derive(Default)]
struct Shape {
    members: Vec<(String, SymbolId)>,
    call_signatures: Vec<SignatureId>,
}

impl Shape {
    fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|(n, _)| n == name)
    }

    fn insert(&mut self, table: &mut TypeTable, name: String, ty: Option<TypeId>) {
        let symbol = table.add_symbol(name.clone(), ty);
        match self.members.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = symbol,
            None => self.members.push((name, symbol)),
        }
    }
}

fn positional_name(index: usize) -> String {
    format!("__{index}")
}

fn pattern_name(pat: &Pat, index: usize) -> String {
    match pat {
        Pat::Ident(binding) => binding.id.sym.to_string(),
        _ => positional_name(index),
    }
}

/// Value of a quoted JavaScript string literal as written in source.
pub(crate) fn unquote(raw: &str) -> String {
    let inner = raw
        .strip_prefix(['"', '\''])
        .and_then(|s| s.strip_suffix(['"', '\'']))
        .unwrap_or(raw);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                push_code_point(&mut out, &hex);
            }
            Some('u') => {
                let rest = chars.as_str();
                let hex: String = if rest.starts_with('{') {
                    let end = rest.find('}').unwrap_or(rest.len());
                    let hex = rest[1..end].to_string();
                    chars = rest[(end + 1).min(rest.len())..].chars();
                    hex
                } else {
                    chars.by_ref().take(4).collect()
                };
                push_code_point(&mut out, &hex);
            }
            Some('\n') | None => {}
            Some(other) => out.push(other),
        }
    }
    out
}

fn push_code_point(out: &mut String, hex: &str) {
    if let Some(c) = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
        out.push(c);
    }
}
