//! Lowering of swc statements into the statement tree the collector walks.
//!
//! Every statement becomes a node. Statements nested in blocks, function
//! bodies, class members and namespaces become its children, so a pre-order
//! walk sees them in source order. Value nodes (assigned expressions,
//! variable initializers, export specifiers) carry the type the checker
//! computed for them.

use std::collections::HashMap;

use indexmap::IndexMap;
use swc_core::common::{Span, Spanned};
use swc_core::ecma::ast::{
    AssignOp, AssignTarget, BlockStmtOrExpr, Callee, Class, ClassMember, Decl, DefaultDecl,
    ExportSpecifier as AstExportSpecifier, Expr, FnDecl, Function, MemberProp, Module, ModuleDecl,
    ModuleExportName, ModuleItem, Pat, Prop, PropOrSpread, SimpleAssignTarget, Stmt, TsNamespaceBody,
};

use super::checker::{Checker, Locals};
use super::scope::FileIndex;
use super::table::{TypeId, intrinsic};
use crate::model::{ExportSpecifier, Modifiers, Syntax, VariableDeclaration};

/// Statement or value node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) file: FileIndex,
    pub(crate) span: Span,
    pub(crate) syntax: Syntax<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) ty: TypeId,
}

pub(crate) struct Lowering<'c, 'a> {
    checker: &'c mut Checker<'a>,
    nodes: Vec<NodeData>,
    /// Merged overload type of each function declaration, by function span.
    function_types: HashMap<Span, TypeId>,
}

impl<'c, 'a> Lowering<'c, 'a> {
    pub(crate) fn new(checker: &'c mut Checker<'a>) -> Self {
        Self {
            checker,
            nodes: Vec::new(),
            function_types: HashMap::new(),
        }
    }

    pub(crate) fn into_nodes(self) -> Vec<NodeData> {
        self.nodes
    }

    /// Lower the top-level items of `module`, returning their nodes in order.
    pub(crate) fn lower_module(&mut self, file: FileIndex, module: &'a Module) -> Vec<NodeId> {
        self.items(file, &module.body)
    }

    fn items(&mut self, file: FileIndex, items: &'a [ModuleItem]) -> Vec<NodeId> {
        self.type_functions(
            file,
            items.iter().filter_map(|item| match item {
                ModuleItem::Stmt(Stmt::Decl(Decl::Fn(f))) => Some(f),
                ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => match &export.decl {
                    Decl::Fn(f) => Some(f),
                    _ => None,
                },
                _ => None,
            }),
        );
        items.iter().map(|item| self.item(file, item)).collect()
    }

    /// Give every declaration of a function name in one statement list the
    /// type of the whole overload set.
    fn type_functions(&mut self, file: FileIndex, decls: impl Iterator<Item = &'a FnDecl>) {
        let mut by_name: IndexMap<&'a str, Vec<&'a FnDecl>> = IndexMap::new();
        for decl in decls {
            by_name.entry(&*decl.ident.sym).or_default().push(decl);
        }
        for group in by_name.into_values() {
            let functions: Vec<&'a Function> = group.into_iter().map(|decl| &*decl.function).collect();
            let ty = self.checker.overloaded_type(file, &functions);
            for function in functions {
                self.function_types.insert(function.span, ty);
            }
        }
    }

    fn node(
        &mut self,
        file: FileIndex,
        span: Span,
        syntax: Syntax<NodeId>,
        ty: TypeId,
        children: Vec<NodeId>,
    ) -> NodeId {
        self.nodes.push(NodeData {
            file,
            span,
            syntax,
            children,
            ty,
        });
        NodeId(self.nodes.len() as u32 - 1)
    }

    fn other(&mut self, file: FileIndex, span: Span, children: Vec<NodeId>) -> NodeId {
        self.node(file, span, Syntax::Other, intrinsic::ANY, children)
    }

    fn item(&mut self, file: FileIndex, item: &'a ModuleItem) -> NodeId {
        let module_decl = match item {
            ModuleItem::Stmt(stmt) => return self.stmt(file, stmt),
            ModuleItem::ModuleDecl(module_decl) => module_decl,
        };
        let span = module_decl.span();

        match module_decl {
            ModuleDecl::ExportDecl(export) => self.decl(
                file,
                span,
                &export.decl,
                Modifiers {
                    export: true,
                    default: false,
                },
            ),
            ModuleDecl::ExportDefaultDecl(export) => match &export.decl {
                DefaultDecl::Fn(f) => {
                    let ty = self.checker.function_type(file, &f.function, &mut Locals::default());
                    let children = self.body(file, f.function.body.as_ref().map(|b| b.stmts.as_slice()));
                    let syntax = Syntax::FunctionDeclaration {
                        modifiers: Modifiers {
                            export: true,
                            default: true,
                        },
                        name: f.ident.as_ref().map(|i| i.sym.to_string()),
                    };
                    self.node(file, span, syntax, ty, children)
                }
                DefaultDecl::Class(c) => {
                    let children = self.class_children(file, &c.class);
                    self.other(file, span, children)
                }
                DefaultDecl::TsInterfaceDecl(_) => self.other(file, span, vec![]),
            },
            ModuleDecl::ExportDefaultExpr(export) => {
                let children = self.expr_children(file, &export.expr);
                self.other(file, span, children)
            }
            ModuleDecl::ExportNamed(named) if !named.type_only => {
                let mut specifiers = Vec::new();
                for specifier in &named.specifiers {
                    let AstExportSpecifier::Named(named) = specifier else {
                        continue;
                    };
                    if named.is_type_only {
                        continue;
                    }
                    let ModuleExportName::Ident(orig) = &named.orig else {
                        continue;
                    };
                    let name = match &named.exported {
                        Some(ModuleExportName::Ident(exported)) => exported.sym.to_string(),
                        _ => orig.sym.to_string(),
                    };
                    let ty = self.checker.value_named(file, &orig.sym);
                    let local = self.node(file, orig.span, Syntax::Other, ty, vec![]);
                    specifiers.push(ExportSpecifier { name, local });
                }
                self.node(
                    file,
                    span,
                    Syntax::NamedExports { specifiers },
                    intrinsic::ANY,
                    vec![],
                )
            }
            _ => self.other(file, span, vec![]),
        }
    }

    fn stmt(&mut self, file: FileIndex, stmt: &'a Stmt) -> NodeId {
        let span = stmt.span();

        match stmt {
            Stmt::Decl(decl) => self.decl(file, span, decl, Modifiers::default()),
            Stmt::Expr(expr_stmt) => {
                if let Expr::Assign(assign) = &*expr_stmt.expr
                    && assign.op == AssignOp::Assign
                    && let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &assign.left
                    && let Expr::Ident(object) = &*member.obj
                    && let MemberProp::Ident(property) = &member.prop
                {
                    let value = self.value(file, &assign.right);
                    let syntax = Syntax::PropertyAssignment {
                        object: object.sym.to_string(),
                        property: property.sym.to_string(),
                        value,
                    };
                    return self.node(file, span, syntax, intrinsic::ANY, vec![value]);
                }
                let children = self.expr_children(file, &expr_stmt.expr);
                self.other(file, span, children)
            }
            Stmt::Block(block) => {
                let children = self.stmts(file, &block.stmts);
                self.other(file, span, children)
            }
            Stmt::If(if_stmt) => {
                let mut children = self.expr_children(file, &if_stmt.test);
                children.push(self.stmt(file, &if_stmt.cons));
                if let Some(alt) = &if_stmt.alt {
                    children.push(self.stmt(file, alt));
                }
                self.other(file, span, children)
            }
            Stmt::For(s) => {
                let children = vec![self.stmt(file, &s.body)];
                self.other(file, span, children)
            }
            Stmt::ForIn(s) => {
                let children = vec![self.stmt(file, &s.body)];
                self.other(file, span, children)
            }
            Stmt::ForOf(s) => {
                let children = vec![self.stmt(file, &s.body)];
                self.other(file, span, children)
            }
            Stmt::While(s) => {
                let children = vec![self.stmt(file, &s.body)];
                self.other(file, span, children)
            }
            Stmt::DoWhile(s) => {
                let children = vec![self.stmt(file, &s.body)];
                self.other(file, span, children)
            }
            Stmt::Labeled(s) => {
                let children = vec![self.stmt(file, &s.body)];
                self.other(file, span, children)
            }
            Stmt::Try(s) => {
                let mut children = self.stmts(file, &s.block.stmts);
                if let Some(handler) = &s.handler {
                    children.extend(self.stmts(file, &handler.body.stmts));
                }
                if let Some(finalizer) = &s.finalizer {
                    children.extend(self.stmts(file, &finalizer.stmts));
                }
                self.other(file, span, children)
            }
            Stmt::Switch(s) => {
                let mut children = Vec::new();
                for case in &s.cases {
                    children.extend(self.stmts(file, &case.cons));
                }
                self.other(file, span, children)
            }
            Stmt::Return(ret) => {
                let children = match &ret.arg {
                    Some(arg) => self.expr_children(file, arg),
                    None => vec![],
                };
                self.other(file, span, children)
            }
            Stmt::Throw(throw) => {
                let children = self.expr_children(file, &throw.arg);
                self.other(file, span, children)
            }
            _ => self.other(file, span, vec![]),
        }
    }

    fn stmts(&mut self, file: FileIndex, stmts: &'a [Stmt]) -> Vec<NodeId> {
        self.type_functions(
            file,
            stmts.iter().filter_map(|stmt| match stmt {
                Stmt::Decl(Decl::Fn(f)) => Some(f),
                _ => None,
            }),
        );
        stmts.iter().map(|stmt| self.stmt(file, stmt)).collect()
    }

    fn body(&mut self, file: FileIndex, stmts: Option<&'a [Stmt]>) -> Vec<NodeId> {
        stmts.map(|s| self.stmts(file, s)).unwrap_or_default()
    }

    fn decl(&mut self, file: FileIndex, span: Span, decl: &'a Decl, modifiers: Modifiers) -> NodeId {
        match decl {
            Decl::Fn(f) => {
                let ty = match self.function_types.get(&f.function.span) {
                    Some(ty) => *ty,
                    None => self.checker.function_type(file, &f.function, &mut Locals::default()),
                };
                let children = self.body(file, f.function.body.as_ref().map(|b| b.stmts.as_slice()));
                let syntax = Syntax::FunctionDeclaration {
                    modifiers,
                    name: Some(f.ident.sym.to_string()),
                };
                self.node(file, span, syntax, ty, children)
            }
            Decl::Var(var) => {
                let mut declarations = Vec::new();
                let mut children = Vec::new();
                for declarator in &var.decls {
                    let Pat::Ident(binding) = &declarator.name else {
                        continue;
                    };
                    let initializer = match &declarator.init {
                        Some(init) => {
                            let ty = self.checker.variable_type(
                                file,
                                &declarator.name,
                                Some(&**init),
                                &mut Locals::default(),
                            );
                            let nested = self.expr_children(file, init);
                            let node = self.node(file, init.span(), Syntax::Other, ty, nested);
                            children.push(node);
                            Some(node)
                        }
                        None => None,
                    };
                    declarations.push(VariableDeclaration {
                        name: binding.id.sym.to_string(),
                        initializer,
                    });
                }
                let syntax = Syntax::VariableStatement {
                    modifiers,
                    declarations,
                };
                self.node(file, span, syntax, intrinsic::ANY, children)
            }
            Decl::Class(c) => {
                let children = self.class_children(file, &c.class);
                self.other(file, span, children)
            }
            Decl::TsModule(module) => {
                let mut children = Vec::new();
                let mut body = module.body.as_ref();
                while let Some(namespace) = body {
                    match namespace {
                        TsNamespaceBody::TsModuleBlock(block) => {
                            children.extend(self.items(file, &block.body));
                            body = None;
                        }
                        TsNamespaceBody::TsNamespaceDecl(inner) => body = Some(&*inner.body),
                    }
                }
                self.other(file, span, children)
            }
            _ => self.other(file, span, vec![]),
        }
    }

    /// Node standing for an expression's value.
    fn value(&mut self, file: FileIndex, expr: &'a Expr) -> NodeId {
        let ty = self.checker.expr_type(file, expr, &mut Locals::default());
        let children = self.expr_children(file, expr);
        self.node(file, expr.span(), Syntax::Other, ty, children)
    }

    fn class_children(&mut self, file: FileIndex, class: &'a Class) -> Vec<NodeId> {
        let mut children = Vec::new();
        for member in &class.body {
            match member {
                ClassMember::Method(method) => {
                    children.extend(self.body(file, method.function.body.as_ref().map(|b| b.stmts.as_slice())));
                }
                ClassMember::PrivateMethod(method) => {
                    children.extend(self.body(file, method.function.body.as_ref().map(|b| b.stmts.as_slice())));
                }
                ClassMember::Constructor(ctor) => {
                    children.extend(self.body(file, ctor.body.as_ref().map(|b| b.stmts.as_slice())));
                }
                ClassMember::ClassProp(prop) => {
                    if let Some(value) = &prop.value {
                        children.extend(self.expr_children(file, value));
                    }
                }
                ClassMember::StaticBlock(block) => children.extend(self.stmts(file, &block.body.stmts)),
                _ => {}
            }
        }
        children
    }

    /// Statements inside function bodies reachable from `expr`.
    fn expr_children(&mut self, file: FileIndex, expr: &'a Expr) -> Vec<NodeId> {
        match expr {
            Expr::Fn(f) => self.body(file, f.function.body.as_ref().map(|b| b.stmts.as_slice())),
            Expr::Arrow(arrow) => match &*arrow.body {
                BlockStmtOrExpr::BlockStmt(block) => self.stmts(file, &block.stmts),
                BlockStmtOrExpr::Expr(body) => self.expr_children(file, body),
            },
            Expr::Class(c) => self.class_children(file, &c.class),
            Expr::Call(call) => {
                let mut children = match &call.callee {
                    Callee::Expr(callee) => self.expr_children(file, callee),
                    _ => vec![],
                };
                for arg in &call.args {
                    children.extend(self.expr_children(file, &arg.expr));
                }
                children
            }
            Expr::New(new) => {
                let mut children = self.expr_children(file, &new.callee);
                for arg in new.args.iter().flatten() {
                    children.extend(self.expr_children(file, &arg.expr));
                }
                children
            }
            Expr::Object(object) => {
                let mut children = Vec::new();
                for prop in &object.props {
                    match prop {
                        PropOrSpread::Spread(spread) => children.extend(self.expr_children(file, &spread.expr)),
                        PropOrSpread::Prop(prop) => match &**prop {
                            Prop::KeyValue(kv) => children.extend(self.expr_children(file, &kv.value)),
                            Prop::Method(m) => children.extend(
                                self.body(file, m.function.body.as_ref().map(|b| b.stmts.as_slice())),
                            ),
                            Prop::Getter(g) => {
                                children.extend(self.body(file, g.body.as_ref().map(|b| b.stmts.as_slice())));
                            }
                            Prop::Setter(s) => {
                                children.extend(self.body(file, s.body.as_ref().map(|b| b.stmts.as_slice())));
                            }
                            _ => {}
                        },
                    }
                }
                children
            }
            Expr::Array(array) => {
                let mut children = Vec::new();
                for element in array.elems.iter().flatten() {
                    children.extend(self.expr_children(file, &element.expr));
                }
                children
            }
            Expr::Paren(paren) => self.expr_children(file, &paren.expr),
            Expr::Assign(assign) => self.expr_children(file, &assign.right),
            Expr::Seq(seq) => {
                let mut children = Vec::new();
                for expr in &seq.exprs {
                    children.extend(self.expr_children(file, expr));
                }
                children
            }
            Expr::Cond(cond) => {
                let mut children = self.expr_children(file, &cond.test);
                children.extend(self.expr_children(file, &cond.cons));
                children.extend(self.expr_children(file, &cond.alt));
                children
            }
            Expr::Bin(bin) => {
                let mut children = self.expr_children(file, &bin.left);
                children.extend(self.expr_children(file, &bin.right));
                children
            }
            Expr::Unary(unary) => self.expr_children(file, &unary.arg),
            Expr::Await(await_expr) => self.expr_children(file, &await_expr.arg),
            Expr::Member(member) => self.expr_children(file, &member.obj),
            Expr::TsAs(cast) => self.expr_children(file, &cast.expr),
            Expr::TsNonNull(n) => self.expr_children(file, &n.expr),
            Expr::TsSatisfies(s) => self.expr_children(file, &s.expr),
            Expr::TsConstAssertion(c) => self.expr_children(file, &c.expr),
            Expr::TsTypeAssertion(cast) => self.expr_children(file, &cast.expr),
            _ => vec![],
        }
    }
}
