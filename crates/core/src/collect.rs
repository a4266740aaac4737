//! Endpoint discovery.
//!
//! Two independent rules feed the method list:
//! 1. `global.<name> = <callable>` anywhere in any file.
//! 2. Named exports (`export const`, `export function`, `export { .. }`) in
//!    the files listed in [`GenerateOptions::named_exports_files`].
//!
//! [`GenerateOptions::named_exports_files`]: crate::GenerateOptions

use std::path::Path;

use tracing::{debug, warn};

use crate::context::GenerationContext;
use crate::model::{SemanticModel, Syntax, TypeFlags};
use crate::types::{EndpointMethod, Parameter, ReturnType};

/// Identifier whose property assignments publish server functions.
pub const GLOBAL_OBJECT: &str = "global";

impl<M: SemanticModel> GenerationContext<'_, M> {
    /// Walk every statement of `file`, appending endpoints in source order.
    pub(crate) fn collect_file(&mut self, file: &Path) {
        let Some(statements) = self.model.source_statements(file) else {
            debug!(file = %file.display(), "File is not part of the program, skipping.");
            return;
        };
        let named_exports = self.options.named_exports_files.contains(file);
        for node in statements {
            self.visit(node, named_exports);
        }
    }

    /// Pre-order: endpoints of `node` come before those of its descendants.
    fn visit(&mut self, node: M::Node, named_exports: bool) {
        let model = self.model;

        match model.syntax(node) {
            Syntax::PropertyAssignment {
                object,
                property,
                value,
            } if object == GLOBAL_OBJECT => {
                self.add_endpoint(&property, model.type_at(value));
            }
            Syntax::VariableStatement {
                modifiers,
                declarations,
            } if named_exports && modifiers.is_named_export() => {
                for declaration in declarations {
                    if let Some(initializer) = declaration.initializer {
                        self.add_endpoint(&declaration.name, model.type_at(initializer));
                    }
                }
            }
            Syntax::FunctionDeclaration { modifiers, name } if named_exports && modifiers.is_named_export() => {
                let Some(name) = name else {
                    warn!(
                        text = %model.node_text(node),
                        "Cannot determine the name of an exported function, skipping."
                    );
                    return;
                };
                self.add_endpoint(&name, model.type_at(node));
            }
            Syntax::NamedExports { specifiers } if named_exports => {
                for specifier in specifiers {
                    self.add_endpoint(&specifier.name, model.type_at(specifier.local));
                }
            }
            _ => {}
        }

        for child in model.children(node) {
            self.visit(child, named_exports);
        }
    }

    /// Append an endpoint for `ty` if it is callable.
    fn add_endpoint(&mut self, name: &str, ty: M::Type) {
        if let Some(method) = self.endpoint_method(name, ty) {
            debug!(endpoint = name, "Found endpoint.");
            self.methods.push(method);
        }
    }

    /// Build the method from the first call signature of `ty`.
    fn endpoint_method(&mut self, name: &str, ty: M::Type) -> Option<EndpointMethod> {
        let model = self.model;
        let signature = model.call_signatures(ty).first().copied()?;

        let mut parameters = Vec::new();
        for symbol in model.signature_parameters(signature) {
            let param_name = model.symbol_name(symbol);
            let Some(param_type) = model.type_of_symbol(symbol) else {
                warn!(
                    endpoint = name,
                    parameter = param_name,
                    "Parameter has no value declaration, skipping."
                );
                continue;
            };
            if let Some(ty) = self.translate(param_type) {
                parameters.push(Parameter {
                    name: param_name.to_string(),
                    ty,
                });
            }
        }

        let return_type = if self.options.non_void_return_type {
            let ret = model.signature_return_type(signature);
            if model.type_flags(ret).contains(TypeFlags::VOID) {
                ReturnType::Void
            } else {
                self.translate(ret).map_or(ReturnType::Void, ReturnType::Type)
            }
        } else {
            ReturnType::Void
        };

        Some(EndpointMethod {
            name: name.to_string(),
            parameters,
            return_type,
        })
    }
}
